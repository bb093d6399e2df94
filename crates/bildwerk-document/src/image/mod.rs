// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding XObject streams, the size and colour gates,
// content fingerprints, and PNG output.

pub mod decode;
pub mod filter;
pub mod fingerprint;
pub mod output;

pub use decode::decode_image;
pub use filter::{ColorVerdict, SampleGrid, color_verdict, passes_size_gate};
pub use fingerprint::fingerprint;
pub use output::{OutputNamer, write_png};
