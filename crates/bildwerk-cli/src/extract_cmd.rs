// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `bildwerk extract` — layer the configuration, run the extractor, print
// the summary.

use std::io::Write;

use bildwerk_core::error::Result;
use bildwerk_core::{ExtractionReport, ExtractorConfig};
use bildwerk_document::{ImageExtractor, default_rasterizer};
use tracing::warn;

use crate::cli::ExtractArgs;

pub fn run(args: &ExtractArgs) -> Result<()> {
    let config = build_config(args)?;

    let mut extractor = ImageExtractor::new(config.clone());
    if config.render_vector_pages && !config.render_pages.is_empty() {
        match default_rasterizer() {
            Ok(rasterizer) => extractor = extractor.with_rasterizer(rasterizer),
            Err(err) => warn!(%err, "Configured page renders will be skipped"),
        }
    }

    let report = extractor.run(&args.file)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        write_summary(&report, &mut std::io::stdout().lock())?;
    }
    Ok(())
}

/// Defaults, then the config file, then flags.
pub fn build_config(args: &ExtractArgs) -> Result<ExtractorConfig> {
    let mut config = match &args.config {
        Some(path) => ExtractorConfig::from_json_file(path)?,
        None => ExtractorConfig::default(),
    };

    if let Some(min) = args.min_dimension {
        config.min_dimension = min;
    }
    if let Some(threshold) = args.furniture_threshold {
        config.furniture_threshold = threshold;
    }
    if !args.render_pages.is_empty() {
        config.render_pages = args.render_pages.iter().copied().collect();
    }
    if let Some(dpi) = args.dpi {
        config.render_dpi = dpi;
    }
    if args.no_render {
        config.render_vector_pages = false;
    }
    if args.verbose {
        config.verbose = true;
    }

    config.validate()?;
    Ok(config)
}

/// Human-readable summary. The extracted total counts every file written,
/// whole-page renders included, so extracted minus deleted is retained.
fn write_summary(report: &ExtractionReport, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Processed {} ({} pages)", report.source, report.pages_total)?;
    if report.pages_failed > 0 {
        writeln!(out, "Pages skipped (unreadable resources): {}", report.pages_failed)?;
    }
    writeln!(out)?;
    writeln!(out, "Extraction complete!")?;
    writeln!(out, "Total images extracted: {}", report.files_written())?;
    if report.pages_rendered > 0 || report.render_failures > 0 {
        writeln!(
            out,
            "  of which whole-page renders: {} ({} failed)",
            report.pages_rendered, report.render_failures
        )?;
    }

    let skipped = &report.skipped;
    if skipped.total() > 0 {
        writeln!(
            out,
            "Skipped: {} too small, {} repeated on page, {} without colour, {} undecodable, {} unwritable",
            skipped.too_small,
            skipped.duplicate_on_page,
            skipped.monochrome,
            skipped.decode_failed,
            skipped.encode_failed
        )?;
    }

    writeln!(out)?;
    writeln!(out, "=== Furniture Detection ===")?;
    for pattern in &report.furniture {
        writeln!(
            out,
            "  Furniture detected: {}x{}px (appeared {} times)",
            pattern.width, pattern.height, pattern.occurrences
        )?;
    }
    writeln!(out, "Unique furniture patterns detected: {}", report.furniture.len())?;
    writeln!(out, "Total furniture images deleted: {}", report.furniture_deleted)?;
    if report.furniture_delete_failures > 0 {
        writeln!(
            out,
            "Furniture files that could not be deleted: {}",
            report.furniture_delete_failures
        )?;
    }
    writeln!(out, "Content images retained: {}", report.content_retained())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bildwerk_core::BildwerkError;
    use clap::Parser;
    use std::io::Write;

    use crate::cli::{Cli, Commands};

    fn parse(argv: &[&str]) -> ExtractArgs {
        match Cli::parse_from(argv).command {
            Commands::Extract(args) => args,
            Commands::Inspect(_) => panic!("expected extract"),
        }
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "bildwerk",
            "extract",
            "book.pdf",
            "--min-dimension",
            "200",
            "--render-page",
            "26",
            "--render-page",
            "27",
            "--dpi",
            "150",
        ]);
        let config = build_config(&args).expect("config");
        assert_eq!(config.min_dimension, 200);
        assert_eq!(config.render_dpi, 150);
        assert_eq!(config.render_pages.iter().copied().collect::<Vec<_>>(), vec![26, 27]);
        assert!(config.render_vector_pages);
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "furniture_threshold": 5, "render_pages": [3], "render_dpi": 200 }}"#)
            .expect("write");
        let path = file.path().to_string_lossy().into_owned();

        let args = parse(&["bildwerk", "extract", "book.pdf", "--config", &path, "--dpi", "96", "--no-render"]);
        let config = build_config(&args).expect("config");
        assert_eq!(config.furniture_threshold, 5);
        assert_eq!(config.render_dpi, 96);
        assert!(config.render_pages.contains(&3));
        assert!(!config.render_vector_pages);
    }

    fn summary(report: &ExtractionReport) -> String {
        let mut out = Vec::new();
        write_summary(report, &mut out).expect("write summary");
        String::from_utf8(out).expect("utf-8")
    }

    #[test]
    fn render_only_run_adds_up() {
        let report = ExtractionReport {
            source: "atlas.pdf".into(),
            pages_total: 1,
            pages_rendered: 1,
            ..ExtractionReport::default()
        };
        let text = summary(&report);
        assert!(text.contains("Total images extracted: 1\n"));
        assert!(text.contains("of which whole-page renders: 1 (0 failed)"));
        assert!(text.contains("Total furniture images deleted: 0\n"));
        assert!(text.contains("Content images retained: 1\n"));
    }

    #[test]
    fn extracted_minus_deleted_is_retained() {
        let report = ExtractionReport {
            images_extracted: 6,
            pages_rendered: 2,
            furniture_deleted: 3,
            ..ExtractionReport::default()
        };
        let text = summary(&report);
        assert!(text.contains("Total images extracted: 8\n"));
        assert!(text.contains("Total furniture images deleted: 3\n"));
        assert!(text.contains("Content images retained: 5\n"));
    }

    #[test]
    fn invalid_flag_value_is_config_error() {
        let args = parse(&["bildwerk", "extract", "book.pdf", "--furniture-threshold", "0"]);
        assert!(matches!(build_config(&args), Err(BildwerkError::Config(_))));
    }
}
