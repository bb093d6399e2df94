// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image extractor — the whole run: open, walk every page (rendering the
// configured ones), push each candidate through the gates, then remove
// furniture once the walk is complete.

use std::path::Path;

use bildwerk_core::ExtractorConfig;
use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::types::{ExtractionReport, SkipReason};
use tracing::{debug, info, instrument, warn};

use crate::extract::furniture;
use crate::extract::session::ExtractionSession;
use crate::image::decode::decode_image;
use crate::image::filter::{color_verdict, passes_size_gate};
use crate::image::fingerprint::fingerprint;
use crate::image::output::{OutputNamer, write_png};
use crate::pdf::reader::PdfReader;
use crate::pdf::walker::{ImageResource, PageContext, discover_images};
use crate::render::PageRasterizer;

/// Extracts meaningful raster images from a PDF.
///
/// ```ignore
/// let report = ImageExtractor::new(ExtractorConfig::default())
///     .with_rasterizer(default_rasterizer()?)
///     .run("atlas.pdf")?;
/// println!("{} images kept", report.content_retained());
/// ```
pub struct ImageExtractor {
    config: ExtractorConfig,
    rasterizer: Option<Box<dyn PageRasterizer>>,
}

/// Everything one run needs besides the session.
struct RunContext<'a> {
    reader: &'a PdfReader,
    namer: OutputNamer,
    source: &'a Path,
}

impl ImageExtractor {
    // -- Construction ---------------------------------------------------------

    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            rasterizer: None,
        }
    }

    /// Use `rasterizer` for the configured whole-page renders.
    pub fn with_rasterizer(mut self, rasterizer: Box<dyn PageRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    // -- Run ------------------------------------------------------------------

    /// Extract from the PDF at `path`, writing PNGs next to it.
    ///
    /// Fails only when the configuration is invalid or the document cannot
    /// be opened. Everything else is tallied in the report.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn run(&self, path: impl AsRef<Path>) -> Result<ExtractionReport> {
        let path = path.as_ref();
        self.config.validate()?;

        let reader = PdfReader::open(path)?;
        let pages_total = reader.page_count();
        info!(pages = pages_total, "Processing PDF");

        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mut session = ExtractionSession::new(source, pages_total);
        let ctx = RunContext {
            reader: &reader,
            namer: OutputNamer::for_input(path),
            source: path,
        };

        for (number, page_id) in reader.pages() {
            self.process_page(&ctx, &mut session, number, page_id);
        }
        info!(
            images = session.report().images_extracted,
            renders = session.report().pages_rendered,
            "Extraction complete"
        );

        // Counts are final only now; nothing is deleted before this point.
        let (mut report, fingerprints) = session.finish();
        let outcome = furniture::remove_furniture(&fingerprints, self.config.furniture_threshold);
        report.furniture = outcome.patterns;
        report.furniture_deleted = outcome.deleted;
        report.furniture_delete_failures = outcome.delete_failures;

        info!(
            patterns = report.furniture.len(),
            deleted = report.furniture_deleted,
            retained = report.content_retained(),
            "Furniture cleanup complete"
        );
        Ok(report)
    }

    // -- Pages ----------------------------------------------------------------

    #[instrument(skip(self, ctx, session, page_id), fields(page = number))]
    fn process_page(
        &self,
        ctx: &RunContext<'_>,
        session: &mut ExtractionSession,
        number: u32,
        page_id: lopdf::ObjectId,
    ) {
        debug!("Processing page");
        session.begin_page(number);

        if self.config.should_render(number) {
            self.render_page(ctx, session, number);
        }

        let page = match PageContext::resolve(ctx.reader, number, page_id) {
            Ok(page) => page,
            Err(err) => {
                warn!(%err, "Page skipped");
                session.record_page_failure();
                return;
            }
        };

        for candidate in discover_images(ctx.reader, &page) {
            self.process_image(ctx, session, &candidate);
        }
    }

    /// Rasterize the whole page. Renders are never fingerprinted and never
    /// classified as furniture, but they do consume an output number.
    fn render_page(&self, ctx: &RunContext<'_>, session: &mut ExtractionSession, number: u32) {
        let Some(rasterizer) = self.rasterizer.as_deref() else {
            let err = BildwerkError::RendererUnavailable("no page rasterizer configured".into());
            warn!(%err, page = number, "Page render skipped");
            session.record_render_failure();
            return;
        };

        let scale = self.config.render_scale();
        info!(
            page = number,
            dpi = self.config.render_dpi,
            renderer = rasterizer.name(),
            "Rendering entire page"
        );

        let image = match rasterizer.render_page(ctx.source, number - 1, scale) {
            Ok(image) => image,
            Err(err) => {
                warn!(%err, page = number, "Page render failed");
                session.record_render_failure();
                return;
            }
        };

        session.next_counter();
        let path = ctx.namer.render_path(number, image.width(), image.height());
        match write_png(&image, &path) {
            Ok(()) => {
                info!(file = %path.display(), "Rendered page");
                session.record_render();
            }
            Err(err) => {
                warn!(%err, page = number, "Rendered page not written");
                session.record_render_failure();
            }
        }
    }

    // -- Images ---------------------------------------------------------------

    fn process_image(
        &self,
        ctx: &RunContext<'_>,
        session: &mut ExtractionSession,
        candidate: &ImageResource<'_>,
    ) {
        let name = candidate.name.as_str();
        let min = self.config.min_dimension;

        // Declared size first; it costs nothing.
        if let (Some(width), Some(height)) = (candidate.image.width(), candidate.image.height()) {
            if !passes_size_gate(width, height, min) {
                self.skip(session, SkipReason::TooSmall, name, width, height);
                return;
            }
        }

        let image = match decode_image(ctx.reader, &candidate.image) {
            Ok(image) => image,
            Err(err) => {
                warn!(%err, image = name, via = %candidate.found_by, "Image skipped");
                session.record_skip(SkipReason::DecodeFailed);
                return;
            }
        };
        let (width, height) = (image.width(), image.height());

        if !passes_size_gate(width, height, min) {
            self.skip(session, SkipReason::TooSmall, name, width, height);
            return;
        }

        let key = fingerprint(&image);
        if !session.mark_on_page(key) {
            self.skip(session, SkipReason::DuplicateOnPage, name, width, height);
            return;
        }

        let verdict = color_verdict(&image);
        if !verdict.accepted() {
            if self.config.verbose {
                debug!(image = name, percent = verdict.percent(), "Colour share below 1%");
            }
            self.skip(session, SkipReason::Monochrome, name, width, height);
            return;
        }

        let occurrences = session.record_occurrence(key);
        if occurrences > 1 {
            info!(
                image = name,
                occurrence = occurrences,
                "Duplicate detected: {}x{}px",
                width,
                height
            );
        }

        let counter = session.next_counter();
        let path = ctx.namer.image_path(session.current_page(), counter, width, height);
        match write_png(&image, &path) {
            Ok(()) => {
                info!(file = %path.display(), via = %candidate.found_by, "Extracted");
                session.attach_output(key, &path);
            }
            Err(err) => {
                warn!(%err, image = name, "Image skipped");
                session.record_skip(SkipReason::EncodeFailed);
            }
        }
    }

    fn skip(
        &self,
        session: &mut ExtractionSession,
        reason: SkipReason,
        name: &str,
        width: u32,
        height: u32,
    ) {
        if self.config.verbose {
            debug!(image = name, ?reason, "Skipped ({}x{}px)", width, height);
        }
        session.record_skip(reason);
    }
}
