//! One-shot report generation.

use std::borrow::Cow;

use log::info;

use crate::config::ReportTheme;
use crate::error::ReportError;
use crate::layout::{LayoutEngine, PageDescriptor};
use crate::model::{ImageRef, ReportData};
use crate::pagination::predict_total_pages;
use crate::render::assets::to_data_url;
use crate::render::{AssetCache, PdfSurface, Renderer, Surface};

/// A finished PDF document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Builder for rendering a [`ReportData`] into a PDF.
///
/// ```no_run
/// use reputation_report::{ReportBuilder, ReportData};
///
/// let report = ReportData::new("Acme");
/// let rendered = ReportBuilder::new().render(&report)?;
/// std::fs::write("acme.pdf", &rendered.bytes)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct ReportBuilder {
    theme: ReportTheme,
    bookmarks: bool,
}

impl ReportBuilder {
    /// Creates a builder with the default theme and no bookmarks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `theme` for both layout and rendering.
    pub fn with_theme(mut self, theme: ReportTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Adds a PDF outline for the section starts. Has no effect without the `bookmarks` feature.
    pub fn with_bookmarks(mut self, enabled: bool) -> Self {
        self.bookmarks = enabled;
        self
    }

    /// The theme pages are laid out and drawn with.
    pub fn theme(&self) -> &ReportTheme {
        &self.theme
    }

    /// Validates `report` and lays it out, checking the result against the predicted page count.
    pub fn plan(&self, report: &ReportData) -> Result<Vec<PageDescriptor>, ReportError> {
        report.validate_for_generation()?;
        let predicted = predict_total_pages(report);
        let pages = LayoutEngine::new(self.theme.clone()).layout_pages(report);
        if pages.len() != predicted {
            return Err(ReportError::PaginationMismatch {
                predicted,
                laid_out: pages.len(),
            });
        }
        Ok(pages)
    }

    /// Lays out `report` and draws it onto `surface`.
    pub fn render_with<S: Surface>(
        &self,
        report: &ReportData,
        surface: S,
    ) -> Result<(Vec<PageDescriptor>, S::Output), ReportError> {
        let report = inline_pending_images(report);
        let pages = self.plan(&report)?;
        let assets = AssetCache::preload(
            pages
                .iter()
                .flat_map(|page| page.images())
                .map(|slot| &slot.source),
        );
        if assets.failure_count() > 0 {
            info!(
                "{} of {} images could not be loaded and will be shown as placeholders",
                assets.failure_count(),
                assets.failure_count() + assets.len()
            );
        }
        let output = Renderer::new(self.theme.clone()).render(&pages, &assets, surface)?;
        Ok((pages, output))
    }

    /// Renders `report` into PDF bytes. Nothing is returned unless every step succeeded.
    pub fn render(&self, report: &ReportData) -> Result<RenderedReport, ReportError> {
        let title = format!("{} - {}", report.report_title, report.brand_name);
        let (pages, bytes) = self.render_with(report, PdfSurface::new(title))?;
        let bytes = self.add_outline(bytes, &pages)?;
        info!(
            "rendered report for {} ({} pages, {} bytes)",
            report.brand_name,
            pages.len(),
            bytes.len()
        );
        Ok(RenderedReport {
            bytes,
            page_count: pages.len(),
        })
    }

    #[cfg(feature = "bookmarks")]
    fn add_outline(&self, bytes: Vec<u8>, pages: &[PageDescriptor]) -> Result<Vec<u8>, ReportError> {
        if !self.bookmarks {
            return Ok(bytes);
        }
        let entries = crate::bookmarks::section_bookmarks(pages);
        Ok(crate::bookmarks::apply_bookmarks(&bytes, &entries)?)
    }

    #[cfg(not(feature = "bookmarks"))]
    fn add_outline(&self, bytes: Vec<u8>, _pages: &[PageDescriptor]) -> Result<Vec<u8>, ReportError> {
        if self.bookmarks {
            log::warn!("bookmarks requested but the `bookmarks` feature is disabled");
        }
        Ok(bytes)
    }
}

/// Converts raw uploads into `data:` URLs so the drawn document only sees resolvable references.
fn inline_pending_images(report: &ReportData) -> Cow<'_, ReportData> {
    if !report.images().any(ImageRef::is_pending) {
        return Cow::Borrowed(report);
    }
    let mut owned = report.clone();
    for image in owned.images_mut() {
        if let ImageRef::Pending { bytes, media_type } = image {
            let url = to_data_url(bytes, media_type.as_deref());
            *image = ImageRef::Resolved(url);
        }
    }
    Cow::Owned(owned)
}

/// File name for a generated document: `<brand>_RP_Report_<date>.pdf`.
pub fn suggested_file_name(report: &ReportData) -> String {
    let sanitize = |value: &str| -> String {
        value
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect()
    };
    format!(
        "{}_RP_Report_{}.pdf",
        sanitize(&report.brand_name),
        sanitize(&report.update_date)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;

    #[test]
    fn file_name_replaces_unsafe_characters() {
        let mut report = ReportData::new("Acme/Corp");
        report.update_date = "12:05".to_owned();
        assert_eq!(suggested_file_name(&report), "Acme_Corp_RP_Report_12_05.pdf");
    }

    #[test]
    fn missing_brand_is_rejected_before_rendering() {
        let err = ReportBuilder::new()
            .render(&ReportData::new(" "))
            .expect_err("brand required");
        assert!(matches!(err, ReportError::MissingBrandName));
    }

    #[test]
    fn pending_images_are_inlined() {
        let mut report = ReportData::new("Acme");
        report.add_attachment(ImageRef::pending(vec![0u8; 4]));
        let inlined = inline_pending_images(&report);
        match &inlined.lampiran_images[0] {
            ImageRef::Resolved(url) => assert!(url.starts_with("data:")),
            other => panic!("still pending: {other:?}"),
        }
        assert!(report.lampiran_images[0].is_pending());
    }

    #[test]
    fn recorded_pages_match_plan() {
        let report = ReportData::new("Acme");
        let builder = ReportBuilder::new();
        let (pages, recorded) = builder
            .render_with(&report, RecordingSurface::new())
            .expect("render");
        assert_eq!(pages.len(), recorded.len());
        assert_eq!(pages.len(), predict_total_pages(&report));
    }
}
