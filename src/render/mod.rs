//! Drawing of laid out pages onto a [`Surface`].
//!
//! The [`Renderer`] never computes positions of its own; geometry comes from the
//! [`PageDescriptor`]s. It resolves palette swatches against the theme, applies text alignment,
//! scales images into their cells and substitutes placeholders for images that fail.

pub mod assets;
mod pdf;
mod recording;

pub use assets::{AssetCache, AssetError};
pub use pdf::PdfSurface;
pub use recording::{DrawOp, RecordedPage, RecordingSurface};

use image::{DynamicImage, GenericImageView};
use log::{debug, warn};

use crate::config::{ReportTheme, Rgb};
use crate::grid::{contain_rect, cover_crop, ImageFit, Point, Rect};
use crate::layout::{
    Align, Element, FontWeight, ImageSlot, PageDescriptor, Swatch, TextBlock, TextStyle,
};
use crate::metrics::text_width;

const IMAGE_UNAVAILABLE: &str = "Image not available";

/// Errors raised by a drawing backend.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("PDF backend error: {0}")]
    Pdf(String),

    #[error("image could not be embedded: {0}")]
    Image(String),

    #[error("document has no pages")]
    Empty,

    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),
}

/// A drawing target. Coordinates are millimetres from the top-left corner of the current page.
pub trait Surface {
    type Output;

    /// Starts a new page of the given size.
    fn begin_page(&mut self, width: f64, height: f64) -> Result<(), RenderError>;

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), RenderError>;

    fn stroke_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), RenderError>;

    /// Draws a single line of text with its baseline starting at `at`.
    fn text(
        &mut self,
        text: &str,
        at: Point,
        size: f64,
        weight: FontWeight,
        color: Rgb,
    ) -> Result<(), RenderError>;

    /// Draws `image` stretched to `rect`.
    fn image(&mut self, image: &DynamicImage, rect: Rect) -> Result<(), RenderError>;

    /// Completes the document.
    fn finish(self) -> Result<Self::Output, RenderError>;
}

/// Draws page descriptors with the colours of a theme.
#[derive(Clone, Debug, Default)]
pub struct Renderer {
    theme: ReportTheme,
}

impl Renderer {
    /// Creates a renderer that resolves swatches against `theme`'s palette.
    pub fn new(theme: ReportTheme) -> Self {
        Self { theme }
    }

    /// Draws every page in order and finishes the surface.
    pub fn render<S: Surface>(
        &self,
        pages: &[PageDescriptor],
        assets: &AssetCache,
        mut surface: S,
    ) -> Result<S::Output, RenderError> {
        for page in pages {
            debug!("drawing page {}: {:?}", page.number, page.kind);
            self.draw_page(page, assets, &mut surface)?;
        }
        surface.finish()
    }

    fn color(&self, swatch: Swatch) -> Rgb {
        let palette = &self.theme.palette;
        match swatch {
            Swatch::Primary => palette.primary,
            Swatch::Secondary => palette.secondary,
            Swatch::Accent => palette.accent,
            Swatch::Positive => palette.positive,
            Swatch::Negative => palette.negative,
            Swatch::Neutral => palette.neutral,
            Swatch::Background => palette.background,
            Swatch::Text => palette.text,
            Swatch::TextLight => palette.text_light,
            Swatch::Panel => palette.panel,
            Swatch::Placeholder => palette.placeholder,
            Swatch::Cover => palette.cover,
            Swatch::Highlight => palette.highlight,
            Swatch::Link => palette.link,
            Swatch::NewsTable => palette.news_table,
            Swatch::SocialTable => palette.social_table,
            Swatch::GridLine => palette.grid_line,
            Swatch::White => Rgb::WHITE,
        }
    }

    fn draw_page<S: Surface>(
        &self,
        page: &PageDescriptor,
        assets: &AssetCache,
        surface: &mut S,
    ) -> Result<(), RenderError> {
        let g = &self.theme.geometry;
        surface.begin_page(g.width, g.height)?;
        surface.fill_rect(
            Rect::new(0.0, 0.0, g.width, g.height),
            self.color(page.background),
        )?;

        if let Some(header) = &page.header {
            surface.fill_rect(header.rect, self.color(Swatch::Primary))?;
            self.draw_text(&header.title, surface)?;
        }
        if let Some(footer) = &page.footer {
            surface.fill_rect(footer.rect, self.color(Swatch::Secondary))?;
            self.draw_text(&footer.text, surface)?;
        }

        for element in &page.elements {
            match element {
                Element::Fill { rect, color } => surface.fill_rect(*rect, self.color(*color))?,
                Element::Stroke { rect, color } => {
                    surface.stroke_rect(*rect, self.color(*color))?
                }
                Element::Text(block) => self.draw_text(block, surface)?,
                Element::Image(slot) => self.draw_image(slot, assets, surface)?,
                Element::Placeholder { rect, label } => {
                    self.draw_placeholder(*rect, label, 12.0, surface)?
                }
            }
        }

        self.draw_text(&page.page_label, surface)
    }

    fn draw_text<S: Surface>(&self, block: &TextBlock, surface: &mut S) -> Result<(), RenderError> {
        let style = &block.style;
        let color = self.color(style.color);
        for (index, line) in block.lines.iter().enumerate() {
            let width = text_width(line, style.size);
            let x = match style.align {
                Align::Left => block.origin.x,
                Align::Center => block.origin.x - width / 2.0,
                Align::Right => block.origin.x - width,
            };
            surface.text(
                line,
                Point::new(x, block.baseline(index)),
                style.size,
                style.weight,
                color,
            )?;
        }
        Ok(())
    }

    fn draw_placeholder<S: Surface>(
        &self,
        rect: Rect,
        label: &str,
        size: f64,
        surface: &mut S,
    ) -> Result<(), RenderError> {
        surface.fill_rect(rect, self.color(Swatch::Placeholder))?;
        let center = rect.center();
        let block = TextBlock::line(
            label,
            center.x,
            center.y,
            TextStyle::regular(size)
                .with_color(Swatch::TextLight)
                .aligned(Align::Center),
        );
        self.draw_text(&block, surface)
    }

    /// Draws an image, falling back to a placeholder when it cannot be loaded or embedded.
    fn draw_image<S: Surface>(
        &self,
        slot: &ImageSlot,
        assets: &AssetCache,
        surface: &mut S,
    ) -> Result<(), RenderError> {
        let drawn = assets
            .get(&slot.source)
            .map_err(|err| RenderError::Image(err.to_string()))
            .and_then(|image| {
                let (width, height) = image.dimensions();
                match slot.fit {
                    ImageFit::Contain => {
                        surface.image(&image, contain_rect(slot.cell, width, height))
                    }
                    ImageFit::Cover => {
                        let (x, y, w, h) = cover_crop(slot.cell, width, height);
                        surface.image(&image.crop_imm(x, y, w, h), slot.cell)
                    }
                }
            });

        match drawn {
            Ok(()) => Ok(()),
            Err(err @ (RenderError::Image(_) | RenderError::Pdf(_))) => {
                warn!("substituting placeholder for image: {err}");
                self.draw_placeholder(slot.cell, IMAGE_UNAVAILABLE, 10.0, surface)?;
                surface.stroke_rect(slot.cell, self.color(Swatch::GridLine))
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutEngine;
    use crate::model::{ImageRef, ReportData, ScreenshotSlot};

    fn theme() -> ReportTheme {
        ReportTheme::default().with_copyright_year(2024)
    }

    #[test]
    fn one_recorded_page_per_descriptor() {
        let mut report = ReportData::new("Acme");
        report.add_keyword("Acme");
        let pages = LayoutEngine::new(theme()).layout_pages(&report);
        let recorded = Renderer::new(theme())
            .render(&pages, &AssetCache::default(), RecordingSurface::new())
            .expect("render to recording");
        assert_eq!(recorded.len(), pages.len());
        assert!(recorded[1].texts().any(|text| text == "2/9"));
        assert!(recorded[0].texts().any(|text| text == "1/9"));
    }

    #[test]
    fn right_aligned_label_ends_at_origin() {
        let mut report = ReportData::new("Acme");
        report.add_keyword("Acme");
        let pages = LayoutEngine::new(theme()).layout_pages(&report);
        let recorded = Renderer::new(theme())
            .render(&pages[..1], &AssetCache::default(), RecordingSurface::new())
            .expect("render cover");
        let label = recorded[0]
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { text, at, size, .. } if text == "1/9" => Some((*at, *size)),
                _ => None,
            })
            .expect("page label");
        let right = label.0.x + text_width("1/9", label.1);
        assert!((right - (297.0 - 15.0)).abs() < 1e-9);
    }

    #[test]
    fn unresolvable_image_becomes_placeholder() {
        let mut report = ReportData::new("Acme");
        report.add_screenshot(
            ScreenshotSlot::Before,
            ImageRef::resolved("file:///definitely/missing/shot.png"),
        );
        let pages = LayoutEngine::new(theme()).layout_pages(&report);
        let assets = AssetCache::preload(report.images());
        let recorded = Renderer::new(theme())
            .render(&pages, &assets, RecordingSurface::new())
            .expect("render despite missing image");
        let before = &recorded[3];
        assert!(before.texts().any(|text| text == IMAGE_UNAVAILABLE));
        assert_eq!(before.images().count(), 0);
    }
}
