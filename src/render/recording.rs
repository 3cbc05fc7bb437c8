use image::{DynamicImage, GenericImageView};

use super::{RenderError, Surface};
use crate::config::Rgb;
use crate::grid::{Point, Rect};
use crate::layout::FontWeight;

/// A drawing call captured by [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Fill {
        rect: Rect,
        color: Rgb,
    },
    Stroke {
        rect: Rect,
        color: Rgb,
    },
    Text {
        text: String,
        at: Point,
        size: f64,
        weight: FontWeight,
        color: Rgb,
    },
    Image {
        rect: Rect,
        /// Pixel size of the image handed to the surface, after any cropping.
        pixels: (u32, u32),
    },
}

/// All drawing calls of one page.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedPage {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

impl RecordedPage {
    /// Every text line drawn on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Rectangles of every image drawn on the page.
    pub fn images(&self) -> impl Iterator<Item = &Rect> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Image { rect, .. } => Some(rect),
            _ => None,
        })
    }
}

/// An in-memory display list. Useful for tests and for inspecting output without a PDF reader.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pages: Vec<RecordedPage>,
}

impl RecordingSurface {
    /// Creates a surface with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&mut self) -> Result<&mut RecordedPage, RenderError> {
        self.pages.last_mut().ok_or(RenderError::Empty)
    }
}

impl Surface for RecordingSurface {
    type Output = Vec<RecordedPage>;

    fn begin_page(&mut self, width: f64, height: f64) -> Result<(), RenderError> {
        self.pages.push(RecordedPage {
            width,
            height,
            ops: Vec::new(),
        });
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), RenderError> {
        self.current()?.ops.push(DrawOp::Fill { rect, color });
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), RenderError> {
        self.current()?.ops.push(DrawOp::Stroke { rect, color });
        Ok(())
    }

    fn text(
        &mut self,
        text: &str,
        at: Point,
        size: f64,
        weight: FontWeight,
        color: Rgb,
    ) -> Result<(), RenderError> {
        self.current()?.ops.push(DrawOp::Text {
            text: text.to_owned(),
            at,
            size,
            weight,
            color,
        });
        Ok(())
    }

    fn image(&mut self, image: &DynamicImage, rect: Rect) -> Result<(), RenderError> {
        self.current()?.ops.push(DrawOp::Image {
            rect,
            pixels: image.dimensions(),
        });
        Ok(())
    }

    fn finish(self) -> Result<Self::Output, RenderError> {
        Ok(self.pages)
    }
}
