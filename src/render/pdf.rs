use std::borrow::Cow;
use std::io::{BufWriter, Cursor};

use image::{DynamicImage, GenericImageView, Rgba, RgbImage};
use printpdf::{
    BuiltinFont, Color, Image, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point as PdfPoint, Rgb as PdfRgb,
};

use super::{RenderError, Surface};
use crate::config::Rgb;
use crate::grid::{Point, Rect};
use crate::layout::FontWeight;

const LAYER_NAME: &str = "Layer 1";
const IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

struct OpenDocument {
    doc: PdfDocumentReference,
    fonts: Fonts,
    layer: PdfLayerReference,
    page_height: f64,
}

/// Writes pages into a PDF document using the builtin Helvetica faces.
pub struct PdfSurface {
    title: String,
    document: Option<OpenDocument>,
}

impl PdfSurface {
    /// Creates an empty document with the given title. Pages are added by `begin_page`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            document: None,
        }
    }

    fn open(&mut self) -> Result<&mut OpenDocument, RenderError> {
        self.document.as_mut().ok_or(RenderError::Empty)
    }
}

fn pdf_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Pdf(err.to_string())
}

fn pdf_color(color: Rgb) -> Color {
    let (r, g, b) = color.to_unit();
    Color::Rgb(PdfRgb::new(r, g, b, None))
}

/// Characters of WinAnsiEncoding (Windows-1252) that live outside Latin-1.
const WIN_ANSI_EXTRAS: &str = "\u{20ac}\u{201a}\u{192}\u{201e}\u{2026}\u{2020}\u{2021}\u{2c6}\u{2030}\u{160}\u{2039}\u{152}\u{17d}\u{2018}\u{2019}\u{201c}\u{201d}\u{2022}\u{2013}\u{2014}\u{2dc}\u{2122}\u{161}\u{203a}\u{153}\u{17e}\u{178}";

/// Code points the encoder can find. U+00A0 and U+00AD share glyphs with ASCII and are not.
fn is_win_ansi(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{a1}'..='\u{ac}' | '\u{ae}'..='\u{ff}')
        || WIN_ANSI_EXTRAS.contains(c)
}

/// The builtin fonts are WinAnsi encoded and printpdf silently drops anything else, so
/// unsupported characters are replaced with a close match or `?` up front.
fn to_base_encoding(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_win_ansi) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            c if is_win_ansi(c) => out.push(c),
            '\u{2212}' | '\u{2010}' | '\u{2011}' => out.push('-'),
            '\u{a0}' | '\t' | '\n' | '\r' => out.push(' '),
            '\u{ad}' => {}
            _ => out.push('?'),
        }
    }
    Cow::Owned(out)
}

/// printpdf embeds RGB only, so transparent pixels are composited onto white first.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = u16::from(a);
        let blend = |channel: u8| ((u16::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

impl OpenDocument {
    fn rect_shape(&self, rect: Rect, fill: bool) -> Line {
        let top = self.page_height - rect.y;
        let bottom = self.page_height - rect.bottom();
        let corners = [
            (rect.x, bottom),
            (rect.right(), bottom),
            (rect.right(), top),
            (rect.x, top),
        ];
        Line {
            points: corners
                .iter()
                .map(|&(x, y)| (PdfPoint::new(Mm(x), Mm(y)), false))
                .collect(),
            is_closed: true,
            has_fill: fill,
            has_stroke: !fill,
            is_clipping_path: false,
        }
    }
}

impl Surface for PdfSurface {
    type Output = Vec<u8>;

    fn begin_page(&mut self, width: f64, height: f64) -> Result<(), RenderError> {
        match self.document.as_mut() {
            Some(open) => {
                let (page, layer) = open.doc.add_page(Mm(width), Mm(height), LAYER_NAME);
                open.layer = open.doc.get_page(page).get_layer(layer);
                open.page_height = height;
            }
            None => {
                let (doc, page, layer) =
                    PdfDocument::new(self.title.clone(), Mm(width), Mm(height), LAYER_NAME);
                let fonts = Fonts {
                    regular: doc
                        .add_builtin_font(BuiltinFont::Helvetica)
                        .map_err(pdf_error)?,
                    bold: doc
                        .add_builtin_font(BuiltinFont::HelveticaBold)
                        .map_err(pdf_error)?,
                    italic: doc
                        .add_builtin_font(BuiltinFont::HelveticaOblique)
                        .map_err(pdf_error)?,
                };
                let layer = doc.get_page(page).get_layer(layer);
                self.document = Some(OpenDocument {
                    doc,
                    fonts,
                    layer,
                    page_height: height,
                });
            }
        }
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), RenderError> {
        let open = self.open()?;
        open.layer.set_fill_color(pdf_color(color));
        open.layer.add_shape(open.rect_shape(rect, true));
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), RenderError> {
        let open = self.open()?;
        open.layer.set_outline_color(pdf_color(color));
        open.layer.set_outline_thickness(0.5);
        open.layer.add_shape(open.rect_shape(rect, false));
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
        let open = self.open()?;
        let font = match weight {
            FontWeight::Regular => &open.fonts.regular,
            FontWeight::Bold => &open.fonts.bold,
            FontWeight::Italic => &open.fonts.italic,
        };
        open.layer.set_fill_color(pdf_color(color));
        open.layer.use_text(
            to_base_encoding(text),
            size,
            Mm(at.x),
            Mm(open.page_height - at.y),
            font,
        );
        Ok(())
    }

    fn image(&mut self, image: &DynamicImage, rect: Rect) -> Result<(), RenderError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 || rect.width <= 0.0 || rect.height <= 0.0 {
            return Err(RenderError::Image(format!(
                "cannot place {width}x{height} image into {:.1}x{:.1} mm",
                rect.width, rect.height
            )));
        }
        let open = self.open()?;
        let rgb = DynamicImage::ImageRgb8(flatten_onto_white(image));
        let natural_width = f64::from(width) / IMAGE_DPI * MM_PER_INCH;
        let natural_height = f64::from(height) / IMAGE_DPI * MM_PER_INCH;
        Image::from_dynamic_image(&rgb).add_to_layer(
            open.layer.clone(),
            Some(Mm(rect.x)),
            Some(Mm(open.page_height - rect.bottom())),
            None,
            Some(rect.width / natural_width),
            Some(rect.height / natural_height),
            Some(IMAGE_DPI),
        );
        Ok(())
    }

    fn finish(self) -> Result<Self::Output, RenderError> {
        let open = self.document.ok_or(RenderError::Empty)?;
        let mut writer = BufWriter::new(Cursor::new(Vec::new()));
        open.doc.save(&mut writer).map_err(pdf_error)?;
        let cursor = writer
            .into_inner()
            .map_err(|err| RenderError::Io(err.into_error()))?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_text_passes_through() {
        for text in ["plain", "Caf\u{e9} Espa\u{f1}a", "\u{a9} 2024 Acme \u{2014} x", "\u{2022} \u{20ac}5"] {
            assert!(matches!(to_base_encoding(text), Cow::Borrowed(_)), "{text}");
        }
    }

    #[test]
    fn unsupported_characters_are_replaced() {
        assert_eq!(to_base_encoding("a\u{2212}b \u{4e2d} \u{e9}"), "a-b ? \u{e9}");
        assert_eq!(to_base_encoding("1\u{a0}000 co\u{ad}op"), "1 000 coop");
    }

    #[test]
    fn transparent_pixels_become_white() {
        let mut rgba = image::RgbaImage::new(3, 1);
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, Rgba([200, 10, 10, 255]));
        rgba.put_pixel(2, 0, Rgba([0, 0, 0, 128]));
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(flat.get_pixel(1, 0).0, [200, 10, 10]);
        assert_eq!(flat.get_pixel(2, 0).0, [127, 127, 127]);
    }

    #[test]
    fn writes_a_pdf_header() {
        let mut surface = PdfSurface::new("test");
        surface.begin_page(297.0, 210.0).expect("first page");
        surface
            .fill_rect(Rect::new(0.0, 0.0, 297.0, 25.0), Rgb::BLACK)
            .expect("fill");
        surface
            .text("Hello", Point::new(15.0, 16.0), 14.0, FontWeight::Bold, Rgb::WHITE)
            .expect("text");
        surface.begin_page(297.0, 210.0).expect("second page");
        let bytes = surface.finish().expect("save");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn finishing_without_pages_fails() {
        assert!(matches!(
            PdfSurface::new("empty").finish(),
            Err(RenderError::Empty)
        ));
    }
}
