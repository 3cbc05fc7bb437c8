//! Slide layout engine.
//!
//! [`LayoutEngine::layout_pages`] is a pure transform from a borrowed [`ReportData`] to an ordered
//! list of [`PageDescriptor`]s. Every descriptor carries absolute geometry in millimetres (origin
//! top-left) so a renderer only has to pick fonts and colours.
//!
//! Page totals come from [`predict_total_pages`]; both sides size their sections with the
//! constants in [`crate::capacity`].

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::capacity::{
    COUNTER_CONTENT_CAP, KEYWORD_STATS_ROW_CAP, NEWS_LINKS_PER_PAGE, SOCIAL_LINKS_PER_PAGE,
    SOCIAL_LINK_COLUMNS, SOCIAL_STATS_CAP, SOCIAL_STATS_COLUMNS,
};
use crate::config::ReportTheme;
use crate::grid::{cell_rects, GridShape, GridVariant, ImageFit, Point, Rect};
use crate::metrics::{
    group_thousands, line_height, truncate_chars, truncate_to_width, wrap_text, MM_PER_PT,
};
use crate::model::{CounterContentType, ImageRef, ProductionLink, ReportData, ScreenshotSlot};
use crate::pagination::{chunks, continued_title, predict_total_pages};

/// Rendered in place of any missing optional value.
pub const MISSING_VALUE: &str = "\u{2014}";

const NO_SCREENSHOT: &str = "No screenshot uploaded";
const NO_NEWS: &str = "Belum ada data berita.";
const NO_KEYWORDS: &str = "No keyword data available";
const COVER_SUBTITLE: &str = "Brand Monitoring & Reputation Report";
const BULLET: &str = "\u{2022}";
const MARKER_INDENT: f64 = 5.0;
const ASCENT_FACTOR: f64 = 0.8;
/// Header and footer text baselines as a fraction of their bar height.
const HEADER_BASELINE: f64 = 0.64;
const FOOTER_BASELINE: f64 = 2.0 / 3.0;
/// Header width reserved on the right for the page label.
const PAGE_LABEL_ROOM: f64 = 30.0;

/// Palette entry a drawing instruction refers to. Resolved against the theme by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Swatch {
    Primary,
    Secondary,
    Accent,
    Positive,
    Negative,
    Neutral,
    Background,
    Text,
    TextLight,
    Panel,
    Placeholder,
    Cover,
    Highlight,
    Link,
    NewsTable,
    SocialTable,
    GridLine,
    White,
}

/// Face of the builtin Helvetica family a text block is set in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FontWeight {
    Regular,
    Bold,
    Italic,
}

/// Horizontal anchoring of a text block relative to its origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Font size, face, colour and alignment of a text block.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TextStyle {
    /// Font size in points.
    pub size: f64,
    pub weight: FontWeight,
    pub color: Swatch,
    pub align: Align,
}

impl TextStyle {
    /// Left-aligned regular text in the body colour.
    pub const fn regular(size: f64) -> Self {
        Self {
            size,
            weight: FontWeight::Regular,
            color: Swatch::Text,
            align: Align::Left,
        }
    }

    /// Same as [`TextStyle::regular`] in the bold face.
    pub const fn bold(size: f64) -> Self {
        Self {
            weight: FontWeight::Bold,
            ..Self::regular(size)
        }
    }

    /// Same as [`TextStyle::regular`] in the italic face.
    pub const fn italic(size: f64) -> Self {
        Self {
            weight: FontWeight::Italic,
            ..Self::regular(size)
        }
    }

    /// Returns the style with `color` applied.
    pub const fn with_color(mut self, color: Swatch) -> Self {
        self.color = color;
        self
    }

    /// Returns the style anchored with `align`.
    pub const fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

/// One or more lines of text. `origin` is the baseline of the first line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub origin: Point,
    pub line_height: f64,
    pub style: TextStyle,
}

impl TextBlock {
    /// A single line with its baseline at `(x, y)`.
    pub fn line(text: impl Into<String>, x: f64, y: f64, style: TextStyle) -> Self {
        Self::lines(vec![text.into()], x, y, style)
    }

    /// Several lines spaced by the line height of `style.size`.
    pub fn lines(lines: Vec<String>, x: f64, y: f64, style: TextStyle) -> Self {
        Self {
            lines,
            origin: Point::new(x, y),
            line_height: line_height(style.size),
            style,
        }
    }

    /// Baseline of the `index`-th line.
    pub fn baseline(&self, index: usize) -> f64 {
        self.origin.y + index as f64 * self.line_height
    }
}

/// An image placed into a cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageSlot {
    pub source: ImageRef,
    pub cell: Rect,
    pub fit: ImageFit,
}

/// A drawing instruction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Element {
    Fill { rect: Rect, color: Swatch },
    Stroke { rect: Rect, color: Swatch },
    Text(TextBlock),
    Image(ImageSlot),
    /// Grey box with a centred label, used when there is nothing to show.
    Placeholder { rect: Rect, label: String },
}

/// `current/total`, 1-indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageNumber {
    pub current: usize,
    pub total: usize,
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

/// The coloured title band at the top of content pages.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeaderBar {
    pub rect: Rect,
    pub title: TextBlock,
}

/// The confidentiality band at the bottom of content pages.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FooterBar {
    pub rect: Rect,
    pub text: TextBlock,
}

/// Which slide a descriptor represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PageKind {
    Cover,
    ReputationStatus,
    ResultsDivider,
    SearchBefore,
    SearchAfter,
    AiBefore,
    AiAfter,
    AppendixDivider,
    DataSummary,
    SocialMediaStats,
    CounterContent,
    ContentProduction,
    NewsLinks { chunk: usize },
    SocialLinks { chunk: usize },
    Attachment { index: usize },
}

impl PageKind {
    /// Short human readable name, used for outlines and diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cover => "Cover",
            Self::ReputationStatus => "Current Status",
            Self::ResultsDivider => "Results",
            Self::SearchBefore => "Google Search - Before",
            Self::SearchAfter => "Google Search - After",
            Self::AiBefore => "AI Result - Before",
            Self::AiAfter => "AI Result - After",
            Self::AppendixDivider => "Appendix",
            Self::DataSummary => "Data Summary",
            Self::SocialMediaStats => "Social Media Statistics",
            Self::CounterContent => "Counter Narrative Content",
            Self::ContentProduction => "Content Production",
            Self::NewsLinks { .. } => "Production Results - News",
            Self::SocialLinks { .. } => "Social Media Production Links",
            Self::Attachment { .. } => "Lampiran",
        }
    }

    /// Returns `true` for the first page of a section, which is where outline entries point.
    pub fn starts_section(&self) -> bool {
        match self {
            Self::NewsLinks { chunk } | Self::SocialLinks { chunk } => *chunk == 0,
            Self::Attachment { index } => *index == 0,
            _ => true,
        }
    }
}

/// Summary of an image grid, kept for diagnostics and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GridSummary {
    pub variant: GridVariant,
    pub shape: GridShape,
    /// Images that received a cell.
    pub drawn: usize,
    /// Images past the cap.
    pub dropped: usize,
}

/// Bookkeeping about content that did or did not fit a page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LayoutNotes {
    pub grid: Option<GridSummary>,
    /// Items of a paginated list placed on this page.
    pub items: usize,
    /// Rows, cards or paragraphs that did not fit and were left out.
    pub omitted: usize,
}

/// A fully positioned page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageDescriptor {
    pub kind: PageKind,
    pub number: PageNumber,
    pub background: Swatch,
    pub header: Option<HeaderBar>,
    pub footer: Option<FooterBar>,
    /// The `current/total` label, inside the header or in the bottom-right corner.
    pub page_label: TextBlock,
    pub elements: Vec<Element>,
    pub notes: LayoutNotes,
}

impl PageDescriptor {
    /// Title printed in the header bar, if the page has one.
    pub fn title(&self) -> Option<&str> {
        self.header
            .as_ref()
            .and_then(|header| header.title.lines.first())
            .map(String::as_str)
    }

    /// Images placed on this page in drawing order.
    pub fn images(&self) -> impl Iterator<Item = &ImageSlot> {
        self.elements.iter().filter_map(|element| match element {
            Element::Image(slot) => Some(slot),
            _ => None,
        })
    }

    /// Every line of text in the page body.
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.elements
            .iter()
            .filter_map(|element| match element {
                Element::Text(block) => Some(block.lines.iter().map(String::as_str)),
                _ => None,
            })
            .flatten()
    }

    /// Placeholder labels drawn on this page.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|element| match element {
            Element::Placeholder { label, .. } => Some(label.as_str()),
            _ => None,
        })
    }
}

/// A page under construction, before the page total is known.
struct Sheet {
    kind: PageKind,
    background: Swatch,
    title: Option<String>,
    footer: bool,
    elements: Vec<Element>,
    notes: LayoutNotes,
}

impl Sheet {
    fn content(kind: PageKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            background: Swatch::Background,
            title: Some(title.into()),
            footer: true,
            elements: Vec::new(),
            notes: LayoutNotes::default(),
        }
    }

    fn full_bleed(kind: PageKind, background: Swatch) -> Self {
        Self {
            kind,
            background,
            title: None,
            footer: false,
            elements: Vec::new(),
            notes: LayoutNotes::default(),
        }
    }

    fn fill(&mut self, rect: Rect, color: Swatch) {
        self.elements.push(Element::Fill { rect, color });
    }

    fn stroke(&mut self, rect: Rect, color: Swatch) {
        self.elements.push(Element::Stroke { rect, color });
    }

    fn text(&mut self, block: TextBlock) {
        self.elements.push(Element::Text(block));
    }

    fn line(&mut self, text: impl Into<String>, x: f64, y: f64, style: TextStyle) {
        self.text(TextBlock::line(text, x, y, style));
    }

    fn placeholder(&mut self, rect: Rect, label: &str) {
        self.elements.push(Element::Placeholder {
            rect,
            label: label.to_owned(),
        });
    }
}

/// Top-to-bottom text flow inside a column. Paragraphs that do not fit are counted, not drawn,
/// and once one paragraph is dropped every following one is dropped too.
struct ColumnFlow {
    x: f64,
    y: f64,
    width: f64,
    bottom: f64,
    elements: Vec<Element>,
    omitted: usize,
    full: bool,
}

impl ColumnFlow {
    fn new(area: Rect) -> Self {
        Self {
            x: area.x,
            y: area.y,
            width: area.width,
            bottom: area.bottom(),
            elements: Vec::new(),
            omitted: 0,
            full: false,
        }
    }

    fn paragraph(&mut self, marker: Option<&str>, text: &str, style: TextStyle, spacing: f64) {
        if self.full {
            self.omitted += 1;
            return;
        }
        let indent = if marker.is_some() { MARKER_INDENT } else { 0.0 };
        let lines = wrap_text(text, self.width - indent, style.size);
        if lines.is_empty() {
            return;
        }
        let block_height = lines.len() as f64 * line_height(style.size);
        if self.y + block_height > self.bottom {
            self.full = true;
            self.omitted += 1;
            return;
        }

        let baseline = self.y + style.size * MM_PER_PT * ASCENT_FACTOR;
        if let Some(marker) = marker {
            self.elements
                .push(Element::Text(TextBlock::line(marker, self.x, baseline, style)));
        }
        self.elements.push(Element::Text(TextBlock::lines(
            lines,
            self.x + indent,
            baseline,
            style,
        )));
        self.y += block_height + spacing;
    }

    fn skip(&mut self, amount: f64) {
        self.y += amount;
    }

    fn finish(self, sheet: &mut Sheet) {
        sheet.elements.extend(self.elements);
        sheet.notes.omitted += self.omitted;
    }
}

/// Keeps at most `max_lines` lines, marking the cut with an ellipsis.
fn clamp_lines(mut lines: Vec<String>, max_lines: usize, width: f64, size: f64) -> Vec<String> {
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = truncate_to_width(&format!("{last}..."), width, size);
        }
    }
    lines
}

fn or_missing(value: &str) -> &str {
    if value.trim().is_empty() {
        MISSING_VALUE
    } else {
        value
    }
}

fn or_zero(value: &str) -> &str {
    if value.trim().is_empty() {
        "0"
    } else {
        value
    }
}

/// Zero counts are good news for a reputation report.
fn count_tone(value: u32) -> Swatch {
    if value == 0 {
        Swatch::Positive
    } else {
        Swatch::Negative
    }
}

fn stripe(index: usize) -> Option<Swatch> {
    (index % 2 == 0).then_some(Swatch::Panel)
}

/// Lays a [`ReportData`] out into fixed-size slide pages.
#[derive(Clone, Debug, Default)]
pub struct LayoutEngine {
    theme: ReportTheme,
}

impl LayoutEngine {
    /// Creates an engine using the given theme.
    pub fn new(theme: ReportTheme) -> Self {
        Self { theme }
    }

    /// The theme the engine lays pages out with.
    pub fn theme(&self) -> &ReportTheme {
        &self.theme
    }

    /// Produces one descriptor per page, numbered against the predicted page total.
    pub fn layout_pages(&self, report: &ReportData) -> Vec<PageDescriptor> {
        let total = predict_total_pages(report);
        let mut sheets = vec![
            self.cover(report),
            self.reputation_status(report),
            self.divider(
                PageKind::ResultsDivider,
                "RESULTS",
                Some("Detailed search analysis and findings"),
            ),
            self.screenshots(
                report,
                PageKind::SearchBefore,
                "GOOGLE SEARCH - BEFORE".to_owned(),
                ScreenshotSlot::Before,
                GridVariant::Before,
            ),
            self.screenshots(
                report,
                PageKind::SearchAfter,
                after_title(&report.update_date),
                ScreenshotSlot::After,
                GridVariant::After,
            ),
            self.screenshots(
                report,
                PageKind::AiBefore,
                "AI RESULT - BEFORE".to_owned(),
                ScreenshotSlot::Before2,
                GridVariant::Before,
            ),
            self.screenshots(
                report,
                PageKind::AiAfter,
                "AI RESULT - AFTER".to_owned(),
                ScreenshotSlot::After2,
                GridVariant::After,
            ),
            self.divider(
                PageKind::AppendixDivider,
                "APPENDIX",
                Some("Supporting data and production details"),
            ),
            self.data_summary(report),
        ];

        if !report.social_media_stats.is_empty() {
            sheets.push(self.social_media_stats(report));
        }
        if !report.counter_content.is_empty() {
            sheets.push(self.counter_content(report));
        }
        if report.content_production.is_some() {
            sheets.push(self.content_production(report));
        }
        for (chunk, links) in chunks(&report.news_production, NEWS_LINKS_PER_PAGE).enumerate() {
            sheets.push(self.news_links(chunk, links));
        }
        for (chunk, links) in
            chunks(&report.social_media_production, SOCIAL_LINKS_PER_PAGE).enumerate()
        {
            sheets.push(self.social_links(chunk, links));
        }
        for (index, image) in report.lampiran_images.iter().enumerate() {
            sheets.push(self.attachment(index, image));
        }

        sheets
            .into_iter()
            .enumerate()
            .map(|(index, sheet)| {
                let number = PageNumber {
                    current: index + 1,
                    total,
                };
                debug!("laid out page {number}: {:?}", sheet.kind);
                self.finish(sheet, number, &report.brand_name)
            })
            .collect()
    }

    fn finish(&self, sheet: Sheet, number: PageNumber, brand: &str) -> PageDescriptor {
        let g = &self.theme.geometry;
        let header_baseline = g.header_height * HEADER_BASELINE;
        let footer_top = g.height - g.footer_height;
        let footer_baseline = footer_top + g.footer_height * FOOTER_BASELINE;
        let header = sheet.title.map(|title| HeaderBar {
            rect: Rect::new(0.0, 0.0, g.width, g.header_height),
            title: TextBlock::line(
                truncate_to_width(&title, g.width - 2.0 * g.margin - PAGE_LABEL_ROOM, 14.0),
                g.margin,
                header_baseline,
                TextStyle::bold(14.0).with_color(Swatch::White),
            ),
        });
        let footer = sheet.footer.then(|| FooterBar {
            rect: Rect::new(0.0, footer_top, g.width, g.footer_height),
            text: TextBlock::line(
                format!(
                    "\u{a9} {} {} - Confidential",
                    self.theme.copyright_year, brand
                ),
                g.margin,
                footer_baseline,
                TextStyle::regular(8.0).with_color(Swatch::White),
            ),
        });
        let page_label = if header.is_some() {
            TextBlock::line(
                number.to_string(),
                g.width - g.margin,
                header_baseline,
                TextStyle::regular(10.0)
                    .with_color(Swatch::White)
                    .aligned(Align::Right),
            )
        } else {
            TextBlock::line(
                number.to_string(),
                g.width - g.margin,
                footer_baseline,
                TextStyle::regular(9.0)
                    .with_color(Swatch::White)
                    .aligned(Align::Right),
            )
        };

        PageDescriptor {
            kind: sheet.kind,
            number,
            background: sheet.background,
            header,
            footer,
            page_label,
            elements: sheet.elements,
            notes: sheet.notes,
        }
    }

    /// Body area below the header, leaving room for a caption above the footer.
    fn content_rect(&self) -> Rect {
        let g = &self.theme.geometry;
        Rect::new(
            g.margin,
            g.header_height + g.body_gap,
            g.width - 2.0 * g.margin,
            g.height - g.header_height - g.footer_height - g.body_gap - g.caption_height,
        )
    }

    /// Everything between the header and the footer, inside the margins.
    fn body_rect(&self) -> Rect {
        let g = &self.theme.geometry;
        let top = g.header_height + g.body_gap;
        Rect::new(
            g.margin,
            top,
            g.width - 2.0 * g.margin,
            g.height - g.footer_height - g.body_gap - top,
        )
    }

    fn cover(&self, report: &ReportData) -> Sheet {
        let g = &self.theme.geometry;
        let center = g.width / 2.0;
        let mut sheet = Sheet::full_bleed(PageKind::Cover, Swatch::Primary);

        sheet.fill(Rect::new(0.0, g.height * 0.4, g.width, 8.0), Swatch::Accent);
        sheet.line(
            report.brand_name.to_uppercase(),
            center,
            60.0,
            TextStyle::bold(18.0)
                .with_color(Swatch::White)
                .aligned(Align::Center),
        );

        let title_width = g.width - 2.0 * g.margin;
        let title_lines = clamp_lines(
            wrap_text(&report.report_title, title_width, 48.0),
            2,
            title_width,
            48.0,
        );
        let title = TextBlock::lines(
            title_lines,
            center,
            g.height / 2.0,
            TextStyle::bold(48.0)
                .with_color(Swatch::White)
                .aligned(Align::Center),
        );
        let last_baseline = title.baseline(title.lines.len().saturating_sub(1));
        sheet.text(title);

        sheet.line(
            COVER_SUBTITLE,
            center,
            last_baseline + 20.0,
            TextStyle::regular(14.0)
                .with_color(Swatch::White)
                .aligned(Align::Center),
        );
        sheet.line(
            format!("Update: {}", or_missing(&report.update_date)),
            center,
            g.height - 40.0,
            TextStyle::regular(12.0)
                .with_color(Swatch::White)
                .aligned(Align::Center),
        );
        sheet
    }

    fn divider(&self, kind: PageKind, title: &str, subtitle: Option<&str>) -> Sheet {
        let g = &self.theme.geometry;
        let center = g.width / 2.0;
        let middle = g.height / 2.0;
        let mut sheet = Sheet::full_bleed(kind, Swatch::Primary);

        sheet.fill(
            Rect::new(center - 40.0, middle - 30.0, 80.0, 4.0),
            Swatch::Accent,
        );
        sheet.line(
            title,
            center,
            middle,
            TextStyle::bold(42.0)
                .with_color(Swatch::White)
                .aligned(Align::Center),
        );
        if let Some(subtitle) = subtitle {
            sheet.line(
                subtitle,
                center,
                middle + 25.0,
                TextStyle::regular(14.0)
                    .with_color(Swatch::White)
                    .aligned(Align::Center),
            );
        }
        sheet
    }

    fn two_columns(&self) -> (Rect, Rect) {
        let g = &self.theme.geometry;
        let body = self.body_rect();
        let width = (g.width - 3.0 * g.margin) / 2.0;
        (
            Rect::new(body.x, body.y, width, body.height),
            Rect::new(body.x + width + g.margin, body.y, width, body.height),
        )
    }

    fn reputation_status(&self, report: &ReportData) -> Sheet {
        let mut sheet = Sheet::content(
            PageKind::ReputationStatus,
            "REPUTATION RECOVERY - CURRENT STATUS",
        );
        let (news, social) = self.two_columns();

        sheet.fill(news, Swatch::Panel);
        sheet.line(
            "NEWS / PEMBERITAAN",
            news.x + 8.0,
            news.y + 12.0,
            TextStyle::bold(13.0).with_color(Swatch::Primary),
        );
        let mut flow = ColumnFlow::new(Rect::new(
            news.x + 8.0,
            news.y + 20.0,
            news.width - 16.0,
            news.height - 26.0,
        ));
        if report.news_bullet_points.is_empty() {
            flow.paragraph(
                None,
                NO_NEWS,
                TextStyle::italic(10.0).with_color(Swatch::TextLight),
                0.0,
            );
        }
        for bullet in &report.news_bullet_points {
            flow.paragraph(Some(BULLET), bullet, TextStyle::regular(10.0), 3.0);
        }
        flow.finish(&mut sheet);

        sheet.fill(social, Swatch::Panel);
        sheet.line(
            "SOCIAL MEDIA",
            social.x + 8.0,
            social.y + 12.0,
            TextStyle::bold(13.0).with_color(Swatch::Primary),
        );

        let inner_x = social.x + 8.0;
        let inner_width = social.width - 16.0;
        let box_width = (inner_width - 6.0) / 2.0;
        let box_height = 28.0;

        let heading = TextStyle::bold(11.0).with_color(Swatch::Primary);
        sheet.line("Aktivitas Akun Lawan", inner_x, social.y + 24.0, heading);
        let boxes_top = social.y + 28.0;
        self.stat_box(
            &mut sheet,
            Rect::new(inner_x, boxes_top, box_width, box_height),
            "Sebelum",
            &report.social_media_account_status_before,
            Swatch::Negative,
        );
        self.stat_box(
            &mut sheet,
            Rect::new(inner_x + box_width + 6.0, boxes_top, box_width, box_height),
            "Sesudah",
            &report.social_media_account_status_after,
            Swatch::Positive,
        );

        let note = report.social_media_account_status_note.trim();
        if !note.is_empty() {
            let style = TextStyle::italic(9.0).with_color(Swatch::TextLight);
            let lines = clamp_lines(wrap_text(note, inner_width, 9.0), 3, inner_width, 9.0);
            sheet.text(TextBlock::lines(
                lines,
                inner_x,
                boxes_top + box_height + 6.0,
                style,
            ));
        }

        let counter_top = social.y + 86.0;
        sheet.line("Aktivitas Counter Kita", inner_x, counter_top, heading);
        self.stat_box(
            &mut sheet,
            Rect::new(inner_x, counter_top + 4.0, box_width, box_height),
            "Total views konten counter",
            &report.social_media_counter_total_views,
            Swatch::Accent,
        );
        self.stat_box(
            &mut sheet,
            Rect::new(
                inner_x + box_width + 6.0,
                counter_top + 4.0,
                box_width,
                box_height,
            ),
            "Total engagement",
            &report.social_media_counter_total_engagement,
            Swatch::Accent,
        );
        sheet
    }

    fn stat_box(&self, sheet: &mut Sheet, rect: Rect, label: &str, value: &str, tone: Swatch) {
        sheet.fill(rect, Swatch::Background);
        sheet.stroke(rect, Swatch::GridLine);
        sheet.line(
            truncate_to_width(label, rect.width - 8.0, 8.0),
            rect.x + 4.0,
            rect.y + 8.0,
            TextStyle::bold(8.0).with_color(Swatch::TextLight),
        );
        sheet.line(
            truncate_to_width(or_missing(value), rect.width - 8.0, 14.0),
            rect.x + 4.0,
            rect.y + 20.0,
            TextStyle::bold(14.0).with_color(tone),
        );
    }

    fn screenshots(
        &self,
        report: &ReportData,
        kind: PageKind,
        title: String,
        slot: ScreenshotSlot,
        variant: GridVariant,
    ) -> Sheet {
        let g = &self.theme.geometry;
        let mut sheet = Sheet::content(kind, title);
        let content = self.content_rect();
        let area = Rect::new(content.x, content.y, content.width, content.height - 20.0);

        let images = report.screenshots(slot);
        if images.is_empty() {
            sheet.placeholder(area, NO_SCREENSHOT);
        } else {
            let drawn = images.len().min(variant.cap());
            let shape = variant.shape(drawn);
            let cells = cell_rects(area, shape, variant.gap());
            for (image, cell) in images.iter().take(drawn).zip(cells) {
                sheet.elements.push(Element::Image(ImageSlot {
                    source: image.clone(),
                    cell,
                    fit: variant.fit(),
                }));
            }
            sheet.notes.grid = Some(GridSummary {
                variant,
                shape,
                drawn,
                dropped: images.len() - drawn,
            });
        }

        sheet.line(
            report.caption(slot),
            g.width / 2.0,
            content.bottom() + g.caption_height * 0.6,
            TextStyle::italic(10.0)
                .with_color(Swatch::TextLight)
                .aligned(Align::Center),
        );
        sheet
    }

    fn data_summary(&self, report: &ReportData) -> Sheet {
        let mut sheet = Sheet::content(PageKind::DataSummary, "DATA SUMMARY");
        let body = self.body_rect();
        let section = TextStyle::bold(12.0).with_color(Swatch::Primary);

        sheet.line("Keyword Analysis", body.x, body.y + 5.0, section);
        let header_row = Rect::new(body.x, body.y + 10.0, body.width, 10.0);
        let columns = header_row.split_columns(&[35.0, 16.25, 16.25, 16.25, 16.25]);
        sheet.fill(header_row, Swatch::Primary);
        let headings = [
            "Keyword",
            "Search (Before)",
            "News (Before)",
            "Search (Current)",
            "News (Current)",
        ];
        let head_style = TextStyle::bold(9.0).with_color(Swatch::White);
        for (column, heading) in columns.iter().zip(headings) {
            sheet.line(heading, column.x + 3.0, header_row.y + 6.5, head_style);
        }

        let row_height = 8.0;
        let rows_top = header_row.bottom();
        if report.keyword_stats.is_empty() {
            sheet.line(
                NO_KEYWORDS,
                body.x + 3.0,
                rows_top + 5.5,
                TextStyle::italic(9.0).with_color(Swatch::TextLight),
            );
        }
        for (index, stat) in report
            .keyword_stats
            .iter()
            .take(KEYWORD_STATS_ROW_CAP)
            .enumerate()
        {
            let row = Rect::new(
                body.x,
                rows_top + index as f64 * row_height,
                body.width,
                row_height,
            );
            if let Some(tint) = stripe(index) {
                sheet.fill(row, tint);
            }
            let baseline = row.y + 5.5;
            sheet.line(
                truncate_to_width(&stat.keyword, columns[0].width - 6.0, 9.0),
                columns[0].x + 3.0,
                baseline,
                TextStyle::regular(9.0),
            );
            let counts = [
                stat.search_before,
                stat.news_before,
                stat.search_current,
                stat.news_current,
            ];
            for (column, count) in columns[1..].iter().zip(counts) {
                sheet.line(
                    count.to_string(),
                    column.x + 3.0,
                    baseline,
                    TextStyle::bold(9.0).with_color(count_tone(count)),
                );
            }
        }
        sheet.notes.omitted = report
            .keyword_stats
            .len()
            .saturating_sub(KEYWORD_STATS_ROW_CAP);

        let production_top = rows_top + KEYWORD_STATS_ROW_CAP as f64 * row_height + 12.0;
        sheet.line("Konten yang diproduksi", body.x, production_top, section);
        let header_row = Rect::new(body.x, production_top + 5.0, body.width, 10.0);
        let value_row = Rect::new(body.x, header_row.bottom(), body.width, 12.0);
        sheet.fill(header_row, Swatch::Accent);
        sheet.fill(value_row, Swatch::Panel);
        let stats = &report.production_stats;
        let cells = [
            ("Views", stats.views.as_str()),
            ("Like", stats.likes.as_str()),
            ("Comment", stats.comments.as_str()),
            ("Saved", stats.saved.as_str()),
            ("Share", stats.shares.as_str()),
        ];
        let columns = header_row.split_columns(&[1.0; 5]);
        for (column, (label, value)) in columns.iter().zip(cells) {
            let center = column.center().x;
            sheet.line(
                label,
                center,
                header_row.y + 6.5,
                head_style.aligned(Align::Center),
            );
            sheet.line(
                truncate_to_width(or_zero(value), column.width - 4.0, 11.0),
                center,
                value_row.y + 8.0,
                TextStyle::bold(11.0).aligned(Align::Center),
            );
        }
        sheet
    }

    fn social_media_stats(&self, report: &ReportData) -> Sheet {
        let mut sheet = Sheet::content(PageKind::SocialMediaStats, "SOCIAL MEDIA STATISTICS");
        let body = self.body_rect();
        let gap = 6.0;
        let rows = (SOCIAL_STATS_CAP + SOCIAL_STATS_COLUMNS - 1) / SOCIAL_STATS_COLUMNS;
        let area = Rect::new(body.x, body.y - 2.0, body.width, body.height + 2.0);
        let cards = cell_rects(area, GridShape::new(SOCIAL_STATS_COLUMNS, rows), gap);

        for (stat, card) in report.social_media_stats.iter().zip(cards) {
            sheet.fill(card, Swatch::Panel);
            let x = card.x + 10.0;
            let half = card.x + card.width / 2.0;
            sheet.line(
                truncate_to_width(or_missing(&stat.platform), card.width - 20.0, 11.0),
                x,
                card.y + 11.0,
                TextStyle::bold(11.0).with_color(Swatch::Primary),
            );
            if !stat.url.is_empty() {
                sheet.line(
                    truncate_to_width(&stat.url, card.width - 20.0, 8.0),
                    x,
                    card.y + 18.0,
                    TextStyle::regular(8.0).with_color(Swatch::Link),
                );
            }
            let figure = TextStyle::regular(9.0);
            let rows = [
                (card.y + 30.0, "Views", stat.views, "Likes", stat.likes),
                (card.y + 40.0, "Comments", stat.comments, "Shares", stat.shares),
            ];
            for (y, left, left_value, right, right_value) in rows {
                sheet.line(
                    format!("{left}: {}", group_thousands(left_value)),
                    x,
                    y,
                    figure,
                );
                sheet.line(
                    format!("{right}: {}", group_thousands(right_value)),
                    half,
                    y,
                    figure,
                );
            }
        }
        sheet.notes.items = report.social_media_stats.len().min(SOCIAL_STATS_CAP);
        sheet.notes.omitted = report.social_media_stats.len().saturating_sub(SOCIAL_STATS_CAP);
        sheet
    }

    fn counter_content(&self, report: &ReportData) -> Sheet {
        let body = self.body_rect();
        let mut sheet = Sheet::content(PageKind::CounterContent, "COUNTER NARRATIVE CONTENT");
        // rows share the body evenly so the last one always ends above the footer
        let pitch = body.height / COUNTER_CONTENT_CAP as f64;
        let text_x = body.x + 50.0;

        for (index, item) in report
            .counter_content
            .iter()
            .take(COUNTER_CONTENT_CAP)
            .enumerate()
        {
            let y = body.y + index as f64 * pitch;
            let badge = Rect::new(body.x, y, 40.0, pitch * 0.65);
            let badge_color = match item.kind {
                CounterContentType::News => Swatch::Accent,
                CounterContentType::Social => Swatch::Positive,
                CounterContentType::Blog => Swatch::Neutral,
            };
            sheet.fill(badge, badge_color);
            sheet.line(
                item.kind.label(),
                badge.center().x,
                y + pitch * 0.45,
                TextStyle::bold(8.0)
                    .with_color(Swatch::White)
                    .aligned(Align::Center),
            );

            let mut title = truncate_chars(&item.title, 60);
            if let Some(date) = item.publish_date.as_deref().filter(|d| !d.trim().is_empty()) {
                title = format!("{title}  ({date})");
            }
            sheet.line(title, text_x, y + pitch * 0.45, TextStyle::regular(10.0));
            sheet.line(
                truncate_chars(&item.url, 50),
                text_x,
                y + pitch * 0.83,
                TextStyle::regular(8.0).with_color(Swatch::Link),
            );
        }
        sheet.notes.items = report.counter_content.len().min(COUNTER_CONTENT_CAP);
        sheet.notes.omitted = report
            .counter_content
            .len()
            .saturating_sub(COUNTER_CONTENT_CAP);
        sheet
    }

    fn content_production(&self, report: &ReportData) -> Sheet {
        let mut sheet = Sheet::content(PageKind::ContentProduction, "PRODUKSI & DISTRIBUSI KONTEN");
        let Some(production) = report.content_production.as_ref() else {
            return sheet;
        };
        let (news, social) = self.two_columns();
        let band = 12.0;
        let body_style = TextStyle::regular(10.0);
        let label_style = TextStyle::bold(10.0).with_color(Swatch::Primary);

        for (column, heading, color) in [
            (news, "News", Swatch::NewsTable),
            (social, "Social Media", Swatch::SocialTable),
        ] {
            sheet.fill(Rect::new(column.x, column.y, column.width, band), color);
            sheet.fill(
                Rect::new(column.x, column.y + band, column.width, column.height - band),
                Swatch::Panel,
            );
            sheet.line(
                heading,
                column.x + 6.0,
                column.y + 8.0,
                TextStyle::bold(12.0).with_color(Swatch::White),
            );
        }

        let inner = |column: Rect| {
            Rect::new(
                column.x + 6.0,
                column.y + band + 6.0,
                column.width - 12.0,
                column.height - band - 10.0,
            )
        };

        let mut flow = ColumnFlow::new(inner(news));
        flow.paragraph(Some("1."), or_missing(&production.news_action), body_style, 4.0);
        flow.paragraph(Some("2."), "Results:", label_style, 2.0);
        for line in non_empty_lines(&production.news_results) {
            flow.paragraph(Some(BULLET), line, body_style, 2.0);
        }
        flow.finish(&mut sheet);

        let mut flow = ColumnFlow::new(inner(social));
        flow.paragraph(Some("1."), or_missing(&production.social_action), body_style, 4.0);
        flow.paragraph(Some("2."), "Results:", label_style, 2.0);
        for line in non_empty_lines(&production.social_results) {
            flow.paragraph(Some(BULLET), line, body_style, 2.0);
        }
        flow.skip(2.0);
        flow.paragraph(Some("3."), "Followup:", label_style, 2.0);
        for line in non_empty_lines(&production.social_followup) {
            flow.paragraph(None, &followup_line(line), body_style, 2.0);
        }
        flow.finish(&mut sheet);
        sheet
    }

    fn news_links(&self, chunk: usize, links: &[ProductionLink]) -> Sheet {
        let mut sheet = Sheet::content(
            PageKind::NewsLinks { chunk },
            continued_title("PRODUCTION RESULTS - NEWS", chunk),
        );
        let body = self.body_rect();
        let header_row = Rect::new(body.x, body.y, body.width, 10.0);
        let columns = header_row.split_columns(&[70.0, 30.0]);
        sheet.fill(header_row, Swatch::NewsTable);
        let head_style = TextStyle::bold(10.0).with_color(Swatch::White);
        sheet.line("Link", columns[0].x + 3.0, header_row.y + 6.5, head_style);
        sheet.line("Media", columns[1].x + 3.0, header_row.y + 6.5, head_style);

        let row_height = 10.0;
        for (index, link) in links.iter().enumerate() {
            let row = Rect::new(
                body.x,
                header_row.bottom() + index as f64 * row_height,
                body.width,
                row_height,
            );
            if let Some(tint) = stripe(index) {
                sheet.fill(row, tint);
            }
            sheet.stroke(row, Swatch::GridLine);
            let baseline = row.y + 6.5;
            sheet.line(
                truncate_to_width(&link.url, columns[0].width - 6.0, 9.0),
                columns[0].x + 3.0,
                baseline,
                TextStyle::regular(9.0).with_color(Swatch::Link),
            );
            let platform = link.platform.as_deref().unwrap_or_default();
            sheet.line(
                truncate_to_width(or_missing(platform), columns[1].width - 6.0, 9.0),
                columns[1].x + 3.0,
                baseline,
                TextStyle::regular(9.0),
            );
        }
        sheet.notes.items = links.len();
        sheet
    }

    fn social_links(&self, chunk: usize, links: &[ProductionLink]) -> Sheet {
        let mut sheet = Sheet::content(
            PageKind::SocialLinks { chunk },
            continued_title("SOCIAL MEDIA PRODUCTION LINKS", chunk),
        );
        let body = self.body_rect();
        let header_row = Rect::new(body.x, body.y, body.width, 10.0);
        let columns = header_row.split_columns(&[1.0; SOCIAL_LINK_COLUMNS]);
        sheet.fill(header_row, Swatch::SocialTable);
        for column in &columns {
            sheet.line(
                "Link",
                column.x + 3.0,
                header_row.y + 6.5,
                TextStyle::bold(10.0).with_color(Swatch::White),
            );
        }

        let rows = SOCIAL_LINKS_PER_PAGE / SOCIAL_LINK_COLUMNS;
        let row_height = (body.height - header_row.height) / rows as f64;
        for (index, link) in links.iter().enumerate() {
            let row = index / SOCIAL_LINK_COLUMNS;
            let column = columns[index % SOCIAL_LINK_COLUMNS];
            let cell = Rect::new(
                column.x,
                header_row.bottom() + row as f64 * row_height,
                column.width,
                row_height,
            );
            if let Some(tint) = stripe(row) {
                sheet.fill(cell, tint);
            }
            sheet.stroke(cell, Swatch::GridLine);
            sheet.line(
                truncate_to_width(&link.url, cell.width - 4.0, 7.0),
                cell.x + 2.0,
                cell.y + row_height / 2.0 + 1.0,
                TextStyle::regular(7.0).with_color(Swatch::Link),
            );
        }
        sheet.notes.items = links.len();
        sheet
    }

    fn attachment(&self, index: usize, image: &ImageRef) -> Sheet {
        let mut sheet = Sheet::content(PageKind::Attachment { index }, "LAMPIRAN");
        sheet.elements.push(Element::Image(ImageSlot {
            source: image.clone(),
            cell: self.body_rect(),
            fit: ImageFit::Contain,
        }));
        sheet.notes.items = 1;
        sheet
    }
}

fn after_title(update_date: &str) -> String {
    let date = update_date.trim();
    if date.is_empty() {
        "AFTER".to_owned()
    } else {
        format!("AFTER - {}", date.to_uppercase())
    }
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Prefixes a follow-up line with `a.` unless it already carries a lettered marker.
fn followup_line(line: &str) -> String {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), Some('.')) if letter.is_ascii_lowercase() => line.to_owned(),
        _ => format!("a. {line}"),
    }
}

/// Lays `report` out with the default theme.
pub fn layout_pages(report: &ReportData) -> Vec<PageDescriptor> {
    LayoutEngine::default().layout_pages(report)
}
