//! Data structures describing the content of one reputation report.
//!
//! [`ReportData`] is the canonical in-memory model. It is serialization friendly (camelCase JSON,
//! every field defaulted) so the same value can be produced by a form frontend, persisted by a
//! [`crate::store::PersistenceStore`], or loaded from disk by the CLI. The layout engine only ever
//! borrows it.
//!
//! The mutation helpers on [`ReportData`] are the discrete add/remove/update operations a form
//! controller performs. Removal is always by index and never reorders the remaining elements.

use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::providers::search::{SearchResult, SearchStats};

/// Reference to an image that is drawn somewhere in the report.
///
/// Images either arrive as raw uploads that still need to be converted into an embeddable form
/// ([`ImageRef::Pending`]) or as something the asset resolver can load directly
/// ([`ImageRef::Resolved`]): a `data:` URL, a `file://` URL or a filesystem path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    /// Already resolvable reference. Serialized as a plain JSON string.
    Resolved(String),
    /// Raw upload that has not been converted yet.
    Pending {
        /// Encoded image bytes (PNG, JPEG, ...).
        bytes: Vec<u8>,
        /// Optional media type reported by the uploader.
        #[serde(default, rename = "mediaType", skip_serializing_if = "Option::is_none")]
        media_type: Option<String>,
    },
}

impl ImageRef {
    /// Creates a resolved reference from a URL or path.
    pub fn resolved(url: impl Into<String>) -> Self {
        Self::Resolved(url.into())
    }

    /// Creates a pending reference from raw upload bytes.
    pub fn pending(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Pending {
            bytes: bytes.into(),
            media_type: None,
        }
    }

    /// Returns `true` when the image still needs converting before persistence.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// One row of the keyword statistics table on the data summary page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeywordStat {
    pub keyword: String,
    pub search_before: u32,
    pub news_before: u32,
    pub search_current: u32,
    pub news_current: u32,
}

/// Aggregated production statistics, stored pre-formatted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductionStats {
    pub views: String,
    pub likes: String,
    pub comments: String,
    pub saved: String,
    pub shares: String,
}

impl Default for ProductionStats {
    fn default() -> Self {
        Self {
            views: "0".to_owned(),
            likes: "0".to_owned(),
            comments: "0".to_owned(),
            saved: "0".to_owned(),
            shares: "0".to_owned(),
        }
    }
}

/// Per-platform social media numbers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialMediaStat {
    pub platform: String,
    pub url: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

/// Kind of a counter-narrative content item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterContentType {
    #[default]
    News,
    Social,
    Blog,
}

impl CounterContentType {
    /// Upper-case label printed on the type badge.
    pub fn label(self) -> &'static str {
        match self {
            Self::News => "NEWS",
            Self::Social => "SOCIAL",
            Self::Blog => "BLOG",
        }
    }
}

/// Published counter-narrative content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CounterContentItem {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: CounterContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
}

/// A produced news article or social media post.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductionLink {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl ProductionLink {
    /// Creates a link with the given title and URL.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the platform and returns the updated link.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }
}

/// Selects one of the two paginated link lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
    News,
    Social,
}

/// Free-text summary of the content production effort.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentProduction {
    pub news_action: String,
    /// Newline-delimited result lines.
    pub news_results: String,
    pub social_action: String,
    pub social_results: String,
    pub social_followup: String,
}

/// Captions paired with the four screenshot collections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpCaptions {
    pub before: String,
    pub before2: String,
    pub after: String,
    pub after2: String,
}

impl Default for SerpCaptions {
    fn default() -> Self {
        Self {
            before: "Before: Hasil pencarian sebelum optimasi".to_owned(),
            before2: "Before: Lanjutan hasil pencarian sebelum optimasi".to_owned(),
            after: "After: Hasil pencarian setelah optimasi".to_owned(),
            after2: "After: Lanjutan hasil pencarian setelah optimasi".to_owned(),
        }
    }
}

/// Identifies one of the four screenshot collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScreenshotSlot {
    Before,
    Before2,
    After,
    After2,
}

/// The complete content of one report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportData {
    pub report_title: String,
    pub brand_name: String,
    pub update_date: String,

    pub keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub keyword_stats: Vec<KeywordStat>,
    pub search_results: Vec<SearchResult>,
    pub sentiment_stats: SearchStats,

    pub news_bullet_points: Vec<String>,
    pub social_media_account_status_before: String,
    pub social_media_account_status_after: String,
    pub social_media_account_status_note: String,
    pub social_media_counter_total_views: String,
    pub social_media_counter_total_engagement: String,

    pub serp_screenshot_before: Vec<ImageRef>,
    pub serp_screenshot_before2: Vec<ImageRef>,
    pub serp_screenshot_after: Vec<ImageRef>,
    pub serp_screenshot_after2: Vec<ImageRef>,
    pub serp_captions: SerpCaptions,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_summary_sources: Option<Vec<String>>,

    pub social_media_stats: Vec<SocialMediaStat>,
    pub production_stats: ProductionStats,
    pub counter_content: Vec<CounterContentItem>,
    pub news_production: Vec<ProductionLink>,
    pub social_media_production: Vec<ProductionLink>,
    pub lampiran_images: Vec<ImageRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_production: Option<ContentProduction>,
}

impl Default for ReportData {
    fn default() -> Self {
        Self {
            report_title: "RP REPORT".to_owned(),
            brand_name: String::new(),
            update_date: String::new(),
            keywords: Vec::new(),
            negative_keywords: Vec::new(),
            keyword_stats: Vec::new(),
            search_results: Vec::new(),
            sentiment_stats: SearchStats::default(),
            news_bullet_points: Vec::new(),
            social_media_account_status_before: String::new(),
            social_media_account_status_after: String::new(),
            social_media_account_status_note: String::new(),
            social_media_counter_total_views: String::new(),
            social_media_counter_total_engagement: String::new(),
            serp_screenshot_before: Vec::new(),
            serp_screenshot_before2: Vec::new(),
            serp_screenshot_after: Vec::new(),
            serp_screenshot_after2: Vec::new(),
            serp_captions: SerpCaptions::default(),
            ai_summary: None,
            ai_summary_sources: None,
            social_media_stats: Vec::new(),
            production_stats: ProductionStats::default(),
            counter_content: Vec::new(),
            news_production: Vec::new(),
            social_media_production: Vec::new(),
            lampiran_images: Vec::new(),
            content_production: None,
        }
    }
}

fn remove_at<T>(items: &mut Vec<T>, index: usize) -> Option<T> {
    (index < items.len()).then(|| items.remove(index))
}

fn push_unique(items: &mut Vec<String>, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || items.iter().any(|existing| existing == value) {
        return false;
    }
    items.push(value.to_owned());
    true
}

impl ReportData {
    /// Creates an empty report for the given brand.
    pub fn new(brand_name: impl Into<String>) -> Self {
        Self {
            brand_name: brand_name.into(),
            ..Self::default()
        }
    }

    /// Adds a brand keyword unless it is blank or already present.
    pub fn add_keyword(&mut self, keyword: &str) -> bool {
        push_unique(&mut self.keywords, keyword)
    }

    /// Removes the keyword at `index`, keeping the order of the rest.
    pub fn remove_keyword(&mut self, index: usize) -> Option<String> {
        remove_at(&mut self.keywords, index)
    }

    /// Adds a negative-sentiment keyword unless it is blank or already present.
    pub fn add_negative_keyword(&mut self, keyword: &str) -> bool {
        push_unique(&mut self.negative_keywords, keyword)
    }

    /// Removes the negative keyword at `index`.
    pub fn remove_negative_keyword(&mut self, index: usize) -> Option<String> {
        remove_at(&mut self.negative_keywords, index)
    }

    /// Appends a row to the keyword statistics table.
    pub fn add_keyword_stat(&mut self, stat: KeywordStat) {
        self.keyword_stats.push(stat);
    }

    /// Removes the keyword statistics row at `index`.
    pub fn remove_keyword_stat(&mut self, index: usize) -> Option<KeywordStat> {
        remove_at(&mut self.keyword_stats, index)
    }

    /// Replaces the row at `index`, returning the previous value.
    pub fn update_keyword_stat(&mut self, index: usize, stat: KeywordStat) -> Option<KeywordStat> {
        self.keyword_stats
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, stat))
    }

    /// Appends a platform statistics card.
    pub fn add_social_media_stat(&mut self, stat: SocialMediaStat) {
        self.social_media_stats.push(stat);
    }

    /// Removes the statistics card at `index`.
    pub fn remove_social_media_stat(&mut self, index: usize) -> Option<SocialMediaStat> {
        remove_at(&mut self.social_media_stats, index)
    }

    /// Appends a counter narrative item.
    pub fn add_counter_content(&mut self, item: CounterContentItem) {
        self.counter_content.push(item);
    }

    /// Removes the counter narrative item at `index`.
    pub fn remove_counter_content(&mut self, index: usize) -> Option<CounterContentItem> {
        remove_at(&mut self.counter_content, index)
    }

    /// Returns the link list selected by `kind`.
    pub fn production_links(&self, kind: LinkKind) -> &[ProductionLink] {
        match kind {
            LinkKind::News => &self.news_production,
            LinkKind::Social => &self.social_media_production,
        }
    }

    fn production_links_mut(&mut self, kind: LinkKind) -> &mut Vec<ProductionLink> {
        match kind {
            LinkKind::News => &mut self.news_production,
            LinkKind::Social => &mut self.social_media_production,
        }
    }

    /// Appends a production link to the list selected by `kind`.
    pub fn add_production_link(&mut self, kind: LinkKind, link: ProductionLink) {
        self.production_links_mut(kind).push(link);
    }

    /// Removes the link at `index` from the list selected by `kind`.
    pub fn remove_production_link(&mut self, kind: LinkKind, index: usize) -> Option<ProductionLink> {
        remove_at(self.production_links_mut(kind), index)
    }

    /// Returns the screenshot collection for `slot`.
    pub fn screenshots(&self, slot: ScreenshotSlot) -> &[ImageRef] {
        match slot {
            ScreenshotSlot::Before => &self.serp_screenshot_before,
            ScreenshotSlot::Before2 => &self.serp_screenshot_before2,
            ScreenshotSlot::After => &self.serp_screenshot_after,
            ScreenshotSlot::After2 => &self.serp_screenshot_after2,
        }
    }

    fn screenshots_mut(&mut self, slot: ScreenshotSlot) -> &mut Vec<ImageRef> {
        match slot {
            ScreenshotSlot::Before => &mut self.serp_screenshot_before,
            ScreenshotSlot::Before2 => &mut self.serp_screenshot_before2,
            ScreenshotSlot::After => &mut self.serp_screenshot_after,
            ScreenshotSlot::After2 => &mut self.serp_screenshot_after2,
        }
    }

    /// Appends a screenshot to `slot`. Images render in insertion order.
    pub fn add_screenshot(&mut self, slot: ScreenshotSlot, image: ImageRef) {
        self.screenshots_mut(slot).push(image);
    }

    /// Removes the screenshot at `index` from `slot`.
    pub fn remove_screenshot(&mut self, slot: ScreenshotSlot, index: usize) -> Option<ImageRef> {
        remove_at(self.screenshots_mut(slot), index)
    }

    /// Returns the caption paired with `slot`.
    pub fn caption(&self, slot: ScreenshotSlot) -> &str {
        match slot {
            ScreenshotSlot::Before => &self.serp_captions.before,
            ScreenshotSlot::Before2 => &self.serp_captions.before2,
            ScreenshotSlot::After => &self.serp_captions.after,
            ScreenshotSlot::After2 => &self.serp_captions.after2,
        }
    }

    /// Sets the caption printed under the `slot` slide.
    pub fn set_caption(&mut self, slot: ScreenshotSlot, caption: impl Into<String>) {
        let caption = caption.into();
        match slot {
            ScreenshotSlot::Before => self.serp_captions.before = caption,
            ScreenshotSlot::Before2 => self.serp_captions.before2 = caption,
            ScreenshotSlot::After => self.serp_captions.after = caption,
            ScreenshotSlot::After2 => self.serp_captions.after2 = caption,
        }
    }

    /// Appends an attachment ("lampiran") image. Each one becomes its own page.
    pub fn add_attachment(&mut self, image: ImageRef) {
        self.lampiran_images.push(image);
    }

    /// Removes the attachment at `index`.
    pub fn remove_attachment(&mut self, index: usize) -> Option<ImageRef> {
        remove_at(&mut self.lampiran_images, index)
    }

    /// Replaces the news bullets with the non-empty lines of `text`.
    ///
    /// Leading list markers (`-`, `*`, `•`) are stripped so generated text with or without
    /// markdown bullets ends up in the same shape.
    pub fn set_news_bullets_from_text(&mut self, text: &str) {
        self.news_bullet_points = text
            .lines()
            .map(|line| {
                line.trim()
                    .trim_start_matches(['-', '*', '•'])
                    .trim()
                    .to_owned()
            })
            .filter(|line| !line.is_empty())
            .collect();
    }

    /// Iterates over every image reference in the report, in page order.
    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.serp_screenshot_before
            .iter()
            .chain(&self.serp_screenshot_after)
            .chain(&self.serp_screenshot_before2)
            .chain(&self.serp_screenshot_after2)
            .chain(&self.lampiran_images)
    }

    /// Mutable counterpart of [`ReportData::images`].
    pub fn images_mut(&mut self) -> impl Iterator<Item = &mut ImageRef> {
        self.serp_screenshot_before
            .iter_mut()
            .chain(self.serp_screenshot_after.iter_mut())
            .chain(self.serp_screenshot_before2.iter_mut())
            .chain(self.serp_screenshot_after2.iter_mut())
            .chain(self.lampiran_images.iter_mut())
    }

    /// Checks the fields required before a document can be generated.
    pub fn validate_for_generation(&self) -> Result<(), ReportError> {
        if self.brand_name.trim().is_empty() {
            return Err(ReportError::MissingBrandName);
        }
        Ok(())
    }

    /// Checks the fields required before a keyword search can run.
    pub fn validate_for_search(&self) -> Result<(), ReportError> {
        if self.keywords.is_empty() {
            return Err(ReportError::MissingKeywords);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_trimmed_and_deduplicated() {
        let mut report = ReportData::new("Acme");
        assert!(report.add_keyword(" Acme "));
        assert!(!report.add_keyword("Acme"));
        assert!(!report.add_keyword("   "));
        assert!(report.add_keyword("Acme Corp"));
        assert_eq!(report.keywords, vec!["Acme", "Acme Corp"]);
    }

    #[test]
    fn removal_by_index_keeps_order() {
        let mut report = ReportData::new("Acme");
        for url in ["a", "b", "c", "d"] {
            report.add_production_link(LinkKind::News, ProductionLink::new(url, url));
        }

        let removed = report.remove_production_link(LinkKind::News, 1);
        assert_eq!(removed.map(|link| link.url), Some("b".to_owned()));

        let urls: Vec<_> = report.news_production.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "c", "d"]);
        assert!(report.remove_production_link(LinkKind::News, 10).is_none());
    }

    #[test]
    fn news_bullets_strip_markers_and_blank_lines() {
        let mut report = ReportData::default();
        report.set_news_bullets_from_text("- first\n\n* second\n• third\nfourth  ");
        assert_eq!(
            report.news_bullet_points,
            vec!["first", "second", "third", "fourth"]
        );
    }

    #[test]
    fn generation_requires_brand_name() {
        let report = ReportData::new("  ");
        assert!(matches!(
            report.validate_for_generation(),
            Err(ReportError::MissingBrandName)
        ));
        assert!(matches!(
            report.validate_for_search(),
            Err(ReportError::MissingKeywords)
        ));
    }

    #[test]
    fn json_uses_camel_case_and_plain_url_strings() {
        let mut report = ReportData::new("Acme");
        report.add_screenshot(ScreenshotSlot::Before, ImageRef::resolved("file:///tmp/a.png"));

        let json = serde_json::to_value(&report).expect("serialize report");
        assert_eq!(json["brandName"], "Acme");
        assert_eq!(json["reportTitle"], "RP REPORT");
        assert_eq!(json["serpScreenshotBefore"][0], "file:///tmp/a.png");

        let parsed: ReportData = serde_json::from_value(json).expect("deserialize report");
        assert_eq!(parsed, report);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: ReportData =
            serde_json::from_str(r#"{"brandName":"Acme","keywords":["Acme"]}"#)
                .expect("deserialize partial report");
        assert_eq!(parsed.production_stats.views, "0");
        assert_eq!(parsed.serp_captions, SerpCaptions::default());
        assert!(parsed.content_production.is_none());
    }
}
