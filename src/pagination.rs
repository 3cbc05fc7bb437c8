//! Page count prediction and list chunking.
//!
//! [`predict_total_pages`] walks the same decisions as [`crate::layout::LayoutEngine`] without
//! computing any geometry. Both sides use [`crate::capacity`] for every size so the two cannot
//! drift apart.

use crate::capacity::{chunk_count, FIXED_PAGE_COUNT, NEWS_LINKS_PER_PAGE, SOCIAL_LINKS_PER_PAGE};
use crate::model::ReportData;

/// Per-section breakdown of the predicted page count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageBudget {
    pub fixed: usize,
    pub social_media_stats: usize,
    pub counter_content: usize,
    pub content_production: usize,
    pub news_links: usize,
    pub social_links: usize,
    pub attachments: usize,
}

impl PageBudget {
    /// Sum of all sections.
    pub fn total(&self) -> usize {
        self.fixed
            + self.social_media_stats
            + self.counter_content
            + self.content_production
            + self.news_links
            + self.social_links
            + self.attachments
    }
}

/// Predicts how many pages each section of `report` will occupy.
pub fn predict_sections(report: &ReportData) -> PageBudget {
    PageBudget {
        fixed: FIXED_PAGE_COUNT,
        social_media_stats: usize::from(!report.social_media_stats.is_empty()),
        counter_content: usize::from(!report.counter_content.is_empty()),
        content_production: usize::from(report.content_production.is_some()),
        news_links: chunk_count(report.news_production.len(), NEWS_LINKS_PER_PAGE),
        social_links: chunk_count(report.social_media_production.len(), SOCIAL_LINKS_PER_PAGE),
        attachments: report.lampiran_images.len(),
    }
}

/// Predicts the total number of pages the layout engine will emit for `report`.
pub fn predict_total_pages(report: &ReportData) -> usize {
    predict_sections(report).total()
}

/// Splits `items` into consecutive chunks of at most `capacity` elements.
///
/// Yields exactly [`chunk_count`] chunks; an empty slice yields none.
pub fn chunks<T>(items: &[T], capacity: usize) -> impl Iterator<Item = &[T]> {
    items.chunks(capacity.max(1))
}

/// Title for the `index`-th page of a paginated section.
pub fn continued_title(base: &str, index: usize) -> String {
    if index == 0 {
        base.to_owned()
    } else {
        format!("{base} (Cont.)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentProduction, ImageRef, ProductionLink, SocialMediaStat};

    #[test]
    fn minimal_report_has_only_fixed_pages() {
        let mut report = ReportData::new("Acme");
        report.add_keyword("Acme");
        assert_eq!(predict_total_pages(&report), 9);
    }

    #[test]
    fn optional_sections_add_pages() {
        let mut report = ReportData::new("Acme");
        report.add_social_media_stat(SocialMediaStat::default());
        report.content_production = Some(ContentProduction::default());
        report.news_production = (0..30).map(|i| ProductionLink::new("t", format!("n{i}"))).collect();
        report.social_media_production =
            (0..41).map(|i| ProductionLink::new("t", format!("s{i}"))).collect();
        report.lampiran_images = vec![ImageRef::resolved("a.png"), ImageRef::resolved("b.png")];

        let budget = predict_sections(&report);
        assert_eq!(budget.social_media_stats, 1);
        assert_eq!(budget.counter_content, 0);
        assert_eq!(budget.content_production, 1);
        assert_eq!(budget.news_links, 3);
        assert_eq!(budget.social_links, 2);
        assert_eq!(budget.attachments, 2);
        assert_eq!(budget.total(), 9 + 1 + 1 + 3 + 2 + 2);
    }

    #[test]
    fn chunks_round_trip() {
        let items: Vec<u32> = (0..31).collect();
        let pieces: Vec<&[u32]> = chunks(&items, 14).collect();
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[2].len(), 3);
        assert_eq!(pieces.concat(), items);
    }

    #[test]
    fn continuation_pages_are_suffixed() {
        assert_eq!(continued_title("NEWS", 0), "NEWS");
        assert_eq!(continued_title("NEWS", 2), "NEWS (Cont.)");
    }
}
