//! Per-page capacities shared by the page count predictor and the layout engine.
//!
//! Every grid cap and chunk size lives here and nowhere else. The predictor and the layout
//! engine both read these values, so the `current/total` labels printed on each page always match
//! the pages that are actually emitted.

/// Pages emitted for every report regardless of content: cover, reputation status, results
/// divider, the four screenshot slides, appendix divider and data summary.
pub const FIXED_PAGE_COUNT: usize = 9;

/// Maximum images drawn on a "before" screenshot slide.
pub const BEFORE_GRID_CAP: usize = 6;

/// Maximum images drawn on an "after" screenshot slide.
pub const AFTER_GRID_CAP: usize = 8;

/// The "after" slides always use this many columns.
pub const AFTER_GRID_COLUMNS: usize = 3;

/// News production links per page (two-column table).
pub const NEWS_LINKS_PER_PAGE: usize = 14;

/// Social media production links per page (dense URL grid).
pub const SOCIAL_LINKS_PER_PAGE: usize = 40;

/// Columns of the social media production link grid.
pub const SOCIAL_LINK_COLUMNS: usize = 4;

/// Statistic cards shown on the social media statistics page.
pub const SOCIAL_STATS_CAP: usize = 6;

/// Columns of the statistic card grid.
pub const SOCIAL_STATS_COLUMNS: usize = 2;

/// Rows shown on the counter narrative content page.
pub const COUNTER_CONTENT_CAP: usize = 8;

/// Keyword rows shown in the data summary table.
pub const KEYWORD_STATS_ROW_CAP: usize = 10;

/// Number of pages needed to show `len` items at `capacity` items per page.
///
/// An empty list needs no pages.
pub fn chunk_count(len: usize, capacity: usize) -> usize {
    debug_assert!(capacity > 0, "page capacity must be positive");
    if len == 0 {
        0
    } else {
        (len + capacity - 1) / capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_count_rounds_up() {
        assert_eq!(chunk_count(0, NEWS_LINKS_PER_PAGE), 0);
        assert_eq!(chunk_count(1, NEWS_LINKS_PER_PAGE), 1);
        assert_eq!(chunk_count(14, NEWS_LINKS_PER_PAGE), 1);
        assert_eq!(chunk_count(15, NEWS_LINKS_PER_PAGE), 2);
        assert_eq!(chunk_count(30, NEWS_LINKS_PER_PAGE), 3);
        assert_eq!(chunk_count(81, SOCIAL_LINKS_PER_PAGE), 3);
    }
}
