use reputation_report::capacity::{
    AFTER_GRID_CAP, BEFORE_GRID_CAP, FIXED_PAGE_COUNT, NEWS_LINKS_PER_PAGE, SOCIAL_LINKS_PER_PAGE,
};
use reputation_report::grid::Rect;
use reputation_report::layout::{Element, LayoutEngine, PageDescriptor, PageKind, Swatch, TextBlock};
use reputation_report::model::{
    ContentProduction, CounterContentItem, ImageRef, KeywordStat, LinkKind, ProductionLink,
    ReportData, ScreenshotSlot, SocialMediaStat,
};
use reputation_report::pagination::{chunks, predict_sections};
use reputation_report::{layout_pages, predict_total_pages, ReportTheme};

fn base_report() -> ReportData {
    let mut report = ReportData::new("Acme");
    report.add_keyword("Acme");
    report.update_date = "1 Maret 2025".to_owned();
    report
}

fn engine() -> LayoutEngine {
    LayoutEngine::new(ReportTheme::default().with_copyright_year(2025))
}

fn shots(prefix: &str, count: usize) -> Vec<ImageRef> {
    (0..count)
        .map(|i| ImageRef::resolved(format!("file:///shots/{prefix}-{i}.png")))
        .collect()
}

fn links(kind: &str, count: usize) -> Vec<ProductionLink> {
    (0..count)
        .map(|i| ProductionLink::new(format!("{kind} {i}"), format!("https://{kind}.example/{i}")))
        .collect()
}

fn pages_of(pages: &[PageDescriptor], matches: impl Fn(&PageKind) -> bool) -> Vec<&PageDescriptor> {
    pages.iter().filter(|page| matches(&page.kind)).collect()
}

fn text_block<'a>(page: &'a PageDescriptor, first_line: &str) -> &'a TextBlock {
    page.elements
        .iter()
        .find_map(|element| match element {
            Element::Text(block) if block.lines.first().map(String::as_str) == Some(first_line) => {
                Some(block)
            }
            _ => None,
        })
        .unwrap_or_else(|| panic!("no text {first_line:?} on {:?}", page.kind))
}

/// Whether the row holding `first_line` sits on a zebra tint.
fn is_tinted(page: &PageDescriptor, first_line: &str) -> bool {
    let origin = text_block(page, first_line).origin;
    page.elements.iter().any(|element| {
        matches!(element, Element::Fill { rect, color: Swatch::Panel } if rect.contains(origin))
    })
}

/// Builds a report with the optional sections selected by the bits of `mask`.
fn report_for_mask(mask: u32) -> ReportData {
    let mut report = base_report();
    if mask & 1 != 0 {
        report.social_media_stats = (0..3)
            .map(|i| SocialMediaStat {
                platform: format!("Platform {i}"),
                views: 1_000 * (i + 1),
                ..SocialMediaStat::default()
            })
            .collect();
    }
    if mask & 2 != 0 {
        report.counter_content = (0..12)
            .map(|i| CounterContentItem {
                title: format!("Counter {i}"),
                url: format!("https://c.example/{i}"),
                ..CounterContentItem::default()
            })
            .collect();
    }
    if mask & 4 != 0 {
        report.content_production = Some(ContentProduction {
            news_action: "Publikasi artikel".to_owned(),
            ..ContentProduction::default()
        });
    }
    if mask & 8 != 0 {
        report.news_production = links("news", 30);
    }
    if mask & 16 != 0 {
        report.social_media_production = links("social", 41);
    }
    if mask & 32 != 0 {
        report.lampiran_images = shots("lampiran", 2);
    }
    if mask & 64 != 0 {
        report.serp_screenshot_before = shots("before", 9);
        report.serp_screenshot_after2 = shots("after2", 2);
    }
    report
}

#[test]
fn prediction_matches_layout_for_every_section_combination() {
    let engine = engine();
    for mask in 0..128 {
        let report = report_for_mask(mask);
        let pages = engine.layout_pages(&report);
        let predicted = predict_total_pages(&report);
        assert_eq!(pages.len(), predicted, "mask {mask:#09b}");
        for (index, page) in pages.iter().enumerate() {
            assert_eq!(page.number.current, index + 1, "mask {mask:#09b}");
            assert_eq!(page.number.total, predicted, "mask {mask:#09b}");
        }
    }
}

#[test]
fn layout_is_idempotent() {
    let report = report_for_mask(127);
    assert_eq!(layout_pages(&report), layout_pages(&report));
}

#[test]
fn scenario_fixed_pages_only() {
    let report = base_report();
    assert_eq!(predict_total_pages(&report), FIXED_PAGE_COUNT);
    assert_eq!(predict_total_pages(&report), 9);
}

#[test]
fn scenario_thirty_news_links_take_three_pages() {
    let mut report = base_report();
    report.news_production = links("news", 30);
    assert_eq!(predict_sections(&report).news_links, 3);

    let pages = layout_pages(&report);
    let news = pages_of(&pages, |kind| matches!(kind, PageKind::NewsLinks { .. }));
    let counts: Vec<_> = news.iter().map(|page| page.notes.items).collect();
    assert_eq!(counts, vec![14, 14, 2]);
    assert_eq!(news[1].title(), Some("PRODUCTION RESULTS - NEWS (Cont.)"));
}

#[test]
fn scenario_before_grid_drops_past_cap() {
    let mut report = base_report();
    report.serp_screenshot_before = shots("before", 7);
    let pages = layout_pages(&report);
    assert_eq!(pages.len(), FIXED_PAGE_COUNT);

    let before = &pages[3];
    assert_eq!(before.kind, PageKind::SearchBefore);
    assert_eq!(before.images().count(), BEFORE_GRID_CAP);
    let grid = before.notes.grid.expect("grid summary");
    assert_eq!((grid.drawn, grid.dropped), (6, 1));
}

#[test]
fn scenario_empty_link_lists_add_no_pages() {
    let report = base_report();
    let pages = layout_pages(&report);
    assert!(pages_of(&pages, |kind| matches!(
        kind,
        PageKind::NewsLinks { .. } | PageKind::SocialLinks { .. }
    ))
    .is_empty());
    let budget = predict_sections(&report);
    assert_eq!((budget.news_links, budget.social_links), (0, 0));
}

#[test]
fn scenario_attachments_get_one_page_each_in_order() {
    let mut report = base_report();
    report.lampiran_images = shots("lampiran", 3);
    let pages = layout_pages(&report);
    assert_eq!(pages.len(), FIXED_PAGE_COUNT + 3);

    let attachments = pages_of(&pages, |kind| matches!(kind, PageKind::Attachment { .. }));
    let sources: Vec<_> = attachments
        .iter()
        .map(|page| {
            let images: Vec<_> = page.images().collect();
            assert_eq!(images.len(), 1);
            images[0].source.clone()
        })
        .collect();
    assert_eq!(sources, report.lampiran_images);
}

#[test]
fn after_grid_leaves_only_natural_empty_cells() {
    for (count, empty) in [(1, 2), (2, 1), (3, 0), (4, 2), (6, 0), (8, 1)] {
        let mut report = base_report();
        report.serp_screenshot_after = shots("after", count);
        let page = &layout_pages(&report)[4];
        let grid = page.notes.grid.expect("grid summary");
        assert_eq!(grid.shape.columns, 3);
        assert_eq!(page.images().count(), count);
        assert_eq!(grid.shape.capacity() - grid.drawn, empty, "N={count}");
        assert_eq!(page.placeholders().count(), 0, "N={count}");
    }
}

#[test]
fn before_grid_under_cap_draws_every_image() {
    for count in 1..=BEFORE_GRID_CAP {
        let mut report = base_report();
        for image in shots("before2", count) {
            report.add_screenshot(ScreenshotSlot::Before2, image);
        }
        let page = &layout_pages(&report)[5];
        assert_eq!(page.images().count(), count);
        assert_eq!(page.notes.grid.map(|grid| grid.dropped), Some(0));
    }
}

#[test]
fn after_grid_caps_at_eight() {
    let mut report = base_report();
    report.serp_screenshot_after = shots("after", 11);
    let page = &layout_pages(&report)[4];
    assert_eq!(page.images().count(), AFTER_GRID_CAP);
    assert_eq!(page.notes.grid.map(|grid| grid.dropped), Some(3));
}

#[test]
fn chunking_round_trips() {
    for len in [0usize, 1, 13, 14, 15, 28, 29, 40, 41, 95] {
        for capacity in [NEWS_LINKS_PER_PAGE, SOCIAL_LINKS_PER_PAGE] {
            let items: Vec<usize> = (0..len).collect();
            let pieces: Vec<&[usize]> = chunks(&items, capacity).collect();
            let expected_pages = (len + capacity - 1) / capacity;
            assert_eq!(pieces.len(), expected_pages);
            if let Some(last) = pieces.last() {
                assert_eq!(last.len(), len - capacity * (expected_pages - 1));
            }
            let joined: Vec<usize> = pieces.concat();
            assert_eq!(joined, items);
        }
    }
}

#[test]
fn single_link_gives_single_page() {
    let mut report = base_report();
    report.add_production_link(LinkKind::Social, ProductionLink::new("Post", "https://s/1"));
    let pages = layout_pages(&report);
    let social = pages_of(&pages, |kind| matches!(kind, PageKind::SocialLinks { .. }));
    assert_eq!(social.len(), 1);
    assert_eq!(social[0].notes.items, 1);
    assert_eq!(pages.len(), FIXED_PAGE_COUNT + 1);
}

#[test]
fn theme_geometry_flows_into_descriptors() {
    let mut theme = ReportTheme::default().with_copyright_year(2025);
    theme.geometry.header_height = 30.0;
    let pages = LayoutEngine::new(theme).layout_pages(&base_report());
    let header = pages[1].header.as_ref().expect("header");
    assert_eq!(header.rect.height, 30.0);
}

#[test]
fn data_tables_tint_even_rows_only() {
    let mut report = base_report();
    for i in 0..7 {
        report.add_keyword_stat(KeywordStat {
            keyword: format!("kw{i}"),
            ..KeywordStat::default()
        });
    }
    report.news_production = links("news", 5);
    report.social_media_production = links("social", 12);
    let pages = layout_pages(&report);

    let summary = pages_of(&pages, |kind| *kind == PageKind::DataSummary)[0];
    for i in 0..7 {
        assert_eq!(is_tinted(summary, &format!("kw{i}")), i % 2 == 0, "keyword row {i}");
    }

    let news = pages_of(&pages, |kind| matches!(kind, PageKind::NewsLinks { .. }))[0];
    for i in 0..5 {
        let url = format!("https://news.example/{i}");
        assert_eq!(is_tinted(news, &url), i % 2 == 0, "news row {i}");
    }

    // social links fill four cells per row, so tints alternate every four links
    let social = pages_of(&pages, |kind| matches!(kind, PageKind::SocialLinks { .. }))[0];
    for i in 0..12 {
        let url = format!("https://social.example/{i}");
        assert_eq!(is_tinted(social, &url), (i / 4) % 2 == 0, "social link {i}");
    }
}

#[test]
fn news_bullets_flow_downwards_without_overlap() {
    let mut report = base_report();
    report.set_news_bullets_from_text(
        "- Pemberitaan negatif turun drastis setelah publikasi klarifikasi resmi di media nasional\n\
         - Artikel positif naik\n\
         - Tiga portal besar memuat ulang pernyataan perusahaan dengan judul yang lebih netral dan seimbang\n\
         - Sentimen stabil",
    );
    let pages = layout_pages(&report);
    let status = &pages[1];
    assert_eq!(status.kind, PageKind::ReputationStatus);

    let bodies: Vec<&TextBlock> = report
        .news_bullet_points
        .iter()
        .map(|bullet| {
            let first_word = bullet.split_whitespace().next().expect("word");
            status
                .elements
                .iter()
                .find_map(|element| match element {
                    Element::Text(block)
                        if block.lines.first().is_some_and(|line| line.starts_with(first_word)) =>
                    {
                        Some(block)
                    }
                    _ => None,
                })
                .expect("bullet text")
        })
        .collect();
    assert!(bodies.iter().any(|block| block.lines.len() > 1), "expected a wrapped bullet");

    for pair in bodies.windows(2) {
        let previous_last = pair[0].baseline(pair[0].lines.len() - 1);
        assert!(
            pair[1].origin.y >= previous_last + pair[0].line_height,
            "bullet at {} overlaps the one ending at {previous_last}",
            pair[1].origin.y
        );
    }
    assert_eq!(status.notes.omitted, 0);
}

#[test]
fn custom_geometry_moves_bars_and_rows() {
    let mut theme = ReportTheme::default().with_copyright_year(2025);
    theme.geometry.header_height = 40.0;
    theme.geometry.footer_height = 20.0;
    theme.geometry.margin = 25.0;

    let mut report = base_report();
    report.counter_content = (0..8)
        .map(|i| CounterContentItem {
            title: format!("Counter {i}"),
            url: format!("https://c.example/{i}"),
            ..CounterContentItem::default()
        })
        .collect();
    let pages = LayoutEngine::new(theme.clone()).layout_pages(&report);
    let g = theme.geometry;
    let footer_top = g.height - g.footer_height;

    for page in &pages {
        if let Some(header) = &page.header {
            assert!(header.rect.contains(header.title.origin), "{:?}", page.kind);
            assert!(header.rect.contains(page.page_label.origin), "{:?}", page.kind);
            assert_eq!(header.title.origin.x, g.margin);
        }
        if let Some(footer) = &page.footer {
            assert!(footer.rect.contains(footer.text.origin), "{:?}", page.kind);
        }
    }

    let counter = pages_of(&pages, |kind| *kind == PageKind::CounterContent)[0];
    let body = Rect::new(
        g.margin,
        g.header_height,
        g.width - 2.0 * g.margin,
        footer_top - g.header_height,
    );
    for element in &counter.elements {
        match element {
            Element::Fill { rect, .. } => {
                assert!(rect.y >= g.header_height && rect.bottom() <= footer_top, "{rect:?}");
                assert!(rect.x >= g.margin, "{rect:?}");
            }
            Element::Text(block) => assert!(body.contains(block.origin), "{:?}", block.lines),
            _ => {}
        }
    }

    let before = &pages[3];
    assert_eq!(before.placeholders().collect::<Vec<_>>(), vec!["No screenshot uploaded"]);
    let placeholder = before
        .elements
        .iter()
        .find_map(|element| match element {
            Element::Placeholder { rect, .. } => Some(*rect),
            _ => None,
        })
        .expect("empty slot placeholder");
    assert_eq!(placeholder.x, g.margin);
    assert!(placeholder.y > g.header_height);
    assert!(placeholder.bottom() < footer_top);
}
