use std::fs;
use std::path::PathBuf;

use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb};
use reputation_report::model::{ImageRef, ScreenshotSlot};
use reputation_report::render::RecordingSurface;
use reputation_report::store::{prepare_for_persistence, FsReportStore, PersistenceStore};
use reputation_report::{ReportBuilder, ReportData};
use uuid::Uuid;

struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new() -> Self {
        Self(std::env::temp_dir().join(format!("rp-report-it-{}", Uuid::new_v4())))
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn png_bytes() -> Vec<u8> {
    let buffer = ImageBuffer::from_pixel(12, 8, Rgb([10u8, 120, 60]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(buffer)
        .write_to(&mut bytes, ImageOutputFormat::Png)
        .expect("encode png");
    bytes
}

#[test]
fn saved_report_round_trips_and_still_renders_its_images() {
    let dir = ScratchDir::new();
    let store = FsReportStore::open(&dir.0).expect("open store");

    let mut report = ReportData::new("Acme");
    report.add_keyword("Acme");
    report.add_screenshot(ScreenshotSlot::Before, ImageRef::pending(png_bytes()));
    report.add_screenshot(ScreenshotSlot::After2, ImageRef::pending(png_bytes()));

    let uploaded = prepare_for_persistence(&mut report, &store).expect("upload images");
    assert_eq!(uploaded, 2);
    // identical bytes share one stored file
    assert_eq!(fs::read_dir(dir.0.join("images")).expect("images dir").count(), 1);

    let stored = store.create(&report).expect("create");
    let loaded = store.get(stored.id).expect("get");
    assert_eq!(loaded.data, report);

    let json = fs::read_to_string(dir.0.join("reports").join(format!("{}.json", stored.id)))
        .expect("record file");
    assert!(json.contains("\"brandName\": \"Acme\""));
    assert!(json.contains("\"createdAt\""));

    let (_, recorded) = ReportBuilder::new()
        .render_with(&loaded.data, RecordingSurface::new())
        .expect("render stored report");
    assert_eq!(recorded[3].images().count(), 1);
    assert_eq!(recorded[6].images().count(), 1);
}

#[test]
fn listing_skips_foreign_files() {
    let dir = ScratchDir::new();
    let store = FsReportStore::open(&dir.0).expect("open store");
    store.create(&ReportData::new("Acme")).expect("create");
    fs::write(dir.0.join("reports").join("notes.txt"), "ignore me").expect("write stray file");
    fs::write(dir.0.join("reports").join("broken.json"), "{").expect("write broken record");

    let listed = store.list().expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].brand_name, "Acme");
}
