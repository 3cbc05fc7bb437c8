//! Core entry point for the reputation_report crate.
//!
//! A report is described by [`model::ReportData`], laid out into fixed-size slide pages by
//! [`layout::LayoutEngine`] and drawn by [`render::Renderer`]. [`builder::ReportBuilder`] ties the
//! steps together into one atomic "generate" operation.

pub mod builder;
pub mod capacity;
pub mod config;
pub mod error;
pub mod grid;
pub mod layout;
pub mod metrics;
pub mod model;
pub mod pagination;
pub mod providers;
pub mod render;
pub mod store;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use builder::{RenderedReport, ReportBuilder};
pub use config::ReportTheme;
pub use error::ReportError;
pub use layout::{layout_pages, LayoutEngine, PageDescriptor};
pub use model::ReportData;
pub use pagination::predict_total_pages;
