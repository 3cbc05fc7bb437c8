//! Error taxonomy shared across the crate.

use crate::providers::ProviderError;
use crate::render::RenderError;
use crate::store::StoreError;

#[cfg(feature = "bookmarks")]
use crate::bookmarks::BookmarkError;

/// Convenience result type for report-level operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Top-level errors surfaced to whoever drives report generation.
///
/// Input validation and collaborator failures carry human-readable messages meant for the end
/// user. [`ReportError::PaginationMismatch`] signals an internal consistency bug and is never
/// expected in practice.
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    /// The brand name is required before a document can be generated.
    #[error("brand name is required")]
    MissingBrandName,

    /// At least one keyword is required before searching.
    #[error("at least one keyword is required")]
    MissingKeywords,

    /// AI text generation needs search results to work from.
    #[error("no search results available to analyse")]
    MissingSearchResults,

    /// The predicted page total disagrees with the pages that were laid out.
    #[error("page count prediction ({predicted}) does not match laid out pages ({laid_out})")]
    PaginationMismatch { predicted: usize, laid_out: usize },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[cfg(feature = "bookmarks")]
    #[error(transparent)]
    Bookmark(#[from] BookmarkError),
}

impl ReportError {
    /// Returns `true` for errors caused by incomplete user input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingBrandName | Self::MissingKeywords | Self::MissingSearchResults
        )
    }
}
