//! AI text generation contract.
//!
//! Two texts are generated from search results: a free-form analysis summary and a short news
//! description that ends up as the bullet list on the reputation status page.

use log::info;
use serde::{Deserialize, Serialize};

use super::search::{SearchResult, SearchStats};
use super::ProviderError;
use crate::error::ReportError;
use crate::model::ReportData;

/// Results included in the prompt context.
pub const CONTEXT_RESULT_LIMIT: usize = 10;

/// Formats the first results as `- <title>: <description> (<sentiment>)` lines.
pub fn results_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .take(CONTEXT_RESULT_LIMIT)
        .map(|result| {
            format!(
                "- {}: {} ({})",
                result.title,
                result.description,
                result.sentiment().as_str()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Input for an analysis summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    /// Pre-formatted result context, see [`results_context`].
    pub search_results: String,
    pub stats: SearchStats,
}

impl SummaryRequest {
    /// Builds a request from the search results stored in `report`.
    pub fn for_report(report: &ReportData) -> Result<Self, ReportError> {
        if report.search_results.is_empty() {
            return Err(ReportError::MissingSearchResults);
        }
        Ok(Self {
            keywords: report.keywords.clone(),
            negative_keywords: report.negative_keywords.clone(),
            search_results: results_context(&report.search_results),
            stats: report.sentiment_stats,
        })
    }
}

/// Input for a news description. Screenshots of the search page may stand in for results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionRequest {
    pub brand_name: String,
    pub keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub search_results: String,
    pub stats: SearchStats,
    /// Inline images as `data:` URLs.
    pub google_screenshots: Vec<String>,
}

impl DescriptionRequest {
    /// Builds a request from `report` plus optional inline screenshots.
    ///
    /// Fails when there are neither search results nor screenshots to describe.
    pub fn for_report(report: &ReportData, screenshots: Vec<String>) -> Result<Self, ReportError> {
        if report.search_results.is_empty() && screenshots.is_empty() {
            return Err(ReportError::MissingSearchResults);
        }
        Ok(Self {
            brand_name: report.brand_name.clone(),
            keywords: report.keywords.clone(),
            negative_keywords: report.negative_keywords.clone(),
            search_results: results_context(&report.search_results),
            stats: report.sentiment_stats,
            google_screenshots: screenshots,
        })
    }
}

/// An AI text generation backend.
pub trait AiTextProvider {
    fn summarize(&self, request: &SummaryRequest) -> Result<String, ProviderError>;

    fn describe(&self, request: &DescriptionRequest) -> Result<String, ProviderError>;
}

fn non_empty(text: String, what: &str) -> Result<String, ProviderError> {
    if text.trim().is_empty() {
        Err(ProviderError::InvalidResponse(format!("no {what} generated")))
    } else {
        Ok(text)
    }
}

/// Stores a generated summary along with the URLs of the results it was based on.
pub fn apply_summary(report: &mut ReportData, summary: String) {
    let sources = report
        .search_results
        .iter()
        .take(CONTEXT_RESULT_LIMIT)
        .map(|result| result.url.clone())
        .filter(|url| !url.is_empty())
        .collect();
    report.ai_summary = Some(summary);
    report.ai_summary_sources = Some(sources);
}

/// Splits a generated description into news bullets.
pub fn apply_description(report: &mut ReportData, description: &str) {
    report.set_news_bullets_from_text(description);
}

/// Generates and stores an analysis summary. The report is untouched on error.
pub fn generate_summary<P>(provider: &P, report: &mut ReportData) -> Result<(), ReportError>
where
    P: AiTextProvider + ?Sized,
{
    let request = SummaryRequest::for_report(report)?;
    let summary = non_empty(provider.summarize(&request)?, "summary")?;
    info!("AI summary generated ({} chars)", summary.len());
    apply_summary(report, summary);
    Ok(())
}

/// Generates a news description and stores it as the news bullets.
pub fn generate_news_description<P>(
    provider: &P,
    report: &mut ReportData,
    screenshots: Vec<String>,
) -> Result<(), ReportError>
where
    P: AiTextProvider + ?Sized,
{
    let request = DescriptionRequest::for_report(report, screenshots)?;
    let description = non_empty(provider.describe(&request)?, "description")?;
    info!(
        "news description generated from {} screenshots",
        request.google_screenshots.len()
    );
    apply_description(report, &description);
    Ok(())
}
