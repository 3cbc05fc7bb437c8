//! Web search contract and negative-keyword analysis.

use log::info;
use serde::{Deserialize, Serialize};

use super::ProviderError;
use crate::error::ReportError;
use crate::model::ReportData;

/// Default number of results requested per keyword and source.
pub const DEFAULT_RESULT_LIMIT: u32 = 10;

/// Where a result came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    #[default]
    GoogleAll,
    GoogleNews,
}

/// Sentiment assigned to a search result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    /// Hits mentioning a negative keyword are negative, everything else neutral.
    pub fn classify(matched_negative_keywords: &[String]) -> Self {
        if matched_negative_keywords.is_empty() {
            Self::Neutral
        } else {
            Self::Negative
        }
    }

    /// Lowercase name, as used in AI prompts and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

/// One analysed search hit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    pub source: SearchSource,
    pub has_negative_keyword: bool,
    pub matched_negative_keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

/// A raw hit as returned by a search backend, before analysis.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawHit {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub markdown: Option<String>,
}

impl SearchResult {
    /// Analyses a raw hit against the monitored negative keywords.
    ///
    /// Title, description and page body are all scanned.
    pub fn from_hit(hit: RawHit, source: SearchSource, negative_keywords: &[String]) -> Self {
        let text = format!(
            "{} {} {}",
            hit.title.as_deref().unwrap_or_default(),
            hit.description.as_deref().unwrap_or_default(),
            hit.markdown.as_deref().unwrap_or_default()
        );
        let matched = detect_negative_keywords(&text, negative_keywords);
        let sentiment = Sentiment::classify(&matched);
        Self {
            url: hit.url,
            title: hit.title.unwrap_or_else(|| "No title".to_owned()),
            description: hit.description.unwrap_or_default(),
            markdown: hit.markdown,
            source,
            has_negative_keyword: sentiment == Sentiment::Negative,
            matched_negative_keywords: matched,
            sentiment: Some(sentiment),
        }
    }

    /// The stored sentiment, neutral when none was assigned.
    pub fn sentiment(&self) -> Sentiment {
        self.sentiment.unwrap_or_default()
    }
}

/// Returns the negative keywords that occur in `text`, case-insensitively, in keyword order.
pub fn detect_negative_keywords(text: &str, negative_keywords: &[String]) -> Vec<String> {
    let haystack = text.to_lowercase();
    negative_keywords
        .iter()
        .filter(|keyword| haystack.contains(&keyword.to_lowercase()))
        .cloned()
        .collect()
}

/// Result counts per search source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceCounts {
    pub google_all: usize,
    pub google_news: usize,
}

/// Aggregate sentiment numbers over a result set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchStats {
    pub total_results: usize,
    pub negative_found: usize,
    pub positive_found: usize,
    pub neutral_found: usize,
    /// 100 means no negative results, 0 means every result is negative.
    pub sentiment_score: u8,
    pub by_source: SourceCounts,
}

impl Default for SearchStats {
    fn default() -> Self {
        Self {
            total_results: 0,
            negative_found: 0,
            positive_found: 0,
            neutral_found: 0,
            sentiment_score: 100,
            by_source: SourceCounts::default(),
        }
    }
}

impl SearchStats {
    /// Aggregates `results`. An empty set scores 100.
    pub fn from_results(results: &[SearchResult]) -> Self {
        let total = results.len();
        let negative = results.iter().filter(|r| r.has_negative_keyword).count();
        let count_source = |source| results.iter().filter(|r| r.source == source).count();
        let sentiment_score = if total == 0 {
            100
        } else {
            ((total - negative) as f64 / total as f64 * 100.0).round() as u8
        };
        Self {
            total_results: total,
            negative_found: negative,
            positive_found: results
                .iter()
                .filter(|r| r.sentiment() == Sentiment::Positive)
                .count(),
            neutral_found: total - negative,
            sentiment_score,
            by_source: SourceCounts {
                google_all: count_source(SearchSource::GoogleAll),
                google_news: count_source(SearchSource::GoogleNews),
            },
        }
    }
}

/// Which result sources to query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchSources {
    pub google_all: bool,
    pub google_news: bool,
}

impl Default for SearchSources {
    fn default() -> Self {
        Self {
            google_all: true,
            google_news: true,
        }
    }
}

/// Parameters of one search run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub sources: SearchSources,
    pub limit: u32,
}

impl SearchRequest {
    /// Builds a request from the keywords of `report`.
    pub fn for_report(
        report: &ReportData,
        sources: SearchSources,
        limit: u32,
    ) -> Result<Self, ReportError> {
        report.validate_for_search()?;
        Ok(Self {
            keywords: report.keywords.clone(),
            negative_keywords: report.negative_keywords.clone(),
            sources,
            limit,
        })
    }
}

/// Wire shape of a search backend response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<SearchResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SearchStats>,
}

impl SearchResponse {
    /// Converts the wire response, recomputing statistics when the backend omitted them.
    pub fn into_outcome(self) -> Result<SearchOutcome, ProviderError> {
        if !self.success {
            return Err(ProviderError::Unavailable(
                self.error.unwrap_or_else(|| "search failed".to_owned()),
            ));
        }
        let results = self.data.ok_or_else(|| {
            ProviderError::InvalidResponse("successful search without result data".to_owned())
        })?;
        let stats = self
            .stats
            .unwrap_or_else(|| SearchStats::from_results(&results));
        Ok(SearchOutcome { results, stats })
    }
}

/// Analysed results of one search run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub stats: SearchStats,
}

impl SearchOutcome {
    /// Wraps `results` together with their statistics.
    pub fn from_results(results: Vec<SearchResult>) -> Self {
        let stats = SearchStats::from_results(&results);
        Self { results, stats }
    }
}

/// A web search backend.
pub trait SearchProvider {
    fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, ProviderError>;
}

/// Runs a search for the keywords of `report` and stores the results in it.
///
/// On any error the report is left untouched. Returns the number of results stored.
pub fn search_report<P>(
    provider: &P,
    report: &mut ReportData,
    sources: SearchSources,
    limit: u32,
) -> Result<usize, ReportError>
where
    P: SearchProvider + ?Sized,
{
    let request = SearchRequest::for_report(report, sources, limit)?;
    let outcome = provider.search(&request)?;
    info!(
        "search returned {} results ({} negative)",
        outcome.stats.total_results, outcome.stats.negative_found
    );
    let count = outcome.results.len();
    report.search_results = outcome.results;
    report.sentiment_stats = outcome.stats;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn negatives() -> Vec<String> {
        vec!["Scam".to_owned(), "lawsuit".to_owned()]
    }

    fn hit(title: &str) -> RawHit {
        RawHit {
            url: format!("https://example.com/{title}"),
            title: Some(title.to_owned()),
            ..RawHit::default()
        }
    }

    #[test]
    fn negative_keywords_match_case_insensitively() {
        let matched = detect_negative_keywords("Acme SCAM and LawSuit news", &negatives());
        assert_eq!(matched, vec!["Scam", "lawsuit"]);
        assert!(detect_negative_keywords("all good", &negatives()).is_empty());
    }

    #[test]
    fn hits_are_classified() {
        let negative = SearchResult::from_hit(hit("acme scam"), SearchSource::GoogleNews, &negatives());
        assert!(negative.has_negative_keyword);
        assert_eq!(negative.sentiment(), Sentiment::Negative);

        let untitled = SearchResult::from_hit(RawHit::default(), SearchSource::GoogleAll, &negatives());
        assert_eq!(untitled.title, "No title");
        assert_eq!(untitled.sentiment(), Sentiment::Neutral);
    }

    #[test]
    fn sentiment_score_rounds() {
        assert_eq!(SearchStats::from_results(&[]).sentiment_score, 100);

        let results: Vec<_> = ["scam", "fine", "ok"]
            .iter()
            .map(|t| SearchResult::from_hit(hit(t), SearchSource::GoogleAll, &negatives()))
            .collect();
        let stats = SearchStats::from_results(&results);
        assert_eq!(stats.total_results, 3);
        assert_eq!(stats.negative_found, 1);
        assert_eq!(stats.neutral_found, 2);
        assert_eq!(stats.sentiment_score, 67);
        assert_eq!(stats.by_source.google_all, 3);
    }

    #[test]
    fn failed_response_becomes_error() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"success":false,"error":"At least one keyword is required"}"#)
                .expect("parse response");
        assert_eq!(
            response.into_outcome(),
            Err(ProviderError::Unavailable(
                "At least one keyword is required".to_owned()
            ))
        );
    }

    struct Failing;

    impl SearchProvider for Failing {
        fn search(&self, _: &SearchRequest) -> Result<SearchOutcome, ProviderError> {
            Err(ProviderError::RateLimited)
        }
    }

    #[test]
    fn search_requires_keywords_and_keeps_report_on_error() {
        let mut report = ReportData::new("Acme");
        let err = search_report(&Failing, &mut report, SearchSources::default(), 10)
            .expect_err("no keywords");
        assert!(matches!(err, ReportError::MissingKeywords));

        report.add_keyword("Acme");
        report.search_results = vec![SearchResult::default()];
        let err = search_report(&Failing, &mut report, SearchSources::default(), 10)
            .expect_err("rate limited");
        assert!(matches!(err, ReportError::Provider(ProviderError::RateLimited)));
        assert_eq!(report.search_results.len(), 1);
    }
}
