//! News provider abstraction and headline sentiment tagging

use super::models::{NewsArticle, NewsQuery, Sentiment};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>>;
}

const POSITIVE_TERMS: &[&str] = &[
    "surge", "surges", "rally", "rallies", "gain", "gains", "jump", "jumps", "soar", "soars",
    "record high", "beat", "beats", "growth", "upgrade", "rebound", "boost", "optimism",
];

const NEGATIVE_TERMS: &[&str] = &[
    "fall", "falls", "drop", "drops", "plunge", "plunges", "slump", "loss", "losses", "decline",
    "declines", "selloff", "sell-off", "recession", "fears", "downgrade", "crash", "layoffs",
];

/// Keyword based sentiment of a headline and its summary.
pub fn tag_sentiment(title: &str, description: &str) -> Sentiment {
    let text = format!("{} {}", title, description).to_lowercase();
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|w| !w.is_empty())
        .collect();
    let joined = words.join(" ");

    let count = |terms: &[&str]| {
        terms
            .iter()
            .filter(|term| {
                if term.contains(' ') {
                    joined.contains(**term)
                } else {
                    words.contains(*term)
                }
            })
            .count()
    };

    let positive = count(POSITIVE_TERMS);
    let negative = count(NEGATIVE_TERMS);
    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}
