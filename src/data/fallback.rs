//! Built-in news served when every provider in the chain is exhausted.
//!
//! The articles carry a relative-time hint and a category instead of a
//! timestamp and link. The sign-up links tell the reader how to get live
//! news back.

use crate::types::NewsArticle;

/// Provider tag on built-in articles.
pub const FALLBACK_PROVIDER: &str = "fallback";

struct StaticArticle {
    title: &'static str,
    description: &'static str,
    source: &'static str,
    time: &'static str,
    category: &'static str,
}

const FALLBACK_NEWS: &[StaticArticle] = &[
    StaticArticle {
        title: "Nigeria's Tech Sector Attracts Record Foreign Investment",
        description: "Technology and fintech sectors continue to drive economic diversification, with venture capital funding reaching new heights in the digital economy space.",
        source: "Business Day",
        time: "2 hours ago",
        category: "Technology",
    },
    StaticArticle {
        title: "Central Bank Announces New Monetary Policy Framework",
        description: "The Central Bank of Nigeria unveils comprehensive measures to enhance price stability and support sustainable economic growth across key sectors.",
        source: "The Guardian Nigeria",
        time: "5 hours ago",
        category: "Finance",
    },
    StaticArticle {
        title: "Agricultural Exports Show Strong Growth in Q4",
        description: "Non-oil exports, particularly in agriculture and agro-processing, demonstrate robust performance contributing to improved trade balance.",
        source: "Premium Times",
        time: "1 day ago",
        category: "Trade",
    },
    StaticArticle {
        title: "Infrastructure Investment Plan Gains Federal Approval",
        description: "Government approves major infrastructure initiatives aimed at improving transportation networks and energy distribution across economic zones.",
        source: "Nairametrics",
        time: "1 day ago",
        category: "Infrastructure",
    },
    StaticArticle {
        title: "SME Sector Reports Increased Access to Credit Facilities",
        description: "Small and medium enterprises benefit from expanded lending programs, supporting job creation and economic diversification efforts.",
        source: "This Day Live",
        time: "2 days ago",
        category: "Business",
    },
    StaticArticle {
        title: "Digital Banking Services Expand to Rural Communities",
        description: "Mobile banking and digital payment platforms reach underserved areas, promoting financial inclusion and supporting rural economic development.",
        source: "Vanguard",
        time: "2 days ago",
        category: "Banking",
    },
];

/// Where to get a free key for each supported provider.
pub const PROVIDER_SIGNUP_LINKS: &[(&str, &str)] = &[
    ("GNews.io", "https://gnews.io"),
    ("NewsAPI.org", "https://newsapi.org"),
    ("MediaStack.com", "https://mediastack.com"),
];

/// The static fallback articles in the common article shape.
pub fn fallback_articles() -> Vec<NewsArticle> {
    FALLBACK_NEWS
        .iter()
        .map(|a| NewsArticle {
            title: a.title.to_string(),
            description: Some(a.description.to_string()),
            source_name: a.source.to_string(),
            url: None,
            published_at: None,
            time_hint: Some(a.time.to_string()),
            image: None,
            category: Some(a.category.to_string()),
            provider: FALLBACK_PROVIDER.to_string(),
        })
        .collect()
}
