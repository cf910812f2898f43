//! Recency classifier: tags a free-text "posted" string as New, Old or Neutral.
//!
//! Rules are case-insensitive and evaluated in order:
//! 1. absent → Neutral
//! 2. immediacy keyword (hour/minute/second/just now/today/yesterday, zh equivalents) → New
//! 3. "N days" / "N天" with N ≤ 7 → New
//! 4. month/year keyword (月/年) → Old
//! 5. "N days" / "N天" with N > 30 → Old
//! 6. otherwise Neutral

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::models::JobListing;

const NEW_MAX_DAYS: u64 = 7;
const OLD_MIN_DAYS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recency {
    New,
    Old,
    Neutral,
}

/// Classification plus the raw posted text, which is always shown when present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecencyBadge {
    pub recency: Recency,
    pub label: Option<String>,
}

fn immediacy_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(hour|minute|second|just now|today|yesterday|小时|分钟|秒|刚刚|今天|昨天)")
            .expect("immediacy pattern is valid")
    })
}

fn days_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s*(day|天)").expect("days pattern is valid"))
}

fn month_year_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(month|year|月|年)").expect("month/year pattern is valid"))
}

/// First "N days" count in the text. Overlong digit runs saturate.
fn day_count(text: &str) -> Option<u64> {
    days_pattern()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
}

pub fn classify(date_text: Option<&str>) -> Recency {
    let Some(text) = date_text else {
        return Recency::Neutral;
    };

    if immediacy_pattern().is_match(text) {
        return Recency::New;
    }

    let days = day_count(text);
    if matches!(days, Some(n) if n <= NEW_MAX_DAYS) {
        return Recency::New;
    }

    if month_year_pattern().is_match(text) {
        return Recency::Old;
    }

    if matches!(days, Some(n) if n > OLD_MIN_DAYS) {
        return Recency::Old;
    }

    Recency::Neutral
}

pub fn badge(date_text: Option<&str>) -> RecencyBadge {
    RecencyBadge {
        recency: classify(date_text),
        label: date_text.map(str::to_string),
    }
}

/// Page-local view of the current result page. Never fetches more pages to
/// backfill hidden listings; order is preserved.
pub fn filter_new_only(jobs: &[JobListing], new_only: bool) -> Vec<&JobListing> {
    jobs.iter()
        .filter(|job| !new_only || classify(job.posted_date.as_deref()) == Recency::New)
        .collect()
}
