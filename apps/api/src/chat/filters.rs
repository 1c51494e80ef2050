//! Query-filter extraction — turns a free-text job query into structured search constraints.
//!
//! Pure and infallible: a signal that is not present simply leaves its field empty.

use std::sync::LazyLock;

use regex::Regex;

/// The 50 US postal codes recognised as a location constraint.
pub const US_STATES: [&str; 50] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA", "KS",
    "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY",
    "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV",
    "WI", "WY",
];

static STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:{})\b", US_STATES.join("|"))).expect("valid regex")
});

// `under $120k` or `under 95000`. The bare form is not anchored to a word boundary.
static SALARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)under\s*\$?([0-9]{2,3})k|under\s*\$?([0-9]{5,6})").expect("valid regex")
});

/// Structured constraints derived from a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub remote: bool,
    /// Uppercase two-letter postal code.
    pub state: Option<String>,
    /// Upper bound on the advertised maximum salary, in dollars.
    pub salary_cap: Option<u32>,
}

/// Extracts `Filters` from free text.
pub fn extract(text: &str) -> Filters {
    Filters {
        remote: text.to_lowercase().contains("remote"),
        state: detect_state(text),
        salary_cap: detect_salary_cap(text),
    }
}

/// Leftmost standalone postal code in the uppercased text.
fn detect_state(text: &str) -> Option<String> {
    let upper = text.to_uppercase();
    STATE_RE.find(&upper).map(|m| m.as_str().to_string())
}

fn detect_salary_cap(text: &str) -> Option<u32> {
    let caps = SALARY_RE.captures(text)?;

    if let Some(thousands) = caps.get(1) {
        return thousands.as_str().parse::<u32>().ok().map(|n| n * 1000);
    }

    caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok())
}
