//! Listing formatting and the canned pool used by the deterministic fallback.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::search::JobListing;

/// Prefix of every listing line in an answer.
pub const BULLET: &str = "• ";
pub const SEPARATOR: &str = " — ";
/// Number of canned listings in a fallback answer.
pub const FALLBACK_PICKS: usize = 5;
/// Context line handed to the model when the index returned nothing.
pub const NO_MATCHES: &str = "No matches.";

/// One entry of the fixed fallback pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CannedListing {
    pub title: &'static str,
    pub company: &'static str,
    pub location: &'static str,
    pub salary: &'static str,
    pub url: &'static str,
}

impl CannedListing {
    pub fn bullet(&self) -> String {
        format!(
            "{BULLET}{}",
            [self.title, self.company, self.location, self.salary, self.url].join(SEPARATOR)
        )
    }
}

macro_rules! canned {
    ($title:expr, $company:expr, $location:expr, $salary:expr, $slug:expr) => {
        CannedListing {
            title: $title,
            company: $company,
            location: $location,
            salary: $salary,
            url: concat!("https://example.com/", $slug),
        }
    };
}

pub const CANNED_POOL: [CannedListing; 15] = [
    canned!("Frontend Developer", "Skyline Systems", "San Francisco, CA", "$110–135k", "skyline-frontend"),
    canned!("Machine Learning Engineer", "QuantumAI Labs", "Remote", "$120–150k", "quantumai-ml"),
    canned!("DevOps Specialist", "NovaTech", "Austin, TX", "$95–125k", "novatech-devops"),
    canned!("Product Manager", "Orion Health", "Chicago, IL", "$105–140k", "orion-pm"),
    canned!("UX/UI Designer", "PixelWave", "New York, NY", "$85–115k", "pixelwave-ux"),
    canned!("Data Engineer", "BluePeak Analytics", "Denver, CO", "$100–130k", "bluepeak-de"),
    canned!("Cybersecurity Analyst", "Sentinel Group", "Atlanta, GA", "$95–125k", "sentinel-cyber"),
    canned!("Cloud Solutions Architect", "ApexCloud", "Remote", "$125–160k", "apexcloud-arch"),
    canned!("Business Intelligence Analyst", "Horizon Insights", "Seattle, WA", "$90–120k", "horizon-bi"),
    canned!("Software Engineer (Backend)", "TitanTech", "Dallas, TX", "$105–135k", "titantech-backend"),
    canned!("Data Scientist", "Nebula Analytics", "Boston, MA", "$115–145k", "nebula-ds"),
    canned!("Platform Engineer", "VectorWorks", "Remote", "$120–150k", "vectorworks-platform"),
    canned!("Mobile Developer (iOS)", "Firefly Apps", "Los Angeles, CA", "$110–140k", "firefly-ios"),
    canned!("Site Reliability Engineer", "CoreStack", "Phoenix, AZ", "$115–145k", "corestack-sre"),
    canned!("AI Product Analyst", "Lumina Tech", "Remote", "$95–120k", "lumina-analyst"),
];

/// Intro line and closing tip of each fallback template.
pub const FALLBACK_TEMPLATES: [(&str, &str); 3] = [
    (
        "Here are some roles matching your request:",
        "Tip: add specific tools (e.g., SQL, React, Terraform) to narrow results.",
    ),
    (
        "I found a few positions that might fit:",
        "Tip: include a city or 'remote' to refine location.",
    ),
    (
        "Some openings you might like:",
        "Tip: try a salary target like 'under $120k' or 'above $130k'.",
    ),
];

/// Samples `FALLBACK_PICKS` distinct pool entries and wraps them in a random template.
pub fn canned_answer<R: Rng + ?Sized>(rng: &mut R) -> String {
    let picks: Vec<String> = CANNED_POOL
        .choose_multiple(rng, FALLBACK_PICKS)
        .map(CannedListing::bullet)
        .collect();

    // The template array is non-empty, so `choose` always yields.
    let (intro, tip) = FALLBACK_TEMPLATES
        .choose(rng)
        .copied()
        .unwrap_or(FALLBACK_TEMPLATES[0]);

    format!("{intro}\n{}\n\n{tip}", picks.join("\n"))
}

/// One line per listing: title — company — location or Remote — salary — url.
pub fn format_listing(listing: &JobListing) -> String {
    let location = match &listing.location {
        Some(location) if !listing.remote && !location.trim().is_empty() => location.as_str(),
        _ => "Remote",
    };

    let mut segments = vec![listing.title.clone(), listing.company.clone(), location.to_string()];
    if let Some(salary) = listing.salary_max {
        segments.push(format!("up to ${}", group_thousands(salary)));
    }
    segments.push(listing.url.clone());

    format!("{BULLET}{}", segments.join(SEPARATOR))
}

/// Grounding context for the model: one line per listing, or `NO_MATCHES`.
pub fn format_context(listings: &[JobListing]) -> String {
    if listings.is_empty() {
        return NO_MATCHES.to_string();
    }
    listings
        .iter()
        .map(format_listing)
        .collect::<Vec<_>>()
        .join("\n")
}

fn group_thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
