//! Answer composition — orchestrates the chat pipeline.
//!
//! Flow: trim → empty check → extract filters → (grounded) search → compose.
//!
//! The operating mode is fixed at construction by which collaborators are injected:
//! grounded when both search and generation are present, fallback otherwise.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::chat::filters::extract;
use crate::chat::listings::{canned_answer, format_context};
use crate::chat::prompts::{grounded_prompt, suggestion_prompt};
use crate::errors::AppError;
use crate::llm_client::{LlmError, TextGenerator};
use crate::search::{JobListing, JobSearch};

/// Answer for an empty or whitespace-only message.
pub const EMPTY_MESSAGE_ANSWER: &str =
    "Please type something like: Find me software engineering internships in New York.";

/// Default bound on the fallback-mode generation call.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(20);

/// Source of randomness for the deterministic fallback. A fresh RNG is built per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Entropy {
    #[default]
    Os,
    Seeded(u64),
}

impl Entropy {
    pub fn rng(&self) -> StdRng {
        match self {
            Entropy::Os => StdRng::from_os_rng(),
            Entropy::Seeded(seed) => StdRng::seed_from_u64(*seed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Grounded,
    Fallback,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Grounded => "grounded",
            Mode::Fallback => "fallback",
        }
    }
}

/// Produces the final answer for a chat message.
///
/// Holds only immutable handles and is shared across requests behind an `Arc`.
#[derive(Clone)]
pub struct Composer {
    search: Option<Arc<dyn JobSearch>>,
    generator: Option<Arc<dyn TextGenerator>>,
    entropy: Entropy,
    generation_timeout: Duration,
}

impl Composer {
    pub fn new(
        search: Option<Arc<dyn JobSearch>>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            search,
            generator,
            entropy: Entropy::default(),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    pub fn with_entropy(mut self, entropy: Entropy) -> Self {
        self.entropy = entropy;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn mode(&self) -> Mode {
        match (&self.search, &self.generator) {
            (Some(_), Some(_)) => Mode::Grounded,
            _ => Mode::Fallback,
        }
    }

    /// Full pipeline for one inbound message.
    pub async fn answer(&self, message: &str) -> Result<String, AppError> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(EMPTY_MESSAGE_ANSWER.to_string());
        }

        let filters = extract(message);
        debug!(mode = self.mode().as_str(), ?filters, "composing answer");

        match (&self.search, self.mode()) {
            (Some(search), Mode::Grounded) => {
                let listings = search.search(message, &filters).await?;
                self.compose(message, Some(&listings)).await
            }
            _ => self.compose(message, None).await,
        }
    }

    /// Composes from search results (`Some`, grounded) or without them (`None`, fallback).
    pub async fn compose(
        &self,
        query: &str,
        listings: Option<&[JobListing]>,
    ) -> Result<String, AppError> {
        match (listings, &self.generator) {
            (Some(listings), Some(generator)) => {
                let prompt = grounded_prompt(query, &format_context(listings));
                Ok(generator.generate(&prompt, None).await?)
            }
            _ => Ok(self.fallback(query).await),
        }
    }

    async fn fallback(&self, query: &str) -> String {
        if let Some(generator) = &self.generator {
            let prompt = suggestion_prompt(query);
            match generator
                .generate(&prompt, Some(self.generation_timeout))
                .await
            {
                Ok(text) if !text.trim().is_empty() => return text.trim().to_string(),
                Ok(_) => debug!("generation returned blank text, using canned listings"),
                Err(e) => log_recovered(&e),
            }
        }

        canned_answer(&mut self.entropy.rng())
    }
}

fn log_recovered(err: &LlmError) {
    let kind = match err {
        LlmError::Timeout => "timeout",
        LlmError::Auth { .. } => "auth",
        LlmError::Quota { .. } => "quota",
        LlmError::Http(_) => "transport",
        LlmError::Api { .. } => "api",
        LlmError::Parse(_) => "malformed",
        LlmError::EmptyContent => "empty",
    };
    debug!(kind, error = %err, "generation failed, using canned listings");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::chat::filters::Filters;
    use crate::chat::listings::{BULLET, CANNED_POOL, FALLBACK_PICKS, NO_MATCHES};
    use crate::search::SearchError;

    enum Reply {
        Text(&'static str),
        Fail(fn() -> LlmError),
    }

    struct FakeGenerator {
        reply: Reply,
        calls: AtomicUsize,
        prompts: Mutex<Vec<(String, Option<Duration>)>>,
    }

    impl FakeGenerator {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().unwrap().0.clone()
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(
            &self,
            prompt: &str,
            timeout: Option<Duration>,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), timeout));
            match &self.reply {
                Reply::Text(text) => Ok(text.to_string()),
                Reply::Fail(make) => Err(make()),
            }
        }
    }

    struct FakeSearch {
        listings: Option<Vec<JobListing>>,
        calls: AtomicUsize,
        filters: Mutex<Option<Filters>>,
    }

    impl FakeSearch {
        fn returning(listings: Vec<JobListing>) -> Arc<Self> {
            Arc::new(Self {
                listings: Some(listings),
                calls: AtomicUsize::new(0),
                filters: Mutex::new(None),
            })
        }

        fn unreachable() -> Arc<Self> {
            Arc::new(Self {
                listings: None,
                calls: AtomicUsize::new(0),
                filters: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl JobSearch for FakeSearch {
        async fn search(
            &self,
            _text: &str,
            filters: &Filters,
        ) -> Result<Vec<JobListing>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.filters.lock().unwrap() = Some(filters.clone());
            self.listings.clone().ok_or(SearchError::Api {
                status: 503,
                message: "unavailable".to_string(),
            })
        }
    }

    fn job(title: &str) -> JobListing {
        JobListing {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: Some("Austin, TX".to_string()),
            remote: false,
            state: Some("TX".to_string()),
            salary_max: Some(110_000),
            url: "https://example.com/acme".to_string(),
        }
    }

    fn assert_canned(answer: &str) {
        let bullets: Vec<&str> = answer.lines().filter(|l| l.starts_with(BULLET)).collect();
        assert_eq!(bullets.len(), FALLBACK_PICKS);
        let pool: Vec<String> = CANNED_POOL.iter().map(|c| c.bullet()).collect();
        assert!(bullets.iter().all(|b| pool.iter().any(|p| p == b)));
    }

    #[tokio::test]
    async fn test_empty_message_skips_collaborators() {
        let generator = FakeGenerator::new(Reply::Text("should not be used"));
        let search = FakeSearch::returning(vec![job("Analyst")]);
        let composer = Composer::new(Some(search.clone()), Some(generator.clone()));

        for message in ["", "   ", "\n\t "] {
            let answer = composer.answer(message).await.unwrap();
            assert_eq!(answer, EMPTY_MESSAGE_ANSWER);
        }
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_mode_selection() {
        let generator = FakeGenerator::new(Reply::Text("x"));
        let search = FakeSearch::returning(vec![]);

        assert_eq!(Composer::new(None, None).mode(), Mode::Fallback);
        assert_eq!(
            Composer::new(None, Some(generator.clone())).mode(),
            Mode::Fallback
        );
        assert_eq!(
            Composer::new(Some(search.clone()), None).mode(),
            Mode::Fallback
        );
        assert_eq!(
            Composer::new(Some(search), Some(generator)).mode(),
            Mode::Grounded
        );
    }

    #[tokio::test]
    async fn test_fallback_without_generator_uses_canned_pool() {
        let composer = Composer::new(None, None).with_entropy(Entropy::Seeded(3));
        let answer = composer.answer("data jobs").await.unwrap();
        assert_canned(&answer);
    }

    #[tokio::test]
    async fn test_fallback_seeded_answer_is_exact() {
        let composer = Composer::new(None, None).with_entropy(Entropy::Seeded(42));
        let expected = canned_answer(&mut StdRng::seed_from_u64(42));
        assert_eq!(composer.answer("data jobs").await.unwrap(), expected);
        assert_eq!(composer.answer("data jobs").await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_fallback_returns_generated_text_trimmed() {
        let generator = FakeGenerator::new(Reply::Text("\n• Generated job\n\nTip: be specific  "));
        let composer = Composer::new(None, Some(generator.clone()))
            .with_generation_timeout(Duration::from_secs(5));

        let answer = composer.answer("cloud engineer in Dallas").await.unwrap();
        assert_eq!(answer, "• Generated job\n\nTip: be specific");

        let (prompt, timeout) = generator.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("cloud engineer in Dallas"));
        assert_eq!(timeout, Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_fallback_recovers_from_every_failure_kind() {
        let failures: [fn() -> LlmError; 6] = [
            || LlmError::Timeout,
            || LlmError::Auth { status: 401 },
            || LlmError::Quota {
                message: "exhausted".to_string(),
            },
            || LlmError::Api {
                status: 500,
                message: "oops".to_string(),
            },
            || LlmError::Parse("bad json".to_string()),
            || LlmError::EmptyContent,
        ];

        for make in failures {
            let generator = FakeGenerator::new(Reply::Fail(make));
            let composer = Composer::new(None, Some(generator.clone()));
            let answer = composer.answer("remote analyst").await.unwrap();
            assert_canned(&answer);
            assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_fallback_blank_generation_uses_canned_pool() {
        let generator = FakeGenerator::new(Reply::Text("   "));
        let composer = Composer::new(None, Some(generator));
        assert_canned(&composer.answer("analyst").await.unwrap());
    }

    #[tokio::test]
    async fn test_search_without_generator_is_not_called() {
        let search = FakeSearch::returning(vec![job("Analyst")]);
        let composer = Composer::new(Some(search.clone()), None);
        assert_canned(&composer.answer("analyst").await.unwrap());
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_grounded_passes_filters_and_listings() {
        let generator = FakeGenerator::new(Reply::Text("Here is the Analyst role at Acme."));
        let search = FakeSearch::returning(vec![job("Data Analyst"), job("BI Analyst")]);
        let composer = Composer::new(Some(search.clone()), Some(generator.clone()));

        let answer = composer
            .answer("  remote analyst roles, tx, under $120k ")
            .await
            .unwrap();
        assert_eq!(answer, "Here is the Analyst role at Acme.");

        let filters = search.filters.lock().unwrap().clone().unwrap();
        assert!(filters.remote);
        assert_eq!(filters.state.as_deref(), Some("TX"));
        assert_eq!(filters.salary_cap, Some(120_000));

        let prompt = generator.last_prompt();
        assert!(prompt.contains("User asked: \"remote analyst roles, tx, under $120k\""));
        assert!(prompt.contains("• Data Analyst — Acme — Austin, TX — up to $110,000"));
        assert!(prompt.contains("• BI Analyst — Acme"));
        assert_eq!(generator.prompts.lock().unwrap()[0].1, None);
    }

    #[tokio::test]
    async fn test_grounded_returns_generated_text_verbatim() {
        let generator = FakeGenerator::new(Reply::Text("\n  • Data Analyst at Acme\n\n"));
        let search = FakeSearch::returning(vec![job("Data Analyst")]);
        let composer = Composer::new(Some(search), Some(generator));

        let answer = composer.answer("analyst").await.unwrap();
        assert_eq!(answer, "\n  • Data Analyst at Acme\n\n");
    }

    #[tokio::test]
    async fn test_grounded_no_matches_still_calls_generator() {
        let generator = FakeGenerator::new(Reply::Text("No roles matched; try widening the state."));
        let search = FakeSearch::returning(vec![]);
        let composer = Composer::new(Some(search), Some(generator.clone()));

        let answer = composer.answer("underwater welder").await.unwrap();
        assert!(!answer.is_empty());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert!(generator.last_prompt().contains(NO_MATCHES));
    }

    #[tokio::test]
    async fn test_grounded_search_failure_is_fatal() {
        let generator = FakeGenerator::new(Reply::Text("unused"));
        let composer = Composer::new(Some(FakeSearch::unreachable()), Some(generator.clone()));

        let err = composer.answer("analyst").await.unwrap_err();
        assert!(matches!(err, AppError::Search(_)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_grounded_generation_failure_surfaces() {
        let generator = FakeGenerator::new(Reply::Fail(|| LlmError::Auth { status: 403 }));
        let search = FakeSearch::returning(vec![job("Analyst")]);
        let composer = Composer::new(Some(search), Some(generator));

        let err = composer.answer("analyst").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::Auth { status: 403 })));
    }

    #[tokio::test]
    async fn test_compose_without_listings_is_fallback() {
        let composer = Composer::new(None, None).with_entropy(Entropy::Seeded(1));
        let answer = composer.compose("anything", None).await.unwrap();
        assert_canned(&answer);
    }
}
