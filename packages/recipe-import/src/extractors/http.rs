//! HTTP extractor: fetch a page and read its schema.org Recipe JSON-LD.
//!
//! Transient transport failures and 429/5xx responses are retried inside
//! the extractor with linear backoff; parse failures are terminal since
//! re-fetching the same markup cannot help.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::ImportError;
use crate::traits::extractor::{ExtractOptions, ExtractOutcome, RecipeExtractor, RetryHook};
use crate::types::partial::PartialExtraction;
use crate::types::recipe::RecipeTimes;

const DEFAULT_USER_AGENT: &str = "recipe-import/0.1 (+https://recipebox.example)";
const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

pub struct HttpRecipeExtractor {
    client: reqwest::Client,
    user_agent: String,
    retry_backoff: Duration,
}

impl HttpRecipeExtractor {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry_backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    async fn fetch_html(&self, url: &str) -> Result<String, ImportError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| ImportError::retry(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            return Err(ImportError::retry(format!(
                "{url} answered {status}, will retry"
            )));
        }
        if !status.is_success() {
            return Err(ImportError::import_failed(format!(
                "{url} answered {status}"
            ))
            .with_suggestion("Check that the URL points to a public recipe page"));
        }

        response
            .text()
            .await
            .map_err(|e| ImportError::retry(format!("reading body from {url} failed: {e}")))
    }

    fn parse_document(&self, html: &str, url: &str) -> ExtractOutcome {
        let Some(node) = find_recipe_json_ld(html) else {
            return ExtractOutcome::Failed(
                ImportError::import_failed(format!("no recipe markup found at {url}"))
                    .with_suggestion("The page may not contain schema.org Recipe data"),
            );
        };

        let mut partial = PartialExtraction::new(url);
        if let Some(title) = node.get("name").and_then(Value::as_str) {
            partial = partial.with_title(title.trim());
        }
        partial = partial
            .with_ingredients(string_list(node.get("recipeIngredient")))
            .with_instructions(instruction_list(node.get("recipeInstructions")))
            .with_times(RecipeTimes {
                prep_minutes: duration_minutes(node.get("prepTime")),
                cook_minutes: duration_minutes(node.get("cookTime")),
                total_minutes: duration_minutes(node.get("totalTime")),
            })
            .detect_missing();

        if partial.is_complete() {
            match partial.into_draft() {
                Some(draft) => ExtractOutcome::Complete(draft),
                // into_draft is None only when fields are missing.
                None => ExtractOutcome::Failed(ImportError::unknown(
                    "extraction produced inconsistent fields",
                )),
            }
        } else {
            debug!(%url, missing = ?partial.missing_fields, "partial extraction");
            ExtractOutcome::Partial(partial)
        }
    }
}

impl Default for HttpRecipeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecipeExtractor for HttpRecipeExtractor {
    async fn extract(
        &self,
        url: &str,
        options: &ExtractOptions,
        on_retry: RetryHook<'_>,
    ) -> Result<ExtractOutcome, ImportError> {
        if Url::parse(url).is_err() {
            return Ok(ExtractOutcome::Failed(
                ImportError::import_failed(format!("not a valid URL: {url}"))
                    .with_suggestion("Provide a full http(s) URL"),
            ));
        }

        let budget = options.max_retries.max(1);
        for attempt in 1..=budget {
            match self.fetch_html(url).await {
                Ok(html) => return Ok(self.parse_document(&html, url)),
                Err(error) if error.is_transient() && attempt < budget => {
                    warn!(%url, attempt, error = %error, "fetch failed, retrying");
                    on_retry(attempt, &error);
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(error) => return Ok(ExtractOutcome::Failed(error.into_terminal())),
            }
        }
        unreachable!("attempt loop always returns")
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Pull the first schema.org Recipe node out of the page's JSON-LD
/// script blocks. Handles top-level objects, arrays, and @graph wrappers.
fn find_recipe_json_ld(html: &str) -> Option<Value> {
    let script_re =
        Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
            .ok()?;

    for capture in script_re.captures_iter(html) {
        let raw = capture.get(1)?.as_str();
        let Ok(value) = serde_json::from_str::<Value>(raw.trim()) else {
            continue;
        };
        if let Some(node) = find_recipe_node(&value) {
            return Some(node.clone());
        }
    }
    None
}

fn find_recipe_node(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(map) => {
            if is_recipe_type(map.get("@type")) {
                return Some(value);
            }
            if let Some(graph) = map.get("@graph") {
                return find_recipe_node(graph);
            }
            None
        }
        Value::Array(items) => items.iter().find_map(find_recipe_node),
        _ => None,
    }
}

fn is_recipe_type(type_field: Option<&Value>) -> bool {
    match type_field {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(items)) => items
            .iter()
            .any(|t| t.as_str().is_some_and(|s| s.eq_ignore_ascii_case("recipe"))),
        _ => false,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// Instructions come as plain strings, HowToStep objects, or HowToSection
/// wrappers with nested steps.
fn instruction_list(value: Option<&Value>) -> Vec<String> {
    let mut steps = Vec::new();
    collect_instructions(value, &mut steps);
    steps
}

fn collect_instructions(value: Option<&Value>, steps: &mut Vec<String>) {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => steps.push(s.trim().to_string()),
        Some(Value::Array(items)) => {
            for item in items {
                collect_instructions(Some(item), steps);
            }
        }
        Some(Value::Object(map)) => {
            if let Some(nested) = map.get("itemListElement") {
                collect_instructions(Some(nested), steps);
            } else if let Some(text) = map.get("text").and_then(Value::as_str) {
                steps.push(text.trim().to_string());
            } else if let Some(name) = map.get("name").and_then(Value::as_str) {
                steps.push(name.trim().to_string());
            }
        }
        _ => {}
    }
}

/// ISO-8601 duration ("PT1H30M") to whole minutes, rounding seconds up.
///
/// Page content is untrusted; durations that do not fit in `u32` minutes
/// are junk and map to `None` rather than wrapping.
fn duration_minutes(value: Option<&Value>) -> Option<u32> {
    let raw = value?.as_str()?;
    let re = Regex::new(r"(?i)^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").ok()?;
    let caps = re.captures(raw.trim())?;

    let group = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    let (days, hours, minutes, seconds) = (group(1), group(2), group(3), group(4));
    let total = days
        .checked_mul(24 * 60)?
        .checked_add(hours.checked_mul(60)?)?
        .checked_add(minutes)?
        .checked_add(seconds.div_ceil(60))?;
    let total = u32::try_from(total).ok()?;
    (total > 0).then_some(total)
}
