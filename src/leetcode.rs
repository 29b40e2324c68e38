//! Question provider client (LeetCode GraphQL).
//!
//! One `randomQuestion` query per attempt. Paid-only results are skipped and the
//! query is repeated, up to a fixed number of attempts.
//! Calls are instrumented and log category, attempt counts and latencies.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::config::LeetCodeConfig;
use crate::domain::{Category, Difficulty, Problem};
use crate::error::SourceError;

const RANDOM_QUESTION_QUERY: &str = r#"query randomQuestion($categorySlug: String, $filters: QuestionListFilterInput) {
  randomQuestion(categorySlug: $categorySlug, filters: $filters) {
    titleSlug
    title
    questionFrontendId
    difficulty
    isPaidOnly
    topicTags {
      name
    }
  }
}"#;

/// Source of random problems for a category.
#[async_trait]
pub trait QuestionSource: Send + Sync {
  /// One free (not paid-only) random problem for `category`.
  async fn fetch_random_problem(&self, category: Category) -> Result<Problem, SourceError>;
}

#[derive(Clone)]
pub struct LeetCode {
  pub client: reqwest::Client,
  pub graphql_url: String,
  pub problem_base_url: String,
  pub max_paid_only_attempts: u32,
}

impl LeetCode {
  pub fn new(cfg: &LeetCodeConfig) -> Result<Self, SourceError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs))
      .build()
      .map_err(|e| SourceError::Unavailable(format!("cannot build HTTP client: {e}")))?;

    Ok(Self {
      client,
      graphql_url: cfg.graphql_url.clone(),
      problem_base_url: cfg.problem_base_url.trim_end_matches('/').to_string(),
      max_paid_only_attempts: cfg.max_paid_only_attempts,
    })
  }

  /// A single `randomQuestion` round trip.
  #[instrument(level = "debug", skip(self), fields(%category))]
  async fn random_question(&self, category: Category) -> Result<RawQuestion, SourceError> {
    let filters = match category.difficulty_filter() {
      Some(d) => json!({ "difficulty": d.as_str() }),
      None => json!({}),
    };
    let req = GraphQlRequest {
      query: RANDOM_QUESTION_QUERY,
      variables: json!({ "categorySlug": "", "filters": filters }),
    };

    let res = self.client.post(&self.graphql_url)
      .header(USER_AGENT, "daily-problems/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(&req).send().await
      .map_err(|e| SourceError::Unavailable(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_graphql_error(&body).unwrap_or(body);
      return Err(SourceError::Unavailable(format!("LeetCode HTTP {}: {}", status, msg)));
    }

    let body: GraphQlResponse = res.json().await
      .map_err(|e| SourceError::Unavailable(format!("JSON parse error: {}", e)))?;
    if let Some(first) = body.errors.first() {
      return Err(SourceError::Unavailable(format!("LeetCode GraphQL error: {}", first.message)));
    }
    body.data
      .and_then(|d| d.random_question)
      .ok_or_else(|| SourceError::Unavailable("response has no randomQuestion".into()))
  }

  fn to_problem(&self, raw: RawQuestion) -> Result<Problem, SourceError> {
    let difficulty: Difficulty = raw.difficulty.parse()
      .map_err(|_| SourceError::Unavailable(format!("unknown difficulty {:?}", raw.difficulty)))?;
    Ok(Problem {
      id: raw.question_frontend_id,
      title: raw.title,
      difficulty,
      url: format!("{}/{}", self.problem_base_url, raw.title_slug),
      topics: raw.topic_tags.into_iter().map(|t| t.name).collect(),
    })
  }
}

#[async_trait]
impl QuestionSource for LeetCode {
  #[instrument(level = "info", skip(self), fields(%category, max_attempts = self.max_paid_only_attempts))]
  async fn fetch_random_problem(&self, category: Category) -> Result<Problem, SourceError> {
    let start = std::time::Instant::now();
    for attempt in 1..=self.max_paid_only_attempts {
      let raw = match self.random_question(category).await {
        Ok(raw) => raw,
        Err(e) => {
          error!(target: "leetcode", %category, attempt, error = %e, "LeetCode: error retrieving question");
          return Err(e);
        }
      };
      if raw.is_paid_only {
        debug!(target: "leetcode", %category, attempt, id = %raw.question_frontend_id, "Skipping paid-only question");
        continue;
      }
      let problem = self.to_problem(raw)?;
      info!(target: "leetcode", %category, attempt, id = %problem.id, elapsed = ?start.elapsed(), "Random question received");
      return Ok(problem);
    }

    warn!(target: "leetcode", %category, attempts = self.max_paid_only_attempts, "Only paid-only questions returned");
    Err(SourceError::NoEligibleResult { attempts: self.max_paid_only_attempts })
  }
}

// --- GraphQL DTOs ---

#[derive(Serialize)]
struct GraphQlRequest {
  query: &'static str,
  variables: Value,
}

#[derive(Deserialize)]
struct GraphQlResponse {
  #[serde(default)] data: Option<RandomQuestionData>,
  #[serde(default)] errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError { message: String }

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RandomQuestionData {
  #[serde(default)] random_question: Option<RawQuestion>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
  title_slug: String,
  title: String,
  question_frontend_id: String,
  difficulty: String,
  is_paid_only: bool,
  #[serde(default)] topic_tags: Vec<TopicTag>,
}

#[derive(Deserialize)]
struct TopicTag { name: String }

/// Try to pull the first GraphQL error message out of an error body.
fn extract_graphql_error(body: &str) -> Option<String> {
  let parsed: GraphQlResponse = serde_json::from_str(body).ok()?;
  parsed.errors.into_iter().next().map(|e| e.message)
}
