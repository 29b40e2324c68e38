#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use daily_problems::config::{AppConfig, SelectorConfig, StoreConfig};
use daily_problems::domain::{Category, Difficulty, Problem};
use daily_problems::error::SourceError;
use daily_problems::leetcode::QuestionSource;
use daily_problems::selector::DailySelector;
use daily_problems::store::SqliteProblemStore;
use daily_problems::AppState;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn memory_store() -> Arc<SqliteProblemStore> {
    let cfg = StoreConfig { database_path: ":memory:".into(), ..Default::default() };
    Arc::new(SqliteProblemStore::open(&cfg).expect("in-memory store"))
}

pub fn problem(id: &str) -> Problem {
    Problem {
        id: id.into(),
        title: format!("Problem {id}"),
        difficulty: Difficulty::Medium,
        url: format!("https://leetcode.com/problems/problem-{id}"),
        topics: vec!["Array".into()],
    }
}

pub fn selector(
    store: Arc<SqliteProblemStore>,
    source: Arc<dyn QuestionSource>,
    cfg: SelectorConfig,
) -> DailySelector {
    DailySelector::new(store, source, cfg)
}

pub fn app_state(store: Arc<SqliteProblemStore>, source: Arc<dyn QuestionSource>) -> AppState {
    AppState::new(AppConfig::default(), store, source)
}

/// Replays a fixed queue of results per category and counts calls.
/// An exhausted queue answers `Unavailable`.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<Category, VecDeque<Result<Problem, SourceError>>>>,
    calls: Mutex<HashMap<Category, usize>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(self, category: Category, ids: &[&str]) -> Self {
        for id in ids {
            self.push(category, Ok(problem(id)));
        }
        self
    }

    pub fn push(&self, category: Category, result: Result<Problem, SourceError>) {
        self.scripts.lock().unwrap().entry(category).or_default().push_back(result);
    }

    pub fn calls(&self, category: Category) -> usize {
        self.calls.lock().unwrap().get(&category).copied().unwrap_or(0)
    }
}

#[async_trait]
impl QuestionSource for ScriptedSource {
    async fn fetch_random_problem(&self, category: Category) -> Result<Problem, SourceError> {
        *self.calls.lock().unwrap().entry(category).or_default() += 1;
        self.scripts
            .lock()
            .unwrap()
            .get_mut(&category)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Err(SourceError::Unavailable("script exhausted".into())))
    }
}

/// Cycles through `distinct` ids per category forever: `EASY-0`, `EASY-1`, ...
pub struct CyclingSource {
    distinct: usize,
    counters: Mutex<HashMap<Category, usize>>,
}

impl CyclingSource {
    pub fn new(distinct: usize) -> Self {
        Self { distinct, counters: Mutex::new(HashMap::new()) }
    }

    pub fn calls(&self, category: Category) -> usize {
        self.counters.lock().unwrap().get(&category).copied().unwrap_or(0)
    }
}

#[async_trait]
impl QuestionSource for CyclingSource {
    async fn fetch_random_problem(&self, category: Category) -> Result<Problem, SourceError> {
        let mut counters = self.counters.lock().unwrap();
        let n = counters.entry(category).or_default();
        let id = format!("{}-{}", category, *n % self.distinct);
        *n += 1;
        Ok(problem(&id))
    }
}
