//! Application state: configuration, the problem store and the daily selector.
//!
//! Nothing here caches problems; every read and every selection run goes to the store.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::error::StartupError;
use crate::leetcode::{LeetCode, QuestionSource};
use crate::selector::DailySelector;
use crate::store::{ProblemStore, SqliteProblemStore};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn ProblemStore>,
    pub selector: Arc<DailySelector>,
}

impl AppState {
    /// Wire state from explicit collaborators.
    pub fn new(config: AppConfig, store: Arc<dyn ProblemStore>, source: Arc<dyn QuestionSource>) -> Self {
        let selector = Arc::new(DailySelector::new(store.clone(), source, config.selector.clone()));
        Self { config, store, selector }
    }

    /// Build the SQLite store and the LeetCode client named in the config.
    #[instrument(level = "info", skip_all)]
    pub fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let store = SqliteProblemStore::open(&config.store)?;
        let leetcode = LeetCode::new(&config.leetcode)?;
        info!(
            target: "daily_problems",
            database = %config.store.database_path,
            table = %config.store.table_name,
            graphql_url = %leetcode.graphql_url,
            retry_limit = config.selector.retry_limit,
            require_complete_day = config.selector.require_complete_day,
            "State initialised"
        );
        Ok(Self::new(config, Arc::new(store), Arc::new(leetcode)))
    }
}
