//! Daily selection: one eligible problem per category, saved in one write.
//!
//! Each category runs its own fetch-and-filter loop against its own blacklist;
//! the four loops are polled concurrently and joined before the save. A slot
//! that exhausts its retry budget stays empty. A provider outage fails the run
//! and nothing is saved.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::try_join_all;
use tracing::{debug, error, info, instrument, warn};

use crate::config::SelectorConfig;
use crate::domain::{Category, DailyProblemSet, Problem};
use crate::eligibility::is_eligible;
use crate::error::{SelectorError, SourceError};
use crate::leetcode::QuestionSource;
use crate::store::ProblemStore;
use crate::util::window_start;

/// Result of a successful run: what was saved for `date`.
#[derive(Clone, Debug)]
pub struct SelectionOutcome {
    pub date: NaiveDate,
    pub problems: DailyProblemSet,
}

pub struct DailySelector {
    store: Arc<dyn ProblemStore>,
    source: Arc<dyn QuestionSource>,
    cfg: SelectorConfig,
}

impl DailySelector {
    pub fn new(store: Arc<dyn ProblemStore>, source: Arc<dyn QuestionSource>, cfg: SelectorConfig) -> Self {
        Self { store, source, cfg }
    }

    /// Select and save the problem set for `date`. Rerunning a date overwrites its entries.
    #[instrument(level = "info", skip(self), fields(%date))]
    pub async fn run_for_date(&self, date: NaiveDate) -> Result<SelectionOutcome, SelectorError> {
        info!(target: "selector", %date, "Fetching problems for day");

        let picks = try_join_all(Category::ALL.map(|category| self.select_category(date, category))).await?;

        let mut problems = DailyProblemSet::default();
        for (category, problem) in picks {
            problems.set(category, problem);
        }

        let missing = problems.absent();
        if !missing.is_empty() {
            if self.cfg.require_complete_day {
                error!(target: "selector", %date, ?missing, "Day incomplete; nothing saved");
                return Err(SelectorError::IncompleteDay { date, missing });
            }
            warn!(target: "selector", %date, ?missing, "Saving day with empty slots");
        }

        self.store
            .save(date, &problems)
            .await
            .map_err(|source| SelectorError::Store { date, source })?;

        info!(target: "selector", %date, saved = problems.entries().count(), "Successfully saved problems for the day");
        Ok(SelectionOutcome { date, problems })
    }

    /// Fetch until a problem outside the blacklist window shows up, or give up.
    #[instrument(level = "debug", skip(self), fields(%date, %category))]
    async fn select_category(
        &self,
        date: NaiveDate,
        category: Category,
    ) -> Result<(Category, Option<Problem>), SelectorError> {
        let start = window_start(date, self.cfg.window_days);
        let blacklist = self
            .store
            .recent_problem_ids(category, start, date)
            .await
            .map_err(|source| SelectorError::Store { date, source })?;
        debug!(target: "selector", %category, %start, blacklisted = blacklist.len(), "Blacklist window loaded");

        for attempt in 1..=self.cfg.retry_limit {
            match self.source.fetch_random_problem(category).await {
                Ok(problem) if is_eligible(&problem, &blacklist) => {
                    debug!(target: "selector", %category, attempt, id = %problem.id, "Accepted problem");
                    return Ok((category, Some(problem)));
                }
                Ok(problem) => {
                    debug!(target: "selector", %category, attempt, id = %problem.id, "Rejected recently used problem");
                }
                Err(SourceError::NoEligibleResult { attempts }) => {
                    warn!(target: "selector", %date, %category, attempts, "Source found no free problem; leaving slot empty");
                    return Ok((category, None));
                }
                Err(source) => {
                    error!(target: "selector", %date, %category, attempt, error = %source, "Question source failed; aborting day");
                    return Err(SelectorError::Source { date, category, source });
                }
            }
        }

        warn!(target: "selector", %date, %category, retry_limit = self.cfg.retry_limit, "Retry limit reached; leaving slot empty");
        Ok((category, None))
    }
}
