//! Problem persistence.
//!
//! Rows are keyed like a partition/sort table: `pk = "PROBLEM_" + CATEGORY`,
//! `sk = date` in a sortable format. A day's set is written in one transaction,
//! reads are point lookups per category, and the dedup window is a range query
//! on one partition.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, error, info, instrument};

use crate::config::StoreConfig;
use crate::domain::{Category, DailyProblemSet, Problem};
use crate::error::StoreError;

/// Storage contract used by the selector and the read endpoint.
#[async_trait]
pub trait ProblemStore: Send + Sync {
    /// Write every present entry of `problems` for `date` atomically: all or nothing.
    async fn save(&self, date: NaiveDate, problems: &DailyProblemSet) -> Result<(), StoreError>;

    /// One point lookup per category. Missing rows come back as `None`.
    async fn get_daily_problems(&self, date: NaiveDate) -> Result<DailyProblemSet, StoreError>;

    /// Ids stored for `category` between `start` and `end`, both inclusive.
    async fn recent_problem_ids(
        &self,
        category: Category,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashSet<String>, StoreError>;
}

/// SQLite-backed store. The connection is shared behind a mutex and every call
/// runs on the blocking pool.
#[derive(Clone)]
pub struct SqliteProblemStore {
    conn: Arc<Mutex<Connection>>,
    table: Arc<str>,
    date_key_format: Arc<str>,
}

type RawRow = (String, String, String, String, String);

impl SqliteProblemStore {
    /// Open (or create) the database file named in the config and ensure the table exists.
    pub fn open(cfg: &StoreConfig) -> Result<Self, StoreError> {
        let conn = if cfg.database_path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = Path::new(&cfg.database_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        StoreError::InvalidConfig(format!(
                            "cannot create directory {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
            }
            Connection::open(&cfg.database_path)?
        };
        Self::from_connection(conn, cfg)
    }

    /// Wrap an existing connection; `cfg.database_path` is ignored.
    pub fn from_connection(conn: Connection, cfg: &StoreConfig) -> Result<Self, StoreError> {
        validate_table_name(&cfg.table_name)?;
        validate_date_key_format(&cfg.date_key_format)?;

        conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS {table} (
                pk TEXT NOT NULL,
                sk TEXT NOT NULL,
                problem_id TEXT NOT NULL,
                title TEXT NOT NULL,
                url TEXT NOT NULL,
                difficulty TEXT NOT NULL,
                topics TEXT NOT NULL,
                PRIMARY KEY (pk, sk)
            );
            ",
            table = cfg.table_name
        ))?;

        info!(target: "store", table = %cfg.table_name, "Problem store ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            table: cfg.table_name.as_str().into(),
            date_key_format: cfg.date_key_format.as_str().into(),
        })
    }

    /// Sort key for a date.
    pub fn date_key(&self, date: NaiveDate) -> String {
        date.format(&self.date_key_format).to_string()
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut guard)
        })
        .await?
    }
}

#[async_trait]
impl ProblemStore for SqliteProblemStore {
    #[instrument(level = "info", skip(self, problems), fields(%date, entries = problems.entries().count()))]
    async fn save(&self, date: NaiveDate, problems: &DailyProblemSet) -> Result<(), StoreError> {
        let sk = self.date_key(date);
        let table = self.table.clone();
        let mut rows = Vec::new();
        for (category, problem) in problems.entries() {
            rows.push((category.partition_key(), problem.clone(), serde_json::to_string(&problem.topics)?));
        }

        let res = self
            .with_conn(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(&format!(
                        "INSERT OR REPLACE INTO {table} (pk, sk, problem_id, title, url, difficulty, topics)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                    ))?;
                    for (pk, p, topics) in &rows {
                        stmt.execute(params![pk, sk, p.id, p.title, p.url, p.difficulty.as_str(), topics])?;
                    }
                }
                // Dropping an uncommitted transaction rolls it back.
                tx.commit()?;
                Ok(())
            })
            .await;

        if let Err(e) = &res {
            error!(target: "store", %date, error = %e, "Error saving problems for date");
        }
        res
    }

    #[instrument(level = "debug", skip(self), fields(%date))]
    async fn get_daily_problems(&self, date: NaiveDate) -> Result<DailyProblemSet, StoreError> {
        let sk = self.date_key(date);
        let table = self.table.clone();

        let res = self
            .with_conn(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT problem_id, title, url, difficulty, topics FROM {table} WHERE pk = ?1 AND sk = ?2"
                ))?;
                let mut set = DailyProblemSet::default();
                for category in Category::ALL {
                    let pk = category.partition_key();
                    let raw: Option<RawRow> = stmt
                        .query_row(params![pk, sk], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)))
                        .optional()?;
                    let problem = raw.map(|raw| decode_row(&pk, &sk, raw)).transpose()?;
                    set.set(category, problem);
                }
                Ok(set)
            })
            .await;

        match &res {
            Ok(set) => debug!(target: "store", %date, absent = ?set.absent(), "Loaded daily problems"),
            Err(e) => error!(target: "store", %date, error = %e, "Error getting problems for date"),
        }
        res
    }

    #[instrument(level = "debug", skip(self), fields(%category, %start, %end))]
    async fn recent_problem_ids(
        &self,
        category: Category,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashSet<String>, StoreError> {
        let (start_key, end_key) = (self.date_key(start), self.date_key(end));
        let table = self.table.clone();
        let pk = category.partition_key();

        let res = self
            .with_conn(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT problem_id FROM {table} WHERE pk = ?1 AND sk BETWEEN ?2 AND ?3"
                ))?;
                let ids = stmt
                    .query_map(params![pk, start_key, end_key], |r| r.get::<_, String>(0))?
                    .collect::<Result<HashSet<_>, _>>()?;
                Ok(ids)
            })
            .await;

        if let Err(e) = &res {
            error!(target: "store", %category, %end, error = %e, "Error retrieving recent problem ids");
        }
        res
    }
}

fn decode_row(pk: &str, sk: &str, raw: RawRow) -> Result<Problem, StoreError> {
    let (id, title, url, difficulty, topics) = raw;
    let corrupt = |reason: String| StoreError::Corrupt { pk: pk.to_string(), sk: sk.to_string(), reason };
    let difficulty = difficulty.parse().map_err(|e| corrupt(format!("{e}")))?;
    let topics: Vec<String> = serde_json::from_str(&topics).map_err(|e| corrupt(format!("topics: {e}")))?;
    Ok(Problem { id, title, difficulty, url, topics })
}

fn validate_table_name(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidConfig(format!("table name {name:?} is not a plain identifier")))
    }
}

/// The format must render without error, round-trip, and sort in date order.
fn validate_date_key_format(fmt: &str) -> Result<(), StoreError> {
    let samples = [(2023, 12, 31), (2024, 2, 1), (2024, 10, 9), (2025, 1, 1)];
    let mut keys = Vec::with_capacity(samples.len());
    for (y, m, d) in samples {
        let date = NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| StoreError::InvalidConfig("bad sample date".into()))?;
        let mut key = String::new();
        write!(key, "{}", date.format(fmt))
            .map_err(|_| StoreError::InvalidConfig(format!("date key format {fmt:?} cannot be rendered")))?;
        if NaiveDate::parse_from_str(&key, fmt).ok() != Some(date) {
            return Err(StoreError::InvalidConfig(format!("date key format {fmt:?} does not round-trip")));
        }
        keys.push(key);
    }
    if keys.windows(2).all(|w| w[0] < w[1]) {
        Ok(())
    } else {
        Err(StoreError::InvalidConfig(format!("date key format {fmt:?} does not sort by date")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Difficulty;

    fn cfg() -> StoreConfig {
        StoreConfig { database_path: ":memory:".into(), ..Default::default() }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn problem(id: &str, difficulty: Difficulty) -> Problem {
        Problem {
            id: id.into(),
            title: format!("Problem {id}"),
            difficulty,
            url: format!("https://leetcode.com/problems/problem-{id}"),
            topics: vec!["Array".into(), "Hash Table".into()],
        }
    }

    fn full_set(prefix: &str) -> DailyProblemSet {
        DailyProblemSet {
            any: Some(problem(&format!("{prefix}1"), Difficulty::Hard)),
            easy: Some(problem(&format!("{prefix}2"), Difficulty::Easy)),
            medium: Some(problem(&format!("{prefix}3"), Difficulty::Medium)),
            hard: Some(problem(&format!("{prefix}4"), Difficulty::Hard)),
        }
    }

    #[tokio::test]
    async fn save_then_get_round_trips_the_day() {
        let store = SqliteProblemStore::open(&cfg()).unwrap();
        let day = date(2024, 2, 1);
        store.save(day, &full_set("a")).await.unwrap();

        assert_eq!(store.get_daily_problems(day).await.unwrap(), full_set("a"));
        assert_eq!(store.get_daily_problems(date(2024, 2, 2)).await.unwrap(), DailyProblemSet::default());
    }

    #[tokio::test]
    async fn absent_slots_are_not_written() {
        let store = SqliteProblemStore::open(&cfg()).unwrap();
        let day = date(2024, 2, 1);
        let mut set = full_set("a");
        set.set(Category::Medium, None);
        store.save(day, &set).await.unwrap();

        let loaded = store.get_daily_problems(day).await.unwrap();
        assert_eq!(loaded.absent(), vec![Category::Medium]);
        assert_eq!(loaded, set);
    }

    #[tokio::test]
    async fn recent_ids_are_range_bounded_and_per_category() {
        let store = SqliteProblemStore::open(&cfg()).unwrap();
        for (day, prefix) in [(date(2024, 1, 24), "old"), (date(2024, 1, 25), "w"), (date(2024, 2, 1), "t")] {
            store.save(day, &full_set(prefix)).await.unwrap();
        }

        let ids = store
            .recent_problem_ids(Category::Easy, date(2024, 1, 25), date(2024, 2, 1))
            .await
            .unwrap();
        let expected: HashSet<String> = ["w2", "t2"].into_iter().map(String::from).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn range_query_crosses_year_boundary() {
        let store = SqliteProblemStore::open(&cfg()).unwrap();
        store.save(date(2023, 12, 28), &full_set("dec")).await.unwrap();
        let ids = store
            .recent_problem_ids(Category::Any, date(2023, 12, 27), date(2024, 1, 3))
            .await
            .unwrap();
        assert!(ids.contains("dec1"));
    }

    #[tokio::test]
    async fn failed_write_leaves_day_untouched() {
        let store = SqliteProblemStore::open(&cfg()).unwrap();
        let day = date(2024, 2, 1);
        store.save(day, &full_set("a")).await.unwrap();

        // Every category but the last one is written before the failure.
        store
            .conn
            .lock()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER fail_hard BEFORE INSERT ON problems
                 WHEN NEW.pk = 'PROBLEM_HARD'
                 BEGIN SELECT RAISE(ABORT, 'simulated write failure'); END;",
            )
            .unwrap();

        let err = store.save(day, &full_set("b")).await.unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
        assert_eq!(store.get_daily_problems(day).await.unwrap(), full_set("a"));

        let fresh = date(2024, 2, 2);
        assert!(store.save(fresh, &full_set("c")).await.is_err());
        assert_eq!(store.get_daily_problems(fresh).await.unwrap(), DailyProblemSet::default());
    }

    #[tokio::test]
    async fn corrupt_difficulty_is_reported() {
        let store = SqliteProblemStore::open(&cfg()).unwrap();
        store
            .conn
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO problems VALUES ('PROBLEM_ANY', '2024-02-01', '1', 't', 'u', 'LEGENDARY', '[]')",
                [],
            )
            .unwrap();

        let err = store.get_daily_problems(date(2024, 2, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn rejects_unsafe_table_names_and_unsortable_formats() {
        let bad_table = StoreConfig { table_name: "problems; DROP TABLE x".into(), ..cfg() };
        assert!(matches!(SqliteProblemStore::open(&bad_table), Err(StoreError::InvalidConfig(_))));

        // M/D/YYYY keys do not sort chronologically.
        let unsortable = StoreConfig { date_key_format: "%m/%d/%Y".into(), ..cfg() };
        assert!(matches!(SqliteProblemStore::open(&unsortable), Err(StoreError::InvalidConfig(_))));

        let compact = StoreConfig { date_key_format: "%Y%m%d".into(), ..cfg() };
        let store = SqliteProblemStore::open(&compact).unwrap();
        assert_eq!(store.date_key(date(2024, 2, 1)), "20240201");
    }
}
