//! Daily coding problems: picks one LeetCode problem per category each day,
//! keeps picks unique within a trailing week, and serves them by date.

pub mod config;
pub mod domain;
pub mod eligibility;
pub mod error;
pub mod leetcode;
pub mod protocol;
pub mod routes;
pub mod scheduler;
pub mod selector;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod util;

pub use config::AppConfig;
pub use routes::build_router;
pub use state::AppState;
