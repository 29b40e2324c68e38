//! Public HTTP response bodies (serde ready).
//! Keep this small and stable so clients can rely on the shape.

use serde::{Deserialize, Serialize};

use crate::domain::DailyProblemSet;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// `{"problems": {"ANY": …, "EASY": …, "MEDIUM": …, "HARD": …}}`, absent slots as `null`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DailyProblemsOut {
    pub problems: DailyProblemSet,
}

/// Error body, e.g. `{"message": "Incorrect date format"}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageOut {
    pub message: String,
}
