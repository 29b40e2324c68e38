//! Domain models: categories, difficulties, problems and a day's problem set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Partition key prefix for stored problem rows.
pub const PROBLEM_KEY_PREFIX: &str = "PROBLEM_";

/// Selection bucket filled once per day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
  Any,
  Easy,
  Medium,
  Hard,
}

impl Category {
  /// Every category, in the order they are processed and serialized.
  pub const ALL: [Category; 4] = [Category::Any, Category::Easy, Category::Medium, Category::Hard];

  pub fn as_str(self) -> &'static str {
    match self {
      Category::Any => "ANY",
      Category::Easy => "EASY",
      Category::Medium => "MEDIUM",
      Category::Hard => "HARD",
    }
  }

  /// Difficulty filter passed to the provider. `Any` asks for an unfiltered problem.
  pub fn difficulty_filter(self) -> Option<Difficulty> {
    match self {
      Category::Any => None,
      Category::Easy => Some(Difficulty::Easy),
      Category::Medium => Some(Difficulty::Medium),
      Category::Hard => Some(Difficulty::Hard),
    }
  }

  /// Partition key for this category, e.g. `PROBLEM_EASY`.
  pub fn partition_key(self) -> String {
    format!("{}{}", PROBLEM_KEY_PREFIX, self.as_str())
  }

  /// Inverse of [`Category::partition_key`].
  pub fn from_partition_key(pk: &str) -> Option<Category> {
    pk.strip_prefix(PROBLEM_KEY_PREFIX)?.parse().ok()
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Category {
  type Err = UnknownVariant;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "ANY" => Ok(Category::Any),
      "EASY" => Ok(Category::Easy),
      "MEDIUM" => Ok(Category::Medium),
      "HARD" => Ok(Category::Hard),
      other => Err(UnknownVariant(other.to_string())),
    }
  }
}

/// Intrinsic difficulty of a problem, independent of the bucket it was picked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Easy => "EASY",
      Difficulty::Medium => "MEDIUM",
      Difficulty::Hard => "HARD",
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Case-insensitive: the provider answers "Easy", the store holds "EASY".
impl FromStr for Difficulty {
  type Err = UnknownVariant;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_uppercase().as_str() {
      "EASY" => Ok(Difficulty::Easy),
      "MEDIUM" => Ok(Difficulty::Medium),
      "HARD" => Ok(Difficulty::Hard),
      _ => Err(UnknownVariant(s.to_string())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

/// A selected problem. Two problems are the same iff their ids match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
  pub id: String,
  pub title: String,
  pub difficulty: Difficulty,
  pub url: String,
  pub topics: Vec<String>,
}

/// At most one problem per category for a single date.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct DailyProblemSet {
  pub any: Option<Problem>,
  pub easy: Option<Problem>,
  pub medium: Option<Problem>,
  pub hard: Option<Problem>,
}

impl DailyProblemSet {
  pub fn get(&self, category: Category) -> Option<&Problem> {
    self.slot(category).as_ref()
  }

  pub fn set(&mut self, category: Category, problem: Option<Problem>) {
    *self.slot_mut(category) = problem;
  }

  /// Present entries in category order.
  pub fn entries(&self) -> impl Iterator<Item = (Category, &Problem)> + '_ {
    Category::ALL.into_iter().filter_map(move |c| self.get(c).map(|p| (c, p)))
  }

  /// Categories with no problem.
  pub fn absent(&self) -> Vec<Category> {
    Category::ALL.into_iter().filter(|c| self.get(*c).is_none()).collect()
  }

  pub fn is_complete(&self) -> bool {
    self.absent().is_empty()
  }

  fn slot(&self, category: Category) -> &Option<Problem> {
    match category {
      Category::Any => &self.any,
      Category::Easy => &self.easy,
      Category::Medium => &self.medium,
      Category::Hard => &self.hard,
    }
  }

  fn slot_mut(&mut self, category: Category) -> &mut Option<Problem> {
    match category {
      Category::Any => &mut self.any,
      Category::Easy => &mut self.easy,
      Category::Medium => &mut self.medium,
      Category::Hard => &mut self.hard,
    }
  }
}
