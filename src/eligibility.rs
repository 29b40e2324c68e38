//! Accept/reject a candidate against the recent problems of its category.

use std::collections::HashSet;

use crate::domain::Problem;

/// True iff the problem was not used in the blacklist window.
pub fn is_eligible(problem: &Problem, blacklist: &HashSet<String>) -> bool {
    !blacklist.contains(&problem.id)
}
