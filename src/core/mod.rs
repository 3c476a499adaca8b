mod problem;
mod score;
mod solution;
mod tabu;
mod util;

pub use problem::*;
pub use score::*;
pub use solution::*;
pub use tabu::*;
pub use util::*;

#[cfg(test)]
pub(crate) use problem::test as fixtures;

use std::time::Duration;

/// Schedules the exams of a problem.
pub trait Scheduler {
    /// Schedules the exams of the given problem.
    /// The result may violate constraints if nothing better was found in time.
    fn schedule(&mut self, problem: &Problem) -> Solution;

    /// Returns the name of the scheduler.
    fn name(&self) -> &'static str;
}

/// Overrides applied to a scheduler's configuration when it's created by a driver.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunOptions {
    pub seed: Option<u64>,
    pub time_limit: Option<Duration>,
    /// Iterations or generations, depending on the scheduler.
    pub iterations: Option<usize>,
    pub stagnation: Option<usize>,
    pub tabu_capacity: Option<usize>,
    pub max_trials: Option<usize>,
    pub temperature: Option<f64>,
    pub cooling: Option<f64>,
}
