#![deny(clippy::all, clippy::cargo, clippy::expect_used, clippy::unwrap_used)]
#![deny(clippy::pedantic, clippy::nursery, unsafe_code)]
#![warn(clippy::unimplemented, clippy::redundant_type_annotations)]

pub mod algo;
pub mod core;
pub mod data;

use crate::core::{Evaluator, Problem, Scheduler, Solution, Violations, WeightedEvaluator};

/// Runs the given scheduler on the problem and scores the result.
/// The weighted evaluator is used, so room clashes still get a finite score.
pub fn schedule_and_score(
    scheduler: &mut dyn Scheduler,
    problem: &Problem,
) -> (Solution, Violations) {
    let solution = scheduler.schedule(problem);
    let score = WeightedEvaluator::new().score(problem, &solution);
    (solution, score)
}
