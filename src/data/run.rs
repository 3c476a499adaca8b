use crate::core::{BaselineEvaluator, Evaluator, Problem, Scheduler, Violations};
use serde::Serialize;
use std::fmt::{Display, Formatter, Result};

/// Scores and timings of one scheduler over a batch of problems.
#[derive(Debug, Serialize)]
pub struct Report {
    scheduler: String,
    entries: Vec<ReportEntry>,
}

impl Report {
    fn new(scheduler: String) -> Self {
        Self {
            scheduler,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn scheduler_name(&self) -> &str {
        &self.scheduler
    }

    /// One entry per problem, in the order they were scheduled.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Sum of violations over the feasible schedules.
    #[must_use]
    pub fn total_violations(&self) -> u64 {
        self.entries.iter().filter_map(|e| e.score.count()).sum()
    }

    /// Total time spent scheduling in seconds.
    #[must_use]
    pub fn total_time(&self) -> f64 {
        self.entries.iter().map(|e| e.time).sum()
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Scheduler: {}", self.scheduler)?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        writeln!(
            f,
            "Total: {} violations in {:.2} sec",
            self.total_violations(),
            self.total_time()
        )?;
        writeln!(f, "-------------------")
    }
}

/// Outcome of scheduling a single problem.
#[non_exhaustive]
#[derive(Debug, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub score: Violations,
    pub time: f64,
}

impl Display for ReportEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}: {} in {:.2} sec", self.name, self.score, self.time)
    }
}

/// Runs the scheduler on every problem.
/// Schedules are scored with the baseline evaluator, so room clashes make them infeasible.
pub fn run(problems: &[Problem], scheduler: &mut dyn Scheduler) -> Report {
    let mut report = Report::new(scheduler.name().into());

    for (i, problem) in problems.iter().enumerate() {
        let time = std::time::Instant::now();
        let solution = scheduler.schedule(problem);
        let time = time.elapsed().as_secs_f64();

        if !solution.is_complete(problem) {
            log::warn!("{} returned an incomplete schedule for problem {i}", report.scheduler);
        }

        let score = BaselineEvaluator.score(problem, &solution);
        log::info!("{}: problem {i} scored {score} in {time:.2} sec", report.scheduler);

        report.entries.push(ReportEntry {
            name: format!("Problem {i}"),
            score,
            time,
        });
    }

    report
}
