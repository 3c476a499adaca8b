use super::{Problem, ScheduleChoice, Solution, COURSES_PER_STUDENT};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// The number of violated constraints of a schedule.
/// `Infeasible` is worse than any count.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Violations {
    Count(u64),
    Infeasible,
}

impl Violations {
    pub const ZERO: Self = Self::Count(0);

    #[must_use]
    pub const fn is_zero(self) -> bool {
        matches!(self, Self::Count(0))
    }

    #[must_use]
    pub const fn count(self) -> Option<u64> {
        match self {
            Self::Count(count) => Some(count),
            Self::Infeasible => None,
        }
    }

    /// Returns the count as a float, infeasible schedules are infinitely bad.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(self) -> f64 {
        match self {
            Self::Count(count) => count as f64,
            Self::Infeasible => f64::INFINITY,
        }
    }
}

impl Display for Violations {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(count) => write!(f, "{count}"),
            Self::Infeasible => write!(f, "infeasible"),
        }
    }
}

/// Scores complete schedules of a problem.
pub trait Evaluator {
    /// Returns the number of violated constraints of the solution.
    fn score(&mut self, problem: &Problem, solution: &Solution) -> Violations;
}

fn check_length(problem: &Problem, solution: &Solution) -> bool {
    if solution.len() == problem.courses().len() {
        true
    } else {
        log::warn!(
            "Incomplete exam schedule: {} of {} courses",
            solution.len(),
            problem.courses().len()
        );
        false
    }
}

fn check_day(problem: &Problem, choice: &ScheduleChoice) -> bool {
    if choice.day() < problem.exam_period() {
        true
    } else {
        log::warn!(
            "Day {} is an impossible day for course {}",
            choice.day(),
            choice.course()
        );
        false
    }
}

/// Full check scoring.
/// Any room clash makes the schedule infeasible and every pair of a student's
/// exams at the same time counts as one violation.
#[derive(Clone, Copy, Debug, Default)]
pub struct BaselineEvaluator;

impl Evaluator for BaselineEvaluator {
    fn score(&mut self, problem: &Problem, solution: &Solution) -> Violations {
        if !check_length(problem, solution) {
            return Violations::Infeasible;
        }

        let choices = solution.choices();
        for (i, first) in choices.iter().enumerate() {
            if !check_day(problem, first) {
                return Violations::Infeasible;
            }

            if let Some(second) = choices[i + 1..].iter().find(|c| first.clashes(c)) {
                log::trace!(
                    "Clash between courses {} and {}",
                    first.course(),
                    second.course()
                );
                return Violations::Infeasible;
            }
        }

        let mut conflicts = 0;
        for student in problem.students() {
            let mut local = [None; COURSES_PER_STUDENT];
            for (slot, &course) in local.iter_mut().zip(student.courses()) {
                *slot = choices.iter().rev().find(|c| c.course() == course);
            }

            let Some(local) = local.into_iter().collect::<Option<Vec<_>>>() else {
                log::warn!("Can't find schedule for every course of {}", student.name());
                return Violations::Infeasible;
            };

            for (j, first) in local.iter().enumerate() {
                conflicts += local[j + 1..]
                    .iter()
                    .filter(|second| first.same_time(second))
                    .count() as u64;
            }
        }

        Violations::Count(conflicts)
    }
}

/// Data derived once per problem: course sizes and the solution index of
/// every course of every student.
#[derive(Clone, Debug)]
pub struct ProblemCache {
    problem: u64,
    course_sizes: Vec<u64>,
    student_courses: Vec<[usize; COURSES_PER_STUDENT]>,
}

impl ProblemCache {
    /// Builds the cache for the given problem.
    /// Solutions keep each course at its index, so a student's courses map
    /// directly to solution indices.
    #[must_use]
    pub fn new(problem: &Problem) -> Self {
        Self {
            problem: problem.id(),
            course_sizes: problem.course_sizes(),
            student_courses: problem.students().iter().map(|s| *s.courses()).collect(),
        }
    }

    /// Returns whether the cache was built for this problem.
    #[must_use]
    pub const fn is_for(&self, problem: &Problem) -> bool {
        self.problem == problem.id()
    }

    #[must_use]
    pub fn course_sizes(&self) -> &[u64] {
        &self.course_sizes
    }
}

/// Scoring which turns room clashes into a penalty instead of rejecting the schedule.
///
/// A clash costs the sizes of both courses plus two, for the upset instructors.
/// Student conflicts grow with the number of conflicts the same student
/// already has, so spreading conflicts among students is preferred.
#[derive(Clone, Debug, Default)]
pub struct WeightedEvaluator {
    cache: Option<ProblemCache>,
    precomputations: usize,
}

impl WeightedEvaluator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: None,
            precomputations: 0,
        }
    }

    /// Returns how many times the per problem data was computed.
    #[must_use]
    pub const fn precomputations(&self) -> usize {
        self.precomputations
    }

    fn cache(&mut self, problem: &Problem) -> &ProblemCache {
        if !self.cache.as_ref().is_some_and(|cache| cache.is_for(problem)) {
            self.precomputations += 1;
            self.cache = Some(ProblemCache::new(problem));
        }

        self.cache.get_or_insert_with(|| ProblemCache::new(problem))
    }
}

impl Evaluator for WeightedEvaluator {
    fn score(&mut self, problem: &Problem, solution: &Solution) -> Violations {
        if !check_length(problem, solution) {
            return Violations::Infeasible;
        }

        // The cache indexes choices by course.
        if !solution.is_complete(problem) {
            log::warn!("Exam schedule doesn't hold every course at its index");
            return Violations::Infeasible;
        }

        let cache = self.cache(problem);
        let choices = solution.choices();
        let mut conflicts = 0;

        for (i, first) in choices.iter().enumerate() {
            if !check_day(problem, first) {
                return Violations::Infeasible;
            }

            for (j, second) in choices.iter().enumerate().skip(i + 1) {
                if first.clashes(second) {
                    log::trace!("Clash between courses {i} and {j}");
                    conflicts += cache.course_sizes[i] + cache.course_sizes[j] + 2;
                }
            }
        }

        // Too many clashes to be worth checking every student.
        if conflicts > problem.students().len() as u64 {
            return Violations::Count(conflicts * 100);
        }

        for courses in &cache.student_courses {
            for (j, &first) in courses.iter().enumerate() {
                let mut student_conflicts = 0;
                for &second in &courses[j + 1..] {
                    if choices[first].same_time(&choices[second]) {
                        student_conflicts += 1;
                        conflicts += student_conflicts;
                    }
                }
                conflicts += student_conflicts;
            }
        }

        Violations::Count(conflicts)
    }
}
