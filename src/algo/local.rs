use crate::core::{
    Evaluator, Problem, ScheduleChoice, Solution, TabuList, Violations, WeightedEvaluator,
};

/// Hill climbing over the assignment of a single course, shared by the schedulers.
/// Owns the evaluator and the tabu list of a run.
#[derive(Clone, Debug)]
pub struct LocalSearch<E = WeightedEvaluator> {
    evaluator: E,
    tabu: TabuList,
    max_trials: usize,
}

impl LocalSearch {
    /// Creates a local search scoring with the weighted evaluator.
    #[must_use]
    pub fn new(tabu_capacity: usize, max_trials: usize) -> Self {
        Self::with_evaluator(WeightedEvaluator::new(), tabu_capacity, max_trials)
    }
}

impl<E: Evaluator> LocalSearch<E> {
    #[must_use]
    pub fn with_evaluator(evaluator: E, tabu_capacity: usize, max_trials: usize) -> Self {
        Self {
            evaluator,
            tabu: TabuList::new(tabu_capacity),
            max_trials,
        }
    }

    pub fn score(&mut self, problem: &Problem, solution: &Solution) -> Violations {
        self.evaluator.score(problem, solution)
    }

    #[must_use]
    pub const fn tabu(&self) -> &TabuList {
        &self.tabu
    }

    #[must_use]
    pub const fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Adds the solution to the tabu list unless it's already there.
    pub fn remember(&mut self, solution: &Solution) {
        if !self.tabu.contains(solution) {
            self.tabu.add(solution.clone());
        }
    }

    /// Finds the best assignment of one course with the rest of the solution fixed.
    ///
    /// Every room, day and time slot is tried in order, skipping solutions in
    /// the tabu list, until `max_trials` candidates were tried. A candidate
    /// replaces the best one when it's at least as good, so later candidates
    /// win ties. The solution is left with the returned choice.
    pub fn improve(
        &mut self,
        course: usize,
        solution: &mut Solution,
        problem: &Problem,
    ) -> ScheduleChoice {
        let Some(&original) = solution.get(course) else {
            return ScheduleChoice::new(course, 0, 0, 0);
        };

        let mut best = original;
        let mut best_score = self.score(problem, solution);
        let mut trials = 0;

        'search: for room in 0..problem.rooms().len() {
            for day in 0..problem.exam_period() {
                for slot in 0..problem.time_slots() {
                    trials += 1;
                    if trials > self.max_trials {
                        break 'search;
                    }

                    let candidate = ScheduleChoice::new(course, room, day, slot);
                    if solution.set(course, candidate).is_err() {
                        break 'search;
                    }

                    if self.tabu.contains(solution) {
                        continue;
                    }

                    let score = self.score(problem, solution);
                    if score <= best_score {
                        best = candidate;
                        best_score = score;
                    }
                }
            }
        }

        if solution.set(course, best).is_err() {
            log::warn!("Solution doesn't hold course {course} at its index");
            return original;
        }

        best
    }

    /// Improves every course of the solution in order.
    pub fn improve_all(&mut self, solution: &mut Solution, problem: &Problem) {
        for course in 0..solution.len() {
            self.improve(course, solution, problem);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::fixtures::problem;
    use crate::core::random_schedule;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn improve_should_never_worsen() {
        let students: Vec<_> = (0..12)
            .map(|i| [i % 8, (i + 1) % 8, (i + 2) % 8, (i + 3) % 8, (i + 5) % 8])
            .collect();
        let problem = problem(8, 1, &students);
        let mut rng = StdRng::seed_from_u64(11);
        let mut search = LocalSearch::new(5, 50_000);

        for _ in 0..10 {
            let mut solution = random_schedule(&problem, &mut rng);
            for course in 0..solution.len() {
                let before = search.score(&problem, &solution);
                let choice = search.improve(course, &mut solution, &problem);
                assert_eq!(solution.get(course), Some(&choice));
                assert!(search.score(&problem, &solution) <= before);
            }
        }
    }

    #[test]
    fn improve_should_prefer_last_tie() {
        let problem = problem(1, 2, &[]);
        let mut solution = Solution::from_choices(vec![ScheduleChoice::new(0, 0, 0, 0)]);
        let mut search = LocalSearch::new(1, 50_000);

        let choice = search.improve(0, &mut solution, &problem);
        assert_eq!(choice, ScheduleChoice::new(0, 1, 4, 3));
    }

    #[test]
    fn improve_should_respect_trial_limit() {
        let problem = problem(1, 2, &[]);
        let mut solution = Solution::from_choices(vec![ScheduleChoice::new(0, 1, 1, 1)]);
        let mut search = LocalSearch::new(1, 3);

        // Only the first three slots of the first day in the first room are tried.
        let choice = search.improve(0, &mut solution, &problem);
        assert_eq!(choice, ScheduleChoice::new(0, 0, 0, 2));
    }

    #[test]
    fn improve_should_skip_tabu_solutions() {
        let problem = problem(1, 1, &[]);
        let mut search = LocalSearch::new(1, 50_000);
        search.remember(&Solution::from_choices(vec![ScheduleChoice::new(0, 0, 4, 3)]));

        let mut solution = Solution::from_choices(vec![ScheduleChoice::new(0, 0, 0, 0)]);
        let choice = search.improve(0, &mut solution, &problem);
        assert_eq!(choice, ScheduleChoice::new(0, 0, 4, 2));
    }

    #[test]
    fn remember_should_store_each_solution_once() {
        let problem = problem(6, 1, &[[0, 1, 2, 3, 4]]);
        let mut search = LocalSearch::new(4, 50_000);
        let mut solution = random_schedule(&problem, &mut StdRng::seed_from_u64(1));

        search.remember(&solution);
        search.remember(&solution);
        assert_eq!(search.tabu().len(), 1);

        search.improve_all(&mut solution, &problem);
        search.remember(&solution);
        assert!(search.tabu().contains(&solution));
        assert_eq!(search.evaluator().precomputations(), 1);
    }

    #[test]
    fn improve_should_move_clashing_course() {
        let problem = problem(6, 1, &[[0, 1, 2, 3, 4], [1, 2, 3, 4, 5]]);
        let mut solution: Solution = (0..6).map(|i| ScheduleChoice::new(i, 0, 0, i % 4)).collect();
        let mut search = LocalSearch::new(1, 50_000);

        assert!(search.score(&problem, &solution) > Violations::ZERO);
        search.improve(4, &mut solution, &problem);
        search.improve(5, &mut solution, &problem);
        assert_eq!(search.score(&problem, &solution), Violations::ZERO);
    }

    #[test]
    fn seeded_schedule_and_improve_should_repeat() {
        let students: Vec<_> = (0..30)
            .map(|i| [i % 10, (i + 2) % 10, (i + 4) % 10, (i + 6) % 10, (i + 7) % 10])
            .collect();
        let problem = problem(10, 2, &students);

        let run = || {
            let mut rng = StdRng::seed_from_u64(42);
            let mut search = LocalSearch::new(10, 50_000);
            let mut solution = random_schedule(&problem, &mut rng);
            search.improve_all(&mut solution, &problem);
            solution
        };

        assert_eq!(run(), run());
    }
}
