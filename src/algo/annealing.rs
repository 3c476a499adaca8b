use super::local::LocalSearch;
use crate::core::{
    cool, random_schedule, Problem, RunOptions, Scheduler, Solution, Stagnation, Violations,
};
use rand::prelude::*;
use std::time::{Duration, Instant};

/// Parameters of the simulated annealing.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnealingConfig {
    pub starting_temperature: f64,
    pub cooling: f64,
    pub tabu_capacity: usize,
    /// Candidates tried by a single hill climbing step.
    pub max_trials: usize,
    /// Iterations with the same best score before the search restarts.
    pub stagnation: usize,
    pub time_limit: Duration,
    pub iterations: usize,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            starting_temperature: 100.0,
            cooling: 1.0,
            tabu_capacity: 200,
            max_trials: 50_000,
            stagnation: 100,
            time_limit: Duration::from_secs(12),
            iterations: 100_000,
        }
    }
}

impl AnnealingConfig {
    #[must_use]
    pub const fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    #[must_use]
    pub const fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, starting: f64, cooling: f64) -> Self {
        self.starting_temperature = starting;
        self.cooling = cooling;
        self
    }

    #[must_use]
    pub const fn with_stagnation(mut self, stagnation: usize) -> Self {
        self.stagnation = stagnation;
        self
    }

    #[must_use]
    pub const fn with_tabu_capacity(mut self, tabu_capacity: usize) -> Self {
        self.tabu_capacity = tabu_capacity;
        self
    }

    #[must_use]
    pub const fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.max_trials = max_trials;
        self
    }
}

/// Simulated annealing over fully hill climbed schedules.
///
/// Every iteration hill climbs the current schedule and a fresh random one,
/// then decides which of them to continue with.
#[derive(Clone, Debug)]
pub struct Annealing {
    config: AnnealingConfig,
    rng: StdRng,
    restarts: usize,
}

impl Annealing {
    /// Creates a new simulated annealing.
    #[must_use]
    pub fn new(seed: u64, config: AnnealingConfig) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    const fn with_rng(config: AnnealingConfig, rng: StdRng) -> Self {
        Self {
            config,
            rng,
            restarts: 0,
        }
    }

    fn from_options(options: &RunOptions) -> Self {
        let defaults = AnnealingConfig::default();
        let mut config = defaults.clone().with_temperature(
            options.temperature.unwrap_or(defaults.starting_temperature),
            options.cooling.unwrap_or(defaults.cooling),
        );
        if let Some(time_limit) = options.time_limit {
            config = config.with_time_limit(time_limit);
        }
        if let Some(iterations) = options.iterations {
            config = config.with_iterations(iterations);
        }
        if let Some(stagnation) = options.stagnation {
            config = config.with_stagnation(stagnation);
        }
        if let Some(tabu_capacity) = options.tabu_capacity {
            config = config.with_tabu_capacity(tabu_capacity);
        }
        if let Some(max_trials) = options.max_trials {
            config = config.with_max_trials(max_trials);
        }

        match options.seed {
            Some(seed) => Self::new(seed, config),
            None => Self::with_rng(config, StdRng::from_entropy()),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &AnnealingConfig {
        &self.config
    }

    /// Returns how many times the last run restarted from a random schedule.
    #[must_use]
    pub const fn restarts(&self) -> usize {
        self.restarts
    }

    /// Picks the schedule to continue with.
    fn choose_path(
        &mut self,
        mut current: Solution,
        problem: &Problem,
        search: &mut LocalSearch,
        temperature: f64,
    ) -> Solution {
        let mut candidate = random_schedule(problem, &mut self.rng);
        let previous = search.score(problem, &current);

        search.improve_all(&mut current, problem);
        search.improve_all(&mut candidate, problem);

        let current_score = search.score(problem, &current);
        let candidate_score = search.score(problem, &candidate);

        if current_score.is_zero() {
            return current;
        }
        if candidate_score.is_zero() {
            return candidate;
        }

        if current_score >= previous || current_score >= candidate_score {
            candidate
        } else {
            self.metropolis(current, current_score, candidate, candidate_score, temperature)
        }
    }

    /// Accepts the candidate with probability `exp((current - candidate) / temperature)`.
    ///
    /// This is only reached when the current schedule is strictly better than
    /// the candidate, so the candidate is accepted as an uphill move.
    fn metropolis(
        &mut self,
        current: Solution,
        current_score: Violations,
        candidate: Solution,
        candidate_score: Violations,
        temperature: f64,
    ) -> Solution {
        let delta = current_score.as_f64() - candidate_score.as_f64();
        let probability = (delta / temperature).exp();

        if probability > self.rng.gen::<f64>() {
            candidate
        } else {
            current
        }
    }
}

impl Default for Annealing {
    fn default() -> Self {
        Self::from_options(&RunOptions::default())
    }
}

impl Scheduler for Annealing {
    fn schedule(&mut self, problem: &Problem) -> Solution {
        let mut search = LocalSearch::new(self.config.tabu_capacity, self.config.max_trials);
        let mut current = random_schedule(problem, &mut self.rng);
        let mut best_score = search.score(problem, &current);
        let mut best = current.clone();
        let mut stagnation = Stagnation::new(self.config.stagnation);
        let mut temperature = self.config.starting_temperature;
        let start = Instant::now();
        self.restarts = 0;

        for iteration in 0..self.config.iterations {
            if search.score(problem, &current).is_zero() {
                log::debug!("Annealing found a perfect schedule in iteration {iteration}");
                return current;
            }

            current = self.choose_path(current, problem, &mut search, temperature);
            search.remember(&current);

            let score = search.score(problem, &current);
            if score <= best_score {
                best_score = score;
                best = current.clone();
            }

            if stagnation.observe(best_score) {
                log::debug!("Annealing restarted in iteration {iteration}");
                self.restarts += 1;
                current = random_schedule(problem, &mut self.rng);
            }

            temperature = cool(temperature, self.config.cooling);

            if start.elapsed() > self.config.time_limit {
                log::debug!("Annealing stopped by the time limit in iteration {iteration}");
                break;
            }
        }

        log::debug!("Annealing finished with {best_score} violations");
        best
    }

    fn name(&self) -> &'static str {
        "Annealing"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SCHEDULERS)]
static INSTANCE: fn(&RunOptions) -> Box<dyn Scheduler> =
    |options| Box::new(Annealing::from_options(options));

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::fixtures::problem;
    use crate::core::{Evaluator, ScheduleChoice, WeightedEvaluator};

    fn quick() -> AnnealingConfig {
        AnnealingConfig::default().with_time_limit(Duration::from_secs(5))
    }

    #[test]
    fn annealing_should_solve_small_problem() {
        let problem = problem(6, 1, &[[0, 1, 2, 3, 4], [1, 2, 3, 4, 5], [0, 2, 3, 4, 5]]);
        let mut annealing = Annealing::new(10, quick().with_iterations(1_000));

        let solution = annealing.schedule(&problem);
        assert!(solution.is_complete(&problem));
        assert_eq!(WeightedEvaluator::new().score(&problem, &solution), Violations::ZERO);
    }

    #[test]
    fn annealing_should_beat_random_assignment_when_overfull() {
        let students: Vec<_> = (0..40)
            .map(|i| [i % 25, (i + 3) % 25, (i + 7) % 25, (i + 11) % 25, (i + 17) % 25])
            .collect();
        let problem = problem(25, 1, &students);
        let mut rng = StdRng::seed_from_u64(5);
        let uniform: Solution = (0..25)
            .map(|i| ScheduleChoice::new(i, 0, rng.gen_range(0..5), rng.gen_range(0..4)))
            .collect();

        let mut annealing = Annealing::new(3, quick().with_iterations(10));
        let solution = annealing.schedule(&problem);

        let mut evaluator = WeightedEvaluator::new();
        let score = evaluator.score(&problem, &solution);
        assert!(score < Violations::Infeasible);
        assert!(score <= evaluator.score(&problem, &uniform));
    }

    #[test]
    fn stagnation_should_restart_annealing() {
        let students: Vec<_> = (0..40)
            .map(|i| [i % 25, (i + 3) % 25, (i + 7) % 25, (i + 11) % 25, (i + 17) % 25])
            .collect();
        let problem = problem(25, 1, &students);

        let mut annealing = Annealing::new(8, quick().with_iterations(4).with_stagnation(0));
        annealing.schedule(&problem);
        assert_eq!(annealing.restarts(), 4);

        let mut annealing = Annealing::new(8, quick().with_iterations(4));
        let solution = annealing.schedule(&problem);
        assert_eq!(annealing.restarts(), 0);
        assert!(solution.is_complete(&problem));
    }

    #[test]
    fn options_should_override_config() {
        let options = RunOptions {
            seed: Some(2),
            time_limit: Some(Duration::from_secs(1)),
            tabu_capacity: Some(4),
            cooling: Some(0.9),
            ..RunOptions::default()
        };
        let annealing = Annealing::from_options(&options);
        let config = annealing.config();

        assert_eq!(config.time_limit, Duration::from_secs(1));
        assert_eq!(config.tabu_capacity, 4);
        assert!((config.cooling - 0.9).abs() < f64::EPSILON);
        assert!((config.starting_temperature - 100.0).abs() < f64::EPSILON);
        assert_eq!(config.iterations, AnnealingConfig::default().iterations);
        assert_eq!(config.max_trials, AnnealingConfig::default().max_trials);
    }

    #[test]
    fn annealing_should_return_start_without_iterations() {
        let problem = problem(6, 1, &[[0, 1, 2, 3, 4]]);
        let mut annealing = Annealing::new(1, quick().with_iterations(0));
        assert!(annealing.schedule(&problem).is_complete(&problem));
    }

    #[test]
    fn metropolis_should_always_accept_equal_scores() {
        let problem = problem(6, 1, &[]);
        let mut annealing = Annealing::new(4, quick());
        let current = random_schedule(&problem, &mut StdRng::seed_from_u64(1));
        let candidate = random_schedule(&problem, &mut StdRng::seed_from_u64(2));

        // exp(0) = 1 is above every draw from [0, 1).
        for _ in 0..20 {
            let chosen = annealing.metropolis(
                current.clone(),
                Violations::Count(3),
                candidate.clone(),
                Violations::Count(3),
                1.0,
            );
            assert_eq!(chosen, candidate);
        }
    }

    #[test]
    fn metropolis_should_reject_infeasible_candidate() {
        let problem = problem(6, 1, &[]);
        let mut annealing = Annealing::new(4, quick());
        let current = random_schedule(&problem, &mut StdRng::seed_from_u64(1));
        let candidate = random_schedule(&problem, &mut StdRng::seed_from_u64(2));

        let chosen = annealing.metropolis(
            current.clone(),
            Violations::Count(3),
            candidate,
            Violations::Infeasible,
            100.0,
        );
        assert_eq!(chosen, current);
    }
}
