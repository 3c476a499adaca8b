use super::local::LocalSearch;
use crate::core::{
    cool, random_schedule, wrapping_next, Problem, RunOptions, Scheduler, Solution, Stagnation,
    Violations,
};
use rand::prelude::*;
use std::time::{Duration, Instant};

/// Parameters of the genetic algorithm.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneticConfig {
    /// Children made by every pair of parents.
    pub children_per_couple: usize,
    /// Pairs of parents per generation. The population holds
    /// `couples * children_per_couple` schedules.
    pub couples: usize,
    pub starting_temperature: f64,
    pub cooling: f64,
    pub tabu_capacity: usize,
    /// Candidates tried by a single hill climbing step.
    pub max_trials: usize,
    /// Consecutive courses improved in every child.
    pub mutations: usize,
    /// Generations with the same best score before the population is replaced.
    pub stagnation: usize,
    pub time_limit: Duration,
    pub generations: usize,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            children_per_couple: 2,
            couples: 3,
            starting_temperature: 10.0,
            cooling: 1.0,
            tabu_capacity: 1,
            max_trials: 50_000,
            mutations: 2,
            stagnation: 300,
            time_limit: Duration::from_secs(20),
            generations: 100_000,
        }
    }
}

impl GeneticConfig {
    #[must_use]
    pub const fn population(&self) -> usize {
        self.couples * self.children_per_couple
    }

    #[must_use]
    pub const fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    #[must_use]
    pub const fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    #[must_use]
    pub const fn with_population(mut self, couples: usize, children_per_couple: usize) -> Self {
        self.couples = couples;
        self.children_per_couple = children_per_couple;
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

/// Genetic algorithm where mutations are hill climbing steps instead of random changes.
#[derive(Clone, Debug)]
pub struct Genetic {
    config: GeneticConfig,
    rng: StdRng,
    extinctions: usize,
}

impl Genetic {
    /// Creates a new genetic algorithm.
    #[must_use]
    pub fn new(seed: u64, config: GeneticConfig) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut config: GeneticConfig, rng: StdRng) -> Self {
        config.couples = config.couples.max(1);
        config.children_per_couple = config.children_per_couple.max(1);
        Self {
            config,
            rng,
            extinctions: 0,
        }
    }

    fn from_options(options: &RunOptions) -> Self {
        let defaults = GeneticConfig::default();
        let mut config = defaults.clone().with_temperature(
            options.temperature.unwrap_or(defaults.starting_temperature),
            options.cooling.unwrap_or(defaults.cooling),
        );
        if let Some(time_limit) = options.time_limit {
            config = config.with_time_limit(time_limit);
        }
        if let Some(generations) = options.iterations {
            config = config.with_generations(generations);
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
    pub const fn config(&self) -> &GeneticConfig {
        &self.config
    }

    /// Returns how many times the population was replaced during the last run.
    #[must_use]
    pub const fn extinctions(&self) -> usize {
        self.extinctions
    }
}

impl Default for Genetic {
    fn default() -> Self {
        Self::from_options(&RunOptions::default())
    }
}

impl Scheduler for Genetic {
    fn schedule(&mut self, problem: &Problem) -> Solution {
        let mut search = LocalSearch::new(self.config.tabu_capacity, self.config.max_trials);
        let mut population = Population::seed(problem, &mut search, &mut self.rng, &self.config);
        let mut best = population.best().clone();
        let mut stagnation = Stagnation::new(self.config.stagnation);
        let mut temperature = self.config.starting_temperature;
        let start = Instant::now();
        self.extinctions = 0;

        for generation in 0..self.config.generations {
            if let Some(solution) = population.solved() {
                log::debug!("Genetic found a perfect schedule in generation {generation}");
                return solution.clone();
            }

            let mut children = Vec::with_capacity(self.config.population());
            for _ in 0..self.config.couples {
                let first = population.select(&mut self.rng, temperature).clone();
                let second = population.select(&mut self.rng, temperature).clone();

                for mut child in crossover(&first, &second, &mut self.rng, &self.config) {
                    self.mutate(&mut child, problem, &mut search);
                    children.push(child);
                }
            }

            population = Population::new(children, problem, &mut search);

            let fittest = population.best();
            if fittest.score <= best.score {
                best = fittest.clone();
            }

            if stagnation.observe(fittest.score) {
                log::debug!("Mass extinction in generation {generation}");
                self.extinctions += 1;
                population = Population::seed(problem, &mut search, &mut self.rng, &self.config);
            }

            temperature = cool(temperature, self.config.cooling);

            if start.elapsed() > self.config.time_limit {
                log::debug!("Genetic stopped by the time limit in generation {generation}");
                break;
            }
        }

        log::debug!("Genetic finished with {} violations", best.score);
        best.solution
    }

    fn name(&self) -> &'static str {
        "Genetic"
    }
}

impl Genetic {
    /// Hill climbs a few consecutive courses starting from a random one.
    fn mutate(&mut self, child: &mut Solution, problem: &Problem, search: &mut LocalSearch) {
        if child.is_empty() {
            return;
        }

        let mut course = self.rng.gen_range(0..child.len());
        for _ in 0..self.config.mutations {
            search.improve(course, child, problem);
            course = wrapping_next(course, child.len());
        }

        search.remember(child);
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SCHEDULERS)]
static INSTANCE: fn(&RunOptions) -> Box<dyn Scheduler> =
    |options| Box::new(Genetic::from_options(options));

#[derive(Clone, Debug, Eq, PartialEq)]
struct Member {
    solution: Solution,
    score: Violations,
}

/// A generation of scored schedules.
#[derive(Clone, Debug)]
struct Population {
    members: Vec<Member>,
    best: usize,
}

impl Population {
    fn new(solutions: Vec<Solution>, problem: &Problem, search: &mut LocalSearch) -> Self {
        let members: Vec<_> = solutions
            .into_iter()
            .map(|solution| {
                let score = search.score(problem, &solution);
                Member { solution, score }
            })
            .collect();

        // Ties go to the later member.
        let best = members
            .iter()
            .enumerate()
            .fold(0, |best, (i, member)| {
                if member.score <= members[best].score {
                    i
                } else {
                    best
                }
            });

        Self { members, best }
    }

    fn seed(
        problem: &Problem,
        search: &mut LocalSearch,
        rng: &mut impl Rng,
        config: &GeneticConfig,
    ) -> Self {
        let solutions = (0..config.population())
            .map(|_| random_schedule(problem, rng))
            .collect();
        Self::new(solutions, problem, search)
    }

    fn best(&self) -> &Member {
        &self.members[self.best]
    }

    fn solved(&self) -> Option<&Solution> {
        self.members
            .iter()
            .find(|member| member.score.is_zero())
            .map(|member| &member.solution)
    }

    /// Picks a parent with Boltzmann selection over the violation counts.
    fn select(&self, rng: &mut impl Rng, temperature: f64) -> &Solution {
        let draw: f64 = rng.gen();

        let mut weights = Vec::with_capacity(self.members.len());
        for member in &self.members {
            if member.score.is_zero() {
                return &member.solution;
            }
            weights.push((-(1.0 / member.score.as_f64()) / temperature).exp());
        }

        let total: f64 = weights.iter().sum();
        let mut cumulative = 0.0;
        for (member, weight) in self.members.iter().zip(weights) {
            cumulative += weight / total;
            if cumulative >= draw {
                return &member.solution;
            }
        }

        log::warn!("All selection probabilities failed, sum {cumulative}, draw {draw}");
        &self.members[rng.gen_range(0..self.members.len())].solution
    }
}

/// Makes children by picking every course's choice from a random parent.
/// Courses keep their indices.
fn crossover(
    first: &Solution,
    second: &Solution,
    rng: &mut impl Rng,
    config: &GeneticConfig,
) -> Vec<Solution> {
    (0..config.children_per_couple)
        .map(|_| {
            first
                .choices()
                .iter()
                .zip(second.choices())
                .map(|(a, b)| if rng.gen_bool(0.5) { *a } else { *b })
                .collect()
        })
        .collect()
}
