use anyhow::anyhow;
use clap::{Args, Parser, ValueEnum};
use exam_timetabling::core::{BaselineEvaluator, Evaluator, RunOptions, Scheduler};
use exam_timetabling::data::Generator;
use exam_timetabling::{algo, data, schedule_and_score};
use std::num::NonZero;
use std::time::Duration;

/// A scheduler from the registry, selectable by name on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Algorithm {
    index: usize,
    name: &'static str,
}

impl Algorithm {
    fn create(self, options: &RunOptions) -> Box<dyn Scheduler> {
        algo::SCHEDULERS[self.index](options)
    }

    fn all() -> &'static [Self] {
        static ALGORITHMS: std::sync::LazyLock<Vec<Algorithm>> = std::sync::LazyLock::new(|| {
            let options = RunOptions::default();
            (0..algo::SCHEDULERS.len())
                .map(|index| Algorithm {
                    index,
                    name: algo::SCHEDULERS[index](&options).name(),
                })
                .collect()
        });

        &ALGORITHMS
    }
}

impl ValueEnum for Algorithm {
    fn value_variants<'a>() -> &'a [Self] {
        Self::all()
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.name))
    }
}

/// Parameters of the generated problems and the search budget.
#[derive(Debug, Args)]
struct ProblemArgs {
    /// The number of courses.
    #[clap(short, long, default_value = "40")]
    courses: NonZero<usize>,
    /// The number of rooms.
    #[clap(short, long, default_value = "2")]
    rooms: NonZero<usize>,
    /// The number of students.
    #[clap(short, long, default_value = "500")]
    students: usize,
    /// Chance that a student sticks to a standard schedule.
    #[clap(long, default_value = "0.95")]
    crispness: f64,
    /// Seed of the first generated problem.
    #[clap(long, default_value = "0")]
    seed: u64,
    /// Seed of the schedulers. Random if not given.
    #[clap(long)]
    search_seed: Option<u64>,
    /// Time limit of a single scheduler run in seconds.
    #[clap(short, long)]
    time_limit: Option<u64>,
    /// Maximum number of iterations or generations.
    #[clap(short, long)]
    iterations: Option<usize>,
    /// Iterations with the same best score before the search restarts.
    #[clap(long)]
    stagnation: Option<usize>,
    /// Capacity of the tabu list.
    #[clap(long)]
    tabu: Option<usize>,
    /// Candidates tried by a single hill climbing step.
    #[clap(long)]
    max_trials: Option<usize>,
    /// Starting temperature.
    #[clap(long)]
    temperature: Option<f64>,
    /// Factor the temperature is multiplied by after every iteration.
    #[clap(long)]
    cooling: Option<f64>,
}

impl ProblemArgs {
    fn generator(&self) -> anyhow::Result<Generator> {
        if !(0.0..=1.0).contains(&self.crispness) {
            return Err(anyhow!("Crispness must be within [0, 1], got {}", self.crispness));
        }

        Ok(Generator::new(
            self.courses.get(),
            self.rooms.get(),
            self.students,
            self.crispness,
        ))
    }

    fn options(&self) -> RunOptions {
        RunOptions {
            seed: self.search_seed,
            time_limit: self.time_limit.map(Duration::from_secs),
            iterations: self.iterations,
            stagnation: self.stagnation,
            tabu_capacity: self.tabu,
            max_trials: self.max_trials,
            temperature: self.temperature,
            cooling: self.cooling,
        }
    }
}

/// Application solving the exam timetabling problem.
#[derive(Debug, Parser)]
#[command(version, about)]
enum Application {
    /// Generate a problem and run one of the implemented algorithms on it.
    Run {
        algorithm: Algorithm,
        #[clap(flatten)]
        problem: ProblemArgs,
        /// Print the schedule as JSON.
        #[clap(long)]
        json: bool,
    },
    /// Run every algorithm on a batch of generated problems.
    Bench {
        /// The number of problems.
        #[clap(short, long, default_value = "2")]
        problems: NonZero<u64>,
        /// Exclude scheduling algorithms.
        #[clap(short, long, value_delimiter = ',')]
        exclude: Vec<Algorithm>,
        #[clap(flatten)]
        problem: ProblemArgs,
        /// Print the reports as JSON.
        #[clap(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    match Application::parse() {
        Application::Run {
            algorithm,
            problem,
            json,
        } => {
            let instance = problem.generator()?.generate(problem.seed)?;
            let mut scheduler = algorithm.create(&problem.options());

            let (solution, score) = schedule_and_score(scheduler.as_mut(), &instance);
            if json {
                println!("{}", serde_json::to_string_pretty(&solution)?);
            }
            println!("Weighted score: {score}");
            println!("Violations: {}", BaselineEvaluator.score(&instance, &solution));
            Ok(())
        }
        Application::Bench {
            problems,
            exclude,
            problem,
            json,
        } => {
            let instances = problem
                .generator()?
                .generate_batch(problem.seed, problems.get())?;

            let included = Algorithm::all().iter().filter(|a| !exclude.contains(a));
            for algorithm in included {
                let mut scheduler = algorithm.create(&problem.options());
                let report = data::run(&instances, scheduler.as_mut());
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print!("{report}");
                }
            }
            Ok(())
        }
    }
}
