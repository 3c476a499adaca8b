use crate::core::{RunOptions, Scheduler};

mod annealing;
mod genetic;
mod local;

pub use annealing::{Annealing, AnnealingConfig};
pub use genetic::{Genetic, GeneticConfig};
pub use local::LocalSearch;

/// Constructors of every available scheduler.
#[allow(unsafe_code)]
#[linkme::distributed_slice]
pub static SCHEDULERS: [fn(&RunOptions) -> Box<dyn Scheduler>];

/// Creates the scheduler with the given name.
#[must_use]
pub fn scheduler(name: &str, options: &RunOptions) -> Option<Box<dyn Scheduler>> {
    SCHEDULERS
        .iter()
        .map(|init| init(options))
        .find(|scheduler| scheduler.name().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn schedulers_should_be_registered() {
        let options = RunOptions::default();
        let mut names: Vec<_> = SCHEDULERS
            .iter()
            .map(|init| init(&options).name().to_owned())
            .collect();
        names.sort_unstable();

        assert_eq!(names, ["Annealing", "Genetic"]);
        assert!(scheduler("genetic", &options).is_some());
        assert!(scheduler("tabu", &options).is_none());
    }
}
