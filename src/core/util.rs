use super::{Problem, ScheduleChoice, Solution, Violations};
use rand::Rng;

/// Temperature below which cooling stops.
pub const MIN_TEMPERATURE: f64 = 0.0001;

/// Increments the value, wrapping to zero at `max`.
#[must_use]
pub const fn wrapping_next(value: usize, max: usize) -> usize {
    if value + 1 >= max {
        0
    } else {
        value + 1
    }
}

/// Cools the temperature by the given factor until it becomes negligible.
#[must_use]
pub fn cool(temperature: f64, factor: f64) -> f64 {
    if temperature < MIN_TEMPERATURE {
        temperature
    } else {
        temperature * factor
    }
}

/// Creates a complete schedule which is random, but not uniformly.
///
/// Courses are visited in order and the time slot, day and room advance
/// with probabilities proportional to the sizes of their domains, so
/// consecutive courses tend to land in different places.
#[allow(clippy::cast_precision_loss)]
pub fn random_schedule(problem: &Problem, rng: &mut impl Rng) -> Solution {
    let rooms = problem.rooms().len();
    let days = problem.exam_period();
    let slots = problem.time_slots();

    let mut slot = rng.gen_range(0..slots);
    let mut day = rng.gen_range(0..days);
    let mut room = rng.gen_range(0..rooms);

    let domains = (slots + days + rooms) as f64;
    let slot_probability = slots as f64 / domains;
    let day_probability = days as f64 / domains;

    (0..problem.courses().len())
        .map(|course| {
            let probability: f64 = rng.gen();
            let choice = ScheduleChoice::new(course, room, day, slot);

            if slot_probability >= probability {
                slot = wrapping_next(slot, slots);
            } else if day_probability >= probability - slot_probability {
                day = wrapping_next(day, days);
            } else {
                room = wrapping_next(room, rooms);
            }

            choice
        })
        .collect()
}

/// Detects when the best score stops changing.
#[derive(Clone, Copy, Debug)]
pub struct Stagnation {
    last: Violations,
    repeats: usize,
    threshold: usize,
}

impl Stagnation {
    #[must_use]
    pub const fn new(threshold: usize) -> Self {
        Self {
            last: Violations::ZERO,
            repeats: 0,
            threshold,
        }
    }

    /// Records the score of an iteration.
    /// Returns true when the same score was seen `threshold` times in a row,
    /// and starts counting again.
    pub fn observe(&mut self, score: Violations) -> bool {
        if score == self.last {
            self.repeats += 1;
        } else {
            self.last = score;
            self.repeats = 0;
        }

        if self.repeats >= self.threshold {
            self.repeats = 0;
            true
        } else {
            false
        }
    }
}
