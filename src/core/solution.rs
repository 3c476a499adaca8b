use super::{Problem, TIME_SLOTS};
use serde::Serialize;
use thiserror::Error;

/// Errors raised when modifying a solution.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum SolutionError {
    #[error("course index {index} is out of range for a solution of {len} courses")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("choice for course {course} can't be stored at index {index}")]
    CourseMismatch { index: usize, course: usize },
}

/// The exam assignment of a single course.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct ScheduleChoice {
    course: usize,
    room: usize,
    day: usize,
    slot: usize,
}

impl ScheduleChoice {
    /// Creates a new schedule choice.
    /// An impossible time slot is replaced with the first slot of the day.
    #[must_use]
    pub fn new(course: usize, room: usize, day: usize, slot: usize) -> Self {
        let slot = if slot < TIME_SLOTS {
            slot
        } else {
            log::warn!("Course {course} is at an impossible time slot {slot}, defaulting to 0");
            0
        };

        Self {
            course,
            room,
            day,
            slot,
        }
    }

    #[must_use]
    pub const fn course(&self) -> usize {
        self.course
    }

    #[must_use]
    pub const fn room(&self) -> usize {
        self.room
    }

    #[must_use]
    pub const fn day(&self) -> usize {
        self.day
    }

    #[must_use]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// Returns whether both exams take place at the same day and time.
    #[must_use]
    pub const fn same_time(&self, other: &Self) -> bool {
        self.day == other.day && self.slot == other.slot
    }

    /// Returns whether both exams take place in the same room at the same day and time.
    #[must_use]
    pub const fn clashes(&self, other: &Self) -> bool {
        self.room == other.room && self.same_time(other)
    }
}

/// A schedule: one choice per course, stored at the index of the course.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Solution {
    choices: Vec<ScheduleChoice>,
}

impl Solution {
    /// Creates a solution from raw choices.
    /// The choices are not validated, so the solution may be incomplete.
    #[must_use]
    pub const fn from_choices(choices: Vec<ScheduleChoice>) -> Self {
        Self { choices }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ScheduleChoice> {
        self.choices.get(index)
    }

    #[must_use]
    pub fn choices(&self) -> &[ScheduleChoice] {
        &self.choices
    }

    /// Replaces the choice of a course.
    ///
    /// # Errors
    /// - If the index is out of range.
    /// - If the choice is made for a different course than the one at the index.
    pub fn set(&mut self, index: usize, choice: ScheduleChoice) -> Result<(), SolutionError> {
        let len = self.choices.len();
        let slot = self
            .choices
            .get_mut(index)
            .ok_or(SolutionError::IndexOutOfRange { index, len })?;

        if choice.course != index {
            return Err(SolutionError::CourseMismatch {
                index,
                course: choice.course,
            });
        }

        *slot = choice;
        Ok(())
    }

    /// Returns whether the solution has one choice per course of the problem, in course order.
    #[must_use]
    pub fn is_complete(&self, problem: &Problem) -> bool {
        self.choices.len() == problem.courses().len()
            && self.choices.iter().enumerate().all(|(i, c)| c.course == i)
    }
}

impl FromIterator<ScheduleChoice> for Solution {
    fn from_iter<T: IntoIterator<Item = ScheduleChoice>>(iter: T) -> Self {
        Self::from_choices(iter.into_iter().collect())
    }
}
