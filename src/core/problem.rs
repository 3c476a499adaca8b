use ahash::{HashSet, HashSetExt};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// The number of days in the exam period.
pub const EXAM_PERIOD: usize = 5;

/// The number of exam time slots in a day.
pub const TIME_SLOTS: usize = 4;

/// The number of exams every student has to write.
pub const COURSES_PER_STUDENT: usize = 5;

/// Errors raised while building a problem instance.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ProblemError {
    #[error("course `{0}` is defined more than once")]
    DuplicateCourse(String),
    #[error("room `{0}` is defined more than once")]
    DuplicateRoom(String),
    #[error("problem needs at least one room")]
    NoRooms,
    #[error("student `{0}` takes course {1} twice")]
    DuplicateEnrollment(String, usize),
    #[error("student `{0}` takes unknown course {1}")]
    UnknownCourse(String, usize),
    #[error("at least {COURSES_PER_STUDENT} courses are required, got {0}")]
    TooFewCourses(usize),
    #[error("at most {1} distinct course names can be generated, got {0} courses")]
    TooManyCourses(usize, usize),
    #[error("at most {1} distinct room names can be generated, got {0} rooms")]
    TooManyRooms(usize, usize),
}

/// A course which needs an exam, identified by its name.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct Course {
    name: String,
}

impl Course {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An exam room, identified by its name.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct Room {
    name: String,
}

impl Room {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A student with the indices of the courses they take.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct Student {
    name: String,
    courses: [usize; COURSES_PER_STUDENT],
}

impl Student {
    /// Creates a new student.
    ///
    /// # Errors
    /// - If the same course is listed twice.
    pub fn new(
        name: impl Into<String>,
        courses: [usize; COURSES_PER_STUDENT],
    ) -> Result<Self, ProblemError> {
        let name = name.into();

        for (i, course) in courses.iter().enumerate() {
            if courses[..i].contains(course) {
                return Err(ProblemError::DuplicateEnrollment(name, *course));
            }
        }

        Ok(Self { name, courses })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the indices of the courses the student takes.
    #[must_use]
    pub const fn courses(&self) -> &[usize; COURSES_PER_STUDENT] {
        &self.courses
    }
}

/// An instance of the exam scheduling problem.
///
/// Courses and rooms are referred to by their position in the problem.
/// A problem never changes after creation; every instance carries an id
/// which is used to key scoring caches.
#[derive(Clone, Debug, Serialize)]
pub struct Problem {
    #[serde(skip)]
    id: u64,
    courses: Vec<Course>,
    rooms: Vec<Room>,
    students: Vec<Student>,
}

impl Problem {
    /// Creates a new instance of the exam scheduling problem.
    ///
    /// # Errors
    /// - If course or room names are not unique.
    /// - If there are no rooms.
    /// - If a student takes a course which does not exist.
    pub fn new(
        courses: Vec<Course>,
        rooms: Vec<Room>,
        students: Vec<Student>,
    ) -> Result<Self, ProblemError> {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);

        let mut names = HashSet::with_capacity(courses.len());
        if let Some(course) = courses.iter().find(|course| !names.insert(course.name())) {
            return Err(ProblemError::DuplicateCourse(course.name.clone()));
        }

        if rooms.is_empty() {
            return Err(ProblemError::NoRooms);
        }

        let mut names = HashSet::with_capacity(rooms.len());
        if let Some(room) = rooms.iter().find(|room| !names.insert(room.name())) {
            return Err(ProblemError::DuplicateRoom(room.name.clone()));
        }

        for student in &students {
            if let Some(&course) = student.courses.iter().find(|&&c| c >= courses.len()) {
                return Err(ProblemError::UnknownCourse(student.name.clone(), course));
            }
        }

        Ok(Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            courses,
            rooms,
            students,
        })
    }

    /// Returns the identity of the problem.
    /// Clones share the identity.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    #[must_use]
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// The number of days in the exam period.
    #[must_use]
    pub const fn exam_period(&self) -> usize {
        EXAM_PERIOD
    }

    /// The number of time slots in a day.
    #[must_use]
    pub const fn time_slots(&self) -> usize {
        TIME_SLOTS
    }

    /// Computes the number of students enrolled in every course.
    #[must_use]
    pub fn course_sizes(&self) -> Vec<u64> {
        let mut sizes = vec![0; self.courses.len()];
        for student in &self.students {
            for &course in &student.courses {
                sizes[course] += 1;
            }
        }
        sizes
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Builds a problem with generated course and room names.
    pub(crate) fn problem(
        courses: usize,
        rooms: usize,
        students: &[[usize; COURSES_PER_STUDENT]],
    ) -> Problem {
        let courses = (0..courses).map(|i| Course::new(format!("CPSC {i}"))).collect();
        let rooms = (0..rooms).map(|i| Room::new(format!("DMP {i}"))).collect();
        let students = students
            .iter()
            .enumerate()
            .map(|(i, &schedule)| Student::new(format!("STUDENT {i}"), schedule))
            .collect::<Result<_, _>>();

        match students.and_then(|students| Problem::new(courses, rooms, students)) {
            Ok(problem) => problem,
            Err(err) => panic!("invalid test problem: {err}"),
        }
    }

    #[test]
    fn student_should_reject_duplicate_course() {
        let student = Student::new("JOHN WU", [0, 1, 2, 1, 3]);
        assert_eq!(
            student,
            Err(ProblemError::DuplicateEnrollment("JOHN WU".into(), 1))
        );
    }

    #[test]
    fn problem_should_validate_names_and_indices() -> anyhow::Result<()> {
        let courses = vec![Course::new("MATH 200"), Course::new("MATH 200")];
        let err = Problem::new(courses, vec![Room::new("DMP 110")], vec![]);
        assert_eq!(err.err(), Some(ProblemError::DuplicateCourse("MATH 200".into())));

        let err = Problem::new(vec![Course::new("MATH 200")], vec![], vec![]);
        assert_eq!(err.err(), Some(ProblemError::NoRooms));

        let rooms = vec![Room::new("DMP 110"), Room::new("DMP 110")];
        let err = Problem::new(vec![], rooms, vec![]);
        assert_eq!(err.err(), Some(ProblemError::DuplicateRoom("DMP 110".into())));

        let courses = (0..5).map(|i| Course::new(format!("PHYS {i}"))).collect();
        let students = vec![Student::new("MARY LUM", [0, 1, 2, 3, 7])?];
        let err = Problem::new(courses, vec![Room::new("DMP 110")], students);
        assert_eq!(err.err(), Some(ProblemError::UnknownCourse("MARY LUM".into(), 7)));

        Ok(())
    }

    #[test]
    fn problem_should_count_course_sizes() {
        let problem = problem(7, 1, &[[0, 1, 2, 3, 4], [2, 3, 4, 5, 6]]);
        assert_eq!(problem.course_sizes(), vec![1, 1, 2, 2, 2, 1, 1]);
    }

    #[test]
    fn problems_should_have_distinct_ids() {
        let first = problem(5, 1, &[]);
        let second = problem(5, 1, &[]);
        assert_ne!(first.id(), second.id());
        assert_eq!(first.id(), first.clone().id());
    }
}
