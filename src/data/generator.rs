use crate::core::{Course, Problem, ProblemError, Room, Student, COURSES_PER_STUDENT};
use rand::prelude::*;

const COURSE_PREFIXES: [&str; 8] = ["CPSC", "MATH", "PHIL", "EECE", "CHEM", "ECON", "PHYS", "COGS"];

const BUILDINGS: [&str; 7] = ["ICCS", "DMP", "MATH", "SCR", "OSBR", "MCML", "CEME"];

/// Course names of the wider pattern are `PREFIX <level><0..100>`.
const MAX_COURSES: usize = COURSE_PREFIXES.len() * 4 * 100;

/// Room names of the wider pattern are `BUILDING <100..500>`.
const MAX_ROOMS: usize = BUILDINGS.len() * 400;

const FIRST_NAMES: [&str; 25] = [
    "JAMES", "JOHN", "ROBERT", "MARY", "MICHAEL", "WILLIAM", "DAVID", "CAROL", "RICHARD",
    "CHARLES", "JOSEPH", "THOMAS", "PATRICIA", "SANDRA", "LEANNE", "LINDA", "CHRISTOPHER",
    "BARBARA", "DANIEL", "PAUL", "MARK", "ELIZABETH", "JENNIFER", "LIN", "MARIA",
];

const LAST_NAMES: [&str; 27] = [
    "JOHNSON", "WILLIAMS", "JONES", "BROWN", "DAVIS", "MILLER", "YANG", "WILSON", "MOORE", "WONG",
    "TAYLOR", "WU", "ANDERSON", "SHEN", "THOMAS", "JACKSON", "CHAN", "LUM", "WHITE", "HARRIS",
    "TSAI", "MARTIN", "THOMPSON", "GARCIA", "MARTINEZ", "KAO", "ROBINSON",
];

/// Generates random problem instances.
///
/// Students mostly follow "standard schedules": blocks of five consecutive
/// courses. Crispness is the chance a student keeps a course of their block,
/// so 1.0 makes every student follow a standard schedule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Generator {
    pub courses: usize,
    pub rooms: usize,
    pub students: usize,
    pub crispness: f64,
}

impl Generator {
    #[must_use]
    pub const fn new(courses: usize, rooms: usize, students: usize, crispness: f64) -> Self {
        Self {
            courses,
            rooms,
            students,
            crispness,
        }
    }

    /// Generates a problem from the given seed.
    ///
    /// # Errors
    /// - If there are fewer courses than a student takes.
    /// - If there are more courses or rooms than distinct names.
    /// - If the problem is invalid, e.g. has no rooms.
    pub fn generate(&self, seed: u64) -> Result<Problem, ProblemError> {
        if self.courses < COURSES_PER_STUDENT {
            return Err(ProblemError::TooFewCourses(self.courses));
        }
        if self.courses > MAX_COURSES {
            return Err(ProblemError::TooManyCourses(self.courses, MAX_COURSES));
        }
        if self.rooms > MAX_ROOMS {
            return Err(ProblemError::TooManyRooms(self.rooms, MAX_ROOMS));
        }

        let mut rng = StdRng::seed_from_u64(seed);

        let mut courses: Vec<Course> = Vec::with_capacity(self.courses);
        for _ in 0..self.courses {
            let mut name = course_name(&mut rng, 20, true);
            while courses.iter().any(|course| course.name() == name) {
                name = course_name(&mut rng, 100, false);
            }
            courses.push(Course::new(name));
        }

        let mut rooms: Vec<Room> = Vec::with_capacity(self.rooms);
        for _ in 0..self.rooms {
            let building = pick(&mut rng, &BUILDINGS);
            let mut name = format!("{building} {:04}", rng.gen_range(0..5000));
            while rooms.iter().any(|room| room.name() == name) {
                let building = pick(&mut rng, &BUILDINGS);
                name = format!("{building} {}", rng.gen_range(100..500));
            }
            rooms.push(Room::new(name));
        }

        let students = (0..self.students)
            .map(|_| self.student(&mut rng))
            .collect::<Result<_, _>>()?;

        let problem = Problem::new(courses, rooms, students)?;
        log::debug!(
            "Generated problem with {} courses, {} rooms and {} students",
            self.courses,
            self.rooms,
            self.students
        );
        Ok(problem)
    }

    /// Generates `count` problems from consecutive seeds, wrapping at `u64::MAX`.
    ///
    /// # Errors
    /// - If any of the problems can't be generated, see [`Generator::generate`].
    pub fn generate_batch(&self, seed: u64, count: u64) -> Result<Vec<Problem>, ProblemError> {
        (0..count)
            .map(|i| self.generate(seed.wrapping_add(i)))
            .collect()
    }

    fn student(&self, rng: &mut impl Rng) -> Result<Student, ProblemError> {
        let name = format!("{} {}", pick(rng, &FIRST_NAMES), pick(rng, &LAST_NAMES));

        let standard_schedules = self.courses / COURSES_PER_STUDENT;
        let start = COURSES_PER_STUDENT * rng.gen_range(0..standard_schedules);

        let mut courses = [0; COURSES_PER_STUDENT];
        for i in 0..COURSES_PER_STUDENT {
            let mut course = start + i;
            if rng.gen::<f64>() > self.crispness {
                course = rng.gen_range(0..self.courses);
            }
            while courses[..i].contains(&course) {
                course = rng.gen_range(0..self.courses);
            }
            courses[i] = course;
        }

        Student::new(name, courses)
    }
}

fn pick<'a>(rng: &mut impl Rng, names: &[&'a str]) -> &'a str {
    names.choose(rng).copied().unwrap_or_default()
}

fn course_name(rng: &mut impl Rng, numbers: usize, padded: bool) -> String {
    let prefix = pick(rng, &COURSE_PREFIXES);
    let level = rng.gen_range(1..=4);
    let number = rng.gen_range(0..numbers);
    if padded {
        format!("{prefix} {level}{number:02}")
    } else {
        format!("{prefix} {level}{number}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn generator_should_create_valid_problem() -> anyhow::Result<()> {
        let generator = Generator::new(40, 2, 500, 0.95);
        let problem = generator.generate(0)?;

        assert_eq!(problem.courses().len(), 40);
        assert_eq!(problem.rooms().len(), 2);
        assert_eq!(problem.students().len(), 500);
        assert_eq!(problem.course_sizes().iter().sum::<u64>(), 500 * 5);

        Ok(())
    }

    #[test]
    fn generator_should_repeat_with_seed() -> anyhow::Result<()> {
        let generator = Generator::new(20, 3, 50, 0.5);
        let first = generator.generate(7)?;
        let second = generator.generate(7)?;

        assert_eq!(first.courses(), second.courses());
        assert_eq!(first.rooms(), second.rooms());
        assert_eq!(first.students(), second.students());
        assert_ne!(first.id(), second.id());

        Ok(())
    }

    #[test]
    fn crisp_students_should_follow_standard_schedules() -> anyhow::Result<()> {
        let problem = Generator::new(15, 1, 30, 1.0).generate(3)?;

        for student in problem.students() {
            let start = student.courses()[0];
            assert_eq!(start % COURSES_PER_STUDENT, 0);
            assert_eq!(*student.courses(), [0, 1, 2, 3, 4].map(|i| start + i));
        }

        Ok(())
    }

    #[test]
    fn generator_should_reject_too_few_courses() {
        let generator = Generator::new(4, 1, 10, 0.9);
        assert_eq!(generator.generate(0).err(), Some(ProblemError::TooFewCourses(4)));

        let generator = Generator::new(10, 0, 10, 0.9);
        assert_eq!(generator.generate(0).err(), Some(ProblemError::NoRooms));
    }

    #[test]
    fn generator_should_reject_more_than_name_space() {
        let generator = Generator::new(MAX_COURSES + 1, 1, 10, 0.9);
        assert_eq!(
            generator.generate(0).err(),
            Some(ProblemError::TooManyCourses(MAX_COURSES + 1, MAX_COURSES))
        );

        let generator = Generator::new(10, MAX_ROOMS + 1, 10, 0.9);
        assert_eq!(
            generator.generate(0).err(),
            Some(ProblemError::TooManyRooms(MAX_ROOMS + 1, MAX_ROOMS))
        );
    }

    #[test]
    fn generator_should_name_every_course_at_capacity() -> anyhow::Result<()> {
        let problem = Generator::new(MAX_COURSES, 1, 0, 0.9).generate(5)?;
        assert_eq!(problem.courses().len(), MAX_COURSES);
        Ok(())
    }

    #[test]
    fn batch_should_wrap_seeds() -> anyhow::Result<()> {
        let generator = Generator::new(10, 1, 20, 0.9);
        let batch = generator.generate_batch(u64::MAX, 2)?;

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].students(), generator.generate(u64::MAX)?.students());
        assert_eq!(batch[1].students(), generator.generate(0)?.students());

        Ok(())
    }
}
