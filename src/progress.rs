use crate::model::{CourseWithProgress, EnrollmentStatus};

/// `round(100 * completed / total)`, or 0 for an empty course.
pub fn percent(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as f64;
    (completed * 100.0 / total as f64).round() as u32
}

/// e.g. `2 / 4 lessons (50%)`
pub fn lesson_progress_label(completed: u32, total: u32) -> String {
    format!(
        "{} / {} lessons ({}%)",
        completed,
        total,
        percent(completed, total)
    )
}

pub fn score_label(score: i32, total_score: i32) -> String {
    format!("{} / {}", score, total_score)
}

pub fn percent_label(percent: u32) -> String {
    format!("{}%", percent)
}

/// Aggregates shown on the progress page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressStats {
    pub total_courses: usize,
    pub active_courses: usize,
    pub completed_courses: usize,
    pub total_lessons: u32,
    pub completed_lessons: u32,
    /// Courses with some but not all lessons completed.
    pub in_progress_courses: usize,
    pub overall_percent: u32,
}

impl ProgressStats {
    pub fn from_courses(courses: &[CourseWithProgress]) -> Self {
        let total_lessons = courses
            .iter()
            .fold(0u32, |sum, c| sum.saturating_add(c.total_lessons));
        let completed_lessons = courses
            .iter()
            .fold(0u32, |sum, c| sum.saturating_add(c.completed_lessons));

        ProgressStats {
            total_courses: courses.len(),
            active_courses: count_with_status(courses, EnrollmentStatus::Active),
            completed_courses: count_with_status(courses, EnrollmentStatus::Completed),
            total_lessons,
            completed_lessons,
            in_progress_courses: courses
                .iter()
                .filter(|c| c.completed_lessons > 0 && c.completed_lessons < c.total_lessons)
                .count(),
            overall_percent: percent(completed_lessons, total_lessons),
        }
    }
}

fn count_with_status(courses: &[CourseWithProgress], status: EnrollmentStatus) -> usize {
    courses.iter().filter(|c| c.status == status).count()
}

/// Progress of a single enrolled course.
pub fn course_percent(course: &CourseWithProgress) -> u32 {
    percent(course.completed_lessons, course.total_lessons)
}
