//! Client side of the course outline contract.
//!
//! The backend computes `status`, `isCurrent` and `canOpen` for every lesson.
//! Nothing here recomputes those fields: the helpers read them, gate
//! navigation on them and report (without correcting) outlines that break
//! the contract.

use crate::model::{CourseOutline, EnrollmentStatus, LessonOutlineItem, LessonStatus};
use crate::quiz;
use thiserror::Error;
use tracing::{debug, warn};

pub const LOCKED_MESSAGE: &str =
    "This lesson is locked. Complete previous lessons or wait for the scheduled unlock.";
pub const NOT_ACCESSIBLE_MESSAGE: &str = "You cannot access this lesson yet.";
pub const BLOCKED_ENROLLMENT_MESSAGE: &str = "Your enrollment is blocked. Please contact support.";
pub const NOT_ENROLLED_MESSAGE: &str = "You are not enrolled in this course.";

/// Lessons of every module in outline order.
pub fn lessons(outline: &CourseOutline) -> impl Iterator<Item = &LessonOutlineItem> {
    outline.modules.iter().flat_map(|module| module.lessons.iter())
}

pub fn find_lesson(outline: &CourseOutline, lesson_id: i64) -> Option<&LessonOutlineItem> {
    lessons(outline).find(|lesson| lesson.id == lesson_id)
}

/// The lesson named by `currentLessonId`.
pub fn current_lesson(outline: &CourseOutline) -> Option<&LessonOutlineItem> {
    outline
        .current_lesson_id
        .and_then(|id| find_lesson(outline, id))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Locked,
    NotYetAccessible,
}

impl BlockReason {
    pub fn message(self) -> &'static str {
        match self {
            BlockReason::Locked => LOCKED_MESSAGE,
            BlockReason::NotYetAccessible => NOT_ACCESSIBLE_MESSAGE,
        }
    }
}

/// What a tap on a syllabus row leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonClick {
    Open(i64),
    Blocked(BlockReason),
}

/// Gates navigation on the backend's `canOpen`, even if the status looks open.
pub fn click_lesson(lesson: &LessonOutlineItem) -> LessonClick {
    if lesson.can_open {
        return LessonClick::Open(lesson.id);
    }

    let reason = match lesson.status {
        LessonStatus::Locked => BlockReason::Locked,
        _ => BlockReason::NotYetAccessible,
    };
    debug!("Lesson {} is not openable: {:?}", lesson.id, reason);
    LessonClick::Blocked(reason)
}

/// The primary call to action under the course header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinueAction {
    /// "Continue Learning" into the current lesson.
    Resume(i64),
    /// Active enrollment with nothing left to resume.
    Review,
    Blocked,
    NotEnrolled,
    /// Enrollment already completed.
    Finished,
}

pub fn continue_action(outline: &CourseOutline) -> ContinueAction {
    match outline.enrollment_status {
        EnrollmentStatus::Active => match outline.current_lesson_id {
            Some(id) => ContinueAction::Resume(id),
            None => ContinueAction::Review,
        },
        EnrollmentStatus::Blocked => ContinueAction::Blocked,
        EnrollmentStatus::NotEnrolled => ContinueAction::NotEnrolled,
        EnrollmentStatus::Completed => ContinueAction::Finished,
    }
}

pub fn enrollment_notice(status: EnrollmentStatus) -> Option<&'static str> {
    match status {
        EnrollmentStatus::Blocked => Some(BLOCKED_ENROLLMENT_MESSAGE),
        EnrollmentStatus::NotEnrolled => Some(NOT_ENROLLED_MESSAGE),
        EnrollmentStatus::Active | EnrollmentStatus::Completed => None,
    }
}

/// A way in which an outline disagrees with the lesson-state contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutlineDiscrepancy {
    #[error("lesson {lesson_id} is locked but openable")]
    LockedButOpenable { lesson_id: i64 },

    #[error("lesson {lesson_id} is completed but not openable for review")]
    CompletedNotOpenable { lesson_id: i64 },

    #[error("lesson {lesson_id} is completed but marked current")]
    CompletedMarkedCurrent { lesson_id: i64 },

    #[error("lesson {lesson_id} is current but not openable")]
    CurrentNotOpenable { lesson_id: i64 },

    #[error("lessons {lesson_ids:?} are all marked current")]
    MultipleCurrent { lesson_ids: Vec<i64> },

    #[error("lesson {lesson_id} is current while the enrollment is {status:?}")]
    CurrentWithoutActiveEnrollment {
        lesson_id: i64,
        status: EnrollmentStatus,
    },

    #[error("lesson {lesson_id} is openable while the enrollment is {status:?}")]
    OpenableWithoutAccess {
        lesson_id: i64,
        status: EnrollmentStatus,
    },

    #[error("currentLessonId is {reported:?} but the flagged lesson is {flagged:?}")]
    CurrentIdMismatch {
        reported: Option<i64>,
        flagged: Option<i64>,
    },

    #[error("no current lesson although lesson {lesson_id} is incomplete and openable")]
    MissingCurrent { lesson_id: i64 },

    #[error("quiz lesson {lesson_id} reports canRetake={reported} but the attempt rule gives {derived}")]
    RetakeMismatch {
        lesson_id: i64,
        reported: bool,
        derived: bool,
    },
}

/// Checks an outline against the contract and logs every discrepancy.
///
/// The outline is returned untouched to the caller; this is a diagnostic only.
pub fn check_outline(outline: &CourseOutline) -> Vec<OutlineDiscrepancy> {
    let mut found = Vec::new();
    let status = outline.enrollment_status;

    for lesson in lessons(outline) {
        match lesson.status {
            LessonStatus::Locked if lesson.can_open => {
                found.push(OutlineDiscrepancy::LockedButOpenable {
                    lesson_id: lesson.id,
                });
            }
            LessonStatus::Completed => {
                if !lesson.can_open && status.allows_access() {
                    found.push(OutlineDiscrepancy::CompletedNotOpenable {
                        lesson_id: lesson.id,
                    });
                }
                if lesson.is_current {
                    found.push(OutlineDiscrepancy::CompletedMarkedCurrent {
                        lesson_id: lesson.id,
                    });
                }
            }
            _ => {}
        }

        if lesson.can_open && !status.allows_access() {
            found.push(OutlineDiscrepancy::OpenableWithoutAccess {
                lesson_id: lesson.id,
                status,
            });
        }

        if lesson.is_current {
            if !lesson.can_open {
                found.push(OutlineDiscrepancy::CurrentNotOpenable {
                    lesson_id: lesson.id,
                });
            }
            if status != EnrollmentStatus::Active {
                found.push(OutlineDiscrepancy::CurrentWithoutActiveEnrollment {
                    lesson_id: lesson.id,
                    status,
                });
            }
        }

        if lesson.is_quiz {
            if let (Some(reported), Some(used)) = (lesson.can_retake, lesson.attempts_used) {
                let max_attempts = lesson.max_attempts.or(outline.max_quiz_attempts);
                let derived = quiz::retake_allowed(outline.allow_retake_quiz, max_attempts, used);
                if reported != derived {
                    found.push(OutlineDiscrepancy::RetakeMismatch {
                        lesson_id: lesson.id,
                        reported,
                        derived,
                    });
                }
            }
        }
    }

    let flagged: Vec<i64> = lessons(outline)
        .filter(|lesson| lesson.is_current)
        .map(|lesson| lesson.id)
        .collect();
    if flagged.len() > 1 {
        found.push(OutlineDiscrepancy::MultipleCurrent {
            lesson_ids: flagged.clone(),
        });
    } else if flagged.first().copied() != outline.current_lesson_id {
        found.push(OutlineDiscrepancy::CurrentIdMismatch {
            reported: outline.current_lesson_id,
            flagged: flagged.first().copied(),
        });
    }

    if outline.current_lesson_id.is_none() && status == EnrollmentStatus::Active {
        if let Some(resumable) = lessons(outline)
            .find(|lesson| lesson.can_open && !lesson.status.is_completed())
        {
            found.push(OutlineDiscrepancy::MissingCurrent {
                lesson_id: resumable.id,
            });
        }
    }

    for discrepancy in &found {
        warn!(
            "Outline of course {} disagrees with the backend contract: {}",
            outline.course_id, discrepancy
        );
    }

    found
}
