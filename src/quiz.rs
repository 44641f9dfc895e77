use crate::errors::AppError;
use crate::model::LessonOutlineItem;

/// Wire value for a question without a selected option.
pub const UNANSWERED: i32 = -1;

pub const MAX_ATTEMPTS_MESSAGE: &str = "Maximum attempts reached";
pub const RETAKE_NOT_ALLOWED_MESSAGE: &str = "Quiz retake is not allowed";
pub const UNANSWERED_MESSAGE: &str = "Please answer all questions before submitting.";

/// `allowRetakeQuiz && (maxAttempts is unlimited || attemptsUsed < maxAttempts)`
pub fn retake_allowed(allow_retake: bool, max_attempts: Option<u32>, attempts_used: u32) -> bool {
    allow_retake && max_attempts.is_none_or(|max| attempts_used < max)
}

/// Letter shown before an option (`A`, `B`, ...), or its 1-based number past `Z`.
pub fn option_label(index: usize) -> String {
    u32::try_from(index)
        .ok()
        .filter(|offset| *offset < 26)
        .and_then(|offset| char::from_u32('A' as u32 + offset))
        .map_or_else(|| (index + 1).to_string(), String::from)
}

/// Answers being collected for one quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizForm {
    answers: Vec<Option<usize>>,
    option_counts: Vec<usize>,
    current: usize,
}

impl QuizForm {
    /// Starts an attempt with every question unanswered.
    pub fn new(option_counts: Vec<usize>) -> Self {
        QuizForm {
            answers: vec![None; option_counts.len()],
            option_counts,
            current: 0,
        }
    }

    pub fn question_count(&self) -> usize {
        self.answers.len()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn answer(&self, question: usize) -> Option<usize> {
        self.answers.get(question).copied().flatten()
    }

    pub fn is_answered(&self, question: usize) -> bool {
        self.answer(question).is_some()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.answers.iter().all(Option::is_some)
    }

    pub fn select(&mut self, question: usize, option: usize) -> Result<(), AppError> {
        let Some(&options) = self.option_counts.get(question) else {
            return Err(AppError::Validation(format!(
                "Question {} does not exist.",
                question + 1
            )));
        };
        if option >= options {
            return Err(AppError::Validation(format!(
                "Question {} has no option {}.",
                question + 1,
                option + 1
            )));
        }
        self.answers[question] = Some(option);
        Ok(())
    }

    /// Backward moves are always allowed, forward ones only past answered questions.
    pub fn can_go_to(&self, question: usize) -> bool {
        if question >= self.question_count() {
            return false;
        }
        question <= self.current || (self.current..question).all(|q| self.is_answered(q))
    }

    pub fn go_to(&mut self, question: usize) -> bool {
        if self.can_go_to(question) {
            self.current = question;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.current + 1)
    }

    pub fn previous(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(question) => self.go_to(question),
            None => false,
        }
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.question_count()
    }

    /// Answers in wire form, with `UNANSWERED` for gaps.
    pub fn to_wire(&self) -> Vec<i32> {
        self.answers
            .iter()
            .map(|answer| answer.map_or(UNANSWERED, |option| option as i32))
            .collect()
    }

    /// Answers ready for submission, or a validation error if any is missing.
    pub fn submission(&self) -> Result<Vec<i32>, AppError> {
        if !self.is_complete() {
            return Err(AppError::Validation(UNANSWERED_MESSAGE.to_string()));
        }
        Ok(self.to_wire())
    }

    /// Clears every answer and returns to the first question.
    pub fn reset(&mut self) {
        self.answers.iter_mut().for_each(|answer| *answer = None);
        self.current = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetakeAvailability {
    Allowed,
    MaxAttemptsReached,
    NotAllowed,
}

impl RetakeAvailability {
    pub fn message(self) -> Option<&'static str> {
        match self {
            RetakeAvailability::Allowed => None,
            RetakeAvailability::MaxAttemptsReached => Some(MAX_ATTEMPTS_MESSAGE),
            RetakeAvailability::NotAllowed => Some(RETAKE_NOT_ALLOWED_MESSAGE),
        }
    }
}

/// What a finished quiz shows instead of its questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub last_score_percent: Option<u32>,
    pub attempts_used: Option<u32>,
    pub max_attempts: Option<u32>,
    pub retake: RetakeAvailability,
}

impl QuizSummary {
    /// Built from the outline row; `canRetake` comes from the backend as-is.
    ///
    /// `course_max_attempts` applies when the lesson carries no limit of its own.
    pub fn from_outline_item(item: &LessonOutlineItem, course_max_attempts: Option<u32>) -> Self {
        let max_attempts = item.max_attempts.or(course_max_attempts);
        let retake = if item.can_retake.unwrap_or(false) {
            RetakeAvailability::Allowed
        } else {
            match (max_attempts, item.attempts_used) {
                (Some(max), Some(used)) if used >= max => RetakeAvailability::MaxAttemptsReached,
                _ => RetakeAvailability::NotAllowed,
            }
        };

        QuizSummary {
            last_score_percent: item.last_score_percent,
            attempts_used: item.attempts_used,
            max_attempts,
            retake,
        }
    }

    /// Summary when outline metadata could not be loaded.
    pub fn unavailable() -> Self {
        QuizSummary {
            last_score_percent: None,
            attempts_used: None,
            max_attempts: None,
            retake: RetakeAvailability::NotAllowed,
        }
    }

    /// e.g. `Attempts used: 2 / 3`, or `Attempts used: 2` when unlimited.
    pub fn attempts_label(&self) -> Option<String> {
        let used = self.attempts_used?;
        Some(match self.max_attempts {
            Some(max) => format!("Attempts used: {} / {}", used, max),
            None => format!("Attempts used: {}", used),
        })
    }
}
