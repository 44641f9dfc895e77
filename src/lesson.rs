//! Per-lesson view state: loading, completion, video hand-off and the quiz flow.

use crate::api::LearnerBackend;
use crate::errors::{AppError, ErrorKind, ViewError};
use crate::model::{
    CompletionResponse, LessonDetail, LessonOutlineItem, LessonStatus, LessonType, QuizResult,
    QuizRetakeResponse,
};
use crate::outline::{self, LessonClick};
use crate::quiz::{QuizForm, QuizSummary, RETAKE_NOT_ALLOWED_MESSAGE, RetakeAvailability};
use tracing::{debug, error, info, instrument, warn};

pub const VIDEO_FALLBACK_MESSAGE: &str = "Failed to send video. Please try again.";
pub const RETAKE_FAILED_MESSAGE: &str = "Failed to start quiz retake. Please try again.";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load lesson";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Completing,
    RequestingVideo,
    Answering,
    Submitting,
    Result,
    Summary,
    Retaking,
    Failed,
}

impl Phase {
    /// A mutating call is awaiting the backend.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            Phase::Loading
                | Phase::Completing
                | Phase::RequestingVideo
                | Phase::Submitting
                | Phase::Retaking
        )
    }
}

/// Where the host should go once an action succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Back to the course syllabus.
    BackToCourse(i64),
    /// Close the mini app; the content continues in the chat.
    ExitApp,
}

#[derive(Debug, Clone)]
pub enum CompleteOutcome {
    Completed {
        completion: CompletionResponse,
        next: Transition,
    },
    /// The lesson was already completed; nothing was sent.
    AlreadyCompleted,
}

/// Which controls the view shows and whether they accept input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LessonActions {
    pub show_complete: bool,
    pub complete_enabled: bool,
    pub show_watch_in_chat: bool,
    pub watch_in_chat_enabled: bool,
    pub show_submit: bool,
    pub submit_enabled: bool,
    pub show_retake: bool,
    pub retake_enabled: bool,
}

/// State of one opened lesson, scoped to a single (course, lesson) route.
///
/// Dropping the session discards whatever its pending calls would have written.
#[derive(Debug)]
pub struct LessonSession<B: LearnerBackend> {
    backend: B,
    course_id: i64,
    lesson_id: i64,
    phase: Phase,
    lesson: Option<LessonDetail>,
    meta: Option<LessonOutlineItem>,
    course_max_attempts: Option<u32>,
    quiz: Option<QuizForm>,
    result: Option<QuizResult>,
    load_error: Option<String>,
    inline_error: Option<String>,
}

impl<B: LearnerBackend> LessonSession<B> {
    pub fn new(backend: B, course_id: i64, lesson_id: i64) -> Self {
        LessonSession {
            backend,
            course_id,
            lesson_id,
            phase: Phase::Loading,
            lesson: None,
            meta: None,
            course_max_attempts: None,
            quiz: None,
            result: None,
            load_error: None,
            inline_error: None,
        }
    }

    pub fn course_id(&self) -> i64 {
        self.course_id
    }

    pub fn lesson_id(&self) -> i64 {
        self.lesson_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn lesson(&self) -> Option<&LessonDetail> {
        self.lesson.as_ref()
    }

    /// Outline row of this lesson; `None` when the outline could not be loaded.
    pub fn meta(&self) -> Option<&LessonOutlineItem> {
        self.meta.as_ref()
    }

    pub fn quiz(&self) -> Option<&QuizForm> {
        self.quiz.as_ref()
    }

    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Last mutation failure, shown next to the control that triggered it.
    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    /// Loads the lesson and its outline row concurrently.
    ///
    /// The lesson is required. A row with `canOpen=false` refuses the lesson
    /// and leaves no action available. Without the outline the view continues
    /// with no quiz metadata and no gate.
    #[instrument(skip(self), fields(course_id = self.course_id, lesson_id = self.lesson_id))]
    pub async fn load(&mut self) -> Result<(), ViewError> {
        self.load_with(false).await
    }

    async fn load_with(&mut self, force_answering: bool) -> Result<(), ViewError> {
        self.phase = Phase::Loading;
        self.load_error = None;

        let (lesson, outline) = tokio::join!(
            self.backend
                .get_lesson_detail(self.course_id, self.lesson_id),
            self.backend.get_course_outline(self.course_id),
        );

        let lesson = match lesson {
            Ok(lesson) => lesson,
            Err(err) => {
                error!("Failed to load lesson {}: {:?}", self.lesson_id, err);
                self.phase = Phase::Failed;
                self.load_error = Some(LOAD_FAILED_MESSAGE.to_string());
                return Err(ViewError::new(ErrorKind::Fetch, err));
            }
        };

        self.meta = match outline {
            Ok(outline) => {
                outline::check_outline(&outline);
                self.course_max_attempts = outline.max_quiz_attempts;
                let meta = outline::find_lesson(&outline, self.lesson_id).cloned();
                if meta.is_none() {
                    warn!(
                        "Lesson {} is missing from the outline of course {}",
                        self.lesson_id, self.course_id
                    );
                }
                meta
            }
            Err(err) => {
                let degraded = ViewError::new(ErrorKind::PartialData, err);
                debug!("Continuing without quiz metadata: {}", degraded);
                self.course_max_attempts = None;
                None
            }
        };

        if let Some(LessonClick::Blocked(reason)) = self.meta.as_ref().map(outline::click_lesson) {
            warn!(
                "Lesson {} of course {} is not openable: {:?}",
                self.lesson_id, self.course_id, reason
            );
            self.phase = Phase::Failed;
            self.lesson = None;
            self.quiz = None;
            self.result = None;
            self.load_error = Some(reason.message().to_string());
            return Err(ViewError::new(
                ErrorKind::Fetch,
                AppError::Forbidden(reason.message().to_string()),
            ));
        }

        self.phase = match lesson.lesson_type {
            LessonType::Quiz if lesson.status.is_completed() && !force_answering => {
                self.quiz = None;
                Phase::Summary
            }
            LessonType::Quiz => {
                let option_counts = lesson.questions().iter().map(|q| q.options.len()).collect();
                self.quiz = Some(QuizForm::new(option_counts));
                Phase::Answering
            }
            LessonType::Text | LessonType::File | LessonType::Video => Phase::Ready,
        };
        self.result = None;

        info!(
            "Lesson {} ({:?}, {:?}) ready in phase {:?}",
            lesson.id, lesson.lesson_type, lesson.status, self.phase
        );
        self.lesson = Some(lesson);
        Ok(())
    }

    pub fn actions(&self) -> LessonActions {
        let Some(lesson) = &self.lesson else {
            return LessonActions::default();
        };
        let busy = self.phase.is_busy();
        let completed = lesson.status.is_completed();

        let mut actions = LessonActions::default();
        match lesson.lesson_type {
            LessonType::Text | LessonType::File => {
                actions.show_complete = !completed;
            }
            LessonType::Video => {
                if lesson.playable_video_url().is_some() {
                    actions.show_complete = !completed;
                } else {
                    actions.show_watch_in_chat = true;
                    actions.watch_in_chat_enabled = !busy;
                }
            }
            LessonType::Quiz => {
                actions.show_submit = matches!(self.phase, Phase::Answering | Phase::Submitting);
                actions.submit_enabled = self.can_submit();
                actions.show_retake = self.retake_offered();
                actions.retake_enabled = actions.show_retake && !busy;
            }
        }
        actions.complete_enabled = actions.show_complete && !busy;
        actions
    }

    /// Marks a text, file or directly playable video lesson as completed.
    #[instrument(skip(self), fields(lesson_id = self.lesson_id))]
    pub async fn complete(&mut self) -> Result<CompleteOutcome, ViewError> {
        let lesson = self.lesson.as_ref().ok_or_else(not_loaded)?;

        match lesson.lesson_type {
            LessonType::Quiz => {
                return Err(rejected(
                    "Quiz lessons are completed by submitting the answers.",
                ));
            }
            LessonType::Video if lesson.playable_video_url().is_none() => {
                return Err(rejected("This video is watched in the chat."));
            }
            _ => {}
        }

        if lesson.status.is_completed() {
            debug!("Lesson {} already completed, nothing to send", lesson.id);
            return Ok(CompleteOutcome::AlreadyCompleted);
        }
        if self.phase != Phase::Ready {
            return Err(busy(self.phase));
        }

        self.phase = Phase::Completing;
        self.inline_error = None;

        match self.backend.complete_lesson(self.lesson_id).await {
            Ok(completion) => {
                if let Some(lesson) = self.lesson.as_mut() {
                    lesson.status = LessonStatus::Completed;
                }
                self.phase = Phase::Ready;
                info!(
                    "Lesson {} completed ({}/{}, course completed: {})",
                    self.lesson_id,
                    completion.completed_lessons,
                    completion.total_lessons,
                    completion.course_completed
                );
                Ok(CompleteOutcome::Completed {
                    completion,
                    next: Transition::BackToCourse(self.course_id),
                })
            }
            Err(err) => {
                self.phase = Phase::Ready;
                let err = ViewError::new(ErrorKind::Mutation, err);
                self.inline_error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Asks the bot to send the video to the chat, then hands control back to it.
    #[instrument(skip(self), fields(lesson_id = self.lesson_id))]
    pub async fn request_video(&mut self) -> Result<Transition, ViewError> {
        let lesson = self.lesson.as_ref().ok_or_else(not_loaded)?;
        if lesson.lesson_type != LessonType::Video || lesson.playable_video_url().is_some() {
            return Err(rejected("This lesson is not delivered through the chat."));
        }
        if self.phase != Phase::Ready {
            return Err(busy(self.phase));
        }

        self.phase = Phase::RequestingVideo;
        self.inline_error = None;

        let outcome = match self.backend.request_video(self.lesson_id).await {
            Ok(response) if response.success => {
                info!("Video of lesson {} sent to the chat", self.lesson_id);
                Ok(Transition::ExitApp)
            }
            Ok(response) => {
                let message = if response.message.is_empty() {
                    VIDEO_FALLBACK_MESSAGE.to_string()
                } else {
                    response.message
                };
                Err(ViewError::new(
                    ErrorKind::Mutation,
                    AppError::Backend {
                        status: 200,
                        message,
                    },
                ))
            }
            Err(err) => Err(ViewError::new(ErrorKind::Mutation, err)),
        };

        self.phase = Phase::Ready;
        if let Err(err) = &outcome {
            self.inline_error = Some(format!("Error: {}", video_error_message(err)));
        }
        outcome
    }

    pub fn select_answer(&mut self, question: usize, option: usize) -> Result<(), ViewError> {
        if self.phase != Phase::Answering {
            return Err(busy(self.phase));
        }
        let quiz = self.quiz.as_mut().ok_or_else(not_loaded)?;
        quiz.select(question, option)
            .map_err(|err| ViewError::new(ErrorKind::Mutation, err))
    }

    pub fn go_to_question(&mut self, question: usize) -> bool {
        self.phase == Phase::Answering && self.quiz.as_mut().is_some_and(|q| q.go_to(question))
    }

    pub fn next_question(&mut self) -> bool {
        self.phase == Phase::Answering && self.quiz.as_mut().is_some_and(QuizForm::next)
    }

    pub fn previous_question(&mut self) -> bool {
        self.phase == Phase::Answering && self.quiz.as_mut().is_some_and(QuizForm::previous)
    }

    pub fn can_submit(&self) -> bool {
        self.phase == Phase::Answering && self.quiz.as_ref().is_some_and(QuizForm::is_complete)
    }

    /// Submits the quiz. Refused without a network call while any answer is missing.
    ///
    /// On failure the answers are kept so the learner can retry as-is.
    #[instrument(skip(self), fields(lesson_id = self.lesson_id))]
    pub async fn submit(&mut self) -> Result<&QuizResult, ViewError> {
        if self.phase != Phase::Answering {
            return Err(busy(self.phase));
        }
        let quiz = self.quiz.as_ref().ok_or_else(not_loaded)?;
        let answers = quiz.submission().map_err(|err| {
            warn!("Quiz submission refused: {}", err);
            ViewError::new(ErrorKind::Mutation, err)
        })?;

        self.phase = Phase::Submitting;
        self.inline_error = None;

        match self.backend.submit_quiz(self.lesson_id, &answers).await {
            Ok(result) => {
                self.refresh_meta().await;
                if let Some(lesson) = self.lesson.as_mut() {
                    lesson.status = LessonStatus::Completed;
                }
                self.phase = Phase::Result;
                Ok(self.result.insert(result))
            }
            Err(err) => {
                self.phase = Phase::Answering;
                let err = ViewError::new(ErrorKind::Mutation, err);
                self.inline_error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Summary of a finished quiz, derived from the outline row.
    pub fn summary(&self) -> Option<QuizSummary> {
        if !matches!(self.phase, Phase::Summary | Phase::Result | Phase::Retaking) {
            return None;
        }
        Some(
            self.meta
                .as_ref()
                .map(|item| QuizSummary::from_outline_item(item, self.course_max_attempts))
                .unwrap_or_else(QuizSummary::unavailable),
        )
    }

    fn retake_offered(&self) -> bool {
        let retaking = self.phase == Phase::Retaking;
        let finished = matches!(self.phase, Phase::Summary | Phase::Result);
        retaking
            || (finished
                && self
                    .summary()
                    .is_some_and(|s| s.retake == RetakeAvailability::Allowed))
    }

    /// Starts a new attempt, then re-reads lesson and outline from the backend.
    #[instrument(skip(self), fields(lesson_id = self.lesson_id))]
    pub async fn retake(&mut self) -> Result<QuizRetakeResponse, ViewError> {
        if !matches!(self.phase, Phase::Summary | Phase::Result) {
            return Err(busy(self.phase));
        }
        if !self.retake_offered() {
            let reason = self
                .summary()
                .and_then(|s| s.retake.message())
                .unwrap_or(RETAKE_NOT_ALLOWED_MESSAGE);
            return Err(rejected(reason));
        }

        let previous = self.phase;
        self.phase = Phase::Retaking;
        self.inline_error = None;

        let response = match self.backend.retake_quiz(self.lesson_id).await {
            Ok(response) => response,
            Err(err) => {
                self.phase = previous;
                self.inline_error = Some(RETAKE_FAILED_MESSAGE.to_string());
                return Err(ViewError::new(ErrorKind::Mutation, err));
            }
        };

        self.result = None;
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.reset();
        }

        if let Err(err) = self.load_with(true).await {
            warn!("Retake started but the lesson could not be reloaded: {}", err);
            self.restore_answering();
        }

        info!(
            "Retake of lesson {} started ({} attempts used)",
            self.lesson_id, response.attempts_used
        );
        Ok(response)
    }

    async fn refresh_meta(&mut self) {
        match self.backend.get_course_outline(self.course_id).await {
            Ok(outline) => {
                self.course_max_attempts = outline.max_quiz_attempts;
                self.meta = outline::find_lesson(&outline, self.lesson_id).cloned();
            }
            Err(err) => {
                warn!("Could not refresh quiz metadata after submission: {:?}", err);
                self.meta = None;
            }
        }
    }

    /// Back to answering with the lesson already held, after a failed reload.
    fn restore_answering(&mut self) {
        let Some(lesson) = &self.lesson else {
            return;
        };
        let option_counts = lesson.questions().iter().map(|q| q.options.len()).collect();
        self.quiz = Some(QuizForm::new(option_counts));
        self.load_error = None;
        self.phase = Phase::Answering;
    }
}

fn not_loaded() -> ViewError {
    ViewError::new(
        ErrorKind::Mutation,
        AppError::Validation("The lesson is not loaded yet.".to_string()),
    )
}

fn rejected(message: &str) -> ViewError {
    ViewError::new(ErrorKind::Mutation, AppError::Validation(message.to_string()))
}

fn busy(phase: Phase) -> ViewError {
    debug!("Action refused in phase {:?}", phase);
    ViewError::new(
        ErrorKind::Mutation,
        AppError::Validation("This action is not available right now.".to_string()),
    )
}

fn video_error_message(err: &ViewError) -> String {
    match &err.source {
        AppError::Transport(_) | AppError::Decode(_) | AppError::Internal(_) => {
            VIDEO_FALLBACK_MESSAGE.to_string()
        }
        other => other.user_message(),
    }
}
