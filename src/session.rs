use crate::api::LearnerBackend;
use crate::errors::{AppError, ErrorKind, ViewError};
use crate::launch::LaunchParams;
use crate::model::{AvailableCourse, CourseWithProgress, EnrollResponse, Student};
use std::sync::{Arc, RwLock};
use tracing::{error, info, instrument, warn};

/// Bearer token shared between the API client and whoever started the session.
///
/// Held in memory for the life of the process and never persisted.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_token(token.into());
        session
    }

    pub fn token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_token(&self, token: String) {
        match self.token.write() {
            Ok(mut guard) => *guard = Some(token),
            Err(poisoned) => *poisoned.into_inner() = Some(token),
        }
    }

    pub fn clear(&self) {
        match self.token.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

/// Top-level learner state: who is signed in and which courses they see.
#[derive(Debug)]
pub struct AppSession<B: LearnerBackend> {
    backend: B,
    student: Student,
    bot_id: i64,
    my_courses: Vec<CourseWithProgress>,
    available_courses: Vec<AvailableCourse>,
}

impl<B: LearnerBackend> AppSession<B> {
    /// Runs the init handshake. Any failure here is fatal to the session.
    #[instrument(skip(backend, launch), fields(bot_id = launch.bot_id))]
    pub async fn start(backend: B, launch: &LaunchParams) -> Result<Self, ViewError> {
        let snapshot = backend
            .init(launch.bot_id, &launch.init_data)
            .await
            .map_err(|err| {
                error!("Init handshake failed: {:?}", err);
                let source = match err {
                    AppError::Initialization(_) => err,
                    other => AppError::Initialization(initialization_message(&other)),
                };
                ViewError::new(ErrorKind::Initialization, source)
            })?;

        info!(
            "Learner session started for {}",
            snapshot.student.display_name()
        );

        Ok(AppSession {
            backend,
            student: snapshot.student,
            bot_id: snapshot.bot_id,
            my_courses: snapshot.my_courses,
            available_courses: snapshot.available_courses,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn student(&self) -> &Student {
        &self.student
    }

    pub fn bot_id(&self) -> i64 {
        self.bot_id
    }

    pub fn my_courses(&self) -> &[CourseWithProgress] {
        &self.my_courses
    }

    pub fn available_courses(&self) -> &[AvailableCourse] {
        &self.available_courses
    }

    /// Enrollment progress of one course, as of the last fetch.
    pub fn course_progress(&self, course_id: i64) -> Option<&CourseWithProgress> {
        self.my_courses.iter().find(|course| course.id == course_id)
    }

    /// Re-fetches the course lists. On failure the previous lists are kept.
    #[instrument(skip(self))]
    pub async fn refresh_courses(&mut self) -> Result<(), ViewError> {
        match self.backend.get_courses().await {
            Ok(courses) => {
                self.my_courses = courses.my_courses;
                self.available_courses = courses.available_courses;
                Ok(())
            }
            Err(err) => {
                warn!("Failed to refresh courses, keeping previous lists");
                Err(ViewError::new(ErrorKind::Fetch, err))
            }
        }
    }

    /// Enrolls into a free course, then refreshes the lists.
    #[instrument(skip(self))]
    pub async fn enroll(&mut self, course_id: i64) -> Result<EnrollResponse, ViewError> {
        if let Some(course) = self.available_courses.iter().find(|c| c.id == course_id) {
            if !course.is_free() {
                return Err(ViewError::new(
                    ErrorKind::Mutation,
                    AppError::Validation(
                        "This course is paid. Please purchase it through the bot.".to_string(),
                    ),
                ));
            }
        }

        let enrollment = self
            .backend
            .enroll(course_id)
            .await
            .map_err(|err| ViewError::new(ErrorKind::Mutation, err))?;

        if let Err(err) = self.refresh_courses().await {
            warn!(
                "Enrollment {} succeeded but the course list is stale: {}",
                enrollment.enrollment_id, err
            );
        }

        Ok(enrollment)
    }
}

fn initialization_message(err: &AppError) -> String {
    match err {
        AppError::Unauthorized(_) | AppError::Forbidden(_) => {
            "Could not verify your Telegram session. Please reopen the app from Telegram."
                .to_string()
        }
        other => format!("Failed to initialize app. {}", other.user_message()),
    }
}
