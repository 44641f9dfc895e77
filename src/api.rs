use crate::errors::AppError;
use crate::model::{
    Certificate, CompletionResponse, CourseDetail, CourseOutline, CoursesResponse,
    EnrollResponse, InitResponse, LessonDetail, NextLessonResponse, QuizResult,
    QuizRetakeResponse, VideoRequestResponse,
};
use crate::payloads::{EnrollPayload, InitPayload, QuizSubmitPayload};
use crate::session::Session;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info, instrument};
use url::Url;

mod helper;

/// Everything the learner views need from the backend.
///
/// `WebappApi` is the HTTP implementation; views are generic over this trait
/// so their state handling can be exercised against any backend.
#[allow(async_fn_in_trait)]
pub trait LearnerBackend {
    async fn init(&self, bot_id: i64, init_data: &str) -> Result<InitResponse, AppError>;
    async fn get_courses(&self) -> Result<CoursesResponse, AppError>;
    async fn enroll(&self, course_id: i64) -> Result<EnrollResponse, AppError>;
    async fn get_course_detail(&self, course_id: i64) -> Result<CourseDetail, AppError>;
    async fn get_next_lesson(&self, course_id: i64) -> Result<NextLessonResponse, AppError>;
    async fn get_course_outline(&self, course_id: i64) -> Result<CourseOutline, AppError>;
    async fn get_lesson_detail(
        &self,
        course_id: i64,
        lesson_id: i64,
    ) -> Result<LessonDetail, AppError>;
    async fn complete_lesson(&self, lesson_id: i64) -> Result<CompletionResponse, AppError>;
    async fn submit_quiz(&self, lesson_id: i64, answers: &[i32]) -> Result<QuizResult, AppError>;
    async fn retake_quiz(&self, lesson_id: i64) -> Result<QuizRetakeResponse, AppError>;
    async fn request_video(&self, lesson_id: i64) -> Result<VideoRequestResponse, AppError>;
    async fn get_certificates(&self) -> Result<Vec<Certificate>, AppError>;
}

/// REST client for the `/webapp` surface of the course bot backend.
#[derive(Debug, Clone)]
pub struct WebappApi {
    client: Client,
    base_url: String,
    session: Session,
}

impl WebappApi {
    pub fn new(base_url: &Url, session: Session) -> Self {
        Self::with_client(Client::new(), base_url, session)
    }

    pub fn with_client(client: Client, base_url: &Url, session: Session) -> Self {
        WebappApi {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/webapp/{}", self.base_url, path)
    }
}

impl LearnerBackend for WebappApi {
    /// Exchanges Telegram init data for a session token and the initial snapshot.
    ///
    /// Parameters
    /// * bot_id as `i64`
    /// * init_data as `&str`, the raw signed launch payload
    ///
    /// Returns
    /// * `InitResponse` on success; the token is stored in the session
    /// * `AppError::Unauthorized` if the backend rejects the init data
    #[instrument(skip(self, init_data))]
    async fn init(&self, bot_id: i64, init_data: &str) -> Result<InitResponse, AppError> {
        info!("Initializing web app session for bot {}", bot_id);

        let payload = InitPayload {
            init_data: init_data.to_string(),
        };
        let request = self
            .client
            .post(self.endpoint(&format!("init/{}", bot_id)))
            .json(&payload);
        let response: InitResponse = helper::send_json(request).await?;

        self.session.set_token(response.web_token.clone());
        info!(
            "Session established for student {} with {} enrolled courses",
            response.student.id,
            response.my_courses.len()
        );
        Ok(response)
    }

    /// Lists enrolled and available courses.
    #[instrument(skip(self))]
    async fn get_courses(&self) -> Result<CoursesResponse, AppError> {
        info!("Fetching courses");
        let request = helper::authorize(self.client.get(self.endpoint("courses")), &self.session);
        let courses: CoursesResponse = helper::send_json(request).await?;
        info!(
            "Fetched {} enrolled and {} available courses",
            courses.my_courses.len(),
            courses.available_courses.len()
        );
        Ok(courses)
    }

    /// Enrolls the learner into a course.
    ///
    /// Parameters
    /// * course_id as `i64`
    ///
    /// Returns
    /// * `EnrollResponse` with the new enrollment id
    #[instrument(skip(self))]
    async fn enroll(&self, course_id: i64) -> Result<EnrollResponse, AppError> {
        info!("Enrolling into course {}", course_id);
        let request = helper::authorize(
            self.client
                .post(self.endpoint("enroll"))
                .json(&EnrollPayload { course_id }),
            &self.session,
        );
        let enrollment: EnrollResponse = helper::send_json(request).await?;
        info!(
            "Enrolled into course {} with enrollment {}",
            enrollment.course_id, enrollment.enrollment_id
        );
        Ok(enrollment)
    }

    #[instrument(skip(self))]
    async fn get_course_detail(&self, course_id: i64) -> Result<CourseDetail, AppError> {
        info!("Fetching course detail for course {}", course_id);
        let request = helper::authorize(
            self.client
                .get(self.endpoint(&format!("courses/{}", course_id))),
            &self.session,
        );
        helper::send_json(request).await
    }

    #[instrument(skip(self))]
    async fn get_next_lesson(&self, course_id: i64) -> Result<NextLessonResponse, AppError> {
        info!("Fetching next lesson for course {}", course_id);
        let request = helper::authorize(
            self.client
                .get(self.endpoint(&format!("courses/{}/next-lesson", course_id))),
            &self.session,
        );
        helper::send_json(request).await
    }

    /// Fetches the full lesson-state projection of a course.
    ///
    /// Parameters
    /// * course_id as `i64`
    ///
    /// Returns
    /// * `CourseOutline` exactly as computed by the backend
    #[instrument(skip(self))]
    async fn get_course_outline(&self, course_id: i64) -> Result<CourseOutline, AppError> {
        info!("Fetching outline for course {}", course_id);
        let request = helper::authorize(
            self.client
                .get(self.endpoint(&format!("courses/{}/outline", course_id))),
            &self.session,
        );
        let outline: CourseOutline = helper::send_json(request).await?;
        debug!(
            "Outline for course {} has {} modules, current lesson {:?}",
            course_id,
            outline.modules.len(),
            outline.current_lesson_id
        );
        Ok(outline)
    }

    #[instrument(skip(self))]
    async fn get_lesson_detail(
        &self,
        course_id: i64,
        lesson_id: i64,
    ) -> Result<LessonDetail, AppError> {
        info!("Fetching lesson {} of course {}", lesson_id, course_id);
        let request = helper::authorize(
            self.client.get(
                self.endpoint(&format!("courses/{}/lessons/{}", course_id, lesson_id)),
            ),
            &self.session,
        );
        helper::send_json(request).await
    }

    /// Marks a lesson as completed. Repeating the call is harmless.
    #[instrument(skip(self))]
    async fn complete_lesson(&self, lesson_id: i64) -> Result<CompletionResponse, AppError> {
        info!("Completing lesson {}", lesson_id);
        let request = helper::authorize(
            self.client
                .post(self.endpoint(&format!("lessons/{}/complete", lesson_id)))
                .json(&json!({})),
            &self.session,
        );
        let completion: CompletionResponse = helper::send_json(request).await?;
        info!(
            "Lesson {} completed, course progress {}/{}",
            lesson_id, completion.completed_lessons, completion.total_lessons
        );
        Ok(completion)
    }

    /// Submits every answer of a quiz in one call.
    ///
    /// Parameters
    /// * lesson_id as `i64`
    /// * answers as `&[i32]`, one selected option per question
    ///
    /// Returns
    /// * `QuizResult` with per-question correctness and the aggregate score
    #[instrument(skip(self, answers))]
    async fn submit_quiz(&self, lesson_id: i64, answers: &[i32]) -> Result<QuizResult, AppError> {
        info!(
            "Submitting {} answers for quiz lesson {}",
            answers.len(),
            lesson_id
        );
        let payload = QuizSubmitPayload {
            answers: answers.to_vec(),
        };
        let request = helper::authorize(
            self.client
                .post(self.endpoint(&format!("lessons/{}/quiz-submit", lesson_id)))
                .json(&payload),
            &self.session,
        );
        let result: QuizResult = helper::send_json(request).await?;
        info!(
            "Quiz lesson {} scored {}/{} ({}%)",
            lesson_id, result.score, result.total_score, result.percentage
        );
        Ok(result)
    }

    /// Starts a new attempt. Eligibility is checked by the backend.
    #[instrument(skip(self))]
    async fn retake_quiz(&self, lesson_id: i64) -> Result<QuizRetakeResponse, AppError> {
        info!("Requesting retake of quiz lesson {}", lesson_id);
        let request = helper::authorize(
            self.client
                .post(self.endpoint(&format!("lessons/{}/quiz-retake", lesson_id))),
            &self.session,
        );
        let retake: QuizRetakeResponse = helper::send_json(request).await?;
        info!(
            "Retake of quiz lesson {} accepted, attempts used {}",
            lesson_id, retake.attempts_used
        );
        Ok(retake)
    }

    /// Asks the bot to deliver the lesson video into the chat.
    #[instrument(skip(self))]
    async fn request_video(&self, lesson_id: i64) -> Result<VideoRequestResponse, AppError> {
        info!("Requesting chat delivery of video lesson {}", lesson_id);
        let request = helper::authorize(
            self.client
                .post(self.endpoint(&format!("lessons/{}/request-video", lesson_id))),
            &self.session,
        );
        helper::send_json(request).await
    }

    #[instrument(skip(self))]
    async fn get_certificates(&self) -> Result<Vec<Certificate>, AppError> {
        info!("Fetching certificates");
        let request = helper::authorize(
            self.client.get(self.endpoint("certificates")),
            &self.session,
        );
        let certificates: Vec<Certificate> = helper::send_json(request).await?;
        info!("Fetched {} certificates", certificates.len());
        Ok(certificates)
    }
}
