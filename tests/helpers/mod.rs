#![allow(dead_code)]

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Json, Response};
use chrono::{TimeZone, Utc};
use lightweight_lms_webapp::api::WebappApi;
use lightweight_lms_webapp::init_test_client;
use lightweight_lms_webapp::model::{
    AvailableCourse, Certificate, CompletionResponse, CourseDetail, CourseOutline,
    CourseWithProgress, CoursesResponse, EnrollmentStatus, InitResponse, LessonDetail,
    LessonOutlineItem, LessonStatus, LessonType, LessonWithStatus, ModuleOutlineItem,
    ModuleWithLessons, NextLessonResponse, QuestionResult, QuizQuestion, QuizResult, Resource,
    ResourceKind, Student,
};
use lightweight_lms_webapp::session::Session;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

pub const TEST_TOKEN: &str = "test-web-token";
pub const TEST_BOT_ID: i64 = 7;
pub const TEST_INIT_DATA: &str = "query_id=AAE&user=%7B%22id%22%3A42%7D&hash=abc";

// mock backend state

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub requests: Vec<RecordedRequest>,
    pub reject_init: bool,
    pub student: Option<Student>,
    pub my_courses: Vec<CourseWithProgress>,
    pub available_courses: Vec<AvailableCourse>,
    pub course_details: HashMap<i64, CourseDetail>,
    pub outlines: HashMap<i64, CourseOutline>,
    pub outline_fails: bool,
    pub lessons: HashMap<i64, LessonDetail>,
    pub complete_fails: bool,
    pub quiz_result: Option<QuizResult>,
    pub quiz_submit_fails: bool,
    pub retake_fails: bool,
    pub video_error: Option<String>,
    pub next_lesson: NextLessonResponse,
    pub certificates: Vec<Certificate>,
}

#[derive(Clone)]
pub struct MockBackend {
    pub base_url: Url,
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("Mock backend state poisoned")
    }

    pub fn requests_to(&self, method: Method, path_suffix: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path.ends_with(path_suffix))
            .count()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state().requests.last().cloned()
    }
}

// test infra setup

pub async fn spawn_backend(state: MockState) -> MockBackend {
    let shared = Arc::new(Mutex::new(state));
    let app: Router = Router::new()
        .fallback(handle_request)
        .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("Mock backend has no address");
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .expect("Mock backend failed");
    });

    let base_url =
        Url::parse(&format!("http://{}/api", addr)).expect("Failed to build mock backend URL");
    MockBackend {
        base_url,
        state: shared,
    }
}

/// Backend plus a client that already holds a valid session token.
pub async fn setup_test_environment(state: MockState) -> (WebappApi, MockBackend) {
    let backend = spawn_backend(state).await;
    let api = init_test_client(&backend.base_url, Session::with_token(TEST_TOKEN));
    (api, backend)
}

/// Backend plus a client that has not run the init handshake yet.
pub async fn setup_anonymous_environment(state: MockState) -> (WebappApi, MockBackend) {
    let backend = spawn_backend(state).await;
    let api = init_test_client(&backend.base_url, Session::new());
    (api, backend)
}

// request handling

async fn handle_request(
    State(state): State<Arc<Mutex<MockState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let mut state = state.lock().expect("Mock backend state poisoned");
    state.requests.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization: authorization.clone(),
        body: body.clone(),
    });

    let Some(route) = path.strip_prefix("/api/webapp/") else {
        return error(StatusCode::NOT_FOUND, "Unknown route");
    };
    let segments: Vec<&str> = route.split('/').collect();

    if segments.first() != Some(&"init")
        && authorization.as_deref() != Some(&format!("Bearer {}", TEST_TOKEN))
    {
        return error(StatusCode::UNAUTHORIZED, "Missing or invalid token");
    }

    match (method, segments.as_slice()) {
        (Method::POST, ["init", bot_id]) => init(&state, bot_id, &body),
        (Method::GET, ["courses"]) => ok(&CoursesResponse {
            my_courses: state.my_courses.clone(),
            available_courses: state.available_courses.clone(),
        }),
        (Method::POST, ["enroll"]) => enroll(&mut state, &body),
        (Method::GET, ["courses", course_id]) => {
            match parse_id(course_id).and_then(|id| state.course_details.get(&id)) {
                Some(detail) => ok(detail),
                None => error(StatusCode::NOT_FOUND, "Course not found"),
            }
        }
        (Method::GET, ["courses", _, "next-lesson"]) => ok(&state.next_lesson),
        (Method::GET, ["courses", course_id, "outline"]) => {
            if state.outline_fails {
                return error(StatusCode::INTERNAL_SERVER_ERROR, "Outline unavailable");
            }
            match parse_id(course_id).and_then(|id| state.outlines.get(&id)) {
                Some(outline) => ok(outline),
                None => error(StatusCode::NOT_FOUND, "Course not found"),
            }
        }
        (Method::GET, ["courses", _, "lessons", lesson_id]) => {
            match parse_id(lesson_id).and_then(|id| state.lessons.get(&id)) {
                Some(lesson) => ok(lesson),
                None => error(StatusCode::NOT_FOUND, "Lesson not found"),
            }
        }
        (Method::POST, ["lessons", lesson_id, action]) => {
            let Some(lesson_id) = parse_id(lesson_id) else {
                return error(StatusCode::BAD_REQUEST, "Bad lesson id");
            };
            match *action {
                "complete" => complete(&mut state, lesson_id),
                "quiz-submit" => submit_quiz(&mut state, lesson_id),
                "quiz-retake" => retake_quiz(&mut state, lesson_id),
                "request-video" => match &state.video_error {
                    Some(message) => error(StatusCode::BAD_REQUEST, message),
                    None => ok(&json!({ "success": true, "message": "Video sent to chat" })),
                },
                _ => error(StatusCode::NOT_FOUND, "Unknown lesson action"),
            }
        }
        (Method::GET, ["certificates"]) => ok(&state.certificates),
        _ => error(StatusCode::NOT_FOUND, "Unknown route"),
    }
}

fn init(state: &MockState, bot_id: &str, body: &Value) -> Response {
    let init_data = body.get("initData").and_then(Value::as_str).unwrap_or("");
    if state.reject_init || init_data.is_empty() {
        return error(StatusCode::UNAUTHORIZED, "Invalid init data");
    }
    ok(&InitResponse {
        web_token: TEST_TOKEN.to_string(),
        student: state.student.clone().unwrap_or_else(test_student),
        bot_id: parse_id(bot_id).unwrap_or_default(),
        my_courses: state.my_courses.clone(),
        available_courses: state.available_courses.clone(),
    })
}

fn enroll(state: &mut MockState, body: &Value) -> Response {
    let Some(course_id) = body.get("courseId").and_then(Value::as_i64) else {
        return error(StatusCode::BAD_REQUEST, "courseId is required");
    };
    let Some(index) = state.available_courses.iter().position(|c| c.id == course_id) else {
        return error(StatusCode::NOT_FOUND, "Course not found");
    };
    let course = state.available_courses.remove(index);
    let enrollment_id = 1000 + course_id;
    state.my_courses.push(CourseWithProgress {
        id: course.id,
        title: course.title.clone(),
        description: course.description.clone(),
        enrollment_id,
        completed_lessons: 0,
        total_lessons: course.total_lessons,
        status: EnrollmentStatus::Active,
    });
    ok(&json!({ "enrollmentId": enrollment_id, "courseId": course_id, "title": course.title }))
}

fn complete(state: &mut MockState, lesson_id: i64) -> Response {
    if state.complete_fails {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Could not save progress");
    }
    if let Some(lesson) = state.lessons.get_mut(&lesson_id) {
        lesson.status = LessonStatus::Completed;
    }
    let total = state.lessons.len() as u32;
    let completed = state
        .lessons
        .values()
        .filter(|l| l.status == LessonStatus::Completed)
        .count() as u32;
    ok(&CompletionResponse {
        completed_lessons: completed,
        total_lessons: total,
        course_completed: completed == total,
    })
}

fn submit_quiz(state: &mut MockState, lesson_id: i64) -> Response {
    if state.quiz_submit_fails {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Could not score the quiz");
    }
    let Some(result) = state.quiz_result.clone() else {
        return error(StatusCode::NOT_FOUND, "Quiz not found");
    };
    if let Some(lesson) = state.lessons.get_mut(&lesson_id) {
        lesson.status = LessonStatus::Completed;
    }
    for outline in state.outlines.values_mut() {
        if let Some(item) = outline_item_mut(outline, lesson_id) {
            item.status = LessonStatus::Completed;
            item.attempts_used = Some(item.attempts_used.unwrap_or(0) + 1);
            item.last_score = Some(result.score);
            item.last_score_percent = Some(result.percentage);
            item.can_retake = Some(
                item.max_attempts
                    .is_none_or(|max| item.attempts_used.unwrap_or(0) < max),
            );
        }
    }
    ok(&result)
}

fn retake_quiz(state: &mut MockState, lesson_id: i64) -> Response {
    if state.retake_fails {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Retake failed");
    }
    let item = state
        .outlines
        .values_mut()
        .find_map(|outline| outline_item_mut(outline, lesson_id))
        .cloned();
    let Some(item) = item else {
        return error(StatusCode::NOT_FOUND, "Quiz not found");
    };
    if !item.can_retake.unwrap_or(false) {
        return error(StatusCode::FORBIDDEN, "Maximum attempts reached");
    }
    if let Some(lesson) = state.lessons.get_mut(&lesson_id) {
        lesson.status = LessonStatus::InProgress;
    }
    for outline in state.outlines.values_mut() {
        if let Some(item) = outline_item_mut(outline, lesson_id) {
            item.status = LessonStatus::InProgress;
        }
    }
    ok(&json!({
        "success": true,
        "lessonId": lesson_id,
        "attemptsUsed": item.attempts_used.unwrap_or(0),
        "maxAttempts": item.max_attempts,
        "canRetake": item.can_retake.unwrap_or(false),
    }))
}

fn outline_item_mut(outline: &mut CourseOutline, lesson_id: i64) -> Option<&mut LessonOutlineItem> {
    outline
        .modules
        .iter_mut()
        .flat_map(|module| module.lessons.iter_mut())
        .find(|lesson| lesson.id == lesson_id)
}

fn parse_id(segment: &str) -> Option<i64> {
    segment.parse().ok()
}

fn ok<T: Serialize>(body: &T) -> Response {
    (StatusCode::OK, Json(json!(body))).into_response()
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

// fixtures

pub fn test_student() -> Student {
    Student {
        id: 42,
        telegram_user_id: "100042".to_string(),
        first_name: Some("Aziza".to_string()),
        last_name: Some("Karimova".to_string()),
        username: Some("aziza".to_string()),
    }
}

pub fn test_course(id: i64, completed: u32, total: u32, status: EnrollmentStatus) -> CourseWithProgress {
    CourseWithProgress {
        id,
        title: format!("Course {}", id),
        description: None,
        enrollment_id: 500 + id,
        completed_lessons: completed,
        total_lessons: total,
        status,
    }
}

pub fn test_available_course(id: i64, price: Option<f64>) -> AvailableCourse {
    AvailableCourse {
        id,
        title: format!("Available {}", id),
        description: Some("Open to everyone".to_string()),
        price,
        total_lessons: 5,
    }
}

pub fn outline_lesson(
    id: i64,
    lesson_type: LessonType,
    status: LessonStatus,
    can_open: bool,
    is_current: bool,
) -> LessonOutlineItem {
    LessonOutlineItem {
        id,
        title: format!("Lesson {}", id),
        order: id as i32,
        lesson_type,
        status,
        is_current,
        can_open,
        is_quiz: lesson_type == LessonType::Quiz,
        attempts_used: None,
        max_attempts: None,
        can_retake: None,
        last_score: None,
        last_score_percent: None,
    }
}

pub fn quiz_outline_lesson(
    id: i64,
    status: LessonStatus,
    attempts_used: u32,
    max_attempts: Option<u32>,
    can_retake: bool,
) -> LessonOutlineItem {
    LessonOutlineItem {
        attempts_used: Some(attempts_used),
        max_attempts,
        can_retake: Some(can_retake),
        last_score: Some(2),
        last_score_percent: Some(67),
        ..outline_lesson(id, LessonType::Quiz, status, true, false)
    }
}

pub fn test_outline(
    course_id: i64,
    enrollment_status: EnrollmentStatus,
    lessons: Vec<LessonOutlineItem>,
) -> CourseOutline {
    let total = lessons.len() as u32;
    let completed = lessons.iter().filter(|l| l.status.is_completed()).count() as u32;
    let current = lessons.iter().find(|l| l.is_current).map(|l| l.id);
    CourseOutline {
        course_id,
        title: format!("Course {}", course_id),
        description: Some("Outline under test".to_string()),
        total_lessons: total,
        completed_lessons: completed,
        completion_percent: lightweight_lms_webapp::progress::percent(completed, total),
        current_lesson_id: current,
        next_lesson_id: None,
        allow_retake_quiz: true,
        max_quiz_attempts: None,
        is_drip: false,
        drip_interval_days: None,
        enrollment_status,
        modules: vec![ModuleOutlineItem {
            id: 1,
            title: "Module 1".to_string(),
            order: 1,
            progress_percent: lightweight_lms_webapp::progress::percent(completed, total),
            lessons,
        }],
    }
}

pub fn test_course_detail(id: i64) -> CourseDetail {
    let lesson = |lesson_id: i64, status: LessonStatus| LessonWithStatus {
        id: lesson_id,
        title: format!("Lesson {}", lesson_id),
        lesson_type: LessonType::Text,
        order: lesson_id as i32,
        status,
    };
    CourseDetail {
        id,
        title: format!("Course {}", id),
        description: None,
        enrollment_id: 500 + id,
        completed_lessons: 1,
        total_lessons: 2,
        modules: vec![ModuleWithLessons {
            id: 1,
            title: "Module 1".to_string(),
            order: 1,
            lessons: vec![
                lesson(1, LessonStatus::Completed),
                lesson(2, LessonStatus::NotStarted),
            ],
        }],
    }
}

pub fn text_lesson(id: i64, status: LessonStatus) -> LessonDetail {
    LessonDetail {
        id,
        title: format!("Lesson {}", id),
        lesson_type: LessonType::Text,
        description: None,
        text: Some("Read me".to_string()),
        video_url: None,
        resources: Some(vec![Resource {
            kind: ResourceKind::Link,
            label: "Reference".to_string(),
            url: "https://example.com/ref".to_string(),
        }]),
        questions: None,
        can_play_in_webapp: true,
        status,
    }
}

pub fn video_lesson(id: i64, video_url: Option<&str>, status: LessonStatus) -> LessonDetail {
    LessonDetail {
        lesson_type: LessonType::Video,
        text: None,
        resources: None,
        video_url: video_url.map(str::to_string),
        can_play_in_webapp: video_url.is_some(),
        ..text_lesson(id, status)
    }
}

pub fn quiz_lesson(id: i64, question_count: usize, status: LessonStatus) -> LessonDetail {
    let questions = (0..question_count)
        .map(|index| QuizQuestion {
            question: format!("Question {}?", index + 1),
            options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            points: 1,
        })
        .collect();
    LessonDetail {
        lesson_type: LessonType::Quiz,
        text: None,
        resources: None,
        questions: Some(questions),
        ..text_lesson(id, status)
    }
}

pub fn test_quiz_result() -> QuizResult {
    let outcome = |index: usize, selected: i32, correct: i32| QuestionResult {
        question_index: index,
        selected_answer: selected,
        correct_answer: correct,
        correct: selected == correct,
        points: if selected == correct { 1 } else { 0 },
    };
    QuizResult {
        score: 2,
        total_score: 3,
        percentage: 67,
        results: vec![outcome(0, 1, 1), outcome(1, 0, 0), outcome(2, 2, 1)],
        completed_lessons: 3,
        total_lessons: 4,
        course_completed: false,
    }
}

pub fn test_certificate(id: i64, day: u32) -> Certificate {
    Certificate {
        id,
        course_id: id,
        course_title: format!("Course {}", id),
        certificate_code: format!("CERT-{:04}", id),
        completed_at: Utc
            .with_ymd_and_hms(2026, 10, day, 9, 30, 0)
            .single()
            .expect("Invalid certificate date"),
        student_name: "Aziza Karimova".to_string(),
    }
}
