pub mod certificate;
pub mod course;
pub mod lesson;
pub mod outline;
pub mod quiz;
pub mod student;

pub use certificate::Certificate;
pub use course::{
    AvailableCourse, CourseDetail, CourseWithProgress, CoursesResponse, EnrollResponse,
    EnrollmentStatus, LessonWithStatus, ModuleWithLessons, NextLessonResponse,
};
pub use lesson::{
    CompletionResponse, LessonDetail, LessonStatus, LessonType, Resource, ResourceKind,
    VideoRequestResponse,
};
pub use outline::{CourseOutline, LessonOutlineItem, ModuleOutlineItem};
pub use quiz::{QuestionResult, QuizQuestion, QuizResult, QuizRetakeResponse};
pub use student::{InitResponse, Student};
