pub mod learner;

pub use learner::{EnrollPayload, InitPayload, QuizSubmitPayload};
