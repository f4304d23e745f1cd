mod question;

pub use question::{MAX_QUESTION_BYTES, QuestionSource};
