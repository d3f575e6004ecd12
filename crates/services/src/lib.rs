#![forbid(unsafe_code)]

pub mod attempts;
pub mod error;
pub mod lesson;

pub use lesson_core::Clock;

pub use attempts::{QuizAttemptListItem, QuizAttemptService};
pub use error::{AttemptServiceError, SessionError};
pub use lesson::{
    ChannelSink, CompletionSink, LessonAction, LessonSession, Navigator, QuizCompletion, ViewModel,
};
