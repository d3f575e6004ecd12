mod attempt;
mod descriptor;
mod ids;
mod mcq;
mod video;

pub use attempt::{QuizAttempt, QuizAttemptError};
pub use descriptor::{Chapter, ContentTypeTag, LessonContentDescriptor};
pub use ids::ChapterId;
pub use mcq::{ANSWER_KEY_PLACEHOLDER, McqError, McqQuestion};
pub use video::VideoItem;
