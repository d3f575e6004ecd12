mod ports;
mod session;
mod view;

// Public API of the lesson subsystem.
pub use crate::error::SessionError;
pub use ports::{ChannelSink, CompletionSink, Navigator, QuizCompletion};
pub use session::{LessonAction, LessonSession};
pub use view::{
    DocumentVm, NotesVm, OptionVm, PlaylistEntryVm, QuestionVm, QuizVm, UnavailableVm, VideoVm,
    ViewModel,
};
