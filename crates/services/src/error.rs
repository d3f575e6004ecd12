//! Shared error types for the services crate.

use thiserror::Error;

use lesson_core::model::QuizAttemptError;
use lesson_core::playlist::PlaylistError;
use lesson_core::quiz::QuizError;
use storage::repository::StorageError;

/// Errors emitted by `LessonSession::dispatch`.
///
/// Both variants are caller contract violations (an index the current view never
/// offered). The session state is unchanged when one is returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Playlist(#[from] PlaylistError),
}

impl SessionError {
    #[must_use]
    pub fn is_invalid_index(&self) -> bool {
        matches!(
            self,
            SessionError::Quiz(QuizError::InvalidIndex { .. })
                | SessionError::Playlist(PlaylistError::InvalidIndex { .. })
        )
    }
}

/// Errors emitted by `QuizAttemptService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttemptServiceError {
    #[error(transparent)]
    Attempt(#[from] QuizAttemptError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
