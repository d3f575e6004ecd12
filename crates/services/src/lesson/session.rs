use chrono::{DateTime, Utc};
use std::fmt;

use lesson_core::Clock;
use lesson_core::classifier::{DocumentLink, RenderMode, classify};
use lesson_core::model::{Chapter, LessonContentDescriptor};
use lesson_core::playlist::{self, Playlist, PlaylistCursor};
use lesson_core::quiz::{AnswerOutcome, QuizEngine, Submission};

use super::ports::{CompletionSink, Navigator, QuizCompletion};
use super::view::{DocumentVm, NotesVm, QuizVm, UnavailableVm, VideoVm, ViewModel};
use crate::error::SessionError;

/// Learner actions a host forwards into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonAction {
    Answer { question: usize, option: usize },
    Submit,
    SelectVideo(usize),
    /// The embedded player reported the current video finished.
    VideoEnded,
    Back,
}

impl LessonAction {
    fn name(self) -> &'static str {
        match self {
            LessonAction::Answer { .. } => "answer",
            LessonAction::Submit => "submit",
            LessonAction::SelectVideo(_) => "select_video",
            LessonAction::VideoEnded => "video_ended",
            LessonAction::Back => "back",
        }
    }
}

#[derive(Debug)]
struct Notes {
    body: String,
    subtitle: Option<String>,
}

#[derive(Debug)]
enum LessonState {
    Loading,
    Unavailable,
    Quiz {
        engine: QuizEngine,
        subtitle: Option<String>,
    },
    Video {
        playlist: Playlist,
        cursor: PlaylistCursor,
    },
    Document(DocumentLink),
    RichHtml(Notes),
    MarkdownNotes(Notes),
    Closed,
}

/// One lesson view, from open to back.
///
/// Owns all per-session state (quiz answers, playlist cursor) and serializes every
/// mutation through `dispatch`. Re-opening always starts a fresh session.
pub struct LessonSession {
    clock: Clock,
    chapter: Chapter,
    state: LessonState,
    started_at: DateTime<Utc>,
    sink: Box<dyn CompletionSink>,
    navigator: Box<dyn Navigator>,
}

impl LessonSession {
    /// Create a session that shows the loading state until `open` is called.
    pub fn new(
        chapter: Chapter,
        sink: impl CompletionSink + 'static,
        navigator: impl Navigator + 'static,
    ) -> Self {
        let clock = Clock::default();
        Self {
            started_at: clock.now(),
            clock,
            chapter,
            state: LessonState::Loading,
            sink: Box::new(sink),
            navigator: Box::new(navigator),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self.started_at = clock.now();
        self
    }

    #[must_use]
    pub fn chapter(&self) -> &Chapter {
        &self.chapter
    }

    /// Discard the current session and show the loading state for `chapter`.
    pub fn loading(&mut self, chapter: Chapter) -> ViewModel {
        self.chapter = chapter;
        self.state = LessonState::Loading;
        self.view()
    }

    /// Start a fresh session for `descriptor`; `None` means the content source
    /// had nothing for this chapter.
    pub fn open(
        &mut self,
        descriptor: Option<LessonContentDescriptor>,
        chapter: Chapter,
    ) -> ViewModel {
        self.chapter = chapter;
        self.started_at = self.clock.now();

        let mode = classify(descriptor.as_ref(), &self.chapter);
        self.state = match (mode, descriptor) {
            (_, None) | (RenderMode::Unavailable, _) => LessonState::Unavailable,
            (RenderMode::Quiz, Some(descriptor)) => self.quiz_state(descriptor),
            (RenderMode::Video, Some(descriptor)) => {
                let playlist = playlist::resolve(&descriptor, &self.chapter);
                let cursor = PlaylistCursor::new(&playlist);
                LessonState::Video { playlist, cursor }
            }
            (RenderMode::Document(link), Some(_)) => LessonState::Document(link),
            (RenderMode::RichHtml, Some(descriptor)) => LessonState::RichHtml(Notes {
                body: descriptor.content,
                subtitle: descriptor.subtitle,
            }),
            (RenderMode::MarkdownNotes, Some(descriptor)) => LessonState::MarkdownNotes(Notes {
                body: descriptor.content,
                subtitle: descriptor.subtitle,
            }),
        };

        let view = self.view();
        tracing::info!(chapter_id = %self.chapter.id, mode = view.mode(), "lesson opened");
        view
    }

    fn quiz_state(&self, descriptor: LessonContentDescriptor) -> LessonState {
        match QuizEngine::new(descriptor.mcq_data.unwrap_or_default()) {
            Ok(engine) => LessonState::Quiz {
                engine,
                subtitle: descriptor.subtitle,
            },
            Err(err) => {
                tracing::warn!(
                    chapter_id = %self.chapter.id,
                    error = %err,
                    "quiz data rejected, showing lesson as unavailable"
                );
                LessonState::Unavailable
            }
        }
    }

    /// Apply one learner action and return the updated view.
    ///
    /// Actions that do not apply to the current content are ignored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for out-of-range question, option or playlist
    /// indices. State is unchanged in that case.
    pub fn dispatch(&mut self, action: LessonAction) -> Result<ViewModel, SessionError> {
        match action {
            LessonAction::Answer { question, option } => self.answer(question, option)?,
            LessonAction::Submit => self.submit(),
            LessonAction::SelectVideo(index) => self.select_video(index)?,
            LessonAction::VideoEnded => self.video_ended(),
            LessonAction::Back => self.back(),
        }
        Ok(self.view())
    }

    fn ignore(&self, action: LessonAction) {
        tracing::debug!(
            action = action.name(),
            state = self.state_name(),
            "action does not apply to current lesson, ignored"
        );
    }

    fn answer(&mut self, question: usize, option: usize) -> Result<(), SessionError> {
        let LessonState::Quiz { engine, .. } = &mut self.state else {
            self.ignore(LessonAction::Answer { question, option });
            return Ok(());
        };
        match engine.answer(question, option)? {
            AnswerOutcome::Recorded { correct } => {
                tracing::debug!(question, option, correct, "answer recorded");
            }
            AnswerOutcome::AlreadyAnswered | AnswerOutcome::Locked => {
                tracing::debug!(question, option, "answer ignored, question locked");
            }
        }
        Ok(())
    }

    fn submit(&mut self) {
        let LessonState::Quiz { engine, .. } = &mut self.state else {
            self.ignore(LessonAction::Submit);
            return;
        };
        let Submission::Completed(result) = engine.submit() else {
            tracing::debug!("quiz already submitted");
            return;
        };

        let completion = QuizCompletion {
            chapter_id: self.chapter.id,
            score: result.score,
            answered: result.answered_count,
            total: result.total,
            started_at: self.started_at,
            completed_at: self.clock.now().max(self.started_at),
        };
        tracing::info!(
            chapter_id = %completion.chapter_id,
            score = completion.score,
            total = completion.total,
            "quiz completed"
        );
        self.sink.on_quiz_complete(&completion);
    }

    fn select_video(&mut self, index: usize) -> Result<(), SessionError> {
        let LessonState::Video { cursor, .. } = &mut self.state else {
            self.ignore(LessonAction::SelectVideo(index));
            return Ok(());
        };
        cursor.select(index)?;
        Ok(())
    }

    fn video_ended(&mut self) {
        let LessonState::Video { cursor, .. } = &mut self.state else {
            self.ignore(LessonAction::VideoEnded);
            return;
        };
        if !cursor.on_ended() {
            tracing::debug!(index = cursor.index(), "last video ended, staying put");
        }
    }

    fn back(&mut self) {
        self.state = LessonState::Closed;
        self.navigator.on_back();
    }

    fn state_name(&self) -> &'static str {
        match &self.state {
            LessonState::Loading => "loading",
            LessonState::Unavailable => "unavailable",
            LessonState::Quiz { .. } => "quiz",
            LessonState::Video { .. } => "video",
            LessonState::Document(_) => "document",
            LessonState::RichHtml(_) => "rich_html",
            LessonState::MarkdownNotes(_) => "markdown_notes",
            LessonState::Closed => "closed",
        }
    }

    /// Current view, without changing anything.
    #[must_use]
    pub fn view(&self) -> ViewModel {
        let chapter_title = self.chapter.title.as_str();
        match &self.state {
            LessonState::Loading => ViewModel::Loading {
                chapter_title: chapter_title.to_owned(),
            },
            LessonState::Unavailable => ViewModel::Unavailable(UnavailableVm {
                chapter_title: chapter_title.to_owned(),
            }),
            LessonState::Quiz { engine, subtitle } => ViewModel::Quiz(QuizVm::from_engine(
                engine,
                chapter_title,
                subtitle.as_deref(),
            )),
            LessonState::Video { playlist, cursor } => {
                ViewModel::Video(VideoVm::from_playlist(playlist, cursor))
            }
            LessonState::Document(link) => {
                ViewModel::Document(DocumentVm::from_link(link, chapter_title))
            }
            LessonState::RichHtml(notes) => ViewModel::RichHtml(notes_vm(notes, chapter_title)),
            LessonState::MarkdownNotes(notes) => {
                ViewModel::MarkdownNotes(notes_vm(notes, chapter_title))
            }
            LessonState::Closed => ViewModel::Closed,
        }
    }
}

fn notes_vm(notes: &Notes, chapter_title: &str) -> NotesVm {
    NotesVm {
        chapter_title: chapter_title.to_owned(),
        subtitle: notes.subtitle.clone(),
        body: notes.body.clone(),
    }
}

impl fmt::Debug for LessonSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LessonSession")
            .field("chapter", &self.chapter)
            .field("state", &self.state_name())
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}
