//! What the presentation layer renders from.
//!
//! Every variant carries owned, display-ready data copied out of the session.
//! Nothing here can be fed back into the session, so a view cannot show an
//! answer the engine has not recorded.

use serde::Serialize;

use lesson_core::classifier::{DocumentKind, DocumentLink};
use lesson_core::model::VideoItem;
use lesson_core::playlist::{Playlist, PlaylistCursor};
use lesson_core::quiz::{OptionMark, QuizEngine};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ViewModel {
    Loading { chapter_title: String },
    Unavailable(UnavailableVm),
    Quiz(QuizVm),
    Video(VideoVm),
    Document(DocumentVm),
    RichHtml(NotesVm),
    MarkdownNotes(NotesVm),
    /// The learner navigated away; nothing left to render.
    Closed,
}

impl ViewModel {
    #[must_use]
    pub fn mode(&self) -> &'static str {
        match self {
            ViewModel::Loading { .. } => "loading",
            ViewModel::Unavailable(_) => "unavailable",
            ViewModel::Quiz(_) => "quiz",
            ViewModel::Video(_) => "video",
            ViewModel::Document(_) => "document",
            ViewModel::RichHtml(_) => "rich_html",
            ViewModel::MarkdownNotes(_) => "markdown_notes",
            ViewModel::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnavailableVm {
    pub chapter_title: String,
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizVm {
    pub chapter_title: String,
    pub subtitle: Option<String>,
    pub questions: Vec<QuestionVm>,
    pub score: usize,
    pub answered: usize,
    pub total: usize,
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionVm {
    /// 1-based, for display.
    pub number: usize,
    pub prompt: String,
    pub options: Vec<OptionVm>,
    pub selected: Option<usize>,
    /// No further answer will be accepted for this question.
    pub locked: bool,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionVm {
    pub index: usize,
    pub text: String,
    /// `None` until the question is answered or the quiz is finished.
    pub mark: Option<OptionMark>,
}

impl QuizVm {
    #[must_use]
    pub fn from_engine(engine: &QuizEngine, chapter_title: &str, subtitle: Option<&str>) -> Self {
        let questions = engine
            .questions()
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let review = engine.review(index);
                let options = question
                    .options
                    .iter()
                    .enumerate()
                    .map(|(option, text)| OptionVm {
                        index: option,
                        text: text.clone(),
                        mark: review.as_ref().and_then(|r| r.marks.get(option).copied()),
                    })
                    .collect();
                QuestionVm {
                    number: index + 1,
                    prompt: question.question.clone(),
                    options,
                    selected: engine.selected(index),
                    locked: review.is_some(),
                    explanation: review
                        .as_ref()
                        .and_then(|r| r.explanation)
                        .map(str::to_owned),
                }
            })
            .collect();

        let result = engine.result();
        Self {
            chapter_title: chapter_title.to_owned(),
            subtitle: subtitle.map(str::to_owned),
            questions,
            score: result.score,
            answered: result.answered_count,
            total: result.total,
            finished: result.finished,
        }
    }
}

//
// ─── VIDEO ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoVm {
    pub current: VideoItem,
    pub current_index: usize,
    pub has_next: bool,
    pub entries: Vec<PlaylistEntryVm>,
    /// A picker only makes sense with more than one item.
    pub show_picker: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistEntryVm {
    pub index: usize,
    pub title: String,
    pub is_current: bool,
}

impl VideoVm {
    #[must_use]
    pub fn from_playlist(playlist: &Playlist, cursor: &PlaylistCursor) -> Self {
        let current_index = cursor.index();
        let entries = playlist
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| PlaylistEntryVm {
                index,
                title: item.title.clone(),
                is_current: index == current_index,
            })
            .collect();
        let current = playlist.current(cursor).clone();

        Self {
            current,
            current_index,
            has_next: !cursor.is_last(),
            entries,
            show_picker: playlist.len() > 1,
        }
    }
}

//
// ─── DOCUMENT & NOTES ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentVm {
    pub chapter_title: String,
    pub kind: DocumentKind,
    pub url: String,
}

impl DocumentVm {
    #[must_use]
    pub fn from_link(link: &DocumentLink, chapter_title: &str) -> Self {
        Self {
            chapter_title: chapter_title.to_owned(),
            kind: link.kind,
            url: link.url.clone(),
        }
    }
}

/// Raw notes body handed to an external markdown or HTML renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotesVm {
    pub chapter_title: String,
    pub subtitle: Option<String>,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::McqQuestion;

    fn engine() -> QuizEngine {
        QuizEngine::new(vec![
            McqQuestion::new("Q1", ["a", "b"], 0).with_explanation("a is right"),
            McqQuestion::new("Q2", ["a", "b"], 1),
        ])
        .unwrap()
    }

    #[test]
    fn unanswered_questions_carry_no_marks() {
        let vm = QuizVm::from_engine(&engine(), "Ch", None);
        assert_eq!(vm.questions.len(), 2);
        assert!(vm.questions.iter().all(|q| !q.locked));
        assert!(
            vm.questions
                .iter()
                .flat_map(|q| &q.options)
                .all(|o| o.mark.is_none())
        );
        assert!(vm.questions[0].explanation.is_none());
    }

    #[test]
    fn answered_question_shows_feedback() {
        let mut engine = engine();
        engine.answer(0, 1).unwrap();
        let vm = QuizVm::from_engine(&engine, "Ch", Some("Sub"));

        let q = &vm.questions[0];
        assert!(q.locked);
        assert_eq!(q.number, 1);
        assert_eq!(q.selected, Some(1));
        assert_eq!(q.options[0].mark, Some(OptionMark::Correct));
        assert_eq!(q.options[1].mark, Some(OptionMark::SelectedWrong));
        assert_eq!(q.explanation.as_deref(), Some("a is right"));
        assert_eq!(vm.answered, 1);
        assert_eq!(vm.score, 0);
        assert_eq!(vm.subtitle.as_deref(), Some("Sub"));
    }

    #[test]
    fn view_model_serializes_with_mode_tag() {
        let vm = ViewModel::Unavailable(UnavailableVm {
            chapter_title: "Ch".into(),
        });
        let json = serde_json::to_value(&vm).unwrap();
        assert_eq!(json["mode"], "unavailable");
        assert_eq!(json["chapter_title"], "Ch");

        let closed = serde_json::to_value(ViewModel::Closed).unwrap();
        assert_eq!(closed["mode"], "closed");
    }
}
