use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{ChapterId, McqQuestion, VideoItem};

//
// ─── CONTENT TYPE TAG ──────────────────────────────────────────────────────────
//

/// Content shape declared by the content source.
///
/// Parsing is total: tags this build does not know about become
/// `NotesMarkdown`, so new server-side tags still render as notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "&'static str")]
pub enum ContentTypeTag {
    McqSimple,
    McqAnalysis,
    VideoLecture,
    PdfViewer,
    PdfFree,
    PdfPremium,
    PdfUltra,
    NotesHtmlFree,
    NotesHtmlPremium,
    #[default]
    NotesMarkdown,
}

impl ContentTypeTag {
    /// Wire name used by the content source.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::McqSimple => "MCQ_SIMPLE",
            Self::McqAnalysis => "MCQ_ANALYSIS",
            Self::VideoLecture => "VIDEO_LECTURE",
            Self::PdfViewer => "PDF_VIEWER",
            Self::PdfFree => "PDF_FREE",
            Self::PdfPremium => "PDF_PREMIUM",
            Self::PdfUltra => "PDF_ULTRA",
            Self::NotesHtmlFree => "NOTES_HTML_FREE",
            Self::NotesHtmlPremium => "NOTES_HTML_PREMIUM",
            Self::NotesMarkdown => "NOTES_MARKDOWN",
        }
    }

    /// Parse a wire tag, falling back to `NotesMarkdown` for anything unknown.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "MCQ_SIMPLE" => Self::McqSimple,
            "MCQ_ANALYSIS" => Self::McqAnalysis,
            "VIDEO_LECTURE" => Self::VideoLecture,
            "PDF_VIEWER" => Self::PdfViewer,
            "PDF_FREE" => Self::PdfFree,
            "PDF_PREMIUM" => Self::PdfPremium,
            "PDF_ULTRA" => Self::PdfUltra,
            "NOTES_HTML_FREE" => Self::NotesHtmlFree,
            "NOTES_HTML_PREMIUM" => Self::NotesHtmlPremium,
            "NOTES_MARKDOWN" => Self::NotesMarkdown,
            other => {
                tracing::debug!(tag = other, "unknown content tag, rendering as markdown notes");
                Self::NotesMarkdown
            }
        }
    }

    #[must_use]
    pub fn is_mcq(self) -> bool {
        matches!(self, Self::McqSimple | Self::McqAnalysis)
    }

    #[must_use]
    pub fn is_document(self) -> bool {
        matches!(
            self,
            Self::PdfViewer | Self::PdfFree | Self::PdfPremium | Self::PdfUltra
        )
    }

    #[must_use]
    pub fn is_rich_html(self) -> bool {
        matches!(self, Self::NotesHtmlFree | Self::NotesHtmlPremium)
    }
}

impl<'de> Deserialize<'de> for ContentTypeTag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawTag {
            Name(String),
            Other(IgnoredAny),
        }

        Ok(match RawTag::deserialize(deserializer)? {
            RawTag::Name(raw) => Self::parse(&raw),
            RawTag::Other(_) => {
                tracing::debug!("content tag is not a string, rendering as markdown notes");
                Self::NotesMarkdown
            }
        })
    }
}

impl From<ContentTypeTag> for &'static str {
    fn from(tag: ContentTypeTag) -> Self {
        tag.as_str()
    }
}

//
// ─── DESCRIPTOR ────────────────────────────────────────────────────────────────
//

/// What the content source says should be shown for one lesson.
///
/// Field names follow the content source's camelCase JSON.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonContentDescriptor {
    #[serde(rename = "type", default)]
    pub content_type: ContentTypeTag,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcq_data: Option<Vec<McqQuestion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_playlist: Option<Vec<VideoItem>>,
    #[serde(default)]
    pub is_coming_soon: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl LessonContentDescriptor {
    pub fn new(content_type: ContentTypeTag, content: impl Into<String>) -> Self {
        Self {
            content_type,
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_questions(mut self, questions: Vec<McqQuestion>) -> Self {
        self.mcq_data = Some(questions);
        self
    }

    #[must_use]
    pub fn with_playlist(mut self, items: Vec<VideoItem>) -> Self {
        self.video_playlist = Some(items);
        self
    }

    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    #[must_use]
    pub fn coming_soon(mut self) -> Self {
        self.is_coming_soon = true;
        self
    }

    /// Quiz questions, empty when the source sent none.
    #[must_use]
    pub fn questions(&self) -> &[McqQuestion] {
        self.mcq_data.as_deref().unwrap_or_default()
    }

    /// Explicit playlist entries, empty when the source sent none.
    #[must_use]
    pub fn playlist(&self) -> &[VideoItem] {
        self.video_playlist.as_deref().unwrap_or_default()
    }
}

//
// ─── CHAPTER ───────────────────────────────────────────────────────────────────
//

/// Metadata of the chapter the lesson is opened from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
}

impl Chapter {
    pub fn new(id: ChapterId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_round_trip_through_wire_names() {
        for tag in [
            ContentTypeTag::McqSimple,
            ContentTypeTag::McqAnalysis,
            ContentTypeTag::VideoLecture,
            ContentTypeTag::PdfViewer,
            ContentTypeTag::PdfFree,
            ContentTypeTag::PdfPremium,
            ContentTypeTag::PdfUltra,
            ContentTypeTag::NotesHtmlFree,
            ContentTypeTag::NotesHtmlPremium,
            ContentTypeTag::NotesMarkdown,
        ] {
            assert_eq!(ContentTypeTag::parse(tag.as_str()), tag);
        }
    }

    #[test]
    fn unknown_tag_falls_back_to_markdown() {
        assert_eq!(
            ContentTypeTag::parse("INTERACTIVE_3D"),
            ContentTypeTag::NotesMarkdown
        );
        assert_eq!(ContentTypeTag::parse(""), ContentTypeTag::NotesMarkdown);
    }

    #[test]
    fn deserializes_content_source_json() {
        let json = r#"{
            "type": "MCQ_ANALYSIS",
            "content": "",
            "mcqData": [
                { "question": "2 + 2?", "options": ["3", "4"], "correctAnswer": 1 }
            ],
            "subtitle": "Warm-up"
        }"#;
        let descriptor: LessonContentDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(descriptor.content_type, ContentTypeTag::McqAnalysis);
        assert!(!descriptor.is_coming_soon);
        assert_eq!(descriptor.questions().len(), 1);
        assert_eq!(descriptor.questions()[0].correct_answer, 1);
        assert!(descriptor.playlist().is_empty());
        assert_eq!(descriptor.subtitle.as_deref(), Some("Warm-up"));
    }

    #[test]
    fn unknown_tag_in_json_does_not_fail() {
        let json = r#"{ "type": "SOMETHING_NEW", "content": "hi", "isComingSoon": false }"#;
        let descriptor: LessonContentDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.content_type, ContentTypeTag::NotesMarkdown);
    }

    #[test]
    fn null_or_non_string_tag_falls_back_to_markdown() {
        for json in [
            r##"{ "type": null, "content": "# hi" }"##,
            r##"{ "type": 7, "content": "# hi" }"##,
            r##"{ "type": { "name": "MCQ_SIMPLE" }, "content": "# hi" }"##,
        ] {
            let descriptor: LessonContentDescriptor = serde_json::from_str(json).unwrap();
            assert_eq!(descriptor.content_type, ContentTypeTag::NotesMarkdown);
            assert_eq!(descriptor.content, "# hi");
        }
    }

    #[test]
    fn tag_serializes_to_wire_name() {
        let json = serde_json::to_string(&ContentTypeTag::PdfPremium).unwrap();
        assert_eq!(json, "\"PDF_PREMIUM\"");
    }
}
