//! Maps a lesson descriptor onto the single render mode the presentation
//! layer should use.
//!
//! Rules are checked in order and the first match wins. Tags overlap in
//! practice (a `PDF_VIEWER` lesson may carry a YouTube link), so the order is
//! part of the contract.

use serde::Serialize;
use url::Url;

use crate::model::{Chapter, ContentTypeTag, LessonContentDescriptor};

const VIDEO_HOST_MARKERS: &[&str] = &["youtube.com", "youtu.be"];
const VIDEO_EXTENSIONS: &[&str] = &[
    ".mp4", ".webm", ".ogg", ".ogv", ".mov", ".m4v", ".mkv", ".m3u8",
];
const DOCUMENT_HOSTS: &[&str] = &["drive.google.com", "docs.google.com"];
const PREVIEW_SEGMENT: &str = "preview";

//
// ─── RENDER MODE ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Can be shown inline by a document viewer.
    Embeddable,
    /// Shown as an outbound link instead of embedded.
    ExternalLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLink {
    pub kind: DocumentKind,
    pub url: String,
}

impl DocumentLink {
    /// Normalize a document URL and decide whether it can be embedded.
    #[must_use]
    pub fn from_content(raw: &str) -> Self {
        let url = normalize_document_url(raw);
        let kind = if is_pdf(&url) || has_document_host(&url) {
            DocumentKind::Embeddable
        } else {
            DocumentKind::ExternalLink
        };
        Self { kind, url }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderMode {
    Unavailable,
    Quiz,
    Video,
    Document(DocumentLink),
    RichHtml,
    MarkdownNotes,
}

impl RenderMode {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::Unavailable => "unavailable",
            RenderMode::Quiz => "quiz",
            RenderMode::Video => "video",
            RenderMode::Document(_) => "document",
            RenderMode::RichHtml => "rich_html",
            RenderMode::MarkdownNotes => "markdown_notes",
        }
    }
}

//
// ─── CLASSIFICATION ────────────────────────────────────────────────────────────
//

/// Pick the render mode for a lesson. Never fails: unknown shapes render as
/// markdown notes.
#[must_use]
pub fn classify(descriptor: Option<&LessonContentDescriptor>, chapter: &Chapter) -> RenderMode {
    let mode = match descriptor {
        None => RenderMode::Unavailable,
        Some(descriptor) => classify_descriptor(descriptor),
    };
    tracing::debug!(
        chapter_id = %chapter.id,
        tag = descriptor.map(|d| d.content_type.as_str()),
        mode = mode.name(),
        "classified lesson content"
    );
    mode
}

fn classify_descriptor(descriptor: &LessonContentDescriptor) -> RenderMode {
    let tag = descriptor.content_type;

    if descriptor.is_coming_soon {
        return RenderMode::Unavailable;
    }
    if tag.is_mcq() && !descriptor.questions().is_empty() {
        return RenderMode::Quiz;
    }
    if tag == ContentTypeTag::VideoLecture
        || (tag == ContentTypeTag::PdfViewer && looks_like_video(&descriptor.content))
    {
        return RenderMode::Video;
    }
    if tag.is_document() {
        return RenderMode::Document(DocumentLink::from_content(&descriptor.content));
    }
    if tag.is_rich_html() {
        return RenderMode::RichHtml;
    }
    RenderMode::MarkdownNotes
}

//
// ─── URL HEURISTICS ────────────────────────────────────────────────────────────
//

fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// True for YouTube links and direct links to common video files.
#[must_use]
pub fn looks_like_video(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    if VIDEO_HOST_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return true;
    }
    let path = strip_query(&lower);
    VIDEO_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn is_pdf(url: &str) -> bool {
    strip_query(&url.trim().to_ascii_lowercase()).ends_with(".pdf")
}

fn is_document_host(url: &Url) -> bool {
    url.host_str().is_some_and(|host| {
        DOCUMENT_HOSTS
            .iter()
            .any(|known| host.eq_ignore_ascii_case(known))
    })
}

fn has_document_host(raw: &str) -> bool {
    Url::parse(raw.trim()).is_ok_and(|url| is_document_host(&url))
}

/// Rewrite document-host `…/view` and `…/edit` links to their `…/preview` form.
///
/// Other URLs come back trimmed but otherwise untouched. Applying this twice
/// gives the same result as applying it once.
#[must_use]
pub fn normalize_document_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.to_owned();
    };
    if !is_document_host(&url) {
        return trimmed.to_owned();
    }

    // `…/view/` carries an empty trailing segment.
    let rewrite = url.path_segments().is_some_and(|segments| {
        let mut segments = segments.rev();
        let last = match segments.next() {
            Some("") => segments.next(),
            other => other,
        };
        matches!(last, Some("view" | "edit"))
    });
    if !rewrite {
        return trimmed.to_owned();
    }

    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().pop().push(PREVIEW_SEGMENT);
    }
    url.to_string()
}
