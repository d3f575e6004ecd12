//! Video lessons as a non-empty, ordered playlist plus a cursor into it.
//!
//! Resolution is stateless. The cursor is a separate value so whoever owns the
//! session owns "which video is playing".

use serde::Serialize;
use thiserror::Error;

use crate::model::{Chapter, LessonContentDescriptor, VideoItem};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlaylistError {
    #[error("playlist index {index} out of range (len {len})")]
    InvalidIndex { index: usize, len: usize },
}

//
// ─── PLAYLIST ──────────────────────────────────────────────────────────────────
//

/// Ordered video items. Always holds at least one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Playlist {
    items: Vec<VideoItem>,
}

#[allow(clippy::len_without_is_empty)]
impl Playlist {
    /// Returns `None` for an empty list.
    #[must_use]
    pub fn new(items: Vec<VideoItem>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self { items })
    }

    #[must_use]
    pub fn single(item: VideoItem) -> Self {
        Self { items: vec![item] }
    }

    #[must_use]
    pub fn items(&self) -> &[VideoItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Item under `cursor`. A cursor from a longer playlist lands on the last item.
    #[must_use]
    pub fn current(&self, cursor: &PlaylistCursor) -> &VideoItem {
        let last = self.items.len() - 1;
        &self.items[cursor.index().min(last)]
    }
}

/// Normalize a video lesson into its playlist.
///
/// An explicit, non-empty `videoPlaylist` wins and keeps its order. Otherwise
/// the lesson's own `content` URL becomes a single item titled after the chapter.
#[must_use]
pub fn resolve(descriptor: &LessonContentDescriptor, chapter: &Chapter) -> Playlist {
    if let Some(playlist) = Playlist::new(descriptor.playlist().to_vec()) {
        return playlist;
    }

    if descriptor.content.trim().is_empty() {
        tracing::warn!(
            chapter_id = %chapter.id,
            "video lesson has neither playlist nor content url"
        );
    }
    Playlist::single(VideoItem::new(
        chapter.title.clone(),
        descriptor.content.clone(),
    ))
}

//
// ─── CURSOR ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaylistCursor {
    index: usize,
    len: usize,
}

impl PlaylistCursor {
    #[must_use]
    pub fn new(playlist: &Playlist) -> Self {
        Self {
            index: 0,
            len: playlist.len(),
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.len
    }

    /// Jump to `index`.
    ///
    /// # Errors
    ///
    /// Returns `PlaylistError::InvalidIndex` if `index` is past the end; the cursor
    /// does not move.
    pub fn select(&mut self, index: usize) -> Result<(), PlaylistError> {
        if index >= self.len {
            return Err(PlaylistError::InvalidIndex {
                index,
                len: self.len,
            });
        }
        self.index = index;
        Ok(())
    }

    /// Advance after the current video ended. Returns `false` on the last item,
    /// which never wraps around.
    pub fn on_ended(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChapterId, ContentTypeTag};

    fn chapter() -> Chapter {
        Chapter::new(ChapterId::new(1), "Ch1")
    }

    fn three_items() -> Vec<VideoItem> {
        vec![
            VideoItem::new("Part 1", "https://cdn/1.mp4"),
            VideoItem::new("Part 2", "https://cdn/2.mp4"),
            VideoItem::new("Part 3", "https://cdn/3.mp4"),
        ]
    }

    #[test]
    fn falls_back_to_single_chapter_item() {
        let descriptor = LessonContentDescriptor::new(ContentTypeTag::VideoLecture, "u1");
        let playlist = resolve(&descriptor, &chapter());
        assert_eq!(playlist.items(), &[VideoItem::new("Ch1", "u1")]);
    }

    #[test]
    fn empty_playlist_field_uses_fallback() {
        let descriptor = LessonContentDescriptor::new(ContentTypeTag::VideoLecture, "u1")
            .with_playlist(Vec::new());
        assert_eq!(resolve(&descriptor, &chapter()).len(), 1);
    }

    #[test]
    fn explicit_playlist_is_kept_in_order() {
        let descriptor = LessonContentDescriptor::new(ContentTypeTag::VideoLecture, "ignored")
            .with_playlist(three_items());
        let playlist = resolve(&descriptor, &chapter());
        assert_eq!(playlist.items(), three_items().as_slice());
    }

    #[test]
    fn no_sources_still_yields_one_item() {
        let descriptor = LessonContentDescriptor::new(ContentTypeTag::VideoLecture, "");
        let playlist = resolve(&descriptor, &chapter());
        assert_eq!(playlist.len(), 1);
        let cursor = PlaylistCursor::new(&playlist);
        assert_eq!(playlist.current(&cursor).title, "Ch1");
    }

    #[test]
    fn ended_advances_until_last_item() {
        let playlist = Playlist::new(three_items()).unwrap();
        let mut cursor = PlaylistCursor::new(&playlist);

        assert!(cursor.on_ended());
        assert_eq!(cursor.index(), 1);
        assert!(cursor.on_ended());
        assert_eq!(cursor.index(), 2);
        assert!(!cursor.on_ended());
        assert_eq!(cursor.index(), 2);
    }

    #[test]
    fn current_follows_the_cursor() {
        let playlist = Playlist::new(three_items()).unwrap();
        let mut cursor = PlaylistCursor::new(&playlist);
        assert_eq!(playlist.current(&cursor).title, "Part 1");
        cursor.select(2).unwrap();
        assert_eq!(playlist.current(&cursor).url, "https://cdn/3.mp4");

        let short = Playlist::single(VideoItem::new("Only", "u"));
        assert_eq!(short.current(&cursor).title, "Only");
    }

    #[test]
    fn single_item_never_advances() {
        let playlist = Playlist::single(VideoItem::new("Only", "u"));
        let mut cursor = PlaylistCursor::new(&playlist);
        assert!(cursor.is_last());
        assert!(!cursor.on_ended());
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn select_rejects_out_of_range() {
        let playlist = Playlist::new(three_items()).unwrap();
        let mut cursor = PlaylistCursor::new(&playlist);
        cursor.select(2).unwrap();
        assert_eq!(
            cursor.select(3).unwrap_err(),
            PlaylistError::InvalidIndex { index: 3, len: 3 }
        );
        assert_eq!(cursor.index(), 2);
    }

    #[test]
    fn empty_list_is_not_a_playlist() {
        assert!(Playlist::new(Vec::new()).is_none());
    }
}
