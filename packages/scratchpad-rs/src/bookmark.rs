// Bookmarks, the append-only store, and distance ranking
//
// A bookmark captures a browser page together with a copy of the state vector
// at save time. Distance to the current state is always computed on demand so
// the ranking follows the live state even for old bookmarks.

use crate::types::StatePoint;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the browser collaborator reports for the page currently shown
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageCapture {
    pub url: String,
    pub title: String,
    /// Text selected on the page, if any
    #[serde(default)]
    pub selection: Option<String>,
    /// Opaque handle of a thumbnail image (e.g. a temp file name)
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl PageCapture {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            selection: None,
            thumbnail: None,
        }
    }

    pub fn with_selection(mut self, selection: impl Into<String>) -> Self {
        self.selection = Some(selection.into());
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}

/// A saved page plus the state it was saved in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub selection: Option<String>,
    pub thumbnail: Option<String>,
    /// Snapshot of the state at save time, independent of the live state
    pub state: StatePoint,
    /// Placeholder for one extra scalar reading; never set by the core
    pub interest: Option<f64>,
    pub created_at: DateTime<Local>,
}

impl Bookmark {
    pub fn new(capture: PageCapture, state: &StatePoint) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: capture.url,
            title: capture.title,
            selection: capture.selection,
            thumbnail: capture.thumbnail,
            state: state.clone(),
            interest: None,
            created_at: Local::now(),
        }
    }

    /// Squared distance from this bookmark's snapshot to `current`
    pub fn distance_to(&self, current: &StatePoint) -> f64 {
        self.state.distance(current)
    }
}

/// Insertion-ordered, append-only bookmark collection
#[derive(Debug, Default)]
pub struct BookmarkStore {
    bookmarks: Vec<Bookmark>,
}

impl BookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bookmark unconditionally
    pub fn append(&mut self, bookmark: Bookmark) {
        log::debug!("Bookmark added: {} ({})", bookmark.title, bookmark.url);
        self.bookmarks.push(bookmark);
    }

    /// Add a bookmark unless one with the same URL is already stored.
    ///
    /// Returns whether the bookmark was added. An existing bookmark keeps its
    /// original state snapshot.
    pub fn append_if_new_url(&mut self, bookmark: Bookmark) -> bool {
        if self.contains_url(&bookmark.url) {
            return false;
        }
        self.append(bookmark);
        true
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.bookmarks.iter().any(|b| b.url == url)
    }

    pub fn get(&self, id: Uuid) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    /// Bookmarks in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Bookmark> {
        self.bookmarks.iter()
    }

    pub fn rank(&self, current: &StatePoint) -> Vec<RankedBookmark<'_>> {
        rank(self, current)
    }
}

/// A bookmark paired with its distance to the state it was ranked against
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RankedBookmark<'a> {
    pub bookmark: &'a Bookmark,
    pub distance: f64,
}

/// Every bookmark, nearest first.
///
/// The sort is stable, so equal distances keep insertion order. The result
/// is never truncated; fitting it to a viewport is up to the caller.
pub fn rank<'a>(store: &'a BookmarkStore, current: &StatePoint) -> Vec<RankedBookmark<'a>> {
    let mut ranked: Vec<RankedBookmark<'a>> = store
        .iter()
        .map(|bookmark| RankedBookmark {
            bookmark,
            distance: bookmark.distance_to(current),
        })
        .collect();

    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked
}

/// A ranking together with the state it was computed for
#[derive(Debug, Clone, Serialize)]
pub struct RankedView<'a> {
    pub state: StatePoint,
    pub entries: Vec<RankedBookmark<'a>>,
}

impl<'a> RankedView<'a> {
    pub fn new(store: &'a BookmarkStore, current: &StatePoint) -> Self {
        Self {
            state: current.clone(),
            entries: rank(store, current),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distance of the farthest bookmark, used for distance shading
    pub fn max_distance(&self) -> Option<f64> {
        self.entries.last().map(|e| e.distance)
    }

    /// Exactly `slots` entries: the nearest bookmarks, then `None` padding
    pub fn viewport(&self, slots: usize) -> Vec<Option<&RankedBookmark<'a>>> {
        (0..slots).map(|i| self.entries.get(i)).collect()
    }
}
