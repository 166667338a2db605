// Scratchpad session controller
//
// Answers the renderer's events (save, view, toggles, slider edits, bookmark
// clicks) and the UI loop's timer ticks. The controller runs entirely on the
// UI thread: it owns the bookmark store and reaches the feed thread only
// through the shared state cell.
//
// Page capture/navigation and drawing are collaborators injected at
// construction through `PageSource` and `Renderer`.

use crate::bookmark::{Bookmark, BookmarkStore, PageCapture, RankedView};
use crate::config::PadConfig;
use crate::error::{Result, ScratchpadError};
use crate::state_cell::SharedStateCell;
use crate::types::StatePoint;
use std::sync::Arc;

/// Browser automation collaborator
pub trait PageSource {
    /// Describe the page the user is looking at right now
    fn capture_current_page(&mut self) -> Result<PageCapture>;

    /// Point the browser at `url`
    fn navigate_to(&mut self, url: &str) -> Result<()>;
}

/// Display collaborator
pub trait Renderer {
    /// Show the ranked bookmarks; `slots` is the viewport size
    fn render_bookmarks(&mut self, view: &RankedView<'_>, slots: usize);

    /// Mirror the live state (e.g. onto the sliders)
    fn render_state(&mut self, state: &StatePoint);
}

/// Session controller
pub struct Scratchpad<P, R> {
    config: PadConfig,
    cell: Arc<SharedStateCell>,
    store: BookmarkStore,
    pages: P,
    renderer: R,
    continuous_view: bool,
    continuous_save: bool,
    /// Cell version at the last continuous-view render
    rendered_version: Option<u64>,
    /// Cell version last passed to `render_state`
    mirrored_version: Option<u64>,
}

impl<P: PageSource, R: Renderer> Scratchpad<P, R> {
    pub fn new(config: PadConfig, cell: Arc<SharedStateCell>, pages: P, renderer: R) -> Result<Self> {
        config.validate()?;
        if cell.dimensions() != config.dimensions {
            return Err(ScratchpadError::DimensionMismatch {
                expected: config.dimensions,
                actual: cell.dimensions(),
            });
        }

        Ok(Self {
            config,
            cell,
            store: BookmarkStore::new(),
            pages,
            renderer,
            continuous_view: false,
            continuous_save: false,
            rendered_version: None,
            mirrored_version: None,
        })
    }

    pub fn config(&self) -> &PadConfig {
        &self.config
    }

    pub fn store(&self) -> &BookmarkStore {
        &self.store
    }

    pub fn cell(&self) -> &Arc<SharedStateCell> {
        &self.cell
    }

    pub fn pages(&self) -> &P {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut P {
        &mut self.pages
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn continuous_view(&self) -> bool {
        self.continuous_view
    }

    pub fn continuous_save(&self) -> bool {
        self.continuous_save
    }

    /// Whether a manual "View" makes sense; continuous view already refreshes
    pub fn view_enabled(&self) -> bool {
        !self.continuous_view
    }

    /// Ranking of the whole store against the live state
    pub fn ranked_view(&self) -> RankedView<'_> {
        let current = self.cell.get();
        RankedView::new(&self.store, &current)
    }

    /// Save: bookmark the current page with a snapshot of the live state
    pub fn on_save(&mut self) -> Result<()> {
        let capture = self.pages.capture_current_page()?;
        let state = self.cell.get();
        self.store.append(Bookmark::new(capture, &state));
        log::info!("Saved bookmark #{}", self.store.len());
        self.refresh_view();
        Ok(())
    }

    /// View: re-rank and redraw
    pub fn on_view_requested(&mut self) {
        self.refresh_view();
    }

    pub fn on_continuous_view_toggled(&mut self, enabled: bool) {
        log::debug!("Continuous view {}", if enabled { "on" } else { "off" });
        self.continuous_view = enabled;
        self.rendered_version = None;
        if enabled {
            self.refresh_view();
        }
    }

    pub fn on_continuous_save_toggled(&mut self, enabled: bool) {
        log::debug!("Continuous save {}", if enabled { "on" } else { "off" });
        self.continuous_save = enabled;
    }

    /// A slider moved: overwrite that component of the live state
    pub fn on_slider_changed(&mut self, index: usize, value: f64) -> Result<()> {
        self.cell.set_component(index, value)?;
        if self.continuous_view {
            self.refresh_view();
        }
        Ok(())
    }

    /// A bookmark in viewport slot `slot` was clicked: open it in the browser
    pub fn on_bookmark_selected(&mut self, slot: usize) -> Result<()> {
        let url = {
            let view = self.ranked_view();
            view.viewport(self.config.view_slots)
                .get(slot)
                .copied()
                .flatten()
                .map(|entry| entry.bookmark.url.clone())
        };

        match url {
            Some(url) => self.pages.navigate_to(&url),
            None => Err(ScratchpadError::IndexOutOfRange {
                index: slot,
                len: self.store.len().min(self.config.view_slots),
            }),
        }
    }

    /// Continuous-save tick: bookmark the current page unless its URL is
    /// already stored. Returns whether a bookmark was added.
    pub fn on_save_tick(&mut self) -> bool {
        if !self.continuous_save {
            return false;
        }

        let capture = match self.pages.capture_current_page() {
            Ok(capture) => capture,
            Err(e) => {
                log::debug!("Continuous save skipped: {}", e);
                return false;
            }
        };

        let state = self.cell.get();
        let added = self.store.append_if_new_url(Bookmark::new(capture, &state));
        if added {
            log::info!("Continuous save added bookmark #{}", self.store.len());
            self.refresh_view();
        }
        added
    }

    /// View tick: mirror a changed live state onto the sliders, and re-rank
    /// as well when continuous view is on. Returns whether anything was drawn.
    pub fn on_view_tick(&mut self) -> bool {
        let version = self.cell.version();

        if self.continuous_view && self.rendered_version != Some(version) {
            self.refresh_view();
            return true;
        }

        if self.mirrored_version != Some(version) {
            let current = self.cell.get();
            self.renderer.render_state(&current);
            self.mirrored_version = Some(version);
            return true;
        }

        false
    }

    /// Preload three demo pages at distinct states, then return the live state
    /// to the origin.
    pub fn seed_demo_bookmarks(&mut self) -> Result<()> {
        let dimensions = self.config.dimensions;
        let origin = StatePoint::zeros(dimensions);
        let demo = [
            ("http://www.tufts.edu/", "Tufts University", 0.0),
            ("http://www.cs.tufts.edu/~jacob/", "Rob Jacob Home Page", 0.8),
            (
                "http://www.tufts.edu/home/visiting_directions/",
                "Visiting, Maps & Directions - Tufts University",
                0.4,
            ),
        ];

        for (url, title, first) in demo {
            let state = origin.with_component(0, first)?;
            self.store.append(Bookmark::new(PageCapture::new(url, title), &state));
        }

        self.cell.set(origin)?;
        Ok(())
    }

    fn refresh_view(&mut self) {
        let version = self.cell.version();
        let current = self.cell.get();
        let view = RankedView::new(&self.store, &current);

        self.renderer.render_state(&current);
        self.renderer.render_bookmarks(&view, self.config.view_slots);
        self.rendered_version = Some(version);
        self.mirrored_version = Some(version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeBrowser {
        page: Option<PageCapture>,
        visited: Vec<String>,
    }

    impl PageSource for FakeBrowser {
        fn capture_current_page(&mut self) -> Result<PageCapture> {
            self.page
                .clone()
                .ok_or_else(|| ScratchpadError::Capture("no page open".to_string()))
        }

        fn navigate_to(&mut self, url: &str) -> Result<()> {
            self.visited.push(url.to_string());
            self.page = Some(PageCapture::new(url, ""));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        /// URLs per render, nearest first
        frames: Vec<Vec<String>>,
        states: Vec<StatePoint>,
    }

    impl Renderer for RecordingRenderer {
        fn render_bookmarks(&mut self, view: &RankedView<'_>, slots: usize) {
            self.frames.push(
                view.viewport(slots)
                    .into_iter()
                    .flatten()
                    .map(|e| e.bookmark.url.clone())
                    .collect(),
            );
        }

        fn render_state(&mut self, state: &StatePoint) {
            self.states.push(state.clone());
        }
    }

    fn pad(dimensions: usize) -> Scratchpad<FakeBrowser, RecordingRenderer> {
        let config = PadConfig {
            dimensions,
            ..PadConfig::default()
        };
        let cell = Arc::new(SharedStateCell::new(dimensions));
        Scratchpad::new(config, cell, FakeBrowser::default(), RecordingRenderer::default()).unwrap()
    }

    fn open(pad: &mut Scratchpad<FakeBrowser, RecordingRenderer>, url: &str) {
        pad.pages_mut().page = Some(PageCapture::new(url, url));
    }

    #[test]
    fn test_rejects_cell_of_wrong_arity() {
        let config = PadConfig::default();
        let cell = Arc::new(SharedStateCell::new(config.dimensions + 1));
        assert!(
            Scratchpad::new(config, cell, FakeBrowser::default(), RecordingRenderer::default())
                .is_err()
        );
    }

    #[test]
    fn test_save_snapshots_state_and_renders() {
        let mut pad = pad(2);
        open(&mut pad, "http://a/");
        pad.cell().set(StatePoint::new(vec![0.3, 0.6])).unwrap();

        pad.on_save().unwrap();

        assert_eq!(pad.store().len(), 1);
        let saved = pad.store().iter().next().unwrap();
        assert_eq!(saved.state.components(), &[0.3, 0.6]);
        assert_eq!(pad.renderer().frames.last().unwrap(), &vec!["http://a/".to_string()]);
    }

    #[test]
    fn test_save_without_page_fails_cleanly() {
        let mut pad = pad(2);
        assert!(matches!(pad.on_save(), Err(ScratchpadError::Capture(_))));
        assert!(pad.store().is_empty());
    }

    #[test]
    fn test_view_ranks_against_live_state() {
        let mut pad = pad(2);
        open(&mut pad, "http://origin/");
        pad.on_save().unwrap();

        pad.cell().set(StatePoint::new(vec![1.0, 1.0])).unwrap();
        open(&mut pad, "http://corner/");
        pad.on_save().unwrap();

        pad.cell().set(StatePoint::zeros(2)).unwrap();
        pad.on_view_requested();
        assert_eq!(
            pad.renderer().frames.last().unwrap(),
            &vec!["http://origin/".to_string(), "http://corner/".to_string()]
        );

        let view = pad.ranked_view();
        assert_eq!(view.entries[0].distance, 0.0);
        assert_eq!(view.entries[1].distance, 2.0);
    }

    #[test]
    fn test_slider_edits_live_state() {
        let mut pad = pad(3);
        pad.on_slider_changed(1, 0.4).unwrap();
        assert_eq!(pad.cell().get().components(), &[0.0, 0.4, 0.0]);
        assert!(pad.renderer().frames.is_empty());

        assert!(pad.on_slider_changed(3, 0.4).is_err());
    }

    #[test]
    fn test_slider_rerenders_in_continuous_view() {
        let mut pad = pad(2);
        pad.on_continuous_view_toggled(true);
        assert!(!pad.view_enabled());
        let frames = pad.renderer().frames.len();

        pad.on_slider_changed(0, 0.9).unwrap();
        assert_eq!(pad.renderer().frames.len(), frames + 1);
        assert_eq!(pad.renderer().states.last().unwrap().components(), &[0.9, 0.0]);
    }

    #[test]
    fn test_view_tick_renders_only_on_change() {
        let mut pad = pad(2);
        pad.on_continuous_view_toggled(true);
        assert!(!pad.on_view_tick());

        pad.cell().set(StatePoint::new(vec![0.5, 0.5])).unwrap();
        assert!(pad.on_view_tick());
        assert!(!pad.on_view_tick());
    }

    #[test]
    fn test_view_tick_mirrors_feed_without_continuous_view() {
        let mut pad = pad(2);
        assert!(pad.on_view_tick());
        assert!(!pad.on_view_tick());
        let states = pad.renderer().states.len();

        // A feed update lands in the cell
        pad.cell().set(StatePoint::new(vec![0.5, 0.5])).unwrap();
        assert!(pad.on_view_tick());

        assert_eq!(pad.renderer().states.len(), states + 1);
        assert_eq!(pad.renderer().states.last().unwrap().components(), &[0.5, 0.5]);
        assert!(pad.renderer().frames.is_empty());
        assert!(!pad.on_view_tick());
    }

    #[test]
    fn test_save_tick_deduplicates_by_url() {
        let mut pad = pad(2);
        open(&mut pad, "http://a/");

        assert!(!pad.on_save_tick());
        assert!(pad.store().is_empty());

        pad.on_continuous_save_toggled(true);
        assert!(pad.on_save_tick());
        assert_eq!(pad.store().len(), 1);

        pad.cell().set(StatePoint::new(vec![0.9, 0.9])).unwrap();
        assert!(!pad.on_save_tick());
        assert_eq!(pad.store().len(), 1);
        assert_eq!(pad.store().iter().next().unwrap().state.components(), &[0.0, 0.0]);

        open(&mut pad, "http://b/");
        assert!(pad.on_save_tick());
        assert_eq!(pad.store().len(), 2);
    }

    #[test]
    fn test_save_tick_ignores_capture_failure() {
        let mut pad = pad(2);
        pad.on_continuous_save_toggled(true);
        assert!(!pad.on_save_tick());
    }

    #[test]
    fn test_bookmark_selection_navigates() {
        let mut pad = pad(2);
        open(&mut pad, "http://far/");
        pad.cell().set(StatePoint::new(vec![1.0, 1.0])).unwrap();
        pad.on_save().unwrap();
        open(&mut pad, "http://near/");
        pad.cell().set(StatePoint::zeros(2)).unwrap();
        pad.on_save().unwrap();

        pad.on_bookmark_selected(0).unwrap();
        pad.on_bookmark_selected(1).unwrap();
        assert_eq!(pad.pages_mut().visited, vec!["http://near/", "http://far/"]);

        assert!(pad.on_bookmark_selected(2).is_err());
    }

    #[test]
    fn test_demo_bookmarks() {
        let mut pad = pad(4);
        pad.seed_demo_bookmarks().unwrap();
        pad.on_view_requested();

        assert_eq!(pad.store().len(), 3);
        assert_eq!(pad.cell().get().components(), &[0.0; 4]);
        assert_eq!(
            pad.renderer().frames.last().unwrap(),
            &vec![
                "http://www.tufts.edu/".to_string(),
                "http://www.tufts.edu/home/visiting_directions/".to_string(),
                "http://www.cs.tufts.edu/~jacob/".to_string(),
            ]
        );
    }
}
