use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::overlay::DifferenceOverlay;
use crate::page::PrimaryPage;
use crate::sync::SyncStore;

pub const DEFAULT_PRIMARY_SCALE: f32 = 0.9;
const MIN_SCALE: f32 = 0.3;
const MAX_SCALE: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentSide {
    Baseline,
    Revised,
}

impl DocumentSide {
    pub fn label(self) -> &'static str {
        match self {
            DocumentSide::Baseline => "baseline",
            DocumentSide::Revised => "revised",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    Both,
    RevisedOnly,
    BaselineOnly,
}

impl ViewMode {
    pub fn cycle(self) -> Self {
        match self {
            ViewMode::Both => ViewMode::RevisedOnly,
            ViewMode::RevisedOnly => ViewMode::BaselineOnly,
            ViewMode::BaselineOnly => ViewMode::Both,
        }
    }

    pub fn sides(self) -> &'static [DocumentSide] {
        match self {
            ViewMode::Both => &[DocumentSide::Revised, DocumentSide::Baseline],
            ViewMode::RevisedOnly => &[DocumentSide::Revised],
            ViewMode::BaselineOnly => &[DocumentSide::Baseline],
        }
    }

    pub fn shows(self, side: DocumentSide) -> bool {
        self.sides().contains(&side)
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Both => "both",
            ViewMode::RevisedOnly => "revised only",
            ViewMode::BaselineOnly => "baseline only",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    Loading,
    Ready { page_count: usize },
    Failed { message: String },
}

impl DocumentStatus {
    pub fn page_count(&self) -> Option<usize> {
        match self {
            DocumentStatus::Ready { page_count } => Some(*page_count),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Pane {
    status: DocumentStatus,
    rendered: Option<PrimaryPage>,
}

impl Pane {
    fn new() -> Self {
        Self {
            status: DocumentStatus::Loading,
            rendered: None,
        }
    }
}

#[derive(Debug)]
struct DualPageState {
    page: PrimaryPage,
    baseline: Pane,
    revised: Pane,
}

impl DualPageState {
    fn pane(&self, side: DocumentSide) -> &Pane {
        match side {
            DocumentSide::Baseline => &self.baseline,
            DocumentSide::Revised => &self.revised,
        }
    }

    fn pane_mut(&mut self, side: DocumentSide) -> &mut Pane {
        match side {
            DocumentSide::Baseline => &mut self.baseline,
            DocumentSide::Revised => &mut self.revised,
        }
    }

    fn page_count(&self, mode: ViewMode) -> Option<usize> {
        mode.sides()
            .iter()
            .filter_map(|side| self.pane(*side).status.page_count())
            .max()
    }

    fn go_to(&mut self, page: PrimaryPage, mode: ViewMode) -> bool {
        let page = match self.page_count(mode) {
            Some(count) => page.clamp_to(count),
            None => page,
        };
        if page == self.page {
            return false;
        }
        self.page = page;
        self.baseline.rendered = None;
        self.revised.rendered = None;
        true
    }
}

pub struct PrimaryViewer {
    state: Arc<Mutex<DualPageState>>,
    mode: Arc<Mutex<ViewMode>>,
    scale: f32,
}

impl fmt::Debug for PrimaryViewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimaryViewer")
            .field("state", &*self.state.lock())
            .field("mode", &*self.mode.lock())
            .field("scale", &self.scale)
            .finish()
    }
}

impl PrimaryViewer {
    pub fn new(mode: ViewMode, scale: f32) -> Self {
        Self {
            state: Arc::new(Mutex::new(DualPageState {
                page: PrimaryPage::FIRST,
                baseline: Pane::new(),
                revised: Pane::new(),
            })),
            mode: Arc::new(Mutex::new(mode)),
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
        }
    }

    pub fn mount(&self, store: &mut SyncStore) {
        let state = Arc::clone(&self.state);
        let mode = Arc::clone(&self.mode);
        store.register_page_navigator(move |page| {
            let mode = *mode.lock();
            if state.lock().go_to(page, mode) {
                debug!(page = page.get(), "primary viewer navigated");
            }
        });
    }

    pub fn page(&self) -> PrimaryPage {
        self.state.lock().page
    }

    pub fn page_count(&self) -> Option<usize> {
        self.state.lock().page_count(self.view_mode())
    }

    pub fn view_mode(&self) -> ViewMode {
        *self.mode.lock()
    }

    pub fn set_view_mode(&self, mode: ViewMode) {
        *self.mode.lock() = mode;
    }

    pub fn cycle_view_mode(&self) -> ViewMode {
        let mut mode = self.mode.lock();
        *mode = mode.cycle();
        *mode
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn scale_by(&mut self, factor: f32) -> bool {
        let scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if (self.scale - scale).abs() <= f32::EPSILON {
            return false;
        }
        self.scale = scale;
        let mut state = self.state.lock();
        state.baseline.rendered = None;
        state.revised.rendered = None;
        true
    }

    pub fn status(&self, side: DocumentSide) -> DocumentStatus {
        self.state.lock().pane(side).status.clone()
    }

    pub fn document_loaded(&self, side: DocumentSide, page_count: usize) {
        let mut state = self.state.lock();
        state.pane_mut(side).status = DocumentStatus::Ready { page_count };
        let mode = self.view_mode();
        if let Some(count) = state.page_count(mode) {
            let page = state.page.clamp_to(count);
            state.go_to(page, mode);
        }
    }

    pub fn document_failed(&self, side: DocumentSide, message: impl Into<String>) {
        let message = message.into();
        warn!(side = side.label(), %message, "primary document unavailable");
        let mut state = self.state.lock();
        let pane = state.pane_mut(side);
        pane.status = DocumentStatus::Failed { message };
        pane.rendered = None;
    }

    pub fn go_to(&self, page: PrimaryPage) -> bool {
        let mode = self.view_mode();
        self.state.lock().go_to(page, mode)
    }

    pub fn next_page(&self) -> bool {
        let mode = self.view_mode();
        let mut state = self.state.lock();
        let Some(count) = state.page_count(mode) else {
            return false;
        };
        let next = state.page.next().clamp_to(count);
        state.go_to(next, mode)
    }

    pub fn prev_page(&self) -> bool {
        let mode = self.view_mode();
        let mut state = self.state.lock();
        let prev = state.page.prev();
        state.go_to(prev, mode)
    }

    pub fn mark_rendered(&self, side: DocumentSide, page: PrimaryPage) -> bool {
        let mut state = self.state.lock();
        if page != state.page || state.pane(side).status.page_count().is_none() {
            return false;
        }
        state.pane_mut(side).rendered = Some(page);
        true
    }

    pub fn is_rendered(&self, side: DocumentSide) -> bool {
        let state = self.state.lock();
        state.pane(side).rendered == Some(state.page)
    }

    pub fn overlay(&self, store: &SyncStore) -> Option<DifferenceOverlay> {
        if !self.view_mode().shows(DocumentSide::Revised) || !self.is_rendered(DocumentSide::Revised)
        {
            return None;
        }
        Some(DifferenceOverlay::compute(store, self.page(), self.scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;

    fn mounted() -> (PrimaryViewer, SyncStore) {
        let mut store = SyncStore::new(Arc::new(fixtures::catalog()));
        let viewer = PrimaryViewer::new(ViewMode::Both, 1.0);
        viewer.mount(&mut store);
        viewer.document_loaded(DocumentSide::Revised, 9);
        viewer.document_loaded(DocumentSide::Baseline, 8);
        (viewer, store)
    }

    #[test]
    fn selection_moves_both_documents() {
        let (viewer, mut store) = mounted();
        store.set_active(Some("D-03")).unwrap();
        assert_eq!(viewer.page().get(), 2);
        store.set_active(Some("D-09")).unwrap();
        assert_eq!(viewer.page().get(), 9);
    }

    #[test]
    fn page_count_follows_view_mode() {
        let (viewer, _store) = mounted();
        assert_eq!(viewer.page_count(), Some(9));
        viewer.set_view_mode(ViewMode::BaselineOnly);
        assert_eq!(viewer.page_count(), Some(8));
    }

    #[test]
    fn paging_is_clamped() {
        let (viewer, mut store) = mounted();
        assert!(!viewer.prev_page());
        store.go_to_page(PrimaryPage::new(50).unwrap());
        assert_eq!(viewer.page().get(), 9);
        assert!(!viewer.next_page());
    }

    #[test]
    fn overlay_waits_for_revised_render() {
        let (viewer, mut store) = mounted();
        store.set_active(Some("D-01")).unwrap();
        assert!(viewer.overlay(&store).is_none());

        assert!(viewer.mark_rendered(DocumentSide::Revised, PrimaryPage::FIRST));
        let overlay = viewer.overlay(&store).unwrap();
        assert_eq!(overlay.boxes().len(), 2);

        store.set_active(Some("D-03")).unwrap();
        assert!(viewer.overlay(&store).is_none());
    }

    #[test]
    fn stale_render_signal_is_ignored() {
        let (viewer, mut store) = mounted();
        store.set_active(Some("D-03")).unwrap();
        assert!(!viewer.mark_rendered(DocumentSide::Revised, PrimaryPage::FIRST));
        assert!(!viewer.is_rendered(DocumentSide::Revised));
    }

    #[test]
    fn baseline_only_hides_overlay() {
        let (viewer, store) = mounted();
        viewer.mark_rendered(DocumentSide::Revised, PrimaryPage::FIRST);
        viewer.set_view_mode(ViewMode::BaselineOnly);
        assert!(viewer.overlay(&store).is_none());
    }

    #[test]
    fn failed_document_keeps_session_usable() {
        let mut store = SyncStore::new(Arc::new(fixtures::catalog()));
        let viewer = PrimaryViewer::new(ViewMode::Both, 1.0);
        viewer.mount(&mut store);
        viewer.document_failed(DocumentSide::Revised, "no such file");
        viewer.document_loaded(DocumentSide::Baseline, 12);

        store.set_active(Some("D-07")).unwrap();
        assert_eq!(viewer.page().get(), 7);
        assert!(!viewer.mark_rendered(DocumentSide::Revised, viewer.page()));
        assert!(viewer.overlay(&store).is_none());
        assert!(matches!(
            viewer.status(DocumentSide::Revised),
            DocumentStatus::Failed { .. }
        ));
    }

    #[test]
    fn remount_replaces_navigator() {
        let mut store = SyncStore::new(Arc::new(fixtures::catalog()));
        let first = PrimaryViewer::new(ViewMode::Both, 1.0);
        let second = PrimaryViewer::new(ViewMode::Both, 1.0);
        first.mount(&mut store);
        second.mount(&mut store);

        store.set_active(Some("D-03")).unwrap();
        assert_eq!(first.page(), PrimaryPage::FIRST);
        assert_eq!(second.page().get(), 2);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut viewer = PrimaryViewer::new(ViewMode::Both, 1.0);
        while viewer.scale_by(0.5) {}
        assert!((viewer.scale() - MIN_SCALE).abs() < f32::EPSILON);
        assert!(viewer.scale_by(2.0));
    }
}
