use std::time::{Duration, Instant};

use tracing::trace;

use crate::catalog::{DiffId, DifferenceRecord};
use crate::error::SyncError;
use crate::sync::{GuidelineTarget, SyncStore};

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(350);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelMode<'a> {
    List,
    Guideline(&'a GuidelineTarget),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry<'a> {
    pub record: &'a DifferenceRecord,
    pub expanded: bool,
    pub has_guideline: bool,
    pub annotation: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub struct ListLayout {
    heights: Vec<usize>,
    viewport: usize,
}

impl ListLayout {
    pub fn new(heights: Vec<usize>, viewport: usize) -> Self {
        Self { heights, viewport }
    }

    pub fn content_height(&self) -> usize {
        self.heights.iter().sum()
    }

    pub fn top_of(&self, index: usize) -> usize {
        self.heights.iter().take(index).sum()
    }

    pub fn max_offset(&self) -> usize {
        self.content_height().saturating_sub(self.viewport)
    }

    pub fn centered_offset(&self, index: usize) -> usize {
        let Some(height) = self.heights.get(index) else {
            return 0;
        };
        let target = self.top_of(index) as isize - (self.viewport / 2) as isize
            + (*height / 2) as isize;
        (target.max(0) as usize).min(self.max_offset())
    }
}

#[derive(Debug, Clone)]
struct PendingScroll {
    id: DiffId,
    due: Instant,
}

#[derive(Debug)]
pub struct DifferenceListPanel {
    settle_delay: Duration,
    scroll_offset: usize,
    pending: Option<PendingScroll>,
    observed: Option<DiffId>,
    cross_referencing: bool,
}

impl Default for DifferenceListPanel {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_DELAY)
    }
}

impl DifferenceListPanel {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            settle_delay,
            scroll_offset: 0,
            pending: None,
            observed: None,
            cross_referencing: false,
        }
    }

    pub fn mode<'a>(&self, store: &'a SyncStore) -> PanelMode<'a> {
        match store.guideline_target() {
            Some(target) => PanelMode::Guideline(target),
            None => PanelMode::List,
        }
    }

    pub fn entries<'a>(&self, store: &'a SyncStore) -> Vec<ListEntry<'a>> {
        let catalog = store.catalog();
        catalog
            .differences()
            .iter()
            .map(|record| {
                let id = record.id.as_str();
                let expanded = store.is_active(id);
                ListEntry {
                    record,
                    expanded,
                    has_guideline: catalog.has_highlights(id),
                    annotation: if expanded {
                        catalog.annotation_excerpt(id)
                    } else {
                        None
                    },
                }
            })
            .collect()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn has_pending_scroll(&self) -> bool {
        self.pending.is_some()
    }

    pub fn select(&mut self, store: &mut SyncStore, id: &str, now: Instant) -> Result<(), SyncError> {
        store.set_active(Some(id))?;
        self.observe(store, now);
        Ok(())
    }

    pub fn select_relative(
        &mut self,
        store: &mut SyncStore,
        delta: isize,
        now: Instant,
    ) -> Result<(), SyncError> {
        let catalog = store.catalog();
        if catalog.is_empty() {
            return Ok(());
        }
        let last = catalog.len() - 1;
        let next = match store.active_id().and_then(|id| catalog.position(id.as_str())) {
            Some(current) => (current as isize + delta).clamp(0, last as isize) as usize,
            None if delta < 0 => last,
            None => 0,
        };
        let id = catalog.differences()[next].id.clone();
        self.select(store, id.as_str(), now)
    }

    pub fn open_guideline(&self, store: &mut SyncStore, id: &str) -> Result<(), SyncError> {
        let page = store.catalog().first_highlight_page(id);
        store.set_guideline_target(Some(id), page)
    }

    pub fn observe(&mut self, store: &SyncStore, now: Instant) {
        let active = store.active_id();
        let cross_referencing = store.is_cross_referencing();
        // Back from the guideline: the active entry may have changed unseen.
        let list_returned = self.cross_referencing && !cross_referencing;
        self.cross_referencing = cross_referencing;
        if active == self.observed.as_ref() && !list_returned {
            return;
        }
        self.observed = active.cloned();

        match active {
            Some(id) if !cross_referencing => {
                trace!(%id, "scheduling list scroll");
                self.pending = Some(PendingScroll {
                    id: id.clone(),
                    due: now + self.settle_delay,
                });
            }
            _ => self.pending = None,
        }
    }

    pub fn poll_scroll(
        &mut self,
        store: &SyncStore,
        now: Instant,
        layout: &ListLayout,
    ) -> Option<usize> {
        let due = self.pending.as_ref()?.due;
        if store.is_cross_referencing() {
            self.pending = None;
            return None;
        }
        if now < due {
            return None;
        }
        let pending = self.pending.take()?;
        let index = store.catalog().position(pending.id.as_str())?;
        self.scroll_offset = layout.centered_offset(index);
        Some(self.scroll_offset)
    }

    pub fn scroll_by(&mut self, delta: isize, layout: &ListLayout) {
        let next = (self.scroll_offset as isize + delta).max(0) as usize;
        self.scroll_offset = next.min(layout.max_offset());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::fixtures;
    use crate::overlay::DifferenceOverlay;
    use crate::page::GuidelinePage;

    fn store() -> SyncStore {
        SyncStore::new(Arc::new(fixtures::catalog()))
    }

    fn layout() -> ListLayout {
        // Five entries of two rows; the third is expanded to six.
        ListLayout::new(vec![2, 2, 6, 2, 2], 6)
    }

    #[test]
    fn only_active_entry_is_expanded() {
        let mut store = store();
        let panel = DifferenceListPanel::default();
        store.set_active(Some("D-07")).unwrap();

        let entries = panel.entries(&store);
        let expanded: Vec<_> = entries
            .iter()
            .filter(|entry| entry.expanded)
            .map(|entry| entry.record.id.as_str())
            .collect();
        assert_eq!(expanded, ["D-07"]);
        let active = entries.iter().find(|entry| entry.expanded).unwrap();
        assert_eq!(active.annotation, Some("link points at the old domain"));
        assert!(entries.iter().all(|entry| entry.expanded || entry.annotation.is_none()));
    }

    #[test]
    fn entries_flag_guideline_availability() {
        let store = store();
        let entries = DifferenceListPanel::default().entries(&store);
        let flags: Vec<_> = entries.iter().map(|entry| entry.has_guideline).collect();
        assert_eq!(flags, [true, false, true, true, false]);
    }

    #[test]
    fn guideline_replaces_list() {
        let mut store = store();
        let panel = DifferenceListPanel::default();
        assert_eq!(panel.mode(&store), PanelMode::List);

        panel.open_guideline(&mut store, "D-03").unwrap();
        match panel.mode(&store) {
            PanelMode::Guideline(target) => {
                assert_eq!(target.id.as_str(), "D-03");
                assert_eq!(target.page, GuidelinePage::new(3));
            }
            PanelMode::List => panic!("expected guideline mode"),
        }

        store.set_guideline_target(None, None).unwrap();
        assert_eq!(panel.mode(&store), PanelMode::List);
    }

    #[test]
    fn open_guideline_without_highlights_leaves_page_open() {
        let mut store = store();
        DifferenceListPanel::default()
            .open_guideline(&mut store, "D-02")
            .unwrap();
        assert_eq!(store.guideline_target().unwrap().page, None);
    }

    #[test]
    fn select_relative_walks_catalog_order() {
        let mut store = store();
        let mut panel = DifferenceListPanel::default();
        let now = Instant::now();

        panel.select_relative(&mut store, 1, now).unwrap();
        assert!(store.is_active("D-01"));
        panel.select_relative(&mut store, 2, now).unwrap();
        assert!(store.is_active("D-03"));
        panel.select_relative(&mut store, 10, now).unwrap();
        assert!(store.is_active("D-09"));
        panel.select_relative(&mut store, -10, now).unwrap();
        assert!(store.is_active("D-01"));
    }

    #[test]
    fn scroll_waits_for_settle_delay() {
        let mut store = store();
        let mut panel = DifferenceListPanel::new(Duration::from_millis(350));
        let start = Instant::now();

        panel.select(&mut store, "D-03", start).unwrap();
        assert!(panel.has_pending_scroll());
        assert_eq!(
            panel.poll_scroll(&store, start + Duration::from_millis(100), &layout()),
            None
        );

        // top 4 - viewport/2 3 + height/2 3 = 4
        assert_eq!(
            panel.poll_scroll(&store, start + Duration::from_millis(400), &layout()),
            Some(4)
        );
        assert!(!panel.has_pending_scroll());
    }

    #[test]
    fn newer_selection_overwrites_pending_scroll() {
        let mut store = store();
        let mut panel = DifferenceListPanel::default();
        let start = Instant::now();

        panel.select(&mut store, "D-03", start).unwrap();
        panel
            .select(&mut store, "D-01", start + Duration::from_millis(200))
            .unwrap();
        assert_eq!(
            panel.poll_scroll(&store, start + Duration::from_millis(400), &layout()),
            None
        );
        assert_eq!(
            panel.poll_scroll(&store, start + Duration::from_millis(600), &layout()),
            Some(0)
        );
    }

    #[test]
    fn changes_from_other_views_are_observed() {
        let mut store = store();
        let mut panel = DifferenceListPanel::default();
        let start = Instant::now();

        store.set_active(Some("D-09")).unwrap();
        panel.observe(&store, start);
        assert_eq!(
            panel.poll_scroll(&store, start + DEFAULT_SETTLE_DELAY, &layout()),
            Some(layout().max_offset())
        );
    }

    #[test]
    fn no_scroll_while_cross_referencing() {
        let mut store = store();
        let mut panel = DifferenceListPanel::default();
        let start = Instant::now();

        panel.select(&mut store, "D-03", start).unwrap();
        panel.open_guideline(&mut store, "D-03").unwrap();
        assert_eq!(
            panel.poll_scroll(&store, start + Duration::from_secs(1), &layout()),
            None
        );
        assert!(!panel.has_pending_scroll());

        store.set_active(Some("D-07")).unwrap();
        panel.observe(&store, start);
        assert!(!panel.has_pending_scroll());
    }

    #[test]
    fn closing_guideline_recenters_entry_selected_meanwhile() {
        let mut store = store();
        let mut panel = DifferenceListPanel::default();
        let start = Instant::now();

        panel.select(&mut store, "D-01", start).unwrap();
        panel.open_guideline(&mut store, "D-01").unwrap();
        panel.observe(&store, start);
        DifferenceOverlay::click(&mut store, "D-09").unwrap();
        panel.observe(&store, start);
        assert!(!panel.has_pending_scroll());

        store.set_guideline_target(None, None).unwrap();
        panel.observe(&store, start);
        assert!(panel.has_pending_scroll());
        assert_eq!(
            panel.poll_scroll(&store, start + DEFAULT_SETTLE_DELAY, &layout()),
            Some(8)
        );
    }

    #[test]
    fn centered_offset_is_clamped() {
        let layout = layout();
        assert_eq!(layout.content_height(), 14);
        assert_eq!(layout.centered_offset(0), 0);
        assert_eq!(layout.centered_offset(4), 8);
        assert_eq!(layout.centered_offset(99), 0);
    }

    #[test]
    fn manual_scroll_stays_in_bounds() {
        let mut panel = DifferenceListPanel::default();
        panel.scroll_by(-3, &layout());
        assert_eq!(panel.scroll_offset(), 0);
        panel.scroll_by(100, &layout());
        assert_eq!(panel.scroll_offset(), 8);
    }
}
