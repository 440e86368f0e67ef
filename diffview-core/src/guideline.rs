use tracing::debug;

use crate::catalog::{BoundingBox, DiffId, DifferenceCatalog, GuidelineHighlight};
use crate::page::GuidelinePage;
use crate::sync::{GuidelineTarget, SyncStore};

pub const DEFAULT_GUIDELINE_SCALE: f32 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightBox<'a> {
    pub highlight: &'a GuidelineHighlight,
    pub rect: BoundingBox,
}

#[derive(Debug, Clone)]
pub struct GuidelineViewer {
    diff_id: DiffId,
    page: GuidelinePage,
    page_count: Option<usize>,
    rendered: Option<GuidelinePage>,
    applied_target_page: Option<GuidelinePage>,
    scale: f32,
    load_error: Option<String>,
}

impl GuidelineViewer {
    pub fn open(catalog: &DifferenceCatalog, target: &GuidelineTarget, scale: f32) -> Self {
        let page = Self::initial_page(catalog, target);
        debug!(id = %target.id, page = page.get(), "opening guideline viewer");
        Self {
            diff_id: target.id.clone(),
            page,
            page_count: None,
            rendered: None,
            applied_target_page: target.page,
            scale,
            load_error: None,
        }
    }

    pub fn initial_page(catalog: &DifferenceCatalog, target: &GuidelineTarget) -> GuidelinePage {
        target
            .page
            .or_else(|| catalog.first_highlight_page(target.id.as_str()))
            .unwrap_or(GuidelinePage::FIRST)
    }

    pub fn sync(&mut self, catalog: &DifferenceCatalog, target: &GuidelineTarget) -> bool {
        if target.id != self.diff_id {
            let previous = self.page;
            let mut reopened = Self::open(catalog, target, self.scale);
            reopened.page_count = self.page_count;
            reopened.load_error = self.load_error.take();
            if let Some(count) = reopened.page_count {
                reopened.page = reopened.page.clamp_to(count);
            }
            *self = reopened;
            return self.page != previous;
        }

        if target.page == self.applied_target_page {
            return false;
        }
        self.applied_target_page = target.page;
        match target.page {
            Some(page) => self.set_page(page),
            None => false,
        }
    }

    pub fn diff_id(&self) -> &DiffId {
        &self.diff_id
    }

    pub fn page(&self) -> GuidelinePage {
        self.page
    }

    pub fn page_count(&self) -> Option<usize> {
        self.page_count
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn scale_by(&mut self, factor: f32) {
        let scale = (self.scale * factor).clamp(0.3, 4.0);
        if (self.scale - scale).abs() > f32::EPSILON {
            self.scale = scale;
            self.rendered = None;
        }
    }

    pub fn set_page_count(&mut self, page_count: usize) {
        self.page_count = Some(page_count);
        self.set_page(self.page.clamp_to(page_count));
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.load_error = Some(message.into());
        self.rendered = None;
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn next_page(&mut self) -> bool {
        let Some(count) = self.page_count else {
            return false;
        };
        self.set_page(self.page.next().clamp_to(count))
    }

    pub fn prev_page(&mut self) -> bool {
        self.set_page(self.page.prev())
    }

    pub fn mark_rendered(&mut self, page: GuidelinePage) -> bool {
        if page != self.page {
            return false;
        }
        self.rendered = Some(page);
        true
    }

    pub fn is_ready(&self) -> bool {
        self.load_error.is_none() && self.rendered == Some(self.page)
    }

    pub fn page_highlights<'a>(&self, catalog: &'a DifferenceCatalog) -> Vec<&'a GuidelineHighlight> {
        catalog
            .highlights()
            .iter()
            .filter(|highlight| highlight.diff_id == self.diff_id && highlight.page == self.page)
            .collect()
    }

    pub fn visible_highlights<'a>(&self, catalog: &'a DifferenceCatalog) -> Vec<HighlightBox<'a>> {
        if !self.is_ready() {
            return Vec::new();
        }
        self.page_highlights(catalog)
            .into_iter()
            .map(|highlight| HighlightBox {
                highlight,
                rect: highlight.bounding_box.scaled(self.scale),
            })
            .collect()
    }

    pub fn close(&self, store: &mut SyncStore) {
        let _ = store.set_guideline_target(None, None);
    }

    fn set_page(&mut self, page: GuidelinePage) -> bool {
        let page = match self.page_count {
            Some(count) => page.clamp_to(count),
            None => page,
        };
        if page == self.page {
            return false;
        }
        self.page = page;
        self.rendered = None;
        true
    }
}
