use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::catalog::{DiffId, DifferenceCatalog};
use crate::config::Config;
use crate::document::{DocumentProvider, LoadedDocument};
use crate::error::SyncError;
use crate::guideline::GuidelineViewer;
use crate::list::{DifferenceListPanel, ListLayout};
use crate::overlay::DifferenceOverlay;
use crate::page::PrimaryPage;
use crate::sync::{SyncEvent, SyncStore};
use crate::viewer::{DocumentSide, PrimaryViewer};

#[derive(Debug, Clone)]
pub enum Command {
    SelectNext,
    SelectPrev,
    Select { id: DiffId },
    ClearSelection,
    ClickOverlay { x: f32, y: f32 },
    NextPage,
    PrevPage,
    GotoPage { page: PrimaryPage },
    ScaleBy { factor: f32 },
    CycleViewMode,
    OpenGuideline,
    CloseGuideline,
    GuidelineNextPage,
    GuidelinePrevPage,
}

#[derive(Debug, Clone)]
pub struct DocumentPaths {
    pub baseline: PathBuf,
    pub revised: PathBuf,
    pub guideline: PathBuf,
}

pub struct ReviewSession {
    store: SyncStore,
    viewer: PrimaryViewer,
    list: DifferenceListPanel,
    guideline: Option<GuidelineViewer>,
    guideline_scale: f32,
    guideline_page_count: Option<usize>,
    guideline_error: Option<String>,
    baseline_document: Option<Arc<LoadedDocument>>,
    revised_document: Option<Arc<LoadedDocument>>,
    guideline_document: Option<Arc<LoadedDocument>>,
}

impl ReviewSession {
    pub fn new(catalog: DifferenceCatalog, config: &Config) -> Self {
        let mut store = SyncStore::new(Arc::new(catalog));
        let viewer = PrimaryViewer::new(config.view_mode, config.initial_scale);
        viewer.mount(&mut store);
        Self {
            store,
            viewer,
            list: DifferenceListPanel::new(config.scroll_settle),
            guideline: None,
            guideline_scale: config.guideline_scale,
            guideline_page_count: None,
            guideline_error: None,
            baseline_document: None,
            revised_document: None,
            guideline_document: None,
        }
    }

    #[instrument(skip(self, provider))]
    pub async fn open_documents<P: DocumentProvider>(&mut self, provider: &P, paths: &DocumentPaths) {
        for side in [DocumentSide::Baseline, DocumentSide::Revised] {
            let path = match side {
                DocumentSide::Baseline => &paths.baseline,
                DocumentSide::Revised => &paths.revised,
            };
            match provider.open(path).await {
                Ok(backend) => {
                    let document = Arc::new(LoadedDocument::new(backend));
                    info!(
                        side = side.label(),
                        id = %document.info().id,
                        pages = document.page_count(),
                        "document opened"
                    );
                    self.viewer.document_loaded(side, document.page_count());
                    match side {
                        DocumentSide::Baseline => self.baseline_document = Some(document),
                        DocumentSide::Revised => self.revised_document = Some(document),
                    }
                }
                Err(err) => {
                    warn!(side = side.label(), path = %path.display(), "failed to open document: {err:#}");
                    self.viewer.document_failed(side, format!("{err:#}"));
                }
            }
        }

        match provider.open(&paths.guideline).await {
            Ok(backend) => {
                let document = Arc::new(LoadedDocument::new(backend));
                info!(id = %document.info().id, pages = document.page_count(), "guideline opened");
                self.guideline_loaded(document.page_count());
                self.guideline_document = Some(document);
            }
            Err(err) => {
                warn!(path = %paths.guideline.display(), "failed to open guideline: {err:#}");
                self.guideline_failed(format!("{err:#}"));
            }
        }
    }

    pub fn document(&self, side: DocumentSide) -> Option<&Arc<LoadedDocument>> {
        match side {
            DocumentSide::Baseline => self.baseline_document.as_ref(),
            DocumentSide::Revised => self.revised_document.as_ref(),
        }
    }

    pub fn guideline_document(&self) -> Option<&Arc<LoadedDocument>> {
        self.guideline_document.as_ref()
    }

    pub fn store(&self) -> &SyncStore {
        &self.store
    }

    pub fn viewer(&self) -> &PrimaryViewer {
        &self.viewer
    }

    pub fn list(&self) -> &DifferenceListPanel {
        &self.list
    }

    pub fn poll_list_scroll(&mut self, now: Instant, layout: &ListLayout) -> Option<usize> {
        self.list.poll_scroll(&self.store, now, layout)
    }

    pub fn scroll_list(&mut self, delta: isize, layout: &ListLayout) {
        self.list.scroll_by(delta, layout);
    }

    pub fn guideline(&self) -> Option<&GuidelineViewer> {
        self.guideline.as_ref()
    }

    pub fn guideline_mut(&mut self) -> Option<&mut GuidelineViewer> {
        self.guideline.as_mut()
    }

    pub fn overlay(&self) -> Option<DifferenceOverlay> {
        self.viewer.overlay(&self.store)
    }

    pub fn guideline_loaded(&mut self, page_count: usize) {
        self.guideline_page_count = Some(page_count);
        if let Some(viewer) = self.guideline.as_mut() {
            viewer.set_page_count(page_count);
        }
    }

    pub fn guideline_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        if let Some(viewer) = self.guideline.as_mut() {
            viewer.mark_failed(message.clone());
        }
        self.guideline_error = Some(message);
    }

    // Returns the sync events the command produced; the store's feed is left
    // empty.
    #[instrument(skip(self, now))]
    pub fn apply(&mut self, command: Command, now: Instant) -> Vec<SyncEvent> {
        let outcome = match command {
            Command::SelectNext => self.list.select_relative(&mut self.store, 1, now),
            Command::SelectPrev => self.list.select_relative(&mut self.store, -1, now),
            Command::Select { id } => self.list.select(&mut self.store, id.as_str(), now),
            Command::ClearSelection => self.store.set_active(None),
            Command::ClickOverlay { x, y } => match self.overlay() {
                Some(overlay) => match overlay.hit_test(x, y) {
                    Some(id) => DifferenceOverlay::click(&mut self.store, id.as_str()),
                    None => Ok(()),
                },
                None => Ok(()),
            },
            Command::NextPage => {
                self.viewer.next_page();
                Ok(())
            }
            Command::PrevPage => {
                self.viewer.prev_page();
                Ok(())
            }
            Command::GotoPage { page } => {
                self.store.go_to_page(page);
                Ok(())
            }
            Command::ScaleBy { factor } => {
                match self.guideline.as_mut() {
                    Some(guideline) => guideline.scale_by(factor),
                    None => {
                        self.viewer.scale_by(factor);
                    }
                }
                Ok(())
            }
            Command::CycleViewMode => {
                let mode = self.viewer.cycle_view_mode();
                debug!(mode = mode.label(), "view mode changed");
                Ok(())
            }
            Command::OpenGuideline => match self.store.active_id().cloned() {
                Some(id) => self.list.open_guideline(&mut self.store, id.as_str()),
                None => Ok(()),
            },
            Command::CloseGuideline => {
                if let Some(guideline) = self.guideline.as_ref() {
                    guideline.close(&mut self.store);
                }
                Ok(())
            }
            Command::GuidelineNextPage => {
                if let Some(guideline) = self.guideline.as_mut() {
                    guideline.next_page();
                }
                Ok(())
            }
            Command::GuidelinePrevPage => {
                if let Some(guideline) = self.guideline.as_mut() {
                    guideline.prev_page();
                }
                Ok(())
            }
        };

        if let Err(SyncError::UnknownDifference(id)) = outcome {
            debug!(%id, "command referenced an unknown difference");
        }

        self.reconcile_guideline();
        self.list.observe(&self.store, now);
        std::mem::take(&mut *self.store.events().lock())
    }

    fn reconcile_guideline(&mut self) {
        let Some(target) = self.store.guideline_target() else {
            self.guideline = None;
            return;
        };
        match self.guideline.as_mut() {
            Some(viewer) => {
                viewer.sync(self.store.catalog(), target);
            }
            None => {
                let mut viewer = GuidelineViewer::open(self.store.catalog(), target, self.guideline_scale);
                if let Some(count) = self.guideline_page_count {
                    viewer.set_page_count(count);
                }
                if let Some(message) = &self.guideline_error {
                    viewer.mark_failed(message.clone());
                }
                self.guideline = Some(viewer);
            }
        }
    }
}
