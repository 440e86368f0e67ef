use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::catalog::{DiffId, DifferenceCatalog, DifferenceRecord};
use crate::error::SyncError;
use crate::page::{GuidelinePage, PrimaryPage};

pub type PageNavigator = Box<dyn FnMut(PrimaryPage) + Send>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidelineTarget {
    pub id: DiffId,
    pub page: Option<GuidelinePage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    ActiveChanged(Option<DiffId>),
    GuidelineTargetChanged(Option<GuidelineTarget>),
    NavigationRequested(PrimaryPage),
    NavigationDropped(PrimaryPage),
    NavigatorRegistered,
}

pub struct SyncStore {
    catalog: Arc<DifferenceCatalog>,
    active_id: Option<DiffId>,
    guideline_target: Option<GuidelineTarget>,
    navigator: Option<PageNavigator>,
    events: Arc<Mutex<Vec<SyncEvent>>>,
}

impl fmt::Debug for SyncStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncStore")
            .field("active_id", &self.active_id)
            .field("guideline_target", &self.guideline_target)
            .field("navigator", &self.navigator.is_some())
            .finish_non_exhaustive()
    }
}

impl SyncStore {
    pub fn new(catalog: Arc<DifferenceCatalog>) -> Self {
        Self {
            catalog,
            active_id: None,
            guideline_target: None,
            navigator: None,
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn catalog(&self) -> &DifferenceCatalog {
        &self.catalog
    }

    pub fn active_id(&self) -> Option<&DiffId> {
        self.active_id.as_ref()
    }

    pub fn active(&self) -> Option<&DifferenceRecord> {
        self.active_id
            .as_ref()
            .and_then(|id| self.catalog.get(id.as_str()))
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active_id.as_ref().map(DiffId::as_str) == Some(id)
    }

    pub fn guideline_target(&self) -> Option<&GuidelineTarget> {
        self.guideline_target.as_ref()
    }

    pub fn is_cross_referencing(&self) -> bool {
        self.guideline_target.is_some()
    }

    pub fn events(&self) -> Arc<Mutex<Vec<SyncEvent>>> {
        Arc::clone(&self.events)
    }

    pub fn set_active(&mut self, id: Option<&str>) -> Result<(), SyncError> {
        let Some(id) = id else {
            self.active_id = None;
            self.events.lock().push(SyncEvent::ActiveChanged(None));
            return Ok(());
        };

        let Some(record) = self.catalog.get(id) else {
            debug!(id, "ignoring selection of unknown difference");
            return Err(SyncError::UnknownDifference(DiffId::new(id)));
        };
        let page = record.page;
        let id = record.id.clone();

        // State and its event are in place before the navigator runs.
        self.active_id = Some(id.clone());
        self.events
            .lock()
            .push(SyncEvent::ActiveChanged(Some(id)));
        self.navigate(page);
        Ok(())
    }

    pub fn go_to_page(&mut self, page: PrimaryPage) {
        self.navigate(page);
    }

    pub fn register_page_navigator<F>(&mut self, navigator: F)
    where
        F: FnMut(PrimaryPage) + Send + 'static,
    {
        if self.navigator.is_some() {
            debug!("replacing registered page navigator");
        }
        self.navigator = Some(Box::new(navigator));
        self.events.lock().push(SyncEvent::NavigatorRegistered);
    }

    pub fn set_guideline_target(
        &mut self,
        id: Option<&str>,
        page: Option<GuidelinePage>,
    ) -> Result<(), SyncError> {
        let target = match id {
            None => None,
            Some(id) => {
                let Some(record) = self.catalog.get(id) else {
                    debug!(id, "ignoring guideline target for unknown difference");
                    return Err(SyncError::UnknownDifference(DiffId::new(id)));
                };
                Some(GuidelineTarget {
                    id: record.id.clone(),
                    page,
                })
            }
        };

        self.guideline_target = target.clone();
        self.events
            .lock()
            .push(SyncEvent::GuidelineTargetChanged(target));
        Ok(())
    }

    fn navigate(&mut self, page: PrimaryPage) {
        match self.navigator.as_mut() {
            Some(navigator) => {
                self.events
                    .lock()
                    .push(SyncEvent::NavigationRequested(page));
                navigator(page);
            }
            None => {
                trace!(page = page.get(), "no page navigator registered");
                self.events.lock().push(SyncEvent::NavigationDropped(page));
            }
        }
    }
}
