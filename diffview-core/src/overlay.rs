use crate::catalog::{BoundingBox, DiffId};
use crate::error::SyncError;
use crate::page::PrimaryPage;
use crate::sync::SyncStore;

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayBox {
    pub id: DiffId,
    pub rect: BoundingBox,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceOverlay {
    page: PrimaryPage,
    scale: f32,
    boxes: Vec<OverlayBox>,
}

impl DifferenceOverlay {
    pub fn compute(store: &SyncStore, page: PrimaryPage, scale: f32) -> Self {
        let boxes = store
            .catalog()
            .on_page(page)
            .map(|record| OverlayBox {
                id: record.id.clone(),
                rect: record.bounding_box.scaled(scale),
                active: store.is_active(record.id.as_str()),
            })
            .collect();
        Self { page, scale, boxes }
    }

    pub fn page(&self) -> PrimaryPage {
        self.page
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn boxes(&self) -> &[OverlayBox] {
        &self.boxes
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn hit_test(&self, x: f32, y: f32) -> Option<&DiffId> {
        self.boxes
            .iter()
            .rev()
            .find(|overlay| overlay.rect.contains(x, y))
            .map(|overlay| &overlay.id)
    }

    pub fn click(store: &mut SyncStore, id: &str) -> Result<(), SyncError> {
        store.set_active(Some(id))?;
        if store.is_cross_referencing() {
            if let Some(page) = store.catalog().first_highlight_page(id) {
                store.set_guideline_target(Some(id), Some(page))?;
            }
        }
        Ok(())
    }
}
