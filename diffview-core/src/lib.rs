pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod guideline;
pub mod list;
pub mod overlay;
pub mod page;
pub mod session;
pub mod sync;
pub mod viewer;

pub use catalog::{BoundingBox, DiffId, DifferenceCatalog, DifferenceRecord, GuidelineHighlight};
pub use config::{project_dirs, Config};
pub use document::{
    document_id_for_path, DocumentBackend, DocumentId, DocumentInfo, DocumentProvider,
    LoadedDocument, RenderImage, RenderRequest,
};
pub use error::{CatalogError, ConfigError, PageError, SyncError};
pub use guideline::{GuidelineViewer, HighlightBox};
pub use list::{DifferenceListPanel, ListEntry, ListLayout, PanelMode};
pub use overlay::{DifferenceOverlay, OverlayBox};
pub use page::{GuidelinePage, PrimaryPage};
pub use session::{Command, DocumentPaths, ReviewSession};
pub use sync::{GuidelineTarget, PageNavigator, SyncEvent, SyncStore};
pub use viewer::{DocumentSide, DocumentStatus, PrimaryViewer, ViewMode};
