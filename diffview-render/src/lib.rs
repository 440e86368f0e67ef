use std::sync::Arc;

use anyhow::Result;
use diffview_core::{LoadedDocument, RenderImage};
use rayon::prelude::*;
use tracing::warn;

pub mod compose;
#[cfg(feature = "pdf")]
mod pdfium;

pub use compose::{placeholder, side_by_side, Composition};
#[cfg(feature = "pdf")]
pub use pdfium::PdfiumRenderFactory;

#[derive(Clone)]
pub struct RenderJob {
    pub document: Arc<LoadedDocument>,
    pub page_index: usize,
    pub scale: f32,
}

pub fn render_pages(jobs: &[RenderJob]) -> Vec<Result<Arc<RenderImage>>> {
    jobs.par_iter()
        .map(|job| {
            let result = job.document.render(job.page_index, job.scale);
            if let Err(err) = &result {
                warn!(
                    path = %job.document.info().path.display(),
                    page = job.page_index + 1,
                    "render failed: {err:#}"
                );
            }
            result
        })
        .collect()
}
