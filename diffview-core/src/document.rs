use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use uuid::Uuid;

pub type DocumentId = Uuid;

static DOCUMENT_NAMESPACE: Lazy<Uuid> = Lazy::new(|| {
    Uuid::parse_str("3f1d2a6c-8e0b-5b47-9a41-6d2c0e7f5a19").expect("valid namespace UUID")
});

pub fn document_id_for_path(path: &Path) -> DocumentId {
    let resolved = path
        .canonicalize()
        .or_else(|_| {
            if path.is_absolute() {
                Ok(path.to_path_buf())
            } else {
                std::env::current_dir().map(|cwd| cwd.join(path))
            }
        })
        .unwrap_or_else(|_| path.to_path_buf());
    Uuid::new_v5(&DOCUMENT_NAMESPACE, resolved.to_string_lossy().as_bytes())
}

#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub id: DocumentId,
    pub path: PathBuf,
    pub page_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub page_index: usize,
    pub scale: f32,
}

#[derive(Debug, Clone)]
pub struct RenderImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RenderImage {
    pub fn blank(width: u32, height: u32, shade: u8) -> Self {
        let mut pixels = vec![shade; width as usize * height as usize * 4];
        for alpha in pixels.iter_mut().skip(3).step_by(4) {
            *alpha = 255;
        }
        Self {
            width,
            height,
            pixels,
        }
    }
}

pub trait DocumentBackend: Send + Sync {
    fn info(&self) -> &DocumentInfo;
    fn render_page(&self, request: RenderRequest) -> Result<RenderImage>;
}

#[async_trait::async_trait]
pub trait DocumentProvider: Send + Sync {
    async fn open(&self, path: &Path) -> Result<Arc<dyn DocumentBackend>>;
}

const CACHE_CAPACITY: usize = 10;

pub struct LoadedDocument {
    backend: Arc<dyn DocumentBackend>,
    cache: Mutex<HashMap<CacheKey, Arc<RenderImage>>>,
}

impl LoadedDocument {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn info(&self) -> &DocumentInfo {
        self.backend.info()
    }

    pub fn page_count(&self) -> usize {
        self.info().page_count
    }

    pub fn render(&self, page_index: usize, scale: f32) -> Result<Arc<RenderImage>> {
        if page_index >= self.page_count() {
            return Err(anyhow!("page {} out of range", page_index + 1));
        }
        let key = CacheKey::new(page_index, scale);
        if let Some(image) = self.cache.lock().get(&key) {
            return Ok(Arc::clone(image));
        }

        let image = Arc::new(self.backend.render_page(RenderRequest { page_index, scale })?);
        let mut cache = self.cache.lock();
        cache.insert(key, Arc::clone(&image));
        if cache.len() > CACHE_CAPACITY {
            let mut keys: Vec<_> = cache.keys().copied().collect();
            keys.sort_by_key(|k| k.distance(page_index));
            for stale in keys.into_iter().skip(CACHE_CAPACITY) {
                cache.remove(&stale);
            }
        }
        Ok(image)
    }

    pub fn is_cached(&self, page_index: usize, scale: f32) -> bool {
        self.cache.lock().contains_key(&CacheKey::new(page_index, scale))
    }
}

impl std::fmt::Debug for LoadedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedDocument")
            .field("info", self.info())
            .field("cached", &self.cache.lock().len())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
struct CacheKey {
    page_index: usize,
    scale_milli: u32,
}

impl CacheKey {
    fn new(page_index: usize, scale: f32) -> Self {
        Self {
            page_index,
            scale_milli: quantize_scale(scale),
        }
    }

    fn distance(&self, reference_page: usize) -> usize {
        self.page_index.abs_diff(reference_page)
    }
}

fn quantize_scale(scale: f32) -> u32 {
    let scaled = (scale * 1000.0).round();
    if !scaled.is_finite() || scaled <= 0.0 {
        1
    } else if scaled > u32::MAX as f32 {
        u32::MAX
    } else {
        scaled as u32
    }
}
