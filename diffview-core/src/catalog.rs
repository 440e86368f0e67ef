use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::page::{GuidelinePage, PrimaryPage};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffId(String);

impl DiffId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DiffId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DiffId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for DiffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn scaled(&self, scale: f32) -> Self {
        Self {
            x: self.x * scale,
            y: self.y * scale,
            w: self.w * scale,
            h: self.h * scale,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferenceRecord {
    pub id: DiffId,
    pub page: PrimaryPage,
    #[serde(rename = "bbox")]
    pub bounding_box: BoundingBox,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidelineHighlight {
    pub diff_id: DiffId,
    pub page: GuidelinePage,
    #[serde(rename = "bbox")]
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub annotation: String,
}

impl GuidelineHighlight {
    pub fn annotation(&self) -> Option<&str> {
        let trimmed = self.annotation.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    differences: Vec<DifferenceRecord>,
    #[serde(default)]
    highlights: Vec<GuidelineHighlight>,
}

#[derive(Debug, Default)]
pub struct DifferenceCatalog {
    differences: Vec<DifferenceRecord>,
    highlights: Vec<GuidelineHighlight>,
    index: HashMap<DiffId, usize>,
}

impl DifferenceCatalog {
    pub fn new(
        differences: Vec<DifferenceRecord>,
        highlights: Vec<GuidelineHighlight>,
    ) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(differences.len());
        for (position, record) in differences.iter().enumerate() {
            if index.insert(record.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateDifference(record.id.clone()));
            }
        }

        let highlights = highlights
            .into_iter()
            .filter(|highlight| {
                let known = index.contains_key(&highlight.diff_id);
                if !known {
                    warn!(
                        diff_id = %highlight.diff_id,
                        page = highlight.page.get(),
                        "dropping guideline highlight for unknown difference"
                    );
                }
                known
            })
            .collect();

        Ok(Self {
            differences,
            highlights,
            index,
        })
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let catalog = match extension.as_str() {
            "toml" => Self::from_toml_str(&raw)?,
            "json" => Self::from_json_str(&raw)?,
            _ => return Err(CatalogError::UnsupportedFormat(path.to_path_buf())),
        };
        debug!(
            path = %path.display(),
            differences = catalog.len(),
            highlights = catalog.highlights.len(),
            "loaded difference catalog"
        );
        Ok(catalog)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(raw)?;
        Self::new(file.differences, file.highlights)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        Self::new(file.differences, file.highlights)
    }

    pub fn differences(&self) -> &[DifferenceRecord] {
        &self.differences
    }

    pub fn highlights(&self) -> &[GuidelineHighlight] {
        &self.highlights
    }

    pub fn len(&self) -> usize {
        self.differences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DifferenceRecord> {
        self.position(id).map(|position| &self.differences[position])
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn page_of(&self, id: &str) -> Option<PrimaryPage> {
        self.get(id).map(|record| record.page)
    }

    pub fn on_page(&self, page: PrimaryPage) -> impl Iterator<Item = &DifferenceRecord> + '_ {
        self.differences
            .iter()
            .filter(move |record| record.page == page)
    }

    pub fn highlights_for<'a>(
        &'a self,
        id: &'a str,
    ) -> impl Iterator<Item = &'a GuidelineHighlight> + 'a {
        self.highlights
            .iter()
            .filter(move |highlight| highlight.diff_id.as_str() == id)
    }

    pub fn has_highlights(&self, id: &str) -> bool {
        self.highlights_for(id).next().is_some()
    }

    pub fn first_highlight_page(&self, id: &str) -> Option<GuidelinePage> {
        self.highlights_for(id).next().map(|highlight| highlight.page)
    }

    pub fn annotation_excerpt(&self, id: &str) -> Option<&str> {
        self.highlights
            .iter()
            .filter(|highlight| highlight.diff_id.as_str() == id)
            .find_map(GuidelineHighlight::annotation)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(id: &str, page: u32) -> DifferenceRecord {
        DifferenceRecord {
            id: DiffId::new(id),
            page: PrimaryPage::new(page).unwrap(),
            bounding_box: BoundingBox::new(100.0, 200.0, 50.0, 20.0),
            summary: format!("summary of {id}"),
        }
    }

    pub fn highlight(id: &str, page: u32, annotation: &str) -> GuidelineHighlight {
        GuidelineHighlight {
            diff_id: DiffId::new(id),
            page: GuidelinePage::new(page).unwrap(),
            bounding_box: BoundingBox::new(50.0, 100.0, 400.0, 30.0),
            text: format!("rule for {id}"),
            annotation: annotation.to_string(),
        }
    }

    pub fn catalog() -> DifferenceCatalog {
        DifferenceCatalog::new(
            vec![
                record("D-01", 1),
                record("D-02", 1),
                record("D-03", 2),
                record("D-07", 7),
                record("D-09", 9),
            ],
            vec![
                highlight("D-01", 1, ""),
                highlight("D-03", 3, "differs from the guideline"),
                highlight("D-07", 2, "link points at the old domain"),
                highlight("D-07", 5, ""),
            ],
        )
        .unwrap()
    }
}
