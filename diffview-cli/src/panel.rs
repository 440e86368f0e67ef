use diffview_core::{DifferenceCatalog, GuidelineViewer, ListEntry, ListLayout};
use diffview_tty::{truncate_with_ellipsis, wrap_text};

const INDENT: &str = "    ";

#[derive(Debug, Clone, PartialEq)]
pub struct ListLine {
    pub text: String,
    pub entry: usize,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct ListView {
    pub lines: Vec<ListLine>,
    pub layout: ListLayout,
}

impl ListView {
    pub fn build(entries: &[ListEntry<'_>], width: u16, viewport: u16) -> Self {
        let width = usize::from(width.max(1));
        let body_width = width.saturating_sub(INDENT.len()).max(1);
        let mut lines = Vec::new();
        let mut heights = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let before = lines.len();
            let record = entry.record;
            let mut push = |text: String| {
                lines.push(ListLine {
                    text: truncate_with_ellipsis(&text, width),
                    entry: index,
                    active: entry.expanded,
                })
            };

            if entry.expanded {
                push(format!("> {}  p.{}", record.id, record.page));
                for line in wrap_text(&record.summary, body_width) {
                    push(format!("{INDENT}{line}"));
                }
                if let Some(annotation) = entry.annotation {
                    for line in wrap_text(&format!("Guideline: {annotation}"), body_width) {
                        push(format!("{INDENT}{line}"));
                    }
                }
                if entry.has_guideline {
                    push(format!("{INDENT}[Enter] open guideline"));
                }
            } else {
                let marker = if entry.has_guideline { '*' } else { ' ' };
                push(format!(
                    "{marker} {}  p.{}  {}",
                    record.id, record.page, record.summary
                ));
            }
            heights.push(lines.len() - before);
        }

        Self {
            lines,
            layout: ListLayout::new(heights, usize::from(viewport)),
        }
    }

    pub fn visible(&self, offset: usize, rows: usize) -> &[ListLine] {
        let start = offset.min(self.layout.max_offset()).min(self.lines.len());
        let end = (start + rows).min(self.lines.len());
        &self.lines[start..end]
    }
}

pub fn guideline_header(viewer: &GuidelineViewer, width: u16) -> String {
    let pages = match viewer.page_count() {
        Some(count) => format!("{}/{}", viewer.page(), count),
        None => viewer.page().to_string(),
    };
    truncate_with_ellipsis(
        &format!(
            "Guideline - {} - page {} - [Esc] back",
            viewer.diff_id(),
            pages
        ),
        usize::from(width.max(1)),
    )
}

pub fn guideline_notes(
    viewer: &GuidelineViewer,
    catalog: &DifferenceCatalog,
    width: u16,
) -> Vec<String> {
    let width = usize::from(width.max(1));
    let mut notes = Vec::new();
    for highlight in viewer.page_highlights(catalog) {
        if !highlight.text.trim().is_empty() {
            notes.extend(wrap_text(&format!("\"{}\"", highlight.text.trim()), width));
        }
        if let Some(annotation) = highlight.annotation() {
            notes.extend(wrap_text(&format!("Note: {annotation}"), width));
        }
    }
    notes
}
