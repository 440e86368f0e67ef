use crossterm::terminal::WindowSize;

const PRIMARY_SHARE: f32 = 0.6;
const FALLBACK_CELL: (f32, f32) = (8.0, 16.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellRect {
    pub col: u16,
    pub row: u16,
    pub cols: u16,
    pub rows: u16,
}

impl CellRect {
    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.col
            && row >= self.row
            && u32::from(column) < u32::from(self.col) + u32::from(self.cols)
            && u32::from(row) < u32::from(self.row) + u32::from(self.rows)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub columns: u16,
    pub rows: u16,
    pub cell_width: f32,
    pub cell_height: f32,
}

impl Geometry {
    pub fn from_window(window: &WindowSize) -> Self {
        let columns = window.columns.max(1);
        let rows = window.rows.max(1);
        let (cell_width, cell_height) = if window.width > 0 && window.height > 0 {
            (
                f32::from(window.width) / f32::from(columns),
                f32::from(window.height) / f32::from(rows),
            )
        } else {
            FALLBACK_CELL
        };
        Self {
            columns,
            rows,
            cell_width,
            cell_height,
        }
    }

    pub fn split(&self) -> (CellRect, CellRect, u16) {
        let body_rows = self.rows.saturating_sub(1).max(1);
        let primary_cols = ((f32::from(self.columns) * PRIMARY_SHARE).round() as u16)
            .clamp(1, self.columns);
        let primary = CellRect {
            col: 0,
            row: 0,
            cols: primary_cols,
            rows: body_rows,
        };
        let side = CellRect {
            col: primary_cols,
            row: 0,
            cols: self.columns - primary_cols,
            rows: body_rows,
        };
        (primary, side, self.rows.saturating_sub(1))
    }

    pub fn fit_image(&self, area: CellRect, width: u32, height: u32) -> CellRect {
        if width == 0 || height == 0 || area.cols == 0 || area.rows == 0 {
            return CellRect { cols: 0, rows: 0, ..area };
        }
        let area_w = f32::from(area.cols) * self.cell_width;
        let area_h = f32::from(area.rows) * self.cell_height;
        let ratio = (area_w / width as f32).min(area_h / height as f32);

        let cols = ((width as f32 * ratio) / self.cell_width)
            .round()
            .clamp(1.0, f32::from(area.cols)) as u16;
        let rows = ((height as f32 * ratio) / self.cell_height)
            .round()
            .clamp(1.0, f32::from(area.rows)) as u16;
        CellRect {
            col: area.col + (area.cols - cols) / 2,
            row: area.row + (area.rows - rows) / 2,
            cols,
            rows,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub cells: CellRect,
    pub image_width: u32,
    pub image_height: u32,
}

impl Placement {
    pub fn to_image_pixel(&self, column: u16, row: u16) -> Option<(f32, f32)> {
        if !self.cells.contains(column, row) {
            return None;
        }
        let fx = (f32::from(column - self.cells.col) + 0.5) / f32::from(self.cells.cols);
        let fy = (f32::from(row - self.cells.row) + 0.5) / f32::from(self.cells.rows);
        Some((fx * self.image_width as f32, fy * self.image_height as f32))
    }
}
