mod layout;
mod panel;

use std::fs;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::cursor;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{self, Clear, ClearType};
use diffview_core::{
    project_dirs, Command, Config, DifferenceCatalog, DocumentPaths, DocumentSide,
    DocumentStatus, ListLayout, PrimaryPage, RenderImage, ReviewSession, SyncEvent,
};
use diffview_render::{placeholder, render_pages, side_by_side, PdfiumRenderFactory, RenderJob};
use diffview_tty::paint::{self, PixelRect};
use diffview_tty::{
    print_at, print_inverted, truncate_with_ellipsis, write_status_line, DrawParams,
    EventMapper, ImageSlot, InputMode, KittyRenderer, UiEvent,
};
use directories::ProjectDirs;
use tracing::{info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::layout::{CellRect, Geometry, Placement};
use crate::panel::{guideline_header, guideline_notes, ListView};

const PAGE_GAP: u32 = 16;
const BACKGROUND: [u8; 4] = [40, 40, 40, 255];
const MAX_NOTE_ROWS: usize = 6;
const PLACEHOLDER_PAGE: (f32, f32) = (612.0, 792.0);

#[derive(Debug, Parser)]
#[command(
    name = "diffview",
    version,
    about = "Side-by-side PDF difference reviewer for kitty-compatible terminals"
)]
struct Args {
    /// Previous, approved version of the document
    #[arg(long)]
    baseline: PathBuf,

    /// New version the differences are marked on
    #[arg(long)]
    revised: PathBuf,

    /// Guideline document the differences are checked against
    #[arg(long)]
    guideline: PathBuf,

    /// Difference catalog (.toml or .json)
    #[arg(long)]
    catalog: PathBuf,

    /// Page to open the primary documents on (1-based)
    #[arg(short = 'p', long = "page")]
    page: Option<u32>,

    /// Configuration file, instead of the platform default
    #[arg(long)]
    config: Option<PathBuf>,
}

struct RawModeGuard;

impl RawModeGuard {
    fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, EnableMouseCapture, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = crossterm::execute!(stdout, DisableMouseCapture, cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let project_dirs = project_dirs()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| Config::default_path(&project_dirs));
    let config = Config::load(&config_path)?;
    let _log_guard = init_logging(&project_dirs, &config.log_filter)?;
    info!(config = %config_path.display(), "starting diffview");

    let catalog = DifferenceCatalog::load(&args.catalog)
        .with_context(|| format!("failed to load catalog {:?}", args.catalog))?;
    info!(
        differences = catalog.len(),
        highlights = catalog.highlights().len(),
        "catalog loaded"
    );
    let mut session = ReviewSession::new(catalog, &config);

    let provider = PdfiumRenderFactory::new(config.pdfium_library.as_deref())?;
    let paths = DocumentPaths {
        baseline: args.baseline.clone(),
        revised: args.revised.clone(),
        guideline: args.guideline.clone(),
    };
    session.open_documents(&provider, &paths).await;

    if let Some(page) = args.page {
        let page = PrimaryPage::new(page).ok_or_else(|| anyhow!("pages are numbered from 1"))?;
        log_sync_events(session.apply(Command::GotoPage { page }, Instant::now()));
    }

    let _raw = RawModeGuard::new()?;
    let mut renderer = KittyRenderer::new(io::stdout());
    let mut mapper = EventMapper::new();
    let mut screen = Screen::default();
    let mut dirty = true;

    loop {
        let mode = if session.store().is_cross_referencing() {
            InputMode::Guideline
        } else {
            InputMode::Normal
        };
        mapper.set_mode(mode);

        if let Some(layout) = screen.list_layout.as_ref() {
            if session.poll_list_scroll(Instant::now(), layout).is_some() {
                dirty = true;
            }
        }

        if dirty {
            screen = redraw(&mut renderer, &mut session, mapper.pending_input())?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(100))? {
            match mapper.map_event(event::read()?) {
                UiEvent::Quit => break,
                UiEvent::None => {
                    let window = terminal::window_size()?;
                    let (_, _, status_row) = Geometry::from_window(&window).split();
                    draw_status_line(
                        &mut renderer,
                        &session,
                        status_row,
                        window.columns,
                        mapper.pending_input(),
                    )?;
                }
                UiEvent::Resize => dirty = true,
                UiEvent::Command(command) => {
                    log_sync_events(session.apply(command, Instant::now()));
                    dirty = true;
                }
                UiEvent::Click { column, row } => {
                    if let Some(command) = screen.click(column, row, &session) {
                        log_sync_events(session.apply(command, Instant::now()));
                        dirty = true;
                    }
                }
                UiEvent::ScrollList { delta } => {
                    if let Some(layout) = screen.list_layout.as_ref() {
                        session.scroll_list(delta, layout);
                        dirty = true;
                    }
                }
            }
        }
    }

    renderer.delete(ImageSlot::Primary)?;
    renderer.delete(ImageSlot::Guideline)?;
    renderer.clear_all()?;
    Ok(())
}

fn log_sync_events(events: Vec<SyncEvent>) {
    for event in &events {
        trace!(?event, "sync event");
    }
}

#[derive(Debug, Clone, Copy)]
struct RevisedArea {
    placement: Placement,
    offset_x: u32,
    width: u32,
}

#[derive(Debug, Default)]
struct Screen {
    revised: Option<RevisedArea>,
    list_area: Option<CellRect>,
    list_rows: Vec<usize>,
    list_layout: Option<ListLayout>,
}

impl Screen {
    fn click(&self, column: u16, row: u16, session: &ReviewSession) -> Option<Command> {
        if let Some(revised) = &self.revised {
            if let Some((x, y)) = revised.placement.to_image_pixel(column, row) {
                let x = x - revised.offset_x as f32;
                if x >= 0.0 && x < revised.width as f32 {
                    return Some(Command::ClickOverlay { x, y });
                }
                return None;
            }
        }

        let area = self.list_area?;
        if !area.contains(column, row) {
            return None;
        }
        let index = *self.list_rows.get(usize::from(row - area.row))?;
        let record = session.store().catalog().differences().get(index)?;
        Some(Command::Select {
            id: record.id.clone(),
        })
    }
}

fn redraw(
    renderer: &mut KittyRenderer<Stdout>,
    session: &mut ReviewSession,
    pending_input: Option<&str>,
) -> Result<Screen> {
    let window = terminal::window_size()?;
    let geometry = Geometry::from_window(&window);
    let (primary_area, side_area, status_row) = geometry.split();
    let mut screen = Screen::default();

    renderer.begin_sync_update()?;
    crossterm::queue!(renderer.writer(), Clear(ClearType::All))?;

    screen.revised = draw_primary(renderer, session, &geometry, primary_area)?;
    if session.store().is_cross_referencing() {
        draw_guideline(renderer, session, &geometry, side_area)?;
    } else {
        renderer.delete(ImageSlot::Guideline)?;
        draw_list(renderer, session, side_area, &mut screen)?;
    }
    draw_status_line(renderer, session, status_row, geometry.columns, pending_input)?;

    renderer.end_sync_update()?;
    Ok(screen)
}

fn draw_primary(
    renderer: &mut KittyRenderer<Stdout>,
    session: &ReviewSession,
    geometry: &Geometry,
    area: CellRect,
) -> Result<Option<RevisedArea>> {
    let viewer = session.viewer();
    let page = viewer.page();
    let scale = viewer.scale();

    let jobs: Vec<(DocumentSide, Option<RenderJob>)> = viewer
        .view_mode()
        .sides()
        .iter()
        .map(|&side| {
            let job = session
                .document(side)
                .filter(|_| matches!(viewer.status(side), DocumentStatus::Ready { .. }))
                .filter(|document| page.index() < document.page_count())
                .map(|document| RenderJob {
                    document: Arc::clone(document),
                    page_index: page.index(),
                    scale,
                });
            (side, job)
        })
        .collect();

    let runnable: Vec<RenderJob> = jobs.iter().filter_map(|(_, job)| job.clone()).collect();
    let mut results = render_pages(&runnable).into_iter();
    let mut rendered: Vec<(DocumentSide, Option<Arc<RenderImage>>)> = Vec::with_capacity(jobs.len());
    for (side, job) in &jobs {
        let image = match job {
            Some(_) => results.next().and_then(Result::ok),
            None => None,
        };
        if image.is_some() {
            viewer.mark_rendered(*side, page);
        }
        rendered.push((*side, image));
    }

    let (ref_w, ref_h) = rendered
        .iter()
        .find_map(|(_, image)| image.as_ref().map(|image| (image.width, image.height)))
        .unwrap_or((
            (PLACEHOLDER_PAGE.0 * scale) as u32,
            (PLACEHOLDER_PAGE.1 * scale) as u32,
        ));
    let mut pages: Vec<RenderImage> = rendered
        .iter()
        .map(|(_, image)| match image {
            Some(image) => RenderImage::clone(image),
            None => placeholder(ref_w, ref_h),
        })
        .collect();

    let revised_index = rendered
        .iter()
        .position(|(side, _)| *side == DocumentSide::Revised);
    if let (Some(overlay), Some(index)) = (session.overlay(), revised_index) {
        let (active, inactive): (Vec<_>, Vec<_>) =
            overlay.boxes().iter().partition(|overlay_box| overlay_box.active);
        for overlay_box in inactive {
            if let Some(rect) = PixelRect::from_box(overlay_box.rect, 0) {
                paint::paint_box(&mut pages[index], rect, paint::DIFFERENCE);
            }
        }
        for overlay_box in active {
            if let Some(rect) = PixelRect::from_box(overlay_box.rect, 0) {
                paint::paint_box(&mut pages[index], rect, paint::ACTIVE_DIFFERENCE);
            }
        }
    }

    let refs: Vec<&RenderImage> = pages.iter().collect();
    let composition = side_by_side(&refs, PAGE_GAP, BACKGROUND)?;
    let cells = geometry.fit_image(area, composition.image.width, composition.image.height);
    crossterm::queue!(renderer.writer(), cursor::MoveTo(cells.col, cells.row))?;
    renderer.draw(
        ImageSlot::Primary,
        &composition.image,
        DrawParams::clamped(u32::from(cells.cols), u32::from(cells.rows)),
    )?;

    Ok(revised_index.map(|index| RevisedArea {
        placement: Placement {
            cells,
            image_width: composition.image.width,
            image_height: composition.image.height,
        },
        offset_x: composition.offsets[index],
        width: pages[index].width,
    }))
}

fn draw_list(
    renderer: &mut KittyRenderer<Stdout>,
    session: &ReviewSession,
    area: CellRect,
    screen: &mut Screen,
) -> Result<()> {
    let entries = session.list().entries(session.store());
    let writer = renderer.writer();
    if entries.is_empty() {
        print_at(writer, area.col, area.row, "No differences in catalog")?;
        return Ok(());
    }

    let view = ListView::build(&entries, area.cols, area.rows);
    let visible = view.visible(session.list().scroll_offset(), usize::from(area.rows));
    for (offset, line) in visible.iter().enumerate() {
        let row = area.row + offset as u16;
        if line.active {
            print_inverted(writer, area.col, row, &line.text)?;
        } else {
            print_at(writer, area.col, row, &line.text)?;
        }
        screen.list_rows.push(line.entry);
    }
    screen.list_area = Some(area);
    screen.list_layout = Some(view.layout);
    Ok(())
}

fn draw_guideline(
    renderer: &mut KittyRenderer<Stdout>,
    session: &mut ReviewSession,
    geometry: &Geometry,
    area: CellRect,
) -> Result<()> {
    let Some(viewer) = session.guideline() else {
        return Ok(());
    };
    let width = usize::from(area.cols.max(1));
    let page = viewer.page();
    let scale = viewer.scale();
    let load_error = viewer.load_error().map(str::to_owned);
    print_inverted(
        renderer.writer(),
        area.col,
        area.row,
        &guideline_header(viewer, area.cols),
    )?;

    if let Some(error) = load_error {
        renderer.delete(ImageSlot::Guideline)?;
        let message = truncate_with_ellipsis(&format!("Guideline unavailable: {error}"), width);
        print_at(renderer.writer(), area.col, area.row + 2, &message)?;
        return Ok(());
    }
    let Some(document) = session.guideline_document().cloned() else {
        print_at(renderer.writer(), area.col, area.row + 2, "Loading guideline...")?;
        return Ok(());
    };

    let mut image = match document.render(page.index(), scale) {
        Ok(image) => RenderImage::clone(&image),
        Err(err) => {
            warn!(page = page.get(), "guideline render failed: {err:#}");
            renderer.delete(ImageSlot::Guideline)?;
            let message = truncate_with_ellipsis(&format!("Render failed: {err}"), width);
            print_at(renderer.writer(), area.col, area.row + 2, &message)?;
            return Ok(());
        }
    };
    if let Some(viewer) = session.guideline_mut() {
        viewer.mark_rendered(page);
    }

    let Some(viewer) = session.guideline() else {
        return Ok(());
    };
    let catalog = session.store().catalog();
    for highlight in viewer.visible_highlights(catalog) {
        if let Some(rect) = PixelRect::from_box(highlight.rect, 0) {
            paint::paint_box(&mut image, rect, paint::GUIDELINE_HIGHLIGHT);
        }
    }

    let notes: Vec<String> = guideline_notes(viewer, catalog, area.cols)
        .into_iter()
        .take(MAX_NOTE_ROWS)
        .collect();
    let notes_rows = if notes.is_empty() { 0 } else { notes.len() as u16 + 1 };
    let image_area = CellRect {
        col: area.col,
        row: area.row + 1,
        cols: area.cols,
        rows: area.rows.saturating_sub(1 + notes_rows).max(1),
    };
    let cells = geometry.fit_image(image_area, image.width, image.height);
    crossterm::queue!(renderer.writer(), cursor::MoveTo(cells.col, cells.row))?;
    renderer.draw(
        ImageSlot::Guideline,
        &image,
        DrawParams::clamped(u32::from(cells.cols), u32::from(cells.rows)),
    )?;

    let first_note_row = image_area.row + image_area.rows + 1;
    for (offset, note) in notes.iter().enumerate() {
        print_at(
            renderer.writer(),
            area.col,
            first_note_row + offset as u16,
            &truncate_with_ellipsis(note, width),
        )?;
    }
    Ok(())
}

fn status_text(session: &ReviewSession) -> String {
    let viewer = session.viewer();
    let pages = match viewer.page_count() {
        Some(count) => format!("{}/{}", viewer.page(), count),
        None => viewer.page().to_string(),
    };
    let mut status = format!(
        "page {} - {} - {:.0}%",
        pages,
        viewer.view_mode().label(),
        viewer.scale() * 100.0
    );
    match session.store().active() {
        Some(record) => status.push_str(&format!(" - {}", record.id)),
        None => status.push_str(" - no selection"),
    }
    for side in [DocumentSide::Revised, DocumentSide::Baseline] {
        if let DocumentStatus::Failed { message } = viewer.status(side) {
            status.push_str(&format!(" - {} unavailable: {}", side.label(), message));
        }
    }
    status
}

fn combine_status(base: String, pending_input: Option<&str>) -> String {
    match pending_input.filter(|pending| !pending.is_empty()) {
        Some(pending) => format!("{base} | {pending}"),
        None => base,
    }
}

fn draw_status_line(
    renderer: &mut KittyRenderer<Stdout>,
    session: &ReviewSession,
    status_row: u16,
    columns: u16,
    pending_input: Option<&str>,
) -> Result<()> {
    let status = combine_status(status_text(session), pending_input);
    let mut writer = renderer.writer();
    crossterm::execute!(
        &mut writer,
        cursor::MoveTo(0, status_row),
        Clear(ClearType::CurrentLine)
    )?;
    write_status_line(
        &mut writer,
        &truncate_with_ellipsis(&status, usize::from(columns.max(1))),
    )?;
    Ok(())
}

fn init_logging(project_dirs: &ProjectDirs, default_filter: &str) -> Result<WorkerGuard> {
    let log_dir = project_dirs.data_local_dir().join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {:?}", log_dir))?;

    let file_appender = tracing_appender::rolling::never(log_dir, "diffview.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout is the drawing surface, so logs only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!(err))?;

    Ok(guard)
}
