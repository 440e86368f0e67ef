use std::io::Write;

use anyhow::Result;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use crossterm::{
    cursor,
    terminal::{Clear, ClearType},
};
use diffview_core::RenderImage;
use png::{BitDepth, ColorType, Encoder};
use tracing::trace;

/// Independent image placements on screen. Redrawing a slot replaces only that
/// slot's image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Primary,
    Guideline,
}

impl ImageSlot {
    fn image_id(self) -> u32 {
        match self {
            ImageSlot::Primary => 1,
            ImageSlot::Guideline => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawParams {
    pub columns: u32,
    pub rows: u32,
}

impl DrawParams {
    pub fn clamped(columns: u32, rows: u32) -> Self {
        Self {
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }
}

pub struct KittyRenderer<W: Write> {
    writer: W,
}

impl<W: Write> KittyRenderer<W> {
    const CHUNK: usize = 4096;

    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Transmits and places `image` at the cursor, scaled into the given cells.
    pub fn draw(&mut self, slot: ImageSlot, image: &RenderImage, params: DrawParams) -> Result<()> {
        let mut buffer = Vec::new();
        let mut encoder = Encoder::new(&mut buffer, image.width, image.height);
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&image.pixels)?;
        writer.finish()?;

        let encoded = BASE64.encode(&buffer);
        trace!(
            slot = ?slot,
            width = image.width,
            height = image.height,
            bytes = encoded.len(),
            "transmitting image"
        );
        let mut chunks = encoded.as_bytes().chunks(Self::CHUNK).peekable();
        let mut first = true;

        while let Some(chunk) = chunks.next() {
            let more = chunks.peek().is_some();
            if first {
                write!(
                    self.writer,
                    "\u{1b}_Ga=T,f=100,C=1,q=2,i={id},p={id},c={},r={},s={},v={},z=-1,m={}",
                    params.columns,
                    params.rows,
                    image.width,
                    image.height,
                    u8::from(more),
                    id = slot.image_id(),
                )?;
                first = false;
            } else {
                write!(self.writer, "\u{1b}_Gm={},q=2", u8::from(more))?;
            }
            if !chunk.is_empty() {
                self.writer.write_all(b";")?;
                self.writer.write_all(chunk)?;
            }
            write!(self.writer, "\u{1b}\\")?;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Removes the slot's image and frees its data in the terminal.
    pub fn delete(&mut self, slot: ImageSlot) -> Result<()> {
        write!(self.writer, "\u{1b}_Ga=d,d=I,q=2,i={}\u{1b}\\", slot.image_id())?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn begin_sync_update(&mut self) -> Result<()> {
        write!(self.writer, "\u{1b}[?2026h")?;
        Ok(())
    }

    /// The terminal shows everything buffered since `begin_sync_update` at once.
    pub fn end_sync_update(&mut self) -> Result<()> {
        write!(self.writer, "\u{1b}[?2026l")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn clear_all(&mut self) -> Result<()> {
        crossterm::execute!(
            &mut self.writer,
            Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel() -> RenderImage {
        RenderImage {
            width: 1,
            height: 1,
            pixels: vec![255, 0, 0, 255],
        }
    }

    #[test]
    fn draw_emits_graphics_escape_for_slot() {
        let mut renderer = KittyRenderer::new(Vec::new());
        renderer
            .draw(ImageSlot::Guideline, &pixel(), DrawParams::clamped(10, 5))
            .unwrap();
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(output.starts_with("\u{1b}_Ga=T,f=100,"));
        assert!(output.contains("i=2,p=2,c=10,r=5,s=1,v=1"));
        assert!(output.ends_with("\u{1b}\\"));
    }

    #[test]
    fn large_images_are_chunked() {
        let mut state = 0x2545_f491_u32;
        let pixels = (0..64 * 64 * 4)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (state >> 24) as u8
            })
            .collect();
        let image = RenderImage {
            width: 64,
            height: 64,
            pixels,
        };
        let mut renderer = KittyRenderer::new(Vec::new());
        renderer
            .draw(ImageSlot::Primary, &image, DrawParams::clamped(0, 0))
            .unwrap();
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(output.contains("c=1,r=1"));
        assert!(output.contains("m=1"));
        assert!(output.contains("\u{1b}_Gm=0,q=2;"));
    }

    #[test]
    fn delete_targets_only_its_slot() {
        let mut renderer = KittyRenderer::new(Vec::new());
        renderer.delete(ImageSlot::Guideline).unwrap();
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(output, "\u{1b}_Ga=d,d=I,q=2,i=2\u{1b}\\");
    }
}
