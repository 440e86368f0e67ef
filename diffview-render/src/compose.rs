use anyhow::{anyhow, Result};
use diffview_core::RenderImage;
use image::{imageops, Rgba, RgbaImage};

#[derive(Debug, Clone)]
pub struct Composition {
    pub image: RenderImage,
    pub offsets: Vec<u32>,
}

pub fn side_by_side(images: &[&RenderImage], gap: u32, background: [u8; 4]) -> Result<Composition> {
    if images.is_empty() {
        return Err(anyhow!("nothing to compose"));
    }
    let width = images.iter().map(|image| image.width).sum::<u32>()
        + gap * (images.len() as u32 - 1);
    let height = images.iter().map(|image| image.height).max().unwrap_or(0);

    let mut canvas = RgbaImage::from_pixel(width.max(1), height.max(1), Rgba(background));
    let mut offsets = Vec::with_capacity(images.len());
    let mut x = 0u32;
    for page in images {
        let buffer = RgbaImage::from_raw(page.width, page.height, page.pixels.clone())
            .ok_or_else(|| anyhow!("page buffer does not match {}x{}", page.width, page.height))?;
        imageops::replace(&mut canvas, &buffer, i64::from(x), 0);
        offsets.push(x);
        x += page.width + gap;
    }

    let (width, height) = canvas.dimensions();
    Ok(Composition {
        image: RenderImage {
            width,
            height,
            pixels: canvas.into_raw(),
        },
        offsets,
    })
}

pub fn placeholder(width: u32, height: u32) -> RenderImage {
    RenderImage::blank(width.max(1), height.max(1), 48)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, value: u8) -> RenderImage {
        RenderImage {
            width,
            height,
            pixels: vec![value; (width * height * 4) as usize],
        }
    }

    #[test]
    fn pages_are_laid_out_with_gap() {
        let left = solid(2, 2, 10);
        let right = solid(3, 1, 200);
        let composed = side_by_side(&[&left, &right], 1, [0, 0, 0, 255]).unwrap();

        assert_eq!(composed.offsets, vec![0, 3]);
        assert_eq!(composed.image.width, 6);
        assert_eq!(composed.image.height, 2);
        let pixel = |x: u32, y: u32| {
            let at = ((y * composed.image.width + x) * 4) as usize;
            composed.image.pixels[at]
        };
        assert_eq!(pixel(0, 1), 10);
        assert_eq!(pixel(2, 0), 0);
        assert_eq!(pixel(3, 0), 200);
        assert_eq!(pixel(3, 1), 0);
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        let broken = RenderImage {
            width: 4,
            height: 4,
            pixels: vec![0; 3],
        };
        assert!(side_by_side(&[&broken], 0, [0; 4]).is_err());
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(side_by_side(&[], 2, [0; 4]).is_err());
    }
}
