use diffview_core::{BoundingBox, RenderImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn from_box(rect: BoundingBox, offset_x: u32) -> Option<Self> {
        let x0 = rect.x.max(0.0).floor();
        let y0 = rect.y.max(0.0).floor();
        let x1 = rect.right().ceil();
        let y1 = rect.bottom().ceil();
        if !(x1 > x0 && y1 > y0) || !x1.is_finite() || !y1.is_finite() {
            return None;
        }
        Some(Self {
            x0: x0 as u32 + offset_x,
            y0: y0 as u32,
            x1: x1 as u32 + offset_x,
            y1: y1 as u32,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    pub fill: [u8; 3],
    pub alpha: f32,
    pub outline: [u8; 3],
    pub thickness: u32,
}

pub const DIFFERENCE: BoxStyle = BoxStyle {
    fill: [255, 196, 0],
    alpha: 0.18,
    outline: [224, 150, 0],
    thickness: 1,
};

pub const ACTIVE_DIFFERENCE: BoxStyle = BoxStyle {
    fill: [230, 57, 70],
    alpha: 0.28,
    outline: [200, 30, 45],
    thickness: 3,
};

pub const GUIDELINE_HIGHLIGHT: BoxStyle = BoxStyle {
    fill: [64, 160, 255],
    alpha: 0.25,
    outline: [30, 110, 220],
    thickness: 2,
};

pub fn paint_box(image: &mut RenderImage, rect: PixelRect, style: BoxStyle) {
    fill_rect(image, rect, style.fill, style.alpha);
    outline_rect(image, rect, style.outline, style.thickness);
}

pub fn fill_rect(image: &mut RenderImage, rect: PixelRect, color: [u8; 3], alpha: f32) {
    if rect.x0 >= rect.x1 || rect.y0 >= rect.y1 {
        return;
    }
    let width = image.width as usize;
    if width == 0 || image.height == 0 {
        return;
    }

    let x1 = rect.x1.min(image.width);
    let y1 = rect.y1.min(image.height);
    let x0 = rect.x0.min(x1);
    let y0 = rect.y0.min(y1);

    for y in y0..y1 {
        let row_start = (y as usize) * width * 4;
        for x in x0..x1 {
            let idx = row_start + (x as usize) * 4;
            blend_pixel(&mut image.pixels[idx..idx + 4], color, alpha);
        }
    }
}

pub fn outline_rect(image: &mut RenderImage, rect: PixelRect, color: [u8; 3], thickness: u32) {
    if thickness == 0 || rect.x0 >= rect.x1 || rect.y0 >= rect.y1 {
        return;
    }
    let t_x = thickness.min(rect.x1 - rect.x0);
    let t_y = thickness.min(rect.y1 - rect.y0);
    let edges = [
        PixelRect { y1: rect.y0 + t_y, ..rect },
        PixelRect { y0: rect.y1 - t_y, ..rect },
        PixelRect { x1: rect.x0 + t_x, ..rect },
        PixelRect { x0: rect.x1 - t_x, ..rect },
    ];
    for edge in edges {
        fill_rect(image, edge, color, 1.0);
    }
}

pub fn blend_pixel(pixel: &mut [u8], color: [u8; 3], alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    let inv = 1.0 - alpha;
    for (channel, target) in pixel.iter_mut().zip(color) {
        *channel = ((*channel as f32 * inv) + (target as f32 * alpha))
            .round()
            .clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(width: u32, height: u32) -> RenderImage {
        RenderImage::blank(width, height, 255)
    }

    fn at(image: &RenderImage, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * image.width + x) * 4) as usize;
        [
            image.pixels[idx],
            image.pixels[idx + 1],
            image.pixels[idx + 2],
            image.pixels[idx + 3],
        ]
    }

    #[test]
    fn blend_mixes_colour_and_keeps_alpha() {
        let mut pixel = [200, 100, 0, 255];
        blend_pixel(&mut pixel, [0, 0, 100], 0.5);
        assert_eq!(pixel, [100, 50, 50, 255]);
    }

    #[test]
    fn fill_is_clipped_to_image() {
        let mut image = white(4, 4);
        fill_rect(
            &mut image,
            PixelRect { x0: 2, y0: 2, x1: 10, y1: 10 },
            [0, 0, 0],
            1.0,
        );
        assert_eq!(at(&image, 3, 3), [0, 0, 0, 255]);
        assert_eq!(at(&image, 1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn painted_box_has_solid_outline_and_tinted_inside() {
        let mut image = white(10, 10);
        let rect = PixelRect { x0: 1, y0: 1, x1: 9, y1: 9 };
        paint_box(&mut image, rect, ACTIVE_DIFFERENCE);

        let edge = at(&image, 1, 5);
        assert_eq!(&edge[..3], &ACTIVE_DIFFERENCE.outline);
        let inside = at(&image, 5, 5);
        assert!(inside[1] < 255 && inside[0] > inside[1]);
        assert_eq!(at(&image, 0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn box_conversion_applies_offset_and_rejects_empty() {
        let rect = PixelRect::from_box(BoundingBox::new(1.2, 2.0, 3.0, 1.5), 10).unwrap();
        assert_eq!(rect, PixelRect { x0: 11, y0: 2, x1: 15, y1: 4 });
        assert!(PixelRect::from_box(BoundingBox::new(5.0, 5.0, 0.0, 2.0), 0).is_none());
    }
}
