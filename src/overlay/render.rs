//! Draws the scan region and character markers onto RGBA images

use image::RgbaImage;
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::geometry::PixelRect;
use crate::overlay::{Marker, OverlayStyle};

/// Live preview: region outline plus markers in full-frame space
pub fn annotate_frame(
    image: &mut RgbaImage,
    region: PixelRect,
    markers: &[Marker],
    style: &OverlayStyle,
) {
    draw_region(image, region, style);
    draw_markers(image, markers, style);
}

/// Review snapshot: markers only, already projected into cropped space
pub fn annotate_review(image: &mut RgbaImage, markers: &[Marker], style: &OverlayStyle) {
    draw_markers(image, markers, style);
}

fn draw_region(image: &mut RgbaImage, region: PixelRect, style: &OverlayStyle) {
    let x = region.x.round() as i32;
    let y = region.y.round() as i32;
    let width = region.width.round() as u32;
    let height = region.height.round() as u32;

    // Inset each pass so the stroke grows inwards
    for inset in 0..style.region_stroke {
        let w = width.saturating_sub(inset * 2);
        let h = height.saturating_sub(inset * 2);
        if w == 0 || h == 0 {
            break;
        }
        let rect = Rect::at(x + inset as i32, y + inset as i32).of_size(w, h);
        draw_hollow_rect_mut(image, rect, style.region_color);
    }
}

fn draw_markers(image: &mut RgbaImage, markers: &[Marker], style: &OverlayStyle) {
    for marker in markers {
        draw_filled_circle_mut(
            image,
            (marker.x.round() as i32, marker.y.round() as i32),
            style.marker_radius,
            style.marker_color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn test_annotate_frame_draws_region_outline() {
        let mut image = RgbaImage::from_pixel(100, 50, BLACK);
        let style = OverlayStyle::default();
        let region = PixelRect {
            x: 10.0,
            y: 20.0,
            width: 80.0,
            height: 10.0,
        };

        annotate_frame(&mut image, region, &[], &style);

        assert_eq!(image.get_pixel(10, 20), &style.region_color);
        assert_eq!(image.get_pixel(89, 29), &style.region_color);
        assert_eq!(image.get_pixel(11, 21), &style.region_color);
        assert_eq!(image.get_pixel(50, 25), &BLACK);
        assert_eq!(image.get_pixel(5, 5), &BLACK);
    }

    #[test]
    fn test_annotate_review_draws_markers() {
        let mut image = RgbaImage::from_pixel(40, 20, BLACK);
        let style = OverlayStyle::default();
        let markers = [Marker { x: 10.0, y: 14.0 }, Marker { x: 30.0, y: 5.0 }];

        annotate_review(&mut image, &markers, &style);

        assert_eq!(image.get_pixel(10, 14), &style.marker_color);
        assert_eq!(image.get_pixel(30, 5), &style.marker_color);
        assert_eq!(image.get_pixel(20, 10), &BLACK);
    }

    #[test]
    fn test_markers_outside_image_are_clipped() {
        let mut image = RgbaImage::from_pixel(10, 10, BLACK);
        let markers = [Marker { x: -50.0, y: 500.0 }];
        annotate_review(&mut image, &markers, &OverlayStyle::default());
        assert!(image.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn test_degenerate_region_is_skipped() {
        let mut image = RgbaImage::from_pixel(10, 10, BLACK);
        let region = PixelRect {
            x: 2.0,
            y: 2.0,
            width: 0.0,
            height: 5.0,
        };
        annotate_frame(&mut image, region, &[], &OverlayStyle::default());
        assert!(image.pixels().all(|p| *p == BLACK));
    }
}
