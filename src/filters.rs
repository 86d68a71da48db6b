//! Stateless filter primitives used by the pipeline stages
//!
//! Pixel-level work lives here, on `image` crate buffers; the stages in
//! [`crate::pipeline`] invoke these as opaque operations and stay free of
//! per-pixel loops.

use image::{GrayImage, Luma, Rgb, RgbImage};

/// Single-channel conversion
pub fn grayscale(frame: &image::DynamicImage) -> GrayImage {
    frame.to_luma8()
}

/// Promote a single-channel image to three channels
pub fn gray_to_rgb(gray: &GrayImage) -> RgbImage {
    let (w, h) = gray.dimensions();
    RgbImage::from_fn(w, h, |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    })
}

/// Sobel gradient-magnitude edge map, thresholded to a binary image.
///
/// Border pixels are left at zero.
pub fn edge_map(gray: &GrayImage, threshold: u16) -> GrayImage {
    let (w, h) = gray.dimensions();
    let mut out = GrayImage::new(w, h);
    if w < 3 || h < 3 {
        return out;
    }

    let px = |x: u32, y: u32| -> i32 { gray.get_pixel(x, y).0[0] as i32 };

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let gx = -px(x - 1, y - 1) + px(x + 1, y - 1) - 2 * px(x - 1, y)
                + 2 * px(x + 1, y)
                - px(x - 1, y + 1)
                + px(x + 1, y + 1);
            let gy = -px(x - 1, y - 1) - 2 * px(x, y - 1) - px(x + 1, y - 1)
                + px(x - 1, y + 1)
                + 2 * px(x, y + 1)
                + px(x + 1, y + 1);
            let magnitude = ((gx * gx + gy * gy) as f32).sqrt() as u16;
            if magnitude >= threshold {
                out.put_pixel(x, y, Luma([255]));
            }
        }
    }
    out
}

/// Intensity sum of each row
pub fn row_sums(gray: &GrayImage) -> Vec<u64> {
    let (w, h) = gray.dimensions();
    let mut sums = vec![0u64; h as usize];
    for y in 0..h {
        for x in 0..w {
            sums[y as usize] += gray.get_pixel(x, y).0[0] as u64;
        }
    }
    sums
}

/// Intensity sum of each column
pub fn col_sums(gray: &GrayImage) -> Vec<u64> {
    let (w, h) = gray.dimensions();
    let mut sums = vec![0u64; w as usize];
    for y in 0..h {
        for x in 0..w {
            sums[x as usize] += gray.get_pixel(x, y).0[0] as u64;
        }
    }
    sums
}

/// Indices of the two largest values, ties broken by first occurrence.
///
/// An all-zero input yields (0, 0) rather than failing; the caller's
/// rectangle simply degenerates.
pub fn top_two(values: &[u64]) -> (usize, usize) {
    let mut scratch = values.to_vec();
    let first = max_index(&scratch);
    scratch[first] = 0;
    let second = max_index(&scratch);
    (first, second)
}

// Strict comparison keeps the first occurrence on ties.
fn max_index(values: &[u64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Draw a one-pixel hollow rectangle between two corner points.
///
/// Corners may arrive in any vertical/horizontal order; coordinates are
/// normalized and clamped to the image, so a degenerate rectangle collapses
/// to a line or point instead of failing.
pub fn draw_rect(img: &mut RgbImage, a: (u32, u32), b: (u32, u32), color: Rgb<u8>) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let x0 = a.0.min(b.0).min(w - 1);
    let x1 = a.0.max(b.0).min(w - 1);
    let y0 = a.1.min(b.1).min(h - 1);
    let y1 = a.1.max(b.1).min(h - 1);

    for x in x0..=x1 {
        img.put_pixel(x, y0, color);
        img.put_pixel(x, y1, color);
    }
    for y in y0..=y1 {
        img.put_pixel(x0, y, color);
        img.put_pixel(x1, y, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_map_finds_step_edge() {
        // Left half black, right half white: a vertical edge down the middle.
        let gray = GrayImage::from_fn(8, 8, |x, _| if x < 4 { Luma([0]) } else { Luma([255]) });
        let edges = edge_map(&gray, 100);
        assert!(edges.pixels().any(|p| p.0[0] == 255));
        // The flat regions stay dark.
        assert_eq!(edges.get_pixel(1, 4).0[0], 0);
        assert_eq!(edges.get_pixel(6, 4).0[0], 0);
    }

    #[test]
    fn test_edge_map_tiny_image() {
        let gray = GrayImage::new(2, 2);
        let edges = edge_map(&gray, 100);
        assert_eq!(edges.dimensions(), (2, 2));
    }

    #[test]
    fn test_projections() {
        let mut gray = GrayImage::new(4, 3);
        gray.put_pixel(2, 1, Luma([10]));
        gray.put_pixel(2, 2, Luma([20]));
        assert_eq!(row_sums(&gray), vec![0, 10, 20]);
        assert_eq!(col_sums(&gray), vec![0, 0, 30, 0]);
    }

    #[test]
    fn test_top_two_ties_take_first_occurrence() {
        assert_eq!(top_two(&[5, 5, 5]), (0, 1));
        assert_eq!(top_two(&[1, 9, 9, 2]), (1, 2));
        assert_eq!(top_two(&[0, 0]), (0, 0));
    }

    #[test]
    fn test_draw_rect_inverted_corners() {
        let mut img = RgbImage::new(10, 10);
        // Corner rule from the door localizer produces y0 > y1.
        draw_rect(&mut img, (2, 8), (7, 3), Rgb([255, 0, 0]));
        assert_eq!(*img.get_pixel(2, 3), Rgb([255, 0, 0]));
        assert_eq!(*img.get_pixel(7, 8), Rgb([255, 0, 0]));
        assert_eq!(*img.get_pixel(4, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_rect_degenerate() {
        let mut img = RgbImage::new(4, 4);
        draw_rect(&mut img, (1, 1), (1, 1), Rgb([255, 0, 0]));
        assert_eq!(*img.get_pixel(1, 1), Rgb([255, 0, 0]));
    }
}
