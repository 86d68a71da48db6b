//! Door localizer stage
//!
//! A bar-scan heuristic, not a trained detector. It expects an edge-detected
//! single-channel frame: strong vertical edges (door jambs) concentrate
//! intensity in two columns, strong horizontal edges (lintel, threshold) in
//! two rows. The two strongest rows and columns bound the candidate door,
//! which is drawn onto a color copy of the frame.
//!
//! On a uniform frame the projections tie everywhere and the rectangle
//! degenerates; that is accepted rather than treated as an error.

use super::{Frame, PipelineStage};
use crate::filters;
use image::Rgb;

const HIGHLIGHT: Rgb<u8> = Rgb([255, 0, 0]);

pub struct DoorDetectStage {
    next: Option<Box<dyn PipelineStage>>,
}

impl DoorDetectStage {
    pub fn new(next: Option<Box<dyn PipelineStage>>) -> Self {
        Self { next }
    }
}

impl PipelineStage for DoorDetectStage {
    fn label(&self) -> &'static str {
        "door-detect"
    }

    fn transform(&self, frame: Frame) -> Frame {
        let gray = frame.to_luma8();
        if gray.width() == 0 || gray.height() == 0 {
            return frame;
        }

        let rows = filters::row_sums(&gray);
        let cols = filters::col_sums(&gray);
        let (row_a, row_b) = filters::top_two(&rows);
        let (col_a, col_b) = filters::top_two(&cols);

        // Corner convention carried over from the reference detector: the
        // "top-left" corner takes the larger row index.
        let top_left = (col_a.min(col_b) as u32, row_a.max(row_b) as u32);
        let bottom_right = (col_a.max(col_b) as u32, row_a.min(row_b) as u32);

        log::debug!(
            "Door candidate between {:?} and {:?}",
            top_left,
            bottom_right
        );

        let mut color = filters::gray_to_rgb(&gray);
        filters::draw_rect(&mut color, top_left, bottom_right, HIGHLIGHT);
        Frame::ImageRgb8(color)
    }

    fn next(&self) -> Option<&dyn PipelineStage> {
        self.next.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_uniform_frame_does_not_panic() {
        let stage = DoorDetectStage::new(None);
        let out = stage.transform(Frame::ImageLuma8(GrayImage::new(20, 20)));
        // Still produces a color overlay, possibly degenerate.
        assert!(out.as_rgb8().is_some());
        assert_eq!((out.width(), out.height()), (20, 20));
    }

    #[test]
    fn test_door_outline_is_found() {
        // Bright rows 3 and 12, bright columns 5 and 14: a door-like box.
        let mut gray = GrayImage::new(20, 20);
        for i in 0..20 {
            gray.put_pixel(i, 3, Luma([200]));
            gray.put_pixel(i, 12, Luma([200]));
            gray.put_pixel(5, i, Luma([200]));
            gray.put_pixel(14, i, Luma([200]));
        }
        let stage = DoorDetectStage::new(None);
        let out = stage.transform(Frame::ImageLuma8(gray));
        let rgb = out.as_rgb8().unwrap();

        // Rectangle corners land on the selected rows/columns.
        assert_eq!(*rgb.get_pixel(5, 3), HIGHLIGHT);
        assert_eq!(*rgb.get_pixel(14, 12), HIGHLIGHT);
        // Interior untouched.
        assert_ne!(*rgb.get_pixel(10, 8), HIGHLIGHT);
    }
}
