//! Frame resizing stage
//!
//! Scaling in the pipeline removes the need to configure resolution on the
//! camera device itself; whatever the device yields is brought to the target
//! size here.

use super::{Frame, PipelineStage};
use image::imageops::FilterType;

pub struct ResizeStage {
    width: u32,
    height: u32,
    next: Option<Box<dyn PipelineStage>>,
}

impl ResizeStage {
    pub fn new(width: u32, height: u32, next: Option<Box<dyn PipelineStage>>) -> Self {
        Self {
            width,
            height,
            next,
        }
    }

    fn dimensions_divide(source: u32, target: u32) -> bool {
        source > 0 && target > 0 && (source % target == 0 || target % source == 0)
    }
}

impl PipelineStage for ResizeStage {
    fn label(&self) -> &'static str {
        "resize"
    }

    fn transform(&self, frame: Frame) -> Frame {
        if frame.width() == self.width && frame.height() == self.height {
            return frame;
        }

        // The scale fits the source into the target exactly, so dimensions
        // that are not integer multiples of one another will distort. This
        // is advisory only; the resize still proceeds.
        if !Self::dimensions_divide(frame.width(), self.width)
            || !Self::dimensions_divide(frame.height(), self.height)
        {
            log::warn!(
                "Resize target does not fit cleanly into the source, distortion may occur \
                 (source {}x{}, target {}x{})",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            );
        }

        frame.resize_exact(self.width, self.height, FilterType::Triangle)
    }

    fn next(&self) -> Option<&dyn PipelineStage> {
        self.next.as_deref()
    }
}
