//! Render output - color lookup and disc drawing
//!
//! The simulation never touches pixels itself. It asks a [`ColorSampler`]
//! for the video color under each traveler and hands a tinted disc to a
//! [`Canvas`].

use heartflow_core::{CanvasPoint, DisplayConfig, HeartflowError, HeartflowResult};
use tracing::warn;

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    /// Same color with alpha in [0, 255], rounded
    pub fn with_alpha(self, alpha: f32) -> Self {
        Rgba {
            a: alpha.round().clamp(0.0, 255.0) as u8,
            ..self
        }
    }
}

/// Color lookup at a canvas coordinate
pub trait ColorSampler {
    fn color_at(&self, x: f32, y: f32) -> Rgba;
}

/// Every point has the same color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidColor(pub Rgba);

impl ColorSampler for SolidColor {
    fn color_at(&self, _x: f32, _y: f32) -> Rgba {
        self.0
    }
}

/// One captured video frame, tightly packed RGBA
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl VideoFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> HeartflowResult<Self> {
        if width == 0 || height == 0 {
            return Err(HeartflowError::InvalidDisplaySize {
                width: width as f32,
                height: height as f32,
            });
        }
        let expected = 4 * width as usize * height as usize;
        if pixels.len() != expected {
            return Err(HeartflowError::VideoBufferMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(VideoFrame {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at capture coordinates, clamped to the frame
    pub fn pixel(&self, px: u32, py: u32) -> Rgba {
        let px = px.min(self.width - 1) as usize;
        let py = py.min(self.height - 1) as usize;
        let at = (py * self.width as usize + px) * 4;
        Rgba::new(
            self.pixels[at],
            self.pixels[at + 1],
            self.pixels[at + 2],
            self.pixels[at + 3],
        )
    }
}

/// Samples the latest video frame the way it is displayed: stretched over
/// the canvas and mirrored horizontally.
#[derive(Debug, Clone)]
pub struct VideoSampler {
    display: DisplayConfig,
    frame: Option<VideoFrame>,
}

impl VideoSampler {
    pub fn new(display: DisplayConfig) -> Self {
        VideoSampler {
            display,
            frame: None,
        }
    }

    pub fn load(&mut self, frame: VideoFrame) {
        self.frame = Some(frame);
    }

    /// Validate and load a raw buffer; a bad buffer keeps the previous frame
    pub fn load_raw(&mut self, width: u32, height: u32, pixels: Vec<u8>) -> HeartflowResult<()> {
        match VideoFrame::new(width, height, pixels) {
            Ok(frame) => {
                self.frame = Some(frame);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "rejected video frame");
                Err(err)
            }
        }
    }

    pub fn frame(&self) -> Option<&VideoFrame> {
        self.frame.as_ref()
    }
}

impl ColorSampler for VideoSampler {
    fn color_at(&self, x: f32, y: f32) -> Rgba {
        let Some(frame) = &self.frame else {
            return Rgba::WHITE;
        };

        let u = ((self.display.width - x) / self.display.width).clamp(0.0, 1.0);
        let v = (y / self.display.height).clamp(0.0, 1.0);
        // NaN casts to 0
        let px = (u * frame.width as f32) as u32;
        let py = (v * frame.height as f32) as u32;
        frame.pixel(px, py)
    }
}

/// Drawing surface for travelers
pub trait Canvas {
    fn fill_disc(&mut self, center: CanvasPoint, radius: f32, color: Rgba);
}

/// A filled, tinted disc
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disc {
    pub center: CanvasPoint,
    pub radius: f32,
    pub color: Rgba,
}

/// Canvas that records what was drawn
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    discs: Vec<Disc>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn discs(&self) -> &[Disc] {
        &self.discs
    }

    pub fn len(&self) -> usize {
        self.discs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.discs.is_empty()
    }

    pub fn clear(&mut self) {
        self.discs.clear();
    }
}

impl Canvas for DrawList {
    fn fill_disc(&mut self, center: CanvasPoint, radius: f32, color: Rgba) {
        self.discs.push(Disc {
            center,
            radius,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display() -> DisplayConfig {
        DisplayConfig {
            width: 400.0,
            height: 200.0,
        }
    }

    /// 2x1 frame: red on the left, blue on the right
    fn two_pixels() -> VideoFrame {
        VideoFrame::new(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap()
    }

    #[test]
    fn test_frame_length_is_checked() {
        let err = VideoFrame::new(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            HeartflowError::VideoBufferMismatch {
                expected: 16,
                actual: 15
            }
        );
        assert!(VideoFrame::new(0, 2, Vec::new()).is_err());
    }

    #[test]
    fn test_empty_sampler_is_white() {
        let sampler = VideoSampler::new(display());
        assert_eq!(sampler.color_at(10.0, 10.0), Rgba::WHITE);
    }

    #[test]
    fn test_sampling_is_mirrored() {
        let mut sampler = VideoSampler::new(display());
        sampler.load(two_pixels());

        // Left side of the canvas shows the right side of the capture
        assert_eq!(sampler.color_at(50.0, 100.0), Rgba::new(0, 0, 255, 255));
        assert_eq!(sampler.color_at(350.0, 100.0), Rgba::new(255, 0, 0, 255));
    }

    #[test]
    fn test_sampling_clamps_off_canvas() {
        let mut sampler = VideoSampler::new(display());
        sampler.load(two_pixels());

        assert_eq!(sampler.color_at(-100.0, -5.0), Rgba::new(0, 0, 255, 255));
        assert_eq!(sampler.color_at(900.0, 900.0), Rgba::new(255, 0, 0, 255));
        assert_eq!(sampler.color_at(f32::NAN, 0.0), Rgba::new(255, 0, 0, 255));
    }

    #[test]
    fn test_bad_buffer_keeps_previous_frame() {
        let mut sampler = VideoSampler::new(display());
        sampler.load(two_pixels());

        assert!(sampler.load_raw(4, 4, vec![0; 3]).is_err());
        assert_eq!(sampler.frame().map(|f| f.width()), Some(2));
    }

    #[test]
    fn test_with_alpha_rounds_and_clamps() {
        assert_eq!(Rgba::WHITE.with_alpha(89.6).a, 90);
        assert_eq!(Rgba::WHITE.with_alpha(-3.0).a, 0);
        assert_eq!(Rgba::WHITE.with_alpha(400.0).a, 255);
    }

    #[test]
    fn test_draw_list_records() {
        let mut list = DrawList::new();
        list.fill_disc(CanvasPoint::new(1.0, 2.0), 3.0, Rgba::BLACK);

        assert_eq!(list.len(), 1);
        assert_eq!(list.discs()[0].radius, 3.0);
        list.clear();
        assert!(list.is_empty());
    }
}
