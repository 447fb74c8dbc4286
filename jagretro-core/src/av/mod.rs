//! Video and audio buffers shared between the engine and the host.
//!
//! - Video: one `u32` XRGB8888 buffer sized for the largest mode the engine can
//!   produce. The stride never changes; only the visible sub-rectangle does.
//! - Audio: one fixed `i16` staging buffer. Each frame exactly
//!   [`samples_per_frame`] interleaved stereo samples are rendered into it and
//!   handed to the host.
//!
//! Both are allocated once at initialization and never resized.

pub mod geometry;

use crate::config::TimingMode;
use crate::error::CoreError;
use crate::host::PixelFormat;

pub use geometry::{Geometry, GeometryState};

/// Widest mode the engine can produce; also the framebuffer stride in pixels.
pub const MAX_WIDTH: u32 = 1400;
pub const MAX_HEIGHT: u32 = 576;

/// Geometry announced before the engine has reported a mode.
pub const START_WIDTH: u32 = 320;
pub const START_HEIGHT: u32 = 240;

pub const SAMPLE_RATE: u32 = 48_000;
/// Nominal frame rate reported to the host.
pub const NOMINAL_FPS: f64 = 60.0;

/// Stereo channel count of the engine's DAC output.
pub const CHANNELS: u32 = 2;

/// Staging capacity, in `i16` samples.
pub const AUDIO_CAPACITY: usize = 2048;

/// Fill written over the whole framebuffer at load so unrendered areas stand out.
pub const BOOT_FILL: u32 = 0xff00_ffff;

/// Interleaved `i16` samples produced per frame in `mode`.
pub const fn samples_per_frame(mode: TimingMode) -> usize {
    (SAMPLE_RATE / mode.refresh_hz() * CHANNELS) as usize
}

const _: () = assert!(samples_per_frame(TimingMode::Pal) <= AUDIO_CAPACITY);
const _: () = assert!(samples_per_frame(TimingMode::Ntsc) <= AUDIO_CAPACITY);

/// Host-owned framebuffer.
#[derive(Debug)]
pub struct VideoFrameBuffer {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
}

impl VideoFrameBuffer {
    /// Allocate a zeroed `MAX_WIDTH x MAX_HEIGHT` buffer.
    pub fn allocate() -> Result<Self, CoreError> {
        let len = (MAX_WIDTH * MAX_HEIGHT) as usize;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|source| CoreError::Allocation {
                what: "video frame buffer",
                source,
            })?;
        pixels.resize(len, 0);

        Ok(Self {
            pixels,
            width: START_WIDTH,
            height: START_HEIGHT,
        })
    }

    pub const fn stride(&self) -> usize {
        MAX_WIDTH as usize
    }

    pub const fn pitch_bytes(&self) -> usize {
        self.stride() * PixelFormat::Xrgb8888.bytes_per_pixel()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Set the visible rectangle, clamped to the allocation.
    pub fn set_visible_size(&mut self, width: u32, height: u32) {
        self.width = width.min(MAX_WIDTH);
        self.height = height.min(MAX_HEIGHT);
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// The whole allocation, `MAX_HEIGHT` rows of [`Self::stride`] pixels.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Rows covering the visible rectangle, at full stride.
    pub fn visible_rows(&self) -> &[u32] {
        &self.pixels[..self.height as usize * self.stride()]
    }
}

/// Fixed-capacity audio staging buffer.
#[derive(Debug)]
pub struct AudioSampleQueue {
    samples: Vec<i16>,
}

impl AudioSampleQueue {
    pub fn allocate() -> Result<Self, CoreError> {
        let mut samples = Vec::new();
        samples
            .try_reserve_exact(AUDIO_CAPACITY)
            .map_err(|source| CoreError::Allocation {
                what: "audio sample queue",
                source,
            })?;
        samples.resize(AUDIO_CAPACITY, 0);
        Ok(Self { samples })
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Staging slice for one frame in `mode`.
    pub fn frame_mut(&mut self, mode: TimingMode) -> &mut [i16] {
        &mut self.samples[..samples_per_frame(mode)]
    }

    pub fn frame(&self, mode: TimingMode) -> &[i16] {
        &self.samples[..samples_per_frame(mode)]
    }
}

/// Static timing and geometry reported to the host.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AvInfo {
    pub geometry: Geometry,
    pub max_width: u32,
    pub max_height: u32,
    pub fps: f64,
    pub sample_rate: f64,
}

impl AvInfo {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            max_width: MAX_WIDTH,
            max_height: MAX_HEIGHT,
            fps: NOMINAL_FPS,
            sample_rate: SAMPLE_RATE as f64,
        }
    }
}
