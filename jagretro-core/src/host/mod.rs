//! Host capability interface.
//!
//! The bridge never talks to a frontend directly. Everything it needs from the
//! host (option values, input state, video/audio delivery, geometry changes) goes
//! through [`Host`], which is implemented by:
//! - `crate::libretro::LibretroHost` for the real libretro callbacks
//! - `crate::testing::RecordingHost` in tests
//!
//! Notes:
//! - All calls are synchronous and happen on the host's thread, inside one of the
//!   core entry points. Nothing here may block.
//! - Joypad buttons are identified by `libretro_backend::JoypadButton`; the numeric
//!   keypad is identified by digit.

use crate::av::Geometry;
use libretro_backend::JoypadButton;

/// Pixel encodings the core can ask the host for.
///
/// Only one is ever requested: packed 32-bit RGB with the top byte ignored.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PixelFormat {
    Xrgb8888,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Xrgb8888 => 4,
        }
    }
}

/// A single digital input the host can be asked about.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InputSource {
    /// Button on the controller in port 0.
    Joypad(JoypadButton),
    /// Key on the auxiliary numeric keypad, `0..=9`.
    Keypad(u8),
}

/// Everything the bridge consumes from (or delivers to) the host.
pub trait Host {
    /// Ask the host to accept `format` for every subsequent frame.
    ///
    /// Returns `false` if the host cannot display it.
    fn set_pixel_format(&mut self, format: PixelFormat) -> bool;

    /// Declare how expensive one frame is to emulate.
    fn set_performance_level(&mut self, level: u32);

    /// Whether any option value changed since the last call.
    fn options_updated(&mut self) -> bool;

    /// Current host-side value of the option `key`, if the host has one.
    fn get_option(&mut self, key: &str) -> Option<String>;

    /// Refresh host input device state.
    ///
    /// Returns `false` when the host has no input polling wired up; nothing may be
    /// read with [`Host::read_input`] this frame in that case.
    fn poll_input(&mut self) -> bool;

    /// Whether `source` is held down right now.
    fn read_input(&mut self, source: InputSource) -> bool;

    /// Announce new output dimensions. Must happen before a frame of that size is presented.
    fn request_geometry_change(&mut self, geometry: &Geometry) -> bool;

    /// Deliver one video frame.
    ///
    /// `pixels` holds `height` rows of `pitch_bytes` each; only the first `width`
    /// pixels of every row are visible.
    fn present_frame(&mut self, pixels: &[u32], width: u32, height: u32, pitch_bytes: usize);

    /// Deliver one frame of interleaved stereo samples.
    ///
    /// Returns the number of stereo frames the host consumed.
    fn submit_audio(&mut self, samples: &[i16]) -> usize;
}
