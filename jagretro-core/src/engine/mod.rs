//! Emulation engine capability interface.
//!
//! The engine (68000, TOM, JERRY, DAC) is an external collaborator. The bridge only
//! needs the narrow surface below: bring-up, memory access for the two fixed boot
//! writes, program loading, one opaque per-frame step, the current video mode and a
//! block of audio samples.
//!
//! Firmware blobs belong to the engine; the bridge only decides which one gets
//! copied into the boot ROM window.

use crate::av::VideoFrameBuffer;
use crate::config::EngineSettings;
use crate::error::CoreError;
use crate::input::InputState;
use std::path::Path;

/// Start of the boot ROM window in the engine's memory space.
pub const FIRMWARE_BASE: usize = 0x00e0_0000;
/// Size of a firmware image.
pub const FIRMWARE_SIZE: usize = 0x0002_0000;
/// Initial 68000 stack pointer, stored big-endian at main-RAM offset 0.
pub const STARTUP_STACK_POINTER: u32 = 0x0020_0000;

/// Which console firmware image to boot.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum BiosType {
    #[default]
    KSeries,
    MSeries,
}

pub trait Engine {
    /// Bring up the hardware with the resolved settings.
    fn init(&mut self, settings: &EngineSettings) -> anyhow::Result<()>;

    /// Pick up settings re-sampled while running.
    fn apply_settings(&mut self, settings: &EngineSettings);

    /// Firmware image for `bios`, exactly [`FIRMWARE_SIZE`] bytes.
    fn boot_rom(&self, bios: BiosType) -> &'static [u8];

    /// The full emulated memory space; main RAM starts at offset 0.
    fn memory_mut(&mut self) -> &mut [u8];

    fn load_program(&mut self, path: &Path) -> anyhow::Result<()>;

    /// Put every chip back to its entry state.
    fn reset(&mut self);

    /// Run one visible frame worth of cycles, rendering into `video`.
    fn execute_frame(&mut self, input: &InputState, video: &mut VideoFrameBuffer);

    /// `(width, height)` of the video mode TOM is currently programmed for.
    fn video_mode(&self) -> (u32, u32);

    /// Told whenever the announced output size changes.
    fn set_output_size(&mut self, _width: u32, _height: u32) {}

    /// Fill `out` with interleaved stereo samples for the frame just executed.
    fn render_audio(&mut self, out: &mut [i16]);

    fn shutdown(&mut self);
}

/// Copy the firmware image for `bios` into the boot ROM window.
pub fn install_firmware<E: Engine + ?Sized>(engine: &mut E, bios: BiosType) -> Result<(), CoreError> {
    let image = engine.boot_rom(bios);
    if image.len() != FIRMWARE_SIZE {
        return Err(CoreError::FirmwareSize {
            expected: FIRMWARE_SIZE,
            actual: image.len(),
        });
    }

    let window = engine
        .memory_mut()
        .get_mut(FIRMWARE_BASE..FIRMWARE_BASE + FIRMWARE_SIZE)
        .ok_or(CoreError::MemoryLayout {
            what: "firmware",
            offset: FIRMWARE_BASE,
        })?;
    window.copy_from_slice(image);
    Ok(())
}

/// Write the startup stack pointer where the 68000 fetches it on reset.
pub fn prime_stack<E: Engine + ?Sized>(engine: &mut E) -> Result<(), CoreError> {
    let word = engine
        .memory_mut()
        .get_mut(0..4)
        .ok_or(CoreError::MemoryLayout {
            what: "stack pointer",
            offset: 0,
        })?;
    word.copy_from_slice(&STARTUP_STACK_POINTER.to_be_bytes());
    Ok(())
}
