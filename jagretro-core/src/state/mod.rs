//! Core-side shared state.
//!
//! [`CoreContext`] owns everything the per-frame components read and write: the
//! framebuffer, the audio staging buffer, the resolved settings, the input snapshot
//! and the geometry bookkeeping. It is created once by `JaguarCore::initialize` and
//! lent to the frame pump by `&mut`; there is no process-scope mutable state outside
//! the libretro glue.

use crate::av::{AudioSampleQueue, GeometryState, VideoFrameBuffer};
use crate::config::EngineSettings;
use crate::error::CoreError;
use crate::input::InputState;

/// Where the core is in its lifecycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    /// Initialization hit a fatal error; every load is refused.
    Failed,
    Loaded,
    Running,
    /// Terminal.
    Unloaded,
}

impl LifecycleState {
    /// A game is loaded and frames may be pumped.
    pub fn has_game(self) -> bool {
        matches!(self, LifecycleState::Loaded | LifecycleState::Running)
    }
}

#[derive(Debug)]
pub struct CoreContext {
    pub video: VideoFrameBuffer,
    pub audio: AudioSampleQueue,
    pub settings: EngineSettings,
    pub input: InputState,
    pub geometry: GeometryState,
}

impl CoreContext {
    /// Allocate buffers at maximum size with default settings and startup geometry.
    pub fn allocate() -> Result<Self, CoreError> {
        Ok(Self {
            video: VideoFrameBuffer::allocate()?,
            audio: AudioSampleQueue::allocate()?,
            settings: EngineSettings::default(),
            input: InputState::default(),
            geometry: GeometryState::default(),
        })
    }
}
