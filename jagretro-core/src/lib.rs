//! jagretro-core: a libretro bridge for an Atari Jaguar emulation engine.
//!
//! The host calls in once per output refresh. The bridge drives the engine forward by
//! exactly one frame, harvests the frame's video and audio, and hands both back to the
//! host synchronously. Everything is single-threaded and runs inside the host's call.
//!
//! Layout:
//! - `host`: the [`Host`] capability trait (options, input, A/V delivery, geometry)
//! - `engine`: the [`Engine`] capability trait and the fixed boot-time memory writes
//! - `config`: host option table and [`EngineSettings`] resolution
//! - `input`: host input to Jaguar button slots
//! - `av`: framebuffer, audio staging and geometry renegotiation
//! - `pump`: the per-frame sequence
//! - `libretro`: the C ABI, exported by [`libretro_jaguar_core!`]
//!
//! [`JaguarCore`] is the lifecycle manager and owns all state.

pub mod av;
pub mod config;
pub mod engine;
mod error;
pub mod host;
pub mod input;
pub mod libretro;
pub mod pump;
pub mod state;

#[cfg(test)]
mod testing;

pub use crate::av::{AvInfo, Geometry};
pub use crate::config::{EngineSettings, TimingMode};
pub use crate::engine::{BiosType, Engine};
pub use crate::error::CoreError;
pub use crate::host::{Host, InputSource, PixelFormat};
pub use crate::state::LifecycleState;

use crate::av::{BOOT_FILL, START_HEIGHT, START_WIDTH};
use crate::state::CoreContext;
use std::ffi::CStr;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Performance hint handed to the host at initialization.
pub const PERFORMANCE_LEVEL: u32 = 18;

/// Static identification reported to the host.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SystemInfo {
    pub library_name: &'static CStr,
    pub library_version: &'static CStr,
    /// `|`-separated, without dots.
    pub valid_extensions: &'static CStr,
    /// A path string is enough; the host need not hand over a full filesystem path.
    pub need_fullpath: bool,
}

pub const SYSTEM_INFO: SystemInfo = SystemInfo {
    library_name: c"Virtual Jaguar",
    library_version: c"v2.1.0+",
    valid_extensions: c"j64|jag|bin|rom",
    need_fullpath: false,
};

/// The bridge instance: engine, buffers, settings and lifecycle state.
pub struct JaguarCore<E> {
    engine: E,
    context: Option<CoreContext>,
    state: LifecycleState,
    /// `Engine::init` succeeded and `shutdown` has not run yet.
    engine_live: bool,
}

impl<E: Engine> JaguarCore<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            context: None,
            state: LifecycleState::Uninitialized,
            engine_live: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn context(&self) -> Option<&CoreContext> {
        self.context.as_ref()
    }

    /// Geometry currently announced to the host.
    pub fn geometry(&self) -> Geometry {
        self.context
            .as_ref()
            .map(|ctx| ctx.geometry.announced())
            .unwrap_or_else(|| Geometry::new(START_WIDTH, START_HEIGHT))
    }

    pub fn system_info() -> SystemInfo {
        SYSTEM_INFO
    }

    pub fn av_info(&self) -> AvInfo {
        AvInfo::new(self.geometry())
    }

    /// Timing mode resolved at load, or later from updated options.
    pub fn timing(&self) -> TimingMode {
        self.context
            .as_ref()
            .map(|ctx| ctx.settings.timing)
            .unwrap_or_default()
    }

    /// Allocate buffers and declare the performance level.
    ///
    /// An allocation failure is fatal: the core moves to [`LifecycleState::Failed`] and
    /// refuses every later load.
    pub fn initialize<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<(), CoreError> {
        if self.state != LifecycleState::Uninitialized {
            return Err(CoreError::InvalidState {
                op: "initialize",
                state: self.state,
            });
        }

        match CoreContext::allocate() {
            Ok(context) => self.context = Some(context),
            Err(err) => {
                error!(%err, "core initialization failed");
                self.state = LifecycleState::Failed;
                return Err(err);
            }
        }

        host.set_performance_level(PERFORMANCE_LEVEL);
        self.state = LifecycleState::Initialized;
        info!("core initialized");
        Ok(())
    }

    /// Bring up the engine and load the program at `path`.
    ///
    /// A failure after the engine came up is not rolled back; [`Self::teardown`]
    /// remains safe to call. Retrying the load then calls `Engine::init` a second
    /// time without an intervening `Engine::shutdown`.
    pub fn load_game<H: Host + ?Sized>(&mut self, host: &mut H, path: &Path) -> Result<(), CoreError> {
        if !host.set_pixel_format(PixelFormat::Xrgb8888) {
            warn!("pixel format XRGB8888 not supported by host, cannot load");
            return Err(CoreError::PixelFormatRejected);
        }

        match self.state {
            LifecycleState::Initialized => {}
            LifecycleState::Failed => return Err(CoreError::InitFailed),
            state => {
                return Err(CoreError::InvalidState {
                    op: "load a game",
                    state,
                });
            }
        }
        let Some(ctx) = self.context.as_mut() else {
            return Err(CoreError::InitFailed);
        };

        ctx.settings = config::sample(host);
        if ctx.settings.diagnostic_log {
            info!("engine diagnostic logging requested");
        }

        self.engine.init(&ctx.settings).map_err(CoreError::EngineInit)?;
        self.engine_live = true;

        engine::install_firmware(&mut self.engine, ctx.settings.bios_type)?;
        ctx.video.fill(BOOT_FILL);
        engine::prime_stack(&mut self.engine)?;

        self.engine
            .load_program(path)
            .map_err(|reason| CoreError::ProgramLoad {
                path: path.to_path_buf(),
                reason,
            })?;
        self.engine.reset();

        self.state = LifecycleState::Loaded;
        info!(path = %path.display(), timing = ?ctx.settings.timing, "game loaded");
        Ok(())
    }

    /// Run one frame. Does nothing until a game is loaded.
    pub fn run_frame<H: Host + ?Sized>(&mut self, host: &mut H) {
        match self.state {
            LifecycleState::Running => {}
            LifecycleState::Loaded => self.state = LifecycleState::Running,
            state => {
                debug!(?state, "no game loaded, skipping frame");
                return;
            }
        }
        if let Some(ctx) = self.context.as_mut() {
            pump::run_frame(ctx, &mut self.engine, host);
        }
    }

    /// Put the engine back to its entry state. Buffers are left alone.
    pub fn reset(&mut self) {
        if self.state.has_game() {
            self.engine.reset();
            info!("engine reset");
        }
    }

    pub fn unload_game(&mut self) {
        if self.state.has_game() {
            self.state = LifecycleState::Unloaded;
            info!("game unloaded");
        }
    }

    /// Shut the engine down and release the buffers. Safe to call repeatedly and
    /// whether or not a game was ever loaded.
    pub fn teardown(&mut self) {
        if std::mem::take(&mut self.engine_live) {
            self.engine.shutdown();
        }
        if self.context.take().is_some() {
            info!("core torn down");
        }
        self.state = LifecycleState::Unloaded;
    }

    /// Save states are unsupported: always zero bytes.
    pub fn serialize_size(&self) -> usize {
        0
    }

    pub fn serialize(&self, _out: &mut [u8]) -> Result<(), CoreError> {
        Err(CoreError::SaveStatesUnsupported)
    }

    pub fn unserialize(&mut self, _data: &[u8]) -> Result<(), CoreError> {
        Err(CoreError::SaveStatesUnsupported)
    }
}
