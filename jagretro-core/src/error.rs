use crate::state::LifecycleState;
use std::collections::TryReserveError;
use std::path::PathBuf;

/// Errors surfaced by the lifecycle operations of [`crate::JaguarCore`].
///
/// The libretro glue reports all of these to the host as a plain `false`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("host refused the XRGB8888 pixel format")]
    PixelFormatRejected,

    #[error("core initialization failed earlier; refusing to load")]
    InitFailed,

    #[error("cannot {op} while the core is {state:?}")]
    InvalidState {
        op: &'static str,
        state: LifecycleState,
    },

    #[error("failed to allocate the {what}")]
    Allocation {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    #[error("no content path supplied by the host")]
    MissingPath,

    #[error("engine bring-up failed: {0:#}")]
    EngineInit(anyhow::Error),

    #[error("failed to load program {}: {reason:#}", .path.display())]
    ProgramLoad { path: PathBuf, reason: anyhow::Error },

    #[error("firmware image is {actual:#x} bytes, expected {expected:#x}")]
    FirmwareSize { expected: usize, actual: usize },

    #[error("engine memory has no room for the {what} at {offset:#x}")]
    MemoryLayout { what: &'static str, offset: usize },

    #[error("save states are not supported")]
    SaveStatesUnsupported,
}
