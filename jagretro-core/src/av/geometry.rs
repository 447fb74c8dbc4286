//! Output geometry renegotiation.
//!
//! TOM can be reprogrammed to a different video mode at any point. After every engine
//! step [`negotiate`] compares the mode width against the last one seen and, on a
//! change, announces the new geometry to the host before anything of that size is
//! presented. The returned geometry is the one the current frame is delivered with.

use super::{MAX_HEIGHT, MAX_WIDTH, START_HEIGHT, START_WIDTH};
use crate::engine::Engine;
use crate::host::Host;
use tracing::{info, warn};

/// Visible output size plus its display aspect ratio.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f32,
}

impl Geometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            aspect_ratio: width as f32 / height as f32,
        }
    }
}

/// What the engine last reported versus what the host was last told.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeometryState {
    last_width: u32,
    announced: Geometry,
}

impl Default for GeometryState {
    fn default() -> Self {
        Self {
            last_width: START_WIDTH,
            announced: Geometry::new(START_WIDTH, START_HEIGHT),
        }
    }
}

impl GeometryState {
    pub fn announced(&self) -> Geometry {
        self.announced
    }

    pub fn last_width(&self) -> u32 {
        self.last_width
    }
}

/// Detect a video mode change and announce it to the host.
pub fn negotiate<E, H>(state: &mut GeometryState, engine: &mut E, host: &mut H) -> Geometry
where
    E: Engine + ?Sized,
    H: Host + ?Sized,
{
    let (width, height) = engine.video_mode();
    if width == state.last_width {
        return state.announced;
    }
    state.last_width = width;

    if width == 0 || height == 0 {
        warn!(width, height, "ignoring degenerate video mode");
        return state.announced;
    }

    let previous = state.announced;
    let next = Geometry::new(width.min(MAX_WIDTH), height.min(MAX_HEIGHT));
    state.announced = next;
    engine.set_output_size(next.width, next.height);

    if !host.request_geometry_change(&next) {
        warn!("host did not acknowledge geometry change");
    }
    info!(
        old_width = previous.width,
        old_height = previous.height,
        width = next.width,
        height = next.height,
        aspect = next.aspect_ratio,
        "video mode changed"
    );
    next
}
