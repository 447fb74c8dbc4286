//! One host refresh worth of work.
//!
//! Order inside [`run_frame`] is the whole concurrency contract:
//! 1. re-sample options if the host says they changed
//! 2. snapshot input
//! 3. one opaque engine step
//! 4. geometry renegotiation
//! 5. audio harvest, exactly `samples_per_frame` samples
//! 6. present video, then submit audio
//!
//! Nothing here fails; an engine fault inside a step is the engine's problem.

use crate::av::geometry;
use crate::config;
use crate::engine::Engine;
use crate::host::Host;
use crate::input;
use crate::state::CoreContext;
use tracing::debug;

pub fn run_frame<E, H>(ctx: &mut CoreContext, engine: &mut E, host: &mut H)
where
    E: Engine + ?Sized,
    H: Host + ?Sized,
{
    if host.options_updated() {
        ctx.settings = config::sample(host);
        engine.apply_settings(&ctx.settings);
        debug!("applied updated core options");
    }

    input::poll(host, &mut ctx.input);

    engine.execute_frame(&ctx.input, &mut ctx.video);

    let geometry = geometry::negotiate(&mut ctx.geometry, engine, host);
    ctx.video.set_visible_size(geometry.width, geometry.height);

    let timing = ctx.settings.timing;
    engine.render_audio(ctx.audio.frame_mut(timing));

    host.present_frame(
        ctx.video.visible_rows(),
        ctx.video.width(),
        ctx.video.height(),
        ctx.video.pitch_bytes(),
    );
    host.submit_audio(ctx.audio.frame(timing));
}
