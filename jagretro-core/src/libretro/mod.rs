//! libretro C ABI glue.
//!
//! Responsibilities:
//! - Hold the host callbacks libretro hands us (`retro_set_*`).
//! - Implement [`Host`] on top of those callbacks ([`LibretroHost`]).
//! - Hold the single per-process [`JaguarCore`] instance ([`CoreSlot`]) and forward
//!   every `retro_*` entry point to it.
//!
//! The `retro_*` symbols themselves are generated by [`libretro_jaguar_core!`] in the
//! crate that supplies the concrete engine, the same way `libretro_backend::libretro_core!`
//! is used:
//!
//! ```ignore
//! jagretro_core::libretro_jaguar_core!(my_engine::Jaguar);
//! ```
//!
//! Notes:
//! - libretro is single-threaded; the mutexes are never contended and only exist so
//!   the statics are `Sync`.
//! - A poisoned lock is recovered rather than propagated; a panic has already unwound
//!   into the host by then.

pub use libretro_sys as sys;

use crate::av::{AvInfo, Geometry, MAX_HEIGHT, MAX_WIDTH, START_HEIGHT, START_WIDTH};
use crate::config::OPTIONS;
use crate::engine::Engine;
use crate::host::{Host, InputSource, PixelFormat};
use crate::{JaguarCore, SYSTEM_INFO};
use libretro_backend::JoypadButton;
use std::ffi::{CStr, CString, c_uint, c_void};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{error, warn};

/// `RETROK_KP0`; keypad digits follow contiguously.
const KEYPAD_0: c_uint = 256;

// --- Host callbacks ---

#[derive(Copy, Clone)]
struct Callbacks {
    environment: Option<sys::EnvironmentFn>,
    video_refresh: Option<sys::VideoRefreshFn>,
    audio_sample_batch: Option<sys::AudioSampleBatchFn>,
    input_poll: Option<sys::InputPollFn>,
    input_state: Option<sys::InputStateFn>,
}

impl Callbacks {
    const EMPTY: Self = Self {
        environment: None,
        video_refresh: None,
        audio_sample_batch: None,
        input_poll: None,
        input_state: None,
    };
}

static CALLBACKS: Mutex<Callbacks> = Mutex::new(Callbacks::EMPTY);

fn callbacks() -> MutexGuard<'static, Callbacks> {
    CALLBACKS.lock().unwrap_or_else(PoisonError::into_inner)
}

lazy_static::lazy_static! {
    /// `(key, "<label>; a|b")` pairs handed to `RETRO_ENVIRONMENT_SET_VARIABLES`.
    static ref OPTION_DECLARATIONS: Vec<(CString, CString)> = OPTIONS
        .iter()
        .filter_map(|option| {
            Some((
                CString::new(option.key).ok()?,
                CString::new(option.declaration()).ok()?,
            ))
        })
        .collect();
}

pub fn set_environment(cb: sys::EnvironmentFn) {
    callbacks().environment = Some(cb);

    let mut variables: Vec<sys::Variable> = OPTION_DECLARATIONS
        .iter()
        .map(|(key, value)| sys::Variable {
            key: key.as_ptr(),
            value: value.as_ptr(),
        })
        .collect();
    variables.push(sys::Variable {
        key: std::ptr::null(),
        value: std::ptr::null(),
    });

    let mut host = LibretroHost::current();
    if !host.environment(
        sys::ENVIRONMENT_SET_VARIABLES,
        variables.as_mut_ptr().cast(),
    ) {
        warn!("host did not accept core option declarations");
    }
}

pub fn set_video_refresh(cb: sys::VideoRefreshFn) {
    callbacks().video_refresh = Some(cb);
}

pub fn set_audio_sample_batch(cb: sys::AudioSampleBatchFn) {
    callbacks().audio_sample_batch = Some(cb);
}

pub fn set_input_poll(cb: sys::InputPollFn) {
    callbacks().input_poll = Some(cb);
}

pub fn set_input_state(cb: sys::InputStateFn) {
    callbacks().input_state = Some(cb);
}

// --- Host implementation ---

fn joypad_id(button: JoypadButton) -> c_uint {
    match button {
        JoypadButton::B => sys::DEVICE_ID_JOYPAD_B,
        JoypadButton::Y => sys::DEVICE_ID_JOYPAD_Y,
        JoypadButton::Select => sys::DEVICE_ID_JOYPAD_SELECT,
        JoypadButton::Start => sys::DEVICE_ID_JOYPAD_START,
        JoypadButton::Up => sys::DEVICE_ID_JOYPAD_UP,
        JoypadButton::Down => sys::DEVICE_ID_JOYPAD_DOWN,
        JoypadButton::Left => sys::DEVICE_ID_JOYPAD_LEFT,
        JoypadButton::Right => sys::DEVICE_ID_JOYPAD_RIGHT,
        JoypadButton::A => sys::DEVICE_ID_JOYPAD_A,
        JoypadButton::X => sys::DEVICE_ID_JOYPAD_X,
        JoypadButton::L1 => sys::DEVICE_ID_JOYPAD_L,
        JoypadButton::R1 => sys::DEVICE_ID_JOYPAD_R,
        JoypadButton::L2 => sys::DEVICE_ID_JOYPAD_L2,
        JoypadButton::R2 => sys::DEVICE_ID_JOYPAD_R2,
        JoypadButton::L3 => sys::DEVICE_ID_JOYPAD_L3,
        JoypadButton::R3 => sys::DEVICE_ID_JOYPAD_R3,
    }
}

/// [`Host`] backed by the registered libretro callbacks.
///
/// Holds a copy of the callbacks taken at the start of an entry point, so no lock is
/// held while calling into the frontend.
pub struct LibretroHost {
    callbacks: Callbacks,
}

impl LibretroHost {
    pub fn current() -> Self {
        Self {
            callbacks: *callbacks(),
        }
    }

    fn environment(&mut self, cmd: c_uint, data: *mut c_void) -> bool {
        match self.callbacks.environment {
            // SAFETY: the frontend registered this callback and `data` points at the
            // structure `cmd` expects, alive for the duration of the call.
            Some(cb) => unsafe { cb(cmd, data) },
            None => false,
        }
    }
}

impl Host for LibretroHost {
    fn set_pixel_format(&mut self, format: PixelFormat) -> bool {
        let mut format = match format {
            PixelFormat::Xrgb8888 => sys::PixelFormat::ARGB8888,
        };
        self.environment(
            sys::ENVIRONMENT_SET_PIXEL_FORMAT,
            (&mut format as *mut sys::PixelFormat).cast(),
        )
    }

    fn set_performance_level(&mut self, level: u32) {
        let mut level: c_uint = level;
        self.environment(
            sys::ENVIRONMENT_SET_PERFORMANCE_LEVEL,
            (&mut level as *mut c_uint).cast(),
        );
    }

    fn options_updated(&mut self) -> bool {
        let mut updated = false;
        self.environment(
            sys::ENVIRONMENT_GET_VARIABLE_UPDATE,
            (&mut updated as *mut bool).cast(),
        ) && updated
    }

    fn get_option(&mut self, key: &str) -> Option<String> {
        let key = CString::new(key).ok()?;
        let mut variable = sys::Variable {
            key: key.as_ptr(),
            value: std::ptr::null(),
        };
        let found = self.environment(
            sys::ENVIRONMENT_GET_VARIABLE,
            (&mut variable as *mut sys::Variable).cast(),
        );
        if !found || variable.value.is_null() {
            return None;
        }
        // SAFETY: non-null values returned by GET_VARIABLE are NUL-terminated strings
        // owned by the frontend and valid until the next environment call.
        let value = unsafe { CStr::from_ptr(variable.value) };
        value.to_str().ok().map(str::to_owned)
    }

    fn poll_input(&mut self) -> bool {
        match (self.callbacks.input_poll, self.callbacks.input_state) {
            (Some(poll), Some(_)) => {
                // SAFETY: registered by the frontend; takes no arguments.
                unsafe { poll() };
                true
            }
            _ => false,
        }
    }

    fn read_input(&mut self, source: InputSource) -> bool {
        let Some(state) = self.callbacks.input_state else {
            return false;
        };
        let (device, id) = match source {
            InputSource::Joypad(button) => (sys::DEVICE_JOYPAD, joypad_id(button)),
            InputSource::Keypad(digit) => (sys::DEVICE_KEYBOARD, KEYPAD_0 + c_uint::from(digit)),
        };
        // SAFETY: registered by the frontend; plain integer arguments.
        unsafe { state(0, device, 0, id) != 0 }
    }

    fn request_geometry_change(&mut self, geometry: &Geometry) -> bool {
        let mut geometry = game_geometry(geometry);
        self.environment(
            sys::ENVIRONMENT_SET_GEOMETRY,
            (&mut geometry as *mut sys::GameGeometry).cast(),
        )
    }

    fn present_frame(&mut self, pixels: &[u32], width: u32, height: u32, pitch_bytes: usize) {
        if let Some(cb) = self.callbacks.video_refresh {
            // SAFETY: `pixels` covers `height` rows of `pitch_bytes` and outlives the call.
            unsafe { cb(pixels.as_ptr().cast(), width, height, pitch_bytes) };
        }
    }

    fn submit_audio(&mut self, samples: &[i16]) -> usize {
        match self.callbacks.audio_sample_batch {
            // SAFETY: `samples` holds `len / 2` interleaved stereo frames.
            Some(cb) => unsafe { cb(samples.as_ptr(), samples.len() / 2) },
            None => 0,
        }
    }
}

fn game_geometry(geometry: &Geometry) -> sys::GameGeometry {
    sys::GameGeometry {
        base_width: geometry.width,
        base_height: geometry.height,
        max_width: MAX_WIDTH,
        max_height: MAX_HEIGHT,
        aspect_ratio: geometry.aspect_ratio,
    }
}

// --- Static entry points ---

/// Install a stderr `tracing` subscriber honouring `RUST_LOG`, unless the process
/// already has one.
pub fn install_log_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn api_version() -> c_uint {
    sys::API_VERSION
}

/// # Safety
/// `info` must be null or point to writable `retro_system_info` storage.
pub unsafe fn write_system_info(info: *mut sys::SystemInfo) {
    if info.is_null() {
        return;
    }
    let system = sys::SystemInfo {
        library_name: SYSTEM_INFO.library_name.as_ptr(),
        library_version: SYSTEM_INFO.library_version.as_ptr(),
        valid_extensions: SYSTEM_INFO.valid_extensions.as_ptr(),
        need_fullpath: SYSTEM_INFO.need_fullpath,
        block_extract: false,
    };
    // SAFETY: checked non-null; caller guarantees it is writable.
    unsafe { info.write(system) };
}

// --- Core instance ---

/// The single per-process core instance behind the `retro_*` exports.
pub struct CoreSlot<E> {
    core: Mutex<Option<JaguarCore<E>>>,
}

impl<E> CoreSlot<E> {
    pub const fn new() -> Self {
        Self {
            core: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<JaguarCore<E>>> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: Engine + Default> CoreSlot<E> {
    pub fn init(&self) {
        install_log_subscriber();

        let mut host = LibretroHost::current();
        let mut core = JaguarCore::new(E::default());
        if let Err(err) = core.initialize(&mut host) {
            error!(%err, "retro_init failed");
        }
        if self.install(core).is_some() {
            warn!("retro_init called again without retro_deinit");
        }
    }

    /// Make `core` the live instance. A core already in the slot is torn down and
    /// handed back.
    pub fn install(&self, core: JaguarCore<E>) -> Option<JaguarCore<E>> {
        let mut previous = self.lock().replace(core)?;
        previous.teardown();
        Some(previous)
    }

    pub fn deinit(&self) {
        if let Some(mut core) = self.lock().take() {
            core.teardown();
        }
    }

    /// # Safety
    /// `info` must be null or point to a valid `retro_game_info`.
    pub unsafe fn load_game(&self, info: *const sys::GameInfo) -> bool {
        // SAFETY: caller guarantees validity when non-null.
        let Some(info) = (unsafe { info.as_ref() }) else {
            return false;
        };
        let path = if info.path.is_null() {
            None
        } else {
            // SAFETY: libretro paths are NUL-terminated and live for this call.
            unsafe { CStr::from_ptr(info.path) }
                .to_str()
                .ok()
                .map(PathBuf::from)
        };

        let mut host = LibretroHost::current();
        let mut guard = self.lock();
        let Some(core) = guard.as_mut() else {
            error!("retro_load_game called before retro_init");
            return false;
        };
        let result = match path {
            Some(path) => core.load_game(&mut host, &path),
            None => Err(crate::CoreError::MissingPath),
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                error!(%err, "failed to load game");
                false
            }
        }
    }

    pub fn unload_game(&self) {
        if let Some(core) = self.lock().as_mut() {
            core.unload_game();
        }
    }

    pub fn run(&self) {
        let mut host = LibretroHost::current();
        if let Some(core) = self.lock().as_mut() {
            core.run_frame(&mut host);
        }
    }

    pub fn reset(&self) {
        if let Some(core) = self.lock().as_mut() {
            core.reset();
        }
    }

    /// # Safety
    /// `info` must be null or point to writable `retro_system_av_info` storage.
    pub unsafe fn write_av_info(&self, info: *mut sys::SystemAvInfo) {
        if info.is_null() {
            return;
        }
        let av = self
            .lock()
            .as_ref()
            .map(JaguarCore::av_info)
            .unwrap_or_else(|| AvInfo::new(Geometry::new(START_WIDTH, START_HEIGHT)));

        let system = sys::SystemAvInfo {
            geometry: game_geometry(&av.geometry),
            timing: sys::SystemTiming {
                fps: av.fps,
                sample_rate: av.sample_rate,
            },
        };
        // SAFETY: checked non-null; caller guarantees it is writable.
        unsafe { info.write(system) };
    }

    /// Always NTSC, in line with the fixed 60 fps timing reported by
    /// [`Self::write_av_info`]. The PAL option only changes the engine's timing.
    pub fn region(&self) -> c_uint {
        sys::Region::NTSC as c_uint
    }

    pub fn serialize_size(&self) -> usize {
        self.lock()
            .as_ref()
            .map(JaguarCore::serialize_size)
            .unwrap_or(0)
    }

    pub fn serialize(&self, data: &mut [u8]) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|core| core.serialize(data).is_ok())
    }

    pub fn unserialize(&self, data: &[u8]) -> bool {
        self.lock()
            .as_mut()
            .is_some_and(|core| core.unserialize(data).is_ok())
    }
}

impl<E> Default for CoreSlot<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Export the libretro `retro_*` symbols for a core built on engine type `$engine`.
///
/// `$engine` must implement [`Engine`], `Default` and `Send`.
#[macro_export]
macro_rules! libretro_jaguar_core {
    ($engine:ty) => {
        static JAGRETRO_CORE: $crate::libretro::CoreSlot<$engine> =
            $crate::libretro::CoreSlot::new();

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_api_version() -> ::std::ffi::c_uint {
            $crate::libretro::api_version()
        }

        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn retro_get_system_info(info: *mut $crate::libretro::sys::SystemInfo) {
            unsafe { $crate::libretro::write_system_info(info) }
        }

        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn retro_get_system_av_info(
            info: *mut $crate::libretro::sys::SystemAvInfo,
        ) {
            unsafe { JAGRETRO_CORE.write_av_info(info) }
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_set_environment(cb: $crate::libretro::sys::EnvironmentFn) {
            $crate::libretro::set_environment(cb)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_set_video_refresh(cb: $crate::libretro::sys::VideoRefreshFn) {
            $crate::libretro::set_video_refresh(cb)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_set_audio_sample(_cb: $crate::libretro::sys::AudioSampleFn) {}

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_set_audio_sample_batch(
            cb: $crate::libretro::sys::AudioSampleBatchFn,
        ) {
            $crate::libretro::set_audio_sample_batch(cb)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_set_input_poll(cb: $crate::libretro::sys::InputPollFn) {
            $crate::libretro::set_input_poll(cb)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_set_input_state(cb: $crate::libretro::sys::InputStateFn) {
            $crate::libretro::set_input_state(cb)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_set_controller_port_device(
            _port: ::std::ffi::c_uint,
            _device: ::std::ffi::c_uint,
        ) {
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_init() {
            JAGRETRO_CORE.init()
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_deinit() {
            JAGRETRO_CORE.deinit()
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_reset() {
            JAGRETRO_CORE.reset()
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_run() {
            JAGRETRO_CORE.run()
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_serialize_size() -> usize {
            JAGRETRO_CORE.serialize_size()
        }

        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn retro_serialize(data: *mut ::std::ffi::c_void, size: usize) -> bool {
            if data.is_null() {
                return false;
            }
            let data = unsafe { ::std::slice::from_raw_parts_mut(data.cast::<u8>(), size) };
            JAGRETRO_CORE.serialize(data)
        }

        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn retro_unserialize(
            data: *const ::std::ffi::c_void,
            size: usize,
        ) -> bool {
            if data.is_null() {
                return false;
            }
            let data = unsafe { ::std::slice::from_raw_parts(data.cast::<u8>(), size) };
            JAGRETRO_CORE.unserialize(data)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_cheat_reset() {}

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_cheat_set(
            _index: ::std::ffi::c_uint,
            _enabled: bool,
            _code: *const ::std::ffi::c_char,
        ) {
        }

        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn retro_load_game(
            info: *const $crate::libretro::sys::GameInfo,
        ) -> bool {
            unsafe { JAGRETRO_CORE.load_game(info) }
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_load_game_special(
            _game_type: ::std::ffi::c_uint,
            _info: *const $crate::libretro::sys::GameInfo,
            _num_info: usize,
        ) -> bool {
            false
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_unload_game() {
            JAGRETRO_CORE.unload_game()
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_get_region() -> ::std::ffi::c_uint {
            JAGRETRO_CORE.region()
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_get_memory_data(_id: ::std::ffi::c_uint) -> *mut ::std::ffi::c_void {
            ::std::ptr::null_mut()
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn retro_get_memory_size(_id: ::std::ffi::c_uint) -> usize {
            0
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeEngine;
    use std::ffi::c_char;

    crate::libretro_jaguar_core!(FakeEngine);

    #[derive(Default)]
    struct Recorded {
        environment: Vec<c_uint>,
        declared: Vec<(String, String)>,
        pixel_format: Option<c_uint>,
        geometry: Vec<(c_uint, c_uint, f32)>,
        video: Vec<(c_uint, c_uint, usize)>,
        audio: Vec<usize>,
        polls: usize,
    }

    static RECORDED: Mutex<Option<Recorded>> = Mutex::new(None);
    static PAL_OPTION: &CStr = c"enabled";

    fn record<R>(f: impl FnOnce(&mut Recorded) -> R) -> R {
        let mut guard = RECORDED.lock().unwrap();
        f(guard.get_or_insert_with(Recorded::default))
    }

    unsafe fn owned(ptr: *const c_char) -> String {
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }

    unsafe extern "C" fn environment(cmd: c_uint, data: *mut c_void) -> bool {
        record(|r| r.environment.push(cmd));
        match cmd {
            sys::ENVIRONMENT_SET_VARIABLES => {
                let mut variable = data.cast::<sys::Variable>();
                loop {
                    let entry = unsafe { &*variable };
                    if entry.key.is_null() {
                        break;
                    }
                    let pair = unsafe { (owned(entry.key), owned(entry.value)) };
                    record(|r| r.declared.push(pair));
                    variable = unsafe { variable.add(1) };
                }
                true
            }
            sys::ENVIRONMENT_SET_PIXEL_FORMAT => {
                let format = unsafe { *data.cast::<c_uint>() };
                record(|r| r.pixel_format = Some(format));
                true
            }
            sys::ENVIRONMENT_GET_VARIABLE => {
                let variable = unsafe { &mut *data.cast::<sys::Variable>() };
                if unsafe { owned(variable.key) } == "virtualjaguar_pal" {
                    variable.value = PAL_OPTION.as_ptr();
                    true
                } else {
                    false
                }
            }
            sys::ENVIRONMENT_GET_VARIABLE_UPDATE => {
                unsafe { *data.cast::<bool>() = false };
                true
            }
            sys::ENVIRONMENT_SET_GEOMETRY => {
                let geometry = unsafe { &*data.cast::<sys::GameGeometry>() };
                record(|r| {
                    r.geometry
                        .push((geometry.base_width, geometry.base_height, geometry.aspect_ratio))
                });
                true
            }
            _ => true,
        }
    }

    unsafe extern "C" fn video_refresh(_data: *const c_void, width: c_uint, height: c_uint, pitch: usize) {
        record(|r| r.video.push((width, height, pitch)));
    }

    unsafe extern "C" fn audio_batch(_data: *const i16, frames: usize) -> usize {
        record(|r| r.audio.push(frames));
        frames
    }

    unsafe extern "C" fn input_poll() {
        record(|r| r.polls += 1);
    }

    unsafe extern "C" fn input_state(_port: c_uint, _device: c_uint, _index: c_uint, _id: c_uint) -> i16 {
        0
    }

    #[test]
    fn joypad_ids_follow_libretro_numbering() {
        assert_eq!(joypad_id(JoypadButton::B), 0);
        assert_eq!(joypad_id(JoypadButton::A), 8);
        assert_eq!(joypad_id(JoypadButton::R3), 15);
    }

    #[test]
    fn geometry_carries_maximum_size() {
        let geometry = game_geometry(&Geometry::new(640, 240));
        assert_eq!((geometry.base_width, geometry.base_height), (640, 240));
        assert_eq!((geometry.max_width, geometry.max_height), (1400, 576));
        assert_eq!(geometry.aspect_ratio, 640.0 / 240.0);
    }

    #[test]
    fn reinstalling_tears_down_the_previous_core() {
        let slot = CoreSlot::<FakeEngine>::new();
        let mut host = crate::testing::RecordingHost::new();
        let mut core = JaguarCore::new(FakeEngine::default());
        core.initialize(&mut host).unwrap();
        core.load_game(&mut host, std::path::Path::new("/roms/doom.j64"))
            .unwrap();

        assert!(slot.install(core).is_none());
        let previous = slot.install(JaguarCore::new(FakeEngine::default())).unwrap();
        assert_eq!(previous.engine().shutdowns, 1);
        assert_eq!(previous.state(), crate::LifecycleState::Unloaded);
        assert!(previous.context().is_none());
    }

    // The exported symbols share process-wide state, so the whole flow is one test.
    #[test]
    fn exported_entry_points_drive_the_core() {
        retro_set_environment(environment);
        retro_set_video_refresh(video_refresh);
        retro_set_audio_sample_batch(audio_batch);
        retro_set_input_poll(input_poll);
        retro_set_input_state(input_state);

        assert_eq!(retro_api_version(), sys::API_VERSION);
        let declared = record(|r| r.declared.clone());
        assert_eq!(declared.len(), OPTIONS.len());
        assert_eq!(
            declared[0],
            (
                "virtualjaguar_usefastblitter".to_owned(),
                "Fast Blitter; enabled|disabled".to_owned()
            )
        );

        let mut system = std::mem::MaybeUninit::<sys::SystemInfo>::uninit();
        let system = unsafe {
            retro_get_system_info(system.as_mut_ptr());
            system.assume_init()
        };
        assert_eq!(unsafe { owned(system.library_name) }, "Virtual Jaguar");
        assert_eq!(unsafe { owned(system.valid_extensions) }, "j64|jag|bin|rom");
        assert!(!system.need_fullpath);

        retro_init();
        assert!(record(|r| r.environment.contains(&sys::ENVIRONMENT_SET_PERFORMANCE_LEVEL)));

        let info = sys::GameInfo {
            path: c"/roms/cybermorph.j64".as_ptr(),
            data: std::ptr::null(),
            size: 0,
            meta: std::ptr::null(),
        };
        assert!(unsafe { retro_load_game(&info) });
        assert_eq!(
            record(|r| r.pixel_format),
            Some(sys::PixelFormat::ARGB8888 as c_uint)
        );
        // PAL is enabled by the host, yet the reported region stays NTSC.
        assert_eq!(retro_get_region(), sys::Region::NTSC as c_uint);

        retro_run();
        retro_run();
        let (video, audio, polls) = record(|r| (r.video.clone(), r.audio.clone(), r.polls));
        assert_eq!(video, vec![(320, 240, 1400 * 4); 2]);
        assert_eq!(audio, vec![960; 2]);
        assert_eq!(polls, 2);
        assert!(record(|r| r.geometry.is_empty()));

        let mut av = std::mem::MaybeUninit::<sys::SystemAvInfo>::uninit();
        let av = unsafe {
            retro_get_system_av_info(av.as_mut_ptr());
            av.assume_init()
        };
        assert_eq!(av.timing.fps, 60.0);
        assert_eq!(av.timing.sample_rate, 48_000.0);
        assert_eq!(av.geometry.max_width, 1400);

        assert_eq!(retro_serialize_size(), 0);
        let mut buffer = [0u8; 16];
        assert!(!unsafe { retro_serialize(buffer.as_mut_ptr().cast(), buffer.len()) });
        assert!(!unsafe { retro_unserialize(buffer.as_ptr().cast(), buffer.len()) });
        assert!(retro_get_memory_data(0).is_null());
        assert!(!retro_load_game_special(0, std::ptr::null(), 0));

        retro_unload_game();
        retro_deinit();
        retro_deinit();
        retro_run();
        assert_eq!(record(|r| r.video.len()), 2);
    }
}
