//! Test doubles for the two collaborators.
//!
//! - [`RecordingHost`] answers option/input queries from plain fields and records
//!   every outward call (pixel format, geometry, video, audio) in order.
//! - [`FakeEngine`] follows a scripted video mode and records what the bridge asked
//!   of it.

use crate::av::{Geometry, VideoFrameBuffer};
use crate::config::EngineSettings;
use crate::engine::{BiosType, Engine, FIRMWARE_SIZE};
use crate::host::{Host, InputSource, PixelFormat};
use crate::input::InputState;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

pub const K_SERIES_FILL: u8 = 0x4b;
pub const M_SERIES_FILL: u8 = 0x4d;

static K_SERIES_ROM: [u8; FIRMWARE_SIZE] = [K_SERIES_FILL; FIRMWARE_SIZE];
static M_SERIES_ROM: [u8; FIRMWARE_SIZE] = [M_SERIES_FILL; FIRMWARE_SIZE];

/// Jaguar address space size.
const MEMORY_SIZE: usize = 0x0100_0000;

#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    PixelFormat(PixelFormat),
    PerformanceLevel(u32),
    Geometry(Geometry),
    Frame {
        width: u32,
        height: u32,
        pitch: usize,
        rows: usize,
    },
    Audio {
        frames: usize,
    },
}

pub struct RecordingHost {
    pub accept_pixel_format: bool,
    pub options: HashMap<String, String>,
    pub options_dirty: bool,
    pub input_wired: bool,
    pub pressed: Vec<InputSource>,
    pub input_reads: usize,
    pub events: Vec<HostEvent>,
    /// First pixel of every presented frame.
    pub first_pixels: Vec<u32>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            accept_pixel_format: true,
            options: HashMap::new(),
            options_dirty: false,
            input_wired: true,
            pressed: Vec::new(),
            input_reads: 0,
            events: Vec::new(),
            first_pixels: Vec::new(),
        }
    }

    pub fn set_option(&mut self, key: &str, value: &str) {
        self.options.insert(key.to_owned(), value.to_owned());
    }

    pub fn press(&mut self, source: InputSource) {
        self.pressed.push(source);
    }

    pub fn release_all(&mut self) {
        self.pressed.clear();
    }

    pub fn audio_frames(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                HostEvent::Audio { frames } => Some(*frames),
                _ => None,
            })
            .collect()
    }

    pub fn geometry_changes(&self) -> Vec<Geometry> {
        self.events
            .iter()
            .filter_map(|event| match event {
                HostEvent::Geometry(geometry) => Some(*geometry),
                _ => None,
            })
            .collect()
    }
}

impl Host for RecordingHost {
    fn set_pixel_format(&mut self, format: PixelFormat) -> bool {
        self.events.push(HostEvent::PixelFormat(format));
        self.accept_pixel_format
    }

    fn set_performance_level(&mut self, level: u32) {
        self.events.push(HostEvent::PerformanceLevel(level));
    }

    fn options_updated(&mut self) -> bool {
        std::mem::take(&mut self.options_dirty)
    }

    fn get_option(&mut self, key: &str) -> Option<String> {
        self.options.get(key).cloned()
    }

    fn poll_input(&mut self) -> bool {
        self.input_wired
    }

    fn read_input(&mut self, source: InputSource) -> bool {
        self.input_reads += 1;
        self.pressed.contains(&source)
    }

    fn request_geometry_change(&mut self, geometry: &Geometry) -> bool {
        self.events.push(HostEvent::Geometry(*geometry));
        true
    }

    fn present_frame(&mut self, pixels: &[u32], width: u32, height: u32, pitch_bytes: usize) {
        self.first_pixels.push(pixels.first().copied().unwrap_or_default());
        self.events.push(HostEvent::Frame {
            width,
            height,
            pitch: pitch_bytes,
            rows: pixels.len() / (pitch_bytes / 4),
        });
    }

    fn submit_audio(&mut self, samples: &[i16]) -> usize {
        let frames = samples.len() / 2;
        self.events.push(HostEvent::Audio { frames });
        frames
    }
}

pub struct FakeEngine {
    pub memory: Vec<u8>,
    pub mode: (u32, u32),
    /// Modes adopted at the start of successive frames.
    pub mode_script: VecDeque<(u32, u32)>,
    pub output_size: Option<(u32, u32)>,
    pub fail_init: bool,
    pub fail_load: bool,
    pub init_settings: Option<EngineSettings>,
    pub applied: Vec<EngineSettings>,
    pub loaded: Option<PathBuf>,
    pub resets: usize,
    pub frames_executed: usize,
    pub inputs_seen: Vec<InputState>,
    pub audio_requests: Vec<usize>,
    /// Vary the internal sample production from frame to frame.
    pub jitter: bool,
    pub shutdowns: usize,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::with_memory_size(MEMORY_SIZE)
    }
}

impl FakeEngine {
    pub fn with_memory_size(size: usize) -> Self {
        Self {
            memory: vec![0; size],
            mode: (320, 240),
            mode_script: VecDeque::new(),
            output_size: None,
            fail_init: false,
            fail_load: false,
            init_settings: None,
            applied: Vec::new(),
            loaded: None,
            resets: 0,
            frames_executed: 0,
            inputs_seen: Vec::new(),
            audio_requests: Vec::new(),
            jitter: false,
            shutdowns: 0,
        }
    }
}

impl Engine for FakeEngine {
    fn init(&mut self, settings: &EngineSettings) -> anyhow::Result<()> {
        if self.fail_init {
            anyhow::bail!("TOM refused to come up");
        }
        self.init_settings = Some(*settings);
        Ok(())
    }

    fn apply_settings(&mut self, settings: &EngineSettings) {
        self.applied.push(*settings);
    }

    fn boot_rom(&self, bios: BiosType) -> &'static [u8] {
        match bios {
            BiosType::KSeries => &K_SERIES_ROM,
            BiosType::MSeries => &M_SERIES_ROM,
        }
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    fn load_program(&mut self, path: &Path) -> anyhow::Result<()> {
        if self.fail_load {
            anyhow::bail!("unrecognized image header");
        }
        self.loaded = Some(path.to_path_buf());
        Ok(())
    }

    fn reset(&mut self) {
        self.resets += 1;
    }

    fn execute_frame(&mut self, input: &InputState, video: &mut VideoFrameBuffer) {
        if let Some(mode) = self.mode_script.pop_front() {
            self.mode = mode;
        }
        self.inputs_seen.push(input.clone());
        video.pixels_mut()[0] = self.frames_executed as u32;
        self.frames_executed += 1;
    }

    fn video_mode(&self) -> (u32, u32) {
        self.mode
    }

    fn set_output_size(&mut self, width: u32, height: u32) {
        self.output_size = Some((width, height));
    }

    fn render_audio(&mut self, out: &mut [i16]) {
        self.audio_requests.push(out.len());
        let produced = if self.jitter {
            out.len() - self.frames_executed % 7
        } else {
            out.len()
        };
        for (i, sample) in out.iter_mut().enumerate() {
            *sample = if i < produced { i as i16 } else { 0 };
        }
    }

    fn shutdown(&mut self) {
        self.shutdowns += 1;
    }
}
