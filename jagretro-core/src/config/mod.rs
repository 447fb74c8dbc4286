//! Host options and the engine settings they resolve to.
//!
//! Responsibilities:
//! - Declare the fixed option table exposed to the host ([`OPTIONS`]).
//! - Resolve host option values into an [`EngineSettings`] snapshot ([`sample`]).
//!
//! Every option is a two-way `enabled|disabled` switch. The first listed choice is
//! the option's default, and defaults differ per option: an absent value, or any
//! string other than `enabled`/`disabled`, resolves to that option's own default.
//!
//! Sampling happens at load and at the start of a frame in which the host reports
//! changed options. It never runs mid-frame.

use crate::engine::BiosType;
use crate::host::Host;
use tracing::debug;

const ENABLED: &str = "enabled";
const DISABLED: &str = "disabled";

/// Video timing profile of the emulated console.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum TimingMode {
    #[default]
    Ntsc,
    Pal,
}

impl TimingMode {
    pub const fn refresh_hz(self) -> u32 {
        match self {
            TimingMode::Ntsc => 60,
            TimingMode::Pal => 50,
        }
    }
}

/// Engine setting an option controls.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Setting {
    FastBlitter,
    AlternateResolution,
    PalTiming,
    UseBios,
    Audio,
    Gpu,
    Dsp,
    DiagnosticLog,
}

/// One host-visible option.
#[derive(Copy, Clone, Debug)]
pub struct CoreOption {
    pub key: &'static str,
    pub label: &'static str,
    /// Accepted values; the first one is the default.
    pub choices: [&'static str; 2],
    pub setting: Setting,
}

impl CoreOption {
    pub fn default_enabled(&self) -> bool {
        self.choices[0] == ENABLED
    }

    /// Resolve a host value for this option into an on/off switch.
    pub fn resolve(&self, value: Option<&str>) -> bool {
        match value {
            Some(ENABLED) => true,
            Some(DISABLED) => false,
            _ => self.default_enabled(),
        }
    }

    /// `"<label>; <choice>|<choice>"`, the form libretro expects in a variable declaration.
    pub fn declaration(&self) -> String {
        format!("{}; {}", self.label, self.choices.join("|"))
    }
}

pub const OPTIONS: [CoreOption; 8] = [
    CoreOption {
        key: "virtualjaguar_usefastblitter",
        label: "Fast Blitter",
        choices: [ENABLED, DISABLED],
        setting: Setting::FastBlitter,
    },
    CoreOption {
        key: "virtualjaguar_doom_res_hack",
        label: "Doom Hack",
        choices: [DISABLED, ENABLED],
        setting: Setting::AlternateResolution,
    },
    CoreOption {
        key: "virtualjaguar_pal",
        label: "Pal (Restart)",
        choices: [DISABLED, ENABLED],
        setting: Setting::PalTiming,
    },
    CoreOption {
        key: "virtualjaguar_bios",
        label: "Bios",
        choices: [DISABLED, ENABLED],
        setting: Setting::UseBios,
    },
    CoreOption {
        key: "virtualjaguar_audio",
        label: "Audio",
        choices: [ENABLED, DISABLED],
        setting: Setting::Audio,
    },
    CoreOption {
        key: "virtualjaguar_gpu",
        label: "Gpu",
        choices: [ENABLED, DISABLED],
        setting: Setting::Gpu,
    },
    CoreOption {
        key: "virtualjaguar_dsp",
        label: "Dsp",
        choices: [ENABLED, DISABLED],
        setting: Setting::Dsp,
    },
    CoreOption {
        key: "virtualjaguar_log",
        label: "Log",
        choices: [DISABLED, ENABLED],
        setting: Setting::DiagnosticLog,
    },
];

/// Resolved engine configuration.
///
/// `Default` is the all-defaults resolution of [`OPTIONS`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EngineSettings {
    pub fast_blitter: bool,
    /// Pixel-doubling hack for games that drive TOM at a very narrow pixel width.
    pub alternate_resolution: bool,
    pub timing: TimingMode,
    /// Boot through the firmware image instead of jumping straight to the program.
    pub use_bios: bool,
    pub audio_enabled: bool,
    pub gpu_enabled: bool,
    pub dsp_enabled: bool,
    pub diagnostic_log: bool,
    /// Not host-exposed; picks which firmware image gets installed.
    pub bios_type: BiosType,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fast_blitter: true,
            alternate_resolution: false,
            timing: TimingMode::Ntsc,
            use_bios: false,
            audio_enabled: true,
            gpu_enabled: true,
            dsp_enabled: true,
            diagnostic_log: false,
            bios_type: BiosType::default(),
        }
    }
}

impl EngineSettings {
    pub fn get(&self, setting: Setting) -> bool {
        match setting {
            Setting::FastBlitter => self.fast_blitter,
            Setting::AlternateResolution => self.alternate_resolution,
            Setting::PalTiming => self.timing == TimingMode::Pal,
            Setting::UseBios => self.use_bios,
            Setting::Audio => self.audio_enabled,
            Setting::Gpu => self.gpu_enabled,
            Setting::Dsp => self.dsp_enabled,
            Setting::DiagnosticLog => self.diagnostic_log,
        }
    }

    pub fn set(&mut self, setting: Setting, enabled: bool) {
        match setting {
            Setting::FastBlitter => self.fast_blitter = enabled,
            Setting::AlternateResolution => self.alternate_resolution = enabled,
            Setting::PalTiming => {
                self.timing = if enabled {
                    TimingMode::Pal
                } else {
                    TimingMode::Ntsc
                }
            }
            Setting::UseBios => self.use_bios = enabled,
            Setting::Audio => self.audio_enabled = enabled,
            Setting::Gpu => self.gpu_enabled = enabled,
            Setting::Dsp => self.dsp_enabled = enabled,
            Setting::DiagnosticLog => self.diagnostic_log = enabled,
        }
    }

    /// Option key to resolved choice, in declaration order.
    pub fn resolved_values(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        OPTIONS.iter().map(|option| {
            let value = if self.get(option.setting) {
                ENABLED
            } else {
                DISABLED
            };
            (option.key, value)
        })
    }
}

/// Read every option from the host and resolve it into a fresh settings snapshot.
pub fn sample<H: Host + ?Sized>(host: &mut H) -> EngineSettings {
    let mut settings = EngineSettings::default();
    for option in &OPTIONS {
        let value = host.get_option(option.key);
        settings.set(option.setting, option.resolve(value.as_deref()));
    }

    debug!(
        options = ?settings.resolved_values().collect::<Vec<_>>(),
        "sampled core options"
    );
    settings
}
