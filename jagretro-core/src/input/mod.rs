//! Per-frame digital input snapshot.
//!
//! The Jaguar controller is modelled as a fixed vector of button intensities, one
//! slot per button, each either [`PRESSED`] or [`RELEASED`]. Host inputs reach those
//! slots through the static [`BINDINGS`] table; adding an input is a table change.
//!
//! Several host inputs may share a slot (e.g. joypad X and keypad 0 both drive `0`).
//! A shared slot reads as pressed when any of its sources is held.

use crate::host::{Host, InputSource};
use libretro_backend::JoypadButton;

pub const PRESSED: u8 = 0xff;
pub const RELEASED: u8 = 0x00;

/// Number of button slots in the engine's controller model.
pub const BUTTON_COUNT: usize = 21;

/// Button slots, numbered the way the engine lays out its controller state.
#[repr(usize)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum JaguarButton {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
    Star = 4,
    Key7 = 5,
    Key4 = 6,
    Key1 = 7,
    Key0 = 8,
    Key8 = 9,
    Key5 = 10,
    Key2 = 11,
    Hash = 12,
    Key9 = 13,
    Key6 = 14,
    Key3 = 15,
    A = 16,
    B = 17,
    C = 18,
    Option = 19,
    Pause = 20,
}

impl JaguarButton {
    pub const fn slot(self) -> usize {
        self as usize
    }
}

/// Maps one host input to one button slot.
#[derive(Copy, Clone, Debug)]
pub struct Binding {
    pub source: InputSource,
    pub button: JaguarButton,
}

const fn joypad(button: JoypadButton, target: JaguarButton) -> Binding {
    Binding {
        source: InputSource::Joypad(button),
        button: target,
    }
}

const fn keypad(digit: u8, target: JaguarButton) -> Binding {
    Binding {
        source: InputSource::Keypad(digit),
        button: target,
    }
}

pub const BINDINGS: &[Binding] = &[
    // Controller
    joypad(JoypadButton::Up, JaguarButton::Up),
    joypad(JoypadButton::Down, JaguarButton::Down),
    joypad(JoypadButton::Left, JaguarButton::Left),
    joypad(JoypadButton::Right, JaguarButton::Right),
    joypad(JoypadButton::A, JaguarButton::A),
    joypad(JoypadButton::B, JaguarButton::B),
    joypad(JoypadButton::Y, JaguarButton::C),
    joypad(JoypadButton::Start, JaguarButton::Pause),
    joypad(JoypadButton::Select, JaguarButton::Option),
    // Keypad keys reachable from the controller
    joypad(JoypadButton::X, JaguarButton::Key0),
    joypad(JoypadButton::R1, JaguarButton::Hash),
    joypad(JoypadButton::L1, JaguarButton::Star),
    joypad(JoypadButton::R2, JaguarButton::Key1),
    joypad(JoypadButton::L2, JaguarButton::Key2),
    joypad(JoypadButton::R3, JaguarButton::Key3),
    joypad(JoypadButton::L3, JaguarButton::Key3),
    // Numeric keypad
    keypad(0, JaguarButton::Key0),
    keypad(1, JaguarButton::Key1),
    keypad(2, JaguarButton::Key2),
    keypad(3, JaguarButton::Key3),
    keypad(4, JaguarButton::Key4),
    keypad(5, JaguarButton::Key5),
    keypad(6, JaguarButton::Key6),
    keypad(7, JaguarButton::Key7),
    keypad(8, JaguarButton::Key8),
    keypad(9, JaguarButton::Key9),
];

/// Button intensities for the current frame.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputState {
    buttons: [u8; BUTTON_COUNT],
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            buttons: [RELEASED; BUTTON_COUNT],
        }
    }
}

impl InputState {
    pub fn get(&self, button: JaguarButton) -> u8 {
        self.buttons[button.slot()]
    }

    pub fn is_pressed(&self, button: JaguarButton) -> bool {
        self.get(button) == PRESSED
    }

    pub fn as_bytes(&self) -> &[u8; BUTTON_COUNT] {
        &self.buttons
    }
}

/// Snapshot host input into `state`.
///
/// If the host has no input polling wired up, `state` keeps whatever it held.
pub fn poll<H: Host + ?Sized>(host: &mut H, state: &mut InputState) {
    if !host.poll_input() {
        return;
    }

    let mut buttons = [RELEASED; BUTTON_COUNT];
    for binding in BINDINGS {
        if host.read_input(binding.source) {
            buttons[binding.button.slot()] = PRESSED;
        }
    }
    state.buttons = buttons;
}
