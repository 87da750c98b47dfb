use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// which host keys stand in for the 16-key hex keypad
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Keymap {
    /// left-hand side of a qwerty keyboard, laid out like the COSMAC pad
    ///
    /// ```text
    /// 1 2 3 4      1 2 3 C
    /// Q W E R      4 5 6 D
    /// A S D F  ->  7 8 9 E
    /// Z X C V      A 0 B F
    /// ```
    #[default]
    Conventional,
    /// '0'-'9' and 'a'-'f' press the key with that name
    Literal,
}

const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

const CHIP8_LITERAL_KEYMAP: [(char, u8); 16] = [
    ('0', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('4', 0x04),
    ('5', 0x05),
    ('6', 0x06),
    ('7', 0x07),
    ('8', 0x08),
    ('9', 0x09),
    ('a', 0x0a),
    ('b', 0x0b),
    ('c', 0x0c),
    ('d', 0x0d),
    ('e', 0x0e),
    ('f', 0x0f),
];

impl Keymap {
    /// host character -> keypad index
    pub fn table(&self) -> HashMap<char, u8> {
        match self {
            Keymap::Conventional => HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            Keymap::Literal => HashMap::from(CHIP8_LITERAL_KEYMAP),
        }
    }
}

/// a high C
pub const DEFAULT_BEEP_PITCH: u16 = 2093;

/// knobs for the `run` front end
#[derive(Clone, Debug, PartialEq)]
pub struct EmulatorConfig {
    /// pause between instructions
    pub cycle_delay: Duration,
    /// how often the delay and sound timers count down
    pub timer_hz: u32,
    pub keymap: Keymap,
    /// terminals only tell us about presses, so a key stays down for this
    /// many timer ticks after its last press
    pub key_hold_ticks: u8,
    pub mute: bool,
    pub beep_pitch: u16,
    /// stop after this many instructions
    pub max_cycles: Option<u64>,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            cycle_delay: Duration::from_millis(1),
            timer_hz: 60,
            keymap: Keymap::default(),
            key_hold_ticks: 6,
            mute: false,
            beep_pitch: DEFAULT_BEEP_PITCH,
            max_cycles: None,
        }
    }
}

impl EmulatorConfig {
    /// time between timer ticks; a zero rate is treated as 1Hz
    pub fn timer_period(&self) -> Duration {
        Duration::from_secs(1) / self.timer_hz.max(1)
    }
}

/// knobs for the `decompile` front end
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisassemblyConfig {
    pub verbose: bool,
    /// how many jumps/calls/skips the analyser will record before giving up
    pub analyser_capacity: usize,
    /// write here instead of stdout
    pub output: Option<PathBuf>,
}
