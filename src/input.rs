use crate::machine::CHIP8_KEY_COUNT;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::time::Duration;

pub type Keypad = [bool; CHIP8_KEY_COUNT];

/// what the front end should do after reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// reads keypresses into the machine's keypad
pub trait Input {
    /// pick up whatever has happened since the last call and write the
    /// resulting key states into `keys`
    fn poll_keys(&mut self, keys: &mut Keypad) -> io::Result<Control>;

    /// called once per timer tick
    fn tick(&mut self) {}
}

/// Holds keys down for a few ticks after each press. Terminals report a key
/// being pressed (and auto-repeating) but never released, so this is the
/// closest we get to a real keypad.
#[derive(Debug, Clone)]
pub struct KeyLatch {
    remaining: [u8; CHIP8_KEY_COUNT],
    hold_ticks: u8,
}

impl KeyLatch {
    pub fn new(hold_ticks: u8) -> Self {
        KeyLatch {
            remaining: [0; CHIP8_KEY_COUNT],
            hold_ticks: hold_ticks.max(1),
        }
    }

    pub fn press(&mut self, key: u8) {
        if let Some(r) = self.remaining.get_mut(key as usize) {
            *r = self.hold_ticks;
        }
    }

    pub fn tick(&mut self) {
        for r in self.remaining.iter_mut() {
            *r = r.saturating_sub(1);
        }
    }

    pub fn apply(&self, keys: &mut Keypad) {
        for (k, r) in keys.iter_mut().zip(self.remaining.iter()) {
            *k = *r > 0;
        }
    }
}

/// Host characters to keypad indices. The screen is in use while this is
/// consulted, so each unmapped character is complained about only once.
#[derive(Debug, Clone)]
pub struct CharKeymap {
    table: HashMap<char, u8>,
    warned: HashSet<char>,
}

impl CharKeymap {
    pub fn new(table: HashMap<char, u8>) -> Self {
        CharKeymap {
            table,
            warned: HashSet::new(),
        }
    }

    pub fn lookup(&mut self, key: char) -> Option<u8> {
        let key = key.to_ascii_lowercase();
        let mapped = self.table.get(&key).copied();
        if mapped.is_none() && self.warned.insert(key) {
            eprintln!("Warning: can't map {:?} to a CHIP-8 key", key);
        }
        mapped
    }

    /// characters that have already been reported as unmapped
    pub fn warned(&self) -> &HashSet<char> {
        &self.warned
    }
}

/// keypad on the terminal, read through crossterm. Esc or ctrl-c quits.
pub struct TermInput {
    keymap: CharKeymap,
    latch: KeyLatch,
}

impl TermInput {
    pub fn new(keymap: HashMap<char, u8>, hold_ticks: u8) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: CharKeymap::new(keymap),
            latch: KeyLatch::new(hold_ticks),
        })
    }

    fn handle_key(&mut self, evt: KeyEvent) -> Control {
        match evt.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                return Control::Quit
            }
            KeyCode::Char(key) => {
                if let Some(mapped_key) = self.keymap.lookup(key) {
                    self.latch.press(mapped_key);
                }
            }
            // arrows, function keys and the like have no keypad meaning
            _ => {}
        }
        Control::Continue
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            eprintln!("Warning: couldn't leave raw mode: {}", e);
        }
    }
}

impl Input for TermInput {
    fn poll_keys(&mut self, keys: &mut Keypad) -> io::Result<Control> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => {
                    if self.handle_key(evt) == Control::Quit {
                        return Ok(Control::Quit);
                    }
                }
                _ => {}
            }
        }
        self.latch.apply(keys);
        Ok(Control::Continue)
    }

    fn tick(&mut self) {
        self.latch.tick();
    }
}

/// Input implementation for testing and headless runs. Each poll takes the
/// next entry off the script: `Some(k)` holds key k down on its own, `None`
/// lets go of everything. Once the script runs out it asks to quit.
pub struct ScriptedInput {
    script: VecDeque<Option<u8>>,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = Option<u8>>) -> Self {
        ScriptedInput {
            script: script.into_iter().collect(),
        }
    }
}

impl Input for ScriptedInput {
    fn poll_keys(&mut self, keys: &mut Keypad) -> io::Result<Control> {
        let Some(entry) = self.script.pop_front() else {
            return Ok(Control::Quit);
        };
        *keys = [false; CHIP8_KEY_COUNT];
        if let Some(slot) = entry.map(usize::from) {
            if let Some(k) = keys.get_mut(slot) {
                *k = true;
            }
        }
        Ok(Control::Continue)
    }
}
