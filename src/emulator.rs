//! # emulator
//!
//! Glues a `Machine` to a display, a keypad and a buzzer and drives it in
//! real time. The machine knows nothing about time; this is where the pacing
//! lives:
//!
//! ```text
//! loop
//!  |-- input.poll_keys()             -- Esc/ctrl-c stops here
//!  |-- machine.step()
//!  |-- present() if dirty
//!  |-- sound.follow(sound timer)
//!  |-- tick timers for every timer period that has elapsed
//!  `-- sleep(cycle delay)
//! ```
use crate::config::EmulatorConfig;
use crate::display::{present, Display};
use crate::error::Result;
use crate::input::{Control, Input};
use crate::machine::Machine;
use crate::sound::Sound;
use std::time::Instant;

/// why `run` came back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Quit,
    CycleLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub reason: StopReason,
    pub cycles: u64,
}

pub struct Emulator<D: Display, I: Input, S: Sound> {
    pub machine: Machine,
    pub display: D,
    pub input: I,
    pub sound: S,
    config: EmulatorConfig,
    sound_ok: bool,
}

impl<D: Display, I: Input, S: Sound> Emulator<D, I, S> {
    pub fn new(machine: Machine, display: D, input: I, sound: S, config: EmulatorConfig) -> Self {
        let sound_ok = !config.mute;
        Emulator {
            machine,
            display,
            input,
            sound,
            config,
            sound_ok,
        }
    }

    /// one instruction's worth of work: read keys, execute, redraw, buzz
    pub fn cycle(&mut self) -> Result<Control> {
        if self.input.poll_keys(&mut self.machine.keys)? == Control::Quit {
            return Ok(Control::Quit);
        }
        if self.machine.step()? {
            present(&mut self.display, &mut self.machine)?;
        }
        if self.sound_ok {
            if let Err(e) = self.sound.follow(self.machine.is_sounding()) {
                eprintln!("Warning: sound disabled: {}", e);
                self.sound_ok = false;
            }
        }
        Ok(Control::Continue)
    }

    /// one timer period has passed
    pub fn tick(&mut self) {
        self.machine.tick();
        self.input.tick();
    }

    /// run until asked to quit, the cycle limit is hit, or the program
    /// faults
    pub fn run(&mut self) -> Result<RunSummary> {
        let period = self.config.timer_period();
        let mut next_tick = Instant::now() + period;
        let mut cycles = 0u64;

        loop {
            if self.config.max_cycles.map_or(false, |max| cycles >= max) {
                return Ok(RunSummary {
                    reason: StopReason::CycleLimit,
                    cycles,
                });
            }
            if self.cycle()? == Control::Quit {
                return Ok(RunSummary {
                    reason: StopReason::Quit,
                    cycles,
                });
            }
            cycles += 1;

            let now = Instant::now();
            while now >= next_tick {
                self.tick();
                next_tick += period;
            }
            if !self.config.cycle_delay.is_zero() {
                spin_sleep::sleep(self.config.cycle_delay);
            }
        }
    }
}
