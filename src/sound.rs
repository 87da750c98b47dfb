use crate::config::DEFAULT_BEEP_PITCH;
use beep::beep;
use std::error::Error;

/// The buzzer. CHIP-8 has a single tone that sounds for as long as the sound
/// timer is non-zero.
pub trait Sound {
    fn beep(&mut self) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
    fn is_beeping(&self) -> bool;

    /// start or stop the tone so that it follows `sounding`; only talks to the
    /// device when the state actually changes
    fn follow(&mut self, sounding: bool) -> Result<(), Box<dyn Error>> {
        match (sounding, self.is_beeping()) {
            (true, false) => self.beep(),
            (false, true) => self.stop(),
            _ => Ok(()),
        }
    }
}

/// so the front end can pick a buzzer at run time
impl<S: Sound + ?Sized> Sound for Box<S> {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        (**self).beep()
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        (**self).stop()
    }

    fn is_beeping(&self) -> bool {
        (**self).is_beeping()
    }
}

pub struct SimpleBeep {
    pitch: u16,
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new(pitch: u16) -> Self {
        SimpleBeep {
            pitch,
            is_beeping: false,
        }
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new(DEFAULT_BEEP_PITCH)
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        beep(self.pitch)?;
        self.is_beeping = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        beep(0)?;
        self.is_beeping = false;
        Ok(())
    }

    fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}

impl Drop for SimpleBeep {
    fn drop(&mut self) {
        if self.is_beeping {
            let _ = beep(0);
        }
    }
}

/// no noise, but keeps track of when there would have been some
#[derive(Default)]
pub struct Mute {
    is_beeping: bool,
    pub beeps: usize,
}

impl Mute {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        self.is_beeping = true;
        self.beeps += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.is_beeping = false;
        Ok(())
    }

    fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}
