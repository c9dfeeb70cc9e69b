use beep::beep;
use std::error::Error;

/// The audio sink. The interpreter reports whether the sound timer is
/// running after every frame; implementations act on the edges.
pub trait Sound {
    fn set_active(&mut self, active: bool) -> Result<(), Box<dyn Error>>;
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// PC speaker tone via the beep crate
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Sound for SimpleBeep {
    fn set_active(&mut self, active: bool) -> Result<(), Box<dyn Error>> {
        if active != self.is_beeping {
            beep(if active { SIMPLEBEEP_PITCH } else { 0 })?;
            self.is_beeping = active;
        }
        Ok(())
    }
}

impl Drop for SimpleBeep {
    fn drop(&mut self) {
        if self.is_beeping {
            let _ = beep(0);
        }
    }
}

/// silent; remembers what it would be doing
#[derive(Default)]
pub struct Mute {
    pub active: bool,
    pub beeps: usize,
}

impl Mute {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sound for Mute {
    fn set_active(&mut self, active: bool) -> Result<(), Box<dyn Error>> {
        if active && !self.active {
            self.beeps += 1;
        }
        self.active = active;
        Ok(())
    }
}
