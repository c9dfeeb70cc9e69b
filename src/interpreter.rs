//! # interpreter
//!
//! Glue between a `Machine` and the outside world. Each 60Hz frame:
//!  1. drain the input device and apply key events to the keypad
//!  2. run the machine for one frame (N instructions, one timer tick)
//!  3. hand the framebuffer to the display if anything drew
//!  4. tell the sound device whether the sound timer is running
//!
//! A trap stops the loop and is returned to the caller, which decides
//! whether to give up or `restart`.

use crate::config::Config;
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::{Input, KeyEvent};
use crate::machine::{Frame, Machine};
use crate::sound::Sound;
use crate::timer::TIMER_HZ;
use log::{debug, error, info};
use spin_sleep::LoopHelper;
use std::error::Error;
use std::io;

/// why a frame asked the loop to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct Chip8Interpreter<'a> {
    machine: Machine,
    rom: Vec<u8>,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(
        config: Config,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Self {
        Chip8Interpreter {
            machine: Machine::new(config),
            rom: Vec::new(),
            display,
            input,
            sound,
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// load a chip8 program, replacing whatever was running
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        let mut rom = Vec::new();
        reader.read_to_end(&mut rom)?;
        self.machine.reset();
        self.machine.load_program(&rom)?;
        self.rom = rom;
        Ok(())
    }

    /// reset the machine and reload the current program
    pub fn restart(&mut self) -> Result<(), Box<dyn Error>> {
        info!("restarting");
        self.machine.reset();
        self.machine.load_program(&self.rom)?;
        self.display.draw(&self.machine.screen().as_bytes())?;
        Ok(())
    }

    /// one frame: input, execution, then output
    pub fn run_frame(&mut self) -> Result<Control, Box<dyn Error>> {
        for event in self.input.poll_events()? {
            match event {
                KeyEvent::Down(k) => self.machine.key_down(k)?,
                KeyEvent::Up(k) => self.machine.key_up(k)?,
                KeyEvent::Reset => {
                    self.restart()?;
                    return Ok(Control::Continue);
                }
                KeyEvent::Quit => return Ok(Control::Quit),
            }
        }

        let frame = match self.machine.run_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!("{}", e);
                self.sound.set_active(false)?;
                return Err(e.into());
            }
        };
        self.present(&frame)?;
        Ok(Control::Continue)
    }

    fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn Error>> {
        if frame.redraw {
            self.display.draw(&self.machine.screen().as_bytes())?;
        }
        self.sound.set_active(frame.sound_active)?;
        Ok(())
    }

    /// run frames at 60Hz until quit, `max_frames` or a trap
    pub fn main_loop(&mut self, max_frames: Option<u64>) -> Result<u64, Box<dyn Error>> {
        let mut pacer = LoopHelper::builder()
            .report_interval_s(5.0)
            .build_with_target_rate(TIMER_HZ as f64);
        self.display.draw(&self.machine.screen().as_bytes())?;

        let mut frames = 0;
        while max_frames.map_or(true, |max| frames < max) {
            pacer.loop_start();
            let control = self.run_frame()?;
            frames += 1;
            if control == Control::Quit {
                info!("quit after {} frames", frames);
                break;
            }
            if let Some(fps) = pacer.report_rate() {
                debug!("{:.1} frames/s", fps);
            }
            pacer.loop_sleep();
        }
        self.sound.set_active(false)?;
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::input::DummyInput;
    use crate::machine::ExecState;
    use crate::sound::Mute;

    fn rom(ops: &[u16]) -> Vec<u8> {
        ops.iter().flat_map(|op| op.to_be_bytes()).collect()
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Chip8Error> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        let mut sound = Mute::new();
        let mut i = Chip8Interpreter::new(Config::default(), &mut display, &mut input, &mut sound);
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        i.load_program(&mut prog)
    }

    #[test]
    fn test_oversized_program_rejected() {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        let mut sound = Mute::new();
        let mut i = Chip8Interpreter::new(Config::default(), &mut display, &mut input, &mut sound);
        let big = vec![0u8; 4000];
        assert!(matches!(
            i.load_program(&mut big.as_slice()),
            Err(Chip8Error::ProgramTooLarge { size: 4000, .. })
        ));
    }

    #[test]
    fn test_draws_and_beeps() -> Result<(), Box<dyn Error>> {
        // draw "0" at the origin, sound for 2 ticks, then spin
        let program = rom(&[0xd015, 0x6002, 0xf018, 0x1206]);
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        let mut sound = Mute::new();
        {
            let mut i =
                Chip8Interpreter::new(Config::default(), &mut display, &mut input, &mut sound);
            i.load_program(&mut program.as_slice())?;
            assert_eq!(i.run_frame()?, Control::Continue);
            assert!(i.machine().sound_active());
            i.run_frame()?;
            assert!(!i.machine().sound_active());
        }
        assert_eq!(display.frames_drawn, 1);
        assert!(display.pixel(0, 0));
        assert!(!display.pixel(1, 1));
        assert_eq!(sound.beeps, 1);
        assert!(!sound.active);
        Ok(())
    }

    #[test]
    fn test_key_event_resolves_wait() -> Result<(), Box<dyn Error>> {
        let program = rom(&[0xf50a, 0x1202]);
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![vec![], vec![], vec![KeyEvent::Down(7)]]);
        let mut sound = Mute::new();
        let mut i = Chip8Interpreter::new(Config::default(), &mut display, &mut input, &mut sound);
        i.load_program(&mut program.as_slice())?;
        i.run_frame()?;
        i.run_frame()?;
        assert_eq!(i.machine().state(), ExecState::AwaitingKey { target: 5 });
        i.run_frame()?;
        assert_eq!(i.machine().state(), ExecState::Running);
        assert_eq!(i.machine().registers().v[5], 7);
        assert!(i.machine().keypad().is_pressed(7));
        Ok(())
    }

    #[test]
    fn test_reset_event_reloads_program() -> Result<(), Box<dyn Error>> {
        let program = rom(&[0x7101, 0x1200]);
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![vec![], vec![KeyEvent::Reset]]);
        let mut sound = Mute::new();
        let mut i = Chip8Interpreter::new(Config::default(), &mut display, &mut input, &mut sound);
        i.load_program(&mut program.as_slice())?;
        i.run_frame()?;
        assert_eq!(i.machine().registers().v[1], 5);
        i.run_frame()?;
        assert_eq!(i.machine().registers().v[1], 0);
        assert_eq!(i.machine().registers().pc, 0x200);
        i.run_frame()?;
        assert_eq!(i.machine().registers().v[1], 5);
        Ok(())
    }

    #[test]
    fn test_trap_ends_main_loop() {
        let program = rom(&[0x00ee]);
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        let mut sound = Mute::new();
        let mut i = Chip8Interpreter::new(Config::default(), &mut display, &mut input, &mut sound);
        i.load_program(&mut program.as_slice()).unwrap();
        let err = i.main_loop(Some(10)).unwrap_err();
        assert!(err.to_string().contains("empty call stack"));
    }

    #[test]
    fn test_quit_ends_main_loop() -> Result<(), Box<dyn Error>> {
        let program = rom(&[0x1200]);
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![vec![], vec![KeyEvent::Quit]]);
        let mut sound = Mute::new();
        let mut i = Chip8Interpreter::new(Config::default(), &mut display, &mut input, &mut sound);
        i.load_program(&mut program.as_slice())?;
        assert_eq!(i.main_loop(Some(1000))?, 2);
        Ok(())
    }

    #[test]
    fn test_frame_limit_ends_main_loop() -> Result<(), Box<dyn Error>> {
        let program = rom(&[0x1200]);
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        let mut sound = Mute::new();
        let mut i = Chip8Interpreter::new(Config::default(), &mut display, &mut input, &mut sound);
        i.load_program(&mut program.as_slice())?;
        assert_eq!(i.main_loop(Some(3))?, 3);
        Ok(())
    }
}
