use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;

use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use log::warn;

use crate::keypad::KEY_COUNT;

/// the left-hand side of a qwerty keyboard laid out like the COSMAC keypad:
///   1 2 3 4      1 2 3 C
///   q w e r  ->  4 5 6 D
///   a s d f      7 8 9 E
///   z x c v      A 0 B F
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

/// frames a key stays down after the terminal last reported it; key repeat
/// normally refreshes it well within this
const HOLD_FRAMES: u8 = 8;

/// things the host can ask of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(u8),
    Up(u8),
    Reset,
    Quit,
}

/// the input source; polled once per frame
pub trait Input {
    /// everything that happened since the last poll, oldest first
    fn poll_events(&mut self) -> Result<Vec<KeyEvent>, io::Error>;
}

/// Keyboard input from the terminal, via crossterm. Terminals only report
/// presses, so a key is treated as held until `HOLD_FRAMES` polls pass
/// without it being reported again.
pub struct TermInput {
    keymap: HashMap<char, u8>,
    hold: [u8; KEY_COUNT as usize],
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            hold: [0; KEY_COUNT as usize],
        })
    }

    fn translate(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<KeyEvent> {
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(KeyEvent::Quit),
            KeyCode::Esc => Some(KeyEvent::Quit),
            KeyCode::Backspace => Some(KeyEvent::Reset),
            KeyCode::Char(c) => match self.keymap.get(&c.to_ascii_lowercase()) {
                Some(&key) => Some(KeyEvent::Down(key)),
                None => {
                    warn!("can't map {:?} to a CHIP-8 key", c);
                    None
                }
            },
            _ => None,
        }
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn poll_events(&mut self) -> Result<Vec<KeyEvent>, io::Error> {
        let mut pressed = Vec::new();
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                if let Some(e) = self.translate(evt.code, evt.modifiers) {
                    pressed.push(e);
                }
            }
        }
        Ok(release_stale(&mut self.hold, pressed))
    }
}

/// Refresh hold counters from this poll's presses and add an `Up` for every
/// key whose counter runs out. Only the first press of a held key is passed on.
fn release_stale(hold: &mut [u8; KEY_COUNT as usize], pressed: Vec<KeyEvent>) -> Vec<KeyEvent> {
    let mut events = Vec::new();
    let mut refreshed = [false; KEY_COUNT as usize];
    for e in pressed {
        match e {
            KeyEvent::Down(k) => {
                let slot = &mut hold[k as usize];
                if *slot == 0 {
                    events.push(e);
                }
                *slot = HOLD_FRAMES;
                refreshed[k as usize] = true;
            }
            other => events.push(other),
        }
    }
    for (k, slot) in hold.iter_mut().enumerate() {
        if *slot > 0 && !refreshed[k] {
            *slot -= 1;
            if *slot == 0 {
                events.push(KeyEvent::Up(k as u8));
            }
        }
    }
    events
}

/// scripted Input for testing: each poll returns the next batch of events
pub struct DummyInput {
    script: VecDeque<Vec<KeyEvent>>,
}

impl DummyInput {
    pub fn new(script: Vec<Vec<KeyEvent>>) -> Self {
        DummyInput {
            script: script.into(),
        }
    }
}

impl Input for DummyInput {
    fn poll_events(&mut self) -> Result<Vec<KeyEvent>, io::Error> {
        Ok(self.script.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap_covers_every_key() {
        let map = HashMap::from(CHIP8_CONVENTIONAL_KEYMAP);
        let mut keys: Vec<u8> = map.values().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..KEY_COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn test_press_then_release_after_hold() {
        let mut hold = [0; KEY_COUNT as usize];
        assert_eq!(
            release_stale(&mut hold, vec![KeyEvent::Down(5)]),
            vec![KeyEvent::Down(5)]
        );
        for _ in 1..HOLD_FRAMES {
            assert!(release_stale(&mut hold, vec![]).is_empty());
        }
        assert_eq!(release_stale(&mut hold, vec![]), vec![KeyEvent::Up(5)]);
        assert!(release_stale(&mut hold, vec![]).is_empty());
    }

    #[test]
    fn test_repeat_keeps_key_held() {
        let mut hold = [0; KEY_COUNT as usize];
        release_stale(&mut hold, vec![KeyEvent::Down(1)]);
        for _ in 0..3 * HOLD_FRAMES {
            assert!(release_stale(&mut hold, vec![KeyEvent::Down(1)]).is_empty());
        }
        assert_eq!(hold[1], HOLD_FRAMES);
    }

    #[test]
    fn test_control_events_pass_through() {
        let mut hold = [0; KEY_COUNT as usize];
        assert_eq!(
            release_stale(&mut hold, vec![KeyEvent::Reset, KeyEvent::Quit]),
            vec![KeyEvent::Reset, KeyEvent::Quit]
        );
    }

    #[test]
    fn test_dummy_input_replays_script() -> Result<(), io::Error> {
        let mut i = DummyInput::new(vec![vec![KeyEvent::Down(3)], vec![], vec![KeyEvent::Up(3)]]);
        assert_eq!(i.poll_events()?, vec![KeyEvent::Down(3)]);
        assert!(i.poll_events()?.is_empty());
        assert_eq!(i.poll_events()?, vec![KeyEvent::Up(3)]);
        assert!(i.poll_events()?.is_empty());
        Ok(())
    }
}
