/// number of keys on the hex keypad
pub const KEY_COUNT: u8 = 16;

/// which of the 16 hex keys are currently held, one bit per key
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keypad {
    held: u16,
}

impl Keypad {
    pub fn press(&mut self, key: u8) {
        debug_assert!(key < KEY_COUNT);
        self.held |= 1 << key;
    }

    pub fn release(&mut self, key: u8) {
        debug_assert!(key < KEY_COUNT);
        self.held &= !(1 << key);
    }

    /// codes above 0xF are never held
    pub fn is_pressed(&self, key: u8) -> bool {
        key < KEY_COUNT && self.held & (1 << key) != 0
    }

    pub fn held(&self) -> impl Iterator<Item = u8> + '_ {
        (0..KEY_COUNT).filter(move |&k| self.is_pressed(k))
    }

    pub fn clear(&mut self) {
        self.held = 0;
    }
}
