use crate::error::{Chip8Error, Fault};

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents an addressable, bounds-checked block of memory. Addresses never
/// wrap: anything past the end is a fault.
pub trait MemoryMap {
    /// write a chunk of bytes into "RAM"; nothing is written unless all of it fits
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), Fault> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    fn read_byte(&self, addr: u16) -> Result<u8, Fault> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Fault> {
        self.get_rw_slice(addr, 1)?[0] = value;
        Ok(())
    }

    /// get a big-endian two-byte word (opcodes)
    fn get_word(&self, addr: u16) -> Result<u16, Fault> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Fault>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Fault>;
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// where the hex digit glyphs live
pub const CHIP8_FONT_ADDR: u16 = 0x000;

/// bytes per glyph
pub const CHIP8_GLYPH_BYTES: u16 = 5;

/// largest program that fits between 0x200 and the top of RAM
pub const CHIP8_MAX_PROGRAM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// Defines the CHIP-8 memory map:
///   0x0000-0x004f  font, 16 glyphs of 5 bytes
///   0x0050-0x01ff  reserved
///   0x0200-0x0fff  program
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Fault> {
        let range = checked_range(addr, len)?;
        Ok(&mut self.bytes[range])
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Fault> {
        let range = checked_range(addr, len)?;
        Ok(&self.bytes[range])
    }
}

/// the fault names the first address past the end of RAM
fn checked_range(addr: u16, len: usize) -> Result<std::ops::Range<usize>, Fault> {
    let start = addr as usize;
    let end = start + len;
    if end > CHIP8_RAM_SIZE_BYTES {
        return Err(Fault::AddressOutOfRange(start.max(CHIP8_RAM_SIZE_BYTES)));
    }
    Ok(start..end)
}

impl Chip8MemoryMap {
    /// zeroed RAM with the font baked in
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
        };
        mm.load_font();
        mm
    }

    pub fn load_font(&mut self) {
        let start = CHIP8_FONT_ADDR as usize;
        self.bytes[start..start + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
    }

    /// load a CHIP-8 program at 0x200
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        if program.len() > CHIP8_MAX_PROGRAM_BYTES {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        // length is checked above, so this cannot fault
        let start = CHIP8_PROGRAM_ADDR as usize;
        self.bytes[start..start + program.len()].copy_from_slice(program);
        Ok(())
    }

    /// address of the glyph for hex digit `digit`
    pub fn glyph_addr(digit: u8) -> u16 {
        CHIP8_FONT_ADDR + digit as u16 * CHIP8_GLYPH_BYTES
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

#[rustfmt::skip]
const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed_above_font() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.bytes[0x50..], [0; 0xfb0]);
    }

    #[test]
    fn test_font_at_zero() -> Result<(), Fault> {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_ro_slice(0, 5)?, &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        // glyph for F is the last one
        assert_eq!(Chip8MemoryMap::glyph_addr(0xf), 75);
        assert_eq!(m.read_byte(79)?, 0x80);
        Ok(())
    }

    #[test]
    fn test_write_slice_ok() -> Result<(), Fault> {
        let mut dst = Chip8MemoryMap::new();
        dst.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x300)?;
        assert_eq!(dst.get_ro_slice(0x2fc, 12)?, &[0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]);
        Ok(())
    }

    #[test]
    fn test_read_word() -> Result<(), Fault> {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x200)?;
        assert_eq!(m.get_word(0x204)?, 0x0405);
        Ok(())
    }

    #[test]
    fn test_last_byte_addressable() -> Result<(), Fault> {
        let mut m = Chip8MemoryMap::new();
        m.write_byte(0xfff, 0xaa)?;
        assert_eq!(m.read_byte(0xfff)?, 0xaa);
        Ok(())
    }

    #[test]
    fn test_out_of_range_does_not_wrap() {
        let mut m = Chip8MemoryMap::new();
        assert_eq!(m.read_byte(0x1000), Err(Fault::AddressOutOfRange(0x1000)));
        assert_eq!(m.get_word(0xfff), Err(Fault::AddressOutOfRange(0x1000)));
        assert_eq!(
            m.write(&[1, 2, 3], 0xffe),
            Err(Fault::AddressOutOfRange(0x1000))
        );
        // the partial write must not have happened
        assert_eq!(m.bytes[0xffe..], [0, 0]);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        dst.load_program(&[0x00, 0xe0])?; // clear screen
        assert_eq!(dst.get_ro_slice(0x200, 2).unwrap(), &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_program_fills_memory_exactly() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        dst.load_program(&[0xab; CHIP8_MAX_PROGRAM_BYTES])?;
        assert_eq!(dst.bytes[0xfff], 0xab);
        Ok(())
    }

    #[test]
    fn test_program_too_large_rejected_untouched() {
        let mut dst = Chip8MemoryMap::new();
        let err = dst.load_program(&[0xab; CHIP8_MAX_PROGRAM_BYTES + 1]);
        assert!(matches!(
            err,
            Err(Chip8Error::ProgramTooLarge { size: 3585, max: 3584 })
        ));
        assert_eq!(dst.bytes[0x200..], [0; 0xe00]);
    }
}
