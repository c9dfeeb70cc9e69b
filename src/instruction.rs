/// A decoded CHIP-8 instruction. Register operands are indices 0-15, `u8`
/// operands are immediates and `u16` operands are 12-bit addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipIfEqImm(usize, u8),
    /// 4XNN
    SkipIfNeImm(usize, u8),
    /// 5XY0
    SkipIfEq(usize, usize),
    /// 6XNN
    LoadImm(usize, u8),
    /// 7XNN, no carry
    AddImm(usize, u8),
    /// 8XY0
    Move(usize, usize),
    /// 8XY1
    Or(usize, usize),
    /// 8XY2
    And(usize, usize),
    /// 8XY3
    Xor(usize, usize),
    /// 8XY4
    Add(usize, usize),
    /// 8XY5, Vx - Vy
    Sub(usize, usize),
    /// 8XY6
    ShiftRight(usize, usize),
    /// 8XY7, Vy - Vx
    SubReversed(usize, usize),
    /// 8XYE
    ShiftLeft(usize, usize),
    /// 9XY0
    SkipIfNe(usize, usize),
    /// ANNN
    LoadIndex(u16),
    /// BNNN
    JumpOffset(u16),
    /// CXNN
    Random(usize, u8),
    /// DXYN
    Draw(usize, usize, u8),
    /// EX9E
    SkipIfKey(usize),
    /// EXA1
    SkipIfNotKey(usize),
    /// FX07
    ReadDelay(usize),
    /// FX0A
    WaitKey(usize),
    /// FX15
    SetDelay(usize),
    /// FX18
    SetSound(usize),
    /// FX1E
    AddIndex(usize),
    /// FX29
    Glyph(usize),
    /// FX33
    StoreBcd(usize),
    /// FX55
    StoreRegs(usize),
    /// FX65
    LoadRegs(usize),
}

impl Instruction {
    /// `None` for any pattern CHIP-8 doesn't define (including 0NNN machine
    /// calls)
    pub fn decode(opcode: u16) -> Option<Self> {
        use Instruction::*;

        let nibbles = (
            (opcode >> 12) as u8,
            (opcode >> 8 & 0xf) as u8,
            (opcode >> 4 & 0xf) as u8,
            (opcode & 0xf) as u8,
        );
        let x = nibbles.1 as usize;
        let y = nibbles.2 as usize;
        let n = nibbles.3;
        let nn = (opcode & 0xff) as u8;
        let nnn = opcode & 0xfff;

        let instr = match nibbles {
            (0x0, 0x0, 0xe, 0x0) => ClearScreen,
            (0x0, 0x0, 0xe, 0xe) => Return,
            (0x1, _, _, _) => Jump(nnn),
            (0x2, _, _, _) => Call(nnn),
            (0x3, _, _, _) => SkipIfEqImm(x, nn),
            (0x4, _, _, _) => SkipIfNeImm(x, nn),
            (0x5, _, _, 0x0) => SkipIfEq(x, y),
            (0x6, _, _, _) => LoadImm(x, nn),
            (0x7, _, _, _) => AddImm(x, nn),
            (0x8, _, _, 0x0) => Move(x, y),
            (0x8, _, _, 0x1) => Or(x, y),
            (0x8, _, _, 0x2) => And(x, y),
            (0x8, _, _, 0x3) => Xor(x, y),
            (0x8, _, _, 0x4) => Add(x, y),
            (0x8, _, _, 0x5) => Sub(x, y),
            (0x8, _, _, 0x6) => ShiftRight(x, y),
            (0x8, _, _, 0x7) => SubReversed(x, y),
            (0x8, _, _, 0xe) => ShiftLeft(x, y),
            (0x9, _, _, 0x0) => SkipIfNe(x, y),
            (0xa, _, _, _) => LoadIndex(nnn),
            (0xb, _, _, _) => JumpOffset(nnn),
            (0xc, _, _, _) => Random(x, nn),
            (0xd, _, _, _) => Draw(x, y, n),
            (0xe, _, 0x9, 0xe) => SkipIfKey(x),
            (0xe, _, 0xa, 0x1) => SkipIfNotKey(x),
            (0xf, _, 0x0, 0x7) => ReadDelay(x),
            (0xf, _, 0x0, 0xa) => WaitKey(x),
            (0xf, _, 0x1, 0x5) => SetDelay(x),
            (0xf, _, 0x1, 0x8) => SetSound(x),
            (0xf, _, 0x1, 0xe) => AddIndex(x),
            (0xf, _, 0x2, 0x9) => Glyph(x),
            (0xf, _, 0x3, 0x3) => StoreBcd(x),
            (0xf, _, 0x5, 0x5) => StoreRegs(x),
            (0xf, _, 0x6, 0x5) => LoadRegs(x),
            _ => return None,
        };
        Some(instr)
    }
}

#[cfg(test)]
mod tests {
    use super::Instruction::*;
    use super::*;

    #[test]
    fn test_decode_fields() {
        assert_eq!(Instruction::decode(0x1abc), Some(Jump(0xabc)));
        assert_eq!(Instruction::decode(0x3a42), Some(SkipIfEqImm(0xa, 0x42)));
        assert_eq!(Instruction::decode(0x8cd4), Some(Add(0xc, 0xd)));
        assert_eq!(Instruction::decode(0xd12f), Some(Draw(1, 2, 0xf)));
        assert_eq!(Instruction::decode(0xf533), Some(StoreBcd(5)));
    }

    #[test]
    fn test_decode_key_skips_use_low_byte() {
        assert_eq!(Instruction::decode(0xe39e), Some(SkipIfKey(3)));
        assert_eq!(Instruction::decode(0xe3a1), Some(SkipIfNotKey(3)));
        assert_eq!(Instruction::decode(0xe39f), None);
        assert_eq!(Instruction::decode(0xe3a0), None);
    }

    #[test]
    fn test_decode_every_defined_form() {
        let defined = [
            0x00e0, 0x00ee, 0x1000, 0x2000, 0x3000, 0x4000, 0x5000, 0x6000, 0x7000, 0x8000,
            0x8001, 0x8002, 0x8003, 0x8004, 0x8005, 0x8006, 0x8007, 0x800e, 0x9000, 0xa000,
            0xb000, 0xc000, 0xd000, 0xe09e, 0xe0a1, 0xf007, 0xf00a, 0xf015, 0xf018, 0xf01e,
            0xf029, 0xf033, 0xf055, 0xf065,
        ];
        for op in defined {
            assert!(Instruction::decode(op).is_some(), "{:04x} should decode", op);
        }
    }

    #[test]
    fn test_decode_rejects_undefined() {
        for op in [0x0000, 0x0123, 0x00e1, 0x5121, 0x8008, 0x800f, 0x9ab1, 0xf0ff, 0xf100] {
            assert_eq!(Instruction::decode(op), None, "{:04x} should not decode", op);
        }
    }
}
