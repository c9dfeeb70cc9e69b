use std::io;

use thiserror::Error;

/// why a running program was stopped
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("address {0:#05x} is outside addressable memory")]
    AddressOutOfRange(usize),

    #[error("call stack overflow (more than 16 nested calls)")]
    StackOverflow,

    #[error("return with an empty call stack")]
    StackUnderflow,

    #[error("jump to odd address {0:#05x}")]
    MisalignedJump(u16),

    #[error("unrecognised opcode")]
    UnknownOpcode,
}

#[derive(Debug, Error)]
pub enum Chip8Error {
    /// nothing was written to memory
    #[error("program is {size} bytes, at most {max} bytes fit above 0x200")]
    ProgramTooLarge { size: usize, max: usize },

    /// a fault raised while executing the program; the machine is halted
    #[error("{fault} at pc {pc:#05x} ({})", opcode_text(.opcode))]
    Trap {
        fault: Fault,
        pc: u16,
        opcode: Option<u16>,
    },

    #[error("key code {0:#x} is not on the hex keypad")]
    InvalidKey(u8),

    #[error(transparent)]
    Io(#[from] io::Error),
}

fn opcode_text(opcode: &Option<u16>) -> String {
    match opcode {
        Some(op) => format!("opcode {:04X}", op),
        None => "opcode not fetched".to_string(),
    }
}
