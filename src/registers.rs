use crate::error::Fault;
use crate::memory::CHIP8_PROGRAM_ADDR;

/// the COSMAC VIP had room for exactly this many return addresses
pub const STACK_DEPTH: usize = 16;

/// VF doubles as carry / borrow / collision output
pub const FLAG: usize = 0xf;

/// V0-VF, the index register I, the program counter and the call stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    stack: Vec<u16>,
}

impl Registers {
    pub fn new() -> Self {
        Registers {
            v: [0; 16],
            i: 0,
            pc: CHIP8_PROGRAM_ADDR,
            stack: Vec::with_capacity(STACK_DEPTH),
        }
    }

    pub fn push(&mut self, addr: u16) -> Result<(), Fault> {
        if self.stack.len() == STACK_DEPTH {
            return Err(Fault::StackOverflow);
        }
        self.stack.push(addr);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, Fault> {
        self.stack.pop().ok_or(Fault::StackUnderflow)
    }

    pub fn stack(&self) -> &[u16] {
        &self.stack
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
