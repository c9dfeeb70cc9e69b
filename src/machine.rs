use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{Config, ShiftQuirk};
use crate::error::{Chip8Error, Fault};
use crate::framebuffer::Framebuffer;
use crate::instruction::Instruction;
use crate::keypad::{Keypad, KEY_COUNT};
use crate::memory::{Chip8MemoryMap, MemoryMap};
use crate::registers::{Registers, FLAG};
use crate::timer::Timers;

/// whether the machine is fetching instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    Running,
    /// FX0A is waiting; the next key-down lands in this register
    AwaitingKey { target: usize },
    /// a trap stopped the program; only `reset` leaves this state
    Halted {
        fault: Fault,
        pc: u16,
        opcode: Option<u16>,
    },
}

/// what a single `step` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// the framebuffer changed
    Redraw,
    /// nothing was executed
    AwaitingKey,
}

/// summary of one `run_frame`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    pub executed: u32,
    pub redraw: bool,
    pub sound_active: bool,
    pub awaiting_key: bool,
}

/// how the program counter moves after an instruction
enum Flow {
    Next,
    Skip,
    Jump(u16),
    Redraw,
    Wait(usize),
}

impl Flow {
    fn skip_if(cond: bool) -> Self {
        if cond {
            Flow::Skip
        } else {
            Flow::Next
        }
    }
}

/// A complete CHIP-8 machine: memory, registers, timers, display buffer and
/// keypad. The host drives it by calling `step`/`tick_timers` (or
/// `run_frame`) and forwarding key events; it never blocks or schedules
/// itself.
pub struct Machine {
    memory: Chip8MemoryMap,
    regs: Registers,
    timers: Timers,
    screen: Framebuffer,
    keypad: Keypad,
    state: ExecState,
    config: Config,
    rng: StdRng,
}

impl Machine {
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Machine {
            memory: Chip8MemoryMap::new(),
            regs: Registers::new(),
            timers: Timers::default(),
            screen: Framebuffer::new(),
            keypad: Keypad::default(),
            state: ExecState::Running,
            config,
            rng,
        }
    }

    /// back to power-on state: font loaded, program area cleared
    pub fn reset(&mut self) {
        debug!("reset");
        self.memory = Chip8MemoryMap::new();
        self.regs = Registers::new();
        self.timers = Timers::default();
        self.screen.clear();
        self.keypad.clear();
        self.state = ExecState::Running;
    }

    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        self.memory.load_program(program)?;
        debug!("loaded {} byte program", program.len());
        Ok(())
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn timers(&self) -> Timers {
        self.timers
    }

    pub fn screen(&self) -> &Framebuffer {
        &self.screen
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn state(&self) -> ExecState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sound_active(&self) -> bool {
        self.timers.sound_active()
    }

    /// one 60Hz timer tick; runs whatever the execution state
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    /// A key went down. If FX0A is waiting, the key is written to its target
    /// register and the machine runs again from the next `step`.
    pub fn key_down(&mut self, key: u8) -> Result<(), Chip8Error> {
        if key >= KEY_COUNT {
            return Err(Chip8Error::InvalidKey(key));
        }
        self.keypad.press(key);
        if let ExecState::AwaitingKey { target } = self.state {
            debug!("key {:x} resolves wait into V{:X}", key, target);
            self.regs.v[target] = key;
            self.state = ExecState::Running;
        }
        Ok(())
    }

    pub fn key_up(&mut self, key: u8) -> Result<(), Chip8Error> {
        if key >= KEY_COUNT {
            return Err(Chip8Error::InvalidKey(key));
        }
        self.keypad.release(key);
        Ok(())
    }

    /// Run up to `cycles_per_frame` instructions, then service the timers
    /// once. Stepping stops early if the program starts waiting for a key.
    pub fn run_frame(&mut self) -> Result<Frame, Chip8Error> {
        let mut frame = Frame::default();
        for _ in 0..self.config.cycles_per_frame {
            match self.step()? {
                Step::Continue => frame.executed += 1,
                Step::Redraw => {
                    frame.executed += 1;
                    frame.redraw = true;
                }
                Step::AwaitingKey => break,
            }
        }
        self.tick_timers();
        frame.sound_active = self.sound_active();
        frame.awaiting_key = matches!(self.state, ExecState::AwaitingKey { .. });
        Ok(frame)
    }

    /// fetch, decode and execute one instruction
    pub fn step(&mut self) -> Result<Step, Chip8Error> {
        match self.state {
            ExecState::Running => {}
            ExecState::AwaitingKey { .. } => return Ok(Step::AwaitingKey),
            ExecState::Halted { fault, pc, opcode } => {
                return Err(Chip8Error::Trap { fault, pc, opcode })
            }
        }

        let pc = self.regs.pc;
        let opcode = match self.memory.get_word(pc) {
            Ok(op) => op,
            Err(fault) => return Err(self.halt(fault, pc, None)),
        };
        let flow = match Instruction::decode(opcode) {
            Some(instr) => {
                trace!("{:03x}: {:04X} {:?}", pc, opcode, instr);
                self.execute(instr)
            }
            None => Err(Fault::UnknownOpcode),
        };
        let flow = match flow {
            Ok(flow) => flow,
            Err(fault) => return Err(self.halt(fault, pc, Some(opcode))),
        };

        match flow {
            Flow::Next => self.regs.pc = pc + 2,
            Flow::Skip => self.regs.pc = pc + 4,
            Flow::Redraw => {
                self.regs.pc = pc + 2;
                return Ok(Step::Redraw);
            }
            Flow::Jump(target) => {
                if target % 2 != 0 {
                    return Err(self.halt(Fault::MisalignedJump(target), pc, Some(opcode)));
                }
                self.regs.pc = target;
            }
            Flow::Wait(target) => {
                self.regs.pc = pc + 2;
                self.state = ExecState::AwaitingKey { target };
                debug!("waiting for key into V{:X}", target);
            }
        }
        Ok(Step::Continue)
    }

    fn halt(&mut self, fault: Fault, pc: u16, opcode: Option<u16>) -> Chip8Error {
        warn!("halted: {} at {:03x}", fault, pc);
        self.state = ExecState::Halted { fault, pc, opcode };
        Chip8Error::Trap { fault, pc, opcode }
    }

    fn execute(&mut self, instr: Instruction) -> Result<Flow, Fault> {
        use Instruction::*;

        let v = &mut self.regs.v;
        let flow = match instr {
            ClearScreen => {
                self.screen.clear();
                Flow::Redraw
            }
            Return => Flow::Jump(self.regs.pop()?),
            Jump(addr) => Flow::Jump(addr),
            Call(addr) => {
                if addr % 2 != 0 {
                    return Err(Fault::MisalignedJump(addr));
                }
                self.regs.push(self.regs.pc + 2)?;
                Flow::Jump(addr)
            }
            SkipIfEqImm(x, nn) => Flow::skip_if(v[x] == nn),
            SkipIfNeImm(x, nn) => Flow::skip_if(v[x] != nn),
            SkipIfEq(x, y) => Flow::skip_if(v[x] == v[y]),
            SkipIfNe(x, y) => Flow::skip_if(v[x] != v[y]),
            LoadImm(x, nn) => {
                v[x] = nn;
                Flow::Next
            }
            AddImm(x, nn) => {
                v[x] = v[x].wrapping_add(nn);
                Flow::Next
            }
            Move(x, y) => {
                v[x] = v[y];
                Flow::Next
            }
            Or(x, y) => {
                v[x] |= v[y];
                Flow::Next
            }
            And(x, y) => {
                v[x] &= v[y];
                Flow::Next
            }
            Xor(x, y) => {
                v[x] ^= v[y];
                Flow::Next
            }
            // the flag is written last, so it wins when x is VF
            Add(x, y) => {
                let (sum, carry) = v[x].overflowing_add(v[y]);
                v[x] = sum;
                v[FLAG] = carry as u8;
                Flow::Next
            }
            Sub(x, y) => {
                let no_borrow = v[x] >= v[y];
                v[x] = v[x].wrapping_sub(v[y]);
                v[FLAG] = no_borrow as u8;
                Flow::Next
            }
            SubReversed(x, y) => {
                let no_borrow = v[y] >= v[x];
                v[x] = v[y].wrapping_sub(v[x]);
                v[FLAG] = no_borrow as u8;
                Flow::Next
            }
            ShiftRight(x, y) => {
                let operand = self.shift_operand(x, y);
                let v = &mut self.regs.v;
                v[x] = operand >> 1;
                v[FLAG] = operand & 1;
                Flow::Next
            }
            ShiftLeft(x, y) => {
                let operand = self.shift_operand(x, y);
                let v = &mut self.regs.v;
                v[x] = operand << 1;
                v[FLAG] = operand >> 7;
                Flow::Next
            }
            LoadIndex(addr) => {
                self.regs.i = addr;
                Flow::Next
            }
            JumpOffset(addr) => Flow::Jump(addr + v[0] as u16),
            Random(x, nn) => {
                v[x] = self.rng.gen::<u8>() & nn;
                Flow::Next
            }
            Draw(x, y, n) => {
                let (col, row) = (v[x] as usize, v[y] as usize);
                let sprite = self.memory.get_ro_slice(self.regs.i, n as usize)?;
                let collided = self.screen.draw_sprite(row, col, sprite);
                self.regs.v[FLAG] = collided as u8;
                Flow::Redraw
            }
            SkipIfKey(x) => Flow::skip_if(self.keypad.is_pressed(v[x])),
            SkipIfNotKey(x) => Flow::skip_if(!self.keypad.is_pressed(v[x])),
            ReadDelay(x) => {
                v[x] = self.timers.delay;
                Flow::Next
            }
            WaitKey(x) => Flow::Wait(x),
            SetDelay(x) => {
                self.timers.delay = v[x];
                Flow::Next
            }
            SetSound(x) => {
                self.timers.sound = v[x];
                Flow::Next
            }
            // VF is left alone; an I past 0xFFF faults when it's next used
            AddIndex(x) => {
                self.regs.i = self.regs.i.wrapping_add(v[x] as u16);
                Flow::Next
            }
            Glyph(x) => {
                self.regs.i = Chip8MemoryMap::glyph_addr(v[x]);
                Flow::Next
            }
            StoreBcd(x) => {
                let value = v[x];
                let digits = [value / 100, value / 10 % 10, value % 10];
                self.memory.write(&digits, self.regs.i)?;
                Flow::Next
            }
            StoreRegs(x) => {
                self.memory.write(&v[..=x], self.regs.i)?;
                self.regs.i += x as u16 + 1;
                Flow::Next
            }
            LoadRegs(x) => {
                let src = self.memory.get_ro_slice(self.regs.i, x + 1)?;
                v[..=x].copy_from_slice(src);
                self.regs.i += x as u16 + 1;
                Flow::Next
            }
        };
        Ok(flow)
    }

    fn shift_operand(&self, x: usize, y: usize) -> u8 {
        match self.config.shift {
            ShiftQuirk::FromVy => self.regs.v[y],
            ShiftQuirk::InPlace => self.regs.v[x],
        }
    }
}
