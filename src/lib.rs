//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the machine core (`machine` and the component modules under it) does no
//!   I/O and never schedules itself; a host calls in once per tick
//! * timers run at a fixed 60Hz, one tick per frame; instruction throughput
//!   is a separate knob (`Config::cycles_per_frame`)
//! * abstract display, input and sound behind traits so alternatives plug in;
//!   the terminal implementations use TUI and crossterm
//! * FX0A is a machine state, not a blocking read: `step` does nothing until
//!   a key-down arrives through `Machine::key_down`
//! * program errors (bad address, stack over/underflow, unknown opcode) halt
//!   the machine and are reported with the pc and opcode
//!
//! Model
//!
//! Machine
//!  |-- memory      4K, font at 0x000, program at 0x200
//!  |-- registers   V0-VF, I, pc, 16-deep call stack
//!  |-- timer       delay + sound
//!  |-- framebuffer 64x32, XOR sprites, wraps at the edges
//!  |-- keypad      16 keys held / not held
//!  `-- instruction decoded up front, then executed
//!
//! Chip8Interpreter(display, input, sound)
//!  |-- owns a Machine and the loaded ROM
//!  `-- main loop, every 1/60s:
//!       |-- input.poll_events() -> key_down / key_up / reset / quit
//!       |-- machine.run_frame()  -> N steps, one timer tick
//!       |-- display.draw(frame)  if anything drew
//!       `-- sound.set_active(sound timer > 0)
pub mod config;
pub mod display;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod keypad;
pub mod machine;
pub mod memory;
pub mod registers;
pub mod sound;
pub mod timer;

pub use config::{Config, ShiftQuirk};
pub use error::{Chip8Error, Fault};
pub use machine::{ExecState, Frame, Machine, Step};
