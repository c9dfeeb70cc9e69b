use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use chip8vm::config::{Config, ShiftQuirk, DEFAULT_CYCLES_PER_FRAME};
use chip8vm::display::MonoTermDisplay;
use chip8vm::input::TermInput;
use chip8vm::interpreter::Chip8Interpreter;
use chip8vm::sound::{Mute, SimpleBeep, Sound};

/// Run a CHIP-8 program in the terminal.
///
/// Keys: 1234/qwer/asdf/zxcv are the hex keypad, Backspace restarts, Esc quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// ROM image to load at 0x200
    rom: PathBuf,

    /// instructions executed per 60Hz frame
    #[arg(short, long, default_value_t = DEFAULT_CYCLES_PER_FRAME)]
    cycles: u32,

    /// 8XY6/8XYE shift Vx in place instead of reading Vy
    #[arg(long)]
    shift_in_place: bool,

    /// stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// no beeping
    #[arg(long)]
    mute: bool,

    /// seed for the random number generator
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = Config {
        shift: if args.shift_in_place {
            ShiftQuirk::InPlace
        } else {
            ShiftQuirk::FromVy
        },
        cycles_per_frame: args.cycles,
        seed: args.seed,
    };
    info!("running {} with {:?}", args.rom.display(), config);

    let mut f = File::open(&args.rom)?;
    let mut display = MonoTermDisplay::new()?;
    let mut input = TermInput::new()?;
    let mut sound: Box<dyn Sound> = if args.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };

    let result = {
        let mut interpreter =
            Chip8Interpreter::new(config, &mut display, &mut input, sound.as_mut());
        interpreter.load_program(&mut f)?;
        interpreter.main_loop(args.frames)
    };

    // leave raw mode before printing anything
    drop(input);
    // shove some newlines on stdout to stop the shell messing up the last frame
    for _ in 0..2 {
        println!();
    }
    let frames = result?;
    info!("stopped after {} frames", frames);
    Ok(())
}
