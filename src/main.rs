use clap::Parser;
use lc3_vm::emulator;
use lc3_vm::terminal::{EchoOptions, set_terminal_raw};
use std::error::Error;

/// LC-3 virtual machine
#[derive(Parser)]
struct Args {
    /// Object images to load, in order; later images override earlier ones
    #[arg(required = true, value_name = "IMAGE_FILE")]
    images: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut emu = emulator::with_terminal_io();
    for image in &args.images {
        emu.load_image_file(image)?;
    }

    // keystrokes must reach the keyboard device unbuffered and unechoed
    let raw_lock = set_terminal_raw(EchoOptions::EchoOff)?;
    let result = emu.execute();
    drop(raw_lock);
    result.map_err(Into::into)
}
