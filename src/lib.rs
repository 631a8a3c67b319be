//! # LC-3 Virtual Machine.
//!
//! `lc3-vm` interprets programs for the LC-3 (Little Computer 3), a 16-bit
//! word-addressed educational architecture. It loads big-endian object
//! images into a 65,536-word memory, starts at `0x3000` and runs the
//! fetch-decode-execute loop until the program issues a HALT trap.
//!
//! Keyboard input and console output are injected behind the
//! [`hardware::keyboard::KeyboardInputProvider`] trait and any
//! [`std::io::Write`] sink, so programs can run against the real terminal or
//! against scripted I/O.
//!
//! # Example
//! ```
//! use lc3_vm::emulator::Emulator;
//! use lc3_vm::hardware::keyboard::ChannelInputProvider;
//! use std::sync::mpsc;
//!
//! let (_keys, receiver) = mpsc::channel();
//! let mut emu = Emulator::new(ChannelInputProvider::new(receiver), Vec::new());
//! // origin 0x3000 followed by a single HALT trap
//! emu.load_image([0x30u8, 0x00, 0xF0, 0x25].as_slice()).unwrap();
//! emu.execute().unwrap();
//! ```
//! # Errors
//! - Image cannot be read or is missing its origin word: [`errors::LoadImageError`]
//! - Program executes a reserved instruction or host I/O fails:
//!   [`errors::ExecutionError`]

pub mod emulator;
pub mod errors;
pub mod hardware;
pub mod numbers;
pub mod terminal;

pub use emulator::Emulator;
