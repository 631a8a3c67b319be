//! The machine state: memory (with the keyboard device) and registers.

pub mod keyboard;
pub mod memory;
pub mod registers;

pub use keyboard::KeyboardInputProvider;
pub use memory::Memory;
pub use registers::Registers;
