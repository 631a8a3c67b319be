//! The interpreter driver: fetch at PC, increment, dispatch.

pub mod instruction;
pub mod opcodes;
#[cfg(test)]
pub mod test_helpers;
pub mod trap_routines;

use crate::errors::{ExecutionError, LoadImageError};
use crate::hardware::keyboard::{KeyboardInputProvider, TerminalInputProvider};
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use instruction::Instruction;
use std::fs::File;
use std::io::{BufReader, Stdout, Write, stdout};
use std::ops::ControlFlow;
use std::path::Path;

/// The public facing emulator used to run LC-3 programs.
///
/// Owns the machine state (memory with the keyboard device, registers) and
/// the output sink. `K` and `W` are the two halves of the host I/O port;
/// the defaults talk to the controlling terminal.
pub struct Emulator<K: KeyboardInputProvider, W: Write> {
    pub(crate) memory: Memory<K>,
    pub(crate) registers: Registers,
    pub(crate) output: W,
}

impl<K: KeyboardInputProvider, W: Write> Emulator<K, W> {
    /// A machine with zeroed memory and registers, `PC = 0x3000`, flag Z.
    pub fn new(keyboard: K, output: W) -> Self {
        Self {
            memory: Memory::new(keyboard),
            registers: Registers::new(),
            output,
        }
    }

    /// Loads an object image from a byte stream. May be called repeatedly;
    /// later images override earlier ones at overlapping addresses. Returns
    /// the image's origin.
    ///
    /// # Errors
    /// - the stream is shorter than the origin word or fails to read
    pub fn load_image(&mut self, reader: impl std::io::Read) -> Result<u16, LoadImageError> {
        self.memory.load_image(reader)
    }

    /// Loads an object image from a file.
    ///
    /// # Errors
    /// - the file cannot be opened, is shorter than the origin word, or
    ///   fails to read
    pub fn load_image_file(&mut self, path: impl AsRef<Path>) -> Result<u16, LoadImageError> {
        let file = File::open(&path).map_err(|e| LoadImageError::ImageNotLoadable {
            file: path.as_ref().display().to_string(),
            message: e.to_string(),
        })?;
        self.load_image(BufReader::new(file))
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Puts PC, COND and the general registers back to their power-on values
    /// so the loaded image can run again.
    pub fn reset_registers(&mut self) {
        self.registers = Registers::new();
    }

    /// Runs the fetch-decode-execute loop until a HALT trap.
    ///
    /// The PC is incremented as part of the fetch, so PC-relative operands
    /// are always based past the current instruction. Instruction fetch goes
    /// through [`Memory::read`] and thus polls the keyboard when PC crosses
    /// the KBSR address.
    ///
    /// # Errors
    /// - a reserved instruction (RES, RTI) is executed
    /// - host I/O fails
    pub fn execute(&mut self) -> Result<(), ExecutionError> {
        loop {
            let bits = self.memory.read(self.registers.pc().as_binary())?;
            self.registers.inc_pc();
            let i = Instruction::from(bits);
            match i.op_code() {
                opcodes::OP_BR => opcodes::br(i, &mut self.registers),
                opcodes::OP_ADD => opcodes::add(i, &mut self.registers),
                opcodes::OP_LD => opcodes::ld(i, &mut self.registers, &mut self.memory)?,
                opcodes::OP_ST => opcodes::st(i, &self.registers, &mut self.memory),
                opcodes::OP_JSR => opcodes::jsr(i, &mut self.registers),
                opcodes::OP_AND => opcodes::and(i, &mut self.registers),
                opcodes::OP_LDR => opcodes::ldr(i, &mut self.registers, &mut self.memory)?,
                opcodes::OP_STR => opcodes::str(i, &self.registers, &mut self.memory),
                opcodes::OP_NOT => opcodes::not(i, &mut self.registers),
                opcodes::OP_LDI => opcodes::ldi(i, &mut self.registers, &mut self.memory)?,
                opcodes::OP_STI => opcodes::sti(i, &self.registers, &mut self.memory)?,
                opcodes::OP_JMP => opcodes::jmp(i, &mut self.registers),
                opcodes::OP_LEA => opcodes::lea(i, &mut self.registers),
                opcodes::OP_TRAP => {
                    match trap_routines::dispatch(
                        i,
                        &mut self.registers,
                        &mut self.memory,
                        &mut self.output,
                    ) {
                        ControlFlow::Continue(()) => {}
                        ControlFlow::Break(result) => return result,
                    }
                }
                opcodes::OP_RTI | opcodes::OP_RES => {
                    return Err(ExecutionError::ReservedInstructionFound(i.op_code()));
                }
                // op_code is 4 bits; the arms above cover all 16 values
                _ => unreachable!("opcode out of 4-bit range"),
            }
        }
    }
}

/// An emulator attached to the controlling terminal: crossterm keyboard
/// events in, stdout out.
#[must_use]
pub fn with_terminal_io() -> Emulator<TerminalInputProvider, Stdout> {
    Emulator::new(TerminalInputProvider::new(), stdout())
}

/// Builds a terminal-attached emulator and loads the image at `path`.
///
/// # Errors
/// - see [`Emulator::load_image_file`]
pub fn from_image_file(
    path: impl AsRef<Path>,
) -> Result<Emulator<TerminalInputProvider, Stdout>, LoadImageError> {
    let mut emu = with_terminal_io();
    emu.load_image_file(path)?;
    Ok(emu)
}

#[expect(clippy::unusual_byte_groupings)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::test_helpers::FakeEmulator;
    use crate::hardware::registers::{ConditionFlag, from_binary};
    use googletest::prelude::*;

    const HALT: u16 = 0xF025;

    #[gtest]
    pub fn test_execute_halt_program() {
        let mut emu = FakeEmulator::new(&[HALT]);
        emu.execute().unwrap();
        expect_that!(emu.output(), eq("HALT\n"));
        // PC was incremented past the trap before dispatch
        expect_that!(emu.registers().pc(), eq(from_binary(0x3001)));
        expect_that!(emu.registers().get(7), eq(from_binary(0x3001)));
    }
    #[gtest]
    pub fn test_execute_stops_at_halt() {
        // the ADD after HALT must never run
        let mut emu = FakeEmulator::new(&[HALT, 0b0001_001_001_1_00001]);
        emu.execute().unwrap();
        expect_that!(emu.registers().get(1), eq(from_binary(0)));
    }
    #[gtest]
    pub fn test_execute_add_then_halt() {
        // ADD R1, R1, #1 twice
        let program = [0b0001_001_001_1_00001, 0b0001_001_001_1_00001, HALT];
        let mut emu = FakeEmulator::new(&program);
        emu.execute().unwrap();
        expect_that!(emu.registers().get(1), eq(from_binary(2)));
        expect_that!(
            emu.registers().get_conditional_register(),
            eq(ConditionFlag::Pos)
        );
    }
    #[gtest]
    pub fn test_execute_ldi_indirect_load() {
        // LDI R0 via the pointer at 0x3003 (PC 0x3001 + offset 2)
        let program = [0xA002, HALT, 0x0000, 0x4000];
        let mut emu = FakeEmulator::new(&program);
        let (_regs, mem, _out) = emu.get_parts();
        mem.write(0x4000, 0x1234);
        emu.execute().unwrap();
        expect_that!(emu.registers().get(0), eq(from_binary(0x1234)));
        expect_that!(
            emu.registers().get_conditional_register(),
            eq(ConditionFlag::Pos)
        );
    }
    #[gtest]
    pub fn test_execute_jsr_and_ret() {
        // JSR +2 to the RET at 0x3003, which returns to the HALT at 0x3001
        let program = [0x4802, HALT, 0x0000, 0b1100_000_111_000000];
        let mut emu = FakeEmulator::new(&program);
        emu.execute().unwrap();
        expect_that!(emu.registers().get(7), eq(from_binary(0x3001)));
        expect_that!(emu.output(), eq("HALT\n"));
    }
    #[gtest]
    pub fn test_execute_branch_loop_counts_down() {
        // R1 = 3; loop: ADD R1, R1, #-1; BRp loop; HALT
        let program = [
            0b0001_001_001_1_00011, // ADD R1, R1, #3
            0b0001_001_001_1_11111, // ADD R1, R1, #-1
            0b0000_001_111111110,   // BRp -2
            HALT,
        ];
        let mut emu = FakeEmulator::new(&program);
        emu.execute().unwrap();
        expect_that!(emu.registers().get(1), eq(from_binary(0)));
        expect_that!(
            emu.registers().get_conditional_register(),
            eq(ConditionFlag::Zero)
        );
    }
    #[gtest]
    pub fn test_execute_getc_out_echo_program() {
        // GETC; OUT; HALT
        let program = [0xF020, 0xF021, HALT];
        let mut emu = FakeEmulator::new(&program);
        emu.add_stdin_input(b"a");
        emu.execute().unwrap();
        expect_that!(emu.output(), eq("aHALT\n"));
        expect_that!(emu.registers().get(0), eq(from_binary(u16::from(b'a'))));
    }
    #[gtest]
    pub fn test_execute_reserved_opcodes_abort() {
        let mut emu = FakeEmulator::new(&[0xD000]);
        expect_that!(
            emu.execute().unwrap_err(),
            eq(&ExecutionError::ReservedInstructionFound(0b1101))
        );
        let mut emu = FakeEmulator::new(&[0x8000]);
        expect_that!(
            emu.execute().unwrap_err(),
            eq(&ExecutionError::ReservedInstructionFound(0b1000))
        );
    }
    #[gtest]
    pub fn test_execute_unknown_trap_vector_continues() {
        // TRAP 0xFF is ignored, the HALT after it still runs
        let program = [0xF0FF, HALT];
        let mut emu = FakeEmulator::new(&program);
        emu.execute().unwrap();
        expect_that!(emu.output(), eq("HALT\n"));
    }
    #[gtest]
    pub fn test_reset_registers_allows_rerun() {
        let program = [0b0001_001_001_1_00001, HALT];
        let mut emu = FakeEmulator::new(&program);
        emu.execute().unwrap();
        emu.reset_registers();
        emu.execute().unwrap();
        expect_that!(emu.registers().get(1), eq(from_binary(1)));
        expect_that!(emu.output(), eq("HALT\nHALT\n"));
    }
    #[gtest]
    pub fn test_later_image_overrides_loaded_program() {
        let mut emu = FakeEmulator::new(&[0xD000]);
        let (_regs, mem, _out) = emu.get_parts();
        // replace the reserved instruction with a clean HALT
        mem.load_image([0x30u8, 0x00, 0xF0, 0x25].as_slice()).unwrap();
        emu.execute().unwrap();
        expect_that!(emu.output(), eq("HALT\n"));
    }
    #[gtest]
    pub fn test_execute_keyboard_polling_program() {
        // LDI R0, KBSR until ready; LDI R0, KBDR; OUT; HALT
        let program = [
            0xA004, // LDI R0, 0x3005 -> KBSR
            0b0000_010_111111110, // BRz -2
            0xA003, // LDI R0, 0x3006 -> KBDR
            0xF021, // OUT
            HALT,
            0xFE00, // pointer to KBSR
            0xFE02, // pointer to KBDR
        ];
        let mut emu = FakeEmulator::new(&program);
        emu.add_stdin_input(b"y");
        emu.execute().unwrap();
        expect_that!(emu.output(), eq("yHALT\n"));
    }
}
