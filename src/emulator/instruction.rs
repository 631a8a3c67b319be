use crate::numbers;
use std::fmt::{Debug, Formatter};

/// Wrapper for an LC-3 u16 instruction.
/// The opcode always lives in bits 15..12; the remaining fields are
/// per-opcode and exposed through the named accessors.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction(u16);

impl Instruction {
    /// Gives the value of only the specified bit range.
    ///
    /// # Parameters
    /// - `from`: starting index
    /// - `to`: end index (inclusive), mut be greater or equal to `from`
    ///
    /// # Panics
    /// - asserts that to is greater or equal from and both are valid indexes
    #[must_use]
    pub fn get_bit_range(self, from: u8, to: u8) -> u16 {
        debug_assert!(
            to >= from,
            "wrong direction of from: {from:?} and to: {to:?}"
        );
        debug_assert!(
            (00..u16::BITS).contains(&u32::from(to)),
            "index: {to:?} to u16 is greater than maximum value {:?}",
            u16::BITS - 1
        );
        (self.0 >> from) & ((0b1 << (to - from + 1)) - 1)
    }
    /// Gives the value of only the specified bit range and converts that to u8.
    /// See [`Instruction::get_bit_range()`]
    /// # Panics
    /// - value does not fit into u8 with message from `expect`
    #[must_use]
    pub fn get_bit_range_u8(self, from: u8, to: u8, expect: &str) -> u8 {
        u8::try_from(self.get_bit_range(from, to)).expect(expect)
    }
    #[must_use]
    pub fn get_bit(self, index: u8) -> bool {
        self.get_bit_range(index, index) & 1 != 0
    }
    #[must_use]
    pub fn op_code(self) -> u8 {
        self.get_bit_range_u8(12, 15, "Error parsing op_code")
    }
    #[must_use]
    pub fn dr_number(self) -> u8 {
        self.get_bit_range_u8(9, 11, "Error parsing dr")
    }
    #[must_use]
    pub fn sr1_number(self) -> u8 {
        self.get_bit_range_u8(6, 8, "Error parsing sr1")
    }
    #[must_use]
    pub fn sr2_number(self) -> u8 {
        self.get_bit_range_u8(0, 2, "Error parsing sr2")
    }
    /// Base register of JMP, JSRR, LDR and STR; shares bits 8..6 with SR1.
    #[must_use]
    pub fn base_register_number(self) -> u8 {
        self.get_bit_range_u8(6, 8, "Error parsing base register")
    }
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.get_bit(5)
    }
    /// Sign-extended imm5 operand of ADD and AND.
    #[must_use]
    pub fn get_immediate(self) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, 4), 5)
    }
    /// Sign-extended PC-relative or base-relative offset in the low `len`
    /// bits. The raw two's-complement word is returned so callers combine it
    /// with `wrapping_add`.
    #[must_use]
    pub fn pc_offset(self, len: u8) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, len - 1), len)
    }
    /// JSR variant selector: offset form when set, base-register form when
    /// clear.
    #[must_use]
    pub fn is_long_jump(self) -> bool {
        self.get_bit(11)
    }
    /// The `nzp` mask of a BR instruction.
    #[must_use]
    pub fn condition_mask(self) -> u16 {
        self.get_bit_range(9, 11)
    }
    /// The service routine selector of a TRAP instruction.
    #[must_use]
    pub fn trap_vector(self) -> u16 {
        self.get_bit_range(0, 7)
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Op: {:04b}, Bits: {:#018b}", self.op_code(), self.0)
    }
}

impl From<u16> for Instruction {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    pub fn test_instr_get_bit_range_valid() {
        let sut = Instruction::from(0b1010_101_001010101);
        expect_that!(sut.op_code(), eq(0b1010));
        expect_that!(sut.dr_number(), eq(0b101));
        expect_that!(sut.pc_offset(9), eq(0b0_0101_0101));

        // Add: DR: 3, SR1: 2, Immediate: false, SR2: 1
        let sut = Instruction::from(0b0001_011_010_0_00_001);
        expect_that!(sut.op_code(), eq(1));
        expect_that!(sut.dr_number(), eq(3));
        expect_that!(sut.sr1_number(), eq(2));
        expect_that!(sut.sr2_number(), eq(1));
        expect_that!(sut.is_immediate(), eq(false));

        // Add: DR: 7, SR1: 0, Immediate: true, imm5: 14
        let sut = Instruction::from(0b0001_111_000_1_01110);
        expect_that!(sut.op_code(), eq(1));
        expect_that!(sut.dr_number(), eq(7));
        expect_that!(sut.sr1_number(), eq(0));
        expect_that!(sut.is_immediate(), eq(true));
        expect_that!(sut.get_immediate(), eq(14));
    }
    #[gtest]
    pub fn test_instr_negative_fields_sign_extend() {
        // Add: DR: 1, SR1: 1, Immediate: true, imm5: -1
        let sut = Instruction::from(0b0001_001_001_1_11111);
        expect_that!(sut.get_immediate(), eq(0xFFFF));
        // BR n z p with offset -2
        let sut = Instruction::from(0b0000_111_111111110);
        expect_that!(sut.condition_mask(), eq(0b111));
        expect_that!(sut.pc_offset(9), eq(0xFFFE));
    }
    #[gtest]
    pub fn test_instr_jump_fields() {
        // JSR long with offset 2
        let sut = Instruction::from(0b0100_1_00000000010);
        expect_that!(sut.is_long_jump(), eq(true));
        expect_that!(sut.pc_offset(11), eq(2));
        // JSRR via R6
        let sut = Instruction::from(0b0100_0_00_110_000000);
        expect_that!(sut.is_long_jump(), eq(false));
        expect_that!(sut.base_register_number(), eq(6));
    }
    #[gtest]
    pub fn test_instr_trap_vector() {
        let sut = Instruction::from(0xF025);
        expect_that!(sut.op_code(), eq(0b1111));
        expect_that!(sut.trap_vector(), eq(0x25));
    }
    #[gtest]
    #[should_panic(expected = "wrong direction of from: 2 and to: 1")]
    pub fn test_instr_get_bit_range_wrong_order() {
        let sut = Instruction::from(0b1010_101_101010101);
        let _ = sut.get_bit_range(2, 1);
    }
    #[gtest]
    #[should_panic(expected = "index: 16 to u16 is greater than maximum value 15")]
    pub fn test_instr_get_bit_range_index_too_large() {
        let sut = Instruction::from(0b1010_101_101010101);
        let _ = sut.get_bit_range(2, 16);
    }
}
