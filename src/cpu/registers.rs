//! LC-3 register file.
//!
//! The LC-3 has:
//! - R0-R7: eight 16-bit general purpose registers
//! - PC: the address of the next instruction
//! - COND: exactly one of the N, Z, P condition flags

use serde::{Serialize, Deserialize};

/// Conventional load origin and reset value of the program counter.
pub const PC_START: u16 = 0x3000;

/// A general purpose register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reg {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

impl Reg {
    /// All registers in index order.
    pub const ALL: [Reg; 8] = [
        Reg::R0, Reg::R1, Reg::R2, Reg::R3,
        Reg::R4, Reg::R5, Reg::R6, Reg::R7,
    ];

    /// Build from a 3-bit register field. Higher bits are ignored.
    #[inline]
    pub fn from_bits(bits: u16) -> Self {
        Self::ALL[(bits & 0x7) as usize]
    }

    /// The register number (0-7).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.index())
    }
}

/// Condition flag held in COND.
///
/// The discriminants are the hardware bit positions so that a BR
/// instruction's `nzp` field can be tested with a single AND.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum CondFlag {
    /// P: last result was positive.
    Pos = 1 << 0,
    /// Z: last result was zero.
    Zro = 1 << 1,
    /// N: last result was negative.
    Neg = 1 << 2,
}

impl CondFlag {
    /// Classify a 16-bit value by its two's-complement sign.
    pub fn from_value(value: u16) -> Self {
        if value == 0 {
            CondFlag::Zro
        } else if value >> 15 == 1 {
            CondFlag::Neg
        } else {
            CondFlag::Pos
        }
    }

    /// The flag as its `nzp` bit.
    #[inline]
    pub fn bits(self) -> u16 {
        self as u16
    }

    /// Single-letter name (n, z or p).
    pub fn letter(self) -> char {
        match self {
            CondFlag::Pos => 'p',
            CondFlag::Zro => 'z',
            CondFlag::Neg => 'n',
        }
    }
}

/// The LC-3 register file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// General purpose registers R0-R7.
    pub gpr: [u16; 8],

    /// Program counter: address of the next instruction to fetch.
    pub pc: u16,

    /// Condition flag, updated by ADD, AND, NOT, LD, LDI, LDR and LEA.
    pub cond: CondFlag,
}

impl Registers {
    /// Create a register file with zeroed registers, `PC = 0x3000` and Z set.
    pub fn new() -> Self {
        Self {
            gpr: [0; 8],
            pc: PC_START,
            cond: CondFlag::Zro,
        }
    }

    /// Reset to the power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read a general purpose register.
    #[inline]
    pub fn get(&self, r: Reg) -> u16 {
        self.gpr[r.index()]
    }

    /// Write a general purpose register. Does not touch COND.
    #[inline]
    pub fn set(&mut self, r: Reg, value: u16) {
        self.gpr[r.index()] = value;
    }

    /// Set COND from the current contents of `r`.
    pub fn update_condition(&mut self, r: Reg) {
        self.cond = CondFlag::from_value(self.get(r));
    }

    /// Write `r` and update COND from the new value.
    pub fn set_with_flags(&mut self, r: Reg, value: u16) {
        self.set(r, value);
        self.update_condition(r);
    }

    /// Increment the program counter by 1 (wrapping).
    /// Returns the old value.
    pub fn advance_pc(&mut self) -> u16 {
        let old = self.pc;
        self.pc = self.pc.wrapping_add(1);
        old
    }

    /// Set the program counter to an absolute address.
    pub fn jump(&mut self, addr: u16) {
        self.pc = addr;
    }

    /// Compute `PC + offset` where `offset` is already sign-extended.
    #[inline]
    pub fn pc_relative(&self, offset: u16) -> u16 {
        self.pc.wrapping_add(offset)
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reg_from_bits() {
        assert_eq!(Reg::from_bits(0), Reg::R0);
        assert_eq!(Reg::from_bits(7), Reg::R7);
        // Only the low three bits count
        assert_eq!(Reg::from_bits(0b1011), Reg::R3);
        assert_eq!(Reg::R5.to_string(), "R5");
    }

    #[test]
    fn test_power_on_state() {
        let regs = Registers::new();
        assert_eq!(regs.pc, 0x3000);
        assert_eq!(regs.gpr, [0; 8]);
        assert_eq!(regs.cond, CondFlag::Zro);
    }

    #[test]
    fn test_update_condition() {
        let mut regs = Registers::new();

        regs.set_with_flags(Reg::R1, 100);
        assert_eq!(regs.cond, CondFlag::Pos);

        regs.set_with_flags(Reg::R1, 0x8000);
        assert_eq!(regs.cond, CondFlag::Neg);

        regs.set_with_flags(Reg::R1, 0);
        assert_eq!(regs.cond, CondFlag::Zro);

        // Plain writes leave flags alone
        regs.set(Reg::R2, 0xFFFF);
        assert_eq!(regs.cond, CondFlag::Zro);
    }

    #[test]
    fn test_advance_pc_wraps() {
        let mut regs = Registers::new();
        regs.pc = 0xFFFF;

        let old = regs.advance_pc();
        assert_eq!(old, 0xFFFF);
        assert_eq!(regs.pc, 0x0000);
    }

    proptest! {
        #[test]
        fn prop_exactly_one_flag_matches_sign(value in any::<u16>()) {
            let mut regs = Registers::new();
            regs.set(Reg::R4, value);
            regs.update_condition(Reg::R4);

            let bits = regs.cond.bits();
            prop_assert_eq!(bits.count_ones(), 1);

            let expected = match (value as i16).cmp(&0) {
                std::cmp::Ordering::Equal => CondFlag::Zro,
                std::cmp::Ordering::Less => CondFlag::Neg,
                std::cmp::Ordering::Greater => CondFlag::Pos,
            };
            prop_assert_eq!(regs.cond, expected);
        }
    }
}
