//! Instruction decoder for the LC-3.
//!
//! Every instruction is one 16-bit word. Bits 15-12 hold the opcode and
//! the remaining twelve bits are reinterpreted per opcode. All sixteen
//! opcode values decode to something, so decoding cannot fail.

use crate::bits::{bit, field, signed_field};
use crate::cpu::registers::Reg;
use serde::{Serialize, Deserialize};

/// The sixteen 4-bit opcodes, in encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    Br = 0,
    Add,
    Ld,
    St,
    Jsr,
    And,
    Ldr,
    Str,
    Rti,
    Not,
    Ldi,
    Sti,
    Jmp,
    Res,
    Lea,
    Trap,
}

impl Opcode {
    const ALL: [Opcode; 16] = [
        Opcode::Br, Opcode::Add, Opcode::Ld, Opcode::St,
        Opcode::Jsr, Opcode::And, Opcode::Ldr, Opcode::Str,
        Opcode::Rti, Opcode::Not, Opcode::Ldi, Opcode::Sti,
        Opcode::Jmp, Opcode::Res, Opcode::Lea, Opcode::Trap,
    ];

    /// Extract the opcode from bits 15-12 of an instruction word.
    #[inline]
    pub fn from_word(word: u16) -> Self {
        Self::ALL[(word >> 12) as usize]
    }

    /// The 4-bit encoding.
    #[inline]
    pub fn bits(self) -> u16 {
        self as u16
    }
}

/// Second operand of ADD and AND.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// SR2, bits 2-0 (mode bit 5 clear).
    Reg(Reg),
    /// imm5 sign-extended to 16 bits (mode bit 5 set).
    Imm(u16),
}

/// Target of JSR/JSRR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JsrTarget {
    /// JSR: PC-relative, offset11 sign-extended (bit 11 set).
    Offset(u16),
    /// JSRR: absolute address in a base register (bit 11 clear).
    Base(Reg),
}

/// A decoded LC-3 instruction.
///
/// Offsets are stored already sign-extended to 16 bits, so applying one is
/// a single wrapping add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    // ==================== Operate ====================

    /// DR := SR1 + operand
    Add { dr: Reg, sr1: Reg, operand: Operand },

    /// DR := SR1 & operand
    And { dr: Reg, sr1: Reg, operand: Operand },

    /// DR := !SR
    Not { dr: Reg, sr: Reg },

    // ==================== Data Movement ====================

    /// DR := mem[PC + offset9]
    Ld { dr: Reg, offset: u16 },

    /// DR := mem[mem[PC + offset9]]
    Ldi { dr: Reg, offset: u16 },

    /// DR := mem[BaseR + offset6]
    Ldr { dr: Reg, base: Reg, offset: u16 },

    /// DR := PC + offset9
    Lea { dr: Reg, offset: u16 },

    /// mem[PC + offset9] := SR
    St { sr: Reg, offset: u16 },

    /// mem[mem[PC + offset9]] := SR
    Sti { sr: Reg, offset: u16 },

    /// mem[BaseR + offset6] := SR
    Str { sr: Reg, base: Reg, offset: u16 },

    // ==================== Control ====================

    /// if (nzp & COND) != 0 then PC := PC + offset9
    Br { nzp: u16, offset: u16 },

    /// PC := BaseR (RET when BaseR is R7)
    Jmp { base: Reg },

    /// R7 := PC, then PC := target
    Jsr { target: JsrTarget },

    /// System call through the 8-bit trap vector
    Trap { vector: u8 },

    // ==================== Unused ====================

    /// Return from interrupt; this machine has no interrupts.
    Rti,

    /// Reserved opcode 13.
    Res,
}

impl Instruction {
    /// The opcode this instruction encodes to.
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Add { .. } => Opcode::Add,
            Instruction::And { .. } => Opcode::And,
            Instruction::Not { .. } => Opcode::Not,
            Instruction::Ld { .. } => Opcode::Ld,
            Instruction::Ldi { .. } => Opcode::Ldi,
            Instruction::Ldr { .. } => Opcode::Ldr,
            Instruction::Lea { .. } => Opcode::Lea,
            Instruction::St { .. } => Opcode::St,
            Instruction::Sti { .. } => Opcode::Sti,
            Instruction::Str { .. } => Opcode::Str,
            Instruction::Br { .. } => Opcode::Br,
            Instruction::Jmp { .. } => Opcode::Jmp,
            Instruction::Jsr { .. } => Opcode::Jsr,
            Instruction::Trap { .. } => Opcode::Trap,
            Instruction::Rti => Opcode::Rti,
            Instruction::Res => Opcode::Res,
        }
    }
}

#[inline]
fn dr(word: u16) -> Reg {
    Reg::from_bits(field(word, 9, 3))
}

#[inline]
fn sr1(word: u16) -> Reg {
    Reg::from_bits(field(word, 6, 3))
}

#[inline]
fn operand(word: u16) -> Operand {
    if bit(word, 5) {
        Operand::Imm(signed_field(word, 5))
    } else {
        Operand::Reg(Reg::from_bits(field(word, 0, 3)))
    }
}

/// Decode a 16-bit instruction word.
///
/// Field layout (bit ranges inclusive):
/// - 15-12: opcode
/// - 11-9: DR / SR / nzp
/// - 8-6: SR1 / BaseR
/// - 5: immediate-mode flag (ADD, AND)
/// - low 5, 6, 9 or 11 bits: two's-complement offset or immediate
pub fn decode(word: u16) -> Instruction {
    match Opcode::from_word(word) {
        Opcode::Add => Instruction::Add { dr: dr(word), sr1: sr1(word), operand: operand(word) },
        Opcode::And => Instruction::And { dr: dr(word), sr1: sr1(word), operand: operand(word) },
        Opcode::Not => Instruction::Not { dr: dr(word), sr: sr1(word) },
        Opcode::Ld => Instruction::Ld { dr: dr(word), offset: signed_field(word, 9) },
        Opcode::Ldi => Instruction::Ldi { dr: dr(word), offset: signed_field(word, 9) },
        Opcode::Ldr => Instruction::Ldr { dr: dr(word), base: sr1(word), offset: signed_field(word, 6) },
        Opcode::Lea => Instruction::Lea { dr: dr(word), offset: signed_field(word, 9) },
        Opcode::St => Instruction::St { sr: dr(word), offset: signed_field(word, 9) },
        Opcode::Sti => Instruction::Sti { sr: dr(word), offset: signed_field(word, 9) },
        Opcode::Str => Instruction::Str { sr: dr(word), base: sr1(word), offset: signed_field(word, 6) },
        Opcode::Br => Instruction::Br { nzp: field(word, 9, 3), offset: signed_field(word, 9) },
        Opcode::Jmp => Instruction::Jmp { base: sr1(word) },
        Opcode::Jsr => {
            let target = if bit(word, 11) {
                JsrTarget::Offset(signed_field(word, 11))
            } else {
                JsrTarget::Base(sr1(word))
            };
            Instruction::Jsr { target }
        }
        Opcode::Trap => Instruction::Trap { vector: field(word, 0, 8) as u8 },
        Opcode::Rti => Instruction::Rti,
        Opcode::Res => Instruction::Res,
    }
}

/// Encode an instruction back to a 16-bit word.
///
/// Offsets are truncated to their field width; unused bits are zero.
pub fn encode(instr: &Instruction) -> u16 {
    let op = instr.opcode().bits() << 12;
    let dr = |r: Reg| (r.index() as u16) << 9;
    let sr1 = |r: Reg| (r.index() as u16) << 6;
    let operand = |o: Operand| match o {
        Operand::Reg(r) => r.index() as u16,
        Operand::Imm(imm) => (1 << 5) | (imm & 0x1F),
    };

    let rest = match *instr {
        Instruction::Add { dr: d, sr1: s, operand: o } => dr(d) | sr1(s) | operand(o),
        Instruction::And { dr: d, sr1: s, operand: o } => dr(d) | sr1(s) | operand(o),
        Instruction::Not { dr: d, sr } => dr(d) | sr1(sr) | 0x3F,
        Instruction::Ld { dr: d, offset } => dr(d) | (offset & 0x1FF),
        Instruction::Ldi { dr: d, offset } => dr(d) | (offset & 0x1FF),
        Instruction::Ldr { dr: d, base, offset } => dr(d) | sr1(base) | (offset & 0x3F),
        Instruction::Lea { dr: d, offset } => dr(d) | (offset & 0x1FF),
        Instruction::St { sr, offset } => dr(sr) | (offset & 0x1FF),
        Instruction::Sti { sr, offset } => dr(sr) | (offset & 0x1FF),
        Instruction::Str { sr, base, offset } => dr(sr) | sr1(base) | (offset & 0x3F),
        Instruction::Br { nzp, offset } => ((nzp & 0x7) << 9) | (offset & 0x1FF),
        Instruction::Jmp { base } => sr1(base),
        Instruction::Jsr { target: JsrTarget::Offset(offset) } => (1 << 11) | (offset & 0x7FF),
        Instruction::Jsr { target: JsrTarget::Base(base) } => sr1(base),
        Instruction::Trap { vector } => vector as u16,
        Instruction::Rti | Instruction::Res => 0,
    };

    op | rest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_from_word() {
        assert_eq!(Opcode::from_word(0x0000), Opcode::Br);
        assert_eq!(Opcode::from_word(0x1000), Opcode::Add);
        assert_eq!(Opcode::from_word(0x8000), Opcode::Rti);
        assert_eq!(Opcode::from_word(0xD000), Opcode::Res);
        assert_eq!(Opcode::from_word(0xF025), Opcode::Trap);
    }

    #[test]
    fn test_decode_add_immediate() {
        // ADD R0, R1, #-3
        let word = 0b0001_000_001_1_11101;
        assert_eq!(
            decode(word),
            Instruction::Add { dr: Reg::R0, sr1: Reg::R1, operand: Operand::Imm(0xFFFD) }
        );
    }

    #[test]
    fn test_decode_and_register_mode() {
        // AND R2, R3, R4: bit 5 clear, bits 4-3 ignored
        let word = 0b0101_010_011_0_00_100;
        assert_eq!(
            decode(word),
            Instruction::And { dr: Reg::R2, sr1: Reg::R3, operand: Operand::Reg(Reg::R4) }
        );
    }

    #[test]
    fn test_decode_str_uses_full_six_bit_offset() {
        // STR R1, R2, #-1: offset6 = 0b111111
        let word = 0b0111_001_010_111111;
        assert_eq!(
            decode(word),
            Instruction::Str { sr: Reg::R1, base: Reg::R2, offset: 0xFFFF }
        );

        // Bit 4 of the offset must survive (0b010000 = 16)
        let word = 0b0111_001_010_010000;
        assert_eq!(
            decode(word),
            Instruction::Str { sr: Reg::R1, base: Reg::R2, offset: 16 }
        );
    }

    #[test]
    fn test_decode_jsr_modes() {
        assert_eq!(
            decode(0x4800),
            Instruction::Jsr { target: JsrTarget::Offset(0) }
        );
        // JSR with offset11 = -1
        assert_eq!(
            decode(0x4FFF),
            Instruction::Jsr { target: JsrTarget::Offset(0xFFFF) }
        );
        // JSRR R5
        assert_eq!(
            decode(0b0100_0_00_101_000000),
            Instruction::Jsr { target: JsrTarget::Base(Reg::R5) }
        );
    }

    #[test]
    fn test_decode_trap_and_unused() {
        assert_eq!(decode(0xF025), Instruction::Trap { vector: 0x25 });
        assert_eq!(decode(0x8000), Instruction::Rti);
        assert_eq!(decode(0xDFFF), Instruction::Res);
    }

    #[test]
    fn test_every_word_decodes_and_reencodes_opcode() {
        for word in 0..=u16::MAX {
            let instr = decode(word);
            assert_eq!(instr.opcode(), Opcode::from_word(word));
            assert_eq!(encode(&instr) >> 12, word >> 12);
        }
    }

    #[test]
    fn test_encode_known_words() {
        assert_eq!(encode(&Instruction::Trap { vector: 0x25 }), 0xF025);
        assert_eq!(encode(&Instruction::Jmp { base: Reg::R7 }), 0xC1C0);
        assert_eq!(encode(&Instruction::Not { dr: Reg::R1, sr: Reg::R2 }), 0x92BF);
        assert_eq!(encode(&Instruction::Lea { dr: Reg::R0, offset: 0xFFFF }), 0xE1FF);
        assert_eq!(encode(&Instruction::Br { nzp: 0b111, offset: 0xFFFE }), 0x0FFE);
    }
}
