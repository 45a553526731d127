//! Disassembler for LC-3 programs.
//!
//! Converts instruction words back to readable assembly. Offsets are shown
//! as signed decimal immediates, the way LC-3 assemblers accept them.

use crate::cpu::decode::{decode, Instruction, JsrTarget, Operand};
use crate::cpu::registers::Reg;
use crate::cpu::trap::TrapVector;

/// Disassemble a single instruction word to text.
pub fn disassemble_instruction(word: u16) -> String {
    format_instruction(&decode(word))
}

/// Disassemble `words` as if loaded at `origin`.
pub fn disassemble(origin: u16, words: &[u16]) -> String {
    let mut output = String::new();
    output.push_str("; LC-3 Disassembly\n");
    output.push_str("; ----------------\n\n");

    for (i, &word) in words.iter().enumerate() {
        let addr = origin.wrapping_add(i as u16);
        let line = disassemble_instruction(word);
        output.push_str(&format!("x{:04X}: {:04X}  {}\n", addr, word, line));
    }

    output
}

/// Format a decoded instruction as assembly text.
pub fn format_instruction(instr: &Instruction) -> String {
    match *instr {
        Instruction::Add { dr, sr1, operand } => format!("ADD {}, {}, {}", dr, sr1, format_operand(operand)),
        Instruction::And { dr, sr1, operand } => format!("AND {}, {}, {}", dr, sr1, format_operand(operand)),
        Instruction::Not { dr, sr } => format!("NOT {}, {}", dr, sr),

        Instruction::Ld { dr, offset } => format!("LD {}, {}", dr, imm(offset)),
        Instruction::Ldi { dr, offset } => format!("LDI {}, {}", dr, imm(offset)),
        Instruction::Ldr { dr, base, offset } => format!("LDR {}, {}, {}", dr, base, imm(offset)),
        Instruction::Lea { dr, offset } => format!("LEA {}, {}", dr, imm(offset)),
        Instruction::St { sr, offset } => format!("ST {}, {}", sr, imm(offset)),
        Instruction::Sti { sr, offset } => format!("STI {}, {}", sr, imm(offset)),
        Instruction::Str { sr, base, offset } => format!("STR {}, {}, {}", sr, base, imm(offset)),

        Instruction::Br { nzp: 0, .. } => "NOP".to_string(),
        Instruction::Br { nzp, offset } => {
            let mut mnemonic = String::from("BR");
            for (mask, letter) in [(0b100, 'n'), (0b010, 'z'), (0b001, 'p')] {
                if nzp & mask != 0 {
                    mnemonic.push(letter);
                }
            }
            format!("{} {}", mnemonic, imm(offset))
        }
        Instruction::Jmp { base: Reg::R7 } => "RET".to_string(),
        Instruction::Jmp { base } => format!("JMP {}", base),
        Instruction::Jsr { target: JsrTarget::Offset(offset) } => format!("JSR {}", imm(offset)),
        Instruction::Jsr { target: JsrTarget::Base(base) } => format!("JSRR {}", base),
        Instruction::Trap { vector } => match TrapVector::from_u8(vector) {
            Some(v) => v.name().to_string(),
            None => format!("TRAP x{:02X}", vector),
        },

        Instruction::Rti => "RTI".to_string(),
        Instruction::Res => ".RESERVED".to_string(),
    }
}

fn format_operand(operand: Operand) -> String {
    match operand {
        Operand::Reg(r) => r.to_string(),
        Operand::Imm(value) => imm(value),
    }
}

/// A sign-extended field as a `#n` immediate.
fn imm(value: u16) -> String {
    format!("#{}", value as i16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_operate() {
        assert_eq!(disassemble_instruction(0b0001_000_001_1_11101), "ADD R0, R1, #-3");
        assert_eq!(disassemble_instruction(0b0101_010_011_0_00_100), "AND R2, R3, R4");
        assert_eq!(disassemble_instruction(0x92BF), "NOT R1, R2");
    }

    #[test]
    fn test_disassemble_memory() {
        assert_eq!(disassemble_instruction(0xE1FF), "LEA R0, #-1");
        assert_eq!(disassemble_instruction(0b0110_001_110_000011), "LDR R1, R6, #3");
    }

    #[test]
    fn test_disassemble_control() {
        assert_eq!(disassemble_instruction(0x0FFE), "BRnzp #-2");
        assert_eq!(disassemble_instruction(0x0A05), "BRnp #5");
        assert_eq!(disassemble_instruction(0x0000), "NOP");
        assert_eq!(disassemble_instruction(0xC1C0), "RET");
        assert_eq!(disassemble_instruction(0x4800), "JSR #0");
        assert_eq!(disassemble_instruction(0x4080), "JSRR R2");
    }

    #[test]
    fn test_disassemble_traps() {
        assert_eq!(disassemble_instruction(0xF025), "HALT");
        assert_eq!(disassemble_instruction(0xF022), "PUTS");
        assert_eq!(disassemble_instruction(0xF0FF), "TRAP xFF");
        assert_eq!(disassemble_instruction(0x8000), "RTI");
    }

    #[test]
    fn test_disassemble_listing() {
        let listing = disassemble(0x3000, &[0xE002, 0xF025]);
        assert!(listing.contains("x3000: E002  LEA R0, #2"));
        assert!(listing.contains("x3001: F025  HALT"));
    }
}
