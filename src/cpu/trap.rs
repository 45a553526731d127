//! Trap routines.
//!
//! TRAP takes an 8-bit vector. The six standard vectors are serviced
//! directly by the emulator against the [`Console`] rather than by
//! operating-system code in memory. Only R0 and the console are touched.

use crate::console::Console;
use crate::cpu::decode::Instruction;
use crate::cpu::execute::{Cpu, CpuError, CpuState};
use crate::cpu::memory::MEMORY_SIZE;
use crate::cpu::registers::Reg;
use serde::{Serialize, Deserialize};

/// Prompt printed by the IN trap.
pub const IN_PROMPT: &[u8] = b"Enter a character: ";

/// Notice printed by the HALT trap.
pub const HALT_NOTICE: &[u8] = b"HALT\n";

/// Value stored in R0 when GETC or IN hit end of input.
pub const EOF_WORD: u16 = 0xFFFF;

/// The standard trap vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TrapVector {
    /// Read a character without echo into R0.
    Getc = 0x20,
    /// Write the character in R0.
    Out = 0x21,
    /// Write a string of one character per word starting at R0.
    Puts = 0x22,
    /// Prompt, read a character with echo into R0.
    In = 0x23,
    /// Write a string of two characters per word starting at R0.
    Putsp = 0x24,
    /// Stop the machine.
    Halt = 0x25,
}

impl TrapVector {
    /// Look up a vector. Returns `None` for anything non-standard.
    pub fn from_u8(vector: u8) -> Option<Self> {
        match vector {
            0x20 => Some(TrapVector::Getc),
            0x21 => Some(TrapVector::Out),
            0x22 => Some(TrapVector::Puts),
            0x23 => Some(TrapVector::In),
            0x24 => Some(TrapVector::Putsp),
            0x25 => Some(TrapVector::Halt),
            _ => None,
        }
    }

    /// Assembler alias for the vector.
    pub fn name(self) -> &'static str {
        match self {
            TrapVector::Getc => "GETC",
            TrapVector::Out => "OUT",
            TrapVector::Puts => "PUTS",
            TrapVector::In => "IN",
            TrapVector::Putsp => "PUTSP",
            TrapVector::Halt => "HALT",
        }
    }

    /// Whether servicing this vector reads from the console.
    pub fn reads_input(self) -> bool {
        matches!(self, TrapVector::Getc | TrapVector::In)
    }
}

impl Cpu {
    /// Whether the instruction at PC is a trap that reads console input.
    pub fn next_reads_input(&self) -> bool {
        match self.peek() {
            Instruction::Trap { vector } => {
                TrapVector::from_u8(vector).is_some_and(TrapVector::reads_input)
            }
            _ => false,
        }
    }

    /// Service a TRAP instruction.
    pub(crate) fn trap(&mut self, vector: u8, console: &mut dyn Console) -> Result<(), CpuError> {
        let Some(vector) = TrapVector::from_u8(vector) else {
            log::debug!("unknown trap vector {:#04x} at {:#06x}, ignored", vector, self.regs.pc.wrapping_sub(1));
            return Ok(());
        };

        match vector {
            TrapVector::Getc => {
                let c = console.read_byte()?;
                self.regs.set(Reg::R0, c.map_or(EOF_WORD, u16::from));
            }

            TrapVector::Out => {
                let c = self.regs.get(Reg::R0) as u8;
                console.write(&[c])?;
                console.flush()?;
            }

            TrapVector::Puts => {
                let text = self.collect_string(|word, out| out.push(word as u8));
                console.write(&text)?;
                console.flush()?;
            }

            TrapVector::In => {
                console.write(IN_PROMPT)?;
                console.flush()?;
                let c = console.read_byte()?;
                if let Some(c) = c {
                    console.write(&[c])?;
                    console.flush()?;
                }
                self.regs.set(Reg::R0, c.map_or(EOF_WORD, u16::from));
            }

            TrapVector::Putsp => {
                let text = self.collect_string(|word, out| {
                    out.push((word & 0xFF) as u8);
                    let high = (word >> 8) as u8;
                    if high != 0 {
                        out.push(high);
                    }
                });
                console.write(&text)?;
                console.flush()?;
            }

            TrapVector::Halt => {
                self.state = CpuState::Halted;
                console.write(HALT_NOTICE)?;
                console.flush()?;
            }
        }

        Ok(())
    }

    /// Walk memory from the address in R0 up to (not including) the first
    /// zero word, unpacking each word into bytes.
    ///
    /// Stops after one full lap of memory if no terminator exists.
    fn collect_string(&self, mut unpack: impl FnMut(u16, &mut Vec<u8>)) -> Vec<u8> {
        let mut out = Vec::new();
        let mut addr = self.regs.get(Reg::R0);
        for _ in 0..MEMORY_SIZE {
            let word = self.mem.read(addr);
            if word == 0 {
                break;
            }
            unpack(word, &mut out);
            addr = addr.wrapping_add(1);
        }
        out
    }
}
