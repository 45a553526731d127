//! CPU execution engine for the LC-3.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::console::Console;
use crate::cpu::{Memory, Registers};
use crate::cpu::decode::{self, Instruction, JsrTarget, Operand};
use crate::cpu::registers::Reg;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is fetching and executing instructions.
    Running,
    /// CPU has executed TRAP HALT. Terminal.
    Halted,
}

/// The LC-3 CPU: register file, memory and run state in one execution context.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// CPU registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Current execution state.
    pub state: CpuState,
    /// Instruction count.
    pub cycles: u64,
    /// Last executed instruction (for debugging).
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a new CPU with zeroed memory and `PC = 0x3000`.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            state: CpuState::Running,
            cycles: 0,
            last_instr: None,
        }
    }

    /// Reset the CPU to its power-on state, clearing memory.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.state = CpuState::Running;
        self.cycles = 0;
        self.last_instr = None;
    }

    /// Execute a single instruction.
    ///
    /// Returns the instruction that was executed, or an error if the
    /// machine is already halted or the console failed.
    pub fn step(&mut self, console: &mut dyn Console) -> Result<Instruction, CpuError> {
        if self.state != CpuState::Running {
            return Err(CpuError::NotRunning(self.state));
        }

        // Fetch, then advance PC before execute; PC-relative operands are
        // computed from the incremented value
        let pc = self.regs.advance_pc();
        let raw = self.mem.read(pc);

        // Decode
        let instr = decode::decode(raw);

        if log::log_enabled!(log::Level::Trace) {
            log::trace!("{:#06x}: {:#06x}  {}", pc, raw, crate::disasm::format_instruction(&instr));
        }

        // Execute
        self.execute(instr, console)?;

        self.cycles += 1;
        self.last_instr = Some(instr);

        Ok(instr)
    }

    /// Run until halt or error.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self, console: &mut dyn Console) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;

        while self.state == CpuState::Running {
            self.step(console)?;
        }

        log::info!("halted after {} cycles", self.cycles);
        Ok(self.cycles - start_cycles)
    }

    /// Run for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, console: &mut dyn Console, max_cycles: u64) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;
        let limit = self.cycles.saturating_add(max_cycles);

        while self.state == CpuState::Running && self.cycles < limit {
            self.step(console)?;
        }

        if self.is_halted() {
            log::info!("halted after {} cycles", self.cycles);
        }
        Ok(self.cycles - start_cycles)
    }

    /// Execute a decoded instruction. PC already points past it.
    fn execute(&mut self, instr: Instruction, console: &mut dyn Console) -> Result<(), CpuError> {
        match instr {
            // ==================== Operate ====================

            Instruction::Add { dr, sr1, operand } => {
                let value = self.regs.get(sr1).wrapping_add(self.operand(operand));
                self.regs.set_with_flags(dr, value);
            }

            Instruction::And { dr, sr1, operand } => {
                let value = self.regs.get(sr1) & self.operand(operand);
                self.regs.set_with_flags(dr, value);
            }

            Instruction::Not { dr, sr } => {
                let value = !self.regs.get(sr);
                self.regs.set_with_flags(dr, value);
            }

            // ==================== Data Movement ====================

            Instruction::Ld { dr, offset } => {
                let value = self.mem.read(self.regs.pc_relative(offset));
                self.regs.set_with_flags(dr, value);
            }

            Instruction::Ldi { dr, offset } => {
                let addr = self.mem.read(self.regs.pc_relative(offset));
                let value = self.mem.read(addr);
                self.regs.set_with_flags(dr, value);
            }

            Instruction::Ldr { dr, base, offset } => {
                let addr = self.regs.get(base).wrapping_add(offset);
                let value = self.mem.read(addr);
                self.regs.set_with_flags(dr, value);
            }

            Instruction::Lea { dr, offset } => {
                let addr = self.regs.pc_relative(offset);
                self.regs.set_with_flags(dr, addr);
            }

            Instruction::St { sr, offset } => {
                let addr = self.regs.pc_relative(offset);
                self.mem.write(addr, self.regs.get(sr));
            }

            Instruction::Sti { sr, offset } => {
                let addr = self.mem.read(self.regs.pc_relative(offset));
                self.mem.write(addr, self.regs.get(sr));
            }

            Instruction::Str { sr, base, offset } => {
                let addr = self.regs.get(base).wrapping_add(offset);
                self.mem.write(addr, self.regs.get(sr));
            }

            // ==================== Control ====================

            Instruction::Br { nzp, offset } => {
                if nzp & self.regs.cond.bits() != 0 {
                    let target = self.regs.pc_relative(offset);
                    self.regs.jump(target);
                }
            }

            Instruction::Jmp { base } => {
                let target = self.regs.get(base);
                self.regs.jump(target);
            }

            Instruction::Jsr { target } => {
                // Resolve the target before R7 is overwritten; JSRR R7 must
                // jump to the old R7
                let return_addr = self.regs.pc;
                let target = match target {
                    JsrTarget::Offset(offset) => self.regs.pc_relative(offset),
                    JsrTarget::Base(base) => self.regs.get(base),
                };
                self.regs.set(Reg::R7, return_addr);
                self.regs.jump(target);
            }

            Instruction::Trap { vector } => {
                self.trap(vector, console)?;
            }

            // ==================== Unused ====================

            Instruction::Rti | Instruction::Res => {
                log::debug!(
                    "{:?} at {:#06x} has no effect",
                    instr.opcode(),
                    self.regs.pc.wrapping_sub(1)
                );
            }
        }

        Ok(())
    }

    /// Resolve the second operand of ADD/AND.
    #[inline]
    fn operand(&self, operand: Operand) -> u16 {
        match operand {
            Operand::Reg(r) => self.regs.get(r),
            Operand::Imm(imm) => imm,
        }
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }

    /// Decode the instruction at PC without executing it.
    pub fn peek(&self) -> Instruction {
        decode::decode(self.mem.read(self.regs.pc))
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .finish()
    }
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),

    #[error("console I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CpuError {
    fn from(e: std::io::Error) -> Self {
        CpuError::Io(e.to_string())
    }
}
