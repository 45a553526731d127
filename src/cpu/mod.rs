//! CPU emulation for the LC-3.
//!
//! This module implements the complete LC-3 architecture:
//! - 65536 sixteen-bit memory words
//! - 8 general registers, PC and the N/Z/P condition flags
//! - 16 opcodes, with TRAP I/O serviced by the emulator itself

pub mod memory;
pub mod registers;
pub mod decode;
pub mod trap;
pub mod execute;

pub use memory::{Memory, MemorySizeError};
pub use registers::{CondFlag, Reg, Registers, PC_START};
pub use decode::{Instruction, JsrTarget, Opcode, Operand};
pub use trap::TrapVector;
pub use execute::{Cpu, CpuError, CpuState};
