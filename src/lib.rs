//! # LC-3 Emulator
//!
//! An emulator of the LC-3, the 16-bit educational computer: 65536 words
//! of memory, eight general registers, a program counter, N/Z/P condition
//! flags and sixteen opcodes.
//!
//! Programs are loaded from big-endian object images and run by a
//! fetch-decode-execute loop. The TRAP routines for character I/O are
//! serviced by the emulator against a [`Console`].

pub mod bits;
pub mod console;
pub mod cpu;
pub mod disasm;
pub mod image;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use bits::sign_extend;
pub use console::{BufferConsole, Console, StdConsole};
pub use cpu::{Cpu, CpuState, CpuError, CondFlag, Instruction, Memory, Reg, Registers, TrapVector};
pub use disasm::{disassemble, disassemble_instruction};
pub use image::{load_image, load_image_bytes, load_images, ImageError, LoadError, LoadedImage};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
