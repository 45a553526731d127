//! WebAssembly bindings for the LC-3 emulator.
//!
//! This module provides JavaScript-friendly wrappers around the core emulator.
//! Console I/O goes through an in-memory buffer: push input before running
//! and drain output afterwards.

use wasm_bindgen::prelude::*;
use crate::console::BufferConsole;
use crate::cpu::{Cpu, Reg};
use crate::cpu::memory::Memory;
use crate::disasm::{disassemble_instruction, format_instruction};
use crate::image::load_image_bytes;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly CPU wrapper.
#[wasm_bindgen]
pub struct WasmCpu {
    cpu: Cpu,
    console: BufferConsole,
    image: Memory,
}

#[wasm_bindgen]
impl WasmCpu {
    /// Create a new CPU instance.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            console: BufferConsole::new(),
            image: Memory::new(),
        }
    }

    /// Load an object image (big-endian words, origin first).
    /// Returns the origin address.
    #[wasm_bindgen]
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<u16, JsError> {
        let image = load_image_bytes(&mut self.cpu.mem, bytes)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        self.image = self.cpu.mem.clone();
        Ok(image.origin)
    }

    /// Step one instruction. Returns the disassembled instruction.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        if !self.cpu.is_running() {
            return Err(JsError::new("CPU is halted"));
        }

        let instr = self.cpu.step(&mut self.console)
            .map_err(|e| JsError::new(&format!("{}", e)))?;

        Ok(format_instruction(&instr))
    }

    /// Run until halt, `max_cycles`, or the program needs input that
    /// has not been pushed yet. Returns the total cycle count.
    #[wasm_bindgen]
    pub fn run(&mut self, max_cycles: u32) -> u64 {
        for _ in 0..max_cycles {
            if !self.cpu.is_running() || self.needs_input() {
                break;
            }
            if self.cpu.step(&mut self.console).is_err() {
                break;
            }
        }
        self.cpu.cycles
    }

    /// Queue keyboard input for GETC/IN.
    #[wasm_bindgen]
    pub fn push_input(&mut self, text: &str) {
        self.console.push_input(text.as_bytes());
    }

    /// Drain program output produced so far.
    #[wasm_bindgen]
    pub fn take_output(&mut self) -> String {
        String::from_utf8_lossy(&self.console.take_output()).into_owned()
    }

    /// Reset CPU to initial state with the loaded image.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.cpu = Cpu::new();
        self.cpu.mem = self.image.clone();
        self.console = BufferConsole::new();
    }

    /// Check if CPU is running.
    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.cpu.is_running()
    }

    /// Check if CPU is halted.
    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    /// Get cycle count.
    #[wasm_bindgen]
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Get program counter.
    #[wasm_bindgen]
    pub fn pc(&self) -> u16 {
        self.cpu.regs.pc
    }

    /// Get general register `index` (0-7).
    #[wasm_bindgen]
    pub fn register(&self, index: u16) -> u16 {
        self.cpu.regs.get(Reg::from_bits(index))
    }

    /// Get condition flag as "n", "z" or "p".
    #[wasm_bindgen]
    pub fn cond(&self) -> String {
        self.cpu.regs.cond.letter().to_string()
    }

    /// Get memory word at `addr`.
    #[wasm_bindgen]
    pub fn memory_at(&self, addr: u16) -> u16 {
        self.cpu.mem.read(addr)
    }

    /// Get `count` memory words starting at `start`.
    #[wasm_bindgen]
    pub fn memory_range(&self, start: u16, count: usize) -> Vec<u16> {
        self.cpu.mem.dump(start, count).into_iter().map(|(_, v)| v).collect()
    }

    /// Get registers as JSON string.
    #[wasm_bindgen]
    pub fn registers_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.cpu.regs)
            .map_err(|e| JsError::new(&format!("{}", e)))
    }
}

impl WasmCpu {
    /// Whether the next instruction would read from an empty input queue.
    fn needs_input(&self) -> bool {
        self.cpu.next_reads_input() && self.console.pending_input() == 0
    }
}

impl Default for WasmCpu {
    fn default() -> Self {
        Self::new()
    }
}

/// Disassemble a single instruction word.
#[wasm_bindgen]
pub fn wasm_disassemble(word: u16) -> String {
    disassemble_instruction(word)
}
