//! TUI debugger for the LC-3 emulator.
//!
//! Provides an interactive terminal-based debugger with:
//! - Register and condition flag view
//! - Hex memory view
//! - Step/run/breakpoint controls
//! - Disassembly view and captured program output

mod app;
mod ui;

pub use app::{DebuggerApp, run_debugger};
