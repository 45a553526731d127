//! Debugger application state and logic.

use crate::console::BufferConsole;
use crate::cpu::Cpu;
use crate::disasm::{disassemble_instruction, format_instruction};
use crate::cpu::memory::Memory;
use std::collections::HashSet;

/// Debugger application state.
pub struct DebuggerApp {
    /// The CPU being debugged.
    pub cpu: Cpu,
    /// Console the program reads from and writes to.
    pub console: BufferConsole,
    /// Memory as loaded, for reset.
    pub initial_mem: Memory,
    /// Breakpoints (by address).
    pub breakpoints: HashSet<u16>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Are key presses being fed to the program as input?
    pub input_mode: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// First address shown in the memory view.
    pub mem_scroll: u16,
}

impl DebuggerApp {
    /// Create a debugger around a CPU whose memory is already loaded.
    pub fn new(cpu: Cpu) -> Self {
        let mem_scroll = cpu.regs.pc;
        Self {
            initial_mem: cpu.mem.clone(),
            cpu,
            console: BufferConsole::new(),
            breakpoints: HashSet::new(),
            running: false,
            input_mode: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            mem_scroll,
        }
    }

    /// Whether the next instruction would block on an empty input queue.
    fn needs_input(&self) -> bool {
        self.cpu.next_reads_input() && self.console.pending_input() == 0
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if !self.cpu.is_running() {
            self.status = format!("CPU halted after {} cycles", self.cpu.cycles);
            self.running = false;
            return;
        }

        if self.needs_input() {
            self.status = "Waiting for input: press 'i' and type a key.".into();
            self.running = false;
            return;
        }

        let pc = self.cpu.regs.pc;
        match self.cpu.step(&mut self.console) {
            Ok(instr) => {
                self.status = format!("x{:04X}: {}", pc, format_instruction(&instr));
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.running = false;
            }
        }
    }

    /// Run until halt, breakpoint, or error.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if !self.cpu.is_running() {
            self.running = false;
            self.status = format!("Halted after {} cycles", self.cpu.cycles);
            return;
        }

        // Check for breakpoint
        let pc = self.cpu.regs.pc;
        if self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("Breakpoint at x{:04X}", pc);
            return;
        }

        self.step();
    }

    /// Toggle breakpoint at current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.cpu.regs.pc;
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at x{:04X}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at x{:04X}", pc);
        }
    }

    /// Queue a key press as program input.
    pub fn push_key(&mut self, byte: u8) {
        self.console.push_input(&[byte]);
        self.status = format!("Queued input {:?} ({} pending)", byte as char, self.console.pending_input());
    }

    /// Reset CPU to the loaded image.
    pub fn reset(&mut self) {
        self.cpu = Cpu::new();
        self.cpu.mem = self.initial_mem.clone();
        self.console = BufferConsole::new();
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Get disassembly around current PC.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(u16, String, bool)> {
        let pc = self.cpu.regs.pc;
        let start = pc.wrapping_sub((lines / 2) as u16);

        (0..lines)
            .map(|i| {
                let addr = start.wrapping_add(i as u16);
                let disasm = disassemble_instruction(self.cpu.mem.read(addr));
                (addr, disasm, addr == pc)
            })
            .collect()
    }
}

/// Run the debugger on a loaded CPU.
pub fn run_debugger(cpu: Cpu) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(cpu);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if app.input_mode {
                        match key.code {
                            KeyCode::Esc => {
                                app.input_mode = false;
                                app.status = "Input mode off.".into();
                            }
                            KeyCode::Enter => app.push_key(b'\n'),
                            KeyCode::Char(c) if c.is_ascii() => app.push_key(c as u8),
                            _ => {}
                        }
                    } else {
                        match key.code {
                            KeyCode::Char('q') => app.should_quit = true,
                            KeyCode::Char('s') => {
                                app.running = false;
                                app.step();
                            }
                            KeyCode::Char('r') => app.run(),
                            KeyCode::Char('p') => {
                                app.running = false;
                                app.status = "Paused.".into();
                            }
                            KeyCode::Char('b') => app.toggle_breakpoint(),
                            KeyCode::Char('x') => app.reset(),
                            KeyCode::Char('i') => {
                                app.input_mode = true;
                                app.status = "Input mode: keys go to the program, Esc to leave.".into();
                            }
                            KeyCode::Up => app.mem_scroll = app.mem_scroll.wrapping_sub(1),
                            KeyCode::Down => app.mem_scroll = app.mem_scroll.wrapping_add(1),
                            KeyCode::PageUp => app.mem_scroll = app.mem_scroll.wrapping_sub(16),
                            KeyCode::PageDown => app.mem_scroll = app.mem_scroll.wrapping_add(16),
                            _ => {}
                        }
                    }
                }
            }
        }

        // Run a batch per frame so long programs finish in reasonable time
        for _ in 0..1000 {
            if !app.running {
                break;
            }
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
