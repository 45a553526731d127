//! LC-3 Emulator - CLI Entry Point
//!
//! `lc3-emu [OPTIONS] <IMAGE>...` loads every image in order, then runs
//! from x3000 until the program executes HALT.

use clap::Parser;
use std::path::PathBuf;
use std::process::exit;

/// Exit status for bad arguments or an image that failed to load.
const EXIT_USAGE: i32 = 2;

/// Exit status for a console failure while running.
const EXIT_RUNTIME: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "lc3-emu")]
#[command(version)]
#[command(about = "An emulator for the LC-3 16-bit educational computer")]
struct Cli {
    /// Object images to load (big-endian words, origin first)
    #[arg(required = true, value_name = "IMAGE")]
    images: Vec<PathBuf>,

    /// Stop after this many instructions even if the program has not halted
    #[arg(short, long)]
    max_cycles: Option<u64>,

    /// Log every executed instruction
    #[arg(short, long)]
    trace: bool,

    /// Print the final register file as JSON to stderr
    #[arg(long)]
    dump_state: bool,

    /// Print a disassembly of the loaded images instead of running them
    #[arg(long)]
    disasm: bool,

    /// Open the interactive debugger
    #[cfg(feature = "tui")]
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.trace);

    let mut cpu = lc3::Cpu::new();
    let images = match load_all(&mut cpu, &cli.images) {
        Ok(images) => images,
        Err(code) => exit(code),
    };

    if cli.disasm {
        for image in &images {
            let words: Vec<u16> = cpu.mem
                .dump(image.origin, image.len)
                .into_iter()
                .map(|(_, word)| word)
                .collect();
            println!("{}", lc3::disassemble(image.origin, &words));
        }
        return;
    }

    #[cfg(feature = "tui")]
    if cli.debug {
        debug_program(cpu);
        return;
    }

    run_program(&mut cpu, cli.max_cycles);

    if cli.dump_state {
        match serde_json::to_string_pretty(&cpu.regs) {
            Ok(json) => eprintln!("{}", json),
            Err(e) => eprintln!("failed to serialize state: {}", e),
        }
    }
}

fn init_logging(trace: bool) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if trace {
        builder.filter_level(log::LevelFilter::Trace);
    }
    builder.init();
}

/// Load every image in order, or report the first failure and return
/// the exit status.
fn load_all(cpu: &mut lc3::Cpu, paths: &[PathBuf]) -> Result<Vec<lc3::LoadedImage>, i32> {
    lc3::load_images(&mut cpu.mem, paths).map_err(|e| {
        eprintln!("{}", e);
        EXIT_USAGE
    })
}

fn run_program(cpu: &mut lc3::Cpu, max_cycles: Option<u64>) {
    let mut console = lc3::StdConsole::new();

    let result = match max_cycles {
        Some(max) => cpu.run_limited(&mut console, max),
        None => cpu.run(&mut console),
    };

    if let Err(e) = result {
        eprintln!("CPU error at PC=x{:04X}: {}", cpu.regs.pc, e);
        exit(EXIT_RUNTIME);
    }

    if cpu.is_running() {
        log::warn!("stopped after {} cycles without halting", cpu.cycles);
    }
}

#[cfg(feature = "tui")]
fn debug_program(cpu: lc3::Cpu) {
    if let Err(e) = lc3::run_debugger(cpu) {
        eprintln!("Debugger error: {}", e);
        exit(EXIT_RUNTIME);
    }
}
