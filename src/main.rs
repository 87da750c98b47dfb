use std::error::Error;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chip8vm::analyser::{Analysis, DEFAULT_ANALYSER_CAPACITY};
use chip8vm::config::{DisassemblyConfig, EmulatorConfig, Keymap, DEFAULT_BEEP_PITCH};
use chip8vm::disassembler::Disassembler;
use chip8vm::display::MonoTermDisplay;
use chip8vm::emulator::{Emulator, RunSummary};
use chip8vm::input::TermInput;
use chip8vm::sound::{Mute, SimpleBeep, Sound};
use chip8vm::Machine;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "chip8vm", about = "Run and take apart CHIP-8 programs.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// run a program in the terminal
    Run(RunArgs),
    /// print a program as assembly
    Decompile(DecompileArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// delay between instructions, in milliseconds
    #[arg(short, long, default_value_t = 1)]
    delay: u64,

    /// timer frequency in Hz
    #[arg(long, default_value_t = 60)]
    timer_hz: u32,

    #[arg(short, long, value_enum, default_value_t = Keymap::Conventional)]
    keymap: Keymap,

    /// how many timer ticks a key stays down after being pressed
    #[arg(long, default_value_t = 6)]
    key_hold: u8,

    #[arg(short, long)]
    mute: bool,

    /// buzzer pitch in Hz
    #[arg(long, default_value_t = DEFAULT_BEEP_PITCH)]
    pitch: u16,

    /// stop after this many instructions
    #[arg(long)]
    max_cycles: Option<u64>,

    program: PathBuf,
}

impl RunArgs {
    fn config(&self) -> EmulatorConfig {
        EmulatorConfig {
            cycle_delay: Duration::from_millis(self.delay),
            timer_hz: self.timer_hz,
            keymap: self.keymap,
            key_hold_ticks: self.key_hold,
            mute: self.mute,
            beep_pitch: self.pitch,
            max_cycles: self.max_cycles,
        }
    }
}

#[derive(Args, Debug)]
struct DecompileArgs {
    /// write plain english instead of assembly
    #[arg(short, long)]
    verbose: bool,

    /// write the listing to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// how many jumps, calls and skips to record before giving up
    #[arg(long, default_value_t = DEFAULT_ANALYSER_CAPACITY)]
    max_targets: usize,

    program: PathBuf,
}

impl DecompileArgs {
    fn config(&self) -> DisassemblyConfig {
        DisassemblyConfig {
            verbose: self.verbose,
            analyser_capacity: self.max_targets,
            output: self.out.clone(),
        }
    }
}

fn run(program: &Path, config: EmulatorConfig) -> Result<RunSummary, Box<dyn Error>> {
    let mut machine = Machine::new();
    let mut f = File::open(program)?;
    machine.load_from_reader(&mut f)?;

    let sound: Box<dyn Sound> = if config.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new(config.beep_pitch))
    };
    let input = TermInput::new(config.keymap.table(), config.key_hold_ticks)?;
    let display = MonoTermDisplay::new()?;

    let mut emulator = Emulator::new(machine, display, input, sound, config);
    let summary = emulator.run();
    // put the terminal back before anything gets printed
    drop(emulator);
    Ok(summary?)
}

fn decompile(program: &Path, config: DisassemblyConfig) -> Result<(), Box<dyn Error>> {
    let buffer = fs::read(program)?;
    let analysis = Analysis::analyse_with_capacity(&buffer, config.analyser_capacity)?;
    let disassembler = Disassembler::new(config.verbose);
    let name = program.display().to_string();

    match &config.output {
        Some(path) => {
            let mut out = io::BufWriter::new(File::create(path)?);
            disassembler.write_listing(&mut out, &name, &buffer, &analysis)?;
        }
        None => {
            let stdout = io::stdout();
            disassembler.write_listing(&mut stdout.lock(), &name, &buffer, &analysis)?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => {
            let summary = run(&args.program, args.config())?;
            println!("stopped after {} cycles ({:?})", summary.cycles, summary.reason);
        }
        Command::Decompile(args) => decompile(&args.program, args.config())?,
    }
    Ok(())
}
