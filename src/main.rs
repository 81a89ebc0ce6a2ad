use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};

use octet::output::Output;
use octet::{disasm, dprintln, Program, Vm};

/// Octet loads programs written as lines of binary and runs them on a small 8-bit machine.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a program file to run
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Load a program file and run it until it halts
    Run {
        /// Program file to run
        name: PathBuf,
        /// Produce minimal output, suited for blackbox tests
        #[arg(short, long)]
        minimal: bool,
        /// Print machine state before every instruction
        #[arg(short, long)]
        trace: bool,
        /// Print the register file once the program halts
        #[arg(short, long)]
        dump: bool,
    },
    /// Check that a program file loads, without running it
    Check {
        /// File to check
        name: PathBuf,
    },
    /// Print a listing of the instructions in a program file
    Disasm {
        /// Program file to list
        name: PathBuf,
    },
}

#[derive(Default)]
struct RunOptions {
    minimal: bool,
    trace: bool,
    dump: bool,
}

fn main() -> miette::Result<()> {
    use MsgColor::*;
    let args = Args::parse();
    octet::env::init();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new() //
                .context_lines(octet::DIAGNOSTIC_CONTEXT_LINES)
                .build(),
        )
    }))?;

    if let Some(command) = args.command {
        match command {
            Command::Run {
                name,
                minimal,
                trace,
                dump,
            } => run(
                &name,
                RunOptions {
                    minimal,
                    trace,
                    dump,
                },
            ),
            Command::Check { name } => {
                file_message(Green, "Checking", &name);
                let program = Program::from_file(&name)?;
                let msg = format!("{} bytes, no errors found!", program.len());
                message(Green, "Success", &msg);
                Ok(())
            }
            Command::Disasm { name } => {
                let program = Program::from_file(&name)?;
                let mut stdout = io::stdout().lock();
                for line in disasm::disassemble(program.bytes()) {
                    writeln!(stdout, "{line}").into_diagnostic()?;
                }
                Ok(())
            }
        }
    } else if let Some(path) = args.path {
        run(&path, RunOptions::default())
    } else {
        println!("\n~ octet v{VERSION} ~");
        println!("{SHORT_INFO}");
        Ok(())
    }
}

#[allow(unused)]
enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &PathBuf) {
    let right = format!("target {}", right.display());
    message(color, left, &right);
}

fn message(color: MsgColor, left: &str, right: &str) {
    if Output::is_minimal() {
        return;
    }
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    eprintln!("{left:>12} {right}");
}

fn run(name: &PathBuf, opts: RunOptions) -> Result<()> {
    Output::set_minimal(opts.minimal);

    file_message(MsgColor::Green, "Loading", name);
    // Parse everything before touching the machine
    let program = Program::from_file(name)?;
    let mut vm = Vm::from_program(&program)?;
    vm.set_trace(opts.trace || octet::env::is_trace_enabled());

    message(MsgColor::Green, "Running", &format!("{} bytes", program.len()));
    let res = vm.run(&mut io::stdout().lock());

    if opts.dump {
        Output::Normal.print_registers(&vm);
    }
    let steps = res?;
    dprintln!(Sometimes, "{} instructions executed", steps);
    message(MsgColor::Cyan, "Halted", &format!("at 0x{:02x}", vm.pc()));
    file_message(MsgColor::Green, "Completed", name);
    Ok(())
}

const SHORT_INFO: &str = r"
Welcome to octet, an interpreter for a small 8-bit byte-code machine.
Please use `-h` or `--help` to access the usage instructions and documentation.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
