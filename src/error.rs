use std::fmt::Display;
use std::io;
use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::isa::Opcode;

const PROGRAM: &str = env!("CARGO_PKG_NAME");

// Loader errors

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("{}: {} not found", PROGRAM, .path.display())]
    #[diagnostic(code(load::not_found), help("check the path to your program file"))]
    NotFound { path: PathBuf },

    #[error("failed to read {}", .path.display())]
    #[diagnostic(code(load::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{file}:{line}: invalid binary literal `{literal}`")]
    #[diagnostic(
        code(load::bad_lit),
        help("each line must hold one byte written as up to 8 binary digits")
    )]
    BadLiteral {
        file: String,
        line: usize,
        literal: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not an 8-bit binary literal")]
        span: SourceSpan,
    },

    #[error("program is {len} bytes long but memory only holds {capacity}")]
    #[diagnostic(code(load::too_long), help("split the program or shorten it"))]
    TooLong { len: usize, capacity: usize },
}

// Runtime errors

/// Something the running program did that the machine cannot carry out.
#[derive(Debug, Error, Diagnostic)]
pub enum Fault {
    #[error("memory access out of bounds at address {address:#04x}")]
    #[diagnostic(code(run::out_of_bounds))]
    OutOfBounds { address: usize },

    #[error("invalid register R{index}")]
    #[diagnostic(code(run::bad_reg), help("registers are numbered R0 to R7"))]
    InvalidRegister { index: u8 },

    #[error("division by zero")]
    #[diagnostic(code(run::div_zero), help("check the divisor register before DIV or MOD"))]
    DivisionByZero,

    #[error("unknown instruction {byte} ({byte:#010b})")]
    #[diagnostic(code(run::unknown_instr))]
    UnknownInstruction { byte: u8 },

    #[error("unsupported ALU operation {opcode}")]
    #[diagnostic(code(run::unsupported_alu))]
    UnsupportedOperation { opcode: Opcode },

    #[error("stack overflow")]
    #[diagnostic(code(run::stack_overflow), help("the stack pointer (R7) cannot go below 0"))]
    StackOverflow,

    #[error("stack underflow")]
    #[diagnostic(code(run::stack_underflow), help("more values were popped than pushed"))]
    StackUnderflow,

    #[error("failed to write program output")]
    #[diagnostic(code(run::output))]
    Output(#[from] io::Error),
}

/// A [`Fault`] together with the address of the instruction that raised it.
#[derive(Debug, Error)]
#[error("{fault} (pc {pc:#04x})")]
pub struct VmError {
    pub pc: usize,
    pub fault: Fault,
}

impl VmError {
    pub fn new(pc: usize, fault: Fault) -> Self {
        VmError { pc, fault }
    }
}

impl Diagnostic for VmError {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.fault.code()
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.fault.help()
    }
}
