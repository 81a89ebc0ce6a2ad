// Output, must come first for macros
#[macro_use]
pub mod output;

// Machine
mod alu;
pub use alu::AluOp;
mod flags;
pub use flags::{Condition, Flags};
pub mod isa;
pub use isa::Opcode;
pub mod memory;
pub use memory::Memory;
pub mod registers;
pub use registers::RegisterFile;
mod vm;
pub use vm::{Instruction, State, Vm};

// Loading
mod loader;
pub use loader::Program;
pub mod disasm;

mod error;
pub use error::{Fault, LoadError, VmError};

pub mod env;

/// Amount of lines to show as context, each side of focus line (line containing span).
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 4;
