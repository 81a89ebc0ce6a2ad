use std::fmt::Write as _;
use std::io::Write;

use crate::alu::AluOp;
use crate::error::{Fault, LoadError, VmError};
use crate::flags::{Condition, Flags};
use crate::isa::Opcode;
use crate::loader::Program;
use crate::memory::{Memory, MEMORY_SIZE};
use crate::registers::RegisterFile;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
}

/// A decoded instruction. Both operand bytes are always fetched, used or not.
#[derive(Clone, Copy, Debug)]
pub struct Instruction {
    pub opcode: Opcode,
    pub a: u8,
    pub b: u8,
}

/// What the PC does once an instruction has executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    /// Move past the instruction and its operands
    Next,
    Jump(usize),
    Halt,
}

type Handler = fn(&mut Vm, Instruction, &mut dyn Write) -> Result<Flow, Fault>;

/// Represents complete machine state during runtime.
pub struct Vm {
    mem: Memory,
    reg: RegisterFile,
    /// Program counter
    pc: usize,
    flags: Flags,
    state: State,
    trace: bool,
}

impl Default for Vm {
    fn default() -> Self {
        Vm::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        Vm::with_memory_size(MEMORY_SIZE)
    }

    /// Machine with `size` bytes of memory, clamped to what an 8-bit
    /// register can address.
    pub fn with_memory_size(size: usize) -> Self {
        let size = size.clamp(1, MEMORY_SIZE);
        let mut reg = RegisterFile::new();
        reg.set_sp((size - 1) as u8);
        Vm {
            mem: Memory::new(size),
            reg,
            pc: 0,
            flags: Flags::default(),
            state: State::Running,
            trace: false,
        }
    }

    pub fn from_program(program: &Program) -> Result<Vm, LoadError> {
        let mut vm = Vm::new();
        vm.load(program)?;
        Ok(vm)
    }

    pub fn load(&mut self, program: &Program) -> Result<(), LoadError> {
        self.mem.load(program.bytes())
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    /// Handler for every opcode, so dispatch is a single indexed lookup.
    const OP_TABLE: [Option<Handler>; 256] = {
        let mut table: [Option<Handler>; 256] = [None; 256];
        table[Opcode::HLT as usize] = Some(Self::hlt as Handler);
        table[Opcode::LDI as usize] = Some(Self::ldi as Handler);
        table[Opcode::PRN as usize] = Some(Self::prn as Handler);
        table[Opcode::ADD as usize] = Some(Self::alu as Handler);
        table[Opcode::SUB as usize] = Some(Self::alu as Handler);
        table[Opcode::MUL as usize] = Some(Self::alu as Handler);
        table[Opcode::DIV as usize] = Some(Self::alu as Handler);
        table[Opcode::MOD as usize] = Some(Self::alu as Handler);
        table[Opcode::PUSH as usize] = Some(Self::push as Handler);
        table[Opcode::POP as usize] = Some(Self::pop as Handler);
        table[Opcode::CALL as usize] = Some(Self::call as Handler);
        table[Opcode::RET as usize] = Some(Self::ret as Handler);
        table[Opcode::CMP as usize] = Some(Self::cmp as Handler);
        table[Opcode::JMP as usize] = Some(Self::jmp as Handler);
        table[Opcode::JEQ as usize] = Some(Self::jeq as Handler);
        table[Opcode::JNE as usize] = Some(Self::jne as Handler);
        table
    };

    /// Run until `HLT`, returning the number of instructions executed.
    pub fn run(&mut self, out: &mut dyn Write) -> Result<usize, VmError> {
        let mut steps = 0;
        while self.state == State::Running {
            self.step(out)?;
            steps += 1;
        }
        out.flush().map_err(|e| VmError::new(self.pc, e.into()))?;
        Ok(steps)
    }

    /// Fetch, decode and execute a single instruction.
    pub fn step(&mut self, out: &mut dyn Write) -> Result<State, VmError> {
        if self.state == State::Halted {
            return Ok(State::Halted);
        }
        if self.trace {
            dprintln!(Always, "{}", self.trace_line());
        }
        let pc = self.pc;
        self.execute(out).map_err(|fault| VmError::new(pc, fault))?;
        Ok(self.state)
    }

    fn execute(&mut self, out: &mut dyn Write) -> Result<(), Fault> {
        let byte = self.mem.read(self.pc)?;
        let a = self.mem.read(self.pc + 1)?;
        let b = self.mem.read(self.pc + 2)?;

        let (opcode, handler) = match (Opcode::decode(byte), Self::OP_TABLE[byte as usize]) {
            (Some(opcode), Some(handler)) => (opcode, handler),
            _ => return Err(Fault::UnknownInstruction { byte }),
        };

        let flow = handler(self, Instruction { opcode, a, b }, out)?;
        debug_assert!(
            opcode.sets_pc() || !matches!(flow, Flow::Jump(_)),
            "{opcode} jumped without the sets-PC bit"
        );
        match flow {
            Flow::Next => self.pc += opcode.width(),
            Flow::Jump(addr) => self.pc = addr,
            Flow::Halt => self.state = State::Halted,
        }
        Ok(())
    }

    fn hlt(&mut self, _ins: Instruction, _out: &mut dyn Write) -> Result<Flow, Fault> {
        Ok(Flow::Halt)
    }

    fn ldi(&mut self, ins: Instruction, _out: &mut dyn Write) -> Result<Flow, Fault> {
        self.reg.set(ins.a, ins.b)?;
        Ok(Flow::Next)
    }

    fn prn(&mut self, ins: Instruction, out: &mut dyn Write) -> Result<Flow, Fault> {
        let val = self.reg.get(ins.a)?;
        writeln!(out, "{val}")?;
        Ok(Flow::Next)
    }

    fn alu(&mut self, ins: Instruction, _out: &mut dyn Write) -> Result<Flow, Fault> {
        AluOp::try_from(ins.opcode)?.apply(&mut self.reg, ins.a, ins.b)?;
        Ok(Flow::Next)
    }

    fn push(&mut self, ins: Instruction, _out: &mut dyn Write) -> Result<Flow, Fault> {
        let val = self.reg.get(ins.a)?;
        self.push_val(val)?;
        Ok(Flow::Next)
    }

    fn pop(&mut self, ins: Instruction, _out: &mut dyn Write) -> Result<Flow, Fault> {
        // Leave SP alone if the destination is bad
        self.reg.get(ins.a)?;
        let val = self.pop_val()?;
        self.reg.set(ins.a, val)?;
        Ok(Flow::Next)
    }

    fn call(&mut self, ins: Instruction, _out: &mut dyn Write) -> Result<Flow, Fault> {
        let target = self.reg.get(ins.a)?;
        let ret = self.pc + Opcode::CALL.width();
        let ret = u8::try_from(ret).map_err(|_| Fault::OutOfBounds { address: ret })?;
        self.push_val(ret)?;
        Ok(Flow::Jump(target as usize))
    }

    fn ret(&mut self, _ins: Instruction, _out: &mut dyn Write) -> Result<Flow, Fault> {
        let addr = self.pop_val()?;
        Ok(Flow::Jump(addr as usize))
    }

    fn cmp(&mut self, ins: Instruction, _out: &mut dyn Write) -> Result<Flow, Fault> {
        let val1 = self.reg.get(ins.a)?;
        let val2 = self.reg.get(ins.b)?;
        self.flags.compare(val1, val2);
        Ok(Flow::Next)
    }

    fn jmp(&mut self, ins: Instruction, _out: &mut dyn Write) -> Result<Flow, Fault> {
        Ok(Flow::Jump(self.reg.get(ins.a)? as usize))
    }

    fn jeq(&mut self, ins: Instruction, _out: &mut dyn Write) -> Result<Flow, Fault> {
        self.branch(Condition::Equal, ins.a)
    }

    fn jne(&mut self, ins: Instruction, _out: &mut dyn Write) -> Result<Flow, Fault> {
        self.branch(Condition::NotEqual, ins.a)
    }

    fn branch(&self, cond: Condition, reg: u8) -> Result<Flow, Fault> {
        if cond.holds(self.flags) {
            Ok(Flow::Jump(self.reg.get(reg)? as usize))
        } else {
            Ok(Flow::Next)
        }
    }

    fn push_val(&mut self, val: u8) -> Result<(), Fault> {
        // Decrement stack
        let sp = self.reg.sp().checked_sub(1).ok_or(Fault::StackOverflow)?;
        self.mem.write(sp as usize, val)?;
        self.reg.set_sp(sp);
        Ok(())
    }

    fn pop_val(&mut self) -> Result<u8, Fault> {
        let sp = self.reg.sp();
        // The top byte of memory is never part of the stack
        if sp as usize >= self.mem.size() - 1 {
            return Err(Fault::StackUnderflow);
        }
        let val = self.mem.read(sp as usize)?;
        self.reg.set_sp(sp + 1);
        Ok(val)
    }

    /// `TRACE: PC | M[PC] M[PC+1] M[PC+2] | R0 .. R7`, all in hex.
    pub fn trace_line(&self) -> String {
        let mut line = format!("TRACE: {:02X} |", self.pc);
        for addr in self.pc..self.pc + 3 {
            let _ = match self.mem.peek(addr) {
                Some(byte) => write!(line, " {byte:02X}"),
                None => write!(line, " --"),
            };
        }
        line.push_str(" |");
        for val in self.reg.as_array() {
            let _ = write!(line, " {val:02X}");
        }
        line
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.reg
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn state(&self) -> State {
        self.state
    }
}
