use crate::error::Fault;
use crate::isa::Opcode;
use crate::registers::RegisterFile;

/// Register-to-register arithmetic. Results wrap to 8 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl TryFrom<Opcode> for AluOp {
    type Error = Fault;

    fn try_from(opcode: Opcode) -> Result<Self, Self::Error> {
        match opcode {
            Opcode::ADD => Ok(AluOp::Add),
            Opcode::SUB => Ok(AluOp::Sub),
            Opcode::MUL => Ok(AluOp::Mul),
            Opcode::DIV => Ok(AluOp::Div),
            Opcode::MOD => Ok(AluOp::Mod),
            _ => Err(Fault::UnsupportedOperation { opcode }),
        }
    }
}

impl AluOp {
    pub fn eval(self, a: u8, b: u8) -> Result<u8, Fault> {
        let res = match self {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Sub => a.wrapping_sub(b),
            AluOp::Mul => a.wrapping_mul(b),
            AluOp::Div => a.checked_div(b).ok_or(Fault::DivisionByZero)?,
            AluOp::Mod => a.checked_rem(b).ok_or(Fault::DivisionByZero)?,
        };
        Ok(res)
    }

    /// `reg[a] = reg[a] <op> reg[b]`. `reg[a]` is untouched on failure.
    pub fn apply(self, regs: &mut RegisterFile, reg_a: u8, reg_b: u8) -> Result<(), Fault> {
        let val1 = regs.get(reg_a)?;
        let val2 = regs.get(reg_b)?;
        let res = self.eval(val1, val2)?;
        regs.set(reg_a, res)
    }
}
