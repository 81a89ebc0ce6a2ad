use std::fmt;

/// Every instruction the machine understands.
///
/// The discriminant is the encoded byte, laid out as `AABCDDDD`:
/// - `AA`: number of operand bytes that follow
/// - `B`: handled by the ALU
/// - `C`: the instruction sets the PC itself
/// - `DDDD`: instruction identifier
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Halt the machine
    HLT = 0b0000_0001,
    /// Load immediate `b` into register `a`
    LDI = 0b1000_0010,
    /// Print register `a` in decimal
    PRN = 0b0100_0111,
    ADD = 0b1010_0000,
    SUB = 0b1010_0001,
    MUL = 0b1010_0010,
    DIV = 0b1010_0011,
    MOD = 0b1010_0100,
    /// Push register `a` onto the stack
    PUSH = 0b0100_0101,
    /// Pop the top of the stack into register `a`
    POP = 0b0100_0110,
    /// Push the return address and jump to register `a`
    CALL = 0b0101_0000,
    /// Pop the return address into the PC
    RET = 0b0001_0001,
    /// Set the equal flag if registers `a` and `b` match
    CMP = 0b1010_0111,
    JMP = 0b0101_0100,
    JEQ = 0b0101_0101,
    JNE = 0b0101_0110,
}

impl Opcode {
    pub const ALL: [Opcode; 16] = [
        Opcode::HLT,
        Opcode::LDI,
        Opcode::PRN,
        Opcode::ADD,
        Opcode::SUB,
        Opcode::MUL,
        Opcode::DIV,
        Opcode::MOD,
        Opcode::PUSH,
        Opcode::POP,
        Opcode::CALL,
        Opcode::RET,
        Opcode::CMP,
        Opcode::JMP,
        Opcode::JEQ,
        Opcode::JNE,
    ];

    // Byte -> opcode, built once at compile time
    const DECODE: [Option<Opcode>; 256] = {
        let mut table = [None; 256];
        let mut i = 0;
        while i < Opcode::ALL.len() {
            let op = Opcode::ALL[i];
            table[op as usize] = Some(op);
            i += 1;
        }
        table
    };

    #[inline]
    pub fn decode(byte: u8) -> Option<Opcode> {
        Self::DECODE[byte as usize]
    }

    #[inline]
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Number of operand bytes following the opcode.
    #[inline]
    pub fn operand_count(self) -> usize {
        (self.byte() >> 6) as usize
    }

    /// Total encoded size in bytes, opcode included.
    #[inline]
    pub fn width(self) -> usize {
        1 + self.operand_count()
    }

    #[inline]
    pub fn is_alu(self) -> bool {
        self.byte() & 0b0010_0000 != 0
    }

    #[inline]
    pub fn sets_pc(self) -> bool {
        self.byte() & 0b0001_0000 != 0
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::HLT => "HLT",
            Opcode::LDI => "LDI",
            Opcode::PRN => "PRN",
            Opcode::ADD => "ADD",
            Opcode::SUB => "SUB",
            Opcode::MUL => "MUL",
            Opcode::DIV => "DIV",
            Opcode::MOD => "MOD",
            Opcode::PUSH => "PUSH",
            Opcode::POP => "POP",
            Opcode::CALL => "CALL",
            Opcode::RET => "RET",
            Opcode::CMP => "CMP",
            Opcode::JMP => "JMP",
            Opcode::JEQ => "JEQ",
            Opcode::JNE => "JNE",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Opcode::decode(byte).ok_or(byte)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_opcode() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::decode(op.byte()), Some(op));
        }
        assert_eq!(Opcode::decode(0), None);
        assert_eq!(Opcode::try_from(0xFF), Err(0xFF));
    }

    #[test]
    fn widths_follow_encoding() {
        #[rustfmt::skip]
        let cases = [
            (Opcode::HLT, 1), (Opcode::RET, 1),
            (Opcode::PRN, 2), (Opcode::PUSH, 2), (Opcode::POP, 2),
            (Opcode::CALL, 2), (Opcode::JMP, 2), (Opcode::JEQ, 2), (Opcode::JNE, 2),
            (Opcode::LDI, 3), (Opcode::ADD, 3), (Opcode::SUB, 3), (Opcode::MUL, 3),
            (Opcode::DIV, 3), (Opcode::MOD, 3), (Opcode::CMP, 3),
        ];
        for (op, width) in cases {
            assert_eq!(op.width(), width, "width of {op}");
        }
    }

    #[test]
    fn control_flow_bits() {
        let jumps: Vec<_> = Opcode::ALL.into_iter().filter(|op| op.sets_pc()).collect();
        assert_eq!(
            jumps,
            [Opcode::CALL, Opcode::RET, Opcode::JMP, Opcode::JEQ, Opcode::JNE]
        );
        assert!(Opcode::MOD.is_alu());
        assert!(!Opcode::LDI.is_alu());
    }

    #[test]
    fn no_duplicate_encodings() {
        for (i, a) in Opcode::ALL.iter().enumerate() {
            for b in &Opcode::ALL[i + 1..] {
                assert_ne!(a.byte(), b.byte(), "{a} and {b} share an encoding");
            }
        }
    }
}
