use std::fmt;

use crate::isa::Opcode;

/// One row of a listing: either a decoded instruction or a stray byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub addr: usize,
    pub bytes: Vec<u8>,
    pub opcode: Option<Opcode>,
}

/// Decode `program` from address 0, stepping over each instruction's operands.
///
/// Bytes that are not opcodes, or whose operands run past the end of the
/// program, are listed on their own as raw data.
pub fn disassemble(program: &[u8]) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut addr = 0;
    while addr < program.len() {
        let byte = program[addr];
        let line = match Opcode::decode(byte) {
            Some(op) if addr + op.width() <= program.len() => Line {
                addr,
                bytes: program[addr..addr + op.width()].to_vec(),
                opcode: Some(op),
            },
            _ => Line {
                addr,
                bytes: vec![byte],
                opcode: None,
            },
        };
        addr += line.bytes.len();
        lines.push(line);
    }
    lines
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:", self.addr)?;
        for byte in &self.bytes {
            write!(f, " {byte:08b}")?;
        }
        // Pad raw bytes to the widest instruction so mnemonics line up
        for _ in self.bytes.len()..3 {
            write!(f, "         ")?;
        }
        let Some(op) = self.opcode else {
            return write!(f, "  .byte {}", self.bytes[0]);
        };
        write!(f, "  {op:<4}")?;
        match (op, &self.bytes[1..]) {
            (Opcode::LDI, [reg, imm]) => write!(f, " R{reg}, {imm}"),
            (op, [a, b]) if op.is_alu() => write!(f, " R{a}, R{b}"),
            (_, [a]) => write!(f, " R{a}"),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_instructions() {
        let listing: Vec<String> = disassemble(&[0b1000_0010, 0, 8, 0b0100_0111, 0, 0b0000_0001])
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            listing,
            [
                "00: 10000010 00000000 00001000  LDI  R0, 8",
                "03: 01000111 00000000           PRN  R0",
                "05: 00000001                    HLT ",
            ]
        );
    }

    #[test]
    fn raw_bytes() {
        // Unknown byte, then an ADD cut short by the end of the program
        let lines = disassemble(&[0xff, 0b1010_0000, 0]);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.opcode.is_none()));
        assert_eq!(lines[0].to_string(), "00: 11111111                    .byte 255");
        assert_eq!(lines[2].addr, 2);

        // A lone trailing 1 is a complete HLT
        let lines = disassemble(&[0xff, 1]);
        assert_eq!(lines[1].opcode, Some(Opcode::HLT));
    }

    #[test]
    fn alu_operands() {
        let lines = disassemble(&[0b1010_0111, 2, 3]);
        assert_eq!(lines[0].opcode, Some(Opcode::CMP));
        assert!(lines[0].to_string().ends_with("CMP  R2, R3"));
    }
}
