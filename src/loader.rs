use std::fs;
use std::io;
use std::path::Path;

use miette::NamedSource;

use crate::error::LoadError;

/// A fully parsed program, ready to be copied into memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    name: String,
    bytes: Vec<u8>,
}

impl Program {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Program {
            name: name.into(),
            bytes,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Program::parse(path.display().to_string(), &src)
    }

    /// Parse one byte per line, each written in binary. Text after `#` is a
    /// comment; blank lines are skipped.
    pub fn parse(name: impl Into<String>, src: &str) -> Result<Self, LoadError> {
        let name = name.into();
        let mut bytes = Vec::new();
        let mut offs = 0;

        for (i, line) in src.split_inclusive('\n').enumerate() {
            let line_start = offs;
            offs += line.len();

            // Get line without comment & whitespace
            let code = match line.find('#') {
                Some(idx) => &line[..idx],
                None => line,
            };
            let lead = code.len() - code.trim_start().len();
            let code = code.trim();
            if code.is_empty() {
                continue;
            }

            match parse_literal(code) {
                Some(byte) => bytes.push(byte),
                None => {
                    return Err(LoadError::BadLiteral {
                        file: name.clone(),
                        line: i + 1,
                        literal: code.to_string(),
                        src: NamedSource::new(&name, src.to_string()),
                        span: (line_start + lead, code.len()).into(),
                    })
                }
            }
        }

        Ok(Program { name, bytes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn parse_literal(code: &str) -> Option<u8> {
    if !code.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }
    u8::from_str_radix(code, 2).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_blanks() {
        let src = "\
# print8
10000010 # LDI R0,8
00000000

00001000
   01000111
00000000
00000001 # HLT
";
        let program = Program::parse("print8", src).unwrap();
        assert_eq!(
            program.bytes(),
            &[0b1000_0010, 0, 8, 0b0100_0111, 0, 0b0000_0001]
        );
        assert_eq!(program.name(), "print8");
    }

    #[test]
    fn crlf_and_short_literals() {
        let program = Program::parse("p", "1\r\n101\r\n00000000\r\n").unwrap();
        assert_eq!(program.bytes(), &[1, 5, 0]);
    }

    #[test]
    fn only_comments() {
        let program = Program::parse("empty", "# nothing\n\n   # here\n").unwrap();
        assert!(program.is_empty());
    }

    #[test]
    fn bad_literal_names_line() {
        let src = "10000010\n  0000002x # oops\n";
        let Err(LoadError::BadLiteral {
            file,
            line,
            literal,
            span,
            ..
        }) = Program::parse("bad.ls8", src)
        else {
            panic!("expected a bad literal error");
        };
        assert_eq!(file, "bad.ls8");
        assert_eq!(line, 2);
        assert_eq!(literal, "0000002x");
        assert_eq!(span.offset(), 11);
        assert_eq!(span.len(), 8);
    }

    #[test]
    fn rejects_wide_and_signed_literals() {
        assert!(Program::parse("p", "100000000\n").is_err());
        assert!(Program::parse("p", "+1\n").is_err());
        assert!(Program::parse("p", "0b1\n").is_err());
    }

    #[test]
    fn missing_file() {
        let err = Program::from_file("definitely/not/here.ls8").unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert!(err.to_string().ends_with("definitely/not/here.ls8 not found"));
    }
}
