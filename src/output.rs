use std::cell::RefCell;

use colored::{ColoredString, Colorize};

use crate::registers::SP;
use crate::Vm;

#[macro_export]
macro_rules! dprintln {
    ( $cond:expr ) => {{
        #[allow(unused_imports)]
        use $crate::output::Condition::*;
        $crate::output::Output::Debugger($cond).print_str("\n");
    }};
    ( $cond:expr, $fmt:literal $($tt:tt)* ) => {{
        #[allow(unused_imports)]
        use $crate::output::Condition::*;
        let s = format!(
            concat!($fmt, "\n")
            $($tt)*
        );
        $crate::output::Output::Debugger($cond).print_str(&s);
    }};
    // Trigger type error if missing condition
    ( $fmt:literal $($tt:tt)* ) => {{
        $crate::output::Output::Debugger($fmt);
    }};
}

/// Where a message goes: program output on stdout, diagnostics on stderr.
#[derive(Clone, Copy, Debug)]
pub enum Output {
    Normal,
    Debugger(Condition),
}

/// Whether a diagnostic survives `--minimal`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    Always,
    Sometimes,
}

impl Output {
    thread_local! {
        static IS_MINIMAL: RefCell<bool> = const { RefCell::new(false) };
    }

    pub fn set_minimal(new_value: bool) -> bool {
        Self::IS_MINIMAL.with(|value| value.replace(new_value))
    }
    pub fn is_minimal() -> bool {
        Self::IS_MINIMAL.with(|value| *value.borrow())
    }

    pub fn print_str(&self, string: &str) {
        match self {
            Self::Normal => match Self::is_minimal() {
                false => print!("{}", string),
                true => print_colorless(string),
            },

            Self::Debugger(condition) => match (Self::is_minimal(), *condition) {
                (false, _) => eprint!("{}", ColoredString::from(string).blue()),
                // Always remove color if `--minimal`
                (true, Condition::Always) => eprint_colorless(string),
                (true, Condition::Sometimes) => (),
            },
        }
    }

    pub fn print_registers(&self, vm: &Vm) {
        let regs = vm.registers().as_array();
        if Self::is_minimal() {
            for (i, val) in regs.iter().enumerate() {
                self.print_str(&format!("R{} {}\n", i, val));
            }
            self.print_str(&format!("PC {}\n", vm.pc()));
            self.print_str(&format!("FL {}\n", vm.flags().bits()));
            return;
        }

        self.print_str("\x1b[2m┌──────────────────────────┐\x1b[0m\n");
        self.print_str("\x1b[2m│        \x1b[3mhex  uint  char\x1b[0m\x1b[2m   │\x1b[0m\n");
        for (i, val) in regs.iter().enumerate() {
            self.print_str("\x1b[2m│\x1b[0m");
            let label = if i == SP as usize {
                "SP".to_string()
            } else {
                format!("R{i}")
            };
            self.print_str(&format!(" \x1b[1m{label:<2}\x1b[0m  "));
            self.print_integer(*val);
            self.print_str(" \x1b[2m│\x1b[0m\n");
        }
        self.print_str("\x1b[2m│\x1b[0m");
        self.print_str(&format!(" \x1b[1mPC\x1b[0m  0x{:02x}", vm.pc()));
        self.print_str(&format!("      \x1b[1mFL\x1b[0m  {}", vm.flags().bits()));
        self.print_str("    \x1b[2m│\x1b[0m\n");
        self.print_str("\x1b[2m└──────────────────────────┘\x1b[0m\n");
    }

    fn print_integer(&self, value: u8) {
        self.print_str(&format!("0x{:02x}  {:4}    {}", value, value, char_cell(value)));
    }
}

/// Three-column rendering of a byte as text, for the register dump.
fn char_cell(value: u8) -> String {
    match value {
        b' ' => "[_]".to_string(),
        b'\n' => "\\n ".to_string(),
        b'\t' => "\\t ".to_string(),
        b'\r' => "\\r ".to_string(),
        _ if value.is_ascii_graphic() => format!("{:<3}", value as char),
        _ => "\x1b[2m···\x1b[0m".to_string(),
    }
}

/// Drop ANSI escape sequences (`ESC ... m`), keeping everything else.
fn strip_ansi(string: &str) -> String {
    let mut parts = string.split('\x1b');
    let mut plain = parts.next().unwrap_or_default().to_string();
    for part in parts {
        // An unterminated sequence swallows the rest of its part
        if let Some((_, rest)) = part.split_once('m') {
            plain.push_str(rest);
        }
    }
    plain
}

fn print_colorless(string: &str) {
    print!("{}", strip_ansi(string));
}

fn eprint_colorless(string: &str) {
    eprint!("{}", strip_ansi(string));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_colour() {
        assert_eq!(strip_ansi("abcdef"), "abcdef");
        assert_eq!(strip_ansi("abc\x1b[0;2mdef\x1b[0m"), "abcdef");
        assert_eq!(strip_ansi("\x1b[1mR0\x1b[0m 17"), "R0 17");
        assert_eq!(strip_ansi("abc\x1b[0xyz"), "abc");
        assert_eq!(strip_ansi("abc\x1bw[0bxyzmdef"), "abcdef");
    }

    #[test]
    fn char_cells_are_three_wide() {
        #[rustfmt::skip]
        let cases = [
            (b'A', "A  "), (b' ', "[_]"), (b'\n', "\\n "),
            (b'~', "~  "), (0x00, "···"), (0x7f, "···"), (0xff, "···"),
        ];
        for (value, expected) in cases {
            let cell = strip_ansi(&char_cell(value));
            assert_eq!(cell, expected, "byte {value:#04x}");
            assert_eq!(cell.chars().count(), 3);
        }
    }

    #[test]
    fn minimal_is_thread_local() {
        assert!(!Output::is_minimal());
        assert!(!Output::set_minimal(true));
        assert!(Output::is_minimal());
        std::thread::spawn(|| assert!(!Output::is_minimal()))
            .join()
            .unwrap();
        Output::set_minimal(false);
    }
}
