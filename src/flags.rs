/// Condition register. Written by `CMP`, read by `JEQ`/`JNE`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    equal: bool,
}

/// Condition tested by a conditional jump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    Equal,
    NotEqual,
}

impl Flags {
    pub fn compare(&mut self, a: u8, b: u8) {
        self.equal = a == b;
    }

    pub fn is_equal(&self) -> bool {
        self.equal
    }

    /// Raw flag bit, as shown in traces and register dumps.
    pub fn bits(&self) -> u8 {
        self.equal as u8
    }
}

impl Condition {
    pub fn holds(self, flags: Flags) -> bool {
        match self {
            Condition::Equal => flags.is_equal(),
            Condition::NotEqual => !flags.is_equal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_sets_bit() {
        let mut flags = Flags::default();
        assert_eq!(flags.bits(), 0);
        flags.compare(5, 5);
        assert_eq!(flags.bits(), 1);
        assert!(Condition::Equal.holds(flags));
        assert!(!Condition::NotEqual.holds(flags));
        flags.compare(5, 6);
        assert_eq!(flags.bits(), 0);
        assert!(Condition::NotEqual.holds(flags));
    }
}
