use crate::error::Fault;

pub const REGISTER_COUNT: usize = 8;

/// Register holding the stack pointer.
pub const SP: u8 = 7;

/// 8x 8-bit general purpose registers. R7 doubles as the stack pointer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    reg: [u8; REGISTER_COUNT],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: u8) -> Result<u8, Fault> {
        self.reg
            .get(index as usize)
            .copied()
            .ok_or(Fault::InvalidRegister { index })
    }

    pub fn set(&mut self, index: u8, value: u8) -> Result<(), Fault> {
        let reg = self
            .reg
            .get_mut(index as usize)
            .ok_or(Fault::InvalidRegister { index })?;
        *reg = value;
        Ok(())
    }

    #[inline]
    pub fn sp(&self) -> u8 {
        self.reg[SP as usize]
    }

    #[inline]
    pub fn set_sp(&mut self, value: u8) {
        self.reg[SP as usize] = value;
    }

    pub fn as_array(&self) -> &[u8; REGISTER_COUNT] {
        &self.reg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let mut regs = RegisterFile::new();
        for index in 0..REGISTER_COUNT as u8 {
            for value in [0, 1, 0x80, 0xff] {
                regs.set(index, value).unwrap();
                assert_eq!(regs.get(index).unwrap(), value);
            }
        }
    }

    #[test]
    fn invalid_index() {
        let mut regs = RegisterFile::new();
        assert!(matches!(
            regs.get(8),
            Err(Fault::InvalidRegister { index: 8 })
        ));
        assert!(matches!(
            regs.set(0xff, 1),
            Err(Fault::InvalidRegister { index: 0xff })
        ));
        assert_eq!(regs, RegisterFile::new());
    }

    #[test]
    fn sp_is_r7() {
        let mut regs = RegisterFile::new();
        regs.set_sp(0xf4);
        assert_eq!(regs.get(7).unwrap(), 0xf4);
        regs.set(7, 0x10).unwrap();
        assert_eq!(regs.sp(), 0x10);
    }
}
