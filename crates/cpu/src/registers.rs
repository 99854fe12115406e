use crate::error::VmError;
use crate::{REGISTER_COUNT, SP, STACK_TOP};

/// Eight 8-bit registers. R7 starts at the stack top; the engine, not this
/// type, treats it as the stack pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u8; REGISTER_COUNT],
}

impl RegisterFile {
    pub fn new(stack_top: u8) -> Self {
        let mut regs = [0; REGISTER_COUNT];
        regs[SP as usize] = stack_top;
        Self { regs }
    }

    #[inline]
    pub fn get(&self, index: u8) -> Result<u8, VmError> {
        self.regs
            .get(index as usize)
            .copied()
            .ok_or(VmError::InvalidRegister { index })
    }

    #[inline]
    pub fn set(&mut self, index: u8, value: u8) -> Result<(), VmError> {
        let slot = self
            .regs
            .get_mut(index as usize)
            .ok_or(VmError::InvalidRegister { index })?;
        *slot = value;
        Ok(())
    }

    pub fn snapshot(&self) -> [u8; REGISTER_COUNT] {
        self.regs
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new(STACK_TOP)
    }
}
