use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::MEMORY_SIZE;

/// Fault classes, coarser than [`VmError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultKind {
    Opcode,
    Arithmetic,
    Address,
    Budget,
    Output,
}

/// Errors that abort execution of a program.
#[derive(Error, Debug)]
pub enum VmError {
    /// Fetched byte is not an instruction.
    #[error("unknown opcode 0b{opcode:08b} (0x{opcode:02X}) at address {pc}")]
    UnknownOpcode { opcode: u8, pc: usize },

    /// `DIV` with a zero divisor.
    #[error("division by zero (R{reg_a} / R{reg_b})")]
    DivisionByZero { reg_a: u8, reg_b: u8 },

    #[error("memory address {address} out of bounds")]
    MemoryOutOfBounds { address: usize },

    #[error("register index {index} out of bounds")]
    InvalidRegister { index: u8 },

    /// Push with the stack pointer already at address 0.
    #[error("stack overflow at address {pc}")]
    StackOverflow { pc: usize },

    /// Pop with the stack pointer at the last address.
    #[error("stack underflow at address {pc}")]
    StackUnderflow { pc: usize },

    #[error("program of {len} bytes does not fit in {} bytes of memory", MEMORY_SIZE)]
    ProgramTooLarge { len: usize },

    #[error("step limit of {limit} exceeded")]
    StepLimitExceeded { limit: u64 },

    #[error("output sink failed: {0}")]
    Output(#[from] std::io::Error),

    /// A component fault raised while executing the instruction at `pc`.
    #[error("at address {pc}: {source}")]
    At {
        pc: usize,
        #[source]
        source: Box<VmError>,
    },
}

impl VmError {
    /// Attaches the faulting instruction address, unless the error
    /// already names one.
    pub fn at(self, pc: usize) -> Self {
        match self {
            VmError::UnknownOpcode { .. }
            | VmError::StackOverflow { .. }
            | VmError::StackUnderflow { .. }
            | VmError::StepLimitExceeded { .. }
            | VmError::Output(_)
            | VmError::At { .. } => self,
            other => VmError::At {
                pc,
                source: Box::new(other),
            },
        }
    }

    /// Address of the instruction that faulted, when known.
    pub fn pc(&self) -> Option<usize> {
        match self {
            VmError::UnknownOpcode { pc, .. }
            | VmError::StackOverflow { pc }
            | VmError::StackUnderflow { pc }
            | VmError::At { pc, .. } => Some(*pc),
            _ => None,
        }
    }

    /// The error with any address context stripped.
    pub fn cause(&self) -> &VmError {
        match self {
            VmError::At { source, .. } => source.cause(),
            other => other,
        }
    }

    pub fn kind(&self) -> FaultKind {
        match self.cause() {
            VmError::UnknownOpcode { .. } => FaultKind::Opcode,
            VmError::DivisionByZero { .. } => FaultKind::Arithmetic,
            VmError::MemoryOutOfBounds { .. }
            | VmError::InvalidRegister { .. }
            | VmError::StackOverflow { .. }
            | VmError::StackUnderflow { .. }
            | VmError::ProgramTooLarge { .. } => FaultKind::Address,
            VmError::StepLimitExceeded { .. } => FaultKind::Budget,
            VmError::Output(_) => FaultKind::Output,
            VmError::At { source, .. } => source.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_wraps_component_faults_once() {
        let err = VmError::DivisionByZero { reg_a: 0, reg_b: 1 }.at(12).at(40);
        assert_eq!(err.pc(), Some(12));
        assert!(matches!(err.cause(), VmError::DivisionByZero { .. }));
        assert_eq!(err.kind(), FaultKind::Arithmetic);
        assert_eq!(err.to_string(), "at address 12: division by zero (R0 / R1)");
    }

    #[test]
    fn at_keeps_errors_that_name_their_pc() {
        let err = VmError::UnknownOpcode { opcode: 0xFF, pc: 4 }.at(9);
        assert!(matches!(err, VmError::UnknownOpcode { pc: 4, .. }));
        assert_eq!(
            err.to_string(),
            "unknown opcode 0b11111111 (0xFF) at address 4"
        );
    }

    #[test]
    fn kinds() {
        assert_eq!(
            VmError::MemoryOutOfBounds { address: 256 }.kind(),
            FaultKind::Address
        );
        assert_eq!(VmError::StackOverflow { pc: 0 }.kind(), FaultKind::Address);
        assert_eq!(
            VmError::StepLimitExceeded { limit: 10 }.kind(),
            FaultKind::Budget
        );
        assert_eq!(VmError::StepLimitExceeded { limit: 10 }.pc(), None);
    }

    #[test]
    fn program_too_large_names_memory_size() {
        assert_eq!(
            VmError::ProgramTooLarge { len: 300 }.to_string(),
            "program of 300 bytes does not fit in 256 bytes of memory"
        );
    }
}
