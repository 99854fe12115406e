use serde::{Deserialize, Serialize};

use crate::error::VmError;
use crate::flags::Flags;
use crate::isa::Opcode;
use crate::registers::RegisterFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Cmp,
}

impl AluOp {
    pub fn opcode(self) -> Opcode {
        match self {
            AluOp::Add => Opcode::Add,
            AluOp::Sub => Opcode::Sub,
            AluOp::Mul => Opcode::Mul,
            AluOp::Div => Opcode::Div,
            AluOp::Cmp => Opcode::Cmp,
        }
    }
}

/// Applies `op` to `reg_a` and `reg_b`, storing into `reg_a`.
///
/// Arithmetic wraps at 8 bits. `Div` truncates toward zero and leaves the
/// register file untouched on a zero divisor. `Cmp` only writes `flags`.
pub fn execute(
    op: AluOp,
    reg_a: u8,
    reg_b: u8,
    registers: &mut RegisterFile,
    flags: &mut Flags,
) -> Result<(), VmError> {
    let a = registers.get(reg_a)?;
    let b = registers.get(reg_b)?;

    let result = match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Div => a
            .checked_div(b)
            .ok_or(VmError::DivisionByZero { reg_a, reg_b })?,
        AluOp::Cmp => {
            *flags = Flags::from_ordering(a.cmp(&b));
            return Ok(());
        }
    };
    registers.set(reg_a, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regs(a: u8, b: u8) -> RegisterFile {
        let mut regs = RegisterFile::default();
        regs.set(0, a).unwrap();
        regs.set(1, b).unwrap();
        regs
    }

    fn run(op: AluOp, a: u8, b: u8) -> Result<(u8, Flags), VmError> {
        let mut regs = regs(a, b);
        let mut flags = Flags::default();
        execute(op, 0, 1, &mut regs, &mut flags)?;
        Ok((regs.get(0).unwrap(), flags))
    }

    #[test]
    fn add_and_mul() {
        assert_eq!(run(AluOp::Add, 2, 3).unwrap().0, 5);
        assert_eq!(run(AluOp::Mul, 5, 6).unwrap().0, 30);
    }

    #[test]
    fn arithmetic_wraps_at_eight_bits() {
        assert_eq!(run(AluOp::Add, 255, 1).unwrap().0, 0);
        assert_eq!(run(AluOp::Mul, 16, 16).unwrap().0, 0);
        assert_eq!(run(AluOp::Mul, 200, 2).unwrap().0, 144);
        assert_eq!(run(AluOp::Sub, 0, 1).unwrap().0, 255);
    }

    #[test]
    fn div_truncates() {
        assert_eq!(run(AluOp::Div, 7, 2).unwrap().0, 3);
        assert_eq!(run(AluOp::Div, 1, 255).unwrap().0, 0);
    }

    #[test]
    fn div_by_zero_is_a_fault_and_leaves_registers() {
        let mut regs = regs(9, 0);
        let mut flags = Flags::default();
        let err = execute(AluOp::Div, 0, 1, &mut regs, &mut flags).unwrap_err();
        assert!(matches!(err, VmError::DivisionByZero { reg_a: 0, reg_b: 1 }));
        assert_eq!(regs.get(0).unwrap(), 9);
    }

    #[test]
    fn cmp_sets_exactly_one_flag_and_keeps_registers() {
        let (a, flags) = run(AluOp::Cmp, 4, 4).unwrap();
        assert_eq!(a, 4);
        assert_eq!(flags.bits(), Flags::EQUAL);

        let (_, flags) = run(AluOp::Cmp, 5, 4).unwrap();
        assert_eq!(flags.bits(), Flags::GREATER);

        let (_, flags) = run(AluOp::Cmp, 0, 255).unwrap();
        assert_eq!(flags.bits(), Flags::LESS);
    }

    #[test]
    fn invalid_register_is_reported() {
        let mut regs = RegisterFile::default();
        let mut flags = Flags::default();
        let err = execute(AluOp::Add, 0, 8, &mut regs, &mut flags).unwrap_err();
        assert!(matches!(err, VmError::InvalidRegister { index: 8 }));
    }
}
