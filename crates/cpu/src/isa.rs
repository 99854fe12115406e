use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alu::AluOp;

/// Opcode bytes are laid out as `AABCDDDD`:
/// `AA` operand count, `B` ALU operation, `C` sets the PC, `DDDD` identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    // --- Core Execution ---
    Hlt = 0b0000_0001, // Stop execution
    Ldi = 0b1000_0010, // reg[a] = b
    Prn = 0b0100_0111, // Emit reg[a]

    // --- Arithmetic ---
    Add = 0b1010_0000,
    Sub = 0b1010_0001,
    Mul = 0b1010_0010,
    Div = 0b1010_0011,
    Cmp = 0b1010_0111, // Set flags from reg[a] vs reg[b]

    // --- Stack Manipulation ---
    Push = 0b0100_0101,
    Pop = 0b0100_0110,

    // --- Control Flow ---
    Call = 0b0101_0000,
    Ret = 0b0001_0001,
    Jmp = 0b0101_0100,
    Jeq = 0b0101_0101,
    Jne = 0b0101_0110,
}

impl Opcode {
    pub const ALL: [Opcode; 15] = [
        Opcode::Hlt,
        Opcode::Ldi,
        Opcode::Prn,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Cmp,
        Opcode::Push,
        Opcode::Pop,
        Opcode::Call,
        Opcode::Ret,
        Opcode::Jmp,
        Opcode::Jeq,
        Opcode::Jne,
    ];

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|op| *op as u8 == byte)
    }

    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Hlt => "HLT",
            Opcode::Ldi => "LDI",
            Opcode::Prn => "PRN",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Cmp => "CMP",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
            Opcode::Jmp => "JMP",
            Opcode::Jeq => "JEQ",
            Opcode::Jne => "JNE",
        }
    }

    /// Operand bytes following the opcode.
    pub fn operand_count(self) -> usize {
        match self {
            Opcode::Hlt | Opcode::Ret => 0,
            Opcode::Prn
            | Opcode::Push
            | Opcode::Pop
            | Opcode::Call
            | Opcode::Jmp
            | Opcode::Jeq
            | Opcode::Jne => 1,
            Opcode::Ldi
            | Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Cmp => 2,
        }
    }

    /// Encoded size, opcode included.
    pub fn byte_len(self) -> usize {
        1 + self.operand_count()
    }

    /// Whether the instruction may write the PC itself.
    pub fn sets_pc(self) -> bool {
        matches!(
            self,
            Opcode::Call | Opcode::Ret | Opcode::Jmp | Opcode::Jeq | Opcode::Jne
        )
    }

    pub fn alu_op(self) -> Option<AluOp> {
        match self {
            Opcode::Add => Some(AluOp::Add),
            Opcode::Sub => Some(AluOp::Sub),
            Opcode::Mul => Some(AluOp::Mul),
            Opcode::Div => Some(AluOp::Div),
            Opcode::Cmp => Some(AluOp::Cmp),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Self::from_byte(byte).ok_or(byte)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A decoded instruction. Register operands are raw indices; the register
/// file validates them on access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Halt,
    LoadImmediate { reg: u8, value: u8 },
    Print { reg: u8 },
    Alu { op: AluOp, reg_a: u8, reg_b: u8 },
    Push { reg: u8 },
    Pop { reg: u8 },
    Call { reg: u8 },
    Return,
    Jump { reg: u8 },
    JumpIfEqual { reg: u8 },
    JumpIfNotEqual { reg: u8 },
}

impl Instruction {
    /// Builds the instruction from its opcode and the bytes after it.
    /// Operands the opcode does not use are ignored.
    pub fn decode(opcode: Opcode, a: u8, b: u8) -> Self {
        let alu = |op| Instruction::Alu { op, reg_a: a, reg_b: b };
        match opcode {
            Opcode::Hlt => Instruction::Halt,
            Opcode::Ldi => Instruction::LoadImmediate { reg: a, value: b },
            Opcode::Prn => Instruction::Print { reg: a },
            Opcode::Add => alu(AluOp::Add),
            Opcode::Sub => alu(AluOp::Sub),
            Opcode::Mul => alu(AluOp::Mul),
            Opcode::Div => alu(AluOp::Div),
            Opcode::Cmp => alu(AluOp::Cmp),
            Opcode::Push => Instruction::Push { reg: a },
            Opcode::Pop => Instruction::Pop { reg: a },
            Opcode::Call => Instruction::Call { reg: a },
            Opcode::Ret => Instruction::Return,
            Opcode::Jmp => Instruction::Jump { reg: a },
            Opcode::Jeq => Instruction::JumpIfEqual { reg: a },
            Opcode::Jne => Instruction::JumpIfNotEqual { reg: a },
        }
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Halt => Opcode::Hlt,
            Instruction::LoadImmediate { .. } => Opcode::Ldi,
            Instruction::Print { .. } => Opcode::Prn,
            Instruction::Alu { op, .. } => op.opcode(),
            Instruction::Push { .. } => Opcode::Push,
            Instruction::Pop { .. } => Opcode::Pop,
            Instruction::Call { .. } => Opcode::Call,
            Instruction::Return => Opcode::Ret,
            Instruction::Jump { .. } => Opcode::Jmp,
            Instruction::JumpIfEqual { .. } => Opcode::Jeq,
            Instruction::JumpIfNotEqual { .. } => Opcode::Jne,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.opcode().byte_len()
    }

    pub fn sets_pc(&self) -> bool {
        self.opcode().sets_pc()
    }

    /// Encodes back into opcode and operand bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = vec![self.opcode() as u8];
        match *self {
            Instruction::Halt | Instruction::Return => {}
            Instruction::LoadImmediate { reg, value } => bytes.extend([reg, value]),
            Instruction::Alu { reg_a, reg_b, .. } => bytes.extend([reg_a, reg_b]),
            Instruction::Print { reg }
            | Instruction::Push { reg }
            | Instruction::Pop { reg }
            | Instruction::Call { reg }
            | Instruction::Jump { reg }
            | Instruction::JumpIfEqual { reg }
            | Instruction::JumpIfNotEqual { reg } => bytes.push(reg),
        }
        bytes
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.opcode();
        match *self {
            Instruction::Halt | Instruction::Return => write!(f, "{op}"),
            Instruction::LoadImmediate { reg, value } => write!(f, "{op} R{reg}, {value}"),
            Instruction::Alu { reg_a, reg_b, .. } => write!(f, "{op} R{reg_a}, R{reg_b}"),
            Instruction::Print { reg }
            | Instruction::Push { reg }
            | Instruction::Pop { reg }
            | Instruction::Call { reg }
            | Instruction::Jump { reg }
            | Instruction::JumpIfEqual { reg }
            | Instruction::JumpIfNotEqual { reg } => write!(f, "{op} R{reg}"),
        }
    }
}
