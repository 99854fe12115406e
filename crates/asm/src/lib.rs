// LS-8 assembler.
// Mnemonic source in, memory image out. Two passes: the first sizes every
// line and records labels, the second encodes.

mod listing;

use std::collections::HashMap;

use ls8_cpu::{Instruction, MEMORY_SIZE, Opcode, REGISTER_COUNT};
use thiserror::Error;

pub use listing::{Line, disassemble, to_listing};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct AsmError {
    pub line: usize,
    pub message: String,
}

impl AsmError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

enum Item<'a> {
    Instr { opcode: Opcode, operands: Vec<&'a str> },
    Bytes(Vec<&'a str>),
}

/// Assembles `source` into bytes loaded at address 0.
///
/// ```text
/// start:  LDI R0, 8      # comment
///         PRN R0         ; also a comment
///         HLT
/// data:   .byte 1, 0x02, 0b11
/// ```
///
/// Immediates are decimal, `0x` hex or `0b` binary, or a label name.
pub fn assemble(source: &str) -> Result<Vec<u8>, AsmError> {
    let mut labels = HashMap::<&str, usize>::new();
    let mut items = Vec::new();
    let mut address = 0usize;

    // 1st pass: symbol table
    for (index, raw) in source.lines().enumerate() {
        let line_no = index + 1;
        let mut line = strip_comment(raw).trim();

        if let Some(colon) = line.find(':') {
            let label = line[..colon].trim();
            if !is_identifier(label) {
                return Err(AsmError::new(line_no, format!("invalid label {label:?}")));
            }
            if labels.insert(label, address).is_some() {
                return Err(AsmError::new(line_no, format!("duplicate label {label:?}")));
            }
            line = line[colon + 1..].trim();
        }
        if line.is_empty() {
            continue;
        }

        let (head, rest) = line
            .split_once(char::is_whitespace)
            .map(|(h, r)| (h, r.trim()))
            .unwrap_or((line, ""));
        let operands: Vec<&str> = rest
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        let item = if head.eq_ignore_ascii_case(".byte") {
            if operands.is_empty() {
                return Err(AsmError::new(line_no, ".byte needs at least one value"));
            }
            address += operands.len();
            Item::Bytes(operands)
        } else {
            let opcode = Opcode::from_mnemonic(head)
                .ok_or_else(|| AsmError::new(line_no, format!("unknown mnemonic {head:?}")))?;
            if operands.len() != opcode.operand_count() {
                return Err(AsmError::new(
                    line_no,
                    format!(
                        "{opcode} takes {} operand(s), got {}",
                        opcode.operand_count(),
                        operands.len()
                    ),
                ));
            }
            address += opcode.byte_len();
            Item::Instr { opcode, operands }
        };
        if address > MEMORY_SIZE {
            return Err(AsmError::new(
                line_no,
                format!("program exceeds {MEMORY_SIZE} bytes"),
            ));
        }
        items.push((line_no, item));
    }

    // 2nd pass: encode
    let mut out = Vec::with_capacity(address);
    for (line_no, item) in items {
        match item {
            Item::Bytes(values) => {
                for value in values {
                    out.push(immediate(value, &labels, line_no)?);
                }
            }
            Item::Instr { opcode, operands } => {
                let instruction = encode(opcode, &operands, &labels, line_no)?;
                out.extend(instruction.encode());
            }
        }
    }
    Ok(out)
}

fn encode(
    opcode: Opcode,
    operands: &[&str],
    labels: &HashMap<&str, usize>,
    line: usize,
) -> Result<Instruction, AsmError> {
    let (a, b) = match (opcode, operands) {
        (_, []) => (0, 0),
        (Opcode::Ldi, [reg, value]) => (register(reg, line)?, immediate(value, labels, line)?),
        (_, [reg_a, reg_b]) => (register(reg_a, line)?, register(reg_b, line)?),
        (_, [reg]) => (register(reg, line)?, 0),
        _ => return Err(AsmError::new(line, "too many operands")),
    };
    Ok(Instruction::decode(opcode, a, b))
}

fn register(text: &str, line: usize) -> Result<u8, AsmError> {
    text.strip_prefix(['R', 'r'])
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| (*n as usize) < REGISTER_COUNT)
        .ok_or_else(|| AsmError::new(line, format!("expected register R0-R7, got {text:?}")))
}

fn immediate(text: &str, labels: &HashMap<&str, usize>, line: usize) -> Result<u8, AsmError> {
    let parsed = if let Some(hex) = text.strip_prefix("0x") {
        u8::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = text.strip_prefix("0b") {
        u8::from_str_radix(&bin.replace('_', ""), 2).ok()
    } else if text.starts_with(|c: char| c.is_ascii_digit()) {
        text.parse::<u8>().ok()
    } else if is_identifier(text) {
        let address = labels
            .get(text)
            .ok_or_else(|| AsmError::new(line, format!("undefined label {text:?}")))?;
        u8::try_from(*address).ok()
    } else {
        None
    };
    parsed.ok_or_else(|| AsmError::new(line, format!("invalid byte value {text:?}")))
}

fn strip_comment(line: &str) -> &str {
    line.split(['#', ';']).next().unwrap_or_default()
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_print8() {
        let bytes = assemble("LDI R0, 8\nPRN R0\nHLT\n").unwrap();
        assert_eq!(bytes, vec![0b1000_0010, 0, 8, 0b0100_0111, 0, 0b0000_0001]);
    }

    #[test]
    fn labels_resolve_forward_and_backward() {
        let source = "
            LDI R1, sub     # forward reference
            CALL R1
            HLT
        sub:
            LDI R0, 0x2A
            RET
        ";
        let bytes = assemble(source).unwrap();
        assert_eq!(bytes[2], 6);
        assert_eq!(&bytes[6..], &[0b1000_0010, 0, 42, 0b0001_0001]);
    }

    #[test]
    fn byte_directive_and_radixes() {
        let bytes = assemble("data: .byte 1, 0x10, 0b1010_0000, data").unwrap();
        assert_eq!(bytes, vec![1, 16, 0xA0, 0]);
    }

    #[test]
    fn mnemonics_are_case_insensitive() {
        assert_eq!(assemble("ldi r2, 3\nhlt").unwrap(), vec![0x82, 2, 3, 1]);
    }

    #[test]
    fn rejects_unknown_mnemonic() {
        let err = assemble("HLT\nNOP").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("unknown mnemonic"));
    }

    #[test]
    fn rejects_wrong_operand_count() {
        let err = assemble("ADD R0").unwrap_err();
        assert_eq!(err.to_string(), "line 1: ADD takes 2 operand(s), got 1");
    }

    #[test]
    fn rejects_bad_registers_and_values() {
        assert!(assemble("PRN R8").unwrap_err().message.contains("R0-R7"));
        assert!(assemble("LDI R0, 256").unwrap_err().message.contains("invalid byte"));
        assert!(assemble("LDI R0, nowhere").unwrap_err().message.contains("undefined label"));
        assert!(assemble("ADD R0, 5").unwrap_err().message.contains("R0-R7"));
    }

    #[test]
    fn rejects_duplicate_labels() {
        let err = assemble("a: HLT\na: HLT").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn rejects_programs_larger_than_memory() {
        let source = "LDI R0, 1\n".repeat(86);
        assert!(assemble(&source).unwrap_err().message.contains("exceeds"));
    }
}
