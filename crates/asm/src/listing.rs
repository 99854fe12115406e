use ls8_cpu::{Instruction, Opcode};

/// One disassembled instruction, or a stray data byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub address: usize,
    pub bytes: Vec<u8>,
    pub text: String,
}

/// Linear sweep over `bytes`. Anything that is not an opcode, or an
/// instruction cut short by the end of the image, is emitted as `.byte`.
pub fn disassemble(bytes: &[u8]) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut address = 0;
    while address < bytes.len() {
        let byte = bytes[address];
        let decoded = Opcode::from_byte(byte)
            .filter(|op| address + op.byte_len() <= bytes.len())
            .map(|op| {
                let operand = |i: usize| bytes.get(address + 1 + i).copied().unwrap_or_default();
                (op, Instruction::decode(op, operand(0), operand(1)))
            });
        let line = match decoded {
            Some((op, instruction)) => Line {
                address,
                bytes: bytes[address..address + op.byte_len()].to_vec(),
                text: instruction.to_string(),
            },
            None => Line {
                address,
                bytes: vec![byte],
                text: format!(".byte 0x{byte:02X}"),
            },
        };
        address += line.bytes.len();
        lines.push(line);
    }
    lines
}

/// Renders bytes as an `.ls8` listing, one binary byte per line, with the
/// disassembly as a comment on each opcode line.
pub fn to_listing(bytes: &[u8]) -> String {
    let mut out = String::new();
    for line in disassemble(bytes) {
        for (i, byte) in line.bytes.iter().enumerate() {
            out.push_str(&format!("{byte:08b}"));
            if i == 0 {
                out.push_str(&format!(" # {:3}: {}", line.address, line.text));
            }
            out.push('\n');
        }
    }
    out
}
