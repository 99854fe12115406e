use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ls8_asm::Line;

#[derive(Args, Debug)]
pub struct DisasmCmd {
    /// Path to the program listing
    pub program: PathBuf,
}

impl DisasmCmd {
    pub fn run(&self) -> Result<()> {
        let program = super::read_listing(&self.program)?;
        for line in ls8_asm::disassemble(&program) {
            println!("{}", render(&line));
        }
        Ok(())
    }
}

fn render(line: &Line) -> String {
    let bytes: Vec<String> = line.bytes.iter().map(|b| format!("{b:02X}")).collect();
    format!("{:3}: {:<9} {}", line.address, bytes.join(" "), line.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_address_bytes_and_text() {
        let line = Line {
            address: 3,
            bytes: vec![0x47, 0x00],
            text: "PRN R0".into(),
        };
        assert_eq!(render(&line), "  3: 47 00     PRN R0");
    }
}
