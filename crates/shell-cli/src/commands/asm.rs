use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

#[derive(Args, Debug)]
pub struct AsmCmd {
    /// Mnemonic source file
    pub source: PathBuf,

    /// Write the listing here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl AsmCmd {
    pub fn run(&self) -> Result<()> {
        let source = fs::read_to_string(&self.source)
            .with_context(|| format!("failed to read {}", self.source.display()))?;
        let bytes = ls8_asm::assemble(&source)
            .with_context(|| format!("failed to assemble {}", self.source.display()))?;
        let listing = ls8_asm::to_listing(&bytes);

        match &self.output {
            Some(path) => fs::write(path, listing)
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => print!("{listing}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_loadable_listing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("mult.asm");
        let output = dir.path().join("mult.ls8");
        fs::write(&source, "LDI R0, 5\nLDI R1, 6\nMUL R0, R1\nPRN R0\nHLT\n").unwrap();

        AsmCmd {
            source,
            output: Some(output.clone()),
        }
        .run()
        .unwrap();

        let listing = fs::read_to_string(output).unwrap();
        let run = ls8::execute_listing(&listing, Default::default()).unwrap();
        assert_eq!(run.output, vec![30]);
    }

    #[test]
    fn reports_line_of_assembly_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("bad.asm");
        fs::write(&source, "HLT\nJMP\n").unwrap();
        let err = AsmCmd { source, output: None }.run().unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }
}
