mod asm;
mod disasm;
mod run;

pub use asm::AsmCmd;
pub use disasm::DisasmCmd;
pub use run::RunCmd;

use std::path::Path;

use anyhow::{Context, Result};
use ls8_loader::{FsSource, load_program};

/// Loads the listing at `path` through a source rooted at its directory.
pub(crate) fn read_listing(path: &Path) -> Result<Vec<u8>> {
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid program path {}", path.display()))?;
    load_program(&FsSource::new(root), name)
        .with_context(|| format!("failed to load {}", path.display()))
}
