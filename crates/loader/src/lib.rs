// Program loading for the LS-8.
// Turns `.ls8` listings (one binary byte per line) into a memory image.
// The core never sees text; everything here happens before the first fetch.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use ls8_cpu::MEMORY_SIZE;
use thiserror::Error;
use tracing::debug;

/// Marks the start of a comment in a listing.
pub const COMMENT: char = '#';

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("program not found: {0}")]
    NotFound(String),

    #[error("failed to read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: invalid byte {text:?}")]
    InvalidByte { line: usize, text: String },

    #[error("program of {len} bytes does not fit in {} bytes of memory", MEMORY_SIZE)]
    ProgramTooLarge { len: usize },
}

/// Where listings come from.
pub trait ProgramSource {
    fn read(&self, name: &str) -> Result<String, LoadError>;
}

/// Listings on disk, resolved relative to `root`.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ProgramSource for FsSource {
    fn read(&self, name: &str) -> Result<String, LoadError> {
        let path = self.root.join(name);
        fs::read_to_string(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound(path.display().to_string()),
            _ => LoadError::Io {
                name: path.display().to_string(),
                source,
            },
        })
    }
}

/// Listings held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemSource {
    files: HashMap<String, String>,
}

impl MemSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, listing: impl Into<String>) {
        self.files.insert(name.into(), listing.into());
    }
}

impl ProgramSource for MemSource {
    fn read(&self, name: &str) -> Result<String, LoadError> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(name.to_string()))
    }
}

/// Parses a listing into bytes.
///
/// Text after `#` is ignored, blank lines are skipped, and each remaining
/// line must be one byte in binary. A `0b` prefix and `_` separators are
/// accepted.
pub fn parse_listing(text: &str) -> Result<Vec<u8>, LoadError> {
    let mut bytes = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let value = raw.split(COMMENT).next().unwrap_or_default().trim();
        if value.is_empty() {
            continue;
        }
        bytes.push(parse_byte(value).ok_or_else(|| LoadError::InvalidByte {
            line: index + 1,
            text: value.to_string(),
        })?);
    }
    if bytes.len() > MEMORY_SIZE {
        return Err(LoadError::ProgramTooLarge { len: bytes.len() });
    }
    Ok(bytes)
}

fn parse_byte(text: &str) -> Option<u8> {
    let digits = text.strip_prefix("0b").unwrap_or(text);
    if !digits.chars().all(|c| matches!(c, '0' | '1' | '_')) {
        return None;
    }
    let digits = digits.replace('_', "");
    if digits.is_empty() || digits.len() > 8 {
        return None;
    }
    u8::from_str_radix(&digits, 2).ok()
}

/// Reads and parses `name` from `source`.
pub fn load_program(source: &impl ProgramSource, name: &str) -> Result<Vec<u8>, LoadError> {
    let bytes = parse_listing(&source.read(name)?)?;
    debug!(name, bytes = bytes.len(), "listing parsed");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRINT8: &str = "\
# print8.ls8
10000010 # LDI R0,8
00000000
00001000
01000111 # PRN R0
00000000

00000001 # HLT
";

    #[test]
    fn parses_listing_with_comments_and_blanks() {
        let bytes = parse_listing(PRINT8).unwrap();
        assert_eq!(bytes, vec![0b1000_0010, 0, 8, 0b0100_0111, 0, 1]);
    }

    #[test]
    fn accepts_prefix_and_separators() {
        assert_eq!(parse_listing("0b1010_0010\n  0001\n").unwrap(), vec![0xA2, 1]);
    }

    #[test]
    fn rejects_non_binary_lines_with_line_number() {
        let err = parse_listing("00000001\n\n00000002\n").unwrap_err();
        assert!(matches!(err, LoadError::InvalidByte { line: 3, .. }));
        assert_eq!(err.to_string(), "line 3: invalid byte \"00000002\"");

        for text in ["+1", "0b+1", "-1", "0x01", "1 0"] {
            assert!(
                matches!(parse_listing(text), Err(LoadError::InvalidByte { line: 1, .. })),
                "{text:?} was accepted"
            );
        }
    }

    #[test]
    fn rejects_values_wider_than_a_byte() {
        assert!(matches!(
            parse_listing("100000000"),
            Err(LoadError::InvalidByte { line: 1, .. })
        ));
        assert!(parse_listing("0b").is_err());
    }

    #[test]
    fn rejects_oversized_programs() {
        let listing = "00000001\n".repeat(MEMORY_SIZE + 1);
        assert!(matches!(
            parse_listing(&listing),
            Err(LoadError::ProgramTooLarge { len: 257 })
        ));
    }

    #[test]
    fn empty_listing_is_an_empty_program() {
        assert!(parse_listing("# nothing\n\n").unwrap().is_empty());
    }

    #[test]
    fn mem_source_round_trip() {
        let mut source = MemSource::new();
        source.insert("print8.ls8", PRINT8);
        assert_eq!(load_program(&source, "print8.ls8").unwrap().len(), 6);
        assert!(matches!(
            load_program(&source, "missing.ls8"),
            Err(LoadError::NotFound(_))
        ));
    }

    #[test]
    fn fs_source_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("print8.ls8"), PRINT8).unwrap();
        let source = FsSource::new(dir.path());
        assert_eq!(load_program(&source, "print8.ls8").unwrap()[2], 8);
        assert!(matches!(
            source.read("nope.ls8"),
            Err(LoadError::NotFound(_))
        ));
    }
}
