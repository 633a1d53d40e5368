use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

/// Input text, either mapped from a large file or held in memory.
pub enum InputContent {
    Mapped(Mmap),
    Buffered(String),
}

impl InputContent {
    /// Borrow the content as UTF-8.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            InputContent::Mapped(mmap) => {
                std::str::from_utf8(mmap).context("Input file is not valid UTF-8")
            }
            InputContent::Buffered(s) => Ok(s.as_str()),
        }
    }
}

/// Expand `~` and `$VAR` in a user-supplied path.
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .with_context(|| format!("Failed to expand path {}", path.display()))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// Read a file (memory-mapped above 1 MiB), or stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<InputContent> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(InputContent::Buffered(buf));
    }

    let path = expand_path(path)?;
    let metadata = std::fs::metadata(&path)
        .with_context(|| format!("Failed to read metadata for {}", path.display()))?;

    if metadata.len() > MMAP_THRESHOLD {
        let file =
            File::open(&path).with_context(|| format!("Failed to open file {}", path.display()))?;

        // SAFETY: read-only map of an existing regular file
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Failed to memory-map {}", path.display()))?;

        Ok(InputContent::Mapped(mmap))
    } else {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file {}", path.display()))?;

        Ok(InputContent::Buffered(content))
    }
}
