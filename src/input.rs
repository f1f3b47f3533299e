//! Capture input from the command line.

use std::path::{Path, PathBuf};
use takshark_core::{InputError, Result};

/// One buffer to dissect, with the name it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub label: String,
    pub bytes: Vec<u8>,
}

/// Decode a hex string.
///
/// Whitespace, `:` and `-` separators and `0x` prefixes are ignored, so
/// output copied from a packet capture tool can be pasted as is.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: String = text
        .split(|c: char| c.is_whitespace() || c == ':' || c == '-' || c == ',')
        .map(|chunk| {
            chunk
                .strip_prefix("0x")
                .or_else(|| chunk.strip_prefix("0X"))
                .unwrap_or(chunk)
        })
        .collect();

    hex::decode(&digits).map_err(|e| InputError::invalid_hex(e.to_string()).into())
}

pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| InputError::read_failed(path.display().to_string(), e).into())
}

/// Gather `--hex` arguments first, then files, in the order given.
pub fn collect_inputs(hex: &[String], files: &[PathBuf]) -> Result<Vec<Input>> {
    let mut inputs = Vec::with_capacity(hex.len() + files.len());
    for (i, text) in hex.iter().enumerate() {
        inputs.push(Input {
            label: format!("hex#{}", i + 1),
            bytes: parse_hex(text)?,
        });
    }
    for path in files {
        inputs.push(Input {
            label: path.display().to_string(),
            bytes: read_file(path)?,
        });
    }

    if inputs.is_empty() {
        return Err(InputError::Empty.into());
    }
    Ok(inputs)
}
