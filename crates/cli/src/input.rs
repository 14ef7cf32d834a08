use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Read;

/// Reads a document from `source`, or from stdin when `source` is `-`.
///
/// Documents larger than `max_bytes` are refused before any processing.
pub fn read_document(source: &str, max_bytes: usize) -> Result<String> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .take(max_bytes as u64 + 1)
            .read_to_string(&mut buf)
            .context("reading document from stdin")?;
        buf
    } else {
        let len = fs::metadata(source)
            .with_context(|| format!("reading {source}"))?
            .len();
        if len > max_bytes as u64 {
            bail!("{source} is {len} bytes, limit is {max_bytes}");
        }
        fs::read_to_string(source).with_context(|| format!("reading {source}"))?
    };

    if text.len() > max_bytes {
        bail!("{source} is larger than {max_bytes} bytes");
    }
    Ok(text)
}
