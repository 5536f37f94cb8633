//! Data file helpers.
//!
//! Subjects overwrite their file in place on every state-changing update. The
//! file keeps its inode, so an external tool still writing into it carries on at
//! its own offset and the next change event delivers its complete content.
use std::fs;
use std::path::Path;

use crate::result::Result;

/// Replace the whole content of `path` with `contents`, in place.
pub fn write_payload(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)?;
    Ok(())
}

/// Read the whole file as one string.
pub fn read_payload(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}
