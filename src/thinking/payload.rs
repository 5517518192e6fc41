//! Framed result file read by the invoking process.
//!
//! Layout, integers big-endian:
//!
//! ```text
//! u8   status       0 = success, 1 = failure
//! u32  context_len  byte length of context
//! ..   context      context JSON, or the error message on failure
//! u32  summary_len  byte length of summary
//! ..   summary      summary text, empty on failure
//! ```

use crate::error::ThinkerError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const STATUS_SUCCESS: u8 = 0;
pub const STATUS_FAILURE: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThoughtPayload {
    pub success: bool,
    pub context: String,
    pub summary: String,
}

impl ThoughtPayload {
    pub fn success(context: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            success: true,
            context: context.into(),
            summary: summary.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            context: message.into(),
            summary: String::new(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, ThinkerError> {
        let mut out = Vec::with_capacity(9 + self.context.len() + self.summary.len());
        out.push(if self.success {
            STATUS_SUCCESS
        } else {
            STATUS_FAILURE
        });
        push_field(&mut out, "context", self.context.as_bytes())?;
        push_field(&mut out, "summary", self.summary.as_bytes())?;
        Ok(out)
    }
}

fn push_field(out: &mut Vec<u8>, name: &str, bytes: &[u8]) -> Result<(), ThinkerError> {
    let len = u32::try_from(bytes.len()).map_err(|_| {
        ThinkerError::Io(format!(
            "{name} field is {} bytes, larger than a u32 length prefix allows",
            bytes.len()
        ))
    })?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

pub fn write_payload(path: &Path, payload: &ThoughtPayload) -> Result<(), ThinkerError> {
    let bytes = payload.encode()?;
    let file = File::create(path).map_err(|err| {
        ThinkerError::Io(format!(
            "Unable to open output path for writing: {}: {err}",
            path.display()
        ))
    })?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&bytes)
        .and_then(|()| writer.flush())
        .map_err(|err| ThinkerError::Io(format!("failed to write {}: {err}", path.display())))
}

/// Destination for the single result payload of an invocation.
#[derive(Debug)]
pub struct OutputSlot {
    path: PathBuf,
    written: bool,
}

impl OutputSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_written(&self) -> bool {
        self.written
    }

    pub fn commit(&mut self, payload: &ThoughtPayload) -> Result<(), ThinkerError> {
        if self.written {
            return Err(ThinkerError::Io(format!(
                "output payload already written to {}",
                self.path.display()
            )));
        }
        write_payload(&self.path, payload)?;
        self.written = true;
        Ok(())
    }
}
