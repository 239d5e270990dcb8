use crate::error::{TagError, TagResult};

/// Forward-only reader over file-format tag data.
pub struct FileCursor<'a> {
    data: &'a [u8],
    read: usize,
}

impl<'a> FileCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, read: 0 }
    }

    /// Bytes consumed so far.
    pub fn data_read(&self) -> usize {
        self.read
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.read
    }

    pub fn take(&mut self, len: usize, what: &str) -> TagResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(TagError::out_of_bounds(format!(
                "{what} needs {len:#x} bytes at {:#x}, only {:#x} left",
                self.read,
                self.remaining()
            )));
        }
        let bytes = &self.data[self.read..self.read + len];
        self.read += len;
        Ok(bytes)
    }

    /// Top-level check that every byte was consumed.
    pub fn finish(self) -> TagResult<()> {
        if self.read != self.data.len() {
            return Err(TagError::invalid(format!(
                "tag data was left over ({:#x} of {:#x} bytes read)",
                self.read,
                self.data.len()
            )));
        }
        Ok(())
    }
}
