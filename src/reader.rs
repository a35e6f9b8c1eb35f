//! Buffered line reader, for efficient track log parsing.
use std::io::{ErrorKind, Read};

// Modify this value to update the internal buffer depth.
// Track logs are made of rather short lines (about 100 bytes),
// so the proposed value should be more than enough.
const BUF_SIZE: usize = 4096;

/// [LineReader] splits any [Read]able interface into lines,
/// on a single separator byte. Separators are not returned.
/// A partial final line (no trailing separator) is returned
/// once the stream is exhausted.
pub struct LineReader<R: Read> {
    /// Internal buffer
    buf: [u8; BUF_SIZE],
    rd_ptr: usize,
    wr_ptr: usize,
    /// Line under construction, when it spans several reads
    pending: Vec<u8>,
    separator: u8,
    eos: bool,
    reader: R,
}

impl<R: Read> LineReader<R> {
    /// Builds a [LineReader] splitting on '\n'
    pub fn new(reader: R) -> Self {
        Self::with_separator(reader, b'\n')
    }
    /// Builds a [LineReader] splitting on given byte
    pub fn with_separator(reader: R, separator: u8) -> Self {
        Self {
            reader,
            separator,
            eos: false,
            rd_ptr: 0,
            wr_ptr: 0,
            pending: Vec::new(),
            buf: [0; BUF_SIZE],
        }
    }
    /// Returns next line, or None once the stream is exhausted.
    pub fn next_line(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        loop {
            // try to provide from what we have
            let avail = &self.buf[self.rd_ptr..self.wr_ptr];
            if let Some(offset) = avail.iter().position(|b| *b == self.separator) {
                let mut line = std::mem::take(&mut self.pending);
                line.extend_from_slice(&avail[..offset]);
                self.rd_ptr += offset + 1;
                return Ok(Some(line));
            }
            // no complete line: keep what we have, pull new content
            self.pending.extend_from_slice(avail);
            self.rd_ptr = 0;
            self.wr_ptr = 0;
            if self.eos {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(std::mem::take(&mut self.pending)));
            }
            match self.reader.read(&mut self.buf) {
                Ok(0) => self.eos = true,
                Ok(size) => self.wr_ptr = size,
                Err(e) if e.kind() == ErrorKind::Interrupted => {},
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> Iterator for LineReader<R> {
    type Item = std::io::Result<Vec<u8>>;
    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
