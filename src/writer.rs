//! GPX output stream, optionally gzip compressed.
use std::io::{BufWriter, Error, Write};

#[cfg(feature = "flate2")]
use flate2::{write::GzEncoder, Compression};

/// [BufferedWriter] buffers produced GPX content, in plain text
/// or gzip compressed when the `flate2` feature is enabled.
#[derive(Debug)]
pub enum BufferedWriter<W: Write> {
    /// Plain text
    Plain(BufWriter<W>),
    /// Gzip compressed
    #[cfg(feature = "flate2")]
    #[cfg_attr(docsrs, doc(cfg(feature = "flate2")))]
    Gz(BufWriter<GzEncoder<W>>),
}

impl<W: Write> BufferedWriter<W> {
    /// Plain text [BufferedWriter] over `w`
    pub fn plain(w: W) -> Self {
        Self::Plain(BufWriter::new(w))
    }
    #[cfg(feature = "flate2")]
    #[cfg_attr(docsrs, doc(cfg(feature = "flate2")))]
    /// Gzip [BufferedWriter] over `w`. `compression_level` ranges from
    /// 0 (fastest) to 9 (smallest output).
    pub fn gzip(w: W, compression_level: u32) -> Self {
        Self::Gz(BufWriter::new(GzEncoder::new(
            w,
            Compression::new(compression_level),
        )))
    }
    /// Flushes and terminates the stream (gzip trailer included),
    /// returning the underlying writer.
    pub fn finish(self) -> Result<W, Error> {
        match self {
            Self::Plain(writer) => writer.into_inner().map_err(|e| e.into_error()),
            #[cfg(feature = "flate2")]
            Self::Gz(writer) => writer.into_inner().map_err(|e| e.into_error())?.finish(),
        }
    }
}

impl<W: Write> BufferedWriter<W> {
    fn stream(&mut self) -> &mut dyn Write {
        match self {
            Self::Plain(writer) => writer,
            #[cfg(feature = "flate2")]
            Self::Gz(writer) => writer,
        }
    }
}

impl<W: Write> Write for BufferedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        self.stream().write(buf)
    }
    fn flush(&mut self) -> Result<(), Error> {
        self.stream().flush()
    }
}
