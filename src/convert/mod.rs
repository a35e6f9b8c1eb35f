//! Track log conversion: CSV table reading and GPX production.
//!
//! Conversion operates on a finished log file, independently of any
//! live logging session.
use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

#[cfg(feature = "log")]
use log::{debug, info};

use crate::{writer::BufferedWriter, Error};

mod gpx;
mod table;

pub use gpx::{
    escape, GpxOptions, GpxPoint, GpxWriter, ACCURACY_EXT_NAMESPACE, GPX_NAMESPACE,
    TRACKPOINT_EXT_NAMESPACE,
};
pub use table::{read_table, Row};

/// Conversion report
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Rows read from the track log
    pub rows: usize,
    /// Track points produced: rows missing a coordinate are not converted
    pub points: usize,
}

/// Converts a CSV track log into a GPX track.
/// Output is left open: it is flushed and handed back.
pub fn csv_to_gpx<R: Read, W: Write>(
    input: R,
    output: W,
    options: &GpxOptions,
) -> Result<(ConversionSummary, W), Error> {
    let mut gpx = GpxWriter::new(output, options.clone());
    let rows = read_table(input, |row| {
        gpx.write_point(&GpxPoint::from_row(row))?;
        Ok(())
    })?;
    let summary = ConversionSummary {
        rows,
        points: gpx.points(),
    };
    let output = gpx.finish()?;
    Ok((summary, output))
}

/// Default GPX path for given track log: same name, .gpx extension
pub fn gpx_path(csv_path: &Path) -> PathBuf {
    csv_path.with_extension("gpx")
}

/// Converts a track log file into a GPX file. Output path defaults
/// to [gpx_path]. When `gzip` is set (requires the `flate2` feature),
/// produced content is gzip compressed.
pub fn convert_file(
    csv_path: &Path,
    gpx: Option<&Path>,
    options: &GpxOptions,
    gzip: bool,
) -> Result<(ConversionSummary, PathBuf), Error> {
    let output_path = gpx.map(|p| p.to_path_buf()).unwrap_or_else(|| gpx_path(csv_path));
    #[cfg(feature = "log")]
    debug!(
        "converting \"{}\" to \"{}\"",
        csv_path.display(),
        output_path.display()
    );

    let input = File::open(csv_path)?;
    let output = File::create(&output_path)?;

    let writer = if gzip {
        #[cfg(feature = "flate2")]
        {
            BufferedWriter::gzip(output, 6)
        }
        #[cfg(not(feature = "flate2"))]
        {
            return Err(Error::FileIO(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "gzip compression requires the flate2 feature",
            )));
        }
    } else {
        BufferedWriter::plain(output)
    };

    let (summary, writer) = csv_to_gpx(input, writer, options)?;
    writer.finish()?;

    #[cfg(feature = "log")]
    info!(
        "\"{}\": {} rows, {} points",
        output_path.display(),
        summary.rows,
        summary.points
    );
    Ok((summary, output_path))
}
