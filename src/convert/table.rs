use std::{collections::HashMap, io::Read};

use crate::{reader::LineReader, Error};

/// One table row: field name → value
pub type Row = HashMap<String, String>;

fn decode(line: Vec<u8>) -> Result<String, Error> {
    let mut line = String::from_utf8(line)?;
    if line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

/// Reads a comma separated table: first line is the header, each following
/// line is zipped with it and handed to `handler`. Empty fields are
/// preserved, blank lines are skipped. Non UTF-8 content aborts the run
/// with [Error::TextDecoding]; `handler` errors abort it too.
/// Returns the number of rows handed over.
pub fn read_table<R, F>(reader: R, mut handler: F) -> Result<usize, Error>
where
    R: Read,
    F: FnMut(&Row) -> Result<(), Error>,
{
    let mut lines = LineReader::new(reader);
    let header = match lines.next_line()? {
        Some(line) => decode(line)?,
        None => return Ok(0),
    };
    let names: Vec<&str> = header.split(',').map(|name| name.trim()).collect();
    let mut rows = 0;
    while let Some(line) = lines.next_line()? {
        let line = decode(line)?;
        if line.trim().is_empty() {
            continue;
        }
        let row: Row = names
            .iter()
            .zip(line.split(','))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        handler(&row)?;
        rows += 1;
    }
    Ok(rows)
}
