//! Blanking most time stamps so that the X axis isn't too crowded
//! (and offsetting the remaining ones a little from the origin). Done
//! after all rows were filtered, since the interval depends on the
//! number of accepted rows.

use std::{borrow::Cow, io::Write};

/// Keep roughly one in this many time stamps
pub const THIN_DIVISOR: usize = 5;

/// Position within each interval of the time stamp that is kept
pub const KEEP_OFFSET: usize = 5;

/// What blanked time stamps are replaced with
pub const PLACEHOLDER: &str = "''";

/// Whether row `i` (0-based) of `len` accepted rows keeps its time
/// stamp. With fewer than `THIN_DIVISOR` rows there is no interval,
/// and all are kept.
pub fn keeps_timestamp(i: usize, len: usize) -> bool {
    let interval = len / THIN_DIVISOR;
    if interval == 0 {
        true
    } else {
        i % interval == KEEP_OFFSET
    }
}

/// Byte range of the whitespace-separated field `n` (0-based) in
/// `line`.
pub fn field_span(line: &str, n: usize) -> Option<(usize, usize)> {
    let mut field = 0;
    let mut start = None;
    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                if field == n {
                    return Some((s, i));
                }
                field += 1;
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    match start {
        Some(s) if field == n => Some((s, line.len())),
        _ => None,
    }
}

/// Replace field `n` (0-based) with `PLACEHOLDER`, leaving the rest of
/// the line (including the spacing) alone. Lines with fewer fields
/// are returned unchanged.
pub fn blank_field(line: &str, n: usize) -> Cow<'_, str> {
    match field_span(line, n) {
        Some((start, end)) => {
            let mut s = String::with_capacity(line.len() + PLACEHOLDER.len());
            s.push_str(&line[..start]);
            s.push_str(PLACEHOLDER);
            s.push_str(&line[end..]);
            s.into()
        }
        None => line.into(),
    }
}

/// The rows with all but a handful of time stamps blanked.
/// `time_column` is 1-based; 0 means there is no time column, then
/// the rows are passed through.
pub fn thin_timestamps(rows: &[String], time_column: usize) -> Vec<Cow<'_, str>> {
    let len = rows.len();
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            if time_column == 0 || keeps_timestamp(i, len) {
                Cow::Borrowed(row.as_str())
            } else {
                blank_field(row, time_column - 1)
            }
        })
        .collect()
}

/// Write the thinned rows, one per line, to `out`.
pub fn write_thinned(
    rows: &[String],
    time_column: usize,
    out: &mut impl Write,
) -> std::io::Result<()> {
    for line in thin_timestamps(rows, time_column) {
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
    }
    Ok(())
}
