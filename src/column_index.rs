//! Resolving the column layout from the header row of vmstat(1)-like
//! output (the column set differs between tool versions and hosts).

use std::collections::HashMap;

use kstring::KString;

/// Columns that have to be present in the header, and whose values
/// decide whether a sample row is accepted (block I/O in/out; this
/// might be Linux-specific).
pub const MANDATORY_COLUMNS: &[&str] = &["bi", "bo"];

/// The token that marks the header row.
pub const HEADER_MARKER: &str = "free";

/// The token that marks the banner line above the header row.
pub const BANNER_MARKER: &str = "procs";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("no header row (a line containing \"free\") found in the input")]
    NotFound,
    #[error(
        "what you gave me does not seem to be vmstat(1) output, \
         the header is missing the column(s) {0:?}"
    )]
    MissingColumns(Vec<&'static str>),
}

/// Whether `line` is the "procs -----memory----- ..." banner, which is
/// always skipped.
pub fn is_banner_line(line: &str) -> bool {
    line.split_whitespace().any(|t| t == BANNER_MARKER)
}

/// Whether `line` (not a banner) is a header row.
pub fn is_header_line(line: &str) -> bool {
    !is_banner_line(line) && line.split_whitespace().any(|t| t == HEADER_MARKER)
}

/// Column name to 0-based field position. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    names: Vec<KString>,
    positions: HashMap<KString, usize>,
}

impl ColumnIndex {
    /// Build from the fields of a header row. If a name occurs more
    /// than once, the last position wins.
    pub fn from_header_fields<'s>(
        fields: impl IntoIterator<Item = &'s str>,
    ) -> Result<Self, HeaderError> {
        let names: Vec<KString> = fields.into_iter().map(KString::from_ref).collect();
        let positions: HashMap<KString, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        let missing: Vec<&'static str> = MANDATORY_COLUMNS
            .iter()
            .copied()
            .filter(|name| !positions.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(HeaderError::MissingColumns(missing));
        }
        Ok(Self { names, positions })
    }

    /// Split a header line on whitespace and build the index from it.
    pub fn from_header_line(line: &str) -> Result<Self, HeaderError> {
        Self::from_header_fields(line.split_whitespace())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// The header fields in their original order.
    pub fn names(&self) -> &[KString] {
        &self.names
    }
}
