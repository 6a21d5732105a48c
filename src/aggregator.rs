//! Filtering of sample rows, and the running sums/counts of the
//! throughput columns, in one pass (the number of rows is not known in
//! advance).

use std::{collections::HashMap, fmt::Display};

use kstring::KString;

use crate::column_index::{ColumnIndex, MANDATORY_COLUMNS};

/// Values at or above this are vmstat(1) counter overflow errors, not
/// measurements.
pub const OVERFLOW_THRESHOLD: u64 = 1_000_000_000;

/// Field position that must hold an integer for a line to be looked
/// at as a sample row at all (the "b" process count in vmstat
/// output).
pub const DIAGNOSTIC_FIELD: usize = 1;

/// Purely numeric: non-empty, ASCII digits only (no sign, no
/// decimal point).
pub fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Sum and count of the positive, non-overflowed values of one
/// column, over the accepted rows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ColumnStats {
    pub sum: u128,
    pub count: u64,
}

impl ColumnStats {
    pub fn add(&mut self, value: u64) {
        self.sum += u128::from(value);
        self.count += 1;
    }

    /// The average of the counted values, x.5 is rounded up. None if
    /// no value was counted.
    pub fn average(&self) -> Option<u64> {
        if self.count == 0 {
            None
        } else {
            let count = u128::from(self.count);
            let avg = (self.sum + count / 2) / count;
            Some(u64::try_from(avg).expect("average of u64 values fits u64"))
        }
    }
}

/// Why a sample row was not accepted. All mandatory columns of a row
/// are checked, so a row can have more than one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowProblem {
    /// The field is not a non-negative integer (or missing, then
    /// `value` is empty).
    Garbled {
        column: KString,
        position: usize,
        value: String,
    },
    /// The value is at or above `OVERFLOW_THRESHOLD`. `value` is the
    /// field text since it may not fit u64.
    Overflow {
        column: KString,
        position: usize,
        value: String,
    },
}

impl Display for RowProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowProblem::Garbled {
                column: _,
                position,
                value,
            } => write!(f, "column {position} is garbled: {value:?}"),
            RowProblem::Overflow {
                column: _,
                position,
                value,
            } => write!(f, "column {position}: {value} too large"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowVerdict {
    /// Not a sample row (header repetition, empty line, too few
    /// fields, non-numeric diagnostic field).
    NotData,
    Accepted,
    Rejected(Vec<RowProblem>),
}

enum Check {
    Zero,
    Value(u64),
    Problem(RowProblem),
}

fn check_field(column: &str, position: usize, field: Option<&str>) -> Check {
    let field = field.unwrap_or("");
    if !is_numeric(field) {
        return Check::Problem(RowProblem::Garbled {
            column: KString::from_ref(column),
            position,
            value: field.to_owned(),
        });
    }
    // All digits, so the only possible parse failure is a value
    // beyond u64, which is an overflow as well.
    match field.parse::<u64>() {
        Ok(0) => Check::Zero,
        Ok(v) if v < OVERFLOW_THRESHOLD => Check::Value(v),
        _ => Check::Problem(RowProblem::Overflow {
            column: KString::from_ref(column),
            position,
            value: field.to_owned(),
        }),
    }
}

/// Owns the resolved column index, the per-column stats and the
/// accepted rows.
#[derive(Debug)]
pub struct Aggregator {
    index: ColumnIndex,
    stats: HashMap<KString, ColumnStats>,
    /// (column name, position) of the mandatory columns, resolved once
    mandatory: Vec<(&'static str, usize)>,
    accepted: Vec<String>,
}

impl Aggregator {
    pub fn new(index: ColumnIndex) -> Self {
        let stats = index
            .names()
            .iter()
            .map(|name| (name.clone(), ColumnStats::default()))
            .collect();
        let mandatory = MANDATORY_COLUMNS
            .iter()
            .map(|name| {
                let pos = index
                    .position(name)
                    .expect("ColumnIndex guarantees the mandatory columns");
                (*name, pos)
            })
            .collect();
        Self {
            index,
            stats,
            mandatory,
            accepted: Vec::new(),
        }
    }

    pub fn index(&self) -> &ColumnIndex {
        &self.index
    }

    /// Classify `line` without changing any state. Returns the
    /// verdict and, for accepted rows, the values to be counted.
    fn classify(&self, line: &str) -> (RowVerdict, Vec<(&'static str, u64)>) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if !fields
            .get(DIAGNOSTIC_FIELD)
            .map_or(false, |field| is_numeric(field))
        {
            return (RowVerdict::NotData, Vec::new());
        }
        let mut problems = Vec::new();
        let mut values = Vec::new();
        for &(column, position) in &self.mandatory {
            match check_field(column, position, fields.get(position).copied()) {
                Check::Zero => (),
                Check::Value(v) => values.push((column, v)),
                Check::Problem(p) => problems.push(p),
            }
        }
        if problems.is_empty() {
            (RowVerdict::Accepted, values)
        } else {
            (RowVerdict::Rejected(problems), Vec::new())
        }
    }

    /// Check a line following the header. Accepted lines are kept (in
    /// order) and their positive mandatory values added to the
    /// stats. Rejected rows do not change the stats.
    pub fn process_line(&mut self, line: &str) -> RowVerdict {
        let (verdict, values) = self.classify(line);
        if verdict == RowVerdict::Accepted {
            for (column, value) in values {
                self.stats
                    .get_mut(column)
                    .expect("stats exist for all indexed columns")
                    .add(value);
            }
            self.accepted.push(line.to_owned());
        }
        verdict
    }

    pub fn stats(&self, column: &str) -> Option<&ColumnStats> {
        self.stats.get(column)
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    pub fn accepted(&self) -> &[String] {
        &self.accepted
    }
}
