//! Generating the gnuplot(1) command script.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use itertools::Itertools;

use crate::{column_index::ColumnIndex, column_mapping::COLUMN_MAPPINGS};

#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub title: String,
    /// Shown in the corner of the graph (non-legacy mode only)
    pub label: String,
    /// 1-based, 0 = no time axis
    pub time_column: usize,
    /// Upper bound of the throughput axis, 0 = automatic
    pub kilobytes: u64,
    pub ram_megabytes: u64,
    /// Additionally write `{title}.ps`
    pub postscript: bool,
    /// gnuplot 4.0 compatible terminal settings
    pub slc4: bool,
}

/// `"%F %T"` local time, prefixed with `email` if given.
pub fn timestamp_label(email: Option<&str>, now: DateTime<Local>) -> String {
    let time = now.format("%F %T");
    match email {
        Some(email) => format!("{email} {time}"),
        None => time.to_string(),
    }
}

/// Contents for a double-quoted gnuplot string.
pub fn gnuplot_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlotDirective {
    /// Column 0 against the time column, used as tic labels.
    TimeAxis { data: PathBuf, time_column: usize },
    Column {
        data: PathBuf,
        /// 1-based
        column: usize,
        divisor: f64,
        style: &'static str,
    },
}

impl Display for PlotDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlotDirective::TimeAxis { data, time_column } => write!(
                f,
                "\"{}\" using 0:{time_column}:xtic({time_column}) axis x1y2 title \"t\" lt 7 lw 0",
                gnuplot_escape(&data.to_string_lossy())
            ),
            PlotDirective::Column {
                data,
                column,
                divisor,
                style,
            } => write!(
                f,
                "\"{}\" using 0:(${column}/{divisor}) title {style}",
                gnuplot_escape(&data.to_string_lossy())
            ),
        }
    }
}

/// The plot directives, time axis first (if any), then the known
/// columns present in `index` in `COLUMN_MAPPINGS` order.
pub fn plot_directives(opts: &PlotOptions, index: &ColumnIndex, data: &Path) -> Vec<PlotDirective> {
    let time_axis = (opts.time_column > 0).then(|| PlotDirective::TimeAxis {
        data: data.to_owned(),
        time_column: opts.time_column,
    });
    let columns = COLUMN_MAPPINGS.iter().filter_map(|mapping| {
        let position = index.position(mapping.column)?;
        Some(PlotDirective::Column {
            data: data.to_owned(),
            column: position + 1,
            divisor: mapping.divisor.effective(opts.ram_megabytes),
            style: mapping.style,
        })
    });
    time_axis.into_iter().chain(columns).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotScript {
    pub statements: Vec<String>,
}

impl PlotScript {
    pub fn new(opts: &PlotOptions, directives: &[PlotDirective]) -> Self {
        let title = gnuplot_escape(&opts.title);
        let mut statements = Vec::new();
        let mut push = |s: String| statements.push(s);

        if opts.slc4 {
            push("set terminal png small;".into());
            push("set size 1.6,1.0;".into());
        } else {
            push("set terminal png small size 1024,480 ;".into());
            push(format!(
                "set label \"{}\" front offset -11,-2.5 ;",
                gnuplot_escape(&opts.label)
            ));
        }
        push(format!("set output \"{title}.png\";"));
        push(format!("set title \"{title}\";"));
        push("set key below;".into());
        push("set xlabel \"Time\";".into());
        push("set y2label \"I/O (KB/s)\";".into());
        push("set y2tics nomirror;".into());
        if opts.kilobytes > 0 {
            push(format!("set y2range [0:{}];", opts.kilobytes));
        }
        push("set yrange [0:103];".into());
        push("set ylabel \"Memory/CPU utilization (%)\";".into());
        push("set ytics 20;".into());
        push("set grid linetype 0;".into());
        push(format!("plot {};", directives.iter().join(", ")));

        if opts.postscript {
            push("set terminal postscript color landscape small;".into());
            push("set size 1.0,1.0;".into());
            push(format!("set output \"{title}.ps\";"));
            push("replot;".into());
        }
        Self { statements }
    }

    /// The statements joined with line continuations.
    pub fn to_script_string(&self) -> String {
        let mut s = self.statements.join("\\\n");
        s.push('\n');
        s
    }
}
