//! Header resolution, row filtering, time stamp thinning and plot
//! script generation, in that order.

use std::{
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{anyhow, Context, Result};

use crate::{
    aggregator::{Aggregator, ColumnStats, RowVerdict},
    column_index::{is_banner_line, is_header_line, ColumnIndex, HeaderError, MANDATORY_COLUMNS},
    debug, info,
    input::{for_each_line, InputSource},
    io_utils::temporary_file::TemporaryFile,
    plot_script::{plot_directives, PlotOptions, PlotScript},
    thinning::write_thinned,
    warn,
};

pub const DATA_FILE_PREFIX: &str = "vmplot-vmstat-";
pub const SCRIPT_FILE_PREFIX: &str = "vmplot-gnuplot-";
pub const TEMP_FILE_SUFFIX: &str = ".tmp";

#[derive(Debug)]
enum State {
    /// Looking for the header row
    Searching,
    Resolved(Aggregator),
}

/// The filter pass. Feed it all input lines, then `finish` it.
#[derive(Debug)]
pub struct Pipeline {
    state: State,
    rejected_rows: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            state: State::Searching,
            rejected_rows: 0,
        }
    }

    /// Only header problems are errors; bad sample rows are logged
    /// and skipped.
    pub fn process_line(
        &mut self,
        source: &str,
        linenum: usize,
        line: &str,
    ) -> Result<(), HeaderError> {
        if is_banner_line(line) {
            return Ok(());
        }
        match &mut self.state {
            State::Searching => {
                if is_header_line(line) {
                    let index = ColumnIndex::from_header_line(line)?;
                    info!(
                        "column index built at {source}:{linenum}, {} columns",
                        index.names().len()
                    );
                    self.state = State::Resolved(Aggregator::new(index));
                }
            }
            State::Resolved(aggregator) => match aggregator.process_line(line) {
                RowVerdict::Accepted => (),
                RowVerdict::NotData => debug!("{source}:{linenum}: not a sample row, ignoring"),
                RowVerdict::Rejected(problems) => {
                    self.rejected_rows += 1;
                    for problem in problems {
                        warn!("{source}:{linenum}: {problem}, skipping");
                    }
                }
            },
        }
        Ok(())
    }

    /// Process all lines of `sources`.
    pub fn ingest(&mut self, sources: &[InputSource]) -> Result<()> {
        for_each_line(sources, |source, linenum, line| {
            self.process_line(source, linenum, line)?;
            Ok(())
        })
    }

    /// Fails if no header row was seen.
    pub fn finish(self) -> Result<(Aggregator, RunSummary), HeaderError> {
        match self.state {
            State::Searching => Err(HeaderError::NotFound),
            State::Resolved(aggregator) => {
                let column_stats = MANDATORY_COLUMNS
                    .iter()
                    .map(|column| {
                        let stats = aggregator
                            .stats(column)
                            .copied()
                            .expect("mandatory columns are indexed");
                        (*column, stats)
                    })
                    .collect();
                let summary = RunSummary {
                    accepted_rows: aggregator.accepted_count(),
                    rejected_rows: self.rejected_rows,
                    column_stats,
                };
                Ok((aggregator, summary))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub accepted_rows: usize,
    pub rejected_rows: usize,
    /// For the mandatory columns, in `MANDATORY_COLUMNS` order
    pub column_stats: Vec<(&'static str, ColumnStats)>,
}

impl RunSummary {
    pub fn log(&self) {
        info!(
            "{} rows accepted, {} rows skipped",
            self.accepted_rows, self.rejected_rows
        );
        for (column, stats) in &self.column_stats {
            match stats.average() {
                Some(avg) => info!(
                    "column {column}: average {avg} over {} non-zero samples (sum {})",
                    stats.count, stats.sum
                ),
                None => info!("column {column}: no non-zero samples"),
            }
        }
    }
}

/// The sanitized data file and the gnuplot script file.
#[derive(Debug)]
pub struct GeneratedFiles {
    pub data: TemporaryFile,
    pub script: TemporaryFile,
    pub plot_script: PlotScript,
}

impl GeneratedFiles {
    /// Keep both files after we exit.
    pub fn retain(&mut self) {
        self.data.retain();
        self.script.retain();
    }
}

fn create_temp(tmpdir: &Path, prefix: &str) -> Result<(TemporaryFile, BufWriter<std::fs::File>)> {
    let (tmp, file) = TemporaryFile::create_in(tmpdir, prefix, TEMP_FILE_SUFFIX)
        .with_context(|| anyhow!("creating temporary file in {tmpdir:?}"))?;
    Ok((tmp, BufWriter::new(file)))
}

/// Write the accepted rows (time stamps thinned) and the plot script
/// referencing them to new temporary files in `tmpdir`.
pub fn generate(
    aggregator: &Aggregator,
    opts: &PlotOptions,
    tmpdir: &Path,
    retain: bool,
) -> Result<GeneratedFiles> {
    let (mut data, mut out) = create_temp(tmpdir, DATA_FILE_PREFIX)?;
    if retain {
        data.retain();
        info!("sanitized vmstat file: {:?}", data.path());
    }
    write_thinned(aggregator.accepted(), opts.time_column, &mut out)
        .and_then(|()| out.flush())
        .with_context(|| anyhow!("writing sanitized data to {:?}", data.path()))?;
    drop(out);

    let directives = plot_directives(opts, aggregator.index(), data.path());
    let plot_script = PlotScript::new(opts, &directives);

    let (mut script, mut out) = create_temp(tmpdir, SCRIPT_FILE_PREFIX)?;
    if retain {
        script.retain();
        info!("gnuplot command file: {:?}", script.path());
    }
    out.write_all(plot_script.to_script_string().as_bytes())
        .and_then(|()| out.flush())
        .with_context(|| anyhow!("writing gnuplot script to {:?}", script.path()))?;

    Ok(GeneratedFiles {
        data,
        script,
        plot_script,
    })
}
