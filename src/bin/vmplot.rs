use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use vmplot::column_index::HeaderError;
use vmplot::get_terminal_width::get_terminal_width;
use vmplot::input::InputSource;
use vmplot::pipeline::{generate, Pipeline};
use vmplot::plot_script::{timestamp_label, PlotOptions};
use vmplot::renderer::{render, DEFAULT_RENDERER};
use vmplot::utillib::logging::{set_log_level, LogLevelOpt};
use vmplot::{info, warn};

/// Exit code when the input is not vmstat(1) output
const HEADER_ERROR_EXIT_CODE: i32 = 10;

/// Generate gnuplot(1) graphs from vmstat(1) output. Writes
/// `{title}.png` (and optionally `{title}.ps`) to the current
/// directory.
#[derive(clap::Parser, Debug)]
#[clap(version)]
#[clap(next_line_help = true)]
#[clap(set_term_width = get_terminal_width())]
struct Opts {
    #[clap(flatten)]
    log_level: LogLevelOpt,

    /// Graph title, also the base name of the output files (default:
    /// the name of the current directory)
    #[clap(short, long)]
    title: Option<String>,

    /// Graph author email address, shown in the graph label
    #[clap(short, long)]
    email: Option<String>,

    /// Column with the current time, 1-based; 0 means there is none
    #[clap(short = 'c', long, default_value = "20")]
    timecol: usize,

    /// Upper bound of the throughput axis (0: automatic)
    #[clap(short, long, default_value = "0")]
    kilobytes: u64,

    /// Megabytes of RAM available (memory columns are shown as
    /// percentage of this)
    #[clap(short = 'm', long, default_value = "4096")]
    ram: u64,

    /// Additional PostScript graph output
    #[clap(short, long)]
    postscript: bool,

    /// Retain the temporary files (sanitized data and gnuplot script)
    #[clap(short, long)]
    retain: bool,

    /// SLC4 (gnuplot 4.0) compatibility
    #[clap(short = '4', long)]
    slc4: bool,

    /// The program to run on the generated script
    #[clap(long, default_value = DEFAULT_RENDERER)]
    renderer: String,

    /// Only write the data and script files (implies `--retain`),
    /// print their paths, and do not run the renderer
    #[clap(long)]
    no_render: bool,

    /// Directory for the temporary files (default: the system's
    /// temporary directory)
    #[clap(long)]
    tmpdir: Option<PathBuf>,

    /// The vmstat log files, concatenated; none or `-` for stdin
    paths: Vec<PathBuf>,
}

fn default_title() -> Result<String> {
    let cwd = std::env::current_dir().context("getting the current directory")?;
    Ok(match cwd.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => "vmplot".into(),
    })
}

fn run(opts: Opts) -> Result<()> {
    let Opts {
        log_level,
        title,
        email,
        timecol,
        kilobytes,
        ram,
        postscript,
        retain,
        slc4,
        renderer,
        no_render,
        tmpdir,
        paths,
    } = opts;
    set_log_level(log_level.into());

    let title = match title {
        Some(title) => title,
        None => default_title()?,
    };
    info!("option: title = {title:?}");
    info!("option: email = {email:?}");
    info!("option: timecol = {timecol}");
    info!("option: ram = {ram}");
    info!("option: kilobytes = {kilobytes}");
    info!("option: postscript = {postscript}");
    info!("args: {paths:?}");

    let mut pipeline = Pipeline::new();
    pipeline.ingest(&InputSource::from_args(&paths))?;
    let (aggregator, summary) = pipeline.finish()?;
    summary.log();

    let plot_opts = PlotOptions {
        title,
        label: timestamp_label(email.as_deref(), Local::now()),
        time_column: timecol,
        kilobytes,
        ram_megabytes: ram,
        postscript,
        slc4,
    };
    let tmpdir = tmpdir.unwrap_or_else(std::env::temp_dir);
    let mut files = generate(&aggregator, &plot_opts, &tmpdir, retain || no_render)?;

    if no_render {
        println!("{}", files.data.path().to_string_lossy());
        println!("{}", files.script.path().to_string_lossy());
        return Ok(());
    }

    // The image is the renderer's business; its failure (e.g. gnuplot
    // refusing an empty plot) does not fail the run.
    if let Err(e) = render(&renderer, files.script.path()) {
        files.retain();
        warn!(
            "{e}; kept the gnuplot script {:?} and data {:?}",
            files.script.path(),
            files.data.path()
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let opts: Opts = Opts::parse();
    match run(opts) {
        Err(e) if e.downcast_ref::<HeaderError>().is_some() => {
            eprintln!("Error: {e:#}");
            std::process::exit(HEADER_ERROR_EXIT_CODE)
        }
        r => r,
    }
}
