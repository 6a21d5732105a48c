use std::io::Write;
use std::path::Path;
use std::process::Command;

use vmplot::aggregator::ColumnStats;
use vmplot::column_index::HeaderError;
use vmplot::input::InputSource;
use vmplot::pipeline::{generate, Pipeline, RunSummary};
use vmplot::plot_script::PlotOptions;

const BANNER: &str = "procs -----------memory---------- ---io--- --cpu--";
const HEADER: &str = " r  b   swpd   free   buff  cache   bi    bo us sy id time";

fn plot_options(time_column: usize) -> PlotOptions {
    PlotOptions {
        title: "testhost".into(),
        label: "2013-10-01 12:00:00".into(),
        time_column,
        kilobytes: 0,
        ram_megabytes: 4096,
        postscript: false,
        slc4: false,
    }
}

fn write_log(dir: &Path, name: &str, lines: &[&str]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(f, "{line}").unwrap();
    }
    path
}

fn run_pipeline(
    lines: &[&str],
) -> Result<(vmplot::aggregator::Aggregator, RunSummary), HeaderError> {
    let mut p = Pipeline::new();
    for (i, line) in lines.iter().enumerate() {
        p.process_line("test.log", i + 1, line)?;
    }
    p.finish()
}

fn bi_bo(summary: &RunSummary) -> (ColumnStats, ColumnStats) {
    (summary.column_stats[0].1, summary.column_stats[1].1)
}

#[test]
fn scenario_a_accepted_row_sums() {
    let (aggregator, summary) = run_pipeline(&[
        BANNER,
        HEADER,
        " 0  0      0 100000    200    300   50    60  5  2 93 12:00:00",
    ])
    .unwrap();
    assert_eq!(summary.accepted_rows, 1);
    let (bi, bo) = bi_bo(&summary);
    assert_eq!(bi, ColumnStats { sum: 50, count: 1 });
    assert_eq!(bo, ColumnStats { sum: 60, count: 1 });
    assert_eq!(aggregator.accepted().len(), 1);
}

#[test]
fn scenario_b_overflow_rejected() {
    let (_, summary) = run_pipeline(&[
        BANNER,
        HEADER,
        " 0  0      0 100000    200    300   9999999999    60  5  2 93 12:00:00",
    ])
    .unwrap();
    assert_eq!(summary.accepted_rows, 0);
    assert_eq!(summary.rejected_rows, 1);
    let (bi, bo) = bi_bo(&summary);
    assert_eq!(bi, ColumnStats::default());
    assert_eq!(bo, ColumnStats::default());
}

#[test]
fn scenario_c_garbled_rejected() {
    let (_, summary) = run_pipeline(&[
        HEADER,
        " 0  0      0 100000    200    300   abc    60  5  2 93 12:00:00",
        " 0  0      0 100000    200    300   10    20  5  2 93 12:00:02",
    ])
    .unwrap();
    assert_eq!(summary.accepted_rows, 1);
    assert_eq!(summary.rejected_rows, 1);
    assert_eq!(bi_bo(&summary).0, ColumnStats { sum: 10, count: 1 });
}

#[test]
fn scenario_d_memory_divisor() {
    let dir = tempfile::tempdir().unwrap();
    let (aggregator, _) =
        run_pipeline(&[HEADER, " 0 0 0 100000 200 300 50 60 5 2 93 12:00:00"]).unwrap();
    let files = generate(&aggregator, &plot_options(12), dir.path(), false).unwrap();
    let script = std::fs::read_to_string(files.script.path()).unwrap();
    assert!(script.contains("using 0:($4/40960) title \"mem:free\""));
    assert!(script.contains("using 0:($7/1) title \"io:in\""));
}

#[test]
fn scenario_e_no_time_axis() {
    let dir = tempfile::tempdir().unwrap();
    let (aggregator, _) =
        run_pipeline(&[HEADER, " 0 0 0 100000 200 300 50 60 5 2 93 12:00:00"]).unwrap();
    let files = generate(&aggregator, &plot_options(0), dir.path(), false).unwrap();
    let plot = files.plot_script.statements.last().unwrap();
    let data = files.data.path().to_string_lossy().to_string();
    assert!(plot.starts_with(&format!("plot \"{data}\" using 0:($7/1) title \"io:in\"")));
    assert!(!plot.contains("xtic("));
}

#[test]
fn missing_mandatory_column_is_fatal() {
    let err = run_pipeline(&["r b swpd free buff cache bo", "0 0 0 1 1 1 1"]).unwrap_err();
    assert_eq!(err, HeaderError::MissingColumns(vec!["bi"]));
}

#[test]
fn empty_result_still_generates() {
    let dir = tempfile::tempdir().unwrap();
    let (aggregator, summary) = run_pipeline(&[HEADER, " 0 0 0 1 1 1 x y 1 1 1 12:00:00"]).unwrap();
    assert_eq!(summary.accepted_rows, 0);
    let files = generate(&aggregator, &plot_options(12), dir.path(), false).unwrap();
    assert_eq!(std::fs::read_to_string(files.data.path()).unwrap(), "");
}

#[test]
fn temp_files_removed_unless_retained() {
    let dir = tempfile::tempdir().unwrap();
    let (aggregator, _) = run_pipeline(&[HEADER, " 0 0 0 1 1 1 1 1 1 1 1 12:00:00"]).unwrap();

    let files = generate(&aggregator, &plot_options(12), dir.path(), false).unwrap();
    let paths = (files.data.path().to_owned(), files.script.path().to_owned());
    assert!(paths.0.exists() && paths.1.exists());
    drop(files);
    assert!(!paths.0.exists() && !paths.1.exists());

    let files = generate(&aggregator, &plot_options(12), dir.path(), true).unwrap();
    let paths = (files.data.path().to_owned(), files.script.path().to_owned());
    drop(files);
    assert!(paths.0.exists() && paths.1.exists());
}

#[test]
fn idempotent_script() {
    let mut lines = vec![BANNER, HEADER];
    let rows: Vec<String> = (0..40)
        .map(|i| format!(" 1 0 0 100000 200 300 {} {} 5 2 93 12:00:{:02}", i * 10, i, i))
        .collect();
    lines.extend(rows.iter().map(|s| s.as_str()));

    let dir = tempfile::tempdir().unwrap();
    let contents = |dir: &Path| {
        let (aggregator, _) = run_pipeline(&lines).unwrap();
        let files = generate(&aggregator, &plot_options(12), dir, false).unwrap();
        let data = std::fs::read_to_string(files.data.path()).unwrap();
        let script = std::fs::read_to_string(files.script.path())
            .unwrap()
            .replace(&*files.data.path().to_string_lossy(), "DATA");
        (data, script)
    };
    let a = contents(dir.path());
    let b = contents(dir.path());
    assert_eq!(a, b);

    // 40 rows: interval 8, time stamps kept at 5, 13, 21, 29, 37
    let data_lines: Vec<&str> = a.0.lines().collect();
    assert_eq!(data_lines.len(), 40);
    let kept: Vec<usize> = data_lines
        .iter()
        .enumerate()
        .filter(|(_, l)| !l.ends_with("''"))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(kept, vec![5, 13, 21, 29, 37]);
}

#[test]
fn multiple_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_log(
        dir.path(),
        "a.log",
        &[BANNER, HEADER, " 1 0 0 1 1 1 5 6 1 1 1 12:00:00"],
    );
    let b = write_log(
        dir.path(),
        "b.log",
        &[
            BANNER,
            HEADER,
            " 1 0 0 1 1 1 7 bad 1 1 1 12:00:02",
            " 1 0 0 1 1 1 8 9 1 1 1 12:00:04",
        ],
    );
    let mut p = Pipeline::new();
    p.ingest(&[InputSource::File(a), InputSource::File(b)]).unwrap();
    let (_, summary) = p.finish().unwrap();
    assert_eq!(summary.accepted_rows, 2);
    assert_eq!(summary.rejected_rows, 1);
    assert_eq!(bi_bo(&summary).0, ColumnStats { sum: 13, count: 2 });
}

fn vmplot() -> Command {
    Command::new(env!("CARGO_BIN_EXE_vmplot"))
}

#[test]
fn binary_no_render() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(
        dir.path(),
        "host.log",
        &[BANNER, HEADER, " 1 0 0 1 1 1 5 6 1 1 1 12:00:00"],
    );
    let output = vmplot()
        .args(["--no-render", "-q", "-t", "host", "-c", "12", "--tmpdir"])
        .arg(dir.path())
        .arg(&log)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    let paths: Vec<&str> = stdout.lines().collect();
    assert_eq!(paths.len(), 2);
    let script = std::fs::read_to_string(paths[1]).unwrap();
    assert!(script.contains("set output \"host.png\";"));
}

#[test]
fn binary_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(dir.path(), "bad.log", &["r b swpd free buff cache", "1 0 0 1 1 1"]);
    let status = vmplot()
        .args(["--no-render", "--tmpdir"])
        .arg(dir.path())
        .arg(&log)
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(10));

    let status = vmplot()
        .args(["--no-render", "--ram", "lots"])
        .arg(&log)
        .status()
        .unwrap();
    assert!(!status.success());
}

#[cfg(unix)]
#[test]
fn binary_renderer_failure_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(
        dir.path(),
        "rejected.log",
        &[BANNER, HEADER, " 1 0 0 1 1 1 abc 6 1 1 1 12:00:00"],
    );
    let tmpdir = dir.path().join("tmp");
    std::fs::create_dir(&tmpdir).unwrap();
    let output = vmplot()
        .args(["-q", "-t", "host", "-c", "12", "--renderer", "false", "--tmpdir"])
        .arg(&tmpdir)
        .arg(&log)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0), "{output:?}");
    // Both temporary files are kept for inspection
    let kept: Vec<String> = std::fs::read_dir(&tmpdir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(kept.len(), 2, "{kept:?}");
    assert!(kept.iter().any(|name| name.starts_with("vmplot-vmstat-")));
    assert!(kept.iter().any(|name| name.starts_with("vmplot-gnuplot-")));
}

#[test]
fn binary_row_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(
        dir.path(),
        "bad.log",
        &[
            BANNER,
            HEADER,
            " 1 0 0 1 1 1 abc 6 1 1 1 12:00:00",
            " 1 0 0 1 1 1 9999999999 6 1 1 1 12:00:02",
        ],
    );
    let run = |extra: &[&str]| {
        let output = vmplot()
            .args(["--no-render", "-c", "12", "--tmpdir"])
            .arg(dir.path())
            .args(extra)
            .arg(&log)
            .output()
            .unwrap();
        assert!(output.status.success(), "{output:?}");
        String::from_utf8(output.stderr).unwrap()
    };

    let stderr = run(&[]);
    assert!(
        stderr.contains(r#"bad.log:3: column 6 is garbled: "abc", skipping"#),
        "{stderr}"
    );
    assert!(
        stderr.contains("bad.log:4: column 6: 9999999999 too large, skipping"),
        "{stderr}"
    );

    let stderr = run(&["-q"]);
    assert!(!stderr.contains("garbled"), "{stderr}");
    assert!(!stderr.contains("too large"), "{stderr}");
}
