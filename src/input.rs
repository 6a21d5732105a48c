//! Reading the lines of several input files (or stdin) as one stream,
//! keeping track of which file and line they came from.

use std::{
    borrow::Cow,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` means stdin.
    pub fn from_arg(path: &Path) -> Self {
        if path.as_os_str() == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(path.to_owned())
        }
    }

    /// Stdin if `paths` is empty.
    pub fn from_args(paths: &[PathBuf]) -> Vec<Self> {
        if paths.is_empty() {
            vec![InputSource::Stdin]
        } else {
            paths.iter().map(|p| Self::from_arg(p)).collect()
        }
    }

    pub fn name(&self) -> Cow<'_, str> {
        match self {
            InputSource::Stdin => "<stdin>".into(),
            InputSource::File(path) => path.to_string_lossy(),
        }
    }

    fn open(&self) -> Result<Box<dyn BufRead>> {
        match self {
            InputSource::Stdin => Ok(Box::new(BufReader::new(std::io::stdin()))),
            InputSource::File(path) => {
                let file =
                    File::open(path).with_context(|| anyhow!("opening input file {path:?}"))?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}

/// Call `f` with source name, 1-based line number within that source,
/// and the line without its line ending, for all lines of all
/// `sources` in order. Invalid UTF-8 is replaced, not an error.
pub fn for_each_line(
    sources: &[InputSource],
    mut f: impl FnMut(&str, usize, &str) -> Result<()>,
) -> Result<()> {
    for source in sources {
        let name = source.name();
        let mut input = source.open()?;
        read_lines(&mut input, &name, &mut f)?;
    }
    Ok(())
}

/// Call `f` for each line read from `input`, see `for_each_line`.
pub fn read_lines(
    input: &mut dyn BufRead,
    name: &str,
    f: &mut impl FnMut(&str, usize, &str) -> Result<()>,
) -> Result<()> {
    let mut buf = Vec::new();
    let mut linenum = 0;
    loop {
        buf.clear();
        if input
            .read_until(b'\n', &mut buf)
            .with_context(|| anyhow!("reading {name}:{}", linenum + 1))?
            == 0
        {
            return Ok(());
        }
        linenum += 1;
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        f(name, linenum, line)?;
    }
}
