//! Clean up files via `Drop` action, unless asked to retain them.

//! Relying on `Drop` means that kill by e.g. signals without handlers
//! (ctl-c), or `std::process::exit`, will prevent the cleanup. That's
//! accepted here: the files are in a temp dir.

use std::{
    fs::{File, OpenOptions},
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU32, Ordering},
};

use nix::unistd::getpid;

use crate::info;

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// `{dir}/{prefix}{pid}-{n}{suffix}`, with `n` counting up per
/// process.
pub fn temp_path_in(dir: &Path, prefix: &str, suffix: &str) -> PathBuf {
    let pid = getpid();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    dir.join(format!("{prefix}{pid}-{n}{suffix}"))
}

#[derive(Debug)]
pub struct TemporaryFile {
    path: PathBuf,
    retain: bool,
}

impl TemporaryFile {
    /// Create a new, empty file in `dir` (which must exist). Fails if
    /// the path is taken already (retries with the next counter value
    /// a few times in that case).
    pub fn create_in(dir: &Path, prefix: &str, suffix: &str) -> std::io::Result<(Self, File)> {
        let mut attempts = 0;
        loop {
            let path = temp_path_in(dir, prefix, suffix);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    return Ok((
                        Self {
                            path,
                            retain: false,
                        },
                        file,
                    ))
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempts < 100 => {
                    attempts += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Do not delete the file on drop.
    pub fn retain(&mut self) {
        self.retain = true;
    }
}

impl Drop for TemporaryFile {
    fn drop(&mut self) {
        if self.retain {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!("deleted temporary file {:?}", self.path),
            Err(e) => match e.kind() {
                ErrorKind::NotFound => (),
                _ => info!("error deleting temporary file {:?}: {e:#}", self.path),
            },
        }
    }
}
