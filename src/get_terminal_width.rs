use terminal_size::{terminal_size, Width};

/// Width for wrapping `--help` output, 100 if not on a terminal.
pub fn get_terminal_width() -> usize {
    match terminal_size() {
        Some((Width(w), _)) => usize::from(w),
        None => 100,
    }
}
