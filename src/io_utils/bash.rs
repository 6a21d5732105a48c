//! Shell quoting, only for showing the commands we run in log
//! messages (we never run anything through a shell).

use std::{borrow::Cow, ffi::OsStr, process::Command};

use itertools::Itertools;

const CHARS_NOT_NEEDING_QUOTING: &str = "_:.-+,/=@[]^";

pub fn bash_string_literal(s: &str) -> Cow<'_, str> {
    if !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || CHARS_NOT_NEEDING_QUOTING.contains(c))
    {
        s.into()
    } else {
        let mut ss = String::with_capacity(s.len() + 2);
        ss.push('\'');
        for c in s.chars() {
            if c == '\'' {
                ss.push_str("'\\''");
            } else {
                ss.push(c);
            }
        }
        ss.push('\'');
        ss.into()
    }
}

/// The program and arguments of `cmd`, decoded lossily, quoted and
/// joined.
pub fn cmd_as_bash_string(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|s: &OsStr| bash_string_literal(&s.to_string_lossy()).into_owned())
        .join(" ")
}

#[test]
fn t_bash_string_literal() {
    assert_eq!(bash_string_literal("gnuplot"), "gnuplot");
    assert_eq!(bash_string_literal("/tmp/a b"), "'/tmp/a b'");
    assert_eq!(bash_string_literal("it's"), "'it'\\''s'");
    assert_eq!(bash_string_literal(""), "''");
}

#[test]
fn t_cmd_as_bash_string() {
    let mut cmd = Command::new("gnuplot");
    cmd.arg("/tmp/vmplot gnuplot-1.tmp");
    assert_eq!(cmd_as_bash_string(&cmd), "gnuplot '/tmp/vmplot gnuplot-1.tmp'");
}
