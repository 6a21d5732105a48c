//! Which log file columns are plotted, how they are labelled and
//! styled, and by what they are divided. Adding a tracked metric means
//! adding an entry to `COLUMN_MAPPINGS`.

const K: f64 = 1024.;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Divisor {
    Fixed(f64),
    /// Multiplied by the RAM size in megabytes, to get a percentage
    /// from memory columns.
    RamRelative(f64),
}

impl Divisor {
    pub fn effective(self, ram_megabytes: u64) -> f64 {
        match self {
            Divisor::Fixed(d) => d,
            Divisor::RamRelative(d) => d * ram_megabytes as f64,
        }
    }
}

#[derive(Debug)]
pub struct ColumnMapping {
    /// Column name in the header row
    pub column: &'static str,
    /// The gnuplot title and style arguments, used verbatim
    pub style: &'static str,
    pub divisor: Divisor,
}

macro_rules! mapping {
    { $column:expr, $style:expr, mem $divisor:expr } => {
        ColumnMapping { column: $column, style: $style, divisor: Divisor::RamRelative($divisor) }
    };
    { $column:expr, $style:expr, $divisor:expr } => {
        ColumnMapping { column: $column, style: $style, divisor: Divisor::Fixed($divisor) }
    };
}

/// In plot (and legend) order.
#[rustfmt::skip]
pub const COLUMN_MAPPINGS: &[ColumnMapping] = &[
    mapping!("bi", r#""io:in"       axis x1y2 smooth csplines lt 5 lw 3"#, 1.),
    mapping!("bo", r#""io:out"      axis x1y2 smooth csplines lt 1 lw 3"#, 1.),
    mapping!("us", r#""cpu:user"    smooth csplines lt 3 lw 2"#, 1.),
    mapping!("sy", r#""cpu:sys"     smooth csplines lt 4 lw 1"#, 1.),
    mapping!("id", r#""cpu:idle"    smooth csplines lt 2 lw 2"#, 1.),
    mapping!("free", r#""mem:free"    smooth csplines lt 6 lw 2"#, mem 10.),
    mapping!("buff", r#""mem:buff"    smooth csplines lt 7 lw 1"#, mem 10.),
    mapping!("cache", r#""mem:cache"   smooth csplines lt 8 lw 1"#, mem 10.),
    mapping!("swapped", r#""mem:swapped" smooth csplines lt 9 lw 2"#, mem 10.),
    mapping!("eth0_i", r#""(x100kbit/s) eth0:in"  axis x1y2 smooth csplines lt 5 lw 1"#, 100. * K),
    mapping!("eth0_o", r#""(x100kbit/s) eth0:out" axis x1y2 smooth csplines lt 1 lw 1"#, 100. * K),
    mapping!("eth1_i", r#""(x100kbit/s) eth1:in"  axis x1y2 smooth csplines lt 5 lw 1"#, 100. * K),
    mapping!("eth1_o", r#""(x100kbit/s) eth1:out" axis x1y2 smooth csplines lt 1 lw 1"#, 100. * K),
    mapping!("wlan0_i", r#""(x5kbit/s) wlan0:in"  axis x1y2 smooth csplines lt 5 lw 1"#, 5. * K),
    mapping!("wlan0_o", r#""(x5kbit/s) wlan0:out" axis x1y2 smooth csplines lt 1 lw 1"#, 5. * K),
    mapping!("wlan1_i", r#""(x5kbit/s) wlan1:in"  axis x1y2 smooth csplines lt 5 lw 1"#, 5. * K),
    mapping!("wlan1_o", r#""(x5kbit/s) wlan1:out" axis x1y2 smooth csplines lt 1 lw 1"#, 5. * K),
    mapping!("syslog", r#""(LPS) syslog" axis x1y2 lt 2 lw 1"#, 10.),
    mapping!("http_req", r#""(QPS) http_req" axis x1y2 lt 3 lw 1"#, 10.),
    mapping!("http_err", r#""(QPSx100) http_err" axis x1y2 lt 1 lw 2"#, 0.1),
];
