//! Turning vmstat(1) style system sampling logs into gnuplot(1) time
//! series graphs.

pub mod aggregator;
pub mod column_index;
pub mod column_mapping;
pub mod get_terminal_width;
pub mod input;
pub mod io_utils;
pub mod pipeline;
pub mod plot_script;
pub mod renderer;
pub mod thinning;
pub mod utillib;
