//! Shell execution: the elevated (`su`) context and plain `sh`.

pub mod process;

pub use process::{ProcessShell, DEFAULT_SHELL_TIMEOUT};
