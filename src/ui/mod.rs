//! Terminal diagnostics and prompts
//!
//! Everything here writes to stderr. Stdout belongs to command output, and
//! for `load` that output is shell source meant to be evaluated.
//! Interactive terminals get `cliclack` styling; CI and pipes get plain
//! `[OK]`/`[WARN]` lines.

mod context;
mod output;
mod prompts;

pub use context::UiContext;
pub use output::{error_with_hint, remark, step_ok, step_warn_hint};
pub use prompts::confirm;
