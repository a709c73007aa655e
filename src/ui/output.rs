//! Diagnostic lines on stderr

use super::context::UiContext;
use console::style;

/// Report a completed step
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(message).ok();
    } else {
        eprintln!("{} {}", style("[OK]").green(), message);
    }
}

/// Report a non-fatal problem with a suggested fix
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::warning(format!("{} - {}", message, style(hint).dim())).ok();
    } else {
        eprintln!("{} {} - {}", style("[WARN]").yellow(), message, hint);
    }
}

/// Report a failure in the same `Error:`/`Hint:` shape as fatal errors
pub fn error_with_hint(message: &str, hint: Option<&str>) {
    eprintln!("{} {}", style("Error:").red().bold(), message);
    if let Some(hint) = hint {
        eprintln!("{} {}", style("Hint:").yellow(), hint);
    }
}

/// Dim side note
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::remark(message).ok();
    } else {
        eprintln!("{}", style(message).dim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_non_interactive() {
        let ctx = UiContext::non_interactive();
        step_ok(&ctx, "done");
        step_warn_hint(&ctx, "provider skipped", "check provider.toml");
        error_with_hint("failed", Some("try again"));
        error_with_hint("failed", None);
        remark(&ctx, "note");
    }
}
