//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{ShmgrError, ShmgrResult};

/// Ask for confirmation.
///
/// Auto-yes approves; a non-interactive context answers `default`.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> ShmgrResult<bool> {
    if ctx.auto_yes() {
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    // cliclack blocks on terminal input
    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message).initial_value(default).interact()
    })
    .await
    .map_err(|e| ShmgrError::User(format!("Prompt task failed: {}", e)))?;

    result.map_err(|e| ShmgrError::User(format!("Prompt failed: {}", e)))
}
