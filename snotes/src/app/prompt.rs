use anyhow::Context;
use dialoguer::{Confirm, theme::ColorfulTheme};

/// Asks a yes/no question on the terminal (default: no). `assume_yes` skips the prompt.
pub async fn confirm(question: String, assume_yes: bool) -> anyhow::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let answer = tokio::task::spawn_blocking(move || {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .default(false)
            .interact()
            .context("Failed to read confirmation (pass --yes when not on a terminal)")
    }).await;

    answer.context("Blocking task failed (panic)")?
}
