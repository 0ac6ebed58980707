//! Persisted settings command

use crate::config::CliConfigLoader;
use crate::context::AppContext;
use crate::output::formatter::success;
use anyhow::Result;
use ghsearch_core::storage::Theme;
use std::path::Path;

/// Show the settings, or change the ones given
pub async fn settings_command(
    exclude_non_programming: Option<bool>,
    theme: Option<Theme>,
    config_loader: CliConfigLoader,
    store_path: &Path,
) -> Result<()> {
    let mut context = AppContext::load(&config_loader, store_path).await?;

    if exclude_non_programming.is_none() && theme.is_none() {
        println!("⚙️  Settings\n");
        println!(
            "   Hide non-programming files: {}",
            context.config.exclude_non_programming
        );
        println!("   Theme: {}", context.store.theme().as_str());
        if let Some(path) = context.store.path() {
            println!("   Stored in {}", path.display());
        }
        return Ok(());
    }

    if let Some(exclude) = exclude_non_programming {
        context.set_exclude_non_programming(exclude)?;
        println!(
            "{}",
            success(&format!("Hide non-programming files: {}", exclude))
        );
    }
    if let Some(theme) = theme {
        context.store.set_theme(theme)?;
        println!("{}", success(&format!("Theme: {}", theme.as_str())));
    }

    context.persist().await
}
