//! Token management command

use crate::config::CliConfigLoader;
use crate::context::AppContext;
use crate::output::formatter::success;
use anyhow::Result;
use chrono::Local;
use ghsearch_core::token::mask_token;
use std::path::Path;
use tracing::info;

/// What to do with the stored token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAction {
    Set(String),
    Show,
    Clear,
    Refresh,
}

/// Set, inspect, re-validate or forget the stored GitHub token
pub async fn token_command(
    action: TokenAction,
    config_loader: CliConfigLoader,
    store_path: &Path,
) -> Result<()> {
    let mut context = AppContext::load(&config_loader, store_path).await?;

    match action {
        TokenAction::Set(token) => {
            info!("Validating GitHub token");
            let user = context.tokens.set_token(&token).await?;
            context.persist().await?;
            println!("{}", success(&format!("Token saved for {}", user.login)));
            if let Some(name) = user.name {
                println!("   👤 {}", name);
            }
        }
        TokenAction::Show => {
            match context.tokens.token() {
                Ok(token) => println!("🔑 {}", mask_token(token)),
                Err(_) if context.tokens.is_expired() => {
                    println!("⌛ Stored token expired, run `ghsearch token refresh`")
                }
                Err(_) => println!("📭 No token stored"),
            }
            if let Some(expires_at) = context.tokens.expires_at() {
                println!(
                    "   Valid until {}",
                    expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                );
            }
            if context.has_token_override() {
                println!("💡 A token from --token or the environment takes precedence");
            }
        }
        TokenAction::Clear => {
            context.tokens.revoke();
            context.persist().await?;
            println!("{}", success("Token removed"));
        }
        TokenAction::Refresh => {
            let result = context.tokens.refresh().await;
            // A rejected token is dropped, so save either way
            context.persist().await?;
            let user = result?;
            println!("{}", success(&format!("Token still valid for {}", user.login)));
        }
    }

    Ok(())
}
