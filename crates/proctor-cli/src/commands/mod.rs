//! Subcommand implementations and the helpers they share.

pub mod account;
pub mod attempts;
pub mod exams;
pub mod init;
pub mod questions;
pub mod take;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use proctor_client::{ApiClient, CredentialStore, ProctorConfig, SessionContext};
use proctor_core::model::PageMeta;

/// Everything a command needs to talk to the backend.
pub struct Connection {
    pub config: ProctorConfig,
    pub client: ApiClient,
}

impl Connection {
    pub fn credentials(&self) -> CredentialStore {
        CredentialStore::new(self.config.credentials_file())
    }
}

/// Load configuration and stored credentials, and build a client.
pub fn connect(config_path: Option<&Path>) -> Result<Connection> {
    let config = proctor_client::load_config_from(config_path)?;
    let store = CredentialStore::new(config.credentials_file());

    let token = match config.token.clone() {
        Some(token) => Some(token),
        None => store
            .load_valid(&config.base_url, Utc::now())?
            .map(|c| c.access_token),
    };

    let mut context = SessionContext::anonymous(config.base_url.clone());
    context.set_token(token);
    tracing::debug!(?context, "connecting");

    let client = ApiClient::with_timeout(context, config.timeout_secs)
        .context("failed to create HTTP client")?;
    Ok(Connection { config, client })
}

/// Like [`connect`], but fail early when there is no access token.
pub fn connect_authenticated(config_path: Option<&Path>) -> Result<Connection> {
    let conn = connect(config_path)?;
    if !conn.client.context().is_authenticated() {
        anyhow::bail!("not logged in; run `proctor login <username>` first");
    }
    Ok(conn)
}

pub fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn fmt_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "—".to_string())
}

pub fn truncate(s: &str, max: usize) -> String {
    let s = s.trim().replace('\n', " ");
    if s.chars().count() <= max {
        s
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

pub fn print_page_footer(meta: &PageMeta, shown: usize) {
    if meta.total_pages > 1 {
        println!(
            "Page {}/{} ({} total). Use --page to see more.",
            meta.page.max(1),
            meta.total_pages,
            meta.total_items
        );
    } else if shown == 0 {
        println!("Nothing found.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_long_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("line one\nline two", 40), "line one line two");
    }

    #[test]
    fn missing_time_is_a_dash() {
        assert_eq!(fmt_time(None), "—");
    }
}
