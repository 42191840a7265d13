//! Login, logout, registration and profile commands.

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use proctor_client::account::{check_new_password, ProfileUpdate};
use proctor_client::StoredCredential;

use super::{connect, connect_authenticated};

/// Read one line from stdin, for secrets not given on the command line.
fn prompt_line(label: &str) -> Result<String> {
    eprint!("{label}: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn password_or_prompt(password: Option<String>, label: &str) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => prompt_line(label),
    }
}

pub async fn login(config: Option<&Path>, username: String, password: Option<String>) -> Result<()> {
    let mut conn = connect(config)?;
    let password = password_or_prompt(password, "Password")?;

    let token = conn
        .client
        .login(&username, &password)
        .await
        .context("login failed")?;

    let store = conn.credentials();
    store.save(&StoredCredential::issued_at(
        &conn.config.base_url,
        &token,
        Utc::now(),
    ))?;

    let me = conn.client.me().await?;
    println!("Logged in as {} (id {}).", me.username, me.id);
    println!("Token stored in {} for 24 hours.", store.path().display());
    Ok(())
}

pub fn logout(config: Option<&Path>) -> Result<()> {
    let config = proctor_client::load_config_from(config)?;
    let store = proctor_client::CredentialStore::new(config.credentials_file());
    if store.clear()? {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

pub async fn register(
    config: Option<&Path>,
    username: String,
    email: String,
    password: Option<String>,
) -> Result<()> {
    let conn = connect(config)?;
    let password = password_or_prompt(password, "Password")?;
    conn.client
        .register(&username, &password, &email)
        .await
        .context("registration failed")?;
    println!("Account {username} created. Run `proctor login {username}` to sign in.");
    Ok(())
}

pub async fn whoami(config: Option<&Path>) -> Result<()> {
    let mut conn = connect_authenticated(config)?;
    let me = conn.client.me().await?;
    println!("{} (id {})", me.username, me.id);
    if let Some(email) = me.email.filter(|e| !e.is_empty()) {
        println!("Email: {email}");
    }
    Ok(())
}

pub async fn update_profile(config: Option<&Path>, username: String, email: String) -> Result<()> {
    if username.trim().is_empty() || email.trim().is_empty() {
        anyhow::bail!("username and email are both required");
    }
    let conn = connect_authenticated(config)?;
    let profile = conn
        .client
        .update_profile(&ProfileUpdate {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
        })
        .await?;
    println!("Profile updated: {} <{}>", profile.username, profile.email.unwrap_or_default());
    Ok(())
}

pub async fn change_password(config: Option<&Path>) -> Result<()> {
    let conn = connect_authenticated(config)?;
    let old = prompt_line("Current password")?;
    let new = prompt_line("New password")?;
    let confirm = prompt_line("Confirm new password")?;
    if old.is_empty() {
        anyhow::bail!("current password is empty");
    }
    check_new_password(&new, &confirm).map_err(anyhow::Error::msg)?;

    conn.client.change_password(&old, &new).await?;
    println!("Password changed.");
    Ok(())
}

pub async fn delete_account(config: Option<&Path>, yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("this permanently deletes your account; pass --yes to confirm");
    }
    let conn = connect_authenticated(config)?;
    conn.client.delete_account().await?;
    conn.credentials().clear()?;
    println!("Account deleted.");
    Ok(())
}
