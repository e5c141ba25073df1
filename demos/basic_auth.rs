//! Basic authentication example.
//!
//! This example logs in to IG, lists the accounts and preferences, and
//! logs out again.
//!
//! Requires IG_IDENTIFIER, IG_PASSWORD, IG_API_KEY and IG_ACC_TYPE.
//!
//! Run with: cargo run --example basic_auth

use ig_rest::{Credentials, IgClient};

#[tokio::main]
async fn main() -> ig_rest::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let credentials = Credentials::from_env()?;
    println!("Connecting to IG ({})...", credentials.environment());

    let client = IgClient::login(credentials).await?;
    println!("Successfully authenticated!");

    if let Some(account) = client.session().current_account().await {
        println!("Current account: {account}");
    }

    let accounts = client.accounts().list().await?;
    println!("\nFound {} account(s):", accounts.len());

    for row in accounts.to_records() {
        println!(
            "  - {} balance={} available={}",
            row.get("accountId").cloned().unwrap_or_default(),
            row.get("balance").cloned().unwrap_or_default(),
            row.get("availableBalance").cloned().unwrap_or_default(),
        );
    }

    let prefs = client.accounts().preferences().await?;
    println!("\nTrailing stops enabled: {}", prefs.trailing_stops_enabled);

    client.logout().await?;
    println!("\nDone!");
    Ok(())
}
