//! Market data example.
//!
//! Walks the top of the market navigation tree, searches for a market
//! and prints its recent daily prices.
//!
//! Run with: cargo run --example fetch_market_data

use ig_rest::models::{MarketDetailsFilter, Resolution};
use ig_rest::{Credentials, Epic, IgClient};

#[tokio::main]
async fn main() -> ig_rest::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let client = IgClient::login(Credentials::from_env()?).await?;

    let navigation = client.market_data().navigation().await?;
    println!("Top-level nodes:");
    for row in navigation.nodes.to_records() {
        println!(
            "  {} {}",
            row.get("id").cloned().unwrap_or_default(),
            row.get("name").cloned().unwrap_or_default()
        );
    }

    let found = client.market_data().search("GBP/USD").await?;
    println!("\nSearch found {} market(s)", found.len());

    let epic = match found.get(0, "epic").and_then(|v| v.as_str()) {
        Some(epic) => Epic::new(epic),
        None => {
            println!("No market to price");
            return Ok(());
        }
    };

    let details = client
        .market_data()
        .details(&[epic.clone()], MarketDetailsFilter::SnapshotOnly)
        .await?;
    println!("\nSnapshot: {}", details);

    let prices = client
        .market_data()
        .prices_by_points(&epic, Resolution::Day, 10)
        .await?;

    println!("\nLast {} daily closes for {}:", prices.len(), epic);
    let close_bid = prices.table().column_index("close_bid");
    for (time, row) in prices.iter() {
        let close = close_bid.and_then(|i| row.get(i)).cloned().unwrap_or_default();
        println!("  {}  {}", time, close);
    }

    Ok(())
}
