//! Dealing example.
//!
//! Opens a small market position on the demo gateway, prints the
//! confirmation, then closes it again.
//!
//! Run with: cargo run --example place_order

use ig_rest::models::{ClosePositionRequest, DealOutcome, Direction, OpenPositionRequest, OrderType};
use ig_rest::{Credentials, IgClient};
use rust_decimal_macros::dec;

#[tokio::main]
async fn main() -> ig_rest::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let credentials = Credentials::from_env()?;
    if credentials.environment().is_live() {
        eprintln!("Refusing to place orders on a live account");
        return Ok(());
    }

    let client = IgClient::login(credentials).await?;

    let open = OpenPositionRequest::builder()
        .epic("CS.D.GBPUSD.TODAY.IP")
        .expiry("DFB")
        .direction(Direction::Buy)
        .size(dec!(1))
        .order_type(OrderType::Market)
        .currency_code("GBP")
        .force_open(true)
        .build()?;

    println!("Opening position...");
    let confirmation = match client.dealing().open_position(&open).await? {
        DealOutcome::Accepted(c) => c,
        DealOutcome::Rejected(c) => {
            println!("Rejected: {:?}", c.reason);
            return Ok(());
        }
    };
    println!(
        "Opened {:?} at {:?}",
        confirmation.deal_id, confirmation.level
    );

    let positions = client.dealing().positions().await?;
    println!("{} open position(s)", positions.positions.len());

    if let Some(deal_id) = confirmation.deal_id {
        let close =
            ClosePositionRequest::by_deal_id(deal_id, Direction::Sell, dec!(1), OrderType::Market);
        let outcome = client.dealing().close_position(&close).await?;
        println!("Close accepted: {}", outcome.is_accepted());
    }

    Ok(())
}
