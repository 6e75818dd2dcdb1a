//! Manual smoke check against the live MyWater Toronto API.
//!
//! Reads `MYWATER_*` variables (or `.env`), connects, and prints the premises
//! and meters on the account. Pass `--json` to dump the premises as JSON and
//! `--consumption` to also issue the consumption call.

use anyhow::Result;
use my_water_toronto::{ClientConfig, Credentials, WaterAccount, WaterApiClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "my_water_toronto=debug,smoke_check=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let with_consumption = std::env::args().any(|arg| arg == "--consumption");
    let as_json = std::env::args().any(|arg| arg == "--json");

    let config = ClientConfig::from_env()?;
    let credentials = Credentials::from_env()?;
    let client = WaterApiClient::new(config)?;

    let account = WaterAccount::connect(client, credentials).await?;

    println!("=== Account {} ===", account.account_number_full());
    if as_json {
        println!("{}", serde_json::to_string_pretty(account.premises())?);
    } else {
        print_premises(&account);
    }

    if with_consumption {
        let consumption = account.fetch_consumption().await?;
        println!("\nConsumption:\n{}", serde_json::to_string_pretty(&consumption)?);
    }

    Ok(())
}

fn print_premises(account: &WaterAccount) {
    println!("Account type: {}", account.account_type());
    for premise in account.premises() {
        println!(
            "\nPremise {}: {}",
            premise.premise_id(),
            premise.address().unwrap_or("(no address)")
        );
        for meter in premise.meters() {
            println!(
                "  Meter {} (MIU {}): last reading {} {} on {}, every {} min",
                meter.meter_number(),
                meter.miu(),
                meter.last_reading(),
                meter.unit_of_measure().unwrap_or(""),
                meter.last_read_date(),
                meter.interval_mins()
            );
        }
    }
}
