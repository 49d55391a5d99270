use std::time::Duration;

use tabled::{Table, Tabled, settings::Style};

use mowerlink_link::{BleDiscovery, is_supported_mower};

use crate::cli::ScanArgs;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ScanRow {
    #[tabled(rename = "ADDRESS")]
    address: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "RSSI")]
    rssi: String,
    #[tabled(rename = "SUPPORTED")]
    supported: String,
}

pub async fn handle(args: ScanArgs) -> Result<(), CliError> {
    let discovery = BleDiscovery::new().await?;

    output::note(&format!("scanning for {} seconds...", args.window));
    let advertisements = discovery
        .scan_for_mowers(Duration::from_secs(args.window))
        .await?;

    let rows: Vec<ScanRow> = advertisements
        .iter()
        .filter(|adv| args.all || is_supported_mower(adv))
        .map(|adv| ScanRow {
            address: adv.address.to_string(),
            name: adv.local_name.clone().unwrap_or_else(|| "-".into()),
            rssi: adv
                .rssi
                .map_or_else(|| "-".into(), |rssi| format!("{rssi} dBm")),
            supported: if is_supported_mower(adv) { "yes" } else { "no" }.into(),
        })
        .collect();

    if rows.is_empty() {
        output::note(if args.all {
            "no advertising devices found"
        } else {
            "no supported mowers found (try --all to list everything)"
        });
        return Ok(());
    }

    println!("{}", Table::new(rows).with(Style::sharp()));
    Ok(())
}
