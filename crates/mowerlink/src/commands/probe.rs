use mowerlink_link::{BleAddress, BleDiscovery, Discovery as _};

use crate::cli::ProbeArgs;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: ProbeArgs) -> Result<(), CliError> {
    let address = BleAddress::parse(&args.address).map_err(|e| CliError::Validation {
        field: "address".into(),
        reason: e.to_string(),
    })?;

    let discovery = BleDiscovery::new().await?;

    output::note(&format!("resolving {address}..."));
    let Some(device) = discovery.resolve_connectable_device(&address).await? else {
        return Err(CliError::DeviceNotFound {
            address: address.to_string(),
        });
    };

    output::note("reading device information...");
    let identity = discovery.probe_device_info(&device).await?;

    println!("Manufacturer : {}", identity.manufacturer);
    println!("Model        : {}", identity.model);
    println!(
        "Serial       : {}",
        identity.serial.as_deref().unwrap_or("-")
    );
    Ok(())
}
