use tracing::debug;

use mowerlink_config::{Profile, load_config_or_default, save_config, upsert_profile};
use mowerlink_core::pairing::{PairingInput, generate_channel_id, validate_input};
use mowerlink_link::{BleDiscovery, Discovery as _};

use crate::cli::PairArgs;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: PairArgs) -> Result<(), CliError> {
    let input = PairingInput {
        address: args.address.clone(),
        pin: args.pin.clone(),
    };
    let (address, pin) = validate_input(&input)?;

    let discovery = BleDiscovery::new().await?;

    output::note(&format!("resolving {address}..."));
    let Some(device) = discovery.resolve_connectable_device(&address).await? else {
        return Err(CliError::DeviceNotFound {
            address: address.to_string(),
        });
    };

    output::note("probing device information...");
    let identity = discovery.probe_device_info(&device).await?;
    let title = identity.title();

    let channel_id = generate_channel_id(&mut rand::thread_rng());
    debug!(channel_id, "generated pairing channel id");

    let mut config = load_config_or_default();
    upsert_profile(
        &mut config,
        &args.name,
        Profile {
            address: address.to_string(),
            channel_id,
            pin,
            name: Some(title.clone()),
            poll_interval_secs: None,
            settle_delay_secs: None,
            staleness_window_secs: None,
            link_timeout_secs: None,
        },
    );
    save_config(&config)?;

    output::success(&format!(
        "paired {title} at {address} as profile '{}'",
        args.name
    ));
    output::note(&format!("channel id: {channel_id:#010x}"));
    if pin.is_some() {
        output::warn_line(
            "the PIN is verified by the protocol backend on first connect, not during pairing",
        );
    }
    Ok(())
}
