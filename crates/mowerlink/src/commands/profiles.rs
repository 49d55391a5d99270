use tabled::{Table, Tabled, settings::Style};

use mowerlink_config::{active_profile, load_config_or_default, profile_to_mower_config, save_config};

use crate::cli::{GlobalOpts, ProfilesArgs, ProfilesCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ADDRESS")]
    address: String,
    #[tabled(rename = "DEVICE")]
    device: String,
    #[tabled(rename = "PIN")]
    pin: String,
    #[tabled(rename = "DEFAULT")]
    default: String,
}

pub fn handle(args: ProfilesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ProfilesCommand::List => list(),
        ProfilesCommand::Show { name } => show(name.as_deref().or(global.profile.as_deref())),
        ProfilesCommand::Remove { name } => remove(&name),
    }
}

fn list() -> Result<(), CliError> {
    let config = load_config_or_default();
    if config.profiles.is_empty() {
        output::note("no profiles stored; run `mowerlink pair` first");
        return Ok(());
    }

    let mut names: Vec<&String> = config.profiles.keys().collect();
    names.sort();

    let rows: Vec<ProfileRow> = names
        .into_iter()
        .map(|name| {
            let profile = &config.profiles[name];
            ProfileRow {
                name: name.clone(),
                address: profile.address.clone(),
                device: profile.name.clone().unwrap_or_else(|| "-".into()),
                pin: if profile.pin.is_some() { "set" } else { "-" }.into(),
                default: if config.default_profile.as_deref() == Some(name) {
                    "*"
                } else {
                    ""
                }
                .into(),
            }
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::sharp()));
    Ok(())
}

fn show(requested: Option<&str>) -> Result<(), CliError> {
    let config = load_config_or_default();
    let (name, profile) = active_profile(&config, requested)?;
    let runtime = profile_to_mower_config(profile, &config.defaults)?;

    println!("Profile          : {name}");
    println!("Device           : {}", profile.name.as_deref().unwrap_or("-"));
    println!("Address          : {}", profile.address);
    println!("Channel id       : {:#010x}", profile.channel_id);
    println!(
        "PIN              : {}",
        if profile.pin.is_some() { "set" } else { "-" }
    );
    println!("Poll interval    : {:?}", runtime.poll_interval);
    println!("Settle delay     : {:?}", runtime.settle_delay);
    println!("Staleness window : {:?}", runtime.staleness_window);
    println!("Link timeout     : {:?}", runtime.link_timeout);
    Ok(())
}

fn remove(name: &str) -> Result<(), CliError> {
    let mut config = load_config_or_default();
    if config.profiles.remove(name).is_none() {
        return Err(CliError::Validation {
            field: "profile".into(),
            reason: format!("no profile named '{name}'"),
        });
    }

    if config.default_profile.as_deref() == Some(name) {
        config.default_profile = config.profiles.keys().next().cloned();
    }

    save_config(&config)?;
    output::success(&format!("removed profile '{name}'"));
    Ok(())
}
