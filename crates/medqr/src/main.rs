//! `medqr` - CLI for the medical QR profile server
//!
//! This binary runs the web server and offers a few offline operator tools.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;

use medqr::cli::{Cli, Command, ConfigCommand, ProfileCommand, QrCommand};
use medqr::storage::open_store;
use medqr::{init_logging, Config, ProfileFields, ProfileId, QrRenderer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration; serve flags may still replace invalid values
    let mut config =
        Config::extract_from(cli.config.clone()).context("failed to load configuration")?;
    if let Command::Serve(serve_cmd) = &cli.command {
        serve_cmd.apply(&mut config);
    }
    config.validate().context("invalid configuration")?;

    match cli.command {
        Command::Serve(_) => medqr::server::serve(config).await.context("server failed"),
        Command::Profile(ProfileCommand::Show { id, json }) => {
            handle_profile_show(&config, &id, json)
        }
        Command::Qr(qr_cmd) => handle_qr(&config, &qr_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn handle_profile_show(config: &Config, raw_id: &str, json: bool) -> anyhow::Result<()> {
    let Some(id) = ProfileId::parse(raw_id) else {
        bail!("invalid profile id: {raw_id}");
    };
    let store = open_store(config).context("failed to open profile storage")?;
    let profile = store
        .read(&id, &ProfileFields::default())
        .with_context(|| {
            format!(
                "profile {id} not available on {} backend",
                config.storage.backend
            )
        })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("Profile {id}");
        println!("---------------");
        println!("Name:          {}", profile.name);
        println!("Phone:         {}", profile.phone);
        println!("Blood group:   {}", profile.blood_group);
        println!("Template:      {}", profile.template);
        for (label, value) in profile.medical.entries() {
            println!("{:<15}{value}", format!("{label}:"));
        }
    }
    Ok(())
}

fn handle_qr(config: &Config, cmd: &QrCommand) -> anyhow::Result<()> {
    let png = QrRenderer::from(&config.qr)
        .render_png(&cmd.payload)
        .context("failed to render QR code")?;
    std::fs::write(&cmd.output, png)
        .with_context(|| format!("failed to write {}", cmd.output.display()))?;
    println!("Wrote {}", cmd.output.display());
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind:               {}", config.server.bind);
                println!(
                    "  Public URL:         {}",
                    config.public_url().unwrap_or("(from Host header)")
                );
                println!();
                println!("[Storage]");
                println!("  Backend:            {}", config.storage.backend);
                println!("  Profile dir:        {}", config.profile_dir().display());
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[QR]");
                println!("  Module size (px):   {}", config.qr.module_size);
                println!("  Border (modules):   {}", config.qr.border);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
