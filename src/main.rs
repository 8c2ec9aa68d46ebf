//! pedalflip - turn sheet-music pages from a MIDI pedal.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pedalflip::cli::{self, Command};
use pedalflip::config::AppConfig;
use pedalflip::devices::{DeviceList, DeviceRegistry};
use pedalflip::keys::EnigoInjector;
use pedalflip::ports::{self, MidirEnumerator, MidirPortOpener, WATCH_INTERVAL};
use pedalflip::session::SessionController;

/// Pedalflip - turn sheet-music pages from a MIDI pedal or foot switch
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// List available MIDI input ports
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level)?;

    if args.list_ports {
        ports::list_ports_formatted();
        return Ok(());
    }

    let config = if Path::new(&args.config).exists() {
        let config = AppConfig::load(&args.config).await?;
        info!("Configuration loaded from {}", args.config);
        config
    } else {
        info!(
            "No config file at {}, using built-in pedal bindings",
            args.config
        );
        AppConfig::default()
    };

    run_app(config).await?;

    info!("pedalflip shutdown complete");
    Ok(())
}

async fn run_app(config: AppConfig) -> Result<()> {
    let (midi_tx, mut midi_rx) = mpsc::channel(256);

    let mut registry = DeviceRegistry::new(Arc::new(MidirEnumerator));
    let devices = registry.refresh().await;
    info!("Found {} MIDI input device(s)", devices.len());

    let injector = EnigoInjector::new().context("key injection unavailable")?;
    let mut controller =
        SessionController::new(Arc::new(MidirPortOpener), injector, midi_tx.clone());
    let mut status_rx = controller.subscribe();

    try_autostart(&mut controller, &devices, &config).await;

    let mut watcher_rx = ports::spawn_port_watcher(WATCH_INTERVAL);

    let (cmd_tx, mut cmd_rx) = mpsc::channel(16);
    std::thread::spawn(move || cli::run_repl(cmd_tx));

    info!("Ready - waiting for pedal input");

    loop {
        tokio::select! {
            Some(event) = watcher_rx.recv() => {
                let devices = registry.on_device_event(event).await;
                controller.on_devices_changed(&devices);
                try_autostart(&mut controller, &devices, &config).await;
            }

            Some(event) = midi_rx.recv() => {
                controller.on_midi(&event);
            }

            Some(command) = cmd_rx.recv() => {
                match command {
                    Command::ListDevices => {
                        print_devices(&registry.devices(), controller.active_device_id());
                    }
                    Command::Start(index) => {
                        let devices = registry.devices();
                        match devices.get(index) {
                            Some(device) => {
                                let id = device.id.clone();
                                if let Err(e) = controller.start(&id, &devices, &config).await {
                                    println!("start failed: {}", e);
                                }
                            }
                            None => println!("no device with index {}", index),
                        }
                    }
                    Command::Stop => controller.stop(),
                    Command::Status => println!("{}", *status_rx.borrow()),
                    Command::Quit => break,
                }
            }

            // Observer path for badge-style side effects.
            Ok(()) = status_rx.changed() => {
                let status = status_rx.borrow_and_update().clone();
                info!(%status, "session status");
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    controller.stop();
    Ok(())
}

/// Start on the first device matching the configured port pattern, if idle.
async fn try_autostart(
    controller: &mut SessionController<EnigoInjector>,
    devices: &DeviceList,
    config: &AppConfig,
) {
    if controller.is_active() {
        return;
    }
    let Some(pattern) = config.midi.input_port.as_deref().filter(|p| !p.is_empty()) else {
        return;
    };

    // Case-insensitive substring match, same as picking a port by hand.
    let matched = devices
        .iter()
        .find(|d| d.name.to_lowercase().contains(&pattern.to_lowercase()));

    if let Some(device) = matched {
        let id = device.id.clone();
        info!(device = %device.name, "auto-connecting configured input port");
        if let Err(e) = controller.start(&id, devices, config).await {
            warn!("auto-connect failed: {}", e);
        }
    }
}

fn print_devices(devices: &DeviceList, active_id: Option<&str>) {
    if devices.is_empty() {
        println!("No MIDI input devices found");
        return;
    }
    for (index, device) in devices.iter().enumerate() {
        let marker = if Some(device.id.as_str()) == active_id { " *" } else { "" };
        println!("  {}: {}{}", index, device.name, marker);
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}
