use anyhow::{anyhow, Context, Result};
use clap::Parser;
use kiosk_fsm::config::KioskConfig;
use kiosk_fsm::engine::{EventSender, StopHandle};
use kiosk_fsm::input::SimulatedPin;
use kiosk_fsm::kiosk::{build_kiosk_engine, KioskPeripherals, FEEDBACK_BUTTONS, RESET_BUTTON};
use kiosk_fsm::time::MonotonicClock;
use std::io::BufRead;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kiosk-fsm", version, about = "Restroom feedback kiosk with simulated buttons")]
struct Cli {
    /// JSON configuration file. Defaults apply when omitted.
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Validate the configuration and exit.
    #[arg(long = "dry-run")]
    dry_run: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let config = load_config(args.config_path.as_ref())?;
    info!(
        poll_interval_ms = config.engine.poll_interval_ms,
        debounce_ms = config.engine.debounce_ms,
        alert_threshold = config.alert_threshold,
        "configuration loaded"
    );

    let mut pins = Vec::new();
    let mut engine = build_kiosk_engine(
        &config,
        KioskPeripherals::logging(&config),
        MonotonicClock::new(),
        |name, gpio| {
            let pin = SimulatedPin::new(config.pins.button_active_level);
            info!(button = name, gpio, key = pins.len() + 1, "simulated button");
            pins.push(pin.clone());
            pin
        },
    )
    .context("build kiosk engine")?;

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let stop = engine.stop_handle();
    setup_signal_handlers(stop.clone());

    let hold = config.engine.poll_interval() * 3 + config.engine.debounce();
    spawn_keyboard(pins, engine.sender(), stop, hold);
    print_help();

    engine.run().context("run kiosk")?;
    info!(state = ?engine.current_state(), "kiosk stopped");
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<KioskConfig> {
    match path {
        Some(path) => KioskConfig::from_file(path)
            .with_context(|| format!("load config from {}", path.display())),
        None => Ok(KioskConfig::default()),
    }
}

fn print_help() {
    let mut keys: Vec<String> = FEEDBACK_BUTTONS
        .iter()
        .enumerate()
        .map(|(index, button)| format!("{}={}", index + 1, button.name))
        .collect();
    keys.push(format!("{}={}", FEEDBACK_BUTTONS.len() + 1, RESET_BUTTON));
    println!("keys: {}; any other word injects that event; q quits", keys.join(" "));
}

/// Read stdin lines: a button number presses and releases that button, `q`
/// stops the kiosk, anything else is injected as an event name.
fn spawn_keyboard(pins: Vec<SimulatedPin>, sender: EventSender, stop: StopHandle, hold: Duration) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!(error = %err, "stdin closed");
                    break;
                }
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if input == "q" {
                info!("quit requested");
                stop.stop();
                break;
            }

            let pin = input
                .parse::<usize>()
                .ok()
                .and_then(|key| key.checked_sub(1))
                .and_then(|index| pins.get(index));
            match pin {
                Some(pin) => {
                    pin.press();
                    thread::sleep(hold);
                    pin.release();
                }
                None => {
                    if let Err(err) = sender.send(input) {
                        warn!(error = %err, "failed to inject event");
                    }
                }
            }
        }
    });
}

fn setup_signal_handlers(stop: StopHandle) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!(error = %err, "failed to build signal runtime");
                return;
            }
        };

        runtime.block_on(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};

                let mut terminate = match signal(SignalKind::terminate()) {
                    Ok(stream) => stream,
                    Err(err) => {
                        warn!(error = %err, "failed to install SIGTERM handler");
                        wait_for_ctrl_c().await;
                        stop.stop();
                        return;
                    }
                };
                tokio::select! {
                    _ = wait_for_ctrl_c() => {}
                    _ = terminate.recv() => info!("received SIGTERM"),
                }
            }
            #[cfg(not(unix))]
            wait_for_ctrl_c().await;

            stop.stop();
        });
    });
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received SIGINT"),
        Err(err) => {
            warn!(error = %err, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    }
}
