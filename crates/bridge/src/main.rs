mod bridge;
mod config;
mod events;
mod rpr;
mod simulation;

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use bridge::Bridge;
use config::BridgeConfig;
use events::BridgeEvent;
use fedgate::{DeadReckoningConfig, GatewayConfig};

#[derive(Parser)]
#[command(name = "fedgate-bridge")]
#[command(about = "Loopback HLA federation with a dead reckoned vehicle")]
struct Args {
    #[arg(short, long, help = "JSON mapping file (defaults to the built-in RPR mappings)")]
    mappings: Option<PathBuf>,

    #[arg(short, long, default_value = fedgate::config::DEFAULT_FEDERATION_NAME)]
    federation: String,

    #[arg(short, long, default_value_t = 30)]
    tick_rate: u32,

    #[arg(long, default_value_t = 5, help = "Ticks between vehicle updates")]
    publish_interval: u32,

    #[arg(long, default_value_t = 10.0)]
    speed: f32,

    #[arg(long, default_value_t = 0.0)]
    ground_height: f32,

    #[arg(long, default_value_t = 3.0, help = "Seconds between forced ground clamps")]
    force_clamp_interval: f32,

    #[arg(long, default_value_t = 0.0, help = "Seconds to run, 0 runs until Ctrl-C")]
    duration: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mappings = rpr::load_mappings(args.mappings.as_deref())?;
    let config = BridgeConfig {
        tick_rate: args.tick_rate,
        publish_interval: args.publish_interval,
        vehicle_speed: args.speed,
        ground_height: args.ground_height,
        gateway: GatewayConfig {
            federation_name: args.federation,
            ..Default::default()
        },
        dead_reckoning: DeadReckoningConfig {
            force_clamp_interval: args.force_clamp_interval,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut bridge = Bridge::new(config, mappings).context("failed to start the bridge")?;
    log::info!(
        "Bridge running at {} Hz on federation \"{}\"",
        args.tick_rate,
        bridge.observer().config().federation_name
    );

    let running = bridge.running();
    let deadline = (args.duration > 0.0).then(|| Instant::now() + Duration::from_secs_f64(args.duration));
    let mut interval = tokio::time::interval(bridge.tick_duration());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while running.load(Ordering::SeqCst) {
        tokio::select! {
            _ = interval.tick() => {
                bridge.tick_once();
                bridge.drain_events().for_each(log_event);
                if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                    running.store(false, Ordering::SeqCst);
                }
            }
            result = &mut ctrl_c => {
                result.context("failed to listen for Ctrl-C")?;
                log::info!("Interrupted");
                running.store(false, Ordering::SeqCst);
            }
        }
    }

    log::info!(
        "Shutting down after {:.1}s of simulation, vehicle at {}",
        bridge.sim_time(),
        bridge.vehicle().position
    );
    if let Some(remote) = bridge.remote_vehicle() {
        log::debug!("Withdrawing remote copy {}", remote);
    }
    bridge.shutdown().context("failed to leave the federation")?;
    bridge.drain_events().for_each(log_event);
    Ok(())
}

fn log_event(event: BridgeEvent) {
    match event {
        BridgeEvent::VehiclePublished { actor, entity_id } => match entity_id {
            Some(entity_id) => log::info!("Published vehicle {} as entity {}", actor, entity_id),
            None => log::info!("Published vehicle {}", actor),
        },
        BridgeEvent::RemoteDiscovered { actor } => {
            log::info!("Observer discovered remote vehicle {}", actor);
        }
        BridgeEvent::RemoteRemoved { actor } => {
            log::info!("Remote vehicle {} removed", actor);
        }
        BridgeEvent::Drift { actor, distance } => {
            log::info!("Remote vehicle {} is {:.2}m from the published state", actor, distance);
        }
        BridgeEvent::Error { message } => log::error!("{}", message),
    }
}
