//! detections-sensor - module host for the detections sensor
//!
//! This binary:
//! 1. Loads the module config (file named by DETECTIONS_SENSOR_CONFIG, or env)
//! 2. Connects each configured vision service
//! 3. Builds every configured component through the model registry
//! 4. Polls readings on the configured interval and prints one JSON line per
//!    sensor per poll until Ctrl-C

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use detections_sensor::config::split_labels;
use detections_sensor::{
    connect_vision_service, register_builtin_models, Dependencies, DetectionsConfig,
    ModelRegistry, ModuleConfig, Sensor, StubProvider,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Expose per-label object detection counts as sensor readings"
)]
struct Args {
    /// Module config file (JSON, or TOML with a .toml extension).
    #[arg(long, env = "DETECTIONS_SENSOR_CONFIG")]
    config: Option<PathBuf>,

    /// Poll interval in milliseconds. Overrides the config file.
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Poll every sensor once and exit.
    #[arg(long)]
    once: bool,

    /// Comma-separated labels that stub:// vision services report for every
    /// camera (e.g. "person,person,dog").
    #[arg(long, env = "DETECTIONS_STUB_LABELS")]
    stub_labels: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = ModuleConfig::load_from(args.config.as_deref())?;
    if let Some(millis) = args.poll_interval_ms {
        if millis == 0 {
            return Err(anyhow!("--poll-interval-ms must be greater than zero"));
        }
        cfg.poll_interval = Duration::from_millis(millis);
    }

    let stub_labels = args
        .stub_labels
        .as_deref()
        .map(split_labels)
        .unwrap_or_default();
    let deps = connect_services(&cfg, &stub_labels)?;
    log::info!("vision services: {:?}", deps.names());

    let mut registry = ModelRegistry::new();
    register_builtin_models(&mut registry)?;

    let mut sensors: Vec<Arc<dyn Sensor>> = Vec::with_capacity(cfg.components.len());
    for component in &cfg.components {
        let sensor = registry
            .construct(&deps, component)
            .with_context(|| format!("failed to build {}", component.resource_name()))?;
        sensors.push(sensor);
    }

    if args.once {
        poll_all(&sensors)?;
        close_all(&sensors);
        return Ok(());
    }

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("error setting Ctrl-C handler")?;

    log::info!(
        "detections-sensor running: {} sensor(s), polling every {} ms",
        sensors.len(),
        cfg.poll_interval.as_millis()
    );
    loop {
        poll_all(&sensors)?;
        match rx.recv_timeout(cfg.poll_interval) {
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    log::info!("shutdown signal received, closing sensors...");
    close_all(&sensors);
    Ok(())
}

fn connect_services(cfg: &ModuleConfig, stub_labels: &[String]) -> Result<Dependencies> {
    let mut deps = Dependencies::new();
    for service in &cfg.services {
        if service.address.starts_with("stub://") && !stub_labels.is_empty() {
            let stub = StubProvider::new(service.name.as_str());
            for camera in cameras_using(cfg, &service.name) {
                stub.set_labels(&camera, stub_labels.iter().cloned());
            }
            deps.insert(stub);
            continue;
        }
        let provider = connect_vision_service(&service.name, &service.address)
            .with_context(|| format!("failed to connect vision service {}", service.name))?;
        log::debug!("connected vision service {} at {}", service.name, service.address);
        deps.insert_shared(provider);
    }
    Ok(deps)
}

/// Cameras of components whose detector is `service`. Components with
/// undecodable attributes are skipped here and reported at construction.
fn cameras_using(cfg: &ModuleConfig, service: &str) -> Vec<String> {
    cfg.components
        .iter()
        .filter_map(|component| component.native_config::<DetectionsConfig>().ok())
        .filter(|attrs| attrs.detector == service)
        .map(|attrs| attrs.camera)
        .collect()
}

fn poll_all(sensors: &[Arc<dyn Sensor>]) -> Result<()> {
    for sensor in sensors {
        let line = match sensor.readings() {
            Ok(readings) => json!({
                "name": sensor.name().to_string(),
                "readings": readings,
            }),
            Err(err) => {
                log::warn!("{}: {}: {:#}", sensor.name(), err, err.cause());
                json!({
                    "name": sensor.name().to_string(),
                    "readings": err.readings(),
                    "error": format!("{:#}", err.cause()),
                })
            }
        };
        println!("{}", serde_json::to_string(&line)?);
    }
    Ok(())
}

fn close_all(sensors: &[Arc<dyn Sensor>]) {
    for sensor in sensors {
        sensor.close();
    }
}
