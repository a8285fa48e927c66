use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Error, Result};
use draw_logo::config::DrawLogoConfig;
use draw_logo::logo::LogoComposer;
use draw_logo::ros::{RosMarkerDisplay, RosMotionBackend};
use draw_logo::DrawingSession;
use log::{error, info};
use rclrs::{Context, CreateBasicExecutor, RclrsErrorFilter, SpinOptions};

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DrawLogoConfig::load_default()?;
    match DrawLogoConfig::default_path() {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("Using built-in configuration"),
    }
    info!(
        "Drawing {} shapes every {:.0}s with {} samples per shape",
        config.logo.shape_count(),
        config.redraw.interval,
        config.trajectory.samples
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, finishing the current drawing");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut executor = Context::default_from_env()?.create_basic_executor();
    let node = executor.create_node(config.ros.node_name.as_str())?;

    // Both collaborators must be reachable before anything is drawn
    let backend = RosMotionBackend::connect(&node, &config.ros)?;
    let display = RosMarkerDisplay::connect(&node, &config.ros)?;

    let mut session = DrawingSession::from_config(backend, display, &config);
    let composer = LogoComposer::new(config.logo.clone());
    let interval = config.redraw.interval();

    let running_worker = Arc::clone(&running);
    let worker = thread::spawn(move || composer.run(&mut session, interval, &running_worker));

    info!("Draw logo node initialized. Spinning...");
    while !worker.is_finished() {
        executor
            .spin(SpinOptions::spin_once().timeout(Duration::from_millis(100)))
            .first_error()?;
    }

    match worker.join() {
        Ok(Ok(redraws)) => {
            info!("Draw logo node stopped after {} redraws", redraws);
            Ok(())
        }
        Ok(Err(e)) => {
            error!("Drawing failed: {}", e);
            Err(e.into())
        }
        Err(_) => Err(anyhow!("drawing thread panicked")),
    }
}
