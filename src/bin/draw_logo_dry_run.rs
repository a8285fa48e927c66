use anyhow::Result;
use draw_logo::config::DrawLogoConfig;
use draw_logo::logo::LogoComposer;
use draw_logo::trajectory::sim::SimulatedBackend;
use draw_logo::visualization::LogDisplay;
use draw_logo::DrawingSession;
use log::info;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Running logo drawing against the simulated arm...");
    let config = DrawLogoConfig::load_default()?;

    let mut session =
        DrawingSession::from_config(SimulatedBackend::default(), LogDisplay::new(), &config);
    let composer = LogoComposer::new(config.logo.clone());

    let report = composer.draw_logo(&mut session)?;
    for shape in &report.shapes {
        info!(
            "{}[{}] {:<10} {:>4} waypoints -> {:?}",
            shape.group, shape.index, shape.kind, shape.waypoints, shape.outcome
        );
    }

    info!(
        "Done: {} of {} shapes executed, {} markers published, arm at {:?}",
        report.completed(),
        report.shapes.len(),
        session.markers().channel().published(),
        session.backend().pose().position
    );
    Ok(())
}
