use std::{env, time::Duration};

use log::{info, warn};
use tokio::{signal, time};

use nn_dashboard::{
    DashboardConfig, IntervalScheduler, MetricsGenerator, RunState, TrainingDriver, Visuals,
};

/// How often the runner checks the driver's timer.
const POLL_PERIOD: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::resolve(env::args().nth(1))?;
    let seed = config.noise_seed();
    info!(
        variant = config.variant.label(),
        max_epochs = config.max_epochs,
        seed;
        "starting headless run"
    );

    let mut driver = TrainingDriver::new(
        config.driver_config()?,
        config.variant,
        MetricsGenerator::new(Some(seed)),
        IntervalScheduler::new(),
    );
    let mut visuals = Visuals::new(*driver.topology(), config.cadence, seed);

    driver.start(&mut visuals);
    info!("{}", visuals.status().message);

    let run = async {
        let mut ticker = time::interval(POLL_PERIOD);
        while driver.state() != RunState::Finished {
            ticker.tick().await;
            if driver.poll(&mut visuals) > 0 {
                let status = visuals.status();
                info!(
                    "{} | val_loss={} acc={} progress={:.0}%",
                    status.message, status.val_loss, status.accuracy, status.progress_percent
                );
            }
        }
    };

    let completed = tokio::select! {
        _ = run => true,
        _ = signal::ctrl_c() => false,
    };

    if completed {
        println!("{}", serde_json::to_string_pretty(driver.history())?);
    } else {
        warn!("interrupted at epoch {}", driver.epoch());
    }

    Ok(())
}
