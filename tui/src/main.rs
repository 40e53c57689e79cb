use std::{env, fs::File};

use anyhow::Result;
use env_logger::Target;

use nn_dashboard::DashboardConfig;

mod app;
mod state;
mod ui;

/// The terminal is taken over by the UI, so logs go to this file.
const LOG_FILE: &str = "nn-dashboard.log";

fn main() -> Result<()> {
    let log_file = File::create(LOG_FILE)?;
    env_logger::Builder::from_default_env()
        .target(Target::Pipe(Box::new(log_file)))
        .init();

    let config = DashboardConfig::resolve(env::args().nth(1))?;
    app::run::run(config)
}
