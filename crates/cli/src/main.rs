#![warn(clippy::pedantic)]

use chrono::Local;
use clap::Parser;

mod cli;
mod command;
mod logger;
mod settings;

use cli::Cli;
use settings::Settings;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;

    if let Some(data) = &cli.data {
        settings.data_file.clone_from(data);
    }
    if let Some(session_file) = &cli.session_file {
        settings.session_file.clone_from(session_file);
    }

    logger::init(cli.log_level(settings.log_level))?;

    command::run(
        cli.command,
        &settings,
        Local::now().naive_local(),
        &mut std::io::stdout().lock(),
    )
}
