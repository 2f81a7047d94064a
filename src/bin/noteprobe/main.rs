use std::process::ExitCode;

use clap::Parser;
use figment::Figment;
use log::error;

use noteprobe::config::app_config::AppConfig;
use noteprobe::config::figment::FigmentExt;
use noteprobe::error_exit;
use noteprobe::logging::init_logging;

mod cli;
mod execute;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = cli::CliConfig::parse();
    let config: AppConfig = match Figment::new()
        .setup_app_config(&cli.config_file)
        .extract()
    {
        Ok(config) => config,
        Err(e) => {
            for e in e {
                error!("{e}");
            }
            error_exit!("finishing due to a config parse error");
        },
    };
    execute::execute(&config, cli.command).await
}
