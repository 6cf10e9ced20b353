use log::{error, info};
use sessionshelf::configuration::config::Config;
use sessionshelf::controller::controller_handler::Controller;

#[tokio::main]
async fn main() {
    // https://docs.rs/env_logger/latest/env_logger/
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_target(false)
        .init();

    info!("Importing configuration");

    let config = Config::load().unwrap_or_else(|e| {
        error!("Unable to import configuration: {}", e);
        std::process::exit(1);
    });

    info!("Configuration imported successfully");

    let controller = Controller::new(config).await.unwrap_or_else(|e| {
        error!("Unable to create a controller instance: {}, exiting...", e);
        std::process::exit(1);
    });

    if let Err(e) = controller.run().await {
        error!("Error occured in the controller process: {}, exiting...", e);
        std::process::exit(1);
    }
}
