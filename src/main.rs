use std::time::Duration;

use crate::{
    configuration::Configuration, configuration_handler::ConfigurationHandler,
    database_interface::DatabaseInterface, http::create_app,
    local_reservations::LocalReservations,
};
use tokio::time::sleep;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod backend;
mod booking;
mod configuration;
mod configuration_handler;
mod database_interface;
mod error;
mod http;
mod local_reservations;
mod room_filter;
mod schema;
mod selection;
mod slot_grid;
#[cfg(test)]
mod testutils;
mod types;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let configuration = ConfigurationHandler::parse_arguments();
    info!(title = %configuration.website_title(), "Starting room booking service");

    let address = format!("0.0.0.0:{}", configuration.port());
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, "Failed to bind {address}");
            std::process::exit(1);
        }
    };
    info!("Accessible at {address}");

    let app = if let Some(database_url) = configuration.database_url() {
        let backend = loop {
            match DatabaseInterface::new(&database_url) {
                Ok(backend) => {
                    info!("Successfully connected to database");
                    break backend;
                }
                Err(err) => {
                    error!(?err, "Failed to establish database connection. Retry in 1 sec. You may want to restart without a database URL (non-persistent reservations).");
                    sleep(Duration::from_secs(1)).await;
                }
            }
        };
        create_app(backend, configuration)
    } else {
        warn!("No database configured. Reservations are kept in memory only");
        let backend = LocalReservations::with_example_rooms();
        create_app(backend, configuration)
    };

    if let Err(err) = axum::serve(listener, app).await {
        error!(%err, "Server stopped");
        std::process::exit(1);
    }
}
