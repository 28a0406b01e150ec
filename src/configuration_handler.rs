use crate::configuration::Configuration;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(version, about = "Study room booking service")]
pub struct ConfigurationHandler {
    /// Title reported by the service
    #[arg(long, env = "WEBSITE_TITLE", default_value = "Biblioteca - Reserva de Salas")]
    website_title: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// PostgreSQL connection URL. Reservations are kept in memory when omitted.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(%err, "No .env file loaded");
        }
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn website_title(&self) -> String {
        self.website_title.clone()
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn database_url(&self) -> Option<String> {
        self.database_url.clone()
    }
}
