use clap::Parser;

/// Recipe API server
#[derive(Debug, Clone, Parser)]
#[command(name = "recipe-server", version, about)]
pub struct Config {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind_addr: String,

    /// How long a bearer token stays valid
    #[arg(long, env = "SESSION_TTL_DAYS", default_value_t = 30)]
    pub session_ttl_days: i64,

    /// OTLP collector; console logging only when unset or unreachable
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otel_endpoint: Option<String>,

    #[arg(long, env = "OTEL_SERVICE_NAME", default_value = "recipe-server")]
    pub otel_service_name: String,

    /// Print the OpenAPI document and exit
    #[arg(long)]
    pub openapi: bool,
}

impl Config {
    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))
    }
}
