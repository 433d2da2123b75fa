use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationConfig {
	pub telemetry: TelemetryConfig,
	pub service: ServiceConfig,
	pub pacs: PacsConfig,
}

impl ApplicationConfig {
	pub fn new() -> Result<Self, config::ConfigError> {
		Self::builder().build()?.try_deserialize()
	}

	fn builder() -> config::ConfigBuilder<config::builder::DefaultState> {
		use config::Config;
		Config::builder()
			.add_source(config::File::from_str(
				include_str!("defaults.toml"),
				config::FileFormat::Toml,
			))
			.add_source(config::File::with_name("config.toml").required(false))
			.add_source(config::Environment::with_prefix("PACSQUERY").separator("_"))
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
	/// Default log level. `RUST_LOG` and `--verbosity` take precedence.
	pub level: String,
	/// Sentry DSN. Sentry stays disabled when absent.
	pub sentry: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
	/// The network address of the pfdcm service (host:port)
	pub address: String,
	/// Key under which the request is wrapped in the POST body
	pub wrapper: String,
}

impl ServiceConfig {
	pub fn wrapper(&self) -> Option<&str> {
		Some(self.wrapper.as_str()).filter(|key| !key.is_empty())
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct PacsConfig {
	/// Name of the PACS configuration known to pfdcm, used when --PACSservice is omitted.
	pub service: String,
}
