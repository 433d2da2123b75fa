pub(crate) mod app;
pub(crate) mod cli;
pub(crate) mod config;
pub(crate) mod man;
pub(crate) mod report;
pub(crate) mod request;
pub(crate) mod service;

use crate::cli::Args;
use crate::config::ApplicationConfig;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_logger(level: LevelFilter) {
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::fmt::layer()
				.compact()
				.with_writer(std::io::stderr)
				.with_ansi(true)
				.with_file(false)
				.with_line_number(false)
				.with_target(false),
		)
		.with(
			EnvFilter::builder()
				.with_default_directive(level.into())
				.from_env_lossy(),
		)
		.with(sentry::integrations::tracing::layer())
		.init();
}

fn init_sentry(config: &ApplicationConfig) -> sentry::ClientInitGuard {
	let guard = sentry::init((
		// An empty string will disable Sentry
		config.telemetry.sentry.as_deref().unwrap_or_default(),
		sentry::ClientOptions {
			release: sentry::release_name!(),
			traces_sample_rate: 1.0,
			..Default::default()
		},
	));

	if let Some(dsn) = &config.telemetry.sentry {
		info!(dsn, "Enabled Sentry for tracing and error tracking");
	};

	guard
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
	let args = Args::parse();
	if let Some(topic) = args.man {
		print!("{}", man::page(topic));
		return Ok(ExitCode::SUCCESS);
	}

	let config = ApplicationConfig::new()?;
	let level = match args.log_level() {
		Some(level) => LevelFilter::from_level(level),
		None => config.telemetry.level.parse()?,
	};
	init_logger(level);

	// The Sentry client has to exist before the Tokio runtime.
	// See https://docs.sentry.io/platforms/rust/#async-main-function
	let _sentry = init_sentry(&config);
	let options = args.into_options(&config);

	let outcome = tokio::runtime::Builder::new_current_thread()
		.enable_all()
		.build()?
		.block_on(app::run(options));

	match outcome {
		Ok(outcome) => {
			println!("{}", serde_json::to_string_pretty(&outcome)?);
			Ok(ExitCode::SUCCESS)
		}
		Err(error) => {
			error!("{error:#}");
			Ok(ExitCode::FAILURE)
		}
	}
}
