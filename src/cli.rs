use crate::config::ApplicationConfig;
use crate::man::Topic;
use crate::report::Outputs;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

/// Query a PACS through the pfdcm intermediary service.
#[derive(Debug, Parser)]
#[command(name = "pacsquery", version, about)]
pub struct Args {
	/// The PACS Q/R intermediary service (host:port).
	#[arg(long, value_name = "HOST:PORT")]
	pub pfdcm: Option<String>,

	/// The complete JSON message to send to the intermediary service.
	/// Takes precedence over --PatientID and --PACSservice.
	#[arg(long, value_name = "JSON")]
	pub msg: Option<String>,

	/// The PatientID to query for.
	#[arg(long = "PatientID", value_name = "ID")]
	pub patient_id: Option<String>,

	/// The PACS configuration known to pfdcm to query.
	#[arg(long = "PACSservice", value_name = "NAME")]
	pub pacs_service: Option<String>,

	/// Comma separated list of DICOM attributes to include in the summary.
	#[arg(long = "summaryKeys", value_name = "KEYS", value_delimiter = ',')]
	pub summary_keys: Vec<String>,

	/// File in <outputdir> to write the summary table to.
	#[arg(long = "summaryFile", value_name = "FILE")]
	pub summary_file: Option<String>,

	/// File in <outputdir> to write the full JSON response to.
	#[arg(long = "resultFile", value_name = "FILE")]
	pub result_file: Option<String>,

	/// File in <outputdir> to write the number of hits to.
	#[arg(long = "numberOfHitsFile", value_name = "FILE")]
	pub hits_file: Option<String>,

	/// Print a help topic and exit. Use `--man entries` to list topics.
	#[arg(long, value_enum, value_name = "TOPIC")]
	pub man: Option<Topic>,

	/// Log verbosity from 0 (warnings only) to 3 (everything).
	#[arg(long, value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=3))]
	pub verbosity: Option<u8>,

	/// Directory the output files are written to.
	#[arg(required_unless_present = "man")]
	pub outputdir: Option<PathBuf>,
}

impl Args {
	/// The log level requested with `--verbosity`, if any.
	pub const fn log_level(&self) -> Option<Level> {
		match self.verbosity {
			None => None,
			Some(0) => Some(Level::WARN),
			Some(1) => Some(Level::INFO),
			Some(2) => Some(Level::DEBUG),
			Some(_) => Some(Level::TRACE),
		}
	}

	/// Combines the command line with the loaded configuration.
	/// Command line values win over configured defaults.
	pub fn into_options(self, config: &ApplicationConfig) -> QueryOptions {
		let service = non_empty(self.pfdcm).or_else(|| non_empty(Some(config.service.address.clone())));
		let pacs_service =
			non_empty(self.pacs_service).or_else(|| non_empty(Some(config.pacs.service.clone())));

		QueryOptions {
			service,
			wrapper: config.service.wrapper().map(String::from),
			msg: non_empty(self.msg),
			patient_id: non_empty(self.patient_id),
			pacs_service,
			outputs: Outputs {
				dir: self.outputdir.unwrap_or_default(),
				summary_keys: self
					.summary_keys
					.into_iter()
					.map(|key| key.trim().to_owned())
					.filter(|key| !key.is_empty())
					.collect(),
				summary_file: non_empty(self.summary_file),
				result_file: non_empty(self.result_file),
				hits_file: non_empty(self.hits_file),
			},
		}
	}
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
	/// Address of the pfdcm service.
	pub service: Option<String>,
	/// Key the request is wrapped under in the POST body.
	pub wrapper: Option<String>,
	pub msg: Option<String>,
	pub patient_id: Option<String>,
	pub pacs_service: Option<String>,
	pub outputs: Outputs,
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|value| !value.trim().is_empty())
}
