use crate::cli::QueryOptions;
use crate::report;
use crate::request::{self, Input, Prepared};
use crate::service::{PfdcmService, QueryService};
use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};

/// The result of a run, printed to stdout.
#[derive(Debug, Serialize, PartialEq)]
pub struct RunOutcome {
	/// `false` if the run could not proceed and nothing was sent.
	pub status: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub response: Option<Value>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub outputs: Vec<PathBuf>,
}

impl RunOutcome {
	const fn skipped() -> Self {
		Self {
			status: false,
			response: None,
			outputs: Vec::new(),
		}
	}
}

/// Sends the query to the pfdcm service named in `options` and writes the requested reports.
pub async fn run(options: QueryOptions) -> anyhow::Result<RunOutcome> {
	let service = match options.service.as_deref() {
		Some(address) => Some(PfdcmService::new(address, options.wrapper.as_deref())?),
		None => None,
	};
	let service = service.as_ref().map(|service| service as &dyn QueryService);
	execute(options, service).await
}

/// Same as [`run`], with the service supplied by the caller.
///
/// Without a usable request or a service this is a no-op reporting `status: false`.
pub async fn execute(
	options: QueryOptions,
	service: Option<&dyn QueryService>,
) -> anyhow::Result<RunOutcome> {
	let prepared = request::prepare(
		options.msg.as_deref(),
		options.patient_id.as_deref(),
		options.pacs_service.as_deref(),
	);

	let (request, service) = match (prepared, service) {
		(Prepared::Ready(request), Some(service)) => (request, service),
		(Prepared::Malformed(err), _) => {
			warn!("Cannot run: {err}");
			return Ok(RunOutcome::skipped());
		}
		(prepared, service) => {
			let mut missing = match prepared {
				Prepared::Incomplete(missing) => missing,
				_ => Vec::new(),
			};
			if service.is_none() {
				missing.insert(0, Input::Service);
			}
			let missing: Vec<String> = missing.iter().map(ToString::to_string).collect();
			warn!("Cannot run: missing {}", missing.join(", "));
			return Ok(RunOutcome::skipped());
		}
	};

	let response = service
		.send(&request)
		.await
		.context("Query to the PACS intermediary service failed")?;

	if options.outputs.is_empty() {
		info!("No output files requested");
	}
	let outputs = report::write_reports(&options.outputs, &response)
		.with_context(|| format!("Failed to write reports to {}", options.outputs.dir.display()))?;

	Ok(RunOutcome {
		status: true,
		response: Some(response),
		outputs,
	})
}
