use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Width of every column in the summary table.
pub const COLUMN_WIDTH: usize = 60;

/// Where the hit records live in a pfdcm query response.
const HITS_POINTER: &str = "/query/data";

#[derive(Debug, Error)]
pub enum ReportError {
	#[error("response has no `query.data` list of hits")]
	MissingHits,
	#[error("hit record {record} has no `{key}.value`")]
	MissingField { record: usize, key: String },
	#[error("failed to serialize the response: {0}")]
	Serialize(#[from] serde_json::Error),
	#[error("failed to write {}: {source}", path.display())]
	Io {
		path: PathBuf,
		source: std::io::Error,
	},
}

/// Output files requested for a run. Each file is only written if its name is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outputs {
	pub dir: PathBuf,
	pub summary_keys: Vec<String>,
	pub summary_file: Option<String>,
	pub result_file: Option<String>,
	pub hits_file: Option<String>,
}

impl Outputs {
	pub const fn is_empty(&self) -> bool {
		self.summary_file.is_none() && self.result_file.is_none() && self.hits_file.is_none()
	}

	const fn needs_hits(&self) -> bool {
		self.summary_file.is_some() || self.hits_file.is_some()
	}
}

/// Returns the hit records of a query response.
pub fn hits(response: &Value) -> Result<&[Value], ReportError> {
	response
		.pointer(HITS_POINTER)
		.and_then(Value::as_array)
		.map(Vec::as_slice)
		.ok_or(ReportError::MissingHits)
}

/// Pretty-prints the response with four-space indentation and sorted keys.
pub fn render_result(response: &Value) -> Result<Vec<u8>, ReportError> {
	let mut sorted = response.clone();
	sorted.sort_all_objects();

	let mut buffer = Vec::new();
	let mut serializer =
		serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
	sorted.serialize(&mut serializer)?;
	Ok(buffer)
}

/// Renders the summary table: a header row of `keys`, then one row per hit with each cell
/// taken from `hit[key].value`. Cells are left-aligned and padded to [`COLUMN_WIDTH`].
pub fn render_summary(keys: &[String], hits: &[Value]) -> Result<String, ReportError> {
	let mut table = String::new();
	for key in keys {
		table.push_str(&format!("{key:<COLUMN_WIDTH$}"));
	}
	table.push('\n');

	for (record, hit) in hits.iter().enumerate() {
		for key in keys {
			let value = hit
				.get(key)
				.and_then(|field| field.get("value"))
				.ok_or_else(|| ReportError::MissingField {
					record,
					key: key.clone(),
				})?;
			let cell = match value {
				Value::String(text) => text.clone(),
				other => other.to_string(),
			};
			table.push_str(&format!("{cell:<COLUMN_WIDTH$}"));
		}
		table.push('\n');
	}

	Ok(table)
}

/// Writes the requested output files into `outputs.dir` and returns their paths.
///
/// All contents are rendered before anything is written, so a rendering error leaves the
/// output directory untouched.
pub fn write_reports(outputs: &Outputs, response: &Value) -> Result<Vec<PathBuf>, ReportError> {
	let mut files: Vec<(&str, Vec<u8>)> = Vec::with_capacity(3);

	if let Some(name) = &outputs.result_file {
		files.push((name.as_str(), render_result(response)?));
	}

	if outputs.needs_hits() {
		let hits = hits(response)?;
		debug!(hits = hits.len(), "Found hits in response");
		if let Some(name) = &outputs.hits_file {
			files.push((name.as_str(), hits.len().to_string().into_bytes()));
		}
		if let Some(name) = &outputs.summary_file {
			files.push((name.as_str(), render_summary(&outputs.summary_keys, hits)?.into_bytes()));
		}
	}

	if files.is_empty() {
		return Ok(Vec::new());
	}

	create_dir(&outputs.dir)?;
	let mut written = Vec::with_capacity(files.len());
	for (name, contents) in files {
		let path = outputs.dir.join(name);
		std::fs::write(&path, contents).map_err(|source| ReportError::Io {
			path: path.clone(),
			source,
		})?;
		info!(path = %path.display(), "Wrote output file");
		written.push(path);
	}

	Ok(written)
}

fn create_dir(dir: &Path) -> Result<(), ReportError> {
	std::fs::create_dir_all(dir).map_err(|source| ReportError::Io {
		path: dir.to_path_buf(),
		source,
	})
}
