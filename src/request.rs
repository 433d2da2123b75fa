use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// The `action` understood by pfdcm for PACS query/retrieve requests.
pub const ACTION_PACS_INTERACT: &str = "PACSinteract";

/// The `meta.do` verb for a query.
pub const VERB_QUERY: &str = "query";

/// A query request in the shape pfdcm expects.
///
/// ```json
/// {
///   "action": "PACSinteract",
///   "meta": { "do": "query", "on": { "PatientID": "4780041" }, "PACS": "orthanc" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
	pub action: String,
	pub meta: QueryMeta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMeta {
	pub verb: String,
	/// DICOM attribute names mapped to their match values.
	pub on: BTreeMap<String, String>,
	/// Name of a PACS configuration known to pfdcm.
	pub pacs: String,
}

impl QueryRequest {
	pub fn patient(patient_id: &str, pacs: &str) -> Self {
		Self {
			action: String::from(ACTION_PACS_INTERACT),
			meta: QueryMeta {
				verb: String::from(VERB_QUERY),
				on: BTreeMap::from([(String::from("PatientID"), String::from(patient_id))]),
				pacs: String::from(pacs),
			},
		}
	}
}

impl From<QueryRequest> for Value {
	fn from(request: QueryRequest) -> Self {
		json!({
			"action": request.action,
			"meta": {
				"do": request.meta.verb,
				"on": request.meta.on,
				"PACS": request.meta.pacs,
			}
		})
	}
}

/// Outcome of turning the user's input into a request.
#[derive(Debug)]
pub enum Prepared {
	/// A request that can be sent.
	Ready(Value),
	/// `--msg` was given but could not be used.
	Malformed(MalformedMessage),
	/// Neither `--msg` nor a complete simplified query was given.
	Incomplete(Vec<Input>),
}

#[derive(Debug, Error)]
pub enum MalformedMessage {
	#[error("message is not valid JSON: {0}")]
	Syntax(#[from] serde_json::Error),
	#[error("message must be a JSON object, got {0}")]
	NotAnObject(&'static str),
}

/// The inputs a run may be missing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Input {
	Service,
	PatientId,
	PacsService,
}

impl Display for Input {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Service => write!(f, "--pfdcm"),
			Self::PatientId => write!(f, "--PatientID"),
			Self::PacsService => write!(f, "--PACSservice"),
		}
	}
}

/// Builds the request from either a raw message or a patient ID and PACS service name.
///
/// A non-empty `msg` always wins, even when it turns out to be malformed.
pub fn prepare(msg: Option<&str>, patient_id: Option<&str>, pacs: Option<&str>) -> Prepared {
	if let Some(msg) = msg.filter(|msg| !msg.trim().is_empty()) {
		return match parse_message(msg) {
			Ok(request) => Prepared::Ready(request),
			Err(err) => Prepared::Malformed(err),
		};
	}

	let patient_id = patient_id.filter(|id| !id.is_empty());
	let pacs = pacs.filter(|pacs| !pacs.is_empty());
	match (patient_id, pacs) {
		(Some(patient_id), Some(pacs)) => {
			Prepared::Ready(QueryRequest::patient(patient_id, pacs).into())
		}
		(patient_id, pacs) => {
			let mut missing = Vec::with_capacity(2);
			if patient_id.is_none() {
				missing.push(Input::PatientId);
			}
			if pacs.is_none() {
				missing.push(Input::PacsService);
			}
			Prepared::Incomplete(missing)
		}
	}
}

fn parse_message(msg: &str) -> Result<Value, MalformedMessage> {
	let value: Value = serde_json::from_str(msg)?;
	match value {
		Value::Object(_) => Ok(value),
		Value::Array(_) => Err(MalformedMessage::NotAnObject("an array")),
		Value::String(_) => Err(MalformedMessage::NotAnObject("a string")),
		Value::Number(_) => Err(MalformedMessage::NotAnObject("a number")),
		Value::Bool(_) => Err(MalformedMessage::NotAnObject("a boolean")),
		Value::Null => Err(MalformedMessage::NotAnObject("null")),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn raw_message_is_reserialized_verbatim() {
		let msg = r#"{"action":"PACSinteract","meta":{"do":"query","on":{"PatientID":"4780041"},"PACS":"orthanc"}}"#;
		let Prepared::Ready(request) = prepare(Some(msg), None, None) else {
			panic!("expected a ready request");
		};
		let parsed: Value = serde_json::from_str(msg).unwrap();
		assert_eq!(
			serde_json::to_string(&request).unwrap(),
			serde_json::to_string(&parsed).unwrap()
		);
	}

	#[test]
	fn simplified_query_has_fixed_shape() {
		let Prepared::Ready(request) = prepare(None, Some("4780041"), Some("orthanc")) else {
			panic!("expected a ready request");
		};
		assert_eq!(
			request,
			json!({
				"action": "PACSinteract",
				"meta": {
					"do": "query",
					"on": { "PatientID": "4780041" },
					"PACS": "orthanc"
				}
			})
		);
	}

	#[test]
	fn raw_message_takes_precedence() {
		let msg = r#"{"action":"PACSinteract","meta":{"do":"retrieve"}}"#;
		let Prepared::Ready(request) = prepare(Some(msg), Some("123"), Some("orthanc")) else {
			panic!("expected a ready request");
		};
		assert_eq!(request, json!({"action": "PACSinteract", "meta": {"do": "retrieve"}}));
	}

	#[test]
	fn malformed_message_wins_over_simplified_query() {
		let prepared = prepare(Some("{not json"), Some("123"), Some("orthanc"));
		assert!(matches!(
			prepared,
			Prepared::Malformed(MalformedMessage::Syntax(_))
		));
	}

	#[rstest]
	#[case("[1, 2]", "an array")]
	#[case("\"query\"", "a string")]
	#[case("42", "a number")]
	#[case("null", "null")]
	fn non_object_message_is_malformed(#[case] msg: &str, #[case] kind: &str) {
		match prepare(Some(msg), None, None) {
			Prepared::Malformed(MalformedMessage::NotAnObject(actual)) => assert_eq!(actual, kind),
			other => panic!("unexpected outcome: {other:?}"),
		}
	}

	#[rstest]
	#[case(None, None, vec![Input::PatientId, Input::PacsService])]
	#[case(Some("123"), None, vec![Input::PacsService])]
	#[case(None, Some("orthanc"), vec![Input::PatientId])]
	#[case(Some(""), Some("orthanc"), vec![Input::PatientId])]
	#[case(Some("123"), Some(""), vec![Input::PacsService])]
	fn incomplete_simplified_query(
		#[case] patient_id: Option<&str>,
		#[case] pacs: Option<&str>,
		#[case] expected: Vec<Input>,
	) {
		match prepare(None, patient_id, pacs) {
			Prepared::Incomplete(missing) => assert_eq!(missing, expected),
			other => panic!("unexpected outcome: {other:?}"),
		}
	}

	#[test]
	fn blank_message_falls_back_to_simplified_query() {
		let prepared = prepare(Some("  "), Some("123"), Some("orthanc"));
		assert!(matches!(prepared, Prepared::Ready(_)));
	}
}
