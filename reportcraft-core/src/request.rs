//! Request framing around the rendering engine

use serde::Serialize;
use serde_json::Value;

use crate::error::RequestError;
use crate::normalize::{self, Record};
use crate::schema::TableKind;

/// Placeholder used when the caller omits a scenario name.
pub const DEFAULT_SCENARIO_NAME: &str = "Final_Report";

/// Wrapper key some automation callers use to ship the entire payload as a
/// JSON-encoded string.
const PAYLOAD_ENVELOPE_KEY: &str = "_payloadJson";

/// Canonical table inputs for one render.
#[derive(Debug, Clone, Default)]
pub struct ReportInput {
    pub scenario: Record,
    pub lines: Vec<Record>,
    pub sub_lines: Vec<Record>,
    pub fund_sources: Vec<Record>,
}

impl ReportInput {
    /// Records for one table. The scenario is always exactly one record,
    /// blank or not.
    pub fn records_for(&self, kind: TableKind) -> &[Record] {
        match kind {
            TableKind::Scenario => std::slice::from_ref(&self.scenario),
            TableKind::Lines => &self.lines,
            TableKind::SubLines => &self.sub_lines,
            TableKind::FundSources => &self.fund_sources,
        }
    }
}

/// A parsed, normalized report request.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub scenario_id: String,
    pub scenario_name: Option<String>,
    pub input: ReportInput,
}

/// Success response for the request boundary.
#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    #[serde(rename = "fileUrl")]
    pub file_url: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

/// Parse and normalize a raw request body.
///
/// Only two conditions reject a request: an unparseable body and a missing
/// `scenarioId`. Each of the four table inputs degrades independently through
/// the normalizer, so a malformed field never blocks the other tables.
pub fn parse_request(body: &str) -> Result<ReportRequest, RequestError> {
    let mut payload: Value = serde_json::from_str(body)?;

    // The whole payload may arrive JSON-encoded under the envelope key;
    // unwrap at most once, before any other field is read.
    if let Some(Value::String(raw)) = payload.get(PAYLOAD_ENVELOPE_KEY)
        && let Some(inner) = normalize::try_parse_json(raw)
        && inner.is_object()
    {
        payload = inner;
    }

    let scenario_id = match payload.get("scenarioId") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(RequestError::MissingScenarioId),
    };

    let scenario_name = match payload.get("scenarioName") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    };

    let input = ReportInput {
        scenario: normalize::normalize_record(payload.get("scenario")),
        lines: normalize::normalize_records(payload.get("projectionLines")),
        sub_lines: normalize::normalize_records(payload.get("subLines")),
        fund_sources: normalize::normalize_records(payload.get("fundSources")),
    };

    Ok(ReportRequest {
        scenario_id,
        scenario_name,
        input,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_payload() {
        let body = json!({
            "scenarioId": "rec123",
            "scenarioName": "FY26 Q2",
            "scenario": {"Name": "FY26 Q2"},
            "projectionLines": [{"Name": "L1"}, {"Name": "L2"}],
            "subLines": [],
            "fundSources": [{"Fund": "1004"}]
        })
        .to_string();

        let request = parse_request(&body).unwrap();
        assert_eq!(request.scenario_id, "rec123");
        assert_eq!(request.scenario_name.as_deref(), Some("FY26 Q2"));
        assert_eq!(request.input.lines.len(), 2);
        assert!(request.input.sub_lines.is_empty());
        assert_eq!(request.input.fund_sources.len(), 1);
        assert_eq!(
            request.input.records_for(TableKind::Scenario).len(),
            1
        );
    }

    #[test]
    fn test_payload_envelope_unwrapped() {
        let inner = json!({
            "scenarioId": "rec456",
            "projectionLines": "[{\"Name\":\"A\"}]"
        })
        .to_string();
        let body = json!({ "_payloadJson": inner }).to_string();

        let request = parse_request(&body).unwrap();
        assert_eq!(request.scenario_id, "rec456");
        assert_eq!(request.input.lines.len(), 1);
        assert_eq!(request.input.lines[0].get("Name"), Some(&json!("A")));
    }

    #[test]
    fn test_numeric_scenario_id_is_stringified() {
        let body = json!({"scenarioId": 991}).to_string();
        let request = parse_request(&body).unwrap();
        assert_eq!(request.scenario_id, "991");
    }

    #[test]
    fn test_missing_scenario_id_rejected() {
        let err = parse_request(r#"{"scenarioName":"X"}"#).unwrap_err();
        assert!(matches!(err, RequestError::MissingScenarioId));

        let err = parse_request(r#"{"scenarioId":""}"#).unwrap_err();
        assert!(matches!(err, RequestError::MissingScenarioId));
    }

    #[test]
    fn test_invalid_body_rejected() {
        assert!(matches!(
            parse_request("not json at all"),
            Err(RequestError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_malformed_tables_degrade_to_empty() {
        let body = json!({
            "scenarioId": "rec789",
            "scenario": "not json",
            "projectionLines": "also not json",
            "fundSources": 12
        })
        .to_string();

        let request = parse_request(&body).unwrap();
        assert!(request.input.scenario.is_empty());
        assert!(request.input.lines.is_empty());
        assert!(request.input.fund_sources.is_empty());
    }
}
