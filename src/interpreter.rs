//! Turns a raw answer-service body into exactly one [`Message`].
//!
//! The service double-encodes its answer: the body is `{"response": "<json>"}`
//! and the string holds the actual answer object:
//!
//! ```json
//! {"answer": "...", "chart_type": "Bar", "data": [{"company": "A", "value": 1.0}], "data_type": "emissions"}
//! ```
//!
//! Only `answer` is required. Chart extraction is best-effort: if anything
//! about the chart fields is off, the answer is still shown as plain text.
//! Everything here is pure, so it is tested against literal payloads.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::message::{ChartKind, DataPoint, Message, Visualization};

#[derive(Debug, Error)]
pub enum InterpretError {
    #[error("malformed response envelope: {0}")]
    Envelope(serde_json::Error),
    #[error("malformed answer body: {0}")]
    Body(serde_json::Error),
    #[error("{0} is not a JSON object")]
    NotAnObject(&'static str),
    #[error("answer body has no `answer` field")]
    MissingAnswer,
}

#[derive(Deserialize)]
struct Envelope {
    response: String,
}

// Chart fields stay loosely typed so a bad chart never fails the answer.
#[derive(Deserialize)]
struct AnswerBody {
    answer: Option<String>,
    #[serde(default)]
    chart_type: Option<Value>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    data_type: Option<Value>,
}

/// Interprets `raw`, falling back to the fixed error notice on any failure.
/// Callers that want the failure detail use [`try_interpret`].
pub fn interpret(raw: &str) -> Message {
    try_interpret(raw).unwrap_or_else(|_| Message::error_notice())
}

pub fn try_interpret(raw: &str) -> Result<Message, InterpretError> {
    let envelope: Envelope = serde_json::from_str::<Value>(raw)
        .map_err(InterpretError::Envelope)
        .and_then(|value| object(value, "response envelope"))
        .and_then(|value| serde_json::from_value(value).map_err(InterpretError::Envelope))?;
    let body: AnswerBody = serde_json::from_str::<Value>(&envelope.response)
        .map_err(InterpretError::Body)
        .and_then(|value| object(value, "answer body"))
        .and_then(|value| serde_json::from_value(value).map_err(InterpretError::Body))?;

    let visualization = extract_visualization(&body);
    let answer = body.answer.ok_or(InterpretError::MissingAnswer)?;

    Ok(Message::assistant(answer, visualization))
}

// Derived struct deserializers also accept arrays, filling fields in order.
fn object(value: Value, what: &'static str) -> Result<Value, InterpretError> {
    match value {
        Value::Object(_) => Ok(value),
        _ => Err(InterpretError::NotAnObject(what)),
    }
}

fn extract_visualization(body: &AnswerBody) -> Option<Visualization> {
    let kind = ChartKind::from_chart_type(body.chart_type.as_ref()?.as_str()?)?;
    let rows = body.data.as_ref()?.as_array()?;
    if rows.is_empty() {
        return None;
    }

    // All or nothing: one unreadable row drops the chart.
    let points = rows
        .iter()
        .map(|row| data_point(row, kind))
        .collect::<Option<Vec<_>>>()?;

    let series_label = body
        .data_type
        .as_ref()
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(Visualization {
        kind,
        series_label,
        points,
    })
}

fn data_point(row: &Value, kind: ChartKind) -> Option<DataPoint> {
    let category = match row.get(kind.category_field())? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let value = row.get("value")?.as_f64()?;
    Some(DataPoint::new(category, value))
}
