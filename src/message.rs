//! Chat messages and the chart data that can ride along with an answer.

use serde::Serialize;

use crate::constants::ERROR_TEXT;

/// Who produced a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Error,
}

impl Role {
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Greeny",
            Role::Error => "Error",
        }
    }
}

/// One chat bubble. Messages are never edited after creation; the store only
/// hands out shared references to them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    User {
        text: String,
    },
    Assistant {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        visualization: Option<Visualization>,
    },
    Error {
        text: String,
    },
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Message::User { text: text.into() }
    }

    pub fn assistant(text: impl Into<String>, visualization: Option<Visualization>) -> Self {
        Message::Assistant {
            text: text.into(),
            visualization,
        }
    }

    /// The fixed, user-safe notice shown for any transport or parse failure.
    pub fn error_notice() -> Self {
        Message::Error {
            text: ERROR_TEXT.to_string(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::User { .. } => Role::User,
            Message::Assistant { .. } => Role::Assistant,
            Message::Error { .. } => Role::Error,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Message::User { text } | Message::Assistant { text, .. } | Message::Error { text } => {
                text
            }
        }
    }

    pub fn visualization(&self) -> Option<&Visualization> {
        match self {
            Message::Assistant { visualization, .. } => visualization.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

impl ChartKind {
    /// Maps the service's `chart_type` value. Anything but `Bar` or `Line`
    /// (including `Pie`, which the service may suggest) has no chart.
    pub fn from_chart_type(value: &str) -> Option<Self> {
        match value {
            "Bar" => Some(ChartKind::Bar),
            "Line" => Some(ChartKind::Line),
            _ => None,
        }
    }

    /// Field each data point's category is read from.
    pub fn category_field(&self) -> &'static str {
        match self {
            ChartKind::Bar => "company",
            ChartKind::Line => "year",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub category: String,
    pub value: f64,
}

impl DataPoint {
    pub fn new(category: impl Into<String>, value: f64) -> Self {
        Self {
            category: category.into(),
            value,
        }
    }
}

/// Chart attached to an assistant answer. Points keep the order the service
/// sent them in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Visualization {
    pub kind: ChartKind,
    pub series_label: String,
    pub points: Vec<DataPoint>,
}
