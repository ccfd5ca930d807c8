//! Deal summaries and the Slack Block Kit messages rendered from them.

use serde::Serialize;
use serde_json::Value;

use dealflow_common::error::AppError;

pub const HEADER_TEXT: &str = "*New Deal Update!* :bell:";
pub const ATTACHMENT_COLOR: &str = "#2ECC71";

const DEFAULT_TITLE: &str = "No title";
const DEFAULT_SALES_MANAGER: &str = "N/A";
const DEFAULT_CUSTOMER: &str = "Unknown Customer";
const DEFAULT_CURRENCY: &str = "SEK";
const DEFAULT_STATE: &str = "Unknown";

/// Read-only view of the deal fields shown in a notification.
#[derive(Debug, Clone, PartialEq)]
pub struct DealSummary {
    pub title: String,
    pub sales_manager: String,
    pub customer: String,
    pub estimated_value: f64,
    pub currency: String,
    pub state: String,
}

impl DealSummary {
    /// Parse a queue message body and summarize its `Payload`.
    pub fn from_message(body: &str) -> Result<Self, AppError> {
        let message: Value = serde_json::from_str(body)?;
        let payload = message.get("Payload").unwrap_or(&Value::Null);
        Self::from_payload(payload)
    }

    /// Missing or null fields fall back to fixed defaults. Only a present,
    /// non-numeric `EstimatedValue` is an error.
    pub fn from_payload(payload: &Value) -> Result<Self, AppError> {
        let sales_manager = payload
            .get("SalesManagers")
            .and_then(Value::as_array)
            .and_then(|managers| managers.first())
            .and_then(|manager| manager.get("Fullname"));

        Ok(Self {
            title: text_or(payload.get("Title"), DEFAULT_TITLE),
            sales_manager: text_or(sales_manager, DEFAULT_SALES_MANAGER),
            customer: text_or(payload.pointer("/Customer/Name"), DEFAULT_CUSTOMER),
            estimated_value: amount_or_zero(payload.get("EstimatedValue"))?,
            currency: text_or(payload.pointer("/Currency/CurrencyCode"), DEFAULT_CURRENCY),
            state: text_or(payload.pointer("/CurrentState/StateTitle"), DEFAULT_STATE),
        })
    }

    /// `12,345 SEK`
    pub fn formatted_value(&self) -> String {
        format!("{} {}", format_amount(self.estimated_value), self.currency)
    }
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn amount_or_zero(value: Option<&Value>) -> Result<f64, AppError> {
    let amount = match value {
        None | Some(Value::Null) => return Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| AppError::Validation(format!("EstimatedValue out of range: {}", n)))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::Validation(format!("EstimatedValue is not a number: {:?}", s)))?,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "EstimatedValue is not a number: {}",
                other
            )));
        }
    };

    // "NaN", "inf" and "1e999" all parse as f64
    if !amount.is_finite() {
        return Err(AppError::Validation(format!(
            "EstimatedValue is not finite: {}",
            amount
        )));
    }
    Ok(amount)
}

/// Round to the nearest integer (ties to even) and group thousands with `,`.
///
/// `value` must be finite; [`DealSummary`] never holds anything else.
pub fn format_amount(value: f64) -> String {
    let rounded = value.round_ties_even();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Block Kit `section` with `mrkdwn` text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl Block {
    pub fn section(text: impl Into<String>) -> Self {
        Self {
            kind: "section",
            text: Text {
                kind: "mrkdwn",
                text: text.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub color: &'static str,
    pub blocks: Vec<Block>,
}

/// Message content; the channel is added by the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub blocks: Vec<Block>,
    pub attachments: Vec<Attachment>,
}

impl ChatMessage {
    pub fn for_deal(deal: &DealSummary) -> Self {
        Self {
            blocks: vec![Block::section(HEADER_TEXT)],
            attachments: vec![Attachment {
                color: ATTACHMENT_COLOR,
                blocks: vec![
                    Block::section(format!("*{}*", deal.title)),
                    Block::section(format!("📧 *Sales Manager:* {}", deal.sales_manager)),
                    Block::section(format!("🏢 *Customer:* {}", deal.customer)),
                    Block::section(format!("💰 *Value:* *{}*", deal.formatted_value())),
                    Block::section(format!("📌 *Current State:* {}", deal.state)),
                ],
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn full_payload() -> Value {
        json!({
            "Title": "Cloud migration",
            "SalesManagers": [{"Fullname": "Astrid Lind"}, {"Fullname": "Bo Ek"}],
            "Customer": {"Name": "Acme AB"},
            "EstimatedValue": 1250000.0,
            "Currency": {"CurrencyCode": "EUR"},
            "CurrentState": {"StateTitle": "Won"}
        })
    }

    #[test]
    fn test_format_amount_grouping() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(1000.0), "1,000");
        assert_eq!(format_amount(12345.0), "12,345");
        assert_eq!(format_amount(1234567.0), "1,234,567");
        assert_eq!(format_amount(-1234567.0), "-1,234,567");
    }

    #[test]
    fn test_format_amount_rounding() {
        assert_eq!(format_amount(12345.4), "12,345");
        assert_eq!(format_amount(12345.6), "12,346");
        // ties go to the even neighbour
        assert_eq!(format_amount(12344.5), "12,344");
        assert_eq!(format_amount(12345.5), "12,346");
        assert_eq!(format_amount(-0.4), "0");
    }

    #[test]
    fn test_format_amount_beyond_integer_range() {
        assert_eq!(format_amount(1e21), "1,000,000,000,000,000,000,000");
        assert_eq!(
            format_amount(1e39),
            "999,999,999,999,999,939,709,166,371,603,178,586,112"
        );
        assert_eq!(
            format_amount(-1e39),
            "-999,999,999,999,999,939,709,166,371,603,178,586,112"
        );
    }

    #[test]
    fn test_summary_reads_all_fields() {
        let deal = DealSummary::from_payload(&full_payload()).unwrap();
        assert_eq!(deal.title, "Cloud migration");
        assert_eq!(deal.sales_manager, "Astrid Lind");
        assert_eq!(deal.customer, "Acme AB");
        assert_eq!(deal.estimated_value, 1250000.0);
        assert_eq!(deal.currency, "EUR");
        assert_eq!(deal.state, "Won");
        assert_eq!(deal.formatted_value(), "1,250,000 EUR");
    }

    #[test]
    fn test_summary_defaults() {
        let deal = DealSummary::from_payload(&json!({})).unwrap();
        assert_eq!(
            deal,
            DealSummary {
                title: "No title".to_string(),
                sales_manager: "N/A".to_string(),
                customer: "Unknown Customer".to_string(),
                estimated_value: 0.0,
                currency: "SEK".to_string(),
                state: "Unknown".to_string(),
            }
        );
        assert_eq!(deal.formatted_value(), "0 SEK");
    }

    #[test]
    fn test_summary_empty_managers_and_nulls() {
        let payload = json!({
            "SalesManagers": [],
            "Title": null,
            "EstimatedValue": null,
            "Customer": {}
        });
        let deal = DealSummary::from_payload(&payload).unwrap();
        assert_eq!(deal.sales_manager, "N/A");
        assert_eq!(deal.title, "No title");
        assert_eq!(deal.estimated_value, 0.0);
        assert_eq!(deal.customer, "Unknown Customer");
    }

    #[test]
    fn test_summary_numeric_string_value() {
        let deal = DealSummary::from_payload(&json!({"EstimatedValue": "12345"})).unwrap();
        assert_eq!(deal.formatted_value(), "12,345 SEK");
    }

    #[test]
    fn test_summary_invalid_value_is_error() {
        assert!(DealSummary::from_payload(&json!({"EstimatedValue": "lots"})).is_err());
        assert!(DealSummary::from_payload(&json!({"EstimatedValue": {"a": 1}})).is_err());
    }

    #[test]
    fn test_summary_non_finite_value_is_error() {
        for value in ["NaN", "inf", "-infinity", " Infinity ", "1e999"] {
            let result = DealSummary::from_payload(&json!({"EstimatedValue": value}));
            assert!(
                matches!(result, Err(AppError::Validation(_))),
                "{:?} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_summary_large_numeric_string_value() {
        let deal = DealSummary::from_payload(&json!({"EstimatedValue": "1e21"})).unwrap();
        assert_eq!(deal.formatted_value(), "1,000,000,000,000,000,000,000 SEK");
    }

    #[test]
    fn test_from_message_requires_json() {
        assert!(matches!(
            DealSummary::from_message("not json"),
            Err(AppError::Json(_))
        ));
        let deal = DealSummary::from_message(r#"{"Payload": {"Title": "X"}}"#).unwrap();
        assert_eq!(deal.title, "X");
    }

    #[test]
    fn test_message_layout() {
        let deal = DealSummary::from_payload(&full_payload()).unwrap();
        let json = serde_json::to_value(ChatMessage::for_deal(&deal)).unwrap();

        assert_eq!(
            json["blocks"],
            json!([{"type": "section", "text": {"type": "mrkdwn", "text": "*New Deal Update!* :bell:"}}])
        );
        let attachment = &json["attachments"][0];
        assert_eq!(attachment["color"], "#2ECC71");

        let texts: Vec<&str> = attachment["blocks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["text"]["text"].as_str().unwrap())
            .collect();
        assert_eq!(
            texts,
            vec![
                "*Cloud migration*",
                "📧 *Sales Manager:* Astrid Lind",
                "🏢 *Customer:* Acme AB",
                "💰 *Value:* *1,250,000 EUR*",
                "📌 *Current State:* Won",
            ]
        );
    }
}
