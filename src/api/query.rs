//! Purpose: Parameter builders for list and date-range lookups.
//! Exports: `Query`, `DateRange`, `TimestampField`.
//! Role: Validates caller input before anything reaches the transport.
//! Invariants: `limit`/`offset` are omitted when absent or zero.
//! Invariants: The date-range discriminator is `create` or `update`, nothing else.
#![allow(clippy::result_large_err)]

use crate::core::error::{Error, ErrorKind};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use time::PrimitiveDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

/// Wire format for date arguments.
const DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    where_clause: Map<String, Value>,
    limit: Option<u64>,
    offset: Option<u64>,
    fields: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality constraint to the `where` object.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause.insert(key.into(), value.into());
        self
    }

    pub fn with_where(mut self, where_clause: Map<String, Value>) -> Self {
        self.where_clause = where_clause;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Restricts returned lead fields; ignored by calls that do not support it.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn where_clause(&self) -> &Map<String, Value> {
        &self.where_clause
    }

    pub(crate) fn to_params(&self, with_fields: bool) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert(
            "where".to_string(),
            Value::Object(self.where_clause.clone()),
        );
        if let Some(limit) = self.limit.filter(|limit| *limit > 0) {
            params.insert("limit".to_string(), Value::from(limit));
        }
        if let Some(offset) = self.offset.filter(|offset| *offset > 0) {
            params.insert("offset".to_string(), Value::from(offset));
        }
        if with_fields && !self.fields.is_empty() {
            params.insert("fields".to_string(), Value::from(self.fields.clone()));
        }
        params
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimestampField {
    Create,
    Update,
}

impl TimestampField {
    pub fn as_str(self) -> &'static str {
        match self {
            TimestampField::Create => "create",
            TimestampField::Update => "update",
        }
    }
}

impl fmt::Display for TimestampField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimestampField {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "create" => Ok(TimestampField::Create),
            "update" => Ok(TimestampField::Update),
            other => Err(Error::new(ErrorKind::Usage)
                .with_message(format!(
                    "timestamp value must be either create or update, got {other:?}"
                ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DateRange {
    start: String,
    end: String,
    timestamp: TimestampField,
    fields: Vec<String>,
}

impl DateRange {
    /// Range over `YYYY-MM-DD HH:MM:SS` strings; `timestamp` is `create` or `update`.
    pub fn parse(start: &str, end: &str, timestamp: &str) -> Result<Self, Error> {
        let timestamp = timestamp.parse()?;
        let start = validate_date(start)?;
        let end = validate_date(end)?;
        Ok(Self {
            start,
            end,
            timestamp,
            fields: Vec::new(),
        })
    }

    pub fn between(
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
        timestamp: TimestampField,
    ) -> Result<Self, Error> {
        Ok(Self {
            start: format_date(start)?,
            end: format_date(end)?,
            timestamp,
            fields: Vec::new(),
        })
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn timestamp(&self) -> TimestampField {
        self.timestamp
    }

    pub(crate) fn to_params(&self, with_fields: bool) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("startDate".to_string(), Value::from(self.start.clone()));
        params.insert("endDate".to_string(), Value::from(self.end.clone()));
        params.insert(
            "timestamp".to_string(),
            Value::from(self.timestamp.as_str()),
        );
        if with_fields && !self.fields.is_empty() {
            params.insert("fields".to_string(), Value::from(self.fields.clone()));
        }
        params
    }
}

fn format_date(value: PrimitiveDateTime) -> Result<String, Error> {
    value.format(DATE_FORMAT).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("failed to format date")
            .with_source(err)
    })
}

fn validate_date(raw: &str) -> Result<String, Error> {
    PrimitiveDateTime::parse(raw.trim(), DATE_FORMAT).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid date {raw:?}"))
            .with_hint("Dates use the form YYYY-MM-DD HH:MM:SS.")
            .with_source(err)
    })?;
    Ok(raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::{DateRange, Query, TimestampField};
    use crate::core::error::ErrorKind;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn zero_limit_and_offset_are_omitted() {
        let params = Query::new().limit(0).offset(0).to_params(false);
        assert_eq!(serde_json::Value::Object(params), json!({"where": {}}));
    }

    #[test]
    fn query_params_include_where_limit_offset() {
        let params = Query::new()
            .filter("emailAddress", "a@b.co")
            .limit(25)
            .offset(50)
            .fields(["id", "emailAddress"])
            .to_params(true);
        assert_eq!(
            serde_json::Value::Object(params),
            json!({
                "where": {"emailAddress": "a@b.co"},
                "limit": 25,
                "offset": 50,
                "fields": ["id", "emailAddress"]
            })
        );
    }

    #[test]
    fn fields_are_dropped_where_unsupported() {
        let params = Query::new().fields(["id"]).to_params(false);
        assert!(!params.contains_key("fields"));
    }

    #[test]
    fn invalid_timestamp_is_usage_error() {
        let err = DateRange::parse("2024-01-01 00:00:00", "2024-02-01 00:00:00", "delete")
            .expect_err("bad discriminator");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn malformed_date_is_usage_error() {
        let err = DateRange::parse("01/02/2024", "2024-02-01 00:00:00", "create")
            .expect_err("bad date");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn between_formats_wire_dates() {
        let range = DateRange::between(
            datetime!(2024-03-01 08:30:00),
            datetime!(2024-03-31 23:59:59),
            TimestampField::Update,
        )
        .expect("range");
        assert_eq!(
            serde_json::Value::Object(range.to_params(false)),
            json!({
                "startDate": "2024-03-01 08:30:00",
                "endDate": "2024-03-31 23:59:59",
                "timestamp": "update"
            })
        );
    }
}
