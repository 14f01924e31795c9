//! Purpose: Capability traits shared by every CRM record type.
//! Exports: `RecordKind`, `Record`, `HasCustomAttributes`, `FromAttributes`.
//! Role: Attribute resolution and outbound projection, dispatched on capabilities.
//! Invariants: Reads on custom-capable records check the custom map before the schema.
//! Invariants: Writes always prefer a declared key over the custom map.
//! Invariants: Filled projections are recomputed on every call, never cached.
#![allow(clippy::result_large_err)]

use super::attributes::AttributeBag;
use super::custom::{self, CustomAttributeBag};
use super::error::{Error, ErrorKind};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RecordKind {
    Account,
    Campaign,
    Client,
    DealStage,
    Email,
    EmailListing,
    Field,
    Lead,
    List,
    ListMember,
    ListTag,
    Opportunity,
    OpportunityLead,
    UserProfile,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Account => "account",
            RecordKind::Campaign => "campaign",
            RecordKind::Client => "client",
            RecordKind::DealStage => "dealStage",
            RecordKind::Email => "email",
            RecordKind::EmailListing => "emailListing",
            RecordKind::Field => "field",
            RecordKind::Lead => "lead",
            RecordKind::List => "list",
            RecordKind::ListMember => "listMember",
            RecordKind::ListTag => "listTag",
            RecordKind::Opportunity => "opportunity",
            RecordKind::OpportunityLead => "opportunityLead",
            RecordKind::UserProfile => "userProfile",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can be rebuilt from a decoded attribute map.
pub trait FromAttributes: Sized {
    fn from_attributes(attributes: Map<String, Value>) -> Self;
}

/// A record with a declared schema of named attributes.
pub trait Record: Clone + Sized {
    const KIND: RecordKind;
    const FIELDS: &'static [&'static str];
    const NULLABLE: &'static [&'static str] = &[];
    const PRIMARY_KEY: &'static str = "id";

    /// A record with every declared attribute null.
    fn blank() -> Self;

    fn attributes(&self) -> &AttributeBag;

    fn attributes_mut(&mut self) -> &mut AttributeBag;

    /// Custom tier, present only on custom-capable records.
    fn custom_attributes(&self) -> Option<&CustomAttributeBag> {
        None
    }

    fn custom_attributes_mut(&mut self) -> Option<&mut CustomAttributeBag> {
        None
    }

    fn make(attributes: Map<String, Value>) -> Self {
        let mut record = Self::blank();
        record.set_attributes(attributes);
        record
    }

    fn make_from_json(json: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(json).map_err(|err| {
            Error::new(ErrorKind::Decode)
                .with_message(format!("invalid {} json", Self::KIND))
                .with_source(err)
        })?;
        Self::make_from_value(value)
    }

    fn make_from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(attributes) => Ok(Self::make(attributes)),
            Value::Null => Ok(Self::blank()),
            other => Err(Error::new(ErrorKind::Cast).with_message(format!(
                "expected a json object for {}, found {}",
                Self::KIND,
                json_type_name(&other)
            ))),
        }
    }

    fn get_attribute(&self, key: &str) -> Option<&Value> {
        let Some(custom) = self.custom_attributes() else {
            return self.attributes().get(key);
        };
        let resolved = custom::resolve_alias(Self::KIND, key);
        if custom.contains(&resolved) {
            return custom.get(&resolved);
        }
        self.attributes().get(&resolved)
    }

    fn set_attribute(&mut self, key: &str, value: Value) {
        if self.attributes().is_declared(key) {
            self.attributes_mut().set(key, value);
            return;
        }
        if let Some(custom) = self.custom_attributes_mut() {
            custom.set(custom::resolve_alias(Self::KIND, key), value);
        }
    }

    fn set_attributes<I>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        for (key, value) in attributes {
            self.set_attribute(&key, value);
        }
    }

    /// True when the attribute resolves to a non-null value.
    fn has_attribute(&self, key: &str) -> bool {
        self.get_attribute(key).is_some()
    }

    fn unset_attribute(&mut self, key: &str) {
        self.set_attribute(key, Value::Null);
    }

    fn key_name(&self) -> &'static str {
        Self::PRIMARY_KEY
    }

    fn key(&self) -> Option<&Value> {
        self.get_attribute(Self::PRIMARY_KEY)
    }

    fn set_key(&mut self, value: Value) {
        self.set_attribute(Self::PRIMARY_KEY, value);
    }

    fn nullable_attributes(&self) -> Map<String, Value> {
        self.attributes()
            .iter()
            .filter(|(key, _)| Self::NULLABLE.contains(key))
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    fn non_nullable_attributes(&self) -> Map<String, Value> {
        self.attributes()
            .iter()
            .filter(|(key, _)| !Self::NULLABLE.contains(key))
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    /// Declared attributes worth sending: nullable keys as-is, other keys only when set.
    fn filled_attributes(&self) -> Map<String, Value> {
        self.attributes()
            .iter()
            .filter(|(key, value)| Self::NULLABLE.contains(key) || !value.is_null())
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    /// Payload object for create/update calls; includes custom attributes when present.
    fn outbound_attributes(&self) -> Map<String, Value> {
        let mut filled = self.filled_attributes();
        if let Some(custom) = self.custom_attributes() {
            for (key, value) in custom.iter() {
                filled.insert(key.to_string(), value.clone());
            }
        }
        filled
    }

    /// Every attribute, declared and custom, nulls included.
    fn to_map(&self) -> Map<String, Value> {
        let mut map = self.attributes().to_map();
        if let Some(custom) = self.custom_attributes() {
            for (key, value) in custom.iter() {
                map.insert(key.to_string(), value.clone());
            }
        }
        map
    }

    fn to_json(&self) -> String {
        Value::Object(self.to_map()).to_string()
    }

    /// Detached copy with the primary key cleared, ready to be created as new.
    fn replicate(&self) -> Self {
        let mut copy = self.clone();
        copy.set_key(Value::Null);
        copy
    }
}

/// Records whose server-side schema can be extended with custom fields.
pub trait HasCustomAttributes: Record {
    fn custom(&self) -> &CustomAttributeBag;

    fn custom_mut(&mut self) -> &mut CustomAttributeBag;

    fn all_attributes(&self) -> Map<String, Value> {
        self.to_map()
    }

    /// Filled declared attributes plus every custom attribute.
    fn all_filled_attributes(&self) -> Map<String, Value> {
        self.outbound_attributes()
    }

    fn custom_attribute_map(&self) -> Map<String, Value> {
        self.custom().to_map()
    }

    fn clear_custom_attribute(&mut self, key: &str) {
        self.custom_mut().clear(key);
    }

    fn clear_custom_attributes(&mut self, keys: &[&str]) {
        self.custom_mut().clear_all(keys);
    }

    fn map_custom_attribute(alias: impl Into<String>, system_name: impl Into<String>) {
        custom::map_alias(Self::KIND, alias, system_name);
    }

    fn map_custom_attributes<I, A, S>(mappings: I)
    where
        I: IntoIterator<Item = (A, S)>,
        A: Into<String>,
        S: Into<String>,
    {
        for (alias, system_name) in mappings {
            custom::map_alias(Self::KIND, alias, system_name);
        }
    }

    fn unmap_custom_attribute(alias: &str) {
        custom::unmap_alias(Self::KIND, alias);
    }

    fn unmap_custom_attributes(aliases: &[&str]) {
        custom::unmap_aliases(Self::KIND, aliases);
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
