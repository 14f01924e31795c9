//! Purpose: Turn decoded result payloads into typed records or outcome objects.
//! Exports: `Cast`, `cast`, `cast_one`, `cast_many`, `cast_first`.
//! Role: Final stage of every dispatched call.
//! Invariants: Collections keep server order.
//! Invariants: Shape mismatches are `Cast` errors; nothing is coerced silently.
#![allow(clippy::result_large_err)]

use super::error::{Error, ErrorKind};
use super::record::{FromAttributes, json_type_name};
use serde_json::Value;

/// A decoded result cast without a declared expectation of arity.
#[derive(Clone, Debug, PartialEq)]
pub enum Cast<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Cast<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Cast::One(item) => vec![item],
            Cast::Many(items) => items,
        }
    }
}

/// Arrays map element-wise; objects cast directly.
pub fn cast<T: FromAttributes>(decoded: Value) -> Result<Cast<T>, Error> {
    match decoded {
        Value::Array(items) => cast_items(items).map(Cast::Many),
        other => cast_one(other).map(Cast::One),
    }
}

pub fn cast_one<T: FromAttributes>(decoded: Value) -> Result<T, Error> {
    match decoded {
        Value::Object(attributes) => Ok(T::from_attributes(attributes)),
        other => Err(mismatch("object", &other)),
    }
}

pub fn cast_many<T: FromAttributes>(decoded: Value) -> Result<Vec<T>, Error> {
    match decoded {
        Value::Array(items) => cast_items(items),
        other => Err(mismatch("array", &other)),
    }
}

/// First element of a collection, or `None` when the collection is empty or absent.
pub fn cast_first<T: FromAttributes>(decoded: Value) -> Result<Option<T>, Error> {
    match decoded {
        Value::Null => Ok(None),
        Value::Array(items) => match items.into_iter().next() {
            Some(first) => cast_one(first).map(Some),
            None => Ok(None),
        },
        Value::Object(attributes) if attributes.is_empty() => Ok(None),
        other => cast_one(other).map(Some),
    }
}

fn cast_items<T: FromAttributes>(items: Vec<Value>) -> Result<Vec<T>, Error> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            cast_one(item).map_err(|err| {
                let message = err.message().unwrap_or("cast mismatch").to_string();
                Error::new(ErrorKind::Cast).with_message(format!("item {index}: {message}"))
            })
        })
        .collect()
}

fn mismatch(expected: &str, found: &Value) -> Error {
    Error::new(ErrorKind::Cast).with_message(format!(
        "expected {expected} in result, found {}",
        json_type_name(found)
    ))
}
