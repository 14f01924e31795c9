//! Purpose: The dispatcher that turns typed calls into envelopes and back.
//! Exports: `SharpspringClient`, `ApiResult`.
//! Role: Owns config, transport, and the last successful response.
//! Invariants: Remote errors never update `last_response`.
//! Invariants: Date-range discriminators are validated before the transport is touched.
//! Invariants: Calls are synchronous and never retried.
#![allow(clippy::result_large_err)]

use super::config::ClientConfig;
use super::query::{DateRange, Query};
use super::transport::{HttpTransport, Transport};
use crate::core::cast::{cast_first, cast_many};
use crate::core::envelope::{Request, Response};
use crate::core::error::{Error, ErrorKind};
use crate::core::record::{FromAttributes, Record};
use crate::core::results::{CreateResult, DeleteResult, UpdateResult};
use serde_json::{Map, Value};

pub type ApiResult<T> = Result<T, Error>;

#[derive(Debug)]
pub struct SharpspringClient<T: Transport = HttpTransport> {
    config: ClientConfig,
    transport: T,
    last_response: Option<Response>,
}

impl SharpspringClient<HttpTransport> {
    /// Client over the default HTTP transport.
    pub fn new(config: ClientConfig) -> Self {
        let transport = HttpTransport::from_config(&config);
        Self::with_transport(config, transport)
    }

    pub fn from_env() -> ApiResult<Self> {
        ClientConfig::from_env().map(Self::new)
    }
}

impl<T: Transport> SharpspringClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            last_response: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Envelope of the most recent call that succeeded.
    pub fn last_response(&self) -> Option<&Response> {
        self.last_response.as_ref()
    }

    /// Sends one call and returns its decoded `result` member.
    pub fn execute(&mut self, method: &str, params: Map<String, Value>) -> ApiResult<Value> {
        let request = Request::new(method, params);
        let payload = request.encode()?;
        let endpoint = self.config.endpoint()?;

        tracing::debug!(method, request_id = request.id(), "sending api call");
        let raw = self
            .transport
            .send(&endpoint, &payload)
            .map_err(|err| attach_method(err, method))?;
        let response = Response::decode(&request, &raw)?;

        if response.is_error() {
            let err = response.make_error();
            tracing::warn!(
                method,
                code = err.code(),
                message = err.message().unwrap_or_default(),
                "api call returned an error"
            );
            return Err(err);
        }
        if !response.id_matches() {
            tracing::warn!(
                method,
                request_id = request.id(),
                response_id = ?response.id(),
                "response id does not match request"
            );
        }
        tracing::debug!(
            method,
            call_count = response.call_count(),
            query_limit = response.query_limit(),
            "api call succeeded"
        );

        let result = response.result().clone();
        self.last_response = Some(response);
        Ok(result)
    }

    /// `result[field]` as a collection of records.
    pub(crate) fn fetch_many<R: FromAttributes>(
        &mut self,
        method: &str,
        params: Map<String, Value>,
        field: &str,
    ) -> ApiResult<Vec<R>> {
        let result = self.execute(method, params)?;
        let collection = take_field(result, method, field)?;
        cast_many(collection).map_err(|err| err.with_method(method.to_string()))
    }

    /// First element of `result[field]`; `None` when the server found nothing.
    pub(crate) fn fetch_first<R: FromAttributes>(
        &mut self,
        method: &str,
        params: Map<String, Value>,
        field: &str,
    ) -> ApiResult<Option<R>> {
        let result = self.execute(method, params)?;
        let collection = match result {
            Value::Object(mut body) => body.remove(field).unwrap_or(Value::Null),
            Value::Null => Value::Null,
            Value::Array(items) if items.is_empty() => Value::Null,
            other => return Err(missing_field(method, field, &other)),
        };
        cast_first(collection).map_err(|err| err.with_method(method.to_string()))
    }

    pub(crate) fn create_records<R: Record>(
        &mut self,
        method: &str,
        records: &[R],
    ) -> ApiResult<Vec<CreateResult>> {
        let params = objects_param(records.iter().map(Record::outbound_attributes));
        self.fetch_many(method, params, "creates")
    }

    pub(crate) fn update_records<R: Record>(
        &mut self,
        method: &str,
        records: &[R],
    ) -> ApiResult<Vec<UpdateResult>> {
        let params = objects_param(records.iter().map(Record::outbound_attributes));
        self.fetch_many(method, params, "updates")
    }

    pub(crate) fn delete_by_ids(
        &mut self,
        method: &str,
        ids: &[u64],
    ) -> ApiResult<Vec<DeleteResult>> {
        let params = objects_param(ids.iter().map(|id| {
            let mut object = Map::new();
            object.insert("id".to_string(), Value::from(*id));
            object
        }));
        self.fetch_many(method, params, "deletes")
    }

    pub(crate) fn get_by_id<R: FromAttributes>(
        &mut self,
        method: &str,
        id: u64,
        field: &str,
    ) -> ApiResult<Option<R>> {
        let mut params = Map::new();
        params.insert("id".to_string(), Value::from(id));
        self.fetch_first(method, params, field)
    }

    pub(crate) fn query<R: FromAttributes>(
        &mut self,
        method: &str,
        query: &Query,
        field: &str,
    ) -> ApiResult<Vec<R>> {
        self.fetch_many(method, query.to_params(false), field)
    }

    pub(crate) fn date_range<R: FromAttributes>(
        &mut self,
        method: &str,
        range: &DateRange,
        field: &str,
    ) -> ApiResult<Vec<R>> {
        self.fetch_many(method, range.to_params(false), field)
    }
}

pub(crate) fn objects_param<I>(objects: I) -> Map<String, Value>
where
    I: IntoIterator<Item = Map<String, Value>>,
{
    let objects: Vec<Value> = objects.into_iter().map(Value::Object).collect();
    let mut params = Map::new();
    params.insert("objects".to_string(), Value::Array(objects));
    params
}

fn take_field(result: Value, method: &str, field: &str) -> ApiResult<Value> {
    match result {
        Value::Object(mut body) => match body.remove(field) {
            Some(value) => Ok(value),
            None => Err(Error::new(ErrorKind::Cast)
                .with_message(format!("result has no {field:?} member"))
                .with_method(method.to_string())),
        },
        other => Err(missing_field(method, field, &other)),
    }
}

fn missing_field(method: &str, field: &str, found: &Value) -> Error {
    Error::new(ErrorKind::Cast)
        .with_message(format!(
            "expected result object with {field:?}, found {}",
            crate::core::record::json_type_name(found)
        ))
        .with_method(method.to_string())
}

fn attach_method(err: Error, method: &str) -> Error {
    if err.method().is_some() {
        err
    } else {
        err.with_method(method.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{SharpspringClient, objects_param};
    use crate::api::config::{ApiVersion, ClientConfig};
    use crate::api::transport::Transport;
    use crate::core::error::{Error, ErrorKind};
    use serde_json::{Map, Value, json};
    use url::Url;

    struct Echo {
        body: Value,
    }

    impl Transport for Echo {
        fn send(&self, _endpoint: &Url, payload: &str) -> Result<String, Error> {
            let request: Value = serde_json::from_str(payload).expect("payload json");
            let mut body = self.body.clone();
            body["id"] = request["id"].clone();
            Ok(body.to_string())
        }
    }

    fn client(body: Value) -> SharpspringClient<Echo> {
        SharpspringClient::with_transport(
            ClientConfig::new("acc", "key"),
            Echo { body },
        )
    }

    #[test]
    fn objects_param_wraps_each_map() {
        let mut first = Map::new();
        first.insert("id".to_string(), json!(1));
        let params = objects_param([first]);
        assert_eq!(Value::Object(params), json!({"objects": [{"id": 1}]}));
    }

    #[test]
    fn execute_records_last_response() {
        let mut client = client(json!({"result": {"success": true}, "error": []}));
        let result = client.execute("subscribeToLeadUpdates", Map::new()).expect("call");
        assert_eq!(result, json!({"success": true}));
        let last = client.last_response().expect("last response");
        assert_eq!(last.method(), "subscribeToLeadUpdates");
        assert!(last.id_matches());
    }

    #[test]
    fn config_mut_changes_the_next_endpoint() {
        let mut client = client(json!({"result": {}, "error": []}));
        let config = client.config().clone().with_api_version(ApiVersion::V1_2);
        *client.config_mut() = config;
        let endpoint = client.config().endpoint().expect("endpoint");
        assert!(endpoint.path().ends_with("/v1.2/"), "{endpoint}");
    }

    #[test]
    fn missing_collection_field_is_cast_error() {
        let mut client = client(json!({"result": {"other": []}, "error": null}));
        let err = client
            .fetch_many::<crate::records::Lead>("getLeads", Map::new(), "lead")
            .expect_err("missing field");
        assert_eq!(err.kind(), ErrorKind::Cast);
        assert_eq!(err.method(), Some("getLeads"));
    }
}
