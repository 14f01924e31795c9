//! Purpose: Public client boundary for the SharpSpring API.
//! Exports: Client, config, transport seam, query builders, and form helper.
//! Role: Everything a caller or the CLI needs; record schemas live in `records`.
//! Invariants: Every operation is blocking and returns `ApiResult`.
//! Invariants: Core wire types are re-exported here rather than reached through `core`.

mod client;
mod config;
mod forms;
mod operations;
mod query;
mod transport;

pub use crate::core::cast::{Cast, cast, cast_first, cast_many, cast_one};
pub use crate::core::envelope::{RemoteErrorEntry, Request, Response};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::record::{FromAttributes, HasCustomAttributes, Record, RecordKind};
pub use crate::core::results::{CreateResult, DeleteResult, UpdateResult};
pub use client::{ApiResult, SharpspringClient};
pub use config::{
    ApiVersion, ClientConfig, DEFAULT_BASE_URL, ENV_ACCOUNT_ID, ENV_API_VERSION, ENV_BASE_URL,
    ENV_SECRET_KEY,
};
pub use forms::FormSubmission;
pub use query::{DateRange, Query, TimestampField};
pub use transport::{HttpTransport, Transport};
