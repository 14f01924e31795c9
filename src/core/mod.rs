// Core modules implementing attribute modeling, marshaling, and error modeling.
pub mod attributes;
pub mod cast;
pub mod custom;
pub mod envelope;
pub mod error;
pub mod record;
pub mod results;
