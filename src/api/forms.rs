//! Purpose: Native form submissions through the tracking `jsonp` endpoint.
//! Exports: `FormSubmission`.
//! Role: Standalone helper; does not use the JSON-RPC envelope.
//! Invariants: The url is `base + endpoint + "/jsonp/?" + params`, tracking id last.
#![allow(clippy::result_large_err)]

use super::transport::HttpTransport;
use crate::core::error::{Error, ErrorKind};
use url::Url;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormSubmission {
    base_url: String,
    endpoint: String,
    fields: Vec<(String, String)>,
    tracking_id: Option<String>,
}

impl FormSubmission {
    pub fn new(base_url: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoint: endpoint.into(),
            fields: Vec::new(),
            tracking_id: None,
        }
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Visitor id from the `__ss_tk` cookie, sent as `trackingid__sb`.
    pub fn tracking_id(mut self, tracking_id: impl Into<String>) -> Self {
        self.tracking_id = Some(tracking_id.into());
        self
    }

    pub fn url(&self) -> Result<Url, Error> {
        let raw = format!("{}{}/jsonp/", self.base_url, self.endpoint);
        let mut url = Url::parse(&raw).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("invalid form url {raw:?}"))
                .with_source(err)
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.fields {
                pairs.append_pair(key, value);
            }
            if let Some(tracking_id) = &self.tracking_id {
                pairs.append_pair("trackingid__sb", tracking_id);
            }
        }
        Ok(url)
    }

    /// Issues the GET and returns the raw body.
    pub fn submit(&self, transport: &HttpTransport) -> Result<String, Error> {
        let url = self.url()?;
        tracing::debug!(endpoint = %self.endpoint, "submitting form");
        transport.get(&url)
    }
}

#[cfg(test)]
mod tests {
    use super::FormSubmission;
    use crate::core::error::ErrorKind;

    #[test]
    fn url_encodes_fields_and_appends_tracking_id() {
        let url = FormSubmission::new("https://Forms.Example.com/webforms/MzawMDE/", "ab12-cd34")
            .field("email", "a+b@c.co")
            .field("first name", "Ana")
            .tracking_id("tk-9")
            .url()
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://forms.example.com/webforms/MzawMDE/ab12-cd34/jsonp/\
             ?email=a%2Bb%40c.co&first+name=Ana&trackingid__sb=tk-9"
        );
    }

    #[test]
    fn url_without_fields_still_ends_in_jsonp() {
        let url = FormSubmission::new("http://forms.test/", "x1")
            .url()
            .expect("url");
        assert_eq!(url.path(), "/x1/jsonp/");
        assert!(url.query().unwrap_or_default().is_empty());
    }

    #[test]
    fn bad_base_is_usage_error() {
        let err = FormSubmission::new("not a url", "x").url().expect_err("bad base");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }
}
