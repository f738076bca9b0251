use crate::validate::normalize_domain;
use http_body_util::Full;
use hyper::body::Bytes;
use serde_json::json;

/// Status, headers and JSON body of a reply to the form host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormResponse {
    pub status_code: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl FormResponse {
    /// Origin mismatch.
    pub fn teapot() -> Self {
        FormResponse {
            status_code: 418,
            headers: Vec::new(),
            body: json!({ "status": "I'm a teapot" }).to_string(),
        }
    }

    pub fn invalid_method() -> Self {
        FormResponse {
            status_code: 400,
            headers: vec![
                ("Access-Control-Allow-Origin", "*".to_string()),
                ("Access-Control-Allow-Headers", "Content-Type".to_string()),
            ],
            body: json!({ "status": "invalid-method" }).to_string(),
        }
    }

    /// Sends the browser to `https://{domain}/success.html`.
    pub fn redirect(domain: &str) -> Self {
        FormResponse {
            status_code: 302,
            headers: vec![
                ("Location", format!("{}success.html", normalize_domain(domain))),
                ("Cache-Control", "no-cache".to_string()),
            ],
            body: json!({}).to_string(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn into_http(self) -> Result<http::Response<Full<Bytes>>, http::Error> {
        let mut builder = http::Response::builder().status(self.status_code);
        for (name, value) in &self.headers {
            builder = builder.header(*name, value);
        }
        builder.body(Full::new(Bytes::from(self.body)))
    }
}
