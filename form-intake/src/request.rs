use hyper::body::Bytes;
use std::collections::HashMap;

/// One inbound form submission, as delivered by the hosting platform.
///
/// Header names are stored lower-cased.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncomingRequest {
    pub method: String,
    pub body: String,
    pub headers: HashMap<String, String>,
}

impl IncomingRequest {
    pub fn new<M, B, I, K, V>(method: M, body: B, headers: I) -> Self
    where
        M: Into<String>,
        B: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        IncomingRequest {
            method: method.into(),
            body: body.into(),
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
                .collect(),
        }
    }

    /// Header values that are not visible ASCII are skipped; the body is decoded lossily.
    pub fn from_parts(parts: &http::request::Parts, body: &Bytes) -> Self {
        let headers = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        IncomingRequest {
            method: parts.method.as_str().to_string(),
            body: String::from_utf8_lossy(body).into_owned(),
            headers,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn referer(&self) -> Option<&str> {
        self.header("referer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = IncomingRequest::new(
            "POST",
            "a=b",
            [("Referer", "https://example.com/"), ("X-Country", "DE")],
        );

        assert_eq!(request.referer(), Some("https://example.com/"));
        assert_eq!(request.header("x-country"), Some("DE"));
        assert_eq!(request.header("X-COUNTRY"), Some("DE"));
        assert_eq!(request.header("x-language"), None);
    }

    #[test]
    fn test_from_parts() {
        let (parts, ()) = http::Request::builder()
            .method("POST")
            .uri("/submit")
            .header("referer", "https://example.com/")
            .header("User-Agent", "Mozilla/5.0")
            .header("x-binary", http::HeaderValue::from_bytes(b"caf\xe9").unwrap())
            .body(())
            .unwrap()
            .into_parts();

        let request = IncomingRequest::from_parts(&parts, &Bytes::from_static(b"form-name=contact"));

        assert_eq!(request.method, "POST");
        assert_eq!(request.body, "form-name=contact");
        assert_eq!(request.header("user-agent"), Some("Mozilla/5.0"));
        assert_eq!(request.header("x-binary"), None);
    }
}
