use crate::errors::IntakeError;
use crate::handler::FormHandler;
use crate::metrics_defs::{REQUEST_DURATION, SUBMISSIONS};
use crate::request::IncomingRequest;
use crate::sink::SpreadsheetSink;
use http_body_util::combinators::BoxBody;
use http_body_util::BodyExt;
use hyper::body::{Body, Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use shared::http::make_boxed_error_response;
use shared::{counter, histogram};
use sheets::SheetsClient;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

/// Hyper glue around [`FormHandler`].
///
/// Every request gets its own spreadsheet session, so an access token never
/// outlives the submission it was fetched for.
#[derive(Clone)]
pub struct IntakeService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    handler: FormHandler,
    client: SheetsClient,
    sheet_title: String,
}

impl IntakeService {
    pub fn new(handler: FormHandler, client: SheetsClient, sheet_title: impl Into<String>) -> Self {
        IntakeService {
            inner: Arc::new(ServiceInner {
                handler,
                client,
                sheet_title: sheet_title.into(),
            }),
        }
    }
}

impl ServiceInner {
    async fn respond<B>(&self, req: Request<B>) -> Response<BoxBody<Bytes, IntakeError>>
    where
        B: Body<Data = Bytes>,
        B::Error: Display,
    {
        let started = Instant::now();
        let response = self.process(req).await;

        histogram!(REQUEST_DURATION, "status" => response.status().as_u16().to_string())
            .record(started.elapsed().as_secs_f64());
        response
    }

    async fn process<B>(&self, req: Request<B>) -> Response<BoxBody<Bytes, IntakeError>>
    where
        B: Body<Data = Bytes>,
        B::Error: Display,
    {
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read request body");
                counter!(SUBMISSIONS, "outcome" => "unreadable_body").increment(1);
                return make_boxed_error_response(StatusCode::BAD_REQUEST);
            }
        };

        let request = IncomingRequest::from_parts(&parts, &body);
        let sink = SpreadsheetSink::new(self.client.document(), self.sheet_title.as_str());

        match self.handler.handle(&request, &sink).await {
            Ok(outcome) => {
                counter!(SUBMISSIONS, "outcome" => outcome.outcome.as_str()).increment(1);
                if let Some(message) = &outcome.message {
                    tracing::debug!(%message, "Recorded form submission");
                }

                match outcome.response.into_http() {
                    Ok(response) => response.map(|body| body.map_err(|e| match e {}).boxed()),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to build response");
                        make_boxed_error_response(StatusCode::INTERNAL_SERVER_ERROR)
                    }
                }
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    spreadsheet_id = self.client.spreadsheet_id(),
                    "Failed to record form submission"
                );
                counter!(SUBMISSIONS, "outcome" => "error").increment(1);
                make_boxed_error_response(StatusCode::BAD_GATEWAY)
            }
        }
    }
}

impl Service<Request<Incoming>> for IntakeService {
    type Response = Response<BoxBody<Bytes, Self::Error>>;
    type Error = IntakeError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.respond(req).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use http_body_util::Full;
    use sheets::testutils::{MockSheetsServer, TEST_SHEET_TITLE, test_config};

    const HEADERS: &[&str] = &["timestamp", "formName", "formData", "country", "locale", "ua"];

    fn service(server: &MockSheetsServer, sheet_title: &str) -> IntakeService {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap();
        let handler = FormHandler::new("www.example.com", Arc::new(FixedClock(now)));
        let client = SheetsClient::new(&test_config(server)).unwrap();
        IntakeService::new(handler, client, sheet_title)
    }

    fn submission(method: &str, referer: &str, body: &'static str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri("/")
            .header("referer", referer)
            .header("content-type", "application/x-www-form-urlencoded")
            .header("x-country", "NL")
            .header("user-agent", "curl/8.0")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    async fn body_string(response: Response<BoxBody<Bytes, IntakeError>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_submission_is_appended() {
        let server = MockSheetsServer::start(HEADERS).await;
        let service = service(&server, TEST_SHEET_TITLE);

        let response = service
            .inner
            .respond(submission("POST", "https://example.com/", "form-name=contact&msg=hello"))
            .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "https://example.com/success.html"
        );
        assert_eq!(response.headers().get("cache-control").unwrap(), "no-cache");
        assert_eq!(body_string(response).await, "{}");

        assert_eq!(
            server.appended(),
            vec![vec![
                "2024-05-01T10:20:30.000Z".to_string(),
                "contact".to_string(),
                r#"{"msg":"hello"}"#.to_string(),
                "NL".to_string(),
                String::new(),
                "curl/8.0".to_string(),
            ]]
        );
    }

    #[tokio::test]
    async fn test_foreign_origin_never_reaches_spreadsheet() {
        let server = MockSheetsServer::start(HEADERS).await;
        let service = service(&server, TEST_SHEET_TITLE);

        let response = service
            .inner
            .respond(submission("POST", "https://evil.com/", "form-name=contact"))
            .await;

        assert_eq!(response.status().as_u16(), 418);
        assert_eq!(body_string(response).await, r#"{"status":"I'm a teapot"}"#);
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_method() {
        let server = MockSheetsServer::start(HEADERS).await;
        let service = service(&server, TEST_SHEET_TITLE);

        let response = service
            .inner
            .respond(submission("GET", "https://www.example.com/", ""))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        assert_eq!(body_string(response).await, r#"{"status":"invalid-method"}"#);
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_sheet_still_redirects() {
        let server = MockSheetsServer::start(HEADERS).await;
        let service = service(&server, "Leads");

        let response = service
            .inner
            .respond(submission("POST", "https://example.com/", "form-name=contact"))
            .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert!(server.appended().is_empty());
    }

    #[tokio::test]
    async fn test_spreadsheet_failure_is_bad_gateway() {
        let server = MockSheetsServer::start(HEADERS).await;
        server.fail_appends();
        let service = service(&server, TEST_SHEET_TITLE);

        let response = service
            .inner
            .respond(submission("POST", "https://example.com/", "form-name=contact"))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_string(response).await, "Bad Gateway\n");
    }

    #[tokio::test]
    async fn test_rejected_credentials_are_bad_gateway() {
        let server = MockSheetsServer::start(HEADERS).await;
        server.reject_tokens();
        let service = service(&server, TEST_SHEET_TITLE);

        let response = service
            .inner
            .respond(submission("POST", "https://example.com/", "form-name=contact"))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(server.appended().is_empty());
    }

    #[tokio::test]
    async fn test_serves_over_tcp() {
        let server = MockSheetsServer::start(HEADERS).await;
        let service = service(&server, TEST_SHEET_TITLE);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(shared::http::serve(listener, service));

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();
        let response = client
            .post(format!("http://{addr}/"))
            .header("referer", "https://www.example.com/")
            .header("x-language", "en-US")
            .body("form-name=newsletter&email=a%40b.com")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 302);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "https://example.com/success.html"
        );

        let appended = server.appended();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0][1], "newsletter");
        assert_eq!(appended[0][2], r#"{"email":"a@b.com"}"#);
        assert_eq!(appended[0][4], "en-US");
    }
}
