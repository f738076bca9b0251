//! Decides what to do with one submission and records it when accepted.

use crate::clock::Clock;
use crate::errors::IntakeError;
use crate::request::IncomingRequest;
use crate::response::FormResponse;
use crate::row::build_row;
use crate::sink::RowSink;
use crate::validate::{is_valid_domain, is_valid_request};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The referer did not match the apex domain.
    Teapot,
    InvalidMethod,
    /// The row was handed to the sink.
    Redirected,
}

impl Outcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Outcome::Teapot => "teapot",
            Outcome::InvalidMethod => "invalid_method",
            Outcome::Redirected => "redirected",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerOutcome {
    pub outcome: Outcome,
    pub response: FormResponse,
    /// Summary of the recorded submission. Only set on redirect.
    pub message: Option<String>,
}

impl HandlerOutcome {
    fn rejected(outcome: Outcome, response: FormResponse) -> Self {
        HandlerOutcome {
            outcome,
            response,
            message: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FormHandler {
    domain: String,
    clock: Arc<dyn Clock>,
}

impl FormHandler {
    pub fn new(domain: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        FormHandler {
            domain: domain.into(),
            clock,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The origin check runs before the method check, so a cross-site `GET`
    /// still gets the teapot. The sink is only called once both pass; its
    /// errors are returned as is.
    pub async fn handle(
        &self,
        request: &IncomingRequest,
        sink: &dyn RowSink,
    ) -> Result<HandlerOutcome, IntakeError> {
        if !is_valid_domain(&self.domain, request.referer()) {
            tracing::debug!(
                referer = request.referer().unwrap_or("-"),
                "Rejecting submission from foreign origin"
            );
            return Ok(HandlerOutcome::rejected(
                Outcome::Teapot,
                FormResponse::teapot(),
            ));
        }

        if !is_valid_request(&request.method, &request.body) {
            tracing::debug!(method = %request.method, "Rejecting submission with invalid method or empty body");
            return Ok(HandlerOutcome::rejected(
                Outcome::InvalidMethod,
                FormResponse::invalid_method(),
            ));
        }

        let row = build_row(request, self.clock.now())?;
        sink.append(&row).await?;

        Ok(HandlerOutcome {
            outcome: Outcome::Redirected,
            response: FormResponse::redirect(&self.domain),
            message: Some(row.summary()),
        })
    }
}
