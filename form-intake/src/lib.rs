//! Receives website form submissions and records them as spreadsheet rows.
//!
//! Submissions must come from the configured apex domain (checked through the
//! `Referer` header), use `POST` and carry a non-empty url-encoded body. Accepted
//! ones are appended to the configured sheet and the browser is redirected to
//! the site's success page.

pub mod clock;
pub mod config;
pub mod errors;
pub mod handler;
pub mod metrics_defs;
pub mod request;
pub mod response;
pub mod row;
pub mod service;
pub mod sink;
pub mod validate;

use crate::clock::SystemClock;
use crate::errors::IntakeError;
use crate::handler::FormHandler;
use crate::service::IntakeService;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use sheets::SheetsClient;
use std::sync::Arc;

pub async fn run(config: config::Config) -> Result<(), IntakeError> {
    config.validate()?;
    shared::metrics_defs::describe_all(metrics_defs::ALL_METRICS);

    let client = SheetsClient::new(&config.spreadsheet)?;
    let handler = FormHandler::new(config.apex_domain.clone(), Arc::new(SystemClock));
    let intake_service =
        IntakeService::new(handler, client, config.spreadsheet.sheet_title.clone());
    let admin_service = AdminService::<_, IntakeError>::new(|| true);

    tracing::info!(
        apex_domain = %config.apex_domain,
        spreadsheet_id = %config.spreadsheet.spreadsheet_id,
        sheet_title = %config.spreadsheet.sheet_title,
        "Starting form intake"
    );

    let intake_task = run_http_service(
        &config.listener.host,
        config.listener.port,
        intake_service,
    );
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        admin_service,
    );
    tokio::try_join!(intake_task, admin_task)?;
    Ok(())
}
