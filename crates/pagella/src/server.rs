use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use registro::{ApiError, GradeAggregate, GradeQuery, RegistroClient, SessionState};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::html;
use crate::pdf::{self, ExportError};
use crate::report::ReportState;

/// Application state shared across requests
pub struct AppState {
    pub client: RegistroClient,
    pub session: RwLock<SessionState>,
    pub report: RwLock<ReportState>,
    pub login_error: RwLock<Option<String>>,
}

impl AppState {
    pub fn new(client: RegistroClient) -> Self {
        Self {
            client,
            session: RwLock::new(SessionState::default()),
            report: RwLock::new(ReportState::default()),
            login_error: RwLock::new(None),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/report", post(report_handler))
        .route("/report.pdf", get(pdf_handler))
        .route("/api/averages", get(averages_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state.clone());

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!(backend = %state.client.base_url(), "Reporting against backend");
    println!("\nServer running at http://{}", addr);
    println!("Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve the analytics page
async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let report = state.report.read().await;
    let session = state.session.read().await;
    let login_error = state.login_error.read().await;
    let markup = html::render_page(&report, &session, login_error.as_deref());
    Html(markup.into_string())
}

/// Submit the form: one backend request, then back to the page.
///
/// Concurrent submissions are not cancelled; whichever response lands last
/// is what the page shows.
async fn report_handler(
    State(state): State<Arc<AppState>>,
    Form(query): Form<GradeQuery>,
) -> Redirect {
    state.report.write().await.begin(query.clone());

    let session = state.session.read().await.session().cloned();
    let result = state
        .client
        .calculate_average_grade(&query, session.as_ref())
        .await;

    state.report.write().await.apply(result);
    Redirect::to("/")
}

/// Download the current results as PDF
async fn pdf_handler(State(state): State<Arc<AppState>>) -> Response {
    let aggregates = state.report.read().await.aggregates().to_vec();

    match pdf::render_report(&aggregates) {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", pdf::REPORT_FILENAME),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(ExportError::Empty) => (StatusCode::CONFLICT, "No results to export").into_response(),
        Err(e) => {
            error!(error = %e, "Error generating PDF");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate PDF").into_response()
        }
    }
}

/// Return the current results as JSON
async fn averages_handler(State(state): State<Arc<AppState>>) -> Json<Vec<GradeAggregate>> {
    let report = state.report.read().await;
    Json(report.aggregates().to_vec())
}

async fn login_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Redirect {
    match state.client.login(&form.username, &form.password).await {
        Ok(session) => {
            info!(user = %session.username(), "Session started");
            state.session.write().await.begin(session);
            *state.login_error.write().await = None;
        }
        Err(e) => {
            warn!(user = %form.username, error = %e, "Login failed");
            let message = match e {
                ApiError::Unauthorized => "Incorrect username or password",
                _ => "Login failed",
            };
            *state.login_error.write().await = Some(message.to_string());
        }
    }
    Redirect::to("/")
}

async fn logout_handler(State(state): State<Arc<AppState>>) -> Redirect {
    if let Some(session) = state.session.write().await.end() {
        info!(user = %session.username(), "Session ended");
    }
    Redirect::to("/")
}
