//! HTTP client for the grading backend.

use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::{ReportAuth, Settings};
use crate::error::{ApiError, ApiResult};
use crate::session::Session;
use crate::types::{GradeAggregate, GradeQuery, LoginResponse};

const LOGIN_PATH: &str = "/auth/token";
const AVERAGE_GRADE_PATH: &str = "/average_grade/calculate-average-grade";

/// Client for the grading backend REST API.
///
/// Holds no login state of its own; calls that may authenticate take the
/// caller's [`Session`].
#[derive(Debug, Clone)]
pub struct RegistroClient {
    http: Client,
    base_url: String,
    report_auth: ReportAuth,
}

impl RegistroClient {
    pub fn new(settings: &Settings) -> ApiResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("registro/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            report_auth: settings.report_auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in with a form-encoded `POST /auth/token`.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Session> {
        info!(username = %username, "Logging in");

        let response = self
            .http
            .post(self.url(LOGIN_PATH))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let body: LoginResponse = Self::decode(response).await?;
        let session = Session::from_login(username, body);
        debug!(username = %session.username(), "Session started");
        Ok(session)
    }

    /// Ask the backend for per-entity grade averages.
    ///
    /// Issues exactly one request. The session token is attached only when
    /// the client is configured with [`ReportAuth::Bearer`].
    pub async fn calculate_average_grade(
        &self,
        query: &GradeQuery,
        session: Option<&Session>,
    ) -> ApiResult<Vec<GradeAggregate>> {
        debug!(
            start = %query.start_date,
            end = %query.end_date,
            filter_by = %query.filter_by,
            "Requesting average grades"
        );

        let mut request = self.http.post(self.url(AVERAGE_GRADE_PATH)).json(query);

        if let (ReportAuth::Bearer, Some(session)) = (self.report_auth, session) {
            request = request.header(header::AUTHORIZATION, session.bearer());
        }

        let response = request.send().await?;
        let aggregates: Vec<GradeAggregate> = Self::decode(response).await?;

        info!(count = aggregates.len(), filter_by = %query.filter_by, "Average grades received");
        Ok(aggregates)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Status { status, body: text });
        }

        serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_base_url() {
        let settings = Settings {
            base_url: "http://localhost:8000/".to_string(),
            report_auth: ReportAuth::Anonymous,
        };
        let client = RegistroClient::new(&settings).unwrap();

        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.url(AVERAGE_GRADE_PATH),
            "http://localhost:8000/average_grade/calculate-average-grade"
        );
    }
}
