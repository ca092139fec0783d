//! HTTP client for communicating with floodcared.

use crate::errors::CtlError;
use floodcare_common::api::{
    AdviceRequest, AdviceResponse, AnnouncementRequest, AnnouncementsResponse, ChangeResponse,
    ErrorBody, HealthResponse, LoginRequest, QueueResponse, QuickReportRequest, SessionResponse,
    SosRequest, SosResponse, SubmitResponse, SyncResponse,
};
use floodcare_common::intake::ReportDraft;
use floodcare_common::Announcement;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Long enough for an SOS locate plus a model-tier classification
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the floodcared JSON API
pub struct FloodClient {
    http: reqwest::Client,
    base_url: String,
}

impl FloodClient {
    pub fn new(base_url: &str) -> Result<Self, CtlError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CtlError::Input(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.http.request(method, url)
    }

    /// Send and decode, turning `{"error": ...}` answers into `CtlError::Api`
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CtlError> {
        let response = request.send().await.map_err(|e| CtlError::Unavailable {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CtlError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, body.trim()));
            return Err(CtlError::Api { status: status.as_u16(), message });
        }

        serde_json::from_str(&body).map_err(|e| CtlError::InvalidResponse(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CtlError> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, CtlError> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, CtlError> {
        self.send(self.request(Method::POST, path)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, CtlError> {
        self.send(self.request(Method::DELETE, path)).await
    }

    pub async fn health(&self) -> Result<HealthResponse, CtlError> {
        self.get("/v1/health").await
    }

    pub async fn submit(&self, draft: &ReportDraft) -> Result<SubmitResponse, CtlError> {
        self.post("/v1/reports", draft).await
    }

    pub async fn quick(&self, request: &QuickReportRequest) -> Result<SubmitResponse, CtlError> {
        self.post("/v1/reports/quick", request).await
    }

    pub async fn sos(&self, request: &SosRequest) -> Result<SosResponse, CtlError> {
        self.post("/v1/reports/sos", request).await
    }

    pub async fn queue(&self) -> Result<QueueResponse, CtlError> {
        self.get("/v1/reports/queue").await
    }

    pub async fn resolve(&self, id: &str) -> Result<ChangeResponse, CtlError> {
        self.post_empty(&format!("/v1/reports/{}/resolve", id)).await
    }

    pub async fn delete_report(&self, id: &str) -> Result<ChangeResponse, CtlError> {
        self.delete(&format!("/v1/reports/{}", id)).await
    }

    pub async fn announcements(&self) -> Result<AnnouncementsResponse, CtlError> {
        self.get("/v1/announcements").await
    }

    pub async fn announce(&self, request: &AnnouncementRequest) -> Result<Announcement, CtlError> {
        self.post("/v1/announcements", request).await
    }

    pub async fn delete_announcement(&self, id: &str) -> Result<ChangeResponse, CtlError> {
        self.delete(&format!("/v1/announcements/{}", id)).await
    }

    pub async fn login(&self, password: &str) -> Result<SessionResponse, CtlError> {
        self.post("/v1/admin/login", &LoginRequest { password: password.to_string() }).await
    }

    pub async fn logout(&self) -> Result<SessionResponse, CtlError> {
        self.post_empty("/v1/admin/logout").await
    }

    pub async fn sync(&self) -> Result<SyncResponse, CtlError> {
        self.post_empty("/v1/sync").await
    }

    pub async fn advise(&self, request: &AdviceRequest) -> Result<AdviceResponse, CtlError> {
        self.post("/v1/advice", request).await
    }
}
