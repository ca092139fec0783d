//! Remote Sync Gateway - the spreadsheet webhook
//!
//! The endpoint only knows two things: append one row (POST) and return
//! every row (GET). Neither surfaces errors to callers: a failed push is
//! logged and the local copy stays the only record, a failed pull returns
//! an empty list which callers treat as "no update".

use crate::config::RemoteConfig;
use crate::sheet_format::{parse_sheet_reports, SheetRow};
use crate::types::Report;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[async_trait]
pub trait ReportGateway: Send + Sync {
    /// Push one report. Best-effort; never fails.
    async fn submit(&self, report: &Report);

    /// Every report the remote holds, newest-first. Empty on any failure.
    async fn fetch_all(&self) -> Vec<Report>;
}

/// Push without waiting for the network
pub fn submit_detached(gateway: Arc<dyn ReportGateway>, report: Report) -> JoinHandle<()> {
    tokio::spawn(async move {
        gateway.submit(&report).await;
    })
}

/// Gateway backed by a spreadsheet web-app URL
pub struct SheetGateway {
    endpoint: String,
    http: reqwest::Client,
}

impl SheetGateway {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, crate::FloodError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("FloodCare/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| crate::FloodError::Remote(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { endpoint: endpoint.to_string(), http })
    }

    /// Build from config; an unset endpoint gives the offline gateway
    pub fn from_config(config: &RemoteConfig) -> Result<Arc<dyn ReportGateway>, crate::FloodError> {
        match config.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            Some(endpoint) => {
                info!("Remote sheet endpoint: {}", endpoint);
                let gateway = Self::new(endpoint, Duration::from_secs(config.timeout_secs))?;
                Ok(Arc::new(gateway))
            }
            None => {
                warn!("No remote endpoint configured, running offline");
                Ok(Arc::new(OfflineGateway))
            }
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn try_fetch(&self) -> Result<Vec<Report>, String> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| e.to_string())?;
        parse_sheet_reports(&body, Utc::now())
            .ok_or_else(|| "response is not a list of records".to_string())
    }
}

#[async_trait]
impl ReportGateway for SheetGateway {
    async fn submit(&self, report: &Report) {
        let row = SheetRow::from_report(report, Utc::now());

        // The response is never inspected; the web app answers with a redirect
        // whose body carries nothing we can rely on.
        match self.http.post(&self.endpoint).json(&row).send().await {
            Ok(_) => info!("Report {} sent to sheet", report.id),
            Err(e) => error!("Failed to send report {} to sheet: {}", report.id, e),
        }
    }

    async fn fetch_all(&self) -> Vec<Report> {
        match self.try_fetch().await {
            Ok(reports) => {
                debug!("Fetched {} reports from sheet", reports.len());
                reports
            }
            Err(e) => {
                error!("Cannot fetch reports from sheet: {}", e);
                Vec::new()
            }
        }
    }
}

/// Gateway used when no endpoint is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineGateway;

#[async_trait]
impl ReportGateway for OfflineGateway {
    async fn submit(&self, report: &Report) {
        debug!("Offline: report {} kept locally only", report.id);
    }

    async fn fetch_all(&self) -> Vec<Report> {
        Vec::new()
    }
}
