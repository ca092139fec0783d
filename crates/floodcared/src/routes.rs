//! API routes for floodcared
//!
//! Handlers answer with JSON; failures carry `{"error": ...}` and the status
//! code of the underlying [`FloodError`]. Staff routes check the admin
//! session before touching the store.

use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use floodcare_common::advice::{advise, check_question};
use floodcare_common::api::{
    AdviceRequest, AdviceResponse, AnnouncementRequest, AnnouncementsResponse, ChangeResponse,
    ErrorBody, HealthResponse, LoginRequest, QueueResponse, QuickReportRequest, SessionResponse,
    SosRequest, SosResponse, SubmitResponse, SyncResponse,
};
use floodcare_common::classifier::AssessmentSource;
use floodcare_common::gateway::submit_detached;
use floodcare_common::geo::{locate_within, LOCATION_ADVISORY};
use floodcare_common::intake::{build_report, next_free_id, quick_report, sos_report, ReportDraft};
use floodcare_common::{Announcement, FloodError, Report};
use std::sync::Arc;
use tracing::{info, warn};

type AppStateArc = Arc<AppState>;
type ApiError = (StatusCode, Json<ErrorBody>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn reject(e: FloodError) -> ApiError {
    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if e.is_client_error() {
        info!("  Rejected request: {}", e);
    } else {
        warn!("  Request failed: {}", e);
    }
    (status, Json(ErrorBody { error: e.to_string() }))
}

fn require_admin(state: &AppState) -> Result<(), ApiError> {
    state.session.require().map_err(reject)
}

/// Give the report a free id, store it, and push it without waiting
async fn accept_report(state: &AppState, mut report: Report) -> Report {
    {
        let mut store = state.store.write().await;
        report.id = next_free_id(&report.id, |id| store.contains_report(id));
        store.add_report(report.clone());
    }
    info!(
        "  Report {} from {} ({}, {})",
        report.id, report.student_name, report.category, report.risk_level
    );
    submit_detached(state.gateway.clone(), report.clone());
    report
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    let store = state.store.read().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: floodcare_common::VERSION.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        reports: store.reports().len(),
        unresolved: store.unresolved_count(),
        announcements: store.announcements().len(),
        sync_state: state.sync.state(),
        merge_policy: state.sync.policy(),
        remote_configured: state.remote_configured,
        model_enabled: state.advisor.is_enabled(),
    })
}

// ============================================================================
// Report Routes
// ============================================================================

pub fn report_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/reports", post(submit_report))
        .route("/v1/reports/quick", post(submit_quick))
        .route("/v1/reports/sos", post(submit_sos))
        .route("/v1/reports/queue", get(report_queue))
        .route("/v1/reports/:id/resolve", post(resolve_report))
        .route("/v1/reports/:id", delete(delete_report))
}

async fn submit_report(
    State(state): State<AppStateArc>,
    Json(draft): Json<ReportDraft>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let (report, assessment) = build_report(draft, state.classifier.as_ref(), Utc::now())
        .await
        .map_err(reject)?;
    let report = accept_report(&state, report).await;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse { report, source: assessment.source, summary: assessment.summary }),
    ))
}

async fn submit_quick(
    State(state): State<AppStateArc>,
    Json(req): Json<QuickReportRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let report = quick_report(req.status, &req.name, &req.phone, Utc::now()).map_err(reject)?;
    let report = accept_report(&state, report).await;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse { report, source: AssessmentSource::Keyword, summary: None }),
    ))
}

async fn submit_sos(
    State(state): State<AppStateArc>,
    Json(req): Json<SosRequest>,
) -> (StatusCode, Json<SosResponse>) {
    let location = match req.location {
        Some(location) => Some(location),
        None => locate_within(state.locator.as_ref(), state.sos_timeout).await,
    };
    let advisory = location.is_none().then(|| LOCATION_ADVISORY.to_string());

    let report = accept_report(&state, sos_report(location, Utc::now())).await;
    warn!("  SOS signal {} at {}", report.id, report.dormitory);

    (StatusCode::CREATED, Json(SosResponse { report, advisory }))
}

async fn report_queue(State(state): State<AppStateArc>) -> ApiResult<QueueResponse> {
    require_admin(&state)?;
    let store = state.store.read().await;

    Ok(Json(QueueResponse {
        reports: store.priority_queue(),
        unresolved: store.unresolved_count(),
    }))
}

async fn resolve_report(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> ApiResult<ChangeResponse> {
    require_admin(&state)?;
    let changed = state.store.write().await.resolve(&id);
    if changed {
        info!("  Report {} resolved", id);
    }
    Ok(Json(ChangeResponse { id, changed }))
}

async fn delete_report(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> ApiResult<ChangeResponse> {
    require_admin(&state)?;
    let changed = state.store.write().await.delete_report(&id);
    if changed {
        info!("  Report {} deleted", id);
    }
    Ok(Json(ChangeResponse { id, changed }))
}

// ============================================================================
// Announcement Routes
// ============================================================================

pub fn announcement_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/announcements", get(list_announcements).post(post_announcement))
        .route("/v1/announcements/:id", delete(delete_announcement))
}

async fn list_announcements(State(state): State<AppStateArc>) -> Json<AnnouncementsResponse> {
    let store = state.store.read().await;
    Json(AnnouncementsResponse { announcements: store.announcements().to_vec() })
}

async fn post_announcement(
    State(state): State<AppStateArc>,
    Json(req): Json<AnnouncementRequest>,
) -> Result<(StatusCode, Json<Announcement>), ApiError> {
    require_admin(&state)?;
    if req.title.trim().is_empty() {
        return Err(reject(FloodError::Validation("title is required".to_string())));
    }

    let announcement = Announcement::new(req.title.trim(), req.content.trim(), req.kind);
    state.store.write().await.post_announcement(announcement.clone());
    info!("  Announcement posted: {} ({})", announcement.title, announcement.kind);

    Ok((StatusCode::CREATED, Json(announcement)))
}

async fn delete_announcement(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> ApiResult<ChangeResponse> {
    require_admin(&state)?;
    let changed = state.store.write().await.delete_announcement(&id);
    Ok(Json(ChangeResponse { id, changed }))
}

// ============================================================================
// Admin Session Routes
// ============================================================================

pub fn admin_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/admin/login", post(admin_login))
        .route("/v1/admin/logout", post(admin_logout))
        .route("/v1/admin/session", get(admin_session))
}

async fn admin_login(
    State(state): State<AppStateArc>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<SessionResponse> {
    state.session.login(&req.password).map_err(reject)?;
    Ok(Json(SessionResponse { authenticated: true }))
}

async fn admin_logout(State(state): State<AppStateArc>) -> ApiResult<SessionResponse> {
    state.session.logout().map_err(reject)?;
    Ok(Json(SessionResponse { authenticated: false }))
}

async fn admin_session(State(state): State<AppStateArc>) -> Json<SessionResponse> {
    Json(SessionResponse { authenticated: state.session.is_authenticated() })
}

// ============================================================================
// Sync Routes
// ============================================================================

pub fn sync_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/sync", post(sync_now))
}

async fn sync_now(State(state): State<AppStateArc>) -> Json<SyncResponse> {
    let outcome = state.sync.run_once().await;
    let reports = state.store.read().await.reports().len();
    Json(SyncResponse { outcome, reports })
}

// ============================================================================
// Advice Routes
// ============================================================================

pub fn advice_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/advice", post(ask_advice))
}

async fn ask_advice(
    State(state): State<AppStateArc>,
    Json(req): Json<AdviceRequest>,
) -> ApiResult<AdviceResponse> {
    check_question(&req.message).map_err(reject)?;
    let reply = advise(&state.advisor, &req.history, &req.message).await;
    Ok(Json(AdviceResponse { reply }))
}
