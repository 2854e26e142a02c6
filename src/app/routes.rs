// ==========================================
// Portal IntraAMVALI - Rotas HTTP
// ==========================================
// Montagem do Router axum + mapeamento de erros para códigos estáveis.
// O principal autenticado chega do gateway em cabeçalhos explícitos
// (x-user-id / x-user-role / x-municipality-id); sem sessão ambiente.
// ==========================================

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::api::error::ApiError;
use crate::api::{AllocateTeamRequest, DiagnoseComplexityRequest, SuggestAllocationRequest};
use crate::app::state::AppState;
use crate::domain::municipality::{EngagementUpdate, NewMunicipality};
use crate::domain::project::{NewProject, ProjectPatch};
use crate::domain::types::{Principal, ProjectStatus, StageStatus, UserRole};

// ==========================================
// Corpo de erro (contrato estável com o portal)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

fn error_parts(err: &ApiError) -> (StatusCode, &'static str) {
    match err {
        ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        ApiError::InvalidStateTransition { .. } => {
            (StatusCode::BAD_REQUEST, "INVALID_STATE_TRANSITION")
        }
        ApiError::Authorization(_) => (StatusCode::FORBIDDEN, "ACCESS_DENIED"),
        ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        ApiError::Dependency(_) => (StatusCode::SERVICE_UNAVAILABLE, "DEPENDENCY_UNAVAILABLE"),
        ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ApiError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        ApiError::DatabaseConnectionError(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_CONNECTION_ERROR")
        }
        ApiError::InternalError(_) | ApiError::Other(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = error_parts(&self);
        if status.is_server_error() {
            tracing::error!("erro interno na requisição: {}", self);
        }
        let body = ErrorBody {
            code: code.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ==========================================
// Extração do principal autenticado
// ==========================================
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| -> Option<String> {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let unauthenticated = |message: &str| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody {
                    code: "UNAUTHENTICATED".to_string(),
                    message: message.to_string(),
                }),
            )
        };

        let user_id =
            header("x-user-id").ok_or_else(|| unauthenticated("cabeçalho x-user-id ausente"))?;
        let role_raw =
            header("x-user-role").ok_or_else(|| unauthenticated("cabeçalho x-user-role ausente"))?;
        let role = UserRole::from_db_str(&role_raw)
            .ok_or_else(|| unauthenticated("papel desconhecido em x-user-role"))?;

        let mut principal = Principal::new(user_id, role);
        if let Some(municipality_id) = header("x-municipality-id") {
            principal = principal.with_municipality(municipality_id);
        }
        Ok(principal)
    }
}

// ==========================================
// DTOs de rota
// ==========================================

#[derive(Debug, Deserialize)]
struct ListProjectsParams {
    status: Option<String>,
    municipality_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StageUpdateRequest {
    stage_index: usize,
    status: StageStatus,
}

// ==========================================
// Handlers
// ==========================================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": crate::APP_NAME,
        "version": crate::VERSION,
        "status": "ok",
    }))
}

async fn create_project(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(body): Json<NewProject>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state.project_api.create(&principal, body)?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn list_projects(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(params): Query<ListProjectsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let status = match params.status.as_deref() {
        Some(raw) => Some(ProjectStatus::from_db_str(raw).ok_or_else(|| {
            ApiError::Validation(format!("status desconhecido: {}", raw))
        })?),
        None => None,
    };
    let projects = state
        .project_api
        .list(&principal, status, params.municipality_id)?;
    Ok(Json(projects))
}

async fn get_project(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.project_api.get(&principal, &id)?))
}

async fn update_project(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
    Json(body): Json<ProjectPatch>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.project_api.update(&principal, &id, body)?))
}

async fn update_project_stage(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
    Json(body): Json<StageUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.project_api.update_stage(
        &principal,
        &id,
        body.stage_index,
        body.status,
    )?))
}

async fn pause_project(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.project_api.pause(&principal, &id)?))
}

async fn resume_project(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.project_api.resume(&principal, &id)?))
}

async fn get_queue(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.queue_api.get_queue(&principal)?))
}

async fn get_team(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.team_api.get_team(&principal)?))
}

async fn allocate_team(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(body): Json<AllocateTeamRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.team_api.allocate(&principal, body)?))
}

async fn diagnose_complexity(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(body): Json<DiagnoseComplexityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.diagnosis_api.diagnose(&principal, body).await?))
}

async fn suggest_allocation(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(body): Json<SuggestAllocationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state.diagnosis_api.suggest_allocation(&principal, body).await?,
    ))
}

async fn create_municipality(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(body): Json<NewMunicipality>,
) -> Result<impl IntoResponse, ApiError> {
    let municipality = state.municipality_api.create(&principal, body)?;
    Ok((StatusCode::CREATED, Json(municipality)))
}

async fn list_municipalities(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.municipality_api.list(&principal)?))
}

async fn get_municipality(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.municipality_api.get(&principal, &id)?))
}

async fn update_engagement(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
    Json(body): Json<EngagementUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.municipality_api.update_engagement(
        &principal, &id, body,
    )?))
}

async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.dashboard_api.stats(&principal)?))
}

async fn municipality_dashboard(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state.dashboard_api.municipality_dashboard(&principal, &id)?,
    ))
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.notification_api.list(&principal)?))
}

async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.notification_api.mark_read(&principal, &id)?;
    Ok(Json(serde_json::json!({ "message": "notificação marcada como lida" })))
}

// ==========================================
// Router
// ==========================================

/// Monta o Router completo com todas as rotas e o CORS
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        // Projetos
        .route("/api/projects", post(create_project).get(list_projects))
        .route("/api/projects/{id}", get(get_project).put(update_project))
        .route("/api/projects/{id}/stage", put(update_project_stage))
        .route("/api/projects/{id}/pause", put(pause_project))
        .route("/api/projects/{id}/resume", put(resume_project))
        // Fila técnica
        .route("/api/queue", get(get_queue))
        // Equipe
        .route("/api/team", get(get_team))
        .route("/api/team/allocate", post(allocate_team))
        // Diagnóstico consultivo
        .route("/api/ai/diagnose-complexity", post(diagnose_complexity))
        .route("/api/ai/suggest-allocation", post(suggest_allocation))
        // Municípios
        .route(
            "/api/municipalities",
            post(create_municipality).get(list_municipalities),
        )
        .route("/api/municipalities/{id}", get(get_municipality))
        .route("/api/municipalities/{id}/engagement", put(update_engagement))
        // Painel
        .route("/api/dashboard/stats", get(dashboard_stats))
        .route("/api/dashboard/municipality/{id}", get(municipality_dashboard))
        // Notificações
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/{id}/read", put(mark_notification_read))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
