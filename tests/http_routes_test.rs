// ==========================================
// Testes do contrato HTTP (Router axum)
// ==========================================
// Cobertura do boundary: extração do principal, mapeamento de erros
// para códigos estáveis e status HTTP distintos por classe.
// ==========================================

mod test_helpers;

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use amvali_core::advisor::DisabledAdvisor;
use amvali_core::app::{build_router, AppState, ErrorBody};
use amvali_core::db::open_sqlite_connection;

/// Router completo sobre um banco temporário (advisor desabilitado)
fn test_router() -> (tempfile::NamedTempFile, Router) {
    let (temp_file, db_path) = test_helpers::create_test_db();
    let conn = Arc::new(Mutex::new(
        open_sqlite_connection(&db_path).expect("falha ao abrir conexão"),
    ));
    let state =
        AppState::with_advisor(&db_path, conn, Arc::new(DisabledAdvisor)).expect("falha no estado");
    (temp_file, build_router(Arc::new(state)))
}

fn get_request(uri: &str, role: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method("GET");
    if let Some(role) = role {
        builder = builder
            .header("x-user-id", "usuario-1")
            .header("x-user-role", role);
    }
    builder.body(Body::empty()).unwrap()
}

async fn error_body(response: axum::response::Response) -> ErrorBody {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("corpo de erro inválido")
}

#[tokio::test]
async fn test_health_is_public() {
    let (_db, router) = test_router();
    let response = router
        .oneshot(get_request("/api/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_principal_is_unauthenticated() {
    let (_db, router) = test_router();
    let response = router
        .oneshot(get_request("/api/queue", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = error_body(response).await;
    assert_eq!(body.code, "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_unknown_role_is_unauthenticated() {
    let (_db, router) = test_router();
    let response = router
        .oneshot(get_request("/api/queue", Some("estagiario")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_municipal_role_gets_403_on_queue() {
    let (_db, router) = test_router();
    let response = router
        .oneshot(get_request("/api/queue", Some("municipal")))
        .await
        .unwrap();

    // Autorização é distinguível de not-found
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = error_body(response).await;
    assert_eq!(body.code, "ACCESS_DENIED");
}

#[tokio::test]
async fn test_unknown_project_is_404() {
    let (_db, router) = test_router();
    let response = router
        .oneshot(get_request("/api/projects/nao-existe", Some("gestor_amvali")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = error_body(response).await;
    assert_eq!(body.code, "NOT_FOUND");
}

#[tokio::test]
async fn test_disabled_advisor_maps_to_503() {
    let (_db, router) = test_router();
    let payload = serde_json::json!({
        "title": "Ponte",
        "description": "Ponte de 80m",
        "project_type": "infraestrutura",
    });
    let request = Request::builder()
        .uri("/api/ai/diagnose-complexity")
        .method("POST")
        .header("x-user-id", "tecnico-1")
        .header("x-user-role", "tecnico_amvali")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = error_body(response).await;
    assert_eq!(body.code, "DEPENDENCY_UNAVAILABLE");
}

#[tokio::test]
async fn test_queue_roundtrip_over_http() {
    let (_db, router) = test_router();

    // Fila vazia responde estrutura estável
    let response = router
        .clone()
        .oneshot(get_request("/api/queue", Some("tecnico_amvali")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["total"], 0);
    assert!(body["queue"].as_array().unwrap().is_empty());
}
