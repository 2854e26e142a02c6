// ==========================================
// Testes do cliente do serviço de diagnóstico (wiremock)
// ==========================================
// Cobertura do contrato HTTP: sucesso, rate limit, erro da API e
// resposta sem o JSON esperado.
// ==========================================

use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use amvali_core::advisor::{AdvisorError, ClaudeAdvisor, ComplexityAdvisor, DiagnosisRequest};
use amvali_core::domain::types::{Complexity, ProjectType};

fn sample_request() -> DiagnosisRequest {
    DiagnosisRequest {
        title: "Construção Creche Municipal".to_string(),
        project_type: ProjectType::Edificacao,
        description: "Creche com capacidade para 120 crianças".to_string(),
        location: Some("Guaramirim".to_string()),
        scope: None,
        purpose: Some("Ampliar vagas de educação infantil".to_string()),
        impact_score: 9,
        urgency_score: 8,
    }
}

fn advisor_for(server: &MockServer) -> ClaudeAdvisor {
    ClaudeAdvisor::with_base_url(
        "chave-de-teste".to_string(),
        "modelo-de-teste".to_string(),
        5,
        server.uri(),
    )
}

/// Corpo no formato da API de mensagens com um bloco de texto
fn messages_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "content": [
            { "type": "text", "text": text }
        ]
    })
}

#[tokio::test]
async fn test_diagnose_parses_successful_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header_exists("x-api-key"))
        .and(header_exists("anthropic-version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_body(
            r#"{"complexity": "alta", "justification": "edificação de grande porte", "confidence": 0.85, "recommendations": ["sondagem do terreno"]}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let advisor = advisor_for(&server);
    let diagnosis = advisor.diagnose(&sample_request()).await.unwrap();
    assert_eq!(diagnosis.complexity, Complexity::Alta);
    assert_eq!(diagnosis.confidence, 0.85);
    assert_eq!(
        diagnosis.recommendations,
        vec!["sondagem do terreno".to_string()]
    );
}

#[tokio::test]
async fn test_diagnose_maps_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
        .mount(&server)
        .await;

    let advisor = advisor_for(&server);
    let err = advisor.diagnose(&sample_request()).await.unwrap_err();
    match err {
        AdvisorError::RateLimited { retry_after_ms } => assert_eq!(retry_after_ms, 3000),
        other => panic!("esperava RateLimited, obtive {:?}", other),
    }
}

#[tokio::test]
async fn test_diagnose_maps_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("erro interno"))
        .mount(&server)
        .await;

    let advisor = advisor_for(&server);
    let err = advisor.diagnose(&sample_request()).await.unwrap_err();
    match err {
        AdvisorError::Api { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("erro interno"));
        }
        other => panic!("esperava Api, obtive {:?}", other),
    }
}

#[tokio::test]
async fn test_diagnose_rejects_response_without_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(messages_body("não consegui analisar o projeto")),
        )
        .mount(&server)
        .await;

    let advisor = advisor_for(&server);
    let err = advisor.diagnose(&sample_request()).await.unwrap_err();
    assert!(matches!(err, AdvisorError::InvalidResponse(_)));
}
