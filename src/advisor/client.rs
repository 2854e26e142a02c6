// ==========================================
// Portal IntraAMVALI - Cliente do serviço de diagnóstico
// ==========================================
// Implementação do ComplexityAdvisor sobre a API Anthropic Messages.
// Timeouts limitados: o diagnóstico nunca pode travar o workflow.
// ==========================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::error::AdvisorError;
use super::types::{
    AllocationSuggestion, AllocationSuggestionRequest, ComplexityDiagnosis, DiagnosisRequest,
    Message, MessagesRequest, MessagesResponse,
};
use super::ComplexityAdvisor;
use crate::domain::types::Complexity;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

const DIAGNOSIS_SYSTEM_PROMPT: &str = "Você é um especialista em análise de projetos de \
engenharia e infraestrutura para a AMVALI. Analise os dados do projeto e classifique sua \
complexidade em: 'minima', 'media' ou 'alta'. Considere: escopo, localização, tipo de \
projeto, finalidade, impacto regional. Responda somente em JSON: \
{\"complexity\": \"minima|media|alta\", \"justification\": \"...\", \
\"confidence\": 0.0-1.0, \"recommendations\": [...]}";

const ALLOCATION_SYSTEM_PROMPT: &str = "Você é um especialista em gestão de equipes técnicas \
da AMVALI. Sugira a melhor alocação de equipe considerando especialidades, carga de trabalho \
e complexidade do projeto. Responda somente em JSON: \
{\"suggested_team\": [\"id1\", \"id2\"], \"reasoning\": \"...\", \"workload_impact\": \"...\"}";

// ==========================================
// ClaudeAdvisor
// ==========================================
pub struct ClaudeAdvisor {
    api_key: String,
    model: String,
    client: Client,
    base_url: String,
}

impl ClaudeAdvisor {
    /// # Parâmetros
    /// - api_key: chave da API externa
    /// - model: identificador do modelo (config advisor/modelo)
    /// - timeout_secs: limite total por requisição (config advisor/timeout_segundos)
    pub fn new(api_key: String, model: String, timeout_secs: u64) -> Self {
        Self::with_base_url(api_key, model, timeout_secs, API_URL.to_string())
    }

    /// Cliente apontando para uma URL alternativa (testes)
    pub fn with_base_url(
        api_key: String,
        model: String,
        timeout_secs: u64,
        base_url: String,
    ) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("falha ao construir o cliente HTTP");
        Self {
            api_key,
            model,
            client,
            base_url,
        }
    }

    async fn send(&self, system: &str, user_text: String) -> Result<String, AdvisorError> {
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: system.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: user_text,
            }],
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(1000);
            return Err(AdvisorError::RateLimited {
                retry_after_ms: retry_after,
            });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "erro desconhecido".to_string());
            return Err(AdvisorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<MessagesResponse>().await?;
        let text = body
            .content
            .iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text.clone())
            .ok_or_else(|| {
                AdvisorError::InvalidResponse("resposta sem bloco de texto".to_string())
            })?;
        Ok(text)
    }
}

#[async_trait]
impl ComplexityAdvisor for ClaudeAdvisor {
    async fn diagnose(
        &self,
        request: &DiagnosisRequest,
    ) -> Result<ComplexityDiagnosis, AdvisorError> {
        let user_text = format!(
            "Analise este projeto:\n\
             - Título: {}\n\
             - Tipo: {}\n\
             - Descrição: {}\n\
             - Localização: {}\n\
             - Escopo: {}\n\
             - Finalidade: {}\n\
             - Impacto (1-10): {}\n\
             - Urgência (1-10): {}",
            request.title,
            request.project_type,
            request.description,
            request.location.as_deref().unwrap_or("N/A"),
            request.scope.as_deref().unwrap_or("N/A"),
            request.purpose.as_deref().unwrap_or("N/A"),
            request.impact_score,
            request.urgency_score,
        );

        let text = self.send(DIAGNOSIS_SYSTEM_PROMPT, user_text).await?;
        parse_diagnosis(&text)
    }

    async fn suggest_allocation(
        &self,
        request: &AllocationSuggestionRequest,
    ) -> Result<AllocationSuggestion, AdvisorError> {
        let team_json = serde_json::to_string_pretty(&request.team)
            .map_err(|e| AdvisorError::InvalidResponse(e.to_string()))?;
        let complexity = request
            .complexity
            .map(|c| c.to_string())
            .unwrap_or_else(|| "não classificada".to_string());

        let user_text = format!(
            "Projeto:\n\
             - Título: {}\n\
             - Tipo: {}\n\
             - Complexidade: {}\n\
             - Prioridade: {} estrelas\n\n\
             Equipe disponível:\n{}",
            request.title, request.project_type, complexity, request.priority, team_json,
        );

        let text = self.send(ALLOCATION_SYSTEM_PROMPT, user_text).await?;
        let json = extract_json_object(&text)?;
        serde_json::from_str::<AllocationSuggestion>(json)
            .map_err(|e| AdvisorError::InvalidResponse(e.to_string()))
    }
}

// ==========================================
// Extração e validação da resposta
// ==========================================

/// Recorta o primeiro objeto JSON do texto (o serviço às vezes envolve
/// a resposta em cercas de código)
fn extract_json_object(text: &str) -> Result<&str, AdvisorError> {
    let start = text
        .find('{')
        .ok_or_else(|| AdvisorError::InvalidResponse("resposta sem objeto JSON".to_string()))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| AdvisorError::InvalidResponse("objeto JSON truncado".to_string()))?;
    if end < start {
        return Err(AdvisorError::InvalidResponse(
            "objeto JSON malformado".to_string(),
        ));
    }
    Ok(&text[start..=end])
}

fn parse_diagnosis(text: &str) -> Result<ComplexityDiagnosis, AdvisorError> {
    #[derive(serde::Deserialize)]
    struct RawDiagnosis {
        complexity: String,
        #[serde(default)]
        confidence: f64,
        #[serde(default)]
        justification: String,
        #[serde(default)]
        recommendations: Vec<String>,
    }

    let json = extract_json_object(text)?;
    let raw: RawDiagnosis = serde_json::from_str(json)
        .map_err(|e| AdvisorError::InvalidResponse(e.to_string()))?;

    let complexity = Complexity::from_db_str(&raw.complexity).ok_or_else(|| {
        AdvisorError::InvalidResponse(format!("complexidade desconhecida: {}", raw.complexity))
    })?;

    Ok(ComplexityDiagnosis {
        complexity,
        confidence: raw.confidence.clamp(0.0, 1.0),
        justification: raw.justification,
        recommendations: raw.recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_diagnosis_plain_json() {
        let text = r#"{"complexity": "alta", "justification": "ponte de 80m", "confidence": 0.9, "recommendations": ["sondagem"]}"#;
        let diagnosis = parse_diagnosis(text).unwrap();
        assert_eq!(diagnosis.complexity, Complexity::Alta);
        assert_eq!(diagnosis.confidence, 0.9);
        assert_eq!(diagnosis.recommendations, vec!["sondagem".to_string()]);
    }

    #[test]
    fn test_parse_diagnosis_with_code_fences() {
        let text = "```json\n{\"complexity\": \"minima\", \"justification\": \"reforma simples\", \"confidence\": 0.8}\n```";
        let diagnosis = parse_diagnosis(text).unwrap();
        assert_eq!(diagnosis.complexity, Complexity::Minima);
    }

    #[test]
    fn test_parse_diagnosis_clamps_confidence() {
        let text = r#"{"complexity": "media", "justification": "x", "confidence": 1.7}"#;
        let diagnosis = parse_diagnosis(text).unwrap();
        assert_eq!(diagnosis.confidence, 1.0);
    }

    #[test]
    fn test_parse_diagnosis_rejects_unknown_complexity() {
        let text = r#"{"complexity": "gigante", "justification": "x", "confidence": 0.5}"#;
        assert!(matches!(
            parse_diagnosis(text),
            Err(AdvisorError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_diagnosis_rejects_non_json() {
        assert!(matches!(
            parse_diagnosis("não tenho certeza"),
            Err(AdvisorError::InvalidResponse(_))
        ));
    }
}
