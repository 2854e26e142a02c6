// ==========================================
// Portal IntraAMVALI - Serviço externo de diagnóstico
// ==========================================
// O diagnóstico de complexidade é uma capacidade polimórfica atrás de
// trait: o núcleo de pontuação/ordenação permanece determinístico e
// testável sem o backend de raciocínio (stub nos testes).
// ==========================================

pub mod client;
pub mod error;
pub mod types;

use async_trait::async_trait;

pub use client::ClaudeAdvisor;
pub use error::AdvisorError;
pub use types::{
    AllocationSuggestion, AllocationSuggestionRequest, ComplexityDiagnosis, DiagnosisRequest,
    TeamSnapshot,
};

/// Capacidade consultiva de diagnóstico.
///
/// Saída nunca é autoritativa para avanço de workflow; falha é da
/// classe dependência (retryável, sem efeito sobre o estado).
#[async_trait]
pub trait ComplexityAdvisor: Send + Sync {
    async fn diagnose(
        &self,
        request: &DiagnosisRequest,
    ) -> Result<ComplexityDiagnosis, AdvisorError>;

    async fn suggest_allocation(
        &self,
        request: &AllocationSuggestionRequest,
    ) -> Result<AllocationSuggestion, AdvisorError>;
}

// ==========================================
// DisabledAdvisor
// ==========================================
// Usado quando não há chave de API configurada: toda chamada falha
// como dependência indisponível; a complexidade permanece ausente.
pub struct DisabledAdvisor;

#[async_trait]
impl ComplexityAdvisor for DisabledAdvisor {
    async fn diagnose(
        &self,
        _request: &DiagnosisRequest,
    ) -> Result<ComplexityDiagnosis, AdvisorError> {
        Err(AdvisorError::NotConfigured)
    }

    async fn suggest_allocation(
        &self,
        _request: &AllocationSuggestionRequest,
    ) -> Result<AllocationSuggestion, AdvisorError> {
        Err(AdvisorError::NotConfigured)
    }
}
