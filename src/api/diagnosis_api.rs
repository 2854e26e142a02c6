// ==========================================
// Portal IntraAMVALI - API de diagnóstico consultivo
// ==========================================
// O diagnóstico é a única operação dependente de serviço externo:
// timeout limitado, uma retentativa em rate limit, e falha da classe
// dependência sem tocar o estado do projeto (complexity permanece
// ausente - nunca um padrão silencioso).
// ==========================================

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::advisor::{
    AllocationSuggestion, AllocationSuggestionRequest, AdvisorError, ComplexityAdvisor,
    ComplexityDiagnosis, DiagnosisRequest, TeamSnapshot,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::validate_required_text;
use crate::domain::types::{Principal, ProjectType};
use crate::engine::{PriorityBudget, ScoringEngine};
use crate::repository::{ProjectRepository, TechnicianRepository};

/// Espera máxima aplicada à retentativa única em rate limit
const MAX_RETRY_BACKOFF_MS: u64 = 2_000;

// ==========================================
// DTOs
// ==========================================

/// Pedido de diagnóstico: por projeto existente (project_id) ou por
/// atributos avulsos (assistente de criação, antes de persistir)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnoseComplexityRequest {
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_type: Option<ProjectType>,
    pub location: Option<String>,
    pub scope: Option<String>,
    pub purpose: Option<String>,
    #[serde(default = "default_score")]
    pub impact_score: i32,
    #[serde(default = "default_score")]
    pub urgency_score: i32,
}

fn default_score() -> i32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestAllocationRequest {
    pub project_id: String,
}

// ==========================================
// DiagnosisApi
// ==========================================
pub struct DiagnosisApi {
    advisor: Arc<dyn ComplexityAdvisor>,
    project_repo: Arc<ProjectRepository>,
    technician_repo: Arc<TechnicianRepository>,
    scoring: Arc<ScoringEngine>,
    budget: Arc<PriorityBudget>,
}

impl DiagnosisApi {
    pub fn new(
        advisor: Arc<dyn ComplexityAdvisor>,
        project_repo: Arc<ProjectRepository>,
        technician_repo: Arc<TechnicianRepository>,
        scoring: Arc<ScoringEngine>,
        budget: Arc<PriorityBudget>,
    ) -> Self {
        Self {
            advisor,
            project_repo,
            technician_repo,
            scoring,
            budget,
        }
    }

    // ==========================================
    // Diagnóstico de complexidade
    // ==========================================

    /// Diagnóstico consultivo de complexidade
    ///
    /// Com project_id: em caso de sucesso aplica a classificação ao
    /// projeto e recalcula o IPR (sobreponível por um técnico depois).
    /// Em caso de falha do serviço externo o projeto não é tocado.
    pub async fn diagnose(
        &self,
        principal: &Principal,
        request: DiagnoseComplexityRequest,
    ) -> ApiResult<ComplexityDiagnosis> {
        if !principal.role.is_amvali_staff() {
            return Err(ApiError::Authorization(format!(
                "papel {} não executa diagnóstico",
                principal.role
            )));
        }

        let (advisor_request, project_id) = match &request.project_id {
            Some(id) => {
                let project = self.project_repo.find_by_id(id)?.ok_or_else(|| {
                    ApiError::NotFound(format!("Project(id={}) não existe", id))
                })?;
                (DiagnosisRequest::from_project(&project), Some(id.clone()))
            }
            None => {
                let title = request.title.clone().unwrap_or_default();
                let description = request.description.clone().unwrap_or_default();
                validate_required_text("title", &title)?;
                validate_required_text("description", &description)?;
                let project_type = request.project_type.ok_or_else(|| {
                    ApiError::Validation("project_type é obrigatório sem project_id".to_string())
                })?;
                (
                    DiagnosisRequest {
                        title,
                        project_type,
                        description,
                        location: request.location.clone(),
                        scope: request.scope.clone(),
                        purpose: request.purpose.clone(),
                        impact_score: request.impact_score,
                        urgency_score: request.urgency_score,
                    },
                    None,
                )
            }
        };

        let diagnosis = self.call_with_retry(&advisor_request).await?;

        if let Some(id) = project_id {
            self.apply_diagnosis(&id, &diagnosis)?;
        }

        Ok(diagnosis)
    }

    /// Uma retentativa limitada em rate limit; demais falhas retornam
    /// imediatamente como dependência
    async fn call_with_retry(
        &self,
        request: &DiagnosisRequest,
    ) -> ApiResult<ComplexityDiagnosis> {
        match self.advisor.diagnose(request).await {
            Ok(diagnosis) => Ok(diagnosis),
            Err(AdvisorError::RateLimited { retry_after_ms }) => {
                let backoff = retry_after_ms.min(MAX_RETRY_BACKOFF_MS);
                tracing::warn!(backoff_ms = backoff, "diagnóstico em rate limit; retentando");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
                Ok(self.advisor.diagnose(request).await?)
            }
            Err(err) => {
                tracing::warn!("diagnóstico indisponível: {}", err);
                Err(err.into())
            }
        }
    }

    /// Aplica o resultado consultivo ao projeto e recalcula o IPR
    fn apply_diagnosis(&self, project_id: &str, diagnosis: &ComplexityDiagnosis) -> ApiResult<()> {
        let mut project = self.project_repo.find_by_id(project_id)?.ok_or_else(|| {
            ApiError::NotFound(format!("Project(id={}) não existe", project_id))
        })?;

        project.complexity = Some(diagnosis.complexity);
        project.ai_justification = Some(diagnosis.justification.clone());
        project.ipr_score = self.scoring.compute_ipr_opt(
            project.impact_score,
            project.urgency_score,
            project.cost_score,
            project.complexity,
        );

        self.project_repo
            .update_cas(&project, self.budget.star_budget())?;

        tracing::info!(
            project_id = %project_id,
            complexity = %diagnosis.complexity,
            confidence = diagnosis.confidence,
            "diagnóstico aplicado"
        );
        Ok(())
    }

    // ==========================================
    // Sugestão de alocação
    // ==========================================

    /// Sugestão consultiva de equipe para um projeto
    pub async fn suggest_allocation(
        &self,
        principal: &Principal,
        request: SuggestAllocationRequest,
    ) -> ApiResult<AllocationSuggestion> {
        if !principal.role.is_amvali_staff() {
            return Err(ApiError::Authorization(format!(
                "papel {} não solicita sugestão de alocação",
                principal.role
            )));
        }

        let project = self
            .project_repo
            .find_by_id(&request.project_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Project(id={}) não existe", request.project_id))
            })?;

        let mut team = Vec::new();
        for technician in self.technician_repo.list()? {
            let active = self.project_repo.count_active_assigned(&technician.id)?;
            team.push(TeamSnapshot {
                id: technician.id,
                name: technician.name,
                specialties: technician.specialties,
                active_projects: active as i32,
                workload_hours: technician.workload_hours,
            });
        }

        let advisor_request = AllocationSuggestionRequest {
            title: project.title.clone(),
            project_type: project.project_type,
            complexity: project.complexity,
            priority: project.priority,
            team,
        };

        Ok(self.advisor.suggest_allocation(&advisor_request).await?)
    }
}
