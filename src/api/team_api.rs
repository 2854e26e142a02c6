// ==========================================
// Portal IntraAMVALI - API de equipe e alocação
// ==========================================
// capacity_percent é sempre derivado na leitura (contagem ativa real
// dos projetos, não o contador armazenado); a alocação reconta os
// técnicos afetados na transação do repositório.
// Capacidade nunca bloqueia alocação: acima do limiar gera alerta.
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::project::Project;
use crate::domain::technician::TeamMember;
use crate::domain::types::{Principal, UserRole};
use crate::engine::{CapacityEngine, CapacityWarning};
use crate::repository::{ProjectRepository, TechnicianRepository};

// ==========================================
// DTOs
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamResponse {
    pub team: Vec<TeamMember>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocateTeamRequest {
    pub project_id: String,
    pub technician_ids: Vec<String>,
}

/// Capacidade resultante por técnico após a alocação
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicianCapacity {
    pub technician_id: String,
    pub name: String,
    pub active_projects: i64,
    pub capacity_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationResult {
    pub project: Project,
    pub team_capacity: Vec<TechnicianCapacity>,
    /// Alertas consultivos (acima do limiar); nunca impedem a alocação
    pub warnings: Vec<CapacityWarning>,
}

// ==========================================
// TeamApi
// ==========================================
pub struct TeamApi {
    technician_repo: Arc<TechnicianRepository>,
    project_repo: Arc<ProjectRepository>,
    capacity: Arc<CapacityEngine>,
}

impl TeamApi {
    pub fn new(
        technician_repo: Arc<TechnicianRepository>,
        project_repo: Arc<ProjectRepository>,
        capacity: Arc<CapacityEngine>,
    ) -> Self {
        Self {
            technician_repo,
            project_repo,
            capacity,
        }
    }

    // ==========================================
    // Roster
    // ==========================================

    /// Roster da equipe com capacidade derivada e projetos alocados
    pub fn get_team(&self, principal: &Principal) -> ApiResult<TeamResponse> {
        if !principal.role.is_amvali_staff() {
            return Err(ApiError::Authorization(format!(
                "papel {} não acessa o roster da equipe",
                principal.role
            )));
        }

        let technicians = self.technician_repo.list()?;
        let mut team = Vec::with_capacity(technicians.len());
        for technician in technicians {
            let active = self.project_repo.count_active_assigned(&technician.id)?;
            let assigned = self.project_repo.list_assigned_refs(&technician.id)?;
            team.push(TeamMember {
                id: technician.id,
                name: technician.name,
                email: technician.email,
                specialties: technician.specialties,
                workload_hours: technician.workload_hours,
                active_projects: active as i32,
                capacity_percent: self
                    .capacity
                    .capacity_percent(active, technician.workload_hours),
                assigned_projects: assigned,
            });
        }

        let total = team.len();
        Ok(TeamResponse { team, total })
    }

    // ==========================================
    // Alocação
    // ==========================================

    /// Aloca a equipe ao projeto (somente gestão)
    ///
    /// - idempotente: repetir a equipe atual não altera contadores
    /// - atômica: remoções e inclusões recontam na mesma transação
    /// - nunca rejeita por capacidade; acima do limiar retorna alerta
    pub fn allocate(
        &self,
        principal: &Principal,
        request: AllocateTeamRequest,
    ) -> ApiResult<AllocationResult> {
        if principal.role != UserRole::GestorAmvali {
            return Err(ApiError::Authorization(
                "somente gestores podem alocar equipe".to_string(),
            ));
        }

        // Ids repetidos contam uma única vez na equipe gravada
        let mut requested: Vec<String> = Vec::with_capacity(request.technician_ids.len());
        for id in &request.technician_ids {
            if !requested.contains(id) {
                requested.push(id.clone());
            }
        }

        let missing = self.technician_repo.find_missing(&requested)?;
        if !missing.is_empty() {
            return Err(ApiError::NotFound(format!(
                "técnicos inexistentes: {}",
                missing.join(", ")
            )));
        }

        let mut project = self
            .project_repo
            .find_by_id(&request.project_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Project(id={}) não existe", request.project_id))
            })?;

        let plan = self
            .capacity
            .plan_allocation(&project.assigned_team, &requested);

        // Alertas projetados antes de gravar (mesma resposta no no-op)
        let roster = self.technician_repo.list()?;
        let relevant: Vec<_> = roster
            .into_iter()
            .filter(|t| requested.contains(&t.id))
            .collect();
        let warnings = self.capacity.evaluate_warnings(&relevant, &plan);

        let updated = if plan.is_noop() {
            tracing::debug!(project_id = %project.id, "alocação idempotente: equipe inalterada");
            project
        } else {
            project.assigned_team = requested.clone();
            self.project_repo
                .apply_allocation_cas(&project, &plan.affected())?
        };

        // Capacidade resultante lida após a transação
        let mut team_capacity = Vec::with_capacity(updated.assigned_team.len());
        for technician_id in &updated.assigned_team {
            let technician = self
                .technician_repo
                .find_by_id(technician_id)?
                .ok_or_else(|| {
                    ApiError::NotFound(format!("Technician(id={}) não existe", technician_id))
                })?;
            let active = self.project_repo.count_active_assigned(technician_id)?;
            team_capacity.push(TechnicianCapacity {
                technician_id: technician.id,
                name: technician.name,
                active_projects: active,
                capacity_percent: self
                    .capacity
                    .capacity_percent(active, technician.workload_hours),
            });
        }

        if !warnings.is_empty() {
            tracing::warn!(
                project_id = %updated.id,
                count = warnings.len(),
                "alocação acima do limiar de capacidade"
            );
        }

        Ok(AllocationResult {
            project: updated,
            team_capacity,
            warnings,
        })
    }
}
