// ==========================================
// Portal IntraAMVALI - API do painel
// ==========================================
// Agregações de leitura sobre projetos, equipe e municípios.
// Capacidade agregada usa as contagens ativas reais, não os
// contadores armazenados.
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::municipality::Municipality;
use crate::domain::project::Project;
use crate::domain::types::{Principal, UserRole};
use crate::engine::CapacityEngine;
use crate::repository::{MunicipalityRepository, ProjectRepository, TechnicianRepository};

// ==========================================
// DTOs
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_projects: i64,
    pub active_projects: i64,
    pub completed_projects: i64,
    pub projects_by_status: HashMap<String, i64>,
    pub projects_by_type: HashMap<String, i64>,
    /// Capacidade agregada da equipe (horas usadas / horas declaradas)
    pub team_capacity_percent: f64,
    pub municipalities_count: i64,
    pub overdue_projects: i64,
    pub queue_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MunicipalityDashboard {
    pub municipality: Municipality,
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub projects: Vec<Project>,
    pub engagement_score: f64,
    pub active_stars: HashMap<String, i32>,
}

// ==========================================
// DashboardApi
// ==========================================
pub struct DashboardApi {
    project_repo: Arc<ProjectRepository>,
    technician_repo: Arc<TechnicianRepository>,
    municipality_repo: Arc<MunicipalityRepository>,
    capacity: Arc<CapacityEngine>,
    overdue_execution_days: i64,
}

impl DashboardApi {
    pub fn new(
        project_repo: Arc<ProjectRepository>,
        technician_repo: Arc<TechnicianRepository>,
        municipality_repo: Arc<MunicipalityRepository>,
        capacity: Arc<CapacityEngine>,
        overdue_execution_days: i64,
    ) -> Self {
        Self {
            project_repo,
            technician_repo,
            municipality_repo,
            capacity,
            overdue_execution_days,
        }
    }

    /// Estatísticas agregadas do portal (equipe AMVALI)
    pub fn stats(&self, principal: &Principal) -> ApiResult<DashboardStats> {
        if !principal.role.is_amvali_staff() {
            return Err(ApiError::Authorization(format!(
                "papel {} não acessa o painel geral",
                principal.role
            )));
        }

        let total_projects = self.project_repo.count_all()?;
        let by_status: HashMap<String, i64> =
            self.project_repo.count_by_status()?.into_iter().collect();
        let by_type: HashMap<String, i64> =
            self.project_repo.count_by_type()?.into_iter().collect();

        let completed_projects = by_status.get("concluido").copied().unwrap_or(0);
        let drafts = by_status.get("rascunho").copied().unwrap_or(0);
        let active_projects = total_projects - completed_projects - drafts;

        // Capacidade agregada: horas consumidas (contagem ativa real)
        // sobre horas declaradas da equipe inteira
        let technicians = self.technician_repo.list()?;
        let hours_per_project = self.capacity.params().hours_per_project;
        let mut declared_hours = 0.0;
        let mut used_hours = 0.0;
        for technician in &technicians {
            let active = self.project_repo.count_active_assigned(&technician.id)?;
            declared_hours += f64::from(technician.workload_hours.max(1));
            used_hours += active as f64 * hours_per_project;
        }
        let team_capacity_percent = if declared_hours > 0.0 {
            used_hours / declared_hours * 100.0
        } else {
            0.0
        };

        let cutoff = Utc::now() - Duration::days(self.overdue_execution_days);

        Ok(DashboardStats {
            total_projects,
            active_projects,
            completed_projects,
            projects_by_status: by_status,
            projects_by_type: by_type,
            team_capacity_percent: (team_capacity_percent * 10.0).round() / 10.0,
            municipalities_count: self.municipality_repo.count()?,
            overdue_projects: self.project_repo.count_overdue_execution(cutoff)?,
            queue_size: self.project_repo.count_queue_size()?,
        })
    }

    /// Painel de um município (papel municipal restrito ao próprio)
    pub fn municipality_dashboard(
        &self,
        principal: &Principal,
        municipality_id: &str,
    ) -> ApiResult<MunicipalityDashboard> {
        if principal.role == UserRole::Municipal
            && principal.municipality_id.as_deref() != Some(municipality_id)
        {
            return Err(ApiError::Authorization(
                "acesso restrito ao próprio município".to_string(),
            ));
        }

        let municipality = self
            .municipality_repo
            .find_by_id(municipality_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Municipality(id={}) não existe", municipality_id))
            })?;

        let projects = self.project_repo.list(None, Some(municipality_id))?;
        let active = projects.iter().filter(|p| p.status.is_active()).count();
        let completed = projects
            .iter()
            .filter(|p| p.status.is_terminal())
            .count();

        Ok(MunicipalityDashboard {
            engagement_score: municipality.engagement_score,
            active_stars: municipality.active_stars.clone(),
            total_projects: projects.len(),
            active_projects: active,
            completed_projects: completed,
            projects,
            municipality,
        })
    }
}
