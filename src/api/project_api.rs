// ==========================================
// Portal IntraAMVALI - API de projetos
// ==========================================
// Responsabilidade: ciclo de vida do projeto (criação, consulta,
// atualização, etapas, pausa/retomada)
// Autorização: papel municipal cria/consulta no próprio município;
// mutações de workflow exigem equipe AMVALI
// ==========================================
// O IPR nunca é gravado de forma independente: toda mudança em insumo
// de pontuação passa pelo ScoringEngine antes de persistir.
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{validate_priority, validate_required_text, validate_score};
use crate::domain::notification::Notification;
use crate::domain::project::{NewProject, Project, ProjectPatch, ProjectStage};
use crate::domain::types::{Principal, ProjectStatus, StageStatus, UserRole};
use crate::engine::{PriorityBudget, ScoringEngine, StageMachine};
use crate::repository::{
    CreationBudget, MunicipalityRepository, NotificationRepository, ProjectRepository,
};

// ==========================================
// ProjectApi
// ==========================================
pub struct ProjectApi {
    project_repo: Arc<ProjectRepository>,
    municipality_repo: Arc<MunicipalityRepository>,
    notification_repo: Arc<NotificationRepository>,
    scoring: Arc<ScoringEngine>,
    stage_machine: Arc<StageMachine>,
    budget: Arc<PriorityBudget>,
}

impl ProjectApi {
    pub fn new(
        project_repo: Arc<ProjectRepository>,
        municipality_repo: Arc<MunicipalityRepository>,
        notification_repo: Arc<NotificationRepository>,
        scoring: Arc<ScoringEngine>,
        stage_machine: Arc<StageMachine>,
        budget: Arc<PriorityBudget>,
    ) -> Self {
        Self {
            project_repo,
            municipality_repo,
            notification_repo,
            scoring,
            stage_machine,
            budget,
        }
    }

    // ==========================================
    // Criação
    // ==========================================

    /// Cria um projeto comprometendo estrelas no orçamento da área
    ///
    /// Situação inicial: solicitacao para submissão municipal direta;
    /// rascunho para a equipe AMVALI. Complexidade nasce ausente e o
    /// projeto só entra na fila após diagnóstico.
    pub fn create(&self, principal: &Principal, new: NewProject) -> ApiResult<Project> {
        self.check_municipal_scope(principal, &new.municipality_id)?;

        validate_required_text("title", &new.title)?;
        validate_required_text("description", &new.description)?;
        validate_priority(new.priority)?;
        validate_score("impact_score", new.impact_score)?;
        validate_score("urgency_score", new.urgency_score)?;
        validate_score("cost_score", new.cost_score)?;

        let municipality = self
            .municipality_repo
            .find_by_id(&new.municipality_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Municipality(id={}) não existe", new.municipality_id))
            })?;

        // Pré-checagens de orçamento (revalidadas na transação de criação)
        self.budget
            .check_star_request(&municipality, new.project_type, new.priority)
            .map_err(|v| ApiError::Validation(v.to_string()))?;
        let active_same_priority = self
            .project_repo
            .count_active_by_priority(&new.municipality_id, new.priority)?;
        self.budget
            .check_simultaneous(new.priority, active_same_priority)
            .map_err(|v| ApiError::Validation(v.to_string()))?;

        let initial_status = match principal.role {
            UserRole::Municipal => ProjectStatus::Solicitacao,
            _ => ProjectStatus::Rascunho,
        };

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            description: new.description,
            project_type: new.project_type,
            municipality_id: new.municipality_id,
            municipality_name: municipality.name.clone(),
            priority: new.priority,
            complexity: None,
            impact_score: new.impact_score,
            urgency_score: new.urgency_score,
            cost_score: new.cost_score,
            ipr_score: None,
            status: initial_status,
            paused_from: None,
            stages: ProjectStage::default_roadmap(),
            progress_percent: 0.0,
            assigned_team: Vec::new(),
            location: new.location,
            scope: new.scope,
            purpose: new.purpose,
            estimated_deadline: None,
            ai_justification: None,
            created_at: now,
            updated_at: now,
            revision: Some(0),
        };

        self.project_repo.create_committing_stars(
            &project,
            CreationBudget {
                star_budget: self.budget.star_budget(),
                simultaneous_limit: self.budget.simultaneous_limit(project.priority),
            },
        )?;

        tracing::info!(
            project_id = %project.id,
            municipality = %project.municipality_name,
            priority = project.priority,
            "projeto criado"
        );
        Ok(project)
    }

    // ==========================================
    // Consulta
    // ==========================================

    /// Lista projetos; papel municipal é forçado ao próprio município
    pub fn list(
        &self,
        principal: &Principal,
        status: Option<ProjectStatus>,
        municipality_id: Option<String>,
    ) -> ApiResult<Vec<Project>> {
        let scope = match principal.role {
            UserRole::Municipal => principal.municipality_id.clone(),
            _ => municipality_id,
        };
        Ok(self.project_repo.list(status, scope.as_deref())?)
    }

    pub fn get(&self, principal: &Principal, project_id: &str) -> ApiResult<Project> {
        let project = self.load(project_id)?;
        self.check_municipal_scope(principal, &project.municipality_id)?;
        Ok(project)
    }

    // ==========================================
    // Atualização de campos
    // ==========================================

    /// Atualização parcial; restrita à equipe AMVALI
    ///
    /// Mudança em qualquer insumo de pontuação recalcula o IPR na
    /// mesma gravação; mudança de prioridade ajusta o saldo de
    /// estrelas do município em transação.
    pub fn update(
        &self,
        principal: &Principal,
        project_id: &str,
        patch: ProjectPatch,
    ) -> ApiResult<Project> {
        self.require_staff(principal, "atualizar projetos")?;

        if let Some(priority) = patch.priority {
            validate_priority(priority)?;
        }
        if let Some(v) = patch.impact_score {
            validate_score("impact_score", v)?;
        }
        if let Some(v) = patch.urgency_score {
            validate_score("urgency_score", v)?;
        }
        if let Some(v) = patch.cost_score {
            validate_score("cost_score", v)?;
        }
        if let Some(title) = &patch.title {
            validate_required_text("title", title)?;
        }

        let mut project = self.load(project_id)?;
        let recompute = patch.touches_scoring_inputs();

        if let Some(title) = patch.title {
            project.title = title;
        }
        if let Some(description) = patch.description {
            project.description = description;
        }
        if let Some(priority) = patch.priority {
            project.priority = priority;
        }
        if let Some(complexity) = patch.complexity {
            project.complexity = Some(complexity);
        }
        if let Some(location) = patch.location {
            project.location = Some(location);
        }
        if let Some(scope) = patch.scope {
            project.scope = Some(scope);
        }
        if let Some(purpose) = patch.purpose {
            project.purpose = Some(purpose);
        }
        if let Some(deadline) = patch.estimated_deadline {
            project.estimated_deadline = Some(deadline);
        }
        if let Some(v) = patch.impact_score {
            project.impact_score = v;
        }
        if let Some(v) = patch.urgency_score {
            project.urgency_score = v;
        }
        if let Some(v) = patch.cost_score {
            project.cost_score = v;
        }

        if recompute {
            project.ipr_score = self.scoring.compute_ipr_opt(
                project.impact_score,
                project.urgency_score,
                project.cost_score,
                project.complexity,
            );
        }

        Ok(self
            .project_repo
            .update_cas(&project, self.budget.star_budget())?)
    }

    // ==========================================
    // Etapas e ciclo de vida
    // ==========================================

    /// Transiciona o sub-status de uma etapa do roadmap
    ///
    /// Restrita à equipe AMVALI; conflito de revision indica mutação
    /// concorrente e volta como Conflict para retentativa.
    pub fn update_stage(
        &self,
        principal: &Principal,
        project_id: &str,
        stage_index: usize,
        new_status: StageStatus,
    ) -> ApiResult<Project> {
        self.require_staff(principal, "avançar etapas")?;

        let mut project = self.load(project_id)?;
        let outcome =
            self.stage_machine
                .apply_stage_update(&mut project, stage_index, new_status, Utc::now())?;

        let updated = self
            .project_repo
            .update_cas(&project, self.budget.star_budget())?;

        // Notificação é auxiliar: falha não desfaz a transição já gravada
        let notification = Notification::info(
            updated.municipality_id.clone(),
            format!("Etapa atualizada: {}", outcome.stage_name),
            format!(
                "O projeto '{}' avançou para a etapa '{}'",
                updated.title, outcome.stage_name
            ),
        )
        .for_project(updated.id.clone());
        if let Err(err) = self.notification_repo.insert(&notification) {
            tracing::warn!(project_id = %updated.id, "falha ao gravar notificação: {}", err);
        }

        tracing::info!(
            project_id = %updated.id,
            stage = %outcome.stage_name,
            status = %outcome.new_project_status,
            progress = outcome.progress_percent,
            "etapa atualizada"
        );
        Ok(updated)
    }

    /// Suspende o projeto registrando o estado de origem
    pub fn pause(&self, principal: &Principal, project_id: &str) -> ApiResult<Project> {
        self.require_staff(principal, "pausar projetos")?;

        let mut project = self.load(project_id)?;
        self.stage_machine.pause(&mut project)?;
        Ok(self
            .project_repo
            .update_cas(&project, self.budget.star_budget())?)
    }

    /// Retoma o projeto exatamente para o estado registrado na pausa
    pub fn resume(&self, principal: &Principal, project_id: &str) -> ApiResult<Project> {
        self.require_staff(principal, "retomar projetos")?;

        let mut project = self.load(project_id)?;
        self.stage_machine.resume(&mut project)?;
        Ok(self
            .project_repo
            .update_cas(&project, self.budget.star_budget())?)
    }

    // ==========================================
    // Auxiliares
    // ==========================================

    fn load(&self, project_id: &str) -> ApiResult<Project> {
        self.project_repo
            .find_by_id(project_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Project(id={}) não existe", project_id)))
    }

    fn require_staff(&self, principal: &Principal, action: &str) -> ApiResult<()> {
        if !principal.role.is_amvali_staff() {
            return Err(ApiError::Authorization(format!(
                "papel {} não pode {}",
                principal.role, action
            )));
        }
        Ok(())
    }

    /// Papel municipal só enxerga/opera o próprio município
    fn check_municipal_scope(&self, principal: &Principal, municipality_id: &str) -> ApiResult<()> {
        if principal.role == UserRole::Municipal
            && principal.municipality_id.as_deref() != Some(municipality_id)
        {
            return Err(ApiError::Authorization(
                "acesso restrito ao próprio município".to_string(),
            ));
        }
        Ok(())
    }
}
