// ==========================================
// Portal IntraAMVALI - Estado da aplicação
// ==========================================
// Responsabilidade: montar repositórios, engines e APIs sobre uma
// conexão compartilhada e a configuração carregada do banco.
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::advisor::{ClaudeAdvisor, ComplexityAdvisor, DisabledAdvisor};
use crate::api::{
    DashboardApi, DiagnosisApi, MunicipalityApi, NotificationApi, ProjectApi, QueueApi, TeamApi,
};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::{CapacityEngine, PriorityBudget, QueueRanker, ScoringEngine, StageMachine};
use crate::repository::{
    MunicipalityRepository, NotificationRepository, ProjectRepository, TechnicianRepository,
};

/// Variável de ambiente com a chave do serviço de diagnóstico
pub const ADVISOR_API_KEY_ENV: &str = "AMVALI_ADVISOR_API_KEY";

/// Estado compartilhado entre os handlers HTTP
pub struct AppState {
    pub db_path: String,

    pub project_api: Arc<ProjectApi>,
    pub queue_api: Arc<QueueApi>,
    pub team_api: Arc<TeamApi>,
    pub diagnosis_api: Arc<DiagnosisApi>,
    pub dashboard_api: Arc<DashboardApi>,
    pub municipality_api: Arc<MunicipalityApi>,
    pub notification_api: Arc<NotificationApi>,
}

impl AppState {
    /// Monta o estado completo a partir do caminho do banco
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        let conn = Arc::new(Mutex::new(conn));

        let advisor: Arc<dyn ComplexityAdvisor> = {
            let config = ConfigManager::from_connection(conn.clone())?;
            match std::env::var(ADVISOR_API_KEY_ENV) {
                Ok(key) if !key.trim().is_empty() => Arc::new(ClaudeAdvisor::new(
                    key,
                    config.advisor_model(),
                    config.advisor_timeout_secs(),
                )),
                _ => {
                    tracing::warn!(
                        "{} ausente: diagnóstico externo desabilitado",
                        ADVISOR_API_KEY_ENV
                    );
                    Arc::new(DisabledAdvisor)
                }
            }
        };

        Self::with_advisor(db_path, conn, advisor)
    }

    /// Variante com advisor injetado (testes usam stub determinístico)
    pub fn with_advisor(
        db_path: &str,
        conn: Arc<Mutex<Connection>>,
        advisor: Arc<dyn ComplexityAdvisor>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = ConfigManager::from_connection(conn.clone())?;

        // Repositórios
        let project_repo = Arc::new(ProjectRepository::new(conn.clone()));
        let municipality_repo = Arc::new(MunicipalityRepository::new(conn.clone()));
        let technician_repo = Arc::new(TechnicianRepository::new(conn.clone()));
        let notification_repo = Arc::new(NotificationRepository::new(conn.clone()));

        // Engines parametrizadas pela configuração
        let scoring = Arc::new(ScoringEngine::new(config.ipr_divisors()));
        let capacity = Arc::new(CapacityEngine::new(config.capacity_params()));
        let budget = Arc::new(PriorityBudget::new(config.star_budget_per_area()));
        let ranker = Arc::new(QueueRanker::new());
        let stage_machine = Arc::new(StageMachine::new());

        // APIs
        let project_api = Arc::new(ProjectApi::new(
            project_repo.clone(),
            municipality_repo.clone(),
            notification_repo.clone(),
            scoring.clone(),
            stage_machine,
            budget.clone(),
        ));
        let queue_api = Arc::new(QueueApi::new(project_repo.clone(), ranker));
        let team_api = Arc::new(TeamApi::new(
            technician_repo.clone(),
            project_repo.clone(),
            capacity.clone(),
        ));
        let diagnosis_api = Arc::new(DiagnosisApi::new(
            advisor,
            project_repo.clone(),
            technician_repo.clone(),
            scoring,
            budget,
        ));
        let dashboard_api = Arc::new(DashboardApi::new(
            project_repo,
            technician_repo,
            municipality_repo.clone(),
            capacity,
            config.overdue_execution_days(),
        ));
        let municipality_api = Arc::new(MunicipalityApi::new(municipality_repo));
        let notification_api = Arc::new(NotificationApi::new(notification_repo));

        Ok(Self {
            db_path: db_path.to_string(),
            project_api,
            queue_api,
            team_api,
            diagnosis_api,
            dashboard_api,
            municipality_api,
            notification_api,
        })
    }
}
