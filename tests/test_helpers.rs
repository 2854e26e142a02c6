// ==========================================
// Auxiliares de teste
// ==========================================
#![allow(dead_code)] // cada binário de teste usa um subconjunto
// ==========================================
// Banco temporário com schema real + montagem das APIs sobre uma
// conexão compartilhada, espelhando a composição da aplicação.
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tempfile::NamedTempFile;

use amvali_core::api::{
    DashboardApi, MunicipalityApi, NotificationApi, ProjectApi, QueueApi, TeamApi,
};
use amvali_core::config::{CapacityParams, IprDivisors};
use amvali_core::db::{init_schema, open_sqlite_connection};
use amvali_core::domain::municipality::{Municipality, NewMunicipality};
use amvali_core::domain::project::NewProject;
use amvali_core::domain::technician::Technician;
use amvali_core::domain::types::{Principal, ProjectType, UserRole};
use amvali_core::engine::{
    CapacityEngine, PriorityBudget, QueueRanker, ScoringEngine, StageMachine,
};
use amvali_core::repository::{
    MunicipalityRepository, NotificationRepository, ProjectRepository, TechnicianRepository,
};

/// Cria um banco temporário com o schema inicializado
pub fn create_test_db() -> (NamedTempFile, String) {
    let temp_file = NamedTempFile::new().expect("falha ao criar arquivo temporário");
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path).expect("falha ao abrir conexão");
    init_schema(&conn).expect("falha ao inicializar schema");

    (temp_file, db_path)
}

/// Ambiente de teste com repositórios e APIs montados
pub struct TestEnv {
    pub conn: Arc<Mutex<Connection>>,
    pub project_repo: Arc<ProjectRepository>,
    pub municipality_repo: Arc<MunicipalityRepository>,
    pub technician_repo: Arc<TechnicianRepository>,
    pub notification_repo: Arc<NotificationRepository>,
    pub scoring: Arc<ScoringEngine>,
    pub budget: Arc<PriorityBudget>,
    pub project_api: Arc<ProjectApi>,
    pub queue_api: Arc<QueueApi>,
    pub team_api: Arc<TeamApi>,
    pub dashboard_api: Arc<DashboardApi>,
    pub municipality_api: Arc<MunicipalityApi>,
    pub notification_api: Arc<NotificationApi>,
}

/// Monta o ambiente completo sobre um banco novo
pub fn setup_env() -> (NamedTempFile, TestEnv) {
    let (temp_file, db_path) = create_test_db();
    let conn = Arc::new(Mutex::new(
        open_sqlite_connection(&db_path).expect("falha ao abrir conexão"),
    ));

    let project_repo = Arc::new(ProjectRepository::new(conn.clone()));
    let municipality_repo = Arc::new(MunicipalityRepository::new(conn.clone()));
    let technician_repo = Arc::new(TechnicianRepository::new(conn.clone()));
    let notification_repo = Arc::new(NotificationRepository::new(conn.clone()));

    let scoring = Arc::new(ScoringEngine::new(IprDivisors::default()));
    let capacity = Arc::new(CapacityEngine::new(CapacityParams::default()));
    let budget = Arc::new(PriorityBudget::new(5));
    let ranker = Arc::new(QueueRanker::new());
    let stage_machine = Arc::new(StageMachine::new());

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
    let dashboard_api = Arc::new(DashboardApi::new(
        project_repo.clone(),
        technician_repo.clone(),
        municipality_repo.clone(),
        capacity,
        30,
    ));
    let municipality_api = Arc::new(MunicipalityApi::new(municipality_repo.clone()));
    let notification_api = Arc::new(NotificationApi::new(notification_repo.clone()));

    (
        temp_file,
        TestEnv {
            conn,
            project_repo,
            municipality_repo,
            technician_repo,
            notification_repo,
            scoring,
            budget,
            project_api,
            queue_api,
            team_api,
            dashboard_api,
            municipality_api,
            notification_api,
        },
    )
}

// ==========================================
// Principals de teste
// ==========================================

pub fn gestor() -> Principal {
    Principal::new("gestor-1", UserRole::GestorAmvali)
}

pub fn tecnico() -> Principal {
    Principal::new("tecnico-1", UserRole::TecnicoAmvali)
}

pub fn municipal(municipality_id: &str) -> Principal {
    Principal::new("municipal-1", UserRole::Municipal).with_municipality(municipality_id)
}

// ==========================================
// Seeds
// ==========================================

/// Cadastra um município via API (como faria a gestão)
pub fn seed_municipality(env: &TestEnv, name: &str, code: &str) -> Municipality {
    env.municipality_api
        .create(
            &gestor(),
            NewMunicipality {
                name: name.to_string(),
                code: code.to_string(),
                contact_email: format!("contato@{}.sc.gov.br", code.to_lowercase()),
                contact_phone: None,
            },
        )
        .expect("falha ao cadastrar município")
}

/// Payload de criação de projeto com insumos padrão
pub fn new_project(municipality_id: &str, title: &str, priority: i32) -> NewProject {
    NewProject {
        title: title.to_string(),
        description: format!("Descrição de {}", title),
        project_type: ProjectType::Pavimentacao,
        municipality_id: municipality_id.to_string(),
        priority,
        location: None,
        scope: None,
        purpose: None,
        impact_score: 7,
        urgency_score: 6,
        cost_score: 5,
    }
}

/// Insere um técnico com carga declarada
pub fn seed_technician(env: &TestEnv, name: &str, workload_hours: i32) -> Technician {
    let slug = name.to_lowercase().replace(' ', ".");
    let mut technician = Technician::new(name, format!("{}@amvali.org.br", slug));
    technician.workload_hours = workload_hours;
    technician.specialties = vec![ProjectType::Pavimentacao, ProjectType::Edificacao];
    env.technician_repo
        .insert(&technician)
        .expect("falha ao inserir técnico");
    technician
}
