// ==========================================
// Portal IntraAMVALI - Núcleo de priorização e alocação
// ==========================================
// Serviço por trás do portal de gestão de projetos da AMVALI:
// pontuação IPR determinística, fila técnica com ordem total,
// máquina de estados de etapas e alocação com capacidade derivada.
// ==========================================

// ==========================================
// Declaração de módulos
// ==========================================

// Camada de domínio - entidades e tipos
pub mod domain;

// Camada de repositório - acesso a dados
pub mod repository;

// Camada de engines - regras de negócio
pub mod engine;

// Serviço externo de diagnóstico
pub mod advisor;

// Camada de configuração
pub mod config;

// Infraestrutura de banco (conexão/PRAGMA/schema)
pub mod db;

// Sistema de logs
pub mod logging;

// Camada de API - serviços de aplicação
pub mod api;

// Camada de aplicação - integração HTTP
pub mod app;

// ==========================================
// Reexportação dos tipos centrais
// ==========================================

// Tipos de domínio
pub use domain::types::{
    Complexity, Principal, ProjectStatus, ProjectType, StageStatus, UserRole,
};

// Entidades
pub use domain::{Municipality, Notification, Project, ProjectStage, Technician};

// Engines
pub use engine::{
    CapacityEngine, PriorityBudget, QueueRanker, ScoringEngine, StageMachine,
};

// APIs
pub use api::{
    DashboardApi, DiagnosisApi, MunicipalityApi, NotificationApi, ProjectApi, QueueApi, TeamApi,
};

// ==========================================
// Constantes do sistema
// ==========================================

/// Versão do serviço
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Nome do serviço
pub const APP_NAME: &str = "Portal IntraAMVALI - Núcleo";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
