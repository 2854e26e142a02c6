// ==========================================
// Portal IntraAMVALI - Modelo de domínio: Técnico
// ==========================================
// active_projects é contagem derivada das alocações; capacity_percent
// nunca é armazenado - é recalculado na leitura a partir dos insumos
// (ver engine/capacity.rs).
// ==========================================

use crate::domain::types::ProjectType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Carga semanal declarada padrão (horas)
pub const DEFAULT_WORKLOAD_HOURS: i32 = 40;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technician {
    pub id: String,
    pub name: String,
    pub email: String,
    pub specialties: Vec<ProjectType>,
    /// Capacidade semanal declarada (horas)
    pub workload_hours: i32,
    /// Contagem derivada de projetos ativos alocados
    pub active_projects: i32,
    pub created_at: DateTime<Utc>,
}

impl Technician {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            specialties: Vec::new(),
            workload_hours: DEFAULT_WORKLOAD_HOURS,
            active_projects: 0,
            created_at: Utc::now(),
        }
    }
}

// ==========================================
// TeamMember - projeção para o roster da equipe
// ==========================================
// Visão de leitura com capacidade derivada e projetos alocados.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub email: String,
    pub specialties: Vec<ProjectType>,
    pub workload_hours: i32,
    pub active_projects: i32,
    /// Derivado na leitura; pode ultrapassar 100 em sobrecarga real
    pub capacity_percent: f64,
    pub assigned_projects: Vec<AssignedProjectRef>,
}

/// Referência resumida de projeto alocado (para o roster)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedProjectRef {
    pub id: String,
    pub title: String,
    pub priority: i32,
    pub status: crate::domain::types::ProjectStatus,
}
