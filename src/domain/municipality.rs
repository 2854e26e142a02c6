// ==========================================
// Portal IntraAMVALI - Modelo de domínio: Município
// ==========================================
// active_stars: soma de estrelas ativas por área técnica; é o saldo
// consumido pelo orçamento de prioridade (PriorityBudget).
// ==========================================

use crate::domain::types::ProjectType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Municipality {
    pub id: String,
    pub name: String,
    pub code: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,

    // ===== Sinais de engajamento =====
    /// Escore agregado [0,100] derivado de participação e regularidade
    pub engagement_score: f64,
    pub meeting_participations: i32,
    pub clarity_score: f64,
    pub financial_regularity: bool,

    // ===== Contadores =====
    pub total_projects: i32,
    pub completed_projects: i32,

    /// Estrelas ativas por área técnica (chave = ProjectType em db_str)
    pub active_stars: HashMap<String, i32>,

    pub created_at: DateTime<Utc>,
}

impl Municipality {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        contact_email: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            code: code.into(),
            contact_email: contact_email.into(),
            contact_phone: None,
            engagement_score: 0.0,
            meeting_participations: 0,
            clarity_score: 0.0,
            financial_regularity: true,
            total_projects: 0,
            completed_projects: 0,
            active_stars: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Estrelas atualmente comprometidas na área técnica informada
    pub fn stars_in_area(&self, area: ProjectType) -> i32 {
        self.active_stars.get(area.to_db_str()).copied().unwrap_or(0)
    }
}

// ==========================================
// NewMunicipality - payload de criação
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMunicipality {
    pub name: String,
    pub code: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
}

// ==========================================
// EngagementUpdate - atualização de sinais de engajamento
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementUpdate {
    pub engagement_score: f64,
    #[serde(default)]
    pub meeting_participations: i32,
    #[serde(default)]
    pub clarity_score: f64,
    #[serde(default = "default_regularity")]
    pub financial_regularity: bool,
}

fn default_regularity() -> bool {
    true
}
