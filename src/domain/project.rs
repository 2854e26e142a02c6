// ==========================================
// Portal IntraAMVALI - Modelo de domínio: Projeto
// ==========================================
// Invariantes do modelo:
// - ipr_score é sempre derivado de (impact, urgency, cost, complexity);
//   quando complexity está ausente o score também fica ausente
// - progress_percent é sempre derivado da razão de etapas concluídas
// - revision é o campo de lock otimista (nunca exposto para edição)
// ==========================================

use crate::domain::types::{Complexity, ProjectStatus, ProjectType, StageStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ProjectStage - etapa do roadmap
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectStage {
    pub name: String,
    pub status: StageStatus,
    /// Carimbado na primeira transição para in_progress
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl ProjectStage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StageStatus::Pending,
            started_at: None,
            completed_at: None,
            notes: None,
        }
    }

    /// Roadmap padrão de todo projeto do consórcio (6 etapas)
    pub fn default_roadmap() -> Vec<ProjectStage> {
        vec![
            ProjectStage::new("Solicitação Formal"),
            ProjectStage::new("Briefing Técnico"),
            ProjectStage::new("Diagnóstico de Complexidade"),
            ProjectStage::new("Validação Conjunta"),
            ProjectStage::new("Execução"),
            ProjectStage::new("Entrega e Encerramento"),
        ]
    }
}

// ==========================================
// Project - entidade principal
// ==========================================
// Alinhado à tabela `project` (ver db.rs); assigned_team e stages são
// colunas JSON (listas pequenas, sempre lidas/escritas em bloco).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    // ===== Identidade =====
    pub id: String,
    pub title: String,
    pub description: String,

    // ===== Classificação =====
    pub project_type: ProjectType,
    pub municipality_id: String,
    pub municipality_name: String,
    /// Prioridade em estrelas [1,5] (entrada do orçamento por área)
    pub priority: i32,
    pub complexity: Option<Complexity>,

    // ===== Insumos de pontuação [1,10] =====
    pub impact_score: i32,
    pub urgency_score: i32,
    pub cost_score: i32,
    /// Derivado; None enquanto complexity estiver ausente
    pub ipr_score: Option<f64>,

    // ===== Ciclo de vida =====
    pub status: ProjectStatus,
    /// Estado anterior à pausa (permite retomada exata)
    pub paused_from: Option<ProjectStatus>,
    pub stages: Vec<ProjectStage>,
    /// Derivado de stages; recalculado a cada mutação de etapa
    pub progress_percent: f64,

    // ===== Alocação =====
    pub assigned_team: Vec<String>,

    // ===== Contexto da solicitação =====
    pub location: Option<String>,
    pub scope: Option<String>,
    pub purpose: Option<String>,
    pub estimated_deadline: Option<DateTime<Utc>>,
    /// Última justificativa do diagnóstico consultivo
    pub ai_justification: Option<String>,

    // ===== Auditoria e concorrência =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<i32>,
}

// ==========================================
// NewProject - payload de criação
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub project_type: ProjectType,
    pub municipality_id: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    pub location: Option<String>,
    pub scope: Option<String>,
    pub purpose: Option<String>,
    #[serde(default = "default_score")]
    pub impact_score: i32,
    #[serde(default = "default_score")]
    pub urgency_score: i32,
    #[serde(default = "default_score")]
    pub cost_score: i32,
}

fn default_priority() -> i32 {
    3
}

fn default_score() -> i32 {
    1
}

// ==========================================
// ProjectPatch - payload de atualização parcial
// ==========================================
// Campos None são preservados; qualquer mudança em insumos de pontuação
// dispara o recálculo do IPR na camada de API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub complexity: Option<Complexity>,
    pub location: Option<String>,
    pub scope: Option<String>,
    pub purpose: Option<String>,
    pub estimated_deadline: Option<DateTime<Utc>>,
    pub impact_score: Option<i32>,
    pub urgency_score: Option<i32>,
    pub cost_score: Option<i32>,
}

impl ProjectPatch {
    /// Indica se a atualização toca algum insumo do IPR
    pub fn touches_scoring_inputs(&self) -> bool {
        self.impact_score.is_some()
            || self.urgency_score.is_some()
            || self.cost_score.is_some()
            || self.complexity.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roadmap_has_six_pending_stages() {
        let roadmap = ProjectStage::default_roadmap();
        assert_eq!(roadmap.len(), 6);
        assert!(roadmap.iter().all(|s| s.status == StageStatus::Pending));
        assert_eq!(roadmap[0].name, "Solicitação Formal");
        assert_eq!(roadmap[5].name, "Entrega e Encerramento");
    }

    #[test]
    fn test_patch_scoring_detection() {
        let patch = ProjectPatch {
            title: Some("novo título".into()),
            ..Default::default()
        };
        assert!(!patch.touches_scoring_inputs());

        let patch = ProjectPatch {
            urgency_score: Some(9),
            ..Default::default()
        };
        assert!(patch.touches_scoring_inputs());
    }
}
