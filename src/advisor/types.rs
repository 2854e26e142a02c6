// ==========================================
// Portal IntraAMVALI - Tipos do serviço de diagnóstico
// ==========================================
// Contratos do ComplexityAdvisor + formato de mensagens da API externa.
// ==========================================

use crate::domain::project::Project;
use crate::domain::types::{Complexity, ProjectType};
use serde::{Deserialize, Serialize};

// ==========================================
// Diagnóstico de complexidade (consultivo)
// ==========================================

/// Atributos do projeto submetidos ao diagnóstico
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisRequest {
    pub title: String,
    pub project_type: ProjectType,
    pub description: String,
    pub location: Option<String>,
    pub scope: Option<String>,
    pub purpose: Option<String>,
    pub impact_score: i32,
    pub urgency_score: i32,
}

impl DiagnosisRequest {
    pub fn from_project(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            project_type: project.project_type,
            description: project.description.clone(),
            location: project.location.clone(),
            scope: project.scope.clone(),
            purpose: project.purpose.clone(),
            impact_score: project.impact_score,
            urgency_score: project.urgency_score,
        }
    }
}

/// Resultado consultivo do diagnóstico
///
/// Nunca é autoritativo para avanço de workflow: alimenta o cálculo
/// do IPR e permanece sobreponível por um técnico.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityDiagnosis {
    pub complexity: Complexity,
    /// Confiança declarada pelo serviço, saturada em [0,1]
    pub confidence: f64,
    pub justification: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

// ==========================================
// Sugestão de alocação (consultiva)
// ==========================================

/// Fotografia da equipe enviada ao serviço de sugestão
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub id: String,
    pub name: String,
    pub specialties: Vec<ProjectType>,
    pub active_projects: i32,
    pub workload_hours: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationSuggestionRequest {
    pub title: String,
    pub project_type: ProjectType,
    pub complexity: Option<Complexity>,
    pub priority: i32,
    pub team: Vec<TeamSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationSuggestion {
    pub suggested_team: Vec<String>,
    pub reasoning: String,
    #[serde(default)]
    pub workload_impact: String,
}

// ==========================================
// Formato de mensagens da API externa
// ==========================================

#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}
