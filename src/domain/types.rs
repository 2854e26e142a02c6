// ==========================================
// Portal IntraAMVALI - Tipos de domínio
// ==========================================
// Enums compartilhados entre repositórios, engines e API.
// Formato de serialização: snake_case (alinhado ao contrato JSON do portal)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Papel do usuário (UserRole)
// ==========================================
// Autorização é sempre por papel explícito; não existe estado ambiente
// de "usuário corrente" no núcleo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Municipal,     // prefeitura consorciada (leitura/criação no próprio município)
    GestorAmvali,  // gestão AMVALI (acesso total)
    TecnicoAmvali, // equipe técnica AMVALI (operação de fila/etapas/diagnóstico)
}

impl UserRole {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            UserRole::Municipal => "municipal",
            UserRole::GestorAmvali => "gestor_amvali",
            UserRole::TecnicoAmvali => "tecnico_amvali",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "municipal" => Some(UserRole::Municipal),
            "gestor_amvali" => Some(UserRole::GestorAmvali),
            "tecnico_amvali" => Some(UserRole::TecnicoAmvali),
            _ => None,
        }
    }

    /// Papéis operacionais da AMVALI (podem avançar etapas e operar a fila)
    pub fn is_amvali_staff(&self) -> bool {
        matches!(self, UserRole::GestorAmvali | UserRole::TecnicoAmvali)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Situação do projeto (ProjectStatus)
// ==========================================
// Ciclo de vida macro do projeto. As transições válidas são governadas
// pela StageMachine; `concluido` é terminal, `pausado` é retomável.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Rascunho,    // criado, ainda não submetido
    Solicitacao, // solicitação formal registrada
    Briefing,    // briefing técnico
    Diagnostico, // diagnóstico de complexidade
    Validacao,   // validação conjunta (elegível à fila)
    Execucao,    // em execução (elegível à fila)
    Entrega,     // entrega e encerramento
    Concluido,   // terminal
    Pausado,     // suspenso, retomável ao estado anterior
}

impl ProjectStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProjectStatus::Rascunho => "rascunho",
            ProjectStatus::Solicitacao => "solicitacao",
            ProjectStatus::Briefing => "briefing",
            ProjectStatus::Diagnostico => "diagnostico",
            ProjectStatus::Validacao => "validacao",
            ProjectStatus::Execucao => "execucao",
            ProjectStatus::Entrega => "entrega",
            ProjectStatus::Concluido => "concluido",
            ProjectStatus::Pausado => "pausado",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "rascunho" => Some(ProjectStatus::Rascunho),
            "solicitacao" => Some(ProjectStatus::Solicitacao),
            "briefing" => Some(ProjectStatus::Briefing),
            "diagnostico" => Some(ProjectStatus::Diagnostico),
            "validacao" => Some(ProjectStatus::Validacao),
            "execucao" => Some(ProjectStatus::Execucao),
            "entrega" => Some(ProjectStatus::Entrega),
            "concluido" => Some(ProjectStatus::Concluido),
            "pausado" => Some(ProjectStatus::Pausado),
            _ => None,
        }
    }

    /// Estado terminal: nenhuma transição de saída é permitida
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Concluido)
    }

    /// Projeto conta como "ativo" para limites de simultaneidade e
    /// contadores de carga (exclui rascunho e concluído)
    pub fn is_active(&self) -> bool {
        !matches!(self, ProjectStatus::Rascunho | ProjectStatus::Concluido)
    }

    /// Elegível à fila técnica de execução
    pub fn is_queue_eligible(&self) -> bool {
        matches!(self, ProjectStatus::Validacao | ProjectStatus::Execucao)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Tipo de projeto (área técnica)
// ==========================================
// Também é a chave do orçamento de estrelas por área (PriorityBudget).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Pavimentacao,
    Edificacao,
    Infraestrutura,
}

impl ProjectType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProjectType::Pavimentacao => "pavimentacao",
            ProjectType::Edificacao => "edificacao",
            ProjectType::Infraestrutura => "infraestrutura",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pavimentacao" => Some(ProjectType::Pavimentacao),
            "edificacao" => Some(ProjectType::Edificacao),
            "infraestrutura" => Some(ProjectType::Infraestrutura),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Complexidade (Complexity)
// ==========================================
// Classificação que alimenta o divisor do IPR. Ausente = projeto ainda
// não diagnosticado; nunca substituir por padrão silencioso.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Minima,
    Media,
    Alta,
}

impl Complexity {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Complexity::Minima => "minima",
            Complexity::Media => "media",
            Complexity::Alta => "alta",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "minima" => Some(Complexity::Minima),
            "media" => Some(Complexity::Media),
            "alta" => Some(Complexity::Alta),
            _ => None,
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Situação da etapa (StageStatus)
// ==========================================
// Cada etapa do roadmap é acompanhada de forma independente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    InProgress,
    Completed,
}

impl StageStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::InProgress => "in_progress",
            StageStatus::Completed => "completed",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(StageStatus::Pending),
            "in_progress" => Some(StageStatus::InProgress),
            "completed" => Some(StageStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Principal autenticado
// ==========================================
// Identidade já autenticada pelo gateway; o núcleo recebe o principal
// explicitamente em cada chamada (context passing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub role: UserRole,
    /// Preenchido para o papel `municipal` (escopo de visibilidade)
    pub municipality_id: Option<String>,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            municipality_id: None,
        }
    }

    pub fn with_municipality(mut self, municipality_id: impl Into<String>) -> Self {
        self.municipality_id = Some(municipality_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip_db_str() {
        let all = [
            ProjectStatus::Rascunho,
            ProjectStatus::Solicitacao,
            ProjectStatus::Briefing,
            ProjectStatus::Diagnostico,
            ProjectStatus::Validacao,
            ProjectStatus::Execucao,
            ProjectStatus::Entrega,
            ProjectStatus::Concluido,
            ProjectStatus::Pausado,
        ];
        for status in all {
            assert_eq!(ProjectStatus::from_db_str(status.to_db_str()), Some(status));
        }
        assert_eq!(ProjectStatus::from_db_str("inexistente"), None);
    }

    #[test]
    fn test_queue_eligibility() {
        assert!(ProjectStatus::Validacao.is_queue_eligible());
        assert!(ProjectStatus::Execucao.is_queue_eligible());
        assert!(!ProjectStatus::Diagnostico.is_queue_eligible());
        assert!(!ProjectStatus::Pausado.is_queue_eligible());
    }

    #[test]
    fn test_role_staff() {
        assert!(UserRole::GestorAmvali.is_amvali_staff());
        assert!(UserRole::TecnicoAmvali.is_amvali_staff());
        assert!(!UserRole::Municipal.is_amvali_staff());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&ProjectStatus::Solicitacao).unwrap();
        assert_eq!(json, "\"solicitacao\"");
        let role: UserRole = serde_json::from_str("\"gestor_amvali\"").unwrap();
        assert_eq!(role, UserRole::GestorAmvali);
    }
}
