// ==========================================
// Portal IntraAMVALI - Erros da camada de API
// ==========================================
// Taxonomia estável exposta ao chamador:
// - Validation: entrada malformada/fora de faixa, rejeitada antes de
//   qualquer mutação
// - Authorization: papel sem permissão (distinto de NotFound)
// - Conflict: mutação concorrente detectada; o chamador recarrega e
//   tenta de novo
// - Dependency: serviço de diagnóstico indisponível; retryável, sem
//   corromper estado
// - NotFound: referência inexistente
// Nenhum erro é engolido em valor padrão que corrompa ipr_score ou
// progress_percent.
// ==========================================

use crate::advisor::AdvisorError;
use crate::engine::StageMachineError;
use crate::repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ===== Validação =====
    #[error("entrada inválida: {0}")]
    Validation(String),

    #[error("transição de estado inválida: de {from} para {to}")]
    InvalidStateTransition { from: String, to: String },

    // ===== Autorização =====
    #[error("acesso negado: {0}")]
    Authorization(String),

    // ===== Concorrência =====
    #[error("conflito de edição concorrente: {0}")]
    Conflict(String),

    // ===== Dependência externa =====
    #[error("dependência indisponível: {0}")]
    Dependency(String),

    // ===== Referências =====
    #[error("recurso não encontrado: {0}")]
    NotFound(String),

    // ===== Infraestrutura =====
    #[error("erro de banco de dados: {0}")]
    DatabaseError(String),

    #[error("falha de conexão com o banco: {0}")]
    DatabaseConnectionError(String),

    #[error("erro interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// Conversão de erros do repositório
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::OptimisticLockFailure {
                entity,
                id,
                expected,
                actual,
            } => ApiError::Conflict(format!(
                "{}(id={}) foi modificado por outro usuário (revision esperada={}, atual={})",
                entity, id, expected, actual
            )),

            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={}) não existe", entity, id))
            }

            RepositoryError::BusinessRuleViolation(msg) => ApiError::Validation(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::Validation(format!("violação de unicidade: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::Validation(format!("referência inválida: {}", msg))
            }
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }

            RepositoryError::DatabaseConnectionError(msg) => {
                ApiError::DatabaseConnectionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("lock do banco indisponível: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),

            RepositoryError::FieldValueError { field, message } => {
                ApiError::InternalError(format!("dado inconsistente no campo {}: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// Conversão de erros do serviço de diagnóstico
// ==========================================
// Toda falha do advisor é da classe dependência: retryável e sem
// efeito sobre complexity/ipr_score.
impl From<AdvisorError> for ApiError {
    fn from(err: AdvisorError) -> Self {
        ApiError::Dependency(err.to_string())
    }
}

// ==========================================
// Conversão de erros da máquina de estados
// ==========================================
impl From<StageMachineError> for ApiError {
    fn from(err: StageMachineError) -> Self {
        match err {
            StageMachineError::TerminalState { status } => ApiError::InvalidStateTransition {
                from: status,
                to: "qualquer".to_string(),
            },
            StageMachineError::InvalidTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }
            StageMachineError::InvalidStageIndex { index, total } => ApiError::Validation(
                format!("índice de etapa inválido: {} (roadmap possui {})", index, total),
            ),
        }
    }
}

/// Alias de Result da camada
pub type ApiResult<T> = Result<T, ApiError>;
