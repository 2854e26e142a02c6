// ==========================================
// Portal IntraAMVALI - Erros da camada de repositório
// ==========================================
// Ferramenta: macro derive do thiserror
// ==========================================

use thiserror::Error;

/// Erros da camada de repositório
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== Controle de concorrência =====
    #[error("conflito de lock otimista: {entity}(id={id}), revision esperada={expected}, atual={actual}")]
    OptimisticLockFailure {
        entity: String,
        id: String,
        expected: i32,
        actual: i32,
    },

    // ===== Banco de dados =====
    #[error("registro não encontrado: {entity} com id={id}")]
    NotFound { entity: String, id: String },

    #[error("falha de conexão com o banco: {0}")]
    DatabaseConnectionError(String),

    #[error("falha ao obter lock do banco: {0}")]
    LockError(String),

    #[error("falha de transação: {0}")]
    DatabaseTransactionError(String),

    #[error("falha de consulta: {0}")]
    DatabaseQueryError(String),

    #[error("violação de restrição de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("violação de chave estrangeira: {0}")]
    ForeignKeyViolation(String),

    // ===== Regras de negócio =====
    #[error("violação de regra de negócio: {0}")]
    BusinessRuleViolation(String),

    #[error("transição de estado inválida: de {from} para {to}")]
    InvalidStateTransition { from: String, to: String },

    // ===== Qualidade de dados =====
    #[error("campo com valor inválido (campo={field}): {message}")]
    FieldValueError { field: String, message: String },

    // ===== Genérico =====
    #[error("erro interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Desconhecido".to_string(),
                id: "Desconhecido".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::FieldValueError {
            field: "json".to_string(),
            message: err.to_string(),
        }
    }
}

/// Alias de Result da camada
pub type RepositoryResult<T> = Result<T, RepositoryError>;
