// ==========================================
// Portal IntraAMVALI - Camada de aplicação (HTTP)
// ==========================================

pub mod routes;
pub mod state;

pub use routes::{build_router, ErrorBody};
pub use state::{AppState, ADVISOR_API_KEY_ENV};

/// Caminho padrão do banco de dados (diretório de dados do sistema)
pub fn get_default_db_path() -> String {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("amvali-core");
    if let Err(err) = std::fs::create_dir_all(&dir) {
        tracing::warn!("falha ao criar diretório de dados {:?}: {}", dir, err);
    }
    dir.join("amvali.db").to_string_lossy().to_string()
}
