// ==========================================
// Portal IntraAMVALI - Entrada do serviço HTTP
// ==========================================
// Núcleo de priorização e alocação consumido pelo portal web.
// ==========================================

use std::sync::Arc;

use amvali_core::app::{build_router, get_default_db_path, AppState};
use amvali_core::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", amvali_core::APP_NAME);
    tracing::info!("versão: {}", amvali_core::VERSION);
    tracing::info!("==================================================");

    let db_path = std::env::var("AMVALI_DB_PATH").unwrap_or_else(|_| get_default_db_path());
    tracing::info!("banco de dados: {}", db_path);

    let state = Arc::new(AppState::new(&db_path)?);
    let router = build_router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("escutando em {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
