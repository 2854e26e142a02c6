// ==========================================
// Portal IntraAMVALI - API da fila técnica
// ==========================================
// A fila é uma projeção de leitura: recalculada a cada requisição
// sobre um snapshot consistente, sem ordenação persistida.
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::project::Project;
use crate::domain::types::Principal;
use crate::engine::QueueRanker;
use crate::repository::ProjectRepository;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueResponse {
    pub queue: Vec<Project>,
    pub total: usize,
}

// ==========================================
// QueueApi
// ==========================================
pub struct QueueApi {
    project_repo: Arc<ProjectRepository>,
    ranker: Arc<QueueRanker>,
}

impl QueueApi {
    pub fn new(project_repo: Arc<ProjectRepository>, ranker: Arc<QueueRanker>) -> Self {
        Self {
            project_repo,
            ranker,
        }
    }

    /// Fila ordenada de projetos elegíveis (validacao/execucao com
    /// complexidade classificada)
    ///
    /// A fila cruza municípios; acesso restrito à equipe AMVALI.
    pub fn get_queue(&self, principal: &Principal) -> ApiResult<QueueResponse> {
        if !principal.role.is_amvali_staff() {
            return Err(ApiError::Authorization(format!(
                "papel {} não acessa a fila técnica",
                principal.role
            )));
        }

        let candidates = self.project_repo.list_queue_candidates()?;
        let queue = self.ranker.rank(candidates);
        let total = queue.len();
        Ok(QueueResponse { queue, total })
    }
}
