// ==========================================
// Portal IntraAMVALI - Engine de ordenação da fila técnica
// ==========================================
// Responsabilidade: ordem total e reprodutível da fila de execução
// Entrada: projetos candidatos (qualquer situação)
// Saída: sequência ordenada dos elegíveis
// ==========================================
// Chaves de ordenação:
// 1) ipr_score decrescente
// 2) priority (estrelas) decrescente
// 3) created_at crescente (solicitação mais antiga vence)
// 4) id crescente (desempate final determinístico)
//
// Elegibilidade: status em {validacao, execucao} E complexidade
// classificada. Projeto sem diagnóstico existe no sistema mas não
// entra na fila - nunca é pontuado como zero.
// ==========================================

use crate::domain::project::Project;
use std::cmp::Ordering;

// ==========================================
// QueueRanker
// ==========================================
pub struct QueueRanker {
    // engine sem estado
}

impl QueueRanker {
    pub fn new() -> Self {
        Self {}
    }

    /// Ordena os candidatos elegíveis à fila
    ///
    /// A ordenação é uma projeção de leitura: nenhuma posição é
    /// persistida; chamadas repetidas sobre os mesmos dados produzem
    /// sequências idênticas.
    pub fn rank(&self, projects: Vec<Project>) -> Vec<Project> {
        let mut eligible: Vec<Project> = projects
            .into_iter()
            .filter(|p| Self::is_rankable(p))
            .collect();
        eligible.sort_by(|a, b| self.compare(a, b));
        eligible
    }

    /// Elegível à fila: situação correta e complexidade conhecida
    pub fn is_rankable(project: &Project) -> bool {
        project.status.is_queue_eligible()
            && project.complexity.is_some()
            && project.ipr_score.is_some()
    }

    /// Comparação pelas quatro chaves; Ordering::Less = a na frente
    fn compare(&self, a: &Project, b: &Project) -> Ordering {
        // 1. IPR decrescente (is_rankable garante Some)
        let ipr_a = a.ipr_score.unwrap_or(f64::NEG_INFINITY);
        let ipr_b = b.ipr_score.unwrap_or(f64::NEG_INFINITY);
        match ipr_b.total_cmp(&ipr_a) {
            Ordering::Equal => {}
            other => return other,
        }

        // 2. Prioridade (estrelas) decrescente
        match b.priority.cmp(&a.priority) {
            Ordering::Equal => {}
            other => return other,
        }

        // 3. Criação crescente
        match a.created_at.cmp(&b.created_at) {
            Ordering::Equal => {}
            other => return other,
        }

        // 4. Identidade crescente
        a.id.cmp(&b.id)
    }
}

impl Default for QueueRanker {
    fn default() -> Self {
        Self::new()
    }
}
