// ==========================================
// Portal IntraAMVALI - Máquina de estados de etapas
// ==========================================
// Responsabilidade: progressão do ciclo de vida do projeto
// - sub-status independente por etapa (pending/in_progress/completed)
// - situação macro derivada da etapa em andamento
// - pausa registra o estado anterior; retomada o restaura exatamente
// - concluido é terminal
// ==========================================
// progress_percent = etapas concluídas / total * 100, recalculado a
// cada mutação de etapa - nunca persiste desatualizado.
// ==========================================

use crate::domain::project::{Project, ProjectStage};
use crate::domain::types::{ProjectStatus, StageStatus};
use chrono::{DateTime, Utc};
use thiserror::Error;

// ==========================================
// Erros da máquina de estados
// ==========================================
#[derive(Error, Debug)]
pub enum StageMachineError {
    #[error("projeto em estado terminal ({status}): nenhuma transição é permitida")]
    TerminalState { status: String },

    #[error("índice de etapa inválido: {index} (roadmap possui {total} etapas)")]
    InvalidStageIndex { index: usize, total: usize },

    #[error("transição inválida: de {from} para {to}")]
    InvalidTransition { from: String, to: String },
}

/// Resultado de uma atualização de etapa (insumo para notificação)
#[derive(Debug, Clone)]
pub struct StageUpdateOutcome {
    pub stage_name: String,
    pub new_project_status: ProjectStatus,
    pub progress_percent: f64,
}

// ==========================================
// StageMachine
// ==========================================
pub struct StageMachine {
    // engine sem estado
}

impl StageMachine {
    pub fn new() -> Self {
        Self {}
    }

    /// Aplica uma transição de sub-status em uma etapa do roadmap
    ///
    /// Efeitos sobre o projeto (em memória; persistência é da API):
    /// - carimba started_at na primeira passagem a in_progress
    /// - carimba completed_at ao concluir a etapa
    /// - recalcula progress_percent
    /// - deriva a situação macro; todas as etapas concluídas => concluido
    ///
    /// # Erros
    /// - TerminalState: projeto concluído não transiciona
    /// - InvalidTransition: projeto pausado exige retomada antes
    /// - InvalidStageIndex: índice fora do roadmap
    pub fn apply_stage_update(
        &self,
        project: &mut Project,
        stage_index: usize,
        new_status: StageStatus,
        now: DateTime<Utc>,
    ) -> Result<StageUpdateOutcome, StageMachineError> {
        if project.status.is_terminal() {
            return Err(StageMachineError::TerminalState {
                status: project.status.to_string(),
            });
        }
        if project.status == ProjectStatus::Pausado {
            return Err(StageMachineError::InvalidTransition {
                from: ProjectStatus::Pausado.to_string(),
                to: new_status.to_string(),
            });
        }

        let total = project.stages.len();
        let stage = project
            .stages
            .get_mut(stage_index)
            .ok_or(StageMachineError::InvalidStageIndex {
                index: stage_index,
                total,
            })?;

        stage.status = new_status;
        match new_status {
            StageStatus::InProgress => {
                if stage.started_at.is_none() {
                    stage.started_at = Some(now);
                }
            }
            StageStatus::Completed => {
                stage.completed_at = Some(now);
            }
            StageStatus::Pending => {
                // Reaberta: o carimbo de conclusão deixa de valer
                stage.completed_at = None;
            }
        }
        let stage_name = stage.name.clone();

        project.progress_percent = Self::recompute_progress(&project.stages);

        let all_completed = project
            .stages
            .iter()
            .all(|s| s.status == StageStatus::Completed);
        project.status = if all_completed {
            ProjectStatus::Concluido
        } else {
            Self::status_for_stage(stage_index)
        };

        Ok(StageUpdateOutcome {
            stage_name,
            new_project_status: project.status,
            progress_percent: project.progress_percent,
        })
    }

    /// Suspende o projeto, registrando o estado de origem
    pub fn pause(&self, project: &mut Project) -> Result<(), StageMachineError> {
        if project.status.is_terminal() {
            return Err(StageMachineError::TerminalState {
                status: project.status.to_string(),
            });
        }
        if project.status == ProjectStatus::Pausado {
            return Err(StageMachineError::InvalidTransition {
                from: ProjectStatus::Pausado.to_string(),
                to: ProjectStatus::Pausado.to_string(),
            });
        }

        project.paused_from = Some(project.status);
        project.status = ProjectStatus::Pausado;
        Ok(())
    }

    /// Retoma o projeto para o estado registrado na pausa
    pub fn resume(&self, project: &mut Project) -> Result<(), StageMachineError> {
        if project.status != ProjectStatus::Pausado {
            return Err(StageMachineError::InvalidTransition {
                from: project.status.to_string(),
                to: "retomada".to_string(),
            });
        }

        let target = project.paused_from.take().ok_or_else(|| {
            // Pausa sem registro de origem é anomalia de dados, não um
            // destino a adivinhar
            StageMachineError::InvalidTransition {
                from: ProjectStatus::Pausado.to_string(),
                to: "desconhecido".to_string(),
            }
        })?;
        project.status = target;
        Ok(())
    }

    /// Situação macro correspondente à etapa em movimento
    fn status_for_stage(stage_index: usize) -> ProjectStatus {
        match stage_index {
            0 => ProjectStatus::Solicitacao,
            1 => ProjectStatus::Briefing,
            2 => ProjectStatus::Diagnostico,
            3 => ProjectStatus::Validacao,
            4 => ProjectStatus::Execucao,
            _ => ProjectStatus::Entrega,
        }
    }

    /// Razão de etapas concluídas, em percentual
    pub fn recompute_progress(stages: &[ProjectStage]) -> f64 {
        if stages.is_empty() {
            return 0.0;
        }
        let completed = stages
            .iter()
            .filter(|s| s.status == StageStatus::Completed)
            .count();
        (completed as f64 / stages.len() as f64) * 100.0
    }
}

impl Default for StageMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Complexity, ProjectType};
    use chrono::TimeZone;

    fn make_project() -> Project {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        Project {
            id: "p1".to_string(),
            title: "Pavimentação Rua das Flores".to_string(),
            description: "Trecho de 500m".to_string(),
            project_type: ProjectType::Pavimentacao,
            municipality_id: "m1".to_string(),
            municipality_name: "Jaraguá do Sul".to_string(),
            priority: 3,
            complexity: Some(Complexity::Media),
            impact_score: 7,
            urgency_score: 6,
            cost_score: 5,
            ipr_score: Some(7.6),
            status: ProjectStatus::Solicitacao,
            paused_from: None,
            stages: ProjectStage::default_roadmap(),
            progress_percent: 0.0,
            assigned_team: Vec::new(),
            location: None,
            scope: None,
            purpose: None,
            estimated_deadline: None,
            ai_justification: None,
            created_at: now,
            updated_at: now,
            revision: Some(0),
        }
    }

    #[test]
    fn test_stage_in_progress_stamps_started_at_once() {
        let machine = StageMachine::new();
        let mut project = make_project();
        let t1 = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 3, 3, 10, 0, 0).unwrap();

        machine
            .apply_stage_update(&mut project, 1, StageStatus::InProgress, t1)
            .unwrap();
        assert_eq!(project.stages[1].started_at, Some(t1));
        assert_eq!(project.status, ProjectStatus::Briefing);

        // Segunda passagem não regrava o início
        machine
            .apply_stage_update(&mut project, 1, StageStatus::InProgress, t2)
            .unwrap();
        assert_eq!(project.stages[1].started_at, Some(t1));
    }

    #[test]
    fn test_progress_recomputed_on_each_mutation() {
        let machine = StageMachine::new();
        let mut project = make_project();
        let now = Utc::now();

        machine
            .apply_stage_update(&mut project, 0, StageStatus::Completed, now)
            .unwrap();
        assert!((project.progress_percent - 100.0 / 6.0).abs() < 1e-9);

        machine
            .apply_stage_update(&mut project, 1, StageStatus::Completed, now)
            .unwrap();
        assert!((project.progress_percent - 200.0 / 6.0).abs() < 1e-9);

        // Reabrir uma etapa reduz o progresso
        machine
            .apply_stage_update(&mut project, 1, StageStatus::Pending, now)
            .unwrap();
        assert!((project.progress_percent - 100.0 / 6.0).abs() < 1e-9);
        assert_eq!(project.stages[1].completed_at, None);
    }

    #[test]
    fn test_completing_all_stages_concludes_project() {
        let machine = StageMachine::new();
        let mut project = make_project();
        let now = Utc::now();

        for index in 0..6 {
            machine
                .apply_stage_update(&mut project, index, StageStatus::Completed, now)
                .unwrap();
        }
        assert_eq!(project.status, ProjectStatus::Concluido);
        assert_eq!(project.progress_percent, 100.0);
    }

    #[test]
    fn test_terminal_state_rejects_transitions() {
        let machine = StageMachine::new();
        let mut project = make_project();
        let now = Utc::now();
        for index in 0..6 {
            machine
                .apply_stage_update(&mut project, index, StageStatus::Completed, now)
                .unwrap();
        }

        let err = machine
            .apply_stage_update(&mut project, 0, StageStatus::InProgress, now)
            .unwrap_err();
        assert!(matches!(err, StageMachineError::TerminalState { .. }));

        let err = machine.pause(&mut project).unwrap_err();
        assert!(matches!(err, StageMachineError::TerminalState { .. }));
    }

    #[test]
    fn test_pause_and_resume_roundtrip() {
        let machine = StageMachine::new();
        let mut project = make_project();
        let now = Utc::now();

        machine
            .apply_stage_update(&mut project, 4, StageStatus::InProgress, now)
            .unwrap();
        assert_eq!(project.status, ProjectStatus::Execucao);

        machine.pause(&mut project).unwrap();
        assert_eq!(project.status, ProjectStatus::Pausado);
        assert_eq!(project.paused_from, Some(ProjectStatus::Execucao));

        // Pausado não aceita movimentação de etapas
        let err = machine
            .apply_stage_update(&mut project, 4, StageStatus::Completed, now)
            .unwrap_err();
        assert!(matches!(err, StageMachineError::InvalidTransition { .. }));

        machine.resume(&mut project).unwrap();
        assert_eq!(project.status, ProjectStatus::Execucao);
        assert_eq!(project.paused_from, None);
    }

    #[test]
    fn test_resume_requires_paused() {
        let machine = StageMachine::new();
        let mut project = make_project();
        let err = machine.resume(&mut project).unwrap_err();
        assert!(matches!(err, StageMachineError::InvalidTransition { .. }));
    }

    #[test]
    fn test_invalid_stage_index() {
        let machine = StageMachine::new();
        let mut project = make_project();
        let err = machine
            .apply_stage_update(&mut project, 99, StageStatus::Completed, Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            StageMachineError::InvalidStageIndex { index: 99, total: 6 }
        ));
    }
}
