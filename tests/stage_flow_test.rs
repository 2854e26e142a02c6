// ==========================================
// Testes do fluxo de etapas (ciclo de vida)
// ==========================================
// Cobertura:
// 1. autorização por papel nas transições
// 2. progresso derivado e conclusão do projeto
// 3. liberação de estrelas e contadores na conclusão
// 4. pausa/retomada com estado registrado
// 5. notificação emitida na transição
// ==========================================

mod test_helpers;

use amvali_core::api::ApiError;
use amvali_core::domain::types::{ProjectStatus, StageStatus, UserRole};
use amvali_core::domain::Principal;
use test_helpers::{gestor, municipal, new_project, seed_municipality, setup_env, tecnico};

#[test]
fn test_stage_update_requires_amvali_staff() {
    let (_db, env) = setup_env();
    let m = seed_municipality(&env, "Jaraguá do Sul", "JS");
    let project = env
        .project_api
        .create(&municipal(&m.id), new_project(&m.id, "Creche", 3))
        .unwrap();

    // Papel municipal não avança etapas (erro de autorização, sem efeito)
    let err = env
        .project_api
        .update_stage(&municipal(&m.id), &project.id, 0, StageStatus::Completed)
        .unwrap_err();
    assert!(matches!(err, ApiError::Authorization(_)));

    let unchanged = env.project_api.get(&gestor(), &project.id).unwrap();
    assert_eq!(unchanged.progress_percent, 0.0);

    // Técnico pode
    assert!(env
        .project_api
        .update_stage(&tecnico(), &project.id, 0, StageStatus::InProgress)
        .is_ok());
}

#[test]
fn test_progress_and_status_follow_stages() {
    let (_db, env) = setup_env();
    let m = seed_municipality(&env, "Guaramirim", "GR");
    let project = env
        .project_api
        .create(&gestor(), new_project(&m.id, "Drenagem", 3))
        .unwrap();

    let after = env
        .project_api
        .update_stage(&tecnico(), &project.id, 1, StageStatus::InProgress)
        .unwrap();
    assert_eq!(after.status, ProjectStatus::Briefing);
    assert!(after.stages[1].started_at.is_some());
    assert_eq!(after.progress_percent, 0.0);

    let after = env
        .project_api
        .update_stage(&tecnico(), &project.id, 1, StageStatus::Completed)
        .unwrap();
    assert!(after.stages[1].completed_at.is_some());
    assert!((after.progress_percent - 100.0 / 6.0).abs() < 1e-9);
}

#[test]
fn test_completing_all_stages_concludes_and_releases_stars() {
    let (_db, env) = setup_env();
    let m = seed_municipality(&env, "Schroeder", "SC");
    let project = env
        .project_api
        .create(&gestor(), new_project(&m.id, "Praça Central", 4))
        .unwrap();

    let committed = env.municipality_repo.find_by_id(&m.id).unwrap().unwrap();
    assert_eq!(committed.stars_in_area(project.project_type), 4);

    for index in 0..5 {
        env.project_api
            .update_stage(&tecnico(), &project.id, index, StageStatus::Completed)
            .unwrap();
    }
    let last = env
        .project_api
        .update_stage(&tecnico(), &project.id, 5, StageStatus::Completed)
        .unwrap();
    assert_eq!(last.status, ProjectStatus::Concluido);
    assert_eq!(last.progress_percent, 100.0);

    // Conclusão devolve as estrelas e conta o projeto concluído
    let released = env.municipality_repo.find_by_id(&m.id).unwrap().unwrap();
    assert_eq!(released.stars_in_area(project.project_type), 0);
    assert_eq!(released.completed_projects, 1);

    // Terminal: nenhuma transição de saída
    let err = env
        .project_api
        .update_stage(&tecnico(), &project.id, 0, StageStatus::InProgress)
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidStateTransition { .. }));
}

#[test]
fn test_pause_records_origin_and_resume_restores() {
    let (_db, env) = setup_env();
    let m = seed_municipality(&env, "Corupá", "CR");
    let project = env
        .project_api
        .create(&gestor(), new_project(&m.id, "Ponte", 3))
        .unwrap();

    env.project_api
        .update_stage(&tecnico(), &project.id, 4, StageStatus::InProgress)
        .unwrap();

    let paused = env.project_api.pause(&tecnico(), &project.id).unwrap();
    assert_eq!(paused.status, ProjectStatus::Pausado);
    assert_eq!(paused.paused_from, Some(ProjectStatus::Execucao));

    // Pausado não movimenta etapas
    let err = env
        .project_api
        .update_stage(&tecnico(), &project.id, 4, StageStatus::Completed)
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidStateTransition { .. }));

    let resumed = env.project_api.resume(&tecnico(), &project.id).unwrap();
    assert_eq!(resumed.status, ProjectStatus::Execucao);
    assert_eq!(resumed.paused_from, None);
}

#[test]
fn test_stage_update_emits_notification_to_municipality() {
    let (_db, env) = setup_env();
    let m = seed_municipality(&env, "Massaranduba", "MS");
    let project = env
        .project_api
        .create(&gestor(), new_project(&m.id, "Pavimentação", 2))
        .unwrap();

    env.project_api
        .update_stage(&tecnico(), &project.id, 0, StageStatus::Completed)
        .unwrap();

    // O município do projeto recebe a notificação
    let principal = Principal::new("prefeito-1", UserRole::Municipal).with_municipality(&m.id);
    let notifications = env.notification_api.list(&principal).unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].title.contains("Solicitação Formal"));
    assert_eq!(notifications[0].project_id.as_deref(), Some(project.id.as_str()));

    // Marcar como lida
    env.notification_api
        .mark_read(&principal, &notifications[0].id)
        .unwrap();
    let after = env.notification_api.list(&principal).unwrap();
    assert!(after[0].read);
}

#[test]
fn test_invalid_stage_index_is_validation_error() {
    let (_db, env) = setup_env();
    let m = seed_municipality(&env, "Jaraguá do Sul", "JS");
    let project = env
        .project_api
        .create(&gestor(), new_project(&m.id, "Reforma", 2))
        .unwrap();

    let err = env
        .project_api
        .update_stage(&tecnico(), &project.id, 42, StageStatus::Completed)
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}
