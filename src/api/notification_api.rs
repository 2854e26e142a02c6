// ==========================================
// Portal IntraAMVALI - API de notificações
// ==========================================
// Papel municipal recebe as notificações endereçadas ao usuário e as
// do próprio município (escopo duplo).
// ==========================================

use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::domain::notification::Notification;
use crate::domain::types::{Principal, UserRole};
use crate::repository::NotificationRepository;

/// Limite de notificações retornadas por consulta
const NOTIFICATION_PAGE_LIMIT: i64 = 50;

pub struct NotificationApi {
    notification_repo: Arc<NotificationRepository>,
}

impl NotificationApi {
    pub fn new(notification_repo: Arc<NotificationRepository>) -> Self {
        Self { notification_repo }
    }

    pub fn list(&self, principal: &Principal) -> ApiResult<Vec<Notification>> {
        let mut scopes = vec![principal.user_id.clone()];
        if principal.role == UserRole::Municipal {
            if let Some(municipality_id) = &principal.municipality_id {
                scopes.push(municipality_id.clone());
            }
        }
        Ok(self
            .notification_repo
            .list_for_scopes(&scopes, NOTIFICATION_PAGE_LIMIT)?)
    }

    pub fn mark_read(&self, _principal: &Principal, id: &str) -> ApiResult<()> {
        Ok(self.notification_repo.mark_read(id)?)
    }
}
