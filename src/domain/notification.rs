// ==========================================
// Portal IntraAMVALI - Modelo de domínio: Notificação
// ==========================================
// Emitida pelo núcleo em transições de etapa; consumida pelo portal.
// user_id pode referenciar um usuário ou um município (escopo municipal).
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub read: bool,
    pub project_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn info(
        user_id: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: title.into(),
            message: message.into(),
            notification_type: "info".to_string(),
            read: false,
            project_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn for_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }
}
