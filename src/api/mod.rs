// ==========================================
// Portal IntraAMVALI - Camada de API
// ==========================================
// Serviços de aplicação consumidos pela camada HTTP (app/).
// Todos recebem o Principal autenticado explicitamente por chamada.
// ==========================================

pub mod dashboard_api;
pub mod diagnosis_api;
pub mod error;
pub mod municipality_api;
pub mod notification_api;
pub mod project_api;
pub mod queue_api;
pub mod team_api;
pub mod validator;

pub use dashboard_api::{DashboardApi, DashboardStats, MunicipalityDashboard};
pub use diagnosis_api::{DiagnoseComplexityRequest, DiagnosisApi, SuggestAllocationRequest};
pub use error::{ApiError, ApiResult};
pub use municipality_api::MunicipalityApi;
pub use notification_api::NotificationApi;
pub use project_api::ProjectApi;
pub use queue_api::{QueueApi, QueueResponse};
pub use team_api::{AllocateTeamRequest, AllocationResult, TeamApi, TeamResponse, TechnicianCapacity};
