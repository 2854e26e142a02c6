// ==========================================
// Portal IntraAMVALI - Camada de domínio
// ==========================================

pub mod municipality;
pub mod notification;
pub mod project;
pub mod technician;
pub mod types;

pub use municipality::{EngagementUpdate, Municipality, NewMunicipality};
pub use notification::Notification;
pub use project::{NewProject, Project, ProjectPatch, ProjectStage};
pub use technician::{AssignedProjectRef, TeamMember, Technician, DEFAULT_WORKLOAD_HOURS};
pub use types::{Complexity, Principal, ProjectStatus, ProjectType, StageStatus, UserRole};
