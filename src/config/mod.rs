// ==========================================
// Portal IntraAMVALI - Camada de configuração
// ==========================================

pub mod config_manager;

pub use config_manager::{CapacityParams, ConfigManager, IprDivisors};
