// ==========================================
// Portal IntraAMVALI - Camada de engines
// ==========================================
// Regras de negócio determinísticas; engines não montam SQL.
// ==========================================

pub mod capacity;
pub mod priority_budget;
pub mod queue_ranker;
pub mod scoring;
pub mod stage_machine;

pub use capacity::{AllocationPlan, CapacityEngine, CapacityWarning};
pub use priority_budget::{BudgetViolation, PriorityBudget};
pub use queue_ranker::QueueRanker;
pub use scoring::ScoringEngine;
pub use stage_machine::{StageMachine, StageMachineError, StageUpdateOutcome};
