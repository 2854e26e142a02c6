// ==========================================
// Portal IntraAMVALI - Engine de capacidade da equipe
// ==========================================
// Responsabilidade: capacidade derivada e plano de alocação
// - capacity_percent = ativos * horas_por_projeto / carga_semanal * 100
// - percentual reportado sem teto: sobrecarga real fica visível
// - limiar de alerta é consultivo; capacidade nunca bloqueia alocação
// ==========================================

use crate::config::CapacityParams;
use crate::domain::technician::Technician;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Alerta consultivo de capacidade (acima do limiar configurado)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityWarning {
    pub technician_id: String,
    pub technician_name: String,
    /// Percentual resultante após a alocação proposta
    pub capacity_percent: f64,
}

/// Diferença entre a equipe atual e a solicitada
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationPlan {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl AllocationPlan {
    /// União de removidos e adicionados (técnicos a recontar)
    pub fn affected(&self) -> Vec<String> {
        let mut affected = self.removed.clone();
        affected.extend(self.added.iter().cloned());
        affected
    }

    /// Mesmo conjunto já alocado: nenhum contador deve mudar
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

// ==========================================
// CapacityEngine
// ==========================================
pub struct CapacityEngine {
    params: CapacityParams,
}

impl CapacityEngine {
    pub fn new(params: CapacityParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> CapacityParams {
        self.params
    }

    /// Percentual de capacidade consumida
    ///
    /// # Parâmetros
    /// - active_projects: projetos ativos alocados ao técnico
    /// - workload_hours: carga semanal declarada (mínimo 1 no cálculo)
    pub fn capacity_percent(&self, active_projects: i64, workload_hours: i32) -> f64 {
        let workload = f64::from(workload_hours.max(1));
        (active_projects as f64 * self.params.hours_per_project) / workload * 100.0
    }

    /// Percentual acima do limiar consultivo de alerta
    pub fn exceeds_threshold(&self, capacity_percent: f64) -> bool {
        capacity_percent > self.params.alert_threshold_pct
    }

    /// Calcula a diferença entre a equipe atual e a solicitada
    ///
    /// Conjuntos são comparados por pertencimento: repetir a equipe
    /// atual produz um plano vazio (alocação idempotente). Ids
    /// repetidos na solicitação contam uma única vez.
    pub fn plan_allocation(&self, current: &[String], requested: &[String]) -> AllocationPlan {
        let current_set: HashSet<&String> = current.iter().collect();
        let requested_set: HashSet<&String> = requested.iter().collect();

        let mut seen = HashSet::new();
        let added: Vec<String> = requested
            .iter()
            .filter(|id| !current_set.contains(*id) && seen.insert((*id).clone()))
            .cloned()
            .collect();

        let removed: Vec<String> = current
            .iter()
            .filter(|id| !requested_set.contains(*id))
            .cloned()
            .collect();

        AllocationPlan { added, removed }
    }

    /// Projeta a capacidade resultante e gera alertas consultivos
    ///
    /// Para técnicos recém-adicionados a contagem projetada é
    /// ativos + 1; removidos e inalterados usam a contagem atual.
    pub fn evaluate_warnings(
        &self,
        technicians: &[Technician],
        plan: &AllocationPlan,
    ) -> Vec<CapacityWarning> {
        let mut warnings = Vec::new();
        for technician in technicians {
            let projected = if plan.added.contains(&technician.id) {
                i64::from(technician.active_projects) + 1
            } else {
                i64::from(technician.active_projects)
            };
            let pct = self.capacity_percent(projected, technician.workload_hours);
            if self.exceeds_threshold(pct) {
                warnings.push(CapacityWarning {
                    technician_id: technician.id.clone(),
                    technician_name: technician.name.clone(),
                    capacity_percent: pct,
                });
            }
        }
        warnings
    }
}

impl Default for CapacityEngine {
    fn default() -> Self {
        Self::new(CapacityParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> CapacityEngine {
        CapacityEngine::new(CapacityParams {
            hours_per_project: 8.0,
            alert_threshold_pct: 85.0,
        })
    }

    #[test]
    fn test_capacity_percent_formula() {
        let engine = engine();
        // 4 projetos * 8h / 40h = 80%
        assert_eq!(engine.capacity_percent(4, 40), 80.0);
        assert_eq!(engine.capacity_percent(0, 40), 0.0);
        // Sobrecarga fica visível (sem teto em 100)
        assert_eq!(engine.capacity_percent(6, 40), 120.0);
    }

    #[test]
    fn test_capacity_guards_zero_workload() {
        let engine = engine();
        // Carga declarada inválida não divide por zero
        assert!(engine.capacity_percent(1, 0).is_finite());
    }

    #[test]
    fn test_threshold_is_strictly_above() {
        let engine = engine();
        assert!(!engine.exceeds_threshold(85.0));
        assert!(engine.exceeds_threshold(85.1));
    }

    #[test]
    fn test_plan_allocation_diff() {
        let engine = engine();
        let current = vec!["t1".to_string(), "t2".to_string()];
        let requested = vec!["t2".to_string(), "t3".to_string()];

        let plan = engine.plan_allocation(&current, &requested);
        assert_eq!(plan.added, vec!["t3".to_string()]);
        assert_eq!(plan.removed, vec!["t1".to_string()]);
        assert_eq!(plan.affected(), vec!["t1".to_string(), "t3".to_string()]);
    }

    #[test]
    fn test_plan_same_team_is_noop() {
        let engine = engine();
        let current = vec!["t1".to_string(), "t2".to_string()];
        let requested = vec!["t2".to_string(), "t1".to_string()];
        assert!(engine.plan_allocation(&current, &requested).is_noop());
    }

    #[test]
    fn test_warnings_only_above_threshold() {
        let engine = engine();
        let mut busy = Technician::new("Ana Santos", "ana@amvali.org.br");
        busy.id = "t1".to_string();
        busy.active_projects = 4; // projetado: 5 * 8h / 40h = 100%
        let mut free = Technician::new("Pedro Costa", "pedro@amvali.org.br");
        free.id = "t2".to_string();
        free.active_projects = 1;

        let plan = AllocationPlan {
            added: vec!["t1".to_string(), "t2".to_string()],
            removed: vec![],
        };
        let warnings = engine.evaluate_warnings(&[busy, free], &plan);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].technician_id, "t1");
        assert_eq!(warnings[0].capacity_percent, 100.0);
    }
}
