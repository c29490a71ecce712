//! Migration step registry and dependency resolution

use crate::error::{MigrateError, MigrateResult};
use crate::ledger::Ledger;
use gw_core::StepDag;
use gw_db::Database;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Everything a step's action may touch during its transaction
pub struct MigrationCtx<'a> {
    /// Live database handle, already inside the step's transaction
    pub db: &'a dyn Database,

    /// Ledger of applied steps, for gating checks
    pub ledger: &'a Ledger,

    /// Name of the step currently executing
    pub step: &'a str,
}

/// A step's unit of work: runs against the context and reports success
pub type StepAction = Box<dyn Fn(&MigrationCtx<'_>) -> MigrateResult<bool> + Send + Sync>;

/// A named, idempotent migration step with prerequisite edges
pub struct MigrationStep {
    /// Unique name, also the primary key in the ledger
    pub name: String,

    /// Names of steps that must be applied before this one runs
    pub requires: Vec<String>,

    /// Registration order, the tie-break for independent steps
    pub rank: usize,

    action: StepAction,
}

impl MigrationStep {
    /// Run the step's action
    pub fn invoke(&self, ctx: &MigrationCtx<'_>) -> MigrateResult<bool> {
        (self.action)(ctx)
    }
}

impl fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationStep")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .field("rank", &self.rank)
            .finish_non_exhaustive()
    }
}

/// Collects migration steps and resolves their execution order
///
/// The registry is pure metadata plus a topological solver; it never
/// holds a database connection. Multiple independent registries can be
/// built side by side (there is no process-wide singleton).
#[derive(Default)]
pub struct Registry {
    steps: Vec<MigrationStep>,
    names: HashSet<String>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step with its prerequisites
    ///
    /// Forward references in `requires` are allowed; they are validated
    /// when the order is resolved.
    pub fn register(
        &mut self,
        name: &str,
        requires: &[&str],
        action: StepAction,
    ) -> MigrateResult<()> {
        if name.is_empty() {
            return Err(gw_core::CoreError::EmptyName {
                context: "migration step name".into(),
            }
            .into());
        }
        if self.names.contains(name) {
            return Err(MigrateError::DuplicateStep {
                name: name.to_string(),
            });
        }

        let rank = self.steps.len();
        self.names.insert(name.to_string());
        self.steps.push(MigrationStep {
            name: name.to_string(),
            requires: requires.iter().map(|s| s.to_string()).collect(),
            rank,
            action,
        });
        log::debug!("registered migration step '{}' (rank {})", name, rank);
        Ok(())
    }

    /// Number of registered steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True if no steps are registered
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Look up a step by name
    pub fn get(&self, name: &str) -> Option<&MigrationStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Resolve the execution order for the steps not yet applied
    ///
    /// Returns the pending subset topologically sorted by `requires`,
    /// ties broken by registration order — a compatibility guarantee, so
    /// identical inputs resolve identically across runs. A prerequisite
    /// that is neither applied nor registered fails with
    /// `UnknownDependency`; a cycle fails with the rendered cycle path.
    pub fn resolve_order(
        &self,
        applied: &HashSet<String>,
    ) -> MigrateResult<Vec<&MigrationStep>> {
        let mut dag = StepDag::new();
        let mut pending: HashMap<&str, &MigrationStep> = HashMap::new();

        // Nodes are added in registration order, which is what makes the
        // solver's tie-break deterministic.
        for step in &self.steps {
            if applied.contains(&step.name) {
                continue;
            }
            dag.add_node(&step.name)?;
            pending.insert(step.name.as_str(), step);
        }

        for step in pending.values() {
            for requirement in &step.requires {
                if applied.contains(requirement) {
                    continue;
                }
                if !self.names.contains(requirement) {
                    return Err(MigrateError::UnknownDependency {
                        step: step.name.clone(),
                        missing: requirement.clone(),
                    });
                }
                dag.add_dependency(&step.name, requirement)?;
            }
        }

        let order = dag.topological_order()?;
        Ok(order
            .iter()
            .filter_map(|name| pending.get(name.as_str()).copied())
            .collect())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("steps", &self.names())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
