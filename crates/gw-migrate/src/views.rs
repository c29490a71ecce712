//! Scoped lifecycle management for rebuildable views
//!
//! A migration that alters a table under a materialized view cannot just
//! run its DDL: every view reading from that table (directly or through
//! other views) has to come down first and come back up afterwards, in
//! dependency order. `ViewManager::scope` wraps the migration body with
//! exactly that teardown/rebuild pass, computed from the declared `uses`
//! edges.

use crate::error::{MigrateError, MigrateResult};
use crate::registry::MigrationCtx;
use gw_core::StepDag;
use gw_db::Database;
use std::collections::{HashMap, HashSet};

/// A rebuildable database object with declared dependencies
///
/// `name` doubles as the database object name; `uses` lists the views
/// this one reads from, so its rebuild must happen after theirs.
pub trait ViewNode: Send + Sync {
    /// Name of the database object this node manages
    fn name(&self) -> &str;

    /// Names of views this one reads from
    fn uses(&self) -> &[&str] {
        &[]
    }

    /// Migration that must be applied before this view is relevant
    fn since(&self) -> Option<&str> {
        None
    }

    /// Migration after which this view is no longer relevant
    fn until(&self) -> Option<&str> {
        None
    }

    /// Create or recreate the view
    fn up(&self, db: &dyn Database) -> MigrateResult<()>;

    /// Drop the view
    fn down(&self, db: &dyn Database) -> MigrateResult<()>;
}

/// Registry of view nodes plus the scoped teardown/rebuild driver
#[derive(Default)]
pub struct ViewManager {
    views: Vec<Box<dyn ViewNode>>,
    index: HashMap<String, usize>,
}

impl ViewManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view node
    pub fn register(&mut self, view: Box<dyn ViewNode>) -> MigrateResult<()> {
        let name = view.name().to_string();
        if self.index.contains_key(&name) {
            return Err(MigrateError::DuplicateView { name });
        }
        self.index.insert(name, self.views.len());
        self.views.push(view);
        Ok(())
    }

    /// Number of registered views
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// True if no views are registered
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    fn get(&self, name: &str) -> MigrateResult<&dyn ViewNode> {
        self.index
            .get(name)
            .map(|&idx| self.views[idx].as_ref())
            .ok_or_else(|| MigrateError::UnknownView {
                name: name.to_string(),
            })
    }

    /// Build the `uses` graph, validating edge targets and acyclicity
    fn dag(&self) -> MigrateResult<StepDag> {
        let mut dag = StepDag::new();
        for view in &self.views {
            dag.add_node(view.name())?;
        }
        for view in &self.views {
            for used in view.uses() {
                if !self.index.contains_key(*used) {
                    return Err(MigrateError::UnknownView {
                        name: (*used).to_string(),
                    });
                }
                dag.add_dependency(view.name(), used)?;
            }
        }
        dag.validate()?;
        Ok(dag)
    }

    /// Whether the view's validity window is currently open
    ///
    /// `since` must be applied (the step currently executing counts) and
    /// `until` must not be. A closed gate makes both teardown and rebuild
    /// no-ops for that view.
    fn gate_open(&self, view: &dyn ViewNode, ctx: &MigrationCtx<'_>) -> MigrateResult<bool> {
        if let Some(since) = view.since() {
            if ctx.step != since && !ctx.ledger.is_applied(ctx.db, since)? {
                return Ok(false);
            }
        }
        if let Some(until) = view.until() {
            if ctx.ledger.is_applied(ctx.db, until)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Run `body` with the views around `name` torn down
    ///
    /// The affected set is the whole connected component of `name` in the
    /// `uses` graph: the node's own dependencies, plus every view that
    /// (transitively) reads from any member — a view cannot be dropped
    /// while another still reads from it. Teardown runs in reverse
    /// topological order (dependents first) and skips objects that do not
    /// currently exist; the rebuild pass runs in topological order on
    /// scope exit whether or not the body succeeded. Rebuild errors after
    /// a body failure are carried alongside the body error, never
    /// swallowed.
    pub fn scope<T, F>(&self, ctx: &MigrationCtx<'_>, name: &str, body: F) -> MigrateResult<T>
    where
        F: FnOnce(&MigrationCtx<'_>) -> MigrateResult<T>,
    {
        let root = self.get(name)?;
        if !self.gate_open(root, ctx)? {
            // Outside the validity window the view is assumed absent or
            // no longer relevant; nothing to tear down or rebuild.
            log::debug!("view '{}' gated out, scope is a no-op", name);
            return body(ctx);
        }

        let dag = self.dag()?;
        let component: HashSet<String> = dag.component(name).into_iter().collect();
        let ordered: Vec<String> = dag
            .topological_order()?
            .into_iter()
            .filter(|n| component.contains(n))
            .collect();

        let body_result = match self.teardown(ctx, &ordered) {
            Ok(()) => body(ctx),
            Err(e) => Err(e),
        };
        let rebuild_result = self.rebuild(ctx, &ordered);

        match (body_result, rebuild_result) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(rebuild)) => Err(rebuild),
            (Err(body), Ok(())) => Err(body),
            (Err(body), Err(rebuild)) => Err(MigrateError::ViewRebuildAfterFailure {
                rebuild: Box::new(rebuild),
                source: Box::new(body),
            }),
        }
    }

    /// Drop every affected view, dependents before the views they read
    /// from; "does not exist" counts as success
    fn teardown(&self, ctx: &MigrationCtx<'_>, ordered: &[String]) -> MigrateResult<()> {
        for name in ordered.iter().rev() {
            let view = self.get(name)?;
            if !self.gate_open(view, ctx)? {
                continue;
            }
            if !ctx.db.relation_exists(name)? {
                log::debug!("view '{}' does not exist, skipping drop", name);
                continue;
            }
            view.down(ctx.db).map_err(|e| MigrateError::ViewRebuild {
                view: name.clone(),
                source: Box::new(e),
            })?;
            log::debug!("dropped view '{}'", name);
        }
        Ok(())
    }

    /// Recreate every affected view, base views before their dependents
    fn rebuild(&self, ctx: &MigrationCtx<'_>, ordered: &[String]) -> MigrateResult<()> {
        for name in ordered {
            let view = self.get(name)?;
            if !self.gate_open(view, ctx)? {
                continue;
            }
            view.up(ctx.db).map_err(|e| MigrateError::ViewRebuild {
                view: name.clone(),
                source: Box::new(e),
            })?;
            log::debug!("rebuilt view '{}'", name);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "views_test.rs"]
mod tests;
