//! Scenario runner.

use std::collections::HashMap;
use std::path::PathBuf;

use rewind_core::{ElementId, TxnId};
use rewind_session::{Db, DbConfig};
use rewind_transaction::TxnStatus;
use tempfile::TempDir;

use crate::error::{ScenarioError, ScenarioResult};
use crate::fixtures;
use crate::loader::{Command, Operations, TxnRef};
use crate::scenario::Scenario;

/// What a step produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Result of the last `save` in the step.
    pub saved: Option<Option<TxnId>>,
    /// Result of the last `reverse` or `reinstate` in the step.
    pub status: Option<TxnStatus>,
}

/// The database under test plus the element labels assigned by `insert`.
#[derive(Debug)]
pub struct World {
    pub db: Db,
    labels: HashMap<String, ElementId>,
    config: DbConfig,
}

impl World {
    fn open(config: DbConfig) -> ScenarioResult<Self> {
        let db = Db::open(config.clone()).map_err(|e| ScenarioError::setup(e.to_string()))?;
        Ok(Self {
            db,
            labels: HashMap::new(),
            config,
        })
    }

    /// Element id assigned to `label`.
    pub fn id(&self, label: &str) -> Option<ElementId> {
        self.labels.get(label).copied()
    }

    fn label(&self, label: &str) -> Result<ElementId, String> {
        self.id(label).ok_or_else(|| format!("unknown element label: {label}"))
    }

    /// Run a step's commands. Stops at the first failing command.
    fn execute(&mut self, commands: &[Command]) -> Result<StepOutcome, String> {
        let mut outcome = StepOutcome::default();
        for command in commands {
            self.execute_one(command, &mut outcome)?;
        }
        Ok(outcome)
    }

    fn execute_one(&mut self, command: &Command, outcome: &mut StepOutcome) -> Result<(), String> {
        let db = &mut self.db;
        match command {
            Command::ImportSchema(name) => {
                let json = fixtures::schema_json(name)
                    .ok_or_else(|| format!("unknown schema fixture: {name}"))?;
                db.import_schema_json(json).map_err(|e| e.to_string())?;
            }
            Command::Insert {
                label,
                class,
                props,
            } => {
                let id = db
                    .insert_element(class, props.clone())
                    .map_err(|e| e.to_string())?;
                self.labels.insert(label.clone(), id);
            }
            Command::Set { label, name, value } => {
                let id = self.label(label)?;
                self.db
                    .set_element_prop(id, name, value.clone())
                    .map_err(|e| e.to_string())?;
            }
            Command::Delete(label) => {
                let id = self.label(label)?;
                self.db.delete_element(id).map_err(|e| e.to_string())?;
            }
            Command::Save(description) => {
                outcome.saved = Some(db.save_changes(description).map_err(|e| e.to_string())?);
            }
            Command::Abandon => {
                db.abandon_changes().map_err(|e| e.to_string())?;
            }
            Command::Reverse => {
                outcome.status = Some(db.txns().reverse_single_txn().map_err(|e| e.to_string())?);
            }
            Command::Reinstate => {
                outcome.status = Some(db.txns().reinstate_txn().map_err(|e| e.to_string())?);
            }
            Command::CancelTo(target) => {
                let mut txns = db.txns();
                let id = match target {
                    TxnRef::First => txns.query_first_txn_id(),
                    TxnRef::Current => txns.get_current_txn_id(),
                    TxnRef::Id(id) => *id,
                };
                txns.cancel_to(id).map_err(|e| e.to_string())?;
            }
            Command::Reopen => self.reopen()?,
        }
        Ok(())
    }

    fn reopen(&mut self) -> Result<(), String> {
        if self.config.is_in_memory() {
            return Err("reopen requires a persistent scenario".to_string());
        }
        let reopened = Db::open(self.config.clone()).map_err(|e| e.to_string())?;
        let closed = std::mem::replace(&mut self.db, reopened);
        closed.close().map_err(|e| e.to_string())
    }
}

/// Runs a scenario against a fresh database.
pub struct Runner<'s> {
    scenario: &'s Scenario,
    operations: Operations,
}

impl<'s> Runner<'s> {
    /// Create a new runner for a scenario.
    pub fn new(scenario: &'s Scenario) -> ScenarioResult<Self> {
        let operations = scenario.load_operations()?;
        Ok(Self {
            scenario,
            operations,
        })
    }

    /// Run the scenario.
    pub fn run(&self) -> ScenarioResult<()> {
        // Keeps the journal directory alive until the run ends.
        let (_dir, config) = self.config()?;
        let mut world = World::open(config)?;

        for step in self.scenario.steps() {
            let commands = self
                .operations
                .get_step(&step.name)
                .ok_or_else(|| ScenarioError::step_not_found(&step.name))?;

            let result = world.execute(commands);
            step.assertion.verify(&step.name, &result, &mut world)?;
        }

        Ok(())
    }

    fn config(&self) -> ScenarioResult<(Option<TempDir>, DbConfig)> {
        if !self.scenario.is_persistent() {
            return Ok((None, DbConfig::in_memory()));
        }

        let dir = tempfile::tempdir().map_err(|e| ScenarioError::setup(e.to_string()))?;
        let path: PathBuf = dir.path().join(format!("{}.log", self.scenario.name()));
        let config = DbConfig::file(path).with_sync_on_commit(false);
        Ok((Some(dir), config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;

    #[test]
    fn test_runner_with_inline_operations() {
        // GIVEN a scenario that inserts, saves and reverses
        let ops_source = r#"
--# setup
import_schema TestBim
insert obj1 TestBim:TestPhysicalObject intProperty=100

--# save
save change 1

--# undo
reverse
"#;

        let scenario = Scenario::new("inline")
            .operations_source(ops_source)
            .unwrap()
            .step("setup", |a| a.unsaved(true).exists("obj1"))
            .step("save", |a| a.saved(true).unsaved(false).undo_string("change 1"))
            .step("undo", |a| a.success().missing("obj1").redo_string("change 1"));

        // WHEN/THEN
        scenario.run().unwrap();
    }

    #[test]
    fn test_missing_step_is_reported() {
        let scenario = Scenario::new("missing")
            .operations_source("--# setup\nabandon\n")
            .unwrap()
            .step("nope", |a| a);

        let result = scenario.run();

        assert!(matches!(result, Err(ScenarioError::StepNotFound { .. })));
    }

    #[test]
    fn test_reopen_requires_persistence() {
        let scenario = Scenario::new("reopen_memory")
            .operations_source("--# reopen\nreopen\n")
            .unwrap()
            .step("reopen", |a| a.error("persistent"));

        scenario.run().unwrap();
    }
}
