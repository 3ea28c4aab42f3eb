//! Assertion types and builders for verifying step results.

use rewind_core::Value;
use rewind_session::Db;
use rewind_transaction::TxnStatus;

use crate::error::{ScenarioError, ScenarioResult};
use crate::runner::{StepOutcome, World};

/// A complete assertion for a step.
#[derive(Default)]
pub struct Assertion {
    // Session state
    pub unsaved: Option<bool>,
    pub pending: Option<bool>,
    pub local: Option<bool>,
    pub can_undo: Option<bool>,
    pub can_redo: Option<bool>,
    pub undo_string: Option<String>,
    pub redo_string: Option<String>,

    // Elements
    pub elements: Option<usize>,
    pub exists: Vec<String>,
    pub missing: Vec<String>,
    pub props: Vec<(String, String, Value)>,

    // Step outcome
    pub saved: Option<bool>,
    pub success: Option<bool>,
    pub status: Option<TxnStatus>,

    // Error assertions
    pub error: Option<String>,

    // Custom assertion function
    #[allow(clippy::type_complexity)]
    pub custom: Option<Box<dyn Fn(&Db) -> bool>>,
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assertion")
            .field("unsaved", &self.unsaved)
            .field("pending", &self.pending)
            .field("local", &self.local)
            .field("can_undo", &self.can_undo)
            .field("can_redo", &self.can_redo)
            .field("undo_string", &self.undo_string)
            .field("redo_string", &self.redo_string)
            .field("elements", &self.elements)
            .field("exists", &self.exists)
            .field("missing", &self.missing)
            .field("props", &self.props)
            .field("saved", &self.saved)
            .field("success", &self.success)
            .field("status", &self.status)
            .field("error", &self.error)
            .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Assertion {
    /// Create a new empty assertion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify the assertion against a step result and the database after it.
    pub fn verify(
        &self,
        step: &str,
        result: &Result<StepOutcome, String>,
        world: &mut World,
    ) -> ScenarioResult<()> {
        let fail = |message: String| ScenarioError::assertion_failed(step, message);

        // Check error expectations first
        if let Some(ref expected_error) = self.error {
            return match result {
                Err(msg) if msg.contains(expected_error.as_str()) => Ok(()),
                Err(msg) => Err(fail(format!(
                    "expected error containing '{}', got: {}",
                    expected_error, msg
                ))),
                Ok(_) => Err(fail(format!(
                    "expected error containing '{}', but step succeeded",
                    expected_error
                ))),
            };
        }

        let outcome = result
            .as_ref()
            .map_err(|msg| fail(format!("step failed: {}", msg)))?;

        self.verify_outcome(outcome).map_err(fail)?;
        self.verify_state(world).map_err(fail)?;
        self.verify_elements(world).map_err(fail)?;

        if let Some(ref custom) = self.custom {
            if !custom(&world.db) {
                return Err(fail("custom assertion failed".to_string()));
            }
        }

        Ok(())
    }

    fn verify_outcome(&self, outcome: &StepOutcome) -> Result<(), String> {
        if let Some(expected) = self.saved {
            match outcome.saved {
                Some(saved) if saved.is_some() == expected => {}
                Some(saved) => {
                    return Err(format!(
                        "expected saved={}, save returned {:?}",
                        expected, saved
                    ))
                }
                None => return Err("expected a save in this step".to_string()),
            }
        }

        if let Some(expected) = self.success {
            match outcome.status {
                Some(status) if status.is_success() == expected => {}
                Some(status) => {
                    return Err(format!(
                        "expected success={}, got status {:?}",
                        expected, status
                    ))
                }
                None => return Err("expected a reverse or reinstate in this step".to_string()),
            }
        }

        if let Some(expected) = self.status {
            if outcome.status != Some(expected) {
                return Err(format!(
                    "expected status {:?}, got {:?}",
                    expected, outcome.status
                ));
            }
        }

        Ok(())
    }

    fn verify_state(&self, world: &mut World) -> Result<(), String> {
        let state = world.db.state();
        check("unsaved", self.unsaved, state.has_unsaved_changes)?;
        check("pending", self.pending, state.has_pending_txns)?;
        check("local", self.local, state.has_local_changes)?;

        let txns = world.db.txns();
        check("can_undo", self.can_undo, txns.is_undo_possible())?;
        check("can_redo", self.can_redo, txns.is_redo_possible())?;
        check("undo_string", self.undo_string.clone(), txns.get_undo_string())?;
        check("redo_string", self.redo_string.clone(), txns.get_redo_string())?;
        Ok(())
    }

    fn verify_elements(&self, world: &World) -> Result<(), String> {
        check("elements", self.elements, world.db.element_count())?;

        for label in &self.exists {
            let id = world
                .id(label)
                .ok_or_else(|| format!("unknown element label: {}", label))?;
            if world.db.get_element(id).is_err() {
                return Err(format!("expected {} ({}) to exist", label, id));
            }
        }

        for label in &self.missing {
            let id = world
                .id(label)
                .ok_or_else(|| format!("unknown element label: {}", label))?;
            if world.db.get_element(id).is_ok() {
                return Err(format!("expected {} ({}) to be missing", label, id));
            }
        }

        for (label, name, expected) in &self.props {
            let id = world
                .id(label)
                .ok_or_else(|| format!("unknown element label: {}", label))?;
            let element = world
                .db
                .get_element(id)
                .map_err(|e| format!("{}: {}", label, e))?;
            match element.get_prop(name) {
                Some(actual) if actual == expected => {}
                actual => {
                    return Err(format!(
                        "expected {}.{} = {:?}, got {:?}",
                        label, name, expected, actual
                    ))
                }
            }
        }

        Ok(())
    }

    // ==================== Builder methods ====================

    /// Expect unsaved changes (or none).
    pub fn unsaved(mut self, expected: bool) -> Self {
        self.unsaved = Some(expected);
        self
    }

    /// Expect saved transactions not yet synced (or none).
    pub fn pending(mut self, expected: bool) -> Self {
        self.pending = Some(expected);
        self
    }

    /// Expect local changes of either kind (or none).
    pub fn local(mut self, expected: bool) -> Self {
        self.local = Some(expected);
        self
    }

    pub fn can_undo(mut self, expected: bool) -> Self {
        self.can_undo = Some(expected);
        self
    }

    pub fn can_redo(mut self, expected: bool) -> Self {
        self.can_redo = Some(expected);
        self
    }

    /// Expect the undo menu text.
    pub fn undo_string(mut self, expected: &str) -> Self {
        self.undo_string = Some(expected.to_string());
        self
    }

    /// Expect the redo menu text.
    pub fn redo_string(mut self, expected: &str) -> Self {
        self.redo_string = Some(expected.to_string());
        self
    }

    /// Expect a number of live elements.
    pub fn elements(mut self, count: usize) -> Self {
        self.elements = Some(count);
        self
    }

    /// Expect the labelled element to exist.
    pub fn exists(mut self, label: &str) -> Self {
        self.exists.push(label.to_string());
        self
    }

    /// Expect the labelled element to be gone.
    pub fn missing(mut self, label: &str) -> Self {
        self.missing.push(label.to_string());
        self
    }

    /// Expect a property value on the labelled element.
    pub fn prop(mut self, label: &str, name: &str, value: impl Into<Value>) -> Self {
        self.props
            .push((label.to_string(), name.to_string(), value.into()));
        self
    }

    /// Expect the step's last save to have created a transaction (or not).
    pub fn saved(mut self, expected: bool) -> Self {
        self.saved = Some(expected);
        self
    }

    /// Expect the step's last undo or redo to have moved the cursor.
    pub fn success(mut self) -> Self {
        self.success = Some(true);
        self
    }

    /// Expect the step's last undo or redo to have done nothing.
    pub fn no_op(mut self) -> Self {
        self.success = Some(false);
        self
    }

    /// Expect an exact undo/redo status.
    pub fn status(mut self, status: TxnStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Expect the step to fail with an error containing `expected`.
    pub fn error(mut self, expected: &str) -> Self {
        self.error = Some(expected.to_string());
        self
    }

    /// Add a custom check against the database.
    pub fn custom<F>(mut self, f: F) -> Self
    where
        F: Fn(&Db) -> bool + 'static,
    {
        self.custom = Some(Box::new(f));
        self
    }
}

fn check<T: PartialEq + std::fmt::Debug>(
    what: &str,
    expected: Option<T>,
    actual: T,
) -> Result<(), String> {
    match expected {
        Some(expected) if expected != actual => Err(format!(
            "expected {} = {:?}, got {:?}",
            what, expected, actual
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_expectations() {
        let assertion = Assertion::new()
            .unsaved(false)
            .undo_string("change 1")
            .exists("obj1")
            .prop("obj1", "intProperty", 100i64);

        assert_eq!(assertion.unsaved, Some(false));
        assert_eq!(assertion.undo_string.as_deref(), Some("change 1"));
        assert_eq!(assertion.exists, vec!["obj1".to_string()]);
        assert_eq!(assertion.props.len(), 1);
    }

    #[test]
    fn test_check_passes_without_expectation() {
        assert!(check("unsaved", None, true).is_ok());
        assert!(check("unsaved", Some(true), true).is_ok());
        assert!(check("unsaved", Some(false), true).is_err());
    }

    #[test]
    fn test_outcome_requires_save() {
        // GIVEN an assertion on a save result
        let assertion = Assertion::new().saved(true);

        // WHEN the step did not save
        let result = assertion.verify_outcome(&StepOutcome::default());

        // THEN
        assert!(result.is_err());
    }

    #[test]
    fn test_outcome_status() {
        let outcome = StepOutcome {
            saved: None,
            status: Some(TxnStatus::NothingToUndo),
        };

        assert!(Assertion::new().no_op().verify_outcome(&outcome).is_ok());
        assert!(Assertion::new().success().verify_outcome(&outcome).is_err());
        assert!(Assertion::new()
            .status(TxnStatus::NothingToUndo)
            .verify_outcome(&outcome)
            .is_ok());
    }
}
