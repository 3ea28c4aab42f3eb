//! Undo/redo integration tests.
//!
//! These scenarios run against the TestBim schema on an in-memory database.

use rewind_core::TxnId;
use rewind_tests::prelude::*;

mod basic {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("basic")
            .operations("undo_redo/basic.ops")
            .step("import_schema", |a| {
                a.saved(true).unsaved(false).undo_string("schema change")
            })
            .step("insert_obj1", |a| a.unsaved(true).local(true).exists("obj1"))
            .step("save_change_1", |a| {
                a.saved(true)
                    .unsaved(false)
                    .pending(true)
                    .undo_string("change 1")
                    .redo_string("")
            })
            .step("undo_change_1", |a| {
                a.success()
                    .missing("obj1")
                    .undo_string("schema change")
                    .redo_string("change 1")
            })
            .step("redo_change_1", |a| {
                a.success()
                    .prop("obj1", "intProperty", 100i64)
                    .undo_string("change 1")
                    .can_redo(false)
            })
            .step("modify_obj1", |a| a.unsaved(true).prop("obj1", "intProperty", 200i64))
            .step("save_change_2", |a| a.saved(true).undo_string("change 2"))
            .step("undo_change_2", |a| {
                a.success()
                    .prop("obj1", "intProperty", 100i64)
                    .redo_string("change 2")
            })
            .step("delete_and_abandon", |a| {
                a.unsaved(false).prop("obj1", "intProperty", 100i64)
            })
            .step("insert_obj2", |a| a.unsaved(true).exists("obj2").elements(2))
            // Reversing abandons the unsaved insert before undoing change 1
            .step("undo_with_unsaved", |a| {
                a.success()
                    .unsaved(false)
                    .missing("obj2")
                    .missing("obj1")
                    .redo_string("change 1")
            })
            .step("redo_after_unsaved", |a| {
                a.success().exists("obj1").missing("obj2").redo_string("change 2")
            })
            .step("cancel_all", |a| {
                a.unsaved(false)
                    .pending(false)
                    .local(false)
                    .can_undo(false)
                    .can_redo(false)
                    .elements(0)
            })
    }

    #[test]
    fn test_undo_redo_and_cancel() {
        scenario().run().unwrap();
    }
}

mod edge_cases {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("edge_cases")
            .operations("undo_redo/edge_cases.ops")
            .step("undo_empty", |a| a.status(TxnStatus::NothingToUndo).can_undo(false))
            .step("redo_empty", |a| a.status(TxnStatus::NothingToRedo).can_redo(false))
            .step("save_empty", |a| a.saved(false).pending(false))
            .step("setup", |a| a.saved(true).undo_string("setup"))
            .step("coalesced_edits", |a| {
                a.saved(false)
                    .unsaved(false)
                    .undo_string("setup")
                    .prop("obj1", "intProperty", 1i64)
            })
            .step("first_edit", |a| a.saved(true).undo_string("edit 10"))
            .step("undo_edit", |a| {
                a.success()
                    .redo_string("edit 10")
                    .prop("obj1", "intProperty", 1i64)
            })
            .step("new_edit_drops_redo", |a| {
                a.saved(true)
                    .can_redo(false)
                    .undo_string("edit 20")
                    .prop("obj1", "intProperty", 20i64)
            })
            .step("undo_twice", |a| {
                a.status(TxnStatus::Reversed(TxnId::new(1)))
                    .can_undo(false)
                    .redo_string("setup")
                    .elements(0)
            })
            .step("undo_past_start", |a| a.no_op().redo_string("setup"))
            .step("cancel_unknown", |a| a.error("not reachable"))
    }

    #[test]
    fn test_navigation_edge_cases() {
        scenario().run().unwrap();
    }
}

mod direct {
    use super::*;
    use pretty_assertions::assert_eq;
    use rewind_session::Db;

    fn db_with_two_changes() -> Db {
        let mut db = Db::open_in_memory().unwrap();
        db.import_schema(test_schema()).unwrap();
        db.save_changes("schema change").unwrap();

        let id = db
            .insert_element(PHYSICAL_OBJECT, physical_object_props(100))
            .unwrap();
        db.save_changes("change 1").unwrap();
        db.set_element_prop(id, "intProperty", 200i64).unwrap();
        db.save_changes("change 2").unwrap();
        db
    }

    #[test]
    fn test_txn_id_queries() {
        // GIVEN three saved transactions
        let mut db = db_with_two_changes();
        let txns = db.txns();

        // WHEN
        let current = txns.get_current_txn_id();
        let first = txns.query_first_txn_id();

        // THEN the cursor names the last applied transaction
        assert_eq!(txns.get_txn_description(current).as_deref(), Some("change 2"));
        assert_eq!(
            txns.get_txn_description(txns.query_previous_txn_id(current)).as_deref(),
            Some("change 1")
        );
        assert_eq!(txns.get_txn_description(first).as_deref(), Some("schema change"));
        assert_eq!(txns.query_previous_txn_id(first), TxnId::BEFORE_FIRST);
        assert_eq!(txns.query_next_txn_id(current), None);
    }

    #[test]
    fn test_txn_ids_are_not_reused_after_cancel() {
        // GIVEN
        let mut db = db_with_two_changes();
        let cancelled = db.txns().get_current_txn_id();

        // WHEN the last transaction is cancelled and a new one saved
        db.txns().cancel_to(cancelled).unwrap();
        db.insert_element(PHYSICAL_OBJECT, physical_object_props(7))
            .unwrap();
        let saved = db.save_changes("change 3").unwrap().unwrap();

        // THEN
        assert!(saved > cancelled);
        assert_eq!(db.txns().get_undo_string(), "change 3");
    }

    #[test]
    fn test_cancel_to_first_without_saved_txns() {
        // GIVEN only an unsaved schema import
        let mut db = Db::open_in_memory().unwrap();
        db.import_schema(test_schema()).unwrap();

        // WHEN
        let first = db.txns().query_first_txn_id();
        db.txns().cancel_to(first).unwrap();

        // THEN
        let state = db.state();
        assert_eq!(first, TxnId::BEFORE_FIRST);
        assert!(!state.has_unsaved_changes);
        assert!(!state.has_local_changes);
        assert!(db.insert_element(PHYSICAL_OBJECT, physical_object_props(1)).is_err());
    }

    #[test]
    fn test_cancel_to_reversed_txn_keeps_redo() {
        // GIVEN "change 2" reversed
        let mut db = db_with_two_changes();
        db.txns().reverse_single_txn().unwrap();
        let current = db.txns().get_current_txn_id();
        let reversed = db.txns().query_next_txn_id(current).unwrap();

        // WHEN
        let result = db.txns().cancel_to(reversed);

        // THEN
        assert!(result.is_err());
        assert_eq!(db.txns().get_redo_string(), "change 2");
    }

    #[test]
    fn test_state_depths_follow_cursor() {
        let mut db = db_with_two_changes();

        db.txns().reverse_single_txn().unwrap();
        let state = db.state();

        assert_eq!(state.undo_depth, 2);
        assert_eq!(state.redo_depth, 1);
        assert!(state.has_pending_txns);
        assert!(!state.has_unsaved_changes);
    }
}
