use crate::harness::Scenario;
use tinytest_core::{Config, Event, ExpectedFailurePolicy, Harness, TinytestError};

#[test]
fn test_failure_offsets_strictly_increase() {
    Scenario::new("offsets_increase")
        .sync_case("mixed", |t| {
            t.is_true(false);
            t.is_true(true);
            t.equal(&[1, 2], &[1, 3]);
            t.expect_fail();
            t.length(&vec![0; 3], 2);
            t.is_false(true);
            Ok(())
        })
        .expect_events("mixed", &["fail", "ok", "fail", "expected_fail", "fail", "finish"])
        .expect_failure_offsets("mixed", &[0, 1, 2, 3])
        .run()
        .unwrap();
}

#[test]
fn test_offsets_restart_for_each_test() {
    Scenario::new("offsets_per_test")
        .sync_case("first", |t| {
            t.is_true(false);
            t.is_true(false);
            Ok(())
        })
        .sync_case("second", |t| {
            t.is_true(false);
            Ok(())
        })
        .expect_failure_offsets("first", &[0, 1])
        .expect_failure_offsets("second", &[0])
        .run()
        .unwrap();
}

#[test]
fn test_expect_fail_twice_behaves_like_once() {
    Scenario::new("expect_fail_idempotent")
        .sync_case("twice", |t| {
            t.expect_fail();
            t.expect_fail();
            t.is_true(false);
            t.is_true(false);
            Ok(())
        })
        .expect_events("twice", &["expected_fail", "fail", "finish"])
        .run()
        .unwrap();
}

#[test]
fn test_expect_fail_consumed_by_passing_assertion() {
    let report = Scenario::new("expect_fail_then_pass")
        .sync_case("lenient", |t| {
            t.expect_fail();
            t.is_true(true);
            t.is_true(false);
            Ok(())
        })
        .expect_events("lenient", &["ok", "fail", "finish"])
        .run()
        .unwrap();

    match report.events("lenient")[0] {
        Event::Ok { details: Some(details) } => {
            assert_eq!(details["was_expecting_failure"], true);
        }
        other => panic!("expected an annotated ok, got {:?}", other),
    }
}

#[test]
fn test_strict_policy_turns_missing_failure_into_fail() {
    let mut config = Config::default();
    config.assertions.expected_failure_policy = ExpectedFailurePolicy::Strict;

    Scenario::new("strict_expected_failure")
        .with_config(config)
        .sync_case("strict", |t| {
            t.expect_fail();
            t.is_true(true);
            Ok(())
        })
        .expect_events("strict", &["fail", "finish"])
        .expect_failure_offsets("strict", &[0])
        .run()
        .unwrap();
}

#[test]
fn test_custom_naming_shapes_group_path() {
    let mut config = Config::default();
    config.naming.root_label = "suite".to_string();
    config.naming.delimiter = "::".to_string();

    let report = Scenario::new("custom_naming")
        .with_config(config)
        .sync_case("db :: pool :: checkout", |t| {
            t.is_true(true);
            Ok(())
        })
        .expect_events("checkout", &["ok", "finish"])
        .run()
        .unwrap();

    assert_eq!(report.envelopes[0].group_path, ["suite", "db", "pool"]);
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let mut harness = Harness::new();
    harness.add("unique", |_| Ok(())).unwrap();

    let err = harness.add("unique", |_| Ok(())).unwrap_err();
    assert!(matches!(err, TinytestError::DuplicateTest { ref name } if name == "unique"));
    assert_eq!(harness.registry().len(), 1);

    let err = harness.add_async("unique", |_, done| {
        done.complete();
        Ok(())
    });
    assert!(err.is_err());
}

#[test]
fn test_duplicate_registration_fails_scenario() {
    let result = Scenario::new("duplicate_in_scenario")
        .sync_case("same", |_| Ok(()))
        .sync_case("same", |_| Ok(()))
        .run();

    assert!(!result.success);
    assert!(result.report.is_none());
}

#[test]
fn test_registration_after_run_does_not_join_it() {
    let mut harness = Harness::new();
    harness.add("before", |_| Ok(())).unwrap();

    let envelopes = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = envelopes.clone();
    harness.run_all(move |envelope| sink.borrow_mut().push(envelope), || {});
    harness.add("after", |_| Ok(())).unwrap();
    harness.queue().run_until_idle();

    let tests: Vec<String> = envelopes.borrow().iter().map(|e| e.test.clone()).collect();
    assert!(tests.iter().all(|test| test == "before"));
}
