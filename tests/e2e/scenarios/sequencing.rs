use crate::harness::Scenario;
use anyhow::anyhow;

#[test]
fn test_pass_then_fail_reports_in_order() {
    Scenario::new("pass_then_fail")
        .sync_case("A", |t| {
            t.is_true(true);
            t.is_true(false);
            Ok(())
        })
        .expect_completed()
        .expect_events("A", &["ok", "fail", "finish"])
        .expect_failure_offsets("A", &[0])
        .expect_breakpoints(&[])
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_tests_run_in_registration_order() {
    Scenario::new("registration_order")
        .sync_case("zeta - last alphabetically", |t| {
            t.is_true(true);
            Ok(())
        })
        .async_case("alpha - deferred", |t, done| {
            let recorder = t.clone();
            t.defer(move || {
                recorder.is_true(true);
                done.complete();
            });
            Ok(())
        })
        .sync_case("mid - plain", |t| {
            t.is_false(false);
            Ok(())
        })
        .expect_completed()
        .expect_announced(&["last alphabetically", "deferred", "plain"])
        .expect_live_order(&["last alphabetically", "deferred", "plain"])
        .expect_one_terminal_per_test()
        .run()
        .unwrap();
}

#[test]
fn test_returned_error_is_an_exception_and_run_continues() {
    Scenario::new("exception_then_continue")
        .sync_case("C", |t| {
            t.is_true(true);
            Err(anyhow!("boom"))
        })
        .sync_case("D", |t| {
            t.equal(&"after", &"after");
            Ok(())
        })
        .expect_completed()
        .expect_events("C", &["ok", "exception"])
        .expect_exception_containing("C", "boom")
        .expect_events("D", &["ok", "finish"])
        .expect_one_terminal_per_test()
        .run()
        .unwrap();
}

#[test]
fn test_panic_is_an_exception_and_run_continues() {
    Scenario::new("panic_then_continue")
        .sync_case("panics", |t| {
            let missing: Option<u32> = None;
            let value = missing.expect("fixture value missing");
            t.equal(&value, &0);
            Ok(())
        })
        .sync_case("after", |t| {
            t.is_true(true);
            Ok(())
        })
        .expect_completed()
        .expect_events("panics", &["exception"])
        .expect_exception_containing("panics", "fixture value missing")
        .expect_events("after", &["ok", "finish"])
        .run()
        .unwrap();
}

#[test]
fn test_empty_body_reports_only_finish() {
    Scenario::new("empty_body")
        .sync_case("nothing", |_| Ok(()))
        .expect_completed()
        .expect_events("nothing", &["finish"])
        .run()
        .unwrap();
}

#[test]
fn test_empty_registry_completes() {
    let report = Scenario::new("empty_registry")
        .expect_completed()
        .expect_announced(&[])
        .run()
        .unwrap();
    assert!(report.envelopes.is_empty());
}

#[test]
fn test_envelopes_carry_group_path() {
    let report = Scenario::new("group_path")
        .sync_case("net - http - parses headers", |t| {
            t.is_true(true);
            Ok(())
        })
        .expect_completed()
        .run()
        .unwrap();

    for envelope in &report.envelopes {
        assert_eq!(envelope.group_path, ["tinytest", "net", "http"]);
        assert_eq!(envelope.test, "parses headers");
    }
}
