use crate::harness::Scenario;
use anyhow::anyhow;
use std::cell::Cell;
use std::rc::Rc;
use tinytest_core::Event;

#[test]
fn test_deferred_completion_finishes_before_next_test() {
    Scenario::new("deferred_completion")
        .async_case("B", |t, done| {
            let recorder = t.clone();
            t.defer(move || {
                recorder.is_true(true);
                done.complete();
            });
            Ok(())
        })
        .sync_case("after", |t| {
            t.is_true(true);
            Ok(())
        })
        .expect_completed()
        .expect_events("B", &["ok", "finish"])
        .expect_live_order(&["B", "after"])
        .expect_one_terminal_per_test()
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_chained_deferrals_keep_events_in_order() {
    Scenario::new("chained_deferrals")
        .async_case("chain", |t, done| {
            let first = t.clone();
            t.defer(move || {
                first.equal(&1, &1);
                let second = first.clone();
                first.defer(move || {
                    second.equal(&2, &3);
                    second.is_false(false);
                    done.complete();
                });
            });
            Ok(())
        })
        .expect_completed()
        .expect_events("chain", &["ok", "fail", "ok", "finish"])
        .run()
        .unwrap();
}

#[test]
fn test_async_error_reported_through_recorder() {
    Scenario::new("async_exception")
        .async_case("raises later", |t, _done| {
            let recorder = t.clone();
            t.defer(move || recorder.exception(anyhow!("socket closed")));
            Ok(())
        })
        .sync_case("next", |t| {
            t.is_true(true);
            Ok(())
        })
        .expect_completed()
        .expect_events("raises later", &["exception"])
        .expect_exception_containing("raises later", "socket closed")
        .expect_events("next", &["ok", "finish"])
        .run()
        .unwrap();
}

#[test]
fn test_panic_in_deferred_callback_is_an_exception_and_run_continues() {
    let report = Scenario::new("deferred_panic")
        .async_case("panics later", |t, done| {
            let recorder = t.clone();
            t.defer(move || {
                recorder.is_true(true);
                let reply: Option<u8> = None;
                let byte = reply.expect("no reply from peer");
                recorder.equal(&byte, &0);
                done.complete();
            });
            Ok(())
        })
        .sync_case("after", |t| {
            t.is_true(true);
            Ok(())
        })
        .expect_completed()
        .expect_events("panics later", &["ok", "exception"])
        .expect_exception_containing("panics later", "no reply from peer")
        .expect_events("after", &["ok", "finish"])
        .expect_one_terminal_per_test()
        .run()
        .unwrap();

    let stack = report
        .events("panics later")
        .into_iter()
        .find_map(|event| match event {
            Event::Exception { details } => Some(details.stack.clone()),
            _ => None,
        })
        .unwrap();
    assert!(stack.contains("async_cases.rs"), "stack was {}", stack);
}

#[test]
fn test_async_body_returning_error_is_an_exception() {
    Scenario::new("async_returns_error")
        .async_case("early error", |_, _done| Err(anyhow!("setup refused")))
        .expect_completed()
        .expect_events("early error", &["exception"])
        .expect_exception_containing("early error", "setup refused")
        .run()
        .unwrap();
}

#[test]
fn test_late_completion_after_exception_is_ignored() {
    Scenario::new("late_completion")
        .async_case("both", |t, done| {
            let recorder = t.clone();
            t.defer(move || {
                recorder.exception(anyhow!("first terminal"));
                done.complete();
            });
            Ok(())
        })
        .sync_case("next", |_| Ok(()))
        .expect_completed()
        .expect_events("both", &["exception"])
        .expect_events("next", &["finish"])
        .expect_one_terminal_per_test()
        .run()
        .unwrap();
}

#[test]
fn test_dropped_completion_stalls_run() {
    Scenario::new("hung_async")
        .async_case("hangs", |_, _done| Ok(()))
        .sync_case("never reached", |_| Ok(()))
        .expect_not_completed()
        .expect_events("never reached", &[])
        .run()
        .unwrap();
}

#[test]
fn test_body_is_not_invoked_inline() {
    let invoked = Rc::new(Cell::new(0));
    let counter = invoked.clone();

    let mut harness = tinytest_core::Harness::new();
    harness
        .add("counted", move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        })
        .unwrap();

    let completed = Rc::new(Cell::new(false));
    let flag = completed.clone();
    harness.run_all(|_| {}, move || flag.set(true));
    assert_eq!(invoked.get(), 0);
    assert!(!completed.get());

    harness.queue().run_until_idle();
    assert_eq!(invoked.get(), 1);
    assert!(completed.get());
}
