//! Built-in self-check suite run by the CLI.

use anyhow::Result;
use serde_json::json;
use std::rc::Rc;
use tinytest_core::{Breakpoint, Config, Harness, Value};

/// Builds a harness with every self-check registered.
pub fn build(config: Config, breakpoint: impl Breakpoint + 'static) -> Result<Harness> {
    let mut harness = Harness::with_config(config).with_breakpoint(breakpoint);
    register(&mut harness)?;
    Ok(harness)
}

fn register(h: &mut Harness) -> Result<()> {
    // ===== Values =====

    h.add("value - equality - maps ignore key order", |t| {
        t.equal(&json!({"a": 1, "b": [1, 2]}), &json!({"b": [1, 2], "a": 1}));
        t.not_equal(&json!([1, 2]), &json!([2, 1]));
        Ok(())
    })?;

    h.add("value - equality - numbers compare numerically", |t| {
        t.equal(&4, &4.0);
        t.not_equal_msg(&4, &4.5, "fractions must differ");
        t.not_equal(&json!(null), &json!(false));
        Ok(())
    })?;

    h.add("value - equality - opaque handles compare by identity", |t| {
        let handle = Rc::new(String::from("socket"));
        t.equal_values(&Value::opaque(handle.clone()), &Value::opaque(handle.clone()));
        t.not_equal_values(
            &Value::opaque(handle),
            &Value::opaque(Rc::new(String::from("socket"))),
        );
        Ok(())
    })?;

    // ===== Recorder =====

    h.add("recorder - assertions - length", |t| {
        t.length("tiny", 4);
        t.length(&vec![1, 2, 3], 3);
        Ok(())
    })?;

    h.add("recorder - assertions - throws", |t| {
        t.throws(|| "nope".parse::<i32>());
        t.throws(|| -> Result<(), String> { Err("refused".to_string()) });
        Ok(())
    })?;

    h.add("recorder - assertions - instance of", |t| {
        let boxed: Box<dyn std::any::Any> = Box::new(String::from("x"));
        t.instance_of::<String>(boxed.as_ref());
        t.is_false(boxed.is::<u32>());
        Ok(())
    })?;

    h.add("recorder - expected failure is one-shot", |t| {
        t.expect_fail();
        t.equal_msg(&1, &2, "deliberate failure");
        t.equal(&t.failure_count(), &1);
        Ok(())
    })?;

    h.add("recorder - run id is stable within a run", |t| {
        let first = t.run_id();
        t.equal(&first, &t.run_id());
        t.is_false(first.to_string().is_empty());
        Ok(())
    })?;

    // ===== Scheduling =====

    h.add_async("scheduler - deferred completion", |t, done| {
        let recorder = t.clone();
        t.defer(move || {
            recorder.equal(&(2 + 2), &4);
            done.complete();
        });
        Ok(())
    })?;

    h.add_async("scheduler - nested deferral keeps order", |t, done| {
        let outer = t.clone();
        t.defer(move || {
            let inner = outer.clone();
            outer.is_true(true);
            outer.defer(move || {
                inner.equal(&inner.failure_count(), &0);
                done.complete();
            });
        });
        Ok(())
    })?;

    Ok(())
}
