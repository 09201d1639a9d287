#![forbid(unsafe_code)]

//! The two demo apps, scripted against the simulated host.
//!
//! Each app mounts its components on a fresh [`Harness`], drives a short
//! script of user actions through the dispatchers the hooks hand out, and
//! writes every committed view after each step.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use nanostate::harness::{Harness, HarnessError, InstanceId, Scope};
use nanostate::{
    Container, Dispatcher, LookupError, ValuesConfig, ValuesContainer, use_entry, use_entry_default,
    use_value,
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::cli::Opts;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Harness(#[from] HarnessError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("component {0} has not rendered a dispatcher")]
    NotRendered(&'static str),

    #[error("failed to encode trace: {0}")]
    Trace(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DemoError>;

/// Dispatcher published by a component on each render.
type DispatchSlot<V> = Rc<RefCell<Option<Dispatcher<V>>>>;

fn take_dispatcher<V>(slot: &DispatchSlot<V>, name: &'static str) -> Result<Dispatcher<V>> {
    slot.borrow().clone().ok_or(DemoError::NotRendered(name))
}

/// Run the apps selected by `opts`, writing frames to `out`.
pub fn run(opts: &Opts, out: &mut dyn Write) -> Result<()> {
    if opts.app.runs_basic() {
        let harness = run_basic(opts, out)?;
        finish(opts, "basic", &harness, out)?;
    }
    if opts.app.runs_values() {
        let harness = run_values(opts, out)?;
        finish(opts, "values", &harness, out)?;
    }
    Ok(())
}

fn finish(opts: &Opts, app: &str, harness: &Harness, out: &mut dyn Write) -> Result<()> {
    tracing::info!(
        message = "demo.finish",
        app,
        events = harness.trace().len(),
        mounted = harness.mounted_count()
    );
    if opts.trace_jsonl {
        writeln!(out, "== trace: {app} ==")?;
        write!(out, "{}", harness.trace_jsonl()?)?;
    }
    Ok(())
}

fn write_frame(
    out: &mut dyn Write,
    harness: &Harness,
    title: &str,
    ids: &[InstanceId],
) -> io::Result<()> {
    writeln!(out, "-- {title} --")?;
    for &id in ids {
        let label = harness.label(id).unwrap_or("?");
        let view = harness.view(id).unwrap_or("");
        writeln!(out, "{label:<12} {view}")?;
    }
    Ok(())
}

// ── basic ────────────────────────────────────────────────────────────────

fn text_input(
    text: &Container<String>,
    slot: &DispatchSlot<String>,
) -> impl FnMut(&mut Scope<'_>) -> String + 'static {
    let text = text.clone();
    let slot = Rc::clone(slot);
    move |scope| {
        let (value, dispatch) = use_value(scope, &text);
        *slot.borrow_mut() = Some(dispatch);
        format!("<input value={value:?}>")
    }
}

fn current_value(text: &Container<String>) -> impl FnMut(&mut Scope<'_>) -> String + 'static {
    let text = text.clone();
    move |scope| {
        let (value, _) = use_value(scope, &text);
        format!("current value: {value:?}")
    }
}

/// Text inputs sharing one container, plus a read-only view of it. Inputs
/// are added and removed while the text changes.
pub fn run_basic(opts: &Opts, out: &mut dyn Write) -> Result<Harness> {
    tracing::info!(message = "demo.start", app = "basic", policy = opts.policy.as_str());
    writeln!(out, "== basic ==")?;
    let text = Container::with_policy(String::new(), opts.policy);
    let mut harness = Harness::default();

    let mut inputs: Vec<(InstanceId, DispatchSlot<String>)> = Vec::new();
    for _ in 0..2 {
        let slot: DispatchSlot<String> = Rc::new(RefCell::new(None));
        let id = harness.mount("input", text_input(&text, &slot))?;
        inputs.push((id, slot));
    }
    let current = harness.mount("current", current_value(&text))?;
    let visible = |inputs: &[(InstanceId, DispatchSlot<String>)]| {
        let mut ids: Vec<InstanceId> = inputs.iter().map(|(id, _)| *id).collect();
        ids.push(current);
        ids
    };
    write_frame(out, &harness, "mounted", &visible(&inputs))?;

    take_dispatcher(&inputs[0].1, "input")?.dispatch("hello".to_string());
    harness.flush()?;
    write_frame(out, &harness, "typed into the first input", &visible(&inputs))?;

    let slot: DispatchSlot<String> = Rc::new(RefCell::new(None));
    let added = harness.mount("input", text_input(&text, &slot))?;
    inputs.push((added, slot));
    write_frame(out, &harness, "added an input", &visible(&inputs))?;

    let (removed, _) = inputs.remove(0);
    harness.unmount(removed)?;
    if let Some((_, last)) = inputs.last() {
        take_dispatcher(last, "input")?.dispatch("hello world".to_string());
    }
    harness.flush()?;
    write_frame(
        out,
        &harness,
        "removed the first input, typed into the last",
        &visible(&inputs),
    )?;

    tracing::debug!(
        message = "demo.basic.registry",
        subscribers = text.subscriber_count(),
        version = text.version()
    );
    Ok(harness)
}

// ── values ───────────────────────────────────────────────────────────────

fn counter(
    counters: &ValuesContainer<String, i64>,
    key: &'static str,
    slot: &DispatchSlot<i64>,
) -> impl FnMut(&mut Scope<'_>) -> String + 'static {
    let counters = counters.clone();
    let slot = Rc::clone(slot);
    move |scope| match use_entry(scope, &counters, key.to_string(), 0) {
        Ok((count, dispatch)) => {
            *slot.borrow_mut() = Some(dispatch);
            format!("{key}: {count}")
        }
        Err(err) => format!("{key}: {err}"),
    }
}

fn entry_view(
    values: &ValuesContainer<String, Value>,
    key: &'static str,
) -> impl FnMut(&mut Scope<'_>) -> String + 'static {
    let values = values.clone();
    move |scope| match use_entry_default(scope, &values, key.to_string()) {
        Ok((value, _)) => format!("{key} = {value}"),
        Err(err) => format!("{key}: {err}"),
    }
}

fn value_view(
    container: &Container<Value>,
    name: &'static str,
) -> impl FnMut(&mut Scope<'_>) -> String + 'static {
    let container = container.clone();
    move |scope| {
        let (value, _) = use_value(scope, &container);
        format!("{name} = {value}")
    }
}

fn config(opts: &Opts) -> ValuesConfig {
    ValuesConfig::new()
        .with_strict(opts.strict)
        .with_policy(opts.policy)
}

/// Keyed counters, keyed containers built from a pair list and from a map,
/// a read of a key nobody created, and a container dispatched to right
/// after it mounts.
pub fn run_values(opts: &Opts, out: &mut dyn Write) -> Result<Harness> {
    tracing::info!(
        message = "demo.start",
        app = "values",
        strict = opts.strict,
        policy = opts.policy.as_str()
    );
    writeln!(out, "== values ==")?;
    let mut harness = Harness::default();

    let counters = ValuesContainer::from_pairs(
        [("counter1".to_string(), 0i64), ("counter2".to_string(), 0)],
        config(opts),
    );
    let mut counter_ids = Vec::new();
    let mut slots = Vec::new();
    for key in ["counter1", "counter1", "counter2"] {
        let slot: DispatchSlot<i64> = Rc::new(RefCell::new(None));
        counter_ids.push(harness.mount("counter", counter(&counters, key, &slot))?);
        slots.push(slot);
    }
    write_frame(out, &harness, "counters mounted", &counter_ids)?;

    let first = take_dispatcher(&slots[0], "counter")?;
    first.update(|n| *n += 1);
    first.update(|n| *n += 1);
    take_dispatcher(&slots[2], "counter")?.update(|n| *n += 1);
    counters.dispatch(&"counter2".to_string(), 5)?;
    harness.flush()?;
    write_frame(out, &harness, "counters incremented", &counter_ids)?;

    let from_map = ValuesContainer::from_map(
        HashMap::from([("key1".to_string(), json!(1)), ("key2".to_string(), json!(2))]),
        config(opts),
    );
    let from_pairs = ValuesContainer::from_pairs(
        [
            ("keyX".to_string(), json!({ "foo": "bar" })),
            ("1".to_string(), json!("Date")),
        ],
        config(opts),
    );
    let entry_ids = vec![
        harness.mount("entry", entry_view(&from_map, "key1"))?,
        harness.mount("entry", entry_view(&from_map, "key2"))?,
        harness.mount("entry", entry_view(&from_pairs, "keyX"))?,
        harness.mount("entry", entry_view(&from_pairs, "1"))?,
        harness.mount("entry", entry_view(&from_map, "missing"))?,
    ];
    write_frame(out, &harness, "keyed entries", &entry_ids)?;

    let empty = Container::with_policy(Value::Null, opts.policy);
    let late = harness.mount("empty", value_view(&empty, "empty"))?;
    empty.dispatch(json!("dispatched after mount"));
    harness.flush()?;
    write_frame(out, &harness, "empty container after mount", &[late])?;

    tracing::debug!(
        message = "demo.values.keys",
        counters = counters.len(),
        from_map = from_map.len(),
        from_pairs = from_pairs.len()
    );
    Ok(harness)
}
