#![forbid(unsafe_code)]

//! End-to-end checks through the public facade.

use nanostate::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("nanostate=debug")
        .try_init();
}

#[test]
fn counters_share_keyed_state() {
    init_tracing();
    let counters = create_values_container(Vec::<(&'static str, i64)>::new(), false);
    let mut harness = Harness::default();
    let mount_counter = |harness: &mut Harness, key: &'static str| {
        let counters = counters.clone();
        harness
            .mount("counter", move |scope| {
                let (n, _) = use_entry(scope, &counters, key, 0).expect("lenient");
                format!("{key}: {n}")
            })
            .expect("mount")
    };
    let one = mount_counter(&mut harness, "counter1");
    let one_again = mount_counter(&mut harness, "counter1");
    let two = mount_counter(&mut harness, "counter2");

    counters
        .container(&"counter1")
        .expect("created by mount")
        .update(|n| *n += 1);
    harness.flush().expect("flush");

    assert_eq!(harness.view(one), Some("counter1: 1"));
    assert_eq!(harness.view(one_again), Some("counter1: 1"));
    assert_eq!(harness.view(two), Some("counter2: 0"));
}

#[test]
fn dispatch_on_mount_reaches_the_component() {
    let empty = create_container(String::new());
    let mut harness = Harness::default();
    let c = empty.clone();
    let id = harness
        .mount("late", move |scope| {
            let (value, dispatch) = use_value(scope, &c);
            if value.is_empty() {
                dispatch.dispatch("dispatched on mount".to_string());
            }
            value
        })
        .expect("mount");

    assert!(harness.is_dirty(id));
    harness.flush().expect("flush");
    assert_eq!(harness.view(id), Some("dispatched on mount"));
}

#[test]
fn strict_values_surface_lookup_errors() {
    let values = create_values_container([(1u8, "one")], true);
    let mut harness = Harness::default();
    let v = values.clone();
    let id = harness
        .mount("strict", move |scope| match use_entry(scope, &v, 2, "two") {
            Ok((value, _)) => value.to_string(),
            Err(LookupError::MissingKey { key }) => format!("missing {key}"),
        })
        .expect("mount");
    assert_eq!(harness.view(id), Some("missing 2"));
}
