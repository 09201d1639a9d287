#![forbid(unsafe_code)]

//! Renders that are interleaved with dispatches, committed late, or thrown
//! away.
//!
//! Registration happens at commit, so a value dispatched between a render
//! and its commit reaches nobody. These tests check that the commit-time
//! reconciliation picks such values up for both propagation variants, and
//! that renders which never commit leave no trace in any registry.

use nanostate_core::{Container, RegistryPolicy, use_value, use_value_live};
use nanostate_harness::{Harness, HarnessConfig, HarnessError, Scope};

#[derive(Debug, Clone, Copy)]
enum Variant {
    Cached,
    Live,
}

const VARIANTS: [Variant; 2] = [Variant::Cached, Variant::Live];
const POLICIES: [RegistryPolicy; 2] = [RegistryPolicy::ClearOnDispatch, RegistryPolicy::Retain];

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("nanostate=debug")
        .try_init();
}

fn subscriber(
    container: &Container<u32>,
    variant: Variant,
) -> impl FnMut(&mut Scope<'_>) -> String + 'static {
    let container = container.clone();
    move |scope| {
        let (value, _) = match variant {
            Variant::Cached => use_value(scope, &container),
            Variant::Live => use_value_live(scope, &container),
        };
        value.to_string()
    }
}

#[test]
fn dispatch_between_mount_render_and_commit_is_reconciled() {
    init_tracing();
    for variant in VARIANTS {
        for policy in POLICIES {
            let container = Container::with_policy(1u32, policy);
            let mut harness = Harness::default();
            let pending = harness
                .begin_mount("late", subscriber(&container, variant))
                .expect("render");
            let id = pending.instance();
            assert_eq!(pending.view(), "1");

            container.dispatch(2);
            assert_eq!(container.subscriber_count(), 0);
            harness.commit(pending).expect("commit");

            assert_eq!(harness.view(id), Some("1"), "{variant:?}/{policy:?}");
            assert!(harness.is_dirty(id), "{variant:?}/{policy:?}");
            assert_eq!(harness.flush(), Ok(1));
            assert_eq!(harness.view(id), Some("2"), "{variant:?}/{policy:?}");
            assert_eq!(container.subscriber_count(), 1);
        }
    }
}

#[test]
fn dispatch_between_update_render_and_commit_is_reconciled() {
    for variant in VARIANTS {
        for policy in POLICIES {
            let container = Container::with_policy(1u32, policy);
            let mut harness = Harness::default();
            let id = harness
                .mount("slow", subscriber(&container, variant))
                .expect("mount");

            let pending = harness.begin_render(id).expect("render");
            container.dispatch(7);
            harness.commit(pending).expect("commit");
            harness.flush().expect("flush");

            assert_eq!(harness.view(id), Some("7"), "{variant:?}/{policy:?}");
            assert_eq!(container.subscriber_count(), 1, "{variant:?}/{policy:?}");
        }
    }
}

#[test]
fn two_dispatches_before_a_paused_render_resumes() {
    for variant in VARIANTS {
        let container = Container::new(0u32);
        let mut harness = Harness::default();
        let id = harness
            .mount("paused", subscriber(&container, variant))
            .expect("mount");

        let pending = harness.begin_render(id).expect("render");
        container.dispatch(1);
        container.dispatch(2);
        harness.commit(pending).expect("commit");
        harness.flush().expect("flush");

        assert_eq!(harness.view(id), Some("2"), "{variant:?}");
        assert_eq!(container.subscriber_count(), 1);
    }
}

#[test]
fn discarded_mount_never_registers() {
    for variant in VARIANTS {
        for policy in POLICIES {
            let container = Container::with_policy(0u32, policy);
            let mut harness = Harness::default();
            let pending = harness
                .begin_mount("speculative", subscriber(&container, variant))
                .expect("render");
            harness.discard(pending);

            assert_eq!(container.subscriber_count(), 0);
            container.dispatch(1);
            assert_eq!(harness.flush(), Ok(0));
            assert_eq!(harness.mounted_count(), 0);
        }
    }
}

#[test]
fn discarded_update_keeps_committed_registration() {
    for variant in VARIANTS {
        let container = Container::with_policy(0u32, RegistryPolicy::Retain);
        let mut harness = Harness::default();
        let id = harness
            .mount("kept", subscriber(&container, variant))
            .expect("mount");

        let pending = harness.begin_render(id).expect("render");
        harness.discard(pending);
        assert_eq!(container.subscriber_count(), 1);

        container.dispatch(3);
        harness.flush().expect("flush");
        assert_eq!(harness.view(id), Some("3"), "{variant:?}");
        assert_eq!(harness.commit_count(id), 2);
    }
}

#[test]
fn stale_render_cannot_resurrect_a_subscription() {
    for variant in VARIANTS {
        let container = Container::new(0u32);
        let mut harness = Harness::default();
        let id = harness
            .mount("doomed", subscriber(&container, variant))
            .expect("mount");

        let pending = harness.begin_render(id).expect("render");
        harness.unmount(id).expect("unmount");
        let epoch = pending.epoch();
        assert_eq!(
            harness.commit(pending),
            Err(HarnessError::StaleRender { id, epoch })
        );
        assert_eq!(container.subscriber_count(), 0);
    }
}

#[test]
fn superseded_render_is_rejected() {
    let container = Container::new(0u32);
    let mut harness = Harness::default();
    let id = harness
        .mount("raced", subscriber(&container, Variant::Cached))
        .expect("mount");

    let older = harness.begin_render(id).expect("render");
    let newer = harness.begin_render(id).expect("render");
    harness.commit(newer).expect("commit");
    assert!(matches!(
        harness.commit(older),
        Err(HarnessError::StaleRender { .. })
    ));
    assert_eq!(container.subscriber_count(), 1);
}

#[test]
fn feedback_loop_hits_render_bound() {
    let container = Container::new(0u32);
    let mut harness = Harness::new(HarnessConfig::new().with_max_flush_renders(16));
    let c = container.clone();
    harness
        .mount("feedback", move |scope| {
            let (n, dispatch) = use_value(scope, &c);
            if n > 0 {
                dispatch.dispatch(n + 1);
            }
            n.to_string()
        })
        .expect("mount");

    container.dispatch(1);
    assert_eq!(
        harness.flush(),
        Err(HarnessError::RenderLoop { limit: 16 })
    );
}

#[test]
fn unknown_instance_is_reported() {
    let container = Container::new(0u32);
    let mut harness = Harness::default();
    let id = harness
        .mount("once", subscriber(&container, Variant::Live))
        .expect("mount");
    harness.unmount(id).expect("unmount");

    assert_eq!(
        harness.unmount(id),
        Err(HarnessError::UnknownInstance { id })
    );
    assert!(matches!(
        harness.begin_render(id),
        Err(HarnessError::UnknownInstance { .. })
    ));
}
