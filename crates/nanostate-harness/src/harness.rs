#![forbid(unsafe_code)]

//! Instance arena and render/commit scheduler.
//!
//! # Invariants
//!
//! 1. A render's lifecycles are committed at most once, and only if the
//!    render is newer than the instance's last committed render.
//! 2. On commit, every previously committed lifecycle of the instance gets
//!    `on_cleanup_before_next_commit` before any new lifecycle gets
//!    `on_commit`.
//! 3. On unmount, the last committed lifecycles get `on_unmount`; the
//!    instance's state slots are dropped and its dirty mark is cleared.
//! 4. Discarding a render never calls a lifecycle method. A discarded update
//!    restores the dirty mark the render consumed; a discarded mount removes
//!    the instance.
//! 5. No arena or queue borrow is held while components or lifecycles run.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown instance | Id was never mounted or already unmounted | `HarnessError::UnknownInstance` |
//! | Stale commit | Instance unmounted, or a newer render already committed | `HarnessError::StaleRender`, lifecycles dropped |
//! | Render loop | Flush keeps finding dirty instances | `HarnessError::RenderLoop` after the configured bound |
//! | Dirty mark for a removed instance | State set after unmount | Mark dropped, `SkipStale` traced |

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use nanostate_core::Lifecycle;
use slotmap::{SlotMap, new_key_type};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::scope::{DirtyQueue, Scope};
use crate::trace::{self, TraceEvent};

new_key_type! {
    /// Arena key of a mounted (or mounting) component instance.
    pub struct InstanceId;
}

type Component = Box<dyn FnMut(&mut Scope<'_>) -> String>;

struct Instance {
    label: String,
    component: Component,
    slots: Vec<Rc<dyn Any>>,
    committed: Vec<Box<dyn Lifecycle>>,
    committed_epoch: Option<u64>,
    view: Option<String>,
    renders: u64,
    commits: u64,
}

/// A render that has run but not yet been committed or discarded.
#[must_use = "a pending render must be committed or discarded"]
pub struct PendingRender {
    id: InstanceId,
    epoch: u64,
    view: String,
    lifecycles: Vec<Box<dyn Lifecycle>>,
    consumed_dirty: bool,
}

impl fmt::Debug for PendingRender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRender")
            .field("id", &self.id)
            .field("epoch", &self.epoch)
            .field("view", &self.view)
            .field("lifecycles", &self.lifecycles.len())
            .finish()
    }
}

impl PendingRender {
    #[must_use]
    pub fn instance(&self) -> InstanceId {
        self.id
    }

    /// Render number within the instance, starting at 1.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Output the render produced.
    #[must_use]
    pub fn view(&self) -> &str {
        &self.view
    }
}

/// Simulated host scheduler.
pub struct Harness {
    config: HarnessConfig,
    instances: SlotMap<InstanceId, Instance>,
    queue: DirtyQueue,
    trace: Vec<TraceEvent>,
    mounts: u64,
}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("config", &self.config)
            .field("instances", &self.instances.len())
            .field("dirty", &self.queue.borrow().len())
            .field("trace_len", &self.trace.len())
            .finish()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new(HarnessConfig::default())
    }
}

impl Harness {
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            instances: SlotMap::with_key(),
            queue: Rc::new(RefCell::new(BTreeSet::new())),
            trace: Vec::new(),
            mounts: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> HarnessConfig {
        self.config
    }

    /// Create an instance, render it and commit the render.
    pub fn mount(
        &mut self,
        name: &str,
        component: impl FnMut(&mut Scope<'_>) -> String + 'static,
    ) -> Result<InstanceId> {
        let pending = self.begin_mount(name, component)?;
        let id = pending.instance();
        self.commit(pending)?;
        Ok(id)
    }

    /// Create an instance and render it without committing.
    ///
    /// Discarding the returned render removes the instance again.
    pub fn begin_mount(
        &mut self,
        name: &str,
        component: impl FnMut(&mut Scope<'_>) -> String + 'static,
    ) -> Result<PendingRender> {
        self.mounts += 1;
        let label = format!("{name}#{}", self.mounts);
        let id = self.instances.insert(Instance {
            label,
            component: Box::new(component),
            slots: Vec::new(),
            committed: Vec::new(),
            committed_epoch: None,
            view: None,
            renders: 0,
            commits: 0,
        });
        self.begin_render(id)
    }

    /// Render an instance without committing. Clears its dirty mark.
    pub fn begin_render(&mut self, id: InstanceId) -> Result<PendingRender> {
        let queue = Rc::clone(&self.queue);
        let instance = self
            .instances
            .get_mut(id)
            .ok_or(HarnessError::UnknownInstance { id })?;
        let consumed_dirty = queue.borrow_mut().remove(&id);

        instance.renders += 1;
        let epoch = instance.renders;
        let label = instance.label.clone();
        let mut scope = Scope::new(id, &mut instance.slots, queue);
        let view = (instance.component)(&mut scope);
        let lifecycles = scope.finish();

        tracing::debug!(message = "harness.render", instance = %label, epoch);
        self.record(|seq| TraceEvent::Render {
            seq,
            instance: label,
            epoch,
        });
        Ok(PendingRender {
            id,
            epoch,
            view,
            lifecycles,
            consumed_dirty,
        })
    }

    /// Commit a pending render: publish its view, clean up the previous
    /// lifecycles, then commit the new ones.
    pub fn commit(&mut self, pending: PendingRender) -> Result<()> {
        let PendingRender {
            id,
            epoch,
            view,
            mut lifecycles,
            ..
        } = pending;
        let Some(instance) = self.instances.get_mut(id) else {
            tracing::warn!(message = "harness.commit.stale", epoch, reason = "unmounted");
            return Err(HarnessError::StaleRender { id, epoch });
        };
        if instance.committed_epoch.is_some_and(|last| last >= epoch) {
            tracing::warn!(message = "harness.commit.stale", epoch, reason = "superseded");
            return Err(HarnessError::StaleRender { id, epoch });
        }

        instance.committed_epoch = Some(epoch);
        instance.commits += 1;
        instance.view = Some(view.clone());
        let label = instance.label.clone();
        let mut previous = std::mem::take(&mut instance.committed);

        for lifecycle in &mut previous {
            lifecycle.on_cleanup_before_next_commit();
        }
        drop(previous);
        for lifecycle in &mut lifecycles {
            lifecycle.on_commit();
        }

        let count = lifecycles.len();
        if let Some(instance) = self.instances.get_mut(id) {
            instance.committed = lifecycles;
        }
        tracing::debug!(message = "harness.commit", instance = %label, epoch, lifecycles = count);
        self.record(|seq| TraceEvent::Commit {
            seq,
            instance: label,
            epoch,
            view,
            lifecycles: count,
        });
        Ok(())
    }

    /// Throw a pending render away.
    pub fn discard(&mut self, pending: PendingRender) {
        let PendingRender {
            id,
            epoch,
            lifecycles,
            consumed_dirty,
            ..
        } = pending;
        drop(lifecycles);

        let Some(instance) = self.instances.get(id) else {
            tracing::warn!(message = "harness.discard.stale", epoch, reason = "unmounted");
            return;
        };
        let label = instance.label.clone();
        if instance.committed_epoch.is_none() {
            self.instances.remove(id);
            self.queue.borrow_mut().remove(&id);
        } else if consumed_dirty {
            self.queue.borrow_mut().insert(id);
        }
        tracing::debug!(message = "harness.discard", instance = %label, epoch);
        self.record(|seq| TraceEvent::Discard {
            seq,
            instance: label,
            epoch,
        });
    }

    /// Remove an instance, running `on_unmount` on its committed lifecycles.
    pub fn unmount(&mut self, id: InstanceId) -> Result<()> {
        let mut instance = self
            .instances
            .remove(id)
            .ok_or(HarnessError::UnknownInstance { id })?;
        self.queue.borrow_mut().remove(&id);

        for lifecycle in &mut instance.committed {
            lifecycle.on_unmount();
        }
        let label = instance.label;
        tracing::debug!(message = "harness.unmount", instance = %label);
        self.record(|seq| TraceEvent::Unmount {
            seq,
            instance: label,
        });
        Ok(())
    }

    /// Render and commit dirty instances until none are left. Returns the
    /// number of renders.
    pub fn flush(&mut self) -> Result<usize> {
        let mut renders = 0usize;
        loop {
            let next = self.queue.borrow().first().copied();
            let Some(id) = next else {
                break;
            };
            if !self.instances.contains_key(id) {
                self.queue.borrow_mut().remove(&id);
                tracing::warn!(message = "harness.flush.skip_stale", instance = ?id);
                self.record(|seq| TraceEvent::SkipStale { seq });
                continue;
            }
            if renders >= self.config.max_flush_renders {
                tracing::warn!(
                    message = "harness.flush.render_loop",
                    limit = self.config.max_flush_renders
                );
                return Err(HarnessError::RenderLoop {
                    limit: self.config.max_flush_renders,
                });
            }
            let pending = self.begin_render(id)?;
            self.commit(pending)?;
            renders += 1;
        }
        self.record(|seq| TraceEvent::Flush { seq, renders });
        Ok(renders)
    }

    /// Last committed view of an instance.
    #[must_use]
    pub fn view(&self, id: InstanceId) -> Option<&str> {
        self.instances.get(id)?.view.as_deref()
    }

    /// Number of renders started for an instance, committed or not.
    #[must_use]
    pub fn render_count(&self, id: InstanceId) -> u64 {
        self.instances.get(id).map_or(0, |i| i.renders)
    }

    #[must_use]
    pub fn commit_count(&self, id: InstanceId) -> u64 {
        self.instances.get(id).map_or(0, |i| i.commits)
    }

    #[must_use]
    pub fn label(&self, id: InstanceId) -> Option<&str> {
        self.instances.get(id).map(|i| i.label.as_str())
    }

    #[must_use]
    pub fn is_mounted(&self, id: InstanceId) -> bool {
        self.instances
            .get(id)
            .is_some_and(|i| i.committed_epoch.is_some())
    }

    #[must_use]
    pub fn is_dirty(&self, id: InstanceId) -> bool {
        self.queue.borrow().contains(&id)
    }

    #[must_use]
    pub fn dirty_count(&self) -> usize {
        self.queue.borrow().len()
    }

    #[must_use]
    pub fn mounted_count(&self) -> usize {
        self.instances
            .values()
            .filter(|i| i.committed_epoch.is_some())
            .count()
    }

    /// Mounted instances in arena order.
    #[must_use]
    pub fn instances(&self) -> Vec<InstanceId> {
        self.instances
            .iter()
            .filter(|(_, i)| i.committed_epoch.is_some())
            .map(|(id, _)| id)
            .collect()
    }

    #[must_use]
    pub fn trace(&self) -> &[TraceEvent] {
        &self.trace
    }

    /// Drop all recorded events.
    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    /// Recorded events as JSON lines.
    pub fn trace_jsonl(&self) -> serde_json::Result<String> {
        trace::to_jsonl(&self.trace)
    }

    fn record(&mut self, event: impl FnOnce(u64) -> TraceEvent) {
        if self.config.record_trace {
            let seq = self.trace.len() as u64;
            self.trace.push(event(seq));
        }
    }
}
