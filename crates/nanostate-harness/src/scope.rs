#![forbid(unsafe_code)]

//! Render scope: the harness side of the [`Host`] contract.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use nanostate_core::{Host, Lifecycle, LocalState};

use crate::harness::InstanceId;

pub(crate) type DirtyQueue = Rc<RefCell<BTreeSet<InstanceId>>>;

pub(crate) struct StateCell<T> {
    value: RefCell<T>,
    owner: InstanceId,
    queue: DirtyQueue,
}

/// Local state slot of one harness instance.
pub struct HarnessState<T> {
    cell: Rc<StateCell<T>>,
}

impl<T> Clone for HarnessState<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for HarnessState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessState")
            .field("value", &self.cell.value.borrow())
            .field("owner", &self.cell.owner)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> LocalState<T> for HarnessState<T> {
    fn get(&self) -> T {
        self.cell.value.borrow().clone()
    }

    fn set(&self, value: T) {
        if *self.cell.value.borrow() == value {
            return;
        }
        *self.cell.value.borrow_mut() = value;
        self.cell.queue.borrow_mut().insert(self.cell.owner);
        tracing::trace!(message = "harness.state.set", owner = ?self.cell.owner);
    }
}

/// Per-render view of one instance's hook slots.
pub struct Scope<'a> {
    id: InstanceId,
    slots: &'a mut Vec<Rc<dyn Any>>,
    cursor: usize,
    lifecycles: Vec<Box<dyn Lifecycle>>,
    queue: DirtyQueue,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(id: InstanceId, slots: &'a mut Vec<Rc<dyn Any>>, queue: DirtyQueue) -> Self {
        Self {
            id,
            slots,
            cursor: 0,
            lifecycles: Vec::new(),
            queue,
        }
    }

    /// Instance being rendered.
    #[must_use]
    pub fn instance(&self) -> InstanceId {
        self.id
    }

    pub(crate) fn finish(self) -> Vec<Box<dyn Lifecycle>> {
        self.lifecycles
    }
}

impl Host for Scope<'_> {
    type State<T: Clone + PartialEq + 'static> = HarnessState<T>;

    /// # Panics
    ///
    /// Panics if the slot at this position holds a different type, i.e. the
    /// component changed its hook order between renders.
    fn use_state<T: Clone + PartialEq + 'static>(
        &mut self,
        init: impl FnOnce() -> T,
    ) -> HarnessState<T> {
        let index = self.cursor;
        self.cursor += 1;
        if index == self.slots.len() {
            self.slots.push(Rc::new(StateCell {
                value: RefCell::new(init()),
                owner: self.id,
                queue: Rc::clone(&self.queue),
            }));
        }
        let slot = Rc::clone(&self.slots[index]);
        let cell = slot.downcast::<StateCell<T>>().unwrap_or_else(|_| {
            panic!(
                "hook order changed between renders: state slot {index} of {:?} holds another type",
                self.id
            )
        });
        HarnessState { cell }
    }

    fn use_lifecycle(&mut self, lifecycle: Box<dyn Lifecycle>) {
        self.lifecycles.push(lifecycle);
    }
}
