//! Wrappers over the host intersection primitive.
//!
//! Both observers return `None` when the primitive is missing, which leaves the
//! watched elements in whatever state the markup gave them.

use crate::host::{
    IntersectionEntry, NodeId, ObserverId, ObserverOptions, Scheduler, TimerHandle,
    VisibilitySource,
};
use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
    rc::Rc,
};

/// Fires once per element on its first entry, then stops watching it.
pub struct RevealObserver {
    source: Rc<dyn VisibilitySource>,
    observer: Cell<Option<ObserverId>>,
    revealed: RefCell<HashSet<NodeId>>,
    on_reveal: Box<dyn Fn(NodeId)>,
}

impl RevealObserver {
    pub fn attach(
        source: Rc<dyn VisibilitySource>,
        nodes: &[NodeId],
        options: &ObserverOptions,
        on_reveal: impl Fn(NodeId) + 'static,
    ) -> Option<Rc<Self>> {
        if nodes.is_empty() {
            return None;
        }

        let observer = Rc::new(Self {
            source: Rc::clone(&source),
            observer: Cell::new(None),
            revealed: RefCell::new(HashSet::new()),
            on_reveal: Box::new(on_reveal),
        });
        let handler = Rc::clone(&observer);
        let id = source.observe(nodes, options, Rc::new(move |entries| handler.handle(entries)))?;
        observer.observer.set(Some(id));
        Some(observer)
    }

    pub fn handle(&self, entries: &[IntersectionEntry]) {
        for entry in entries.iter().filter(|entry| entry.is_intersecting) {
            if !self.revealed.borrow_mut().insert(entry.node) {
                continue;
            }
            (self.on_reveal)(entry.node);
            if let Some(id) = self.observer.get() {
                self.source.unobserve(id, entry.node);
            }
        }
    }

    pub fn is_revealed(&self, node: NodeId) -> bool {
        self.revealed.borrow().contains(&node)
    }
}

/// Reports every visibility transition per element.
pub struct PresenceObserver {
    visible: RefCell<HashMap<NodeId, bool>>,
    on_change: Box<dyn Fn(NodeId, bool)>,
}

impl PresenceObserver {
    pub fn attach(
        source: Rc<dyn VisibilitySource>,
        nodes: &[NodeId],
        options: &ObserverOptions,
        on_change: impl Fn(NodeId, bool) + 'static,
    ) -> Option<Rc<Self>> {
        if nodes.is_empty() {
            return None;
        }

        let observer = Rc::new(Self {
            visible: RefCell::new(HashMap::new()),
            on_change: Box::new(on_change),
        });
        let handler = Rc::clone(&observer);
        source.observe(nodes, options, Rc::new(move |entries| handler.handle(entries)))?;
        Some(observer)
    }

    pub fn handle(&self, entries: &[IntersectionEntry]) {
        for entry in entries {
            let previous = self
                .visible
                .borrow_mut()
                .insert(entry.node, entry.is_intersecting);
            if previous != Some(entry.is_intersecting) {
                (self.on_change)(entry.node, entry.is_intersecting);
            }
        }
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        self.visible.borrow().get(&node).copied().unwrap_or(false)
    }
}

/// A periodic action stepping through `len` states.
pub struct Rotation {
    inner: Rc<RotationInner>,
}

struct RotationInner {
    scheduler: Rc<dyn Scheduler>,
    period_ms: u32,
    len: usize,
    next: Cell<usize>,
    interval: Cell<Option<TimerHandle>>,
    step: Box<dyn Fn(usize)>,
}

impl RotationInner {
    fn advance(&self) {
        let index = self.next.get();
        (self.step)(index);
        self.next.set((index + 1) % self.len);
    }
}

impl Rotation {
    pub fn new(
        scheduler: Rc<dyn Scheduler>,
        period_ms: u32,
        len: usize,
        step: impl Fn(usize) + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(RotationInner {
                scheduler,
                period_ms,
                len,
                next: Cell::new(0),
                interval: Cell::new(None),
                step: Box::new(step),
            }),
        }
    }

    /// Restarts from the first step. Any running interval is replaced.
    pub fn start(&self) {
        self.stop();
        if self.inner.len == 0 {
            return;
        }

        self.inner.next.set(0);
        self.inner.advance();

        let inner = Rc::clone(&self.inner);
        let handle = self
            .inner
            .scheduler
            .set_interval(self.inner.period_ms, Rc::new(move || inner.advance()));
        self.inner.interval.set(Some(handle));
    }

    pub fn stop(&self) {
        if let Some(handle) = self.inner.interval.take() {
            self.inner.scheduler.cancel(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.interval.get().is_some()
    }
}
