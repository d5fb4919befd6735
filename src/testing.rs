//! In-memory stand-ins for the host seams, shared by the unit tests.

use crate::host::{
    Dom, GestureSource, Host, IntersectionCallback, IntersectionEntry, Media, NodeId, ObserverId,
    ObserverOptions, PlaybackError, Rect, Scheduler, Spawner, TimerHandle, Viewport,
    VisibilitySource,
};
use futures_util::future::{self, FutureExt, LocalBoxFuture};
use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, BTreeSet, VecDeque},
    rc::Rc,
    task::{Poll, Waker},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationKind {
    Class(String),
    Style(String),
    Attribute(String),
    Text,
    Tree,
    FormReset,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mutation {
    pub node: NodeId,
    pub kind: MutationKind,
}

#[derive(Default)]
struct FakeNode {
    tag: String,
    classes: BTreeSet<String>,
    styles: BTreeMap<String, String>,
    attributes: BTreeMap<String, String>,
    text: String,
    value: String,
    rect: Rect,
    layout: Rect,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

pub struct FakeDom {
    nodes: RefCell<Vec<FakeNode>>,
    viewport: Cell<Viewport>,
    log: RefCell<Vec<Mutation>>,
    scrolls: RefCell<Vec<(f64, bool)>>,
}

pub const BODY: NodeId = 0;
pub const HEAD: NodeId = 1;

impl FakeDom {
    pub fn new() -> Self {
        let dom = Self {
            nodes: RefCell::new(Vec::new()),
            viewport: Cell::new(Viewport {
                scroll_y: 0.0,
                width: 1280.0,
                height: 800.0,
            }),
            log: RefCell::new(Vec::new()),
            scrolls: RefCell::new(Vec::new()),
        };
        dom.add_node("body");
        dom.add_node("head");
        dom
    }

    pub fn add_node(&self, tag: &str) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(FakeNode {
            tag: tag.to_string(),
            ..FakeNode::default()
        });
        nodes.len() - 1
    }

    pub fn add_nodes(&self, tag: &str, count: usize) -> Vec<NodeId> {
        (0..count).map(|_| self.add_node(tag)).collect()
    }

    pub fn seed_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.nodes.borrow_mut()[node]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn seed_text(&self, node: NodeId, text: &str) {
        self.nodes.borrow_mut()[node].text = text.to_string();
    }

    pub fn seed_value(&self, node: NodeId, value: &str) {
        self.nodes.borrow_mut()[node].value = value.to_string();
    }

    pub fn seed_rect(&self, node: NodeId, rect: Rect) {
        self.nodes.borrow_mut()[node].rect = rect;
    }

    pub fn seed_layout(&self, node: NodeId, layout: Rect) {
        self.nodes.borrow_mut()[node].layout = layout;
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.viewport.set(viewport);
    }

    pub fn set_scroll_y(&self, scroll_y: f64) {
        let mut viewport = self.viewport.get();
        viewport.scroll_y = scroll_y;
        self.viewport.set(viewport);
    }

    pub fn set_width(&self, width: f64) {
        let mut viewport = self.viewport.get();
        viewport.width = width;
        self.viewport.set(viewport);
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.nodes.borrow()[node].classes.iter().cloned().collect()
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.nodes.borrow()[node].styles.get(property).cloned()
    }

    pub fn tag(&self, node: NodeId) -> String {
        self.nodes.borrow()[node].tag.clone()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node].children.clone()
    }

    pub fn scrolls(&self) -> Vec<(f64, bool)> {
        self.scrolls.borrow().clone()
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.log.borrow().clone()
    }

    pub fn mutated_nodes(&self) -> BTreeSet<NodeId> {
        self.log.borrow().iter().map(|entry| entry.node).collect()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    fn record(&self, node: NodeId, kind: MutationKind) {
        self.log.borrow_mut().push(Mutation { node, kind });
    }

    fn detach(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[node].parent.take() {
            nodes[parent].children.retain(|child| *child != node);
        }
    }
}

impl Dom for FakeDom {
    fn add_class(&self, node: NodeId, class: &str) {
        self.nodes.borrow_mut()[node].classes.insert(class.to_string());
        self.record(node, MutationKind::Class(class.to_string()));
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        self.nodes.borrow_mut()[node].classes.remove(class);
        self.record(node, MutationKind::Class(class.to_string()));
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes.borrow()[node].classes.contains(class)
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        {
            let styles = &mut self.nodes.borrow_mut()[node].styles;
            if value.is_empty() {
                styles.remove(property);
            } else {
                styles.insert(property.to_string(), value.to_string());
            }
        }
        self.record(node, MutationKind::Style(property.to_string()));
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[node].attributes.get(name).cloned()
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.nodes.borrow_mut()[node]
            .attributes
            .insert(name.to_string(), value.to_string());
        self.record(node, MutationKind::Attribute(name.to_string()));
    }

    fn remove_attribute(&self, node: NodeId, name: &str) {
        self.nodes.borrow_mut()[node].attributes.remove(name);
        self.record(node, MutationKind::Attribute(name.to_string()));
    }

    fn text(&self, node: NodeId) -> String {
        self.nodes.borrow()[node].text.clone()
    }

    fn set_text(&self, node: NodeId, text: &str) {
        self.nodes.borrow_mut()[node].text = text.to_string();
        self.record(node, MutationKind::Text);
    }

    fn input_value(&self, node: NodeId) -> String {
        self.nodes.borrow()[node].value.clone()
    }

    fn reset_form(&self, node: NodeId) {
        self.record(node, MutationKind::FormReset);
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        self.nodes.borrow()[node].rect
    }

    fn layout_box(&self, node: NodeId) -> Rect {
        self.nodes.borrow()[node].layout
    }

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn scroll_to(&self, top: f64, smooth: bool) {
        self.scrolls.borrow_mut().push((top, smooth));
    }

    fn create_element(&self, tag: &str) -> Option<NodeId> {
        Some(self.add_node(tag))
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        self.detach(child);
        {
            let mut nodes = self.nodes.borrow_mut();
            nodes[parent].children.push(child);
            nodes[child].parent = Some(parent);
        }
        self.record(parent, MutationKind::Tree);
    }

    fn prepend_child(&self, parent: NodeId, child: NodeId) {
        self.detach(child);
        {
            let mut nodes = self.nodes.borrow_mut();
            nodes[parent].children.insert(0, child);
            nodes[child].parent = Some(parent);
        }
        self.record(parent, MutationKind::Tree);
    }

    fn remove_node(&self, node: NodeId) {
        let parent = self.nodes.borrow()[node].parent;
        self.detach(node);
        if let Some(parent) = parent {
            self.record(parent, MutationKind::Tree);
        }
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .borrow()
            .iter()
            .position(|node| node.attributes.get("id").map(String::as_str) == Some(id))
    }

    fn body(&self) -> Option<NodeId> {
        Some(BODY)
    }

    fn head(&self) -> Option<NodeId> {
        Some(HEAD)
    }
}

enum TimerTask {
    Once(Box<dyn FnOnce()>),
    Repeat { period: u64, callback: Rc<dyn Fn()> },
}

struct PendingTimer {
    handle: TimerHandle,
    due: u64,
    task: TimerTask,
}

/// Virtual clock: nothing fires until the test calls `advance` or `run_frame`.
pub struct FakeScheduler {
    now: Cell<u64>,
    next_handle: Cell<u64>,
    timers: RefCell<Vec<PendingTimer>>,
    frames: RefCell<Vec<Box<dyn FnOnce()>>>,
    frame_requests: Cell<usize>,
}

impl FakeScheduler {
    pub fn new() -> Self {
        Self {
            now: Cell::new(0),
            next_handle: Cell::new(1),
            timers: RefCell::new(Vec::new()),
            frames: RefCell::new(Vec::new()),
            frame_requests: Cell::new(0),
        }
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn frame_requests(&self) -> usize {
        self.frame_requests.get()
    }

    pub fn advance(&self, ms: u64) {
        let target = self.now.get() + ms;
        loop {
            let next = self
                .timers
                .borrow()
                .iter()
                .enumerate()
                .filter(|(_, timer)| timer.due <= target)
                .min_by_key(|(_, timer)| (timer.due, timer.handle))
                .map(|(index, _)| index);
            let Some(index) = next else {
                break;
            };

            let timer = self.timers.borrow_mut().remove(index);
            self.now.set(timer.due);
            match timer.task {
                TimerTask::Once(callback) => callback(),
                TimerTask::Repeat { period, callback } => {
                    self.timers.borrow_mut().push(PendingTimer {
                        handle: timer.handle,
                        due: timer.due + period,
                        task: TimerTask::Repeat {
                            period,
                            callback: Rc::clone(&callback),
                        },
                    });
                    callback();
                }
            }
        }
        self.now.set(target);
    }

    pub fn run_frame(&self) {
        let frames = std::mem::take(&mut *self.frames.borrow_mut());
        for frame in frames {
            frame();
        }
    }

    fn next_handle(&self) -> TimerHandle {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        TimerHandle(handle)
    }
}

impl Scheduler for FakeScheduler {
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerHandle {
        let handle = self.next_handle();
        self.timers.borrow_mut().push(PendingTimer {
            handle,
            due: self.now.get() + u64::from(delay_ms),
            task: TimerTask::Once(callback),
        });
        handle
    }

    fn set_interval(&self, period_ms: u32, callback: Rc<dyn Fn()>) -> TimerHandle {
        let handle = self.next_handle();
        let period = u64::from(period_ms.max(1));
        self.timers.borrow_mut().push(PendingTimer {
            handle,
            due: self.now.get() + period,
            task: TimerTask::Repeat { period, callback },
        });
        handle
    }

    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        self.frame_requests.set(self.frame_requests.get() + 1);
        self.frames.borrow_mut().push(callback);
    }

    fn cancel(&self, handle: TimerHandle) {
        // Dropping the task outside the borrow keeps re-entrant drops safe.
        let removed: Vec<PendingTimer> = {
            let mut timers = self.timers.borrow_mut();
            let (removed, kept) = std::mem::take(&mut *timers)
                .into_iter()
                .partition(|timer| timer.handle == handle);
            *timers = kept;
            removed
        };
        drop(removed);
    }
}

struct FakeObserver {
    id: ObserverId,
    options: ObserverOptions,
    nodes: BTreeSet<NodeId>,
    callback: IntersectionCallback,
}

pub struct FakeVisibility {
    available: bool,
    next_id: Cell<u64>,
    observers: RefCell<Vec<FakeObserver>>,
}

impl FakeVisibility {
    pub fn new() -> Self {
        Self {
            available: true,
            next_id: Cell::new(1),
            observers: RefCell::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn is_observing(&self, node: NodeId) -> bool {
        self.observers
            .borrow()
            .iter()
            .any(|observer| observer.nodes.contains(&node))
    }

    pub fn options(&self) -> Vec<ObserverOptions> {
        self.observers
            .borrow()
            .iter()
            .map(|observer| observer.options.clone())
            .collect()
    }

    /// Delivers one entry to every observer currently watching `node`.
    pub fn emit(&self, node: NodeId, is_intersecting: bool) {
        let callbacks: Vec<IntersectionCallback> = self
            .observers
            .borrow()
            .iter()
            .filter(|observer| observer.nodes.contains(&node))
            .map(|observer| Rc::clone(&observer.callback))
            .collect();
        let entry = IntersectionEntry {
            node,
            is_intersecting,
        };
        for callback in callbacks {
            callback(&[entry]);
        }
    }
}

impl VisibilitySource for FakeVisibility {
    fn observe(
        &self,
        nodes: &[NodeId],
        options: &ObserverOptions,
        callback: IntersectionCallback,
    ) -> Option<ObserverId> {
        if !self.available {
            return None;
        }
        let id = ObserverId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.observers.borrow_mut().push(FakeObserver {
            id,
            options: options.clone(),
            nodes: nodes.iter().copied().collect(),
            callback,
        });
        Some(id)
    }

    fn unobserve(&self, observer: ObserverId, node: NodeId) {
        for entry in self.observers.borrow_mut().iter_mut() {
            if entry.id == observer {
                entry.nodes.remove(&node);
            }
        }
    }
}

pub struct FakeMedia {
    outcomes: RefCell<VecDeque<Result<(), PlaybackError>>>,
    fallback: Result<(), PlaybackError>,
    plays: Cell<u32>,
    pauses: Cell<u32>,
}

impl FakeMedia {
    pub fn accepting() -> Self {
        Self::with_fallback(Ok(()))
    }

    pub fn rejecting() -> Self {
        Self::with_fallback(Err(PlaybackError::new("NotAllowedError")))
    }

    fn with_fallback(fallback: Result<(), PlaybackError>) -> Self {
        Self {
            outcomes: RefCell::new(VecDeque::new()),
            fallback,
            plays: Cell::new(0),
            pauses: Cell::new(0),
        }
    }

    pub fn then(self, outcome: Result<(), PlaybackError>) -> Self {
        self.outcomes.borrow_mut().push_back(outcome);
        self
    }

    pub fn plays(&self) -> u32 {
        self.plays.get()
    }

    pub fn pauses(&self) -> u32 {
        self.pauses.get()
    }
}

impl Media for FakeMedia {
    fn play(&self) -> LocalBoxFuture<'static, Result<(), PlaybackError>> {
        self.plays.set(self.plays.get() + 1);
        let outcome = self
            .outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        future::ready(outcome).boxed_local()
    }

    fn pause(&self) {
        self.pauses.set(self.pauses.get() + 1);
    }
}

#[derive(Default)]
struct GestureSlot {
    fired: Cell<bool>,
    waker: RefCell<Option<Waker>>,
}

#[derive(Default)]
pub struct FakeGestures {
    slots: RefCell<Vec<Rc<GestureSlot>>>,
    registrations: Cell<u32>,
}

impl FakeGestures {
    pub fn registrations(&self) -> u32 {
        self.registrations.get()
    }

    /// Simulates a click; only registrations made before it observe it.
    pub fn click(&self) {
        let slots = std::mem::take(&mut *self.slots.borrow_mut());
        for slot in slots {
            slot.fired.set(true);
            if let Some(waker) = slot.waker.borrow_mut().take() {
                waker.wake();
            }
        }
    }
}

impl GestureSource for FakeGestures {
    fn first_gesture(&self) -> LocalBoxFuture<'static, ()> {
        self.registrations.set(self.registrations.get() + 1);
        let slot = Rc::new(GestureSlot::default());
        self.slots.borrow_mut().push(Rc::clone(&slot));
        future::poll_fn(move |cx| {
            if slot.fired.get() {
                Poll::Ready(())
            } else {
                *slot.waker.borrow_mut() = Some(cx.waker().clone());
                Poll::Pending
            }
        })
        .boxed_local()
    }
}

/// Polls spawned tasks once; anything still pending is parked.
#[derive(Default)]
pub struct InlineSpawner {
    parked: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
}

impl InlineSpawner {
    pub fn parked(&self) -> usize {
        self.parked.borrow().len()
    }
}

impl Spawner for InlineSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        let mut task = task;
        if (&mut task).now_or_never().is_none() {
            self.parked.borrow_mut().push(task);
        }
    }
}

pub struct Harness {
    pub dom: Rc<FakeDom>,
    pub scheduler: Rc<FakeScheduler>,
    pub visibility: Rc<FakeVisibility>,
    pub spawner: Rc<InlineSpawner>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_visibility(FakeVisibility::new())
    }

    pub fn with_visibility(visibility: FakeVisibility) -> Self {
        Self {
            dom: Rc::new(FakeDom::new()),
            scheduler: Rc::new(FakeScheduler::new()),
            visibility: Rc::new(visibility),
            spawner: Rc::new(InlineSpawner::default()),
        }
    }

    pub fn host(&self) -> Host {
        self.host_with_motion(false)
    }

    pub fn host_with_motion(&self, reduced_motion: bool) -> Host {
        Host {
            dom: self.dom.clone(),
            scheduler: self.scheduler.clone(),
            visibility: self.visibility.clone(),
            spawner: self.spawner.clone(),
            reduced_motion,
        }
    }
}
