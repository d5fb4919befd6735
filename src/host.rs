//! Seams between the behavior controllers and the page they run in.
//!
//! Controllers never touch `window` or `document` directly. The browser build
//! implements these traits in `frontend`, tests implement them in `testing`.

use futures_util::future::LocalBoxFuture;
use std::{cell::RefCell, fmt, rc::Rc};

/// Opaque handle to an element owned by the host document.
pub type NodeId = usize;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pointer {
    pub client_x: f64,
    pub client_y: f64,
}

impl Pointer {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }
}

/// Render tree query and mutation surface.
pub trait Dom {
    fn add_class(&self, node: NodeId, class: &str);
    fn remove_class(&self, node: NodeId, class: &str);
    fn has_class(&self, node: NodeId, class: &str) -> bool;
    /// An empty `value` removes the property.
    fn set_style(&self, node: NodeId, property: &str, value: &str);
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&self, node: NodeId, name: &str);
    fn text(&self, node: NodeId) -> String;
    fn set_text(&self, node: NodeId, text: &str);
    fn input_value(&self, node: NodeId) -> String;
    fn reset_form(&self, node: NodeId);
    /// Bounding box relative to the viewport.
    fn bounding_rect(&self, node: NodeId) -> Rect;
    /// Offset box relative to the document.
    fn layout_box(&self, node: NodeId) -> Rect;
    fn viewport(&self) -> Viewport;
    fn scroll_to(&self, top: f64, smooth: bool);
    fn create_element(&self, tag: &str) -> Option<NodeId>;
    fn append_child(&self, parent: NodeId, child: NodeId);
    fn prepend_child(&self, parent: NodeId, child: NodeId);
    fn remove_node(&self, node: NodeId);
    fn element_by_id(&self, id: &str) -> Option<NodeId>;
    fn body(&self) -> Option<NodeId>;
    fn head(&self) -> Option<NodeId>;
}

/// Mutates class membership only when it differs from `on`.
pub fn set_class(dom: &dyn Dom, node: NodeId, class: &str, on: bool) {
    match (dom.has_class(node, class), on) {
        (false, true) => dom.add_class(node, class),
        (true, false) => dom.remove_class(node, class),
        _ => {}
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

pub trait Scheduler {
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerHandle;
    fn set_interval(&self, period_ms: u32, callback: Rc<dyn Fn()>) -> TimerHandle;
    fn request_frame(&self, callback: Box<dyn FnOnce()>);
    fn cancel(&self, handle: TimerHandle);
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObserverOptions {
    pub threshold: f64,
    pub root_margin: String,
}

impl ObserverOptions {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            root_margin: "0px".to_string(),
        }
    }

    pub fn with_root_margin(mut self, root_margin: impl Into<String>) -> Self {
        self.root_margin = root_margin.into();
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub node: NodeId,
    pub is_intersecting: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

pub type IntersectionCallback = Rc<dyn Fn(&[IntersectionEntry])>;

pub trait VisibilitySource {
    /// Returns `None` when the environment has no intersection primitive.
    fn observe(
        &self,
        nodes: &[NodeId],
        options: &ObserverOptions,
        callback: IntersectionCallback,
    ) -> Option<ObserverId>;
    fn unobserve(&self, observer: ObserverId, node: NodeId);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackError {
    pub reason: String,
}

impl PlaybackError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "playback rejected: {}", self.reason)
    }
}

impl std::error::Error for PlaybackError {}

pub trait Media {
    fn play(&self) -> LocalBoxFuture<'static, Result<(), PlaybackError>>;
    fn pause(&self);
}

pub trait GestureSource {
    /// Resolves on the first click or touch after the call.
    fn first_gesture(&self) -> LocalBoxFuture<'static, ()>;
}

/// Registrations that live until the first of them fires. Firing drops every
/// member, and members added afterwards are dropped on arrival.
pub struct OneShotGroup<L> {
    members: RefCell<Option<Vec<L>>>,
}

impl<L> OneShotGroup<L> {
    pub fn new() -> Self {
        Self {
            members: RefCell::new(Some(Vec::new())),
        }
    }

    pub fn add(&self, member: L) {
        if let Some(members) = self.members.borrow_mut().as_mut() {
            members.push(member);
        }
    }

    /// Returns `true` only for the first call.
    pub fn fire(&self) -> bool {
        let members = self.members.borrow_mut().take();
        members.is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.members.borrow().is_some()
    }
}

impl<L> Default for OneShotGroup<L> {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Spawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Everything a controller may reach for, cloned into each one at startup.
#[derive(Clone)]
pub struct Host {
    pub dom: Rc<dyn Dom>,
    pub scheduler: Rc<dyn Scheduler>,
    pub visibility: Rc<dyn VisibilitySource>,
    pub spawner: Rc<dyn Spawner>,
    pub reduced_motion: bool,
}
