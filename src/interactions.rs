//! Small page behaviors: reveals, carousels, hover states, the newsletter
//! stub, CTA ripples and the intro sequence.

use crate::{
    host::{set_class, Dom, Host, NodeId, ObserverOptions, Pointer, Scheduler, TimerHandle},
    motion::pointer_origin,
    telemetry::{log_event, LogLevel},
    visibility::{PresenceObserver, RevealObserver, Rotation},
};
use serde_json::json;
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

pub const APPEAR_CLASS: &str = "appear";
pub const ACTIVE_CLASS: &str = "active";
pub const LOADED_CLASS: &str = "loaded";
pub const SKIP_LINK_ID: &str = "skip-to-content";
pub const SUBSCRIBED_LABEL: &str = "Subscribed! ✓";
pub const SUBSCRIBED_BACKGROUND: &str = "linear-gradient(135deg, #84e1bc, #70a9ff)";
pub const RIPPLE_STYLESHEET_ID: &str = "ripple-animation";

const RIPPLE_KEYFRAMES: &str =
    "@keyframes ripple { 0% { transform: scale(0); opacity: 1; } 100% { transform: scale(4); opacity: 0; } }";
const RIPPLE_STYLE: &str = "position: absolute; border-radius: 50%; background: rgba(255, 255, 255, 0.6); \
     width: 100px; height: 100px; margin-top: -50px; margin-left: -50px; animation: ripple 0.6s; \
     pointer-events: none;";

pub fn attach_scroll_reveal(
    host: &Host,
    nodes: &[NodeId],
    threshold: f64,
    root_margin: &str,
) -> Option<Rc<RevealObserver>> {
    let dom = Rc::clone(&host.dom);
    RevealObserver::attach(
        Rc::clone(&host.visibility),
        nodes,
        &ObserverOptions::new(threshold).with_root_margin(root_margin),
        move |node| set_class(dom.as_ref(), node, APPEAR_CLASS, true),
    )
}

/// Swaps `data-src` into `src` the first time an image nears the viewport.
pub fn attach_lazy_images(host: &Host, images: &[NodeId]) -> Option<Rc<RevealObserver>> {
    let dom = Rc::clone(&host.dom);
    RevealObserver::attach(
        Rc::clone(&host.visibility),
        images,
        &ObserverOptions::new(0.0),
        move |image| {
            if let Some(source) = dom.attribute(image, "data-src") {
                dom.set_attribute(image, "src", &source);
                dom.remove_attribute(image, "data-src");
            }
        },
    )
}

/// Cycles the `active` statement while the container is on screen.
pub fn attach_statement_carousel(
    host: &Host,
    container: NodeId,
    statements: Vec<NodeId>,
    period_ms: u32,
    threshold: f64,
) -> Option<Rc<PresenceObserver>> {
    if statements.is_empty() {
        return None;
    }

    let dom = Rc::clone(&host.dom);
    let len = statements.len();
    let rotation = Rotation::new(Rc::clone(&host.scheduler), period_ms, len, move |current| {
        for (index, statement) in statements.iter().enumerate() {
            set_class(dom.as_ref(), *statement, ACTIVE_CLASS, index == current);
        }
    });

    PresenceObserver::attach(
        Rc::clone(&host.visibility),
        &[container],
        &ObserverOptions::new(threshold),
        move |_, visible| {
            if visible {
                rotation.start();
            } else {
                rotation.stop();
            }
        },
    )
}

/// Dims the sibling plans of the hovered one.
pub struct PricingHover {
    dom: Rc<dyn Dom>,
    plans: Vec<NodeId>,
}

impl PricingHover {
    pub fn new(host: &Host, plans: Vec<NodeId>) -> Self {
        Self {
            dom: Rc::clone(&host.dom),
            plans,
        }
    }

    pub fn on_enter(&self, hovered: NodeId) {
        for plan in self.plans.iter().filter(|plan| **plan != hovered) {
            self.dom.set_style(*plan, "opacity", "0.5");
        }
    }

    pub fn on_leave(&self) {
        for plan in &self.plans {
            self.dom.set_style(*plan, "opacity", "1");
        }
    }
}

pub fn email_domain(email: &str) -> &str {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .filter(|domain| !domain.is_empty())
        .unwrap_or("unknown")
}

struct NewsletterParts {
    dom: Rc<dyn Dom>,
    form: NodeId,
    input: Option<NodeId>,
    button: Option<NodeId>,
    original_label: RefCell<Option<String>>,
    pending_reset: Cell<Option<TimerHandle>>,
}

impl NewsletterParts {
    fn restore(&self) {
        self.pending_reset.set(None);
        if let (Some(button), Some(label)) = (self.button, self.original_label.borrow_mut().take()) {
            self.dom.set_text(button, &label);
            self.dom.set_style(button, "background", "");
        }
        self.dom.reset_form(self.form);
    }
}

/// Local-only signup confirmation. Nothing leaves the page.
pub struct Newsletter {
    scheduler: Rc<dyn Scheduler>,
    reset_ms: u32,
    parts: Rc<NewsletterParts>,
}

impl Newsletter {
    pub fn new(host: &Host, form: NodeId, input: Option<NodeId>, button: Option<NodeId>, reset_ms: u32) -> Self {
        Self {
            scheduler: Rc::clone(&host.scheduler),
            reset_ms,
            parts: Rc::new(NewsletterParts {
                dom: Rc::clone(&host.dom),
                form,
                input,
                button,
                original_label: RefCell::new(None),
                pending_reset: Cell::new(None),
            }),
        }
    }

    /// Returns the submitted address.
    pub fn on_submit(&self) -> String {
        let parts = &self.parts;
        let email = parts
            .input
            .map(|input| parts.dom.input_value(input).trim().to_string())
            .unwrap_or_default();

        log_event(
            LogLevel::Info,
            "newsletter_signup",
            json!({ "domain": email_domain(&email) }),
        );

        if let Some(button) = parts.button {
            if parts.original_label.borrow().is_none() {
                *parts.original_label.borrow_mut() = Some(parts.dom.text(button));
            }
            parts.dom.set_text(button, SUBSCRIBED_LABEL);
            parts.dom.set_style(button, "background", SUBSCRIBED_BACKGROUND);
        }

        if let Some(handle) = parts.pending_reset.take() {
            self.scheduler.cancel(handle);
        }
        let restore = Rc::clone(parts);
        let handle = self
            .scheduler
            .set_timeout(self.reset_ms, Box::new(move || restore.restore()));
        parts.pending_reset.set(Some(handle));

        email
    }
}

/// Click feedback on primary call-to-action buttons.
pub struct Ripple {
    dom: Rc<dyn Dom>,
    scheduler: Rc<dyn Scheduler>,
    lifetime_ms: u32,
}

impl Ripple {
    pub fn new(host: &Host, lifetime_ms: u32) -> Self {
        Self {
            dom: Rc::clone(&host.dom),
            scheduler: Rc::clone(&host.scheduler),
            lifetime_ms,
        }
    }

    fn ensure_keyframes(&self) {
        if self.dom.element_by_id(RIPPLE_STYLESHEET_ID).is_some() {
            return;
        }
        let (Some(head), Some(style)) = (self.dom.head(), self.dom.create_element("style")) else {
            return;
        };
        self.dom.set_attribute(style, "id", RIPPLE_STYLESHEET_ID);
        self.dom.set_text(style, RIPPLE_KEYFRAMES);
        self.dom.append_child(head, style);
    }

    pub fn on_click(&self, button: NodeId, pointer: Pointer) -> Option<NodeId> {
        self.ensure_keyframes();

        let ripple = self.dom.create_element("span")?;
        let (x, y) = pointer_origin(pointer, self.dom.bounding_rect(button));
        self.dom.set_attribute(
            ripple,
            "style",
            &format!("{RIPPLE_STYLE} left: {x:.2}px; top: {y:.2}px;"),
        );
        self.dom.append_child(button, ripple);

        let dom = Rc::clone(&self.dom);
        self.scheduler
            .set_timeout(self.lifetime_ms, Box::new(move || dom.remove_node(ripple)));

        log_event(
            LogLevel::Info,
            "cta_clicked",
            json!({ "label": self.dom.text(button).trim() }),
        );
        Some(ripple)
    }
}

pub fn stagger_delay(index: usize, step_ms: u32, base_ms: u32) -> u32 {
    u32::try_from(index)
        .unwrap_or(u32::MAX)
        .saturating_mul(step_ms)
        .saturating_add(base_ms)
}

/// Marks the page loaded and fades the hero copy in one element at a time.
pub struct HeroIntro {
    dom: Rc<dyn Dom>,
    scheduler: Rc<dyn Scheduler>,
    elements: Vec<NodeId>,
    step_ms: u32,
    base_ms: u32,
}

impl HeroIntro {
    pub fn new(host: &Host, elements: Vec<NodeId>, step_ms: u32, base_ms: u32) -> Self {
        Self {
            dom: Rc::clone(&host.dom),
            scheduler: Rc::clone(&host.scheduler),
            elements,
            step_ms,
            base_ms,
        }
    }

    pub fn on_load(&self) {
        if let Some(body) = self.dom.body() {
            set_class(self.dom.as_ref(), body, LOADED_CLASS, true);
        }

        for (index, element) in self.elements.iter().copied().enumerate() {
            let dom = Rc::clone(&self.dom);
            self.scheduler.set_timeout(
                stagger_delay(index, self.step_ms, self.base_ms),
                Box::new(move || set_class(dom.as_ref(), element, APPEAR_CLASS, true)),
            );
        }
    }
}

/// Prepends a keyboard skip link to `<body>` unless one is already there.
pub fn install_skip_link(dom: &dyn Dom, target: &str) -> Option<NodeId> {
    if dom.element_by_id(SKIP_LINK_ID).is_some() {
        return None;
    }

    let body = dom.body()?;
    let link = dom.create_element("a")?;
    dom.set_attribute(link, "id", SKIP_LINK_ID);
    dom.set_attribute(link, "href", &format!("#{target}"));
    dom.set_attribute(link, "class", "skip-link");
    dom.set_text(link, "Skip to main content");
    dom.prepend_child(body, link);
    Some(link)
}
