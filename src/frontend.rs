use crate::{
    config::{SiteConfig, CONFIG_ELEMENT_ID},
    host::{
        Dom, GestureSource, Host, IntersectionCallback, IntersectionEntry, Media, NodeId, ObserverId,
        ObserverOptions, OneShotGroup, PlaybackError, Pointer, Rect, Scheduler, Spawner, TimerHandle, Viewport,
        VisibilitySource,
    },
    interactions::{
        attach_lazy_images, attach_scroll_reveal, attach_statement_carousel, install_skip_link, HeroIntro,
        Newsletter, PricingHover, Ripple,
    },
    motion::{Parallax, PointerGlow, Tilt},
    navigation::{fragment_target, ActiveNav, MobileMenu, NavLink, NavbarShrink, Section, SmoothScroll},
    playback::{start_autoplay_videos, AutoplayVideo},
    selectors,
    telemetry::{log_event, log_page_metrics, set_min_level, LogLevel, NavigationTiming, BRANDING},
};
use futures_util::future::{self, FutureExt, LocalBoxFuture};
use gloo::{
    events::{EventListener, EventListenerOptions},
    timers::callback::{Interval, Timeout},
};
use js_sys::{Array, Promise, Reflect};
use serde_json::json;
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    window, Document, Element, ErrorEvent, Event, EventTarget, HtmlElement,
    HtmlFormElement, HtmlInputElement, HtmlMediaElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, MouseEvent, ScrollBehavior, ScrollToOptions, Window,
};

const DEFAULT_VIEWPORT: (f64, f64) = (1280.0, 720.0);

type InitResult<T> = Result<T, &'static str>;

/// Issues `NodeId`s for the elements controllers work on. Slots of removed
/// nodes are reused.
struct WebDom {
    window: Window,
    document: Document,
    nodes: RefCell<Vec<Option<Element>>>,
    free: RefCell<Vec<NodeId>>,
}

impl WebDom {
    fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            nodes: RefCell::new(Vec::new()),
            free: RefCell::new(Vec::new()),
        }
    }

    fn register(&self, element: Element) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(existing) = nodes.iter().position(|slot| slot.as_ref() == Some(&element)) {
            return existing;
        }
        if let Some(slot) = self.free.borrow_mut().pop() {
            nodes[slot] = Some(element);
            return slot;
        }
        nodes.push(Some(element));
        nodes.len() - 1
    }

    fn element(&self, node: NodeId) -> Option<Element> {
        self.nodes.borrow().get(node).cloned().flatten()
    }

    fn html(&self, node: NodeId) -> Option<HtmlElement> {
        self.element(node)?.dyn_into::<HtmlElement>().ok()
    }

    fn select(&self, selector: &str) -> Option<(NodeId, Element)> {
        let element = self.document.query_selector(selector).ok().flatten()?;
        Some((self.register(element.clone()), element))
    }

    fn select_all(&self, selector: &str) -> Vec<(NodeId, Element)> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };

        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| (self.register(element.clone()), element))
            .collect()
    }

    fn by_id(&self, id: &str) -> Option<(NodeId, Element)> {
        let element = self.document.get_element_by_id(id)?;
        Some((self.register(element.clone()), element))
    }
}

impl Dom for WebDom {
    fn add_class(&self, node: NodeId, class: &str) {
        if let Some(element) = self.element(node) {
            let _ = element.class_list().add_1(class);
        }
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(element) = self.element(node) {
            let _ = element.class_list().remove_1(class);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .map(|element| element.class_list().contains(class))
            .unwrap_or(false)
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        let Some(element) = self.html(node) else {
            return;
        };
        let style = element.style();
        if value.is_empty() {
            let _ = style.remove_property(property);
        } else {
            let _ = style.set_property(property, value);
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element(node) {
            let _ = element.set_attribute(name, value);
        }
    }

    fn remove_attribute(&self, node: NodeId, name: &str) {
        if let Some(element) = self.element(node) {
            let _ = element.remove_attribute(name);
        }
    }

    fn text(&self, node: NodeId) -> String {
        self.element(node)
            .and_then(|element| element.text_content())
            .unwrap_or_default()
    }

    fn set_text(&self, node: NodeId, text: &str) {
        if let Some(element) = self.element(node) {
            element.set_text_content(Some(text));
        }
    }

    fn input_value(&self, node: NodeId) -> String {
        self.element(node)
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn reset_form(&self, node: NodeId) {
        if let Some(form) = self
            .element(node)
            .and_then(|element| element.dyn_into::<HtmlFormElement>().ok())
        {
            form.reset();
        }
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        self.element(node)
            .map(|element| {
                let rect = element.get_bounding_client_rect();
                Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
            })
            .unwrap_or_default()
    }

    fn layout_box(&self, node: NodeId) -> Rect {
        self.html(node)
            .map(|element| {
                Rect::new(
                    f64::from(element.offset_left()),
                    f64::from(element.offset_top()),
                    f64::from(element.offset_width()),
                    f64::from(element.offset_height()),
                )
            })
            .unwrap_or_default()
    }

    fn viewport(&self) -> Viewport {
        let dimension = |value: Result<JsValue, JsValue>, fallback: f64| {
            value.ok().and_then(|value| value.as_f64()).unwrap_or(fallback)
        };

        Viewport {
            scroll_y: self.window.scroll_y().unwrap_or(0.0),
            width: dimension(self.window.inner_width(), DEFAULT_VIEWPORT.0),
            height: dimension(self.window.inner_height(), DEFAULT_VIEWPORT.1),
        }
    }

    fn scroll_to(&self, top: f64, smooth: bool) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(if smooth {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Auto
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn create_element(&self, tag: &str) -> Option<NodeId> {
        let element = self.document.create_element(tag).ok()?;
        Some(self.register(element))
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        if let (Some(parent), Some(child)) = (self.element(parent), self.element(child)) {
            let _ = parent.append_child(&child);
        }
    }

    fn prepend_child(&self, parent: NodeId, child: NodeId) {
        if let (Some(parent), Some(child)) = (self.element(parent), self.element(child)) {
            let _ = parent.prepend_with_node_1(&child);
        }
    }

    fn remove_node(&self, node: NodeId) {
        let Some(element) = self.nodes.borrow_mut().get_mut(node).and_then(Option::take) else {
            return;
        };
        element.remove();
        self.free.borrow_mut().push(node);
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.by_id(id).map(|(node, _)| node)
    }

    fn body(&self) -> Option<NodeId> {
        let body = self.document.body()?;
        Some(self.register(body.into()))
    }

    fn head(&self) -> Option<NodeId> {
        let head = self.document.head()?;
        Some(self.register(head.into()))
    }
}

/// gloo timers keyed by handle; dropping one clears it.
#[derive(Default)]
struct WebScheduler {
    next_handle: Cell<u64>,
    timeouts: Rc<RefCell<HashMap<TimerHandle, Timeout>>>,
    intervals: RefCell<HashMap<TimerHandle, Interval>>,
}

impl WebScheduler {
    fn next_handle(&self) -> TimerHandle {
        let handle = self.next_handle.get() + 1;
        self.next_handle.set(handle);
        TimerHandle(handle)
    }
}

impl Scheduler for WebScheduler {
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerHandle {
        let handle = self.next_handle();
        let timeouts = Rc::clone(&self.timeouts);
        let timeout = Timeout::new(delay_ms, move || {
            let finished = timeouts.borrow_mut().remove(&handle);
            callback();
            drop(finished);
        });
        self.timeouts.borrow_mut().insert(handle, timeout);
        handle
    }

    fn set_interval(&self, period_ms: u32, callback: Rc<dyn Fn()>) -> TimerHandle {
        let handle = self.next_handle();
        let interval = Interval::new(period_ms, move || callback());
        self.intervals.borrow_mut().insert(handle, interval);
        handle
    }

    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        let Some(window) = window() else {
            return;
        };
        let frame = Closure::once_into_js(move || callback());
        if window.request_animation_frame(frame.unchecked_ref()).is_err() {
            log_event(LogLevel::Warn, "frame_request_failed", json!({}));
        }
    }

    fn cancel(&self, handle: TimerHandle) {
        let timeout = self.timeouts.borrow_mut().remove(&handle);
        let interval = self.intervals.borrow_mut().remove(&handle);
        drop(timeout);
        drop(interval);
    }
}

struct WebVisibility {
    dom: Rc<WebDom>,
    next_id: Cell<u64>,
    observers: RefCell<HashMap<ObserverId, IntersectionObserver>>,
}

impl WebVisibility {
    fn new(dom: Rc<WebDom>) -> Self {
        Self {
            dom,
            next_id: Cell::new(0),
            observers: RefCell::new(HashMap::new()),
        }
    }

    fn supported(&self) -> bool {
        Reflect::has(&self.dom.window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
    }
}

impl VisibilitySource for WebVisibility {
    fn observe(
        &self,
        nodes: &[NodeId],
        options: &ObserverOptions,
        callback: IntersectionCallback,
    ) -> Option<ObserverId> {
        if !self.supported() {
            return None;
        }

        let targets: Vec<(NodeId, Element)> = nodes
            .iter()
            .filter_map(|node| Some((*node, self.dom.element(*node)?)))
            .collect();
        let watched = targets.clone();
        let handler = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let batch: Vec<IntersectionEntry> = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                    .filter_map(|entry| {
                        let target = entry.target();
                        let (node, _) = watched.iter().find(|(_, element)| *element == target)?;
                        Some(IntersectionEntry {
                            node: *node,
                            is_intersecting: entry.is_intersecting(),
                        })
                    })
                    .collect();
                if !batch.is_empty() {
                    callback(&batch);
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin);
        let observer = match IntersectionObserver::new_with_options(handler.as_ref().unchecked_ref(), &init) {
            Ok(observer) => observer,
            Err(_) => {
                log_event(
                    LogLevel::Warn,
                    "observer_rejected_options",
                    json!({ "root_margin": options.root_margin, "threshold": options.threshold }),
                );
                return None;
            }
        };
        handler.forget();

        for (_, element) in &targets {
            observer.observe(element);
        }

        let id = ObserverId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.observers.borrow_mut().insert(id, observer);
        Some(id)
    }

    fn unobserve(&self, observer: ObserverId, node: NodeId) {
        let observers = self.observers.borrow();
        if let (Some(observer), Some(element)) = (observers.get(&observer), self.dom.element(node)) {
            observer.unobserve(&element);
        }
    }
}

fn playback_error(value: JsValue) -> PlaybackError {
    let reason = Reflect::get(&value, &JsValue::from_str("name"))
        .ok()
        .and_then(|name| name.as_string())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| "unknown".to_string());
    PlaybackError::new(reason)
}

struct WebMedia {
    video: HtmlMediaElement,
}

impl Media for WebMedia {
    fn play(&self) -> LocalBoxFuture<'static, Result<(), PlaybackError>> {
        match self.video.play() {
            Ok(promise) => JsFuture::from(promise)
                .map(|outcome| outcome.map(|_| ()).map_err(playback_error))
                .boxed_local(),
            Err(error) => future::ready(Err(playback_error(error))).boxed_local(),
        }
    }

    fn pause(&self) {
        let _ = self.video.pause();
    }
}

struct WebGestures {
    document: Document,
}

impl GestureSource for WebGestures {
    fn first_gesture(&self) -> LocalBoxFuture<'static, ()> {
        let target: EventTarget = self.document.clone().into();
        let gesture = Promise::new(&mut |resolve, _reject| {
            // Whichever event comes first removes both listeners.
            let group = Rc::new(OneShotGroup::new());
            for event_type in ["click", "touchstart"] {
                let resolve = resolve.clone();
                let first = Rc::clone(&group);
                group.add(EventListener::once(&target, event_type, move |_| {
                    if first.fire() {
                        let _ = resolve.call0(&JsValue::NULL);
                    }
                }));
            }
        });

        JsFuture::from(gesture).map(|_| ()).boxed_local()
    }
}

struct LocalSpawner;

impl Spawner for LocalSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        spawn_local(task);
    }
}

fn prefers_reduced_motion(window: &Window) -> bool {
    window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

fn load_config(document: &Document) -> SiteConfig {
    let Some(source) = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|element| element.text_content())
    else {
        return SiteConfig::default();
    };

    match SiteConfig::from_json(&source) {
        Ok(config) => config,
        Err(error) => {
            log_event(
                LogLevel::Warn,
                "site_config_invalid",
                json!({ "error": error.to_string() }),
            );
            SiteConfig::default()
        }
    }
}

fn pointer(event: &Event) -> Option<Pointer> {
    let event = event.dyn_ref::<MouseEvent>()?;
    Some(Pointer::new(f64::from(event.client_x()), f64::from(event.client_y())))
}

fn listen(target: &EventTarget, event_type: &'static str, callback: impl FnMut(&Event) + 'static) {
    EventListener::new(target, event_type, callback).forget();
}

fn listen_cancelable(target: &EventTarget, event_type: &'static str, callback: impl FnMut(&Event) + 'static) {
    EventListener::new_with_options(
        target,
        event_type,
        EventListenerOptions::enable_prevent_default(),
        callback,
    )
    .forget();
}

struct Page {
    window: Window,
    dom: Rc<WebDom>,
    host: Host,
    config: SiteConfig,
}

impl Page {
    fn new(window: Window, document: Document, config: SiteConfig) -> Self {
        let dom = Rc::new(WebDom::new(window.clone(), document));
        let host = Host {
            dom: dom.clone(),
            scheduler: Rc::new(WebScheduler::default()),
            visibility: Rc::new(WebVisibility::new(Rc::clone(&dom))),
            spawner: Rc::new(LocalSpawner),
            reduced_motion: prefers_reduced_motion(&window),
        };

        Self {
            window,
            dom,
            host,
            config,
        }
    }

    fn page_url(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn nav_links(&self) -> Vec<(NodeId, Element, Option<String>)> {
        let page_url = self.page_url();
        self.dom
            .select_all(selectors::NAV_LINKS)
            .into_iter()
            .map(|(node, element)| {
                let target = element
                    .get_attribute("href")
                    .and_then(|href| fragment_target(&page_url, &href));
                (node, element, target)
            })
            .collect()
    }
}

fn report<T>(controller: &str, result: InitResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(reason) => {
            log_event(
                LogLevel::Warn,
                "controller_init_failed",
                json!({ "controller": controller, "reason": reason }),
            );
            None
        }
    }
}

fn wire_mobile_menu(page: &Page) -> InitResult<Rc<MobileMenu>> {
    let (button, button_element) = page.dom.select(selectors::MENU_BUTTON).ok_or("missing menu button")?;
    let (menu, _) = page.dom.select(selectors::MENU).ok_or("missing menu list")?;
    let controller = Rc::new(MobileMenu::new(
        &page.host,
        button,
        menu,
        page.config.mobile_breakpoint_px,
        page.config.resize_debounce_ms,
    ));

    let clicks = Rc::clone(&controller);
    listen(&button_element, "click", move |_| clicks.toggle());

    let keys = Rc::clone(&controller);
    listen_cancelable(&button_element, "keydown", move |event| {
        if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
            if keys.on_button_key(&event.key()) {
                event.prevent_default();
            }
        }
    });

    let escapes = Rc::clone(&controller);
    listen(&page.dom.document, "keydown", move |event| {
        if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
            escapes.on_key(&event.key());
        }
    });

    let resizes = Rc::clone(&controller);
    listen(&page.window, "resize", move |_| resizes.on_resize());

    Ok(controller)
}

fn wire_smooth_scroll(page: &Page, menu: Option<Rc<MobileMenu>>) -> InitResult<()> {
    let links = page.nav_links();
    if links.is_empty() {
        return Err("no in-page navigation links");
    }

    let navbar = page.dom.element_by_id(selectors::NAVBAR_ID);
    let controller = Rc::new(SmoothScroll::new(
        &page.host,
        navbar,
        page.config.navbar_fallback_height_px,
        menu,
    ));

    for (_, element, target) in links {
        let Some(target) = target else {
            continue;
        };
        let controller = Rc::clone(&controller);
        listen_cancelable(&element, "click", move |event| {
            if controller.on_link_click(&target) {
                event.prevent_default();
            }
        });
    }
    Ok(())
}

fn wire_active_nav(page: &Page) -> InitResult<()> {
    let sections: Vec<Section> = page
        .dom
        .select_all(selectors::SECTIONS)
        .into_iter()
        .map(|(node, element)| Section { node, id: element.id() })
        .collect();
    let links: Vec<NavLink> = page
        .nav_links()
        .into_iter()
        .filter_map(|(node, _, target)| Some(NavLink { node, target: target? }))
        .collect();
    if sections.is_empty() || links.is_empty() {
        return Err("no sections or navigation links");
    }

    let controller = ActiveNav::new(
        &page.host,
        sections,
        links,
        page.config.section_offset_px,
        page.config.nav_throttle_ms,
    );
    listen(&page.window, "scroll", move |_| controller.on_scroll());
    Ok(())
}

fn wire_navbar_shrink(page: &Page) -> InitResult<()> {
    let navbar = page.dom.element_by_id(selectors::NAVBAR_ID).ok_or("missing navbar")?;
    let controller = NavbarShrink::new(&page.host, navbar, page.config.navbar_shrink_offset_px);
    listen(&page.window, "scroll", move |_| controller.on_scroll());
    Ok(())
}

fn wire_scroll_reveal(page: &Page) -> InitResult<()> {
    let targets: Vec<NodeId> = page
        .dom
        .select_all(selectors::REVEAL_TARGETS)
        .into_iter()
        .map(|(node, _)| node)
        .collect();
    if attach_scroll_reveal(
        &page.host,
        &targets,
        page.config.reveal_threshold,
        &page.config.reveal_root_margin,
    )
    .is_none()
    {
        log_event(LogLevel::Debug, "scroll_reveal_inactive", json!({ "targets": targets.len() }));
    }
    Ok(())
}

fn wire_pointer_glow(page: &Page) -> InitResult<()> {
    let (hero, hero_element) = page.dom.by_id(selectors::HERO_ID).ok_or("missing hero")?;
    let (overlay, _) = page.dom.select(selectors::MESH_OVERLAY).ok_or("missing mesh overlay")?;
    let controller = Rc::new(PointerGlow::new(
        &page.host,
        hero,
        overlay,
        page.config.pointer_throttle_ms,
    ));

    let moves = Rc::clone(&controller);
    listen(&hero_element, "mousemove", move |event| {
        if let Some(pointer) = pointer(event) {
            moves.on_pointer_move(pointer);
        }
    });
    let enters = Rc::clone(&controller);
    listen(&hero_element, "mouseenter", move |_| enters.on_pointer_enter());
    listen(&hero_element, "mouseleave", move |_| controller.on_pointer_leave());
    Ok(())
}

fn wire_statement_carousel(page: &Page) -> InitResult<()> {
    let (container, _) = page
        .dom
        .select(selectors::IMPACT_CONTAINER)
        .ok_or("missing impact container")?;
    let statements: Vec<NodeId> = page
        .dom
        .select_all(selectors::IMPACT_STATEMENTS)
        .into_iter()
        .map(|(node, _)| node)
        .collect();
    if statements.is_empty() {
        return Err("no impact statements");
    }

    attach_statement_carousel(
        &page.host,
        container,
        statements,
        page.config.rotation_period_ms,
        page.config.rotation_threshold,
    );
    Ok(())
}

fn wire_parallax(page: &Page) -> InitResult<()> {
    let (section, _) = page.dom.by_id(selectors::IMPACT_ID).ok_or("missing impact section")?;
    let (video, _) = page.dom.select(selectors::IMPACT_VIDEO).ok_or("missing impact video")?;

    let parallax = Parallax::new(&page.host, section, video, page.config.parallax_strength_px);
    listen(&page.window, "scroll", move |_| parallax.on_scroll());
    Ok(())
}

fn wire_autoplay(page: &Page) -> InitResult<()> {
    let gestures: Rc<dyn GestureSource> = Rc::new(WebGestures {
        document: page.dom.document.clone(),
    });

    let videos: Vec<AutoplayVideo> = page
        .dom
        .select_all(selectors::AUTOPLAY_VIDEOS)
        .into_iter()
        .enumerate()
        .filter_map(|(index, (node, element))| {
            let label = Some(element.id())
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("video-{index}"));
            let video = element.dyn_into::<HtmlMediaElement>().ok()?;
            Some(AutoplayVideo {
                label,
                node,
                media: Rc::new(WebMedia { video }),
            })
        })
        .collect();
    if videos.is_empty() {
        return Err("no autoplay videos");
    }

    start_autoplay_videos(&page.host, gestures, videos, page.config.video_threshold);
    Ok(())
}

fn wire_tilt(page: &Page) -> InitResult<()> {
    for (card, element) in page.dom.select_all(selectors::FEATURE_CARDS) {
        let controller = Rc::new(Tilt::new(&page.host, card, page.config.tilt_divisor));

        let moves = Rc::clone(&controller);
        listen(&element, "mousemove", move |event| {
            if let Some(pointer) = pointer(event) {
                moves.on_pointer_move(pointer);
            }
        });
        listen(&element, "mouseleave", move |_| controller.on_pointer_leave());
    }
    Ok(())
}

fn wire_pricing_hover(page: &Page) -> InitResult<()> {
    let plans = page.dom.select_all(selectors::PRICING_PLANS);
    let controller = Rc::new(PricingHover::new(
        &page.host,
        plans.iter().map(|(node, _)| *node).collect(),
    ));

    for (plan, element) in plans {
        let enters = Rc::clone(&controller);
        listen(&element, "mouseenter", move |_| enters.on_enter(plan));
        let leaves = Rc::clone(&controller);
        listen(&element, "mouseleave", move |_| leaves.on_leave());
    }
    Ok(())
}

fn wire_newsletter(page: &Page) -> InitResult<()> {
    let (form, form_element) = page
        .dom
        .select(selectors::NEWSLETTER_FORM)
        .ok_or("missing newsletter form")?;
    let input = page.dom.select(selectors::NEWSLETTER_INPUT).map(|(node, _)| node);
    let button = page.dom.select(selectors::NEWSLETTER_BUTTON).map(|(node, _)| node);
    let controller = Newsletter::new(&page.host, form, input, button, page.config.newsletter_reset_ms);

    listen_cancelable(&form_element, "submit", move |event| {
        event.prevent_default();
        controller.on_submit();
    });
    Ok(())
}

fn wire_ripple(page: &Page) -> InitResult<()> {
    let controller = Rc::new(Ripple::new(&page.host, page.config.ripple_lifetime_ms));

    for (button, element) in page.dom.select_all(selectors::CTA_BUTTONS) {
        let clicks = Rc::clone(&controller);
        listen(&element, "click", move |event| {
            if let Some(pointer) = pointer(event) {
                clicks.on_click(button, pointer);
            }
        });
    }
    Ok(())
}

fn wire_lazy_images(page: &Page) -> InitResult<()> {
    let images: Vec<NodeId> = page
        .dom
        .select_all(selectors::LAZY_IMAGES)
        .into_iter()
        .map(|(node, _)| node)
        .collect();
    attach_lazy_images(&page.host, &images);
    Ok(())
}

fn hero_intro(page: &Page) -> HeroIntro {
    let elements = page
        .dom
        .select_all(selectors::HERO_INTRO)
        .into_iter()
        .map(|(node, _)| node)
        .collect();
    HeroIntro::new(
        &page.host,
        elements,
        page.config.hero_stagger_ms,
        page.config.hero_delay_ms,
    )
}

fn init(page: &Page) {
    install_skip_link(page.dom.as_ref(), selectors::HERO_ID);

    let menu = report("mobile_menu", wire_mobile_menu(page));
    report("smooth_scroll", wire_smooth_scroll(page, menu));
    report("active_nav", wire_active_nav(page));
    report("navbar_shrink", wire_navbar_shrink(page));
    report("scroll_reveal", wire_scroll_reveal(page));
    report("pointer_glow", wire_pointer_glow(page));
    report("statement_carousel", wire_statement_carousel(page));
    report("parallax", wire_parallax(page));
    report("autoplay", wire_autoplay(page));
    report("tilt", wire_tilt(page));
    report("pricing_hover", wire_pricing_hover(page));
    report("newsletter", wire_newsletter(page));
    report("ripple", wire_ripple(page));
    report("lazy_images", wire_lazy_images(page));

    log_event(
        LogLevel::Info,
        "site_ready",
        json!({ "reduced_motion": page.host.reduced_motion }),
    );
}

fn on_load(page: &Page) {
    hero_intro(page).on_load();

    let Some(timing) = page.window.performance().map(|performance| performance.timing()) else {
        return;
    };
    log_page_metrics(&NavigationTiming {
        navigation_start: timing.navigation_start(),
        request_start: timing.request_start(),
        response_end: timing.response_end(),
        dom_loading: timing.dom_loading(),
        dom_complete: timing.dom_complete(),
        load_event_end: timing.load_event_end(),
    });
}

fn print_branding() {
    for (text, css) in BRANDING {
        web_sys::console::log_2(&JsValue::from_str(text), &JsValue::from_str(css));
    }
}

pub fn run() {
    console_error_panic_hook::set_once();

    let Some(window) = window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let config = load_config(&document);
    set_min_level(config.log_level);

    listen(&window, "error", |event| {
        let message = event
            .dyn_ref::<ErrorEvent>()
            .map(|event| event.message())
            .unwrap_or_default();
        log_event(LogLevel::Error, "uncaught_error", json!({ "message": message }));
    });
    print_branding();

    let state = document.ready_state();
    let page = Rc::new(Page::new(window.clone(), document.clone(), config));

    if state == "loading" {
        let ready = Rc::clone(&page);
        EventListener::once(&document, "DOMContentLoaded", move |_| init(&ready)).forget();
    } else {
        init(&page);
    }

    if state == "complete" {
        on_load(&page);
    } else {
        EventListener::once(&window, "load", move |_| on_load(&page)).forget();
    }
}
