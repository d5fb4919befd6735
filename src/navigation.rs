//! Section tracking, the navbar and the mobile menu.

use crate::{
    host::{set_class, Dom, Host, NodeId, Rect},
    rate_limit::{Debounce, FrameCoalescer, Throttle},
};
use std::rc::Rc;
use url::Url;

pub const ACTIVE_CLASS: &str = "active";
pub const SCROLLED_CLASS: &str = "scrolled";
pub const OPEN_CLASS: &str = "open";

/// Scroll offsets during which a section counts as the current one.
/// `start` is inclusive, `end` exclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionBand {
    pub start: f64,
    pub end: f64,
}

impl SectionBand {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// The band begins `lead` pixels before the section's top edge.
    pub fn from_layout(layout: Rect, lead: f64) -> Self {
        let start = layout.top - lead;
        Self::new(start, start + layout.height)
    }

    pub fn contains(&self, offset: f64) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// First band containing `offset`. Offsets outside every band select nothing.
pub fn active_band(bands: &[SectionBand], offset: f64) -> Option<usize> {
    bands.iter().position(|band| band.contains(offset))
}

/// In-page fragment a link points at, or `None` when it leaves the document.
pub fn fragment_target(page_url: &str, href: &str) -> Option<String> {
    let page = Url::parse(page_url).ok()?;
    let target = page.join(href).ok()?;
    let fragment = target.fragment().filter(|value| !value.is_empty())?.to_string();

    let mut page_document = page;
    page_document.set_fragment(None);
    let mut target_document = target;
    target_document.set_fragment(None);

    (page_document == target_document).then_some(fragment)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub node: NodeId,
    pub id: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NavLink {
    pub node: NodeId,
    pub target: String,
}

/// Marks the link of the current section and clears every other link.
pub fn sync_active_link(dom: &dyn Dom, sections: &[Section], links: &[NavLink], lead: f64) -> Option<usize> {
    let bands: Vec<SectionBand> = sections
        .iter()
        .map(|section| SectionBand::from_layout(dom.layout_box(section.node), lead))
        .collect();
    let active = active_band(&bands, dom.viewport().scroll_y);
    let active_id = active.map(|index| sections[index].id.as_str());

    for link in links {
        set_class(dom, link.node, ACTIVE_CLASS, Some(link.target.as_str()) == active_id);
    }

    active
}

pub struct ActiveNav {
    scrolls: Throttle<()>,
}

impl ActiveNav {
    pub fn new(host: &Host, sections: Vec<Section>, links: Vec<NavLink>, lead: f64, throttle_ms: u32) -> Self {
        let dom = Rc::clone(&host.dom);
        let scrolls = Throttle::new(Rc::clone(&host.scheduler), throttle_ms, move |()| {
            sync_active_link(dom.as_ref(), &sections, &links, lead);
        });

        Self { scrolls }
    }

    pub fn on_scroll(&self) {
        self.scrolls.call(());
    }
}

pub struct NavbarShrink {
    frames: FrameCoalescer<()>,
}

impl NavbarShrink {
    pub fn new(host: &Host, navbar: NodeId, threshold: f64) -> Self {
        let dom = Rc::clone(&host.dom);
        let frames = FrameCoalescer::new(Rc::clone(&host.scheduler), move |()| {
            let scrolled = dom.viewport().scroll_y > threshold;
            set_class(dom.as_ref(), navbar, SCROLLED_CLASS, scrolled);
        });

        Self { frames }
    }

    pub fn on_scroll(&self) {
        self.frames.schedule(());
    }
}

struct MenuParts {
    dom: Rc<dyn Dom>,
    button: NodeId,
    menu: NodeId,
    breakpoint: f64,
}

impl MenuParts {
    fn is_open(&self) -> bool {
        self.dom.has_class(self.menu, OPEN_CLASS)
    }

    fn apply(&self, open: bool) {
        let dom = self.dom.as_ref();
        set_class(dom, self.button, OPEN_CLASS, open);
        set_class(dom, self.menu, OPEN_CLASS, open);
        dom.set_attribute(self.button, "aria-expanded", if open { "true" } else { "false" });

        let Some(body) = dom.body() else {
            return;
        };
        if !open {
            dom.set_style(body, "overflow", "");
        } else if dom.viewport().width <= self.breakpoint {
            dom.set_style(body, "overflow", "hidden");
        }
    }

    fn close(&self) {
        if self.is_open() {
            self.apply(false);
        }
    }
}

/// Hamburger menu. Sole owner of the `open` state of the button and the list.
pub struct MobileMenu {
    parts: Rc<MenuParts>,
    resizes: Debounce<()>,
}

impl MobileMenu {
    pub fn new(host: &Host, button: NodeId, menu: NodeId, breakpoint: f64, resize_debounce_ms: u32) -> Self {
        let parts = Rc::new(MenuParts {
            dom: Rc::clone(&host.dom),
            button,
            menu,
            breakpoint,
        });
        let resizes = {
            let parts = Rc::clone(&parts);
            Debounce::new(Rc::clone(&host.scheduler), resize_debounce_ms, move |()| {
                if parts.dom.viewport().width > parts.breakpoint {
                    parts.close();
                }
            })
        };

        Self { parts, resizes }
    }

    pub fn is_open(&self) -> bool {
        self.parts.is_open()
    }

    pub fn toggle(&self) {
        self.parts.apply(!self.parts.is_open());
    }

    pub fn close(&self) {
        self.parts.close();
    }

    /// Document level key handling.
    pub fn on_key(&self, key: &str) {
        if key == "Escape" {
            self.close();
        }
    }

    /// Keyboard activation of the menu button. Returns whether the key was
    /// consumed.
    pub fn on_button_key(&self, key: &str) -> bool {
        if key == "Enter" || key == " " {
            self.toggle();
            true
        } else {
            false
        }
    }

    pub fn on_resize(&self) {
        self.resizes.call(());
    }
}

pub fn scroll_target(section_top: f64, navbar_height: f64) -> f64 {
    section_top - navbar_height
}

/// Animated jumps to in-page sections that clear the fixed navbar.
pub struct SmoothScroll {
    dom: Rc<dyn Dom>,
    navbar: Option<NodeId>,
    fallback_navbar_height: f64,
    smooth: bool,
    menu: Option<Rc<MobileMenu>>,
}

impl SmoothScroll {
    pub fn new(
        host: &Host,
        navbar: Option<NodeId>,
        fallback_navbar_height: f64,
        menu: Option<Rc<MobileMenu>>,
    ) -> Self {
        Self {
            dom: Rc::clone(&host.dom),
            navbar,
            fallback_navbar_height,
            smooth: !host.reduced_motion,
            menu,
        }
    }

    /// Returns `false` when no element carries `target_id`, leaving the click
    /// to the browser.
    pub fn on_link_click(&self, target_id: &str) -> bool {
        let Some(section) = self.dom.element_by_id(target_id) else {
            return false;
        };

        let navbar_height = self
            .navbar
            .map(|navbar| self.dom.layout_box(navbar).height)
            .unwrap_or(self.fallback_navbar_height);
        let top = scroll_target(self.dom.layout_box(section).top, navbar_height);
        self.dom.scroll_to(top, self.smooth);

        if let Some(menu) = &self.menu {
            menu.close();
        }
        true
    }
}
