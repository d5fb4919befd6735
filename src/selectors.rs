//! Where each controller finds its elements, and what it may change on them.

pub const NAV_LINKS: &str = r##"nav ul li a[href^="#"]"##;
pub const SECTIONS: &str = "section[id]";
pub const NAVBAR_ID: &str = "navbar";
pub const MENU_BUTTON: &str = ".mobile-menu";
pub const MENU: &str = "nav ul";
pub const REVEAL_TARGETS: &str = "section:not(#hero) .fade-in, section:not(#hero) .fade-up, \
     section:not(#hero) .fade-left, section:not(#hero) .fade-right";
pub const HERO_ID: &str = "hero";
pub const HERO_INTRO: &str = "#hero .fade-up, #hero .fade-in";
pub const MESH_OVERLAY: &str = ".hero-mesh-overlay";
pub const IMPACT_ID: &str = "impact";
pub const IMPACT_CONTAINER: &str = ".impact-content";
pub const IMPACT_STATEMENTS: &str = ".impact-statement";
pub const IMPACT_VIDEO: &str = ".impact-background video";
pub const AUTOPLAY_VIDEOS: &str = "video[autoplay]";
pub const FEATURE_CARDS: &str = ".feature-card";
pub const PRICING_PLANS: &str = ".plan:not(.highlighted)";
pub const NEWSLETTER_FORM: &str = ".newsletter-form";
pub const NEWSLETTER_INPUT: &str = r#".newsletter-form input[type="email"]"#;
pub const NEWSLETTER_BUTTON: &str = ".newsletter-form .btn-newsletter";
pub const CTA_BUTTONS: &str = ".btn.primary";
pub const LAZY_IMAGES: &str = "img[data-src]";

/// A property of the elements matched by `selector` that only `controller`
/// writes.
#[derive(Clone, Copy, Debug)]
pub struct Claim {
    pub controller: &'static str,
    pub selector: &'static str,
    pub property: &'static str,
}

const fn claim(controller: &'static str, selector: &'static str, property: &'static str) -> Claim {
    Claim {
        controller,
        selector,
        property,
    }
}

pub const CLAIMS: &[Claim] = &[
    claim("active_nav", NAV_LINKS, "class:active"),
    claim("navbar_shrink", "#navbar", "class:scrolled"),
    claim("mobile_menu", MENU_BUTTON, "class:open"),
    claim("mobile_menu", MENU_BUTTON, "attr:aria-expanded"),
    claim("mobile_menu", MENU, "class:open"),
    claim("mobile_menu", "body", "style:overflow"),
    claim("scroll_reveal", REVEAL_TARGETS, "class:appear"),
    claim("hero_intro", HERO_INTRO, "class:appear"),
    claim("hero_intro", "body", "class:loaded"),
    claim("skip_link", "body", "children"),
    claim("pointer_glow", MESH_OVERLAY, "class:active"),
    claim("pointer_glow", MESH_OVERLAY, "style:--mouse-x"),
    claim("pointer_glow", MESH_OVERLAY, "style:--mouse-y"),
    claim("statement_carousel", IMPACT_STATEMENTS, "class:active"),
    claim("parallax", IMPACT_VIDEO, "style:transform"),
    claim("tilt", FEATURE_CARDS, "style:transform"),
    claim("pricing_hover", PRICING_PLANS, "style:opacity"),
    claim("newsletter", NEWSLETTER_BUTTON, "text"),
    claim("newsletter", NEWSLETTER_BUTTON, "style:background"),
    claim("ripple", CTA_BUTTONS, "children"),
    claim("ripple", "head", "children"),
    claim("lazy_images", LAZY_IMAGES, "attr:src"),
    claim("lazy_images", LAZY_IMAGES, "attr:data-src"),
];
