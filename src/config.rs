use crate::telemetry::{LogLevel, DEFAULT_LOG_LEVEL};
use serde::Deserialize;

pub const CONFIG_ELEMENT_ID: &str = "site-config";

const DEFAULT_NAV_THROTTLE_MS: u32 = 100;
const DEFAULT_SECTION_OFFSET_PX: f64 = 150.0;
const DEFAULT_NAVBAR_FALLBACK_HEIGHT_PX: f64 = 80.0;
const DEFAULT_NAVBAR_SHRINK_OFFSET_PX: f64 = 100.0;
const DEFAULT_MOBILE_BREAKPOINT_PX: f64 = 768.0;
const DEFAULT_RESIZE_DEBOUNCE_MS: u32 = 250;
const DEFAULT_REVEAL_THRESHOLD: f64 = 0.1;
const DEFAULT_REVEAL_ROOT_MARGIN: &str = "0px 0px -80px 0px";
const DEFAULT_POINTER_THROTTLE_MS: u32 = 50;
const DEFAULT_ROTATION_PERIOD_MS: u32 = 4_000;
const DEFAULT_ROTATION_THRESHOLD: f64 = 0.1;
const DEFAULT_PARALLAX_STRENGTH_PX: f64 = 20.0;
const DEFAULT_TILT_DIVISOR: f64 = 25.0;
const DEFAULT_VIDEO_THRESHOLD: f64 = 0.2;
const DEFAULT_NEWSLETTER_RESET_MS: u32 = 3_000;
const DEFAULT_RIPPLE_LIFETIME_MS: u32 = 600;
const DEFAULT_HERO_STAGGER_MS: u32 = 100;
const DEFAULT_HERO_DELAY_MS: u32 = 200;

const NAV_THROTTLE_MS_BOUNDS: (u32, u32) = (0, 1_000);
const SECTION_OFFSET_PX_BOUNDS: (f64, f64) = (0.0, 1_000.0);
const NAVBAR_FALLBACK_HEIGHT_PX_BOUNDS: (f64, f64) = (0.0, 400.0);
const NAVBAR_SHRINK_OFFSET_PX_BOUNDS: (f64, f64) = (0.0, 2_000.0);
const MOBILE_BREAKPOINT_PX_BOUNDS: (f64, f64) = (320.0, 2_000.0);
const RESIZE_DEBOUNCE_MS_BOUNDS: (u32, u32) = (0, 2_000);
const THRESHOLD_BOUNDS: (f64, f64) = (0.0, 1.0);
const POINTER_THROTTLE_MS_BOUNDS: (u32, u32) = (0, 500);
const ROTATION_PERIOD_MS_BOUNDS: (u32, u32) = (500, 60_000);
const PARALLAX_STRENGTH_PX_BOUNDS: (f64, f64) = (0.0, 200.0);
const TILT_DIVISOR_BOUNDS: (f64, f64) = (1.0, 200.0);
const NEWSLETTER_RESET_MS_BOUNDS: (u32, u32) = (500, 30_000);
const RIPPLE_LIFETIME_MS_BOUNDS: (u32, u32) = (100, 5_000);
const HERO_STAGGER_MS_BOUNDS: (u32, u32) = (0, 2_000);
const HERO_DELAY_MS_BOUNDS: (u32, u32) = (0, 5_000);

/// Tunables, every one optional in the page's JSON block.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSiteConfig {
    nav_throttle_ms: Option<u32>,
    section_offset_px: Option<f64>,
    navbar_fallback_height_px: Option<f64>,
    navbar_shrink_offset_px: Option<f64>,
    mobile_breakpoint_px: Option<f64>,
    resize_debounce_ms: Option<u32>,
    reveal_threshold: Option<f64>,
    reveal_root_margin: Option<String>,
    pointer_throttle_ms: Option<u32>,
    rotation_period_ms: Option<u32>,
    rotation_threshold: Option<f64>,
    parallax_strength_px: Option<f64>,
    tilt_divisor: Option<f64>,
    video_threshold: Option<f64>,
    newsletter_reset_ms: Option<u32>,
    ripple_lifetime_ms: Option<u32>,
    hero_stagger_ms: Option<u32>,
    hero_delay_ms: Option<u32>,
    log_level: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub nav_throttle_ms: u32,
    pub section_offset_px: f64,
    pub navbar_fallback_height_px: f64,
    pub navbar_shrink_offset_px: f64,
    pub mobile_breakpoint_px: f64,
    pub resize_debounce_ms: u32,
    pub reveal_threshold: f64,
    pub reveal_root_margin: String,
    pub pointer_throttle_ms: u32,
    pub rotation_period_ms: u32,
    pub rotation_threshold: f64,
    pub parallax_strength_px: f64,
    pub tilt_divisor: f64,
    pub video_threshold: f64,
    pub newsletter_reset_ms: u32,
    pub ripple_lifetime_ms: u32,
    pub hero_stagger_ms: u32,
    pub hero_delay_ms: u32,
    pub log_level: LogLevel,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::from_raw(RawSiteConfig::default())
    }
}

impl SiteConfig {
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        let raw: RawSiteConfig = serde_json::from_str(source)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawSiteConfig) -> Self {
        Self {
            nav_throttle_ms: bounded_u32(raw.nav_throttle_ms, DEFAULT_NAV_THROTTLE_MS, NAV_THROTTLE_MS_BOUNDS),
            section_offset_px: bounded_f64(
                raw.section_offset_px,
                DEFAULT_SECTION_OFFSET_PX,
                SECTION_OFFSET_PX_BOUNDS,
            ),
            navbar_fallback_height_px: bounded_f64(
                raw.navbar_fallback_height_px,
                DEFAULT_NAVBAR_FALLBACK_HEIGHT_PX,
                NAVBAR_FALLBACK_HEIGHT_PX_BOUNDS,
            ),
            navbar_shrink_offset_px: bounded_f64(
                raw.navbar_shrink_offset_px,
                DEFAULT_NAVBAR_SHRINK_OFFSET_PX,
                NAVBAR_SHRINK_OFFSET_PX_BOUNDS,
            ),
            mobile_breakpoint_px: bounded_f64(
                raw.mobile_breakpoint_px,
                DEFAULT_MOBILE_BREAKPOINT_PX,
                MOBILE_BREAKPOINT_PX_BOUNDS,
            ),
            resize_debounce_ms: bounded_u32(
                raw.resize_debounce_ms,
                DEFAULT_RESIZE_DEBOUNCE_MS,
                RESIZE_DEBOUNCE_MS_BOUNDS,
            ),
            reveal_threshold: bounded_f64(raw.reveal_threshold, DEFAULT_REVEAL_THRESHOLD, THRESHOLD_BOUNDS),
            reveal_root_margin: raw
                .reveal_root_margin
                .map(|value| value.trim().to_string())
                .filter(|value| is_valid_root_margin(value))
                .unwrap_or_else(|| DEFAULT_REVEAL_ROOT_MARGIN.to_string()),
            pointer_throttle_ms: bounded_u32(
                raw.pointer_throttle_ms,
                DEFAULT_POINTER_THROTTLE_MS,
                POINTER_THROTTLE_MS_BOUNDS,
            ),
            rotation_period_ms: bounded_u32(
                raw.rotation_period_ms,
                DEFAULT_ROTATION_PERIOD_MS,
                ROTATION_PERIOD_MS_BOUNDS,
            ),
            rotation_threshold: bounded_f64(
                raw.rotation_threshold,
                DEFAULT_ROTATION_THRESHOLD,
                THRESHOLD_BOUNDS,
            ),
            parallax_strength_px: bounded_f64(
                raw.parallax_strength_px,
                DEFAULT_PARALLAX_STRENGTH_PX,
                PARALLAX_STRENGTH_PX_BOUNDS,
            ),
            tilt_divisor: bounded_f64(raw.tilt_divisor, DEFAULT_TILT_DIVISOR, TILT_DIVISOR_BOUNDS),
            video_threshold: bounded_f64(raw.video_threshold, DEFAULT_VIDEO_THRESHOLD, THRESHOLD_BOUNDS),
            newsletter_reset_ms: bounded_u32(
                raw.newsletter_reset_ms,
                DEFAULT_NEWSLETTER_RESET_MS,
                NEWSLETTER_RESET_MS_BOUNDS,
            ),
            ripple_lifetime_ms: bounded_u32(
                raw.ripple_lifetime_ms,
                DEFAULT_RIPPLE_LIFETIME_MS,
                RIPPLE_LIFETIME_MS_BOUNDS,
            ),
            hero_stagger_ms: bounded_u32(raw.hero_stagger_ms, DEFAULT_HERO_STAGGER_MS, HERO_STAGGER_MS_BOUNDS),
            hero_delay_ms: bounded_u32(raw.hero_delay_ms, DEFAULT_HERO_DELAY_MS, HERO_DELAY_MS_BOUNDS),
            log_level: raw
                .log_level
                .as_deref()
                .and_then(LogLevel::parse)
                .unwrap_or(DEFAULT_LOG_LEVEL),
        }
    }
}

fn bounded_u32(value: Option<u32>, default: u32, bounds: (u32, u32)) -> u32 {
    value
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn bounded_f64(value: Option<f64>, default: f64, bounds: (f64, f64)) -> f64 {
    value
        .filter(|value| value.is_finite() && (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

/// One to four space separated `px` or `%` lengths, as the observer accepts.
fn is_valid_root_margin(value: &str) -> bool {
    let parts: Vec<&str> = value.split_whitespace().collect();
    (1..=4).contains(&parts.len())
        && parts.iter().all(|part| {
            let number = part
                .strip_suffix("px")
                .or_else(|| part.strip_suffix('%'))
                .unwrap_or(part);
            number.parse::<f64>().is_ok() && (part.ends_with("px") || part.ends_with('%') || *part == "0")
        })
}
