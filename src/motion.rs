//! Scroll and pointer driven transforms.
//!
//! Every controller here reads geometry and writes styles inside a single
//! frame callback, and does nothing at all when reduced motion is preferred.

use crate::{
    host::{set_class, Dom, Host, NodeId, Pointer, Rect},
    rate_limit::{FrameCoalescer, Throttle},
};
use std::{cell::Cell, rc::Rc};

pub const ACTIVE_CLASS: &str = "active";

/// Vertical shift for a background inside `section`, or `None` while the
/// section is outside the viewport.
pub fn parallax_offset(scroll_y: f64, section: Rect, viewport_height: f64, strength: f64) -> Option<f64> {
    let visible = scroll_y > section.top - viewport_height && scroll_y < section.top + section.height;
    let span = section.height + viewport_height;
    if !visible || span <= 0.0 {
        return None;
    }

    Some((scroll_y - section.top + viewport_height) / span * strength)
}

pub fn parallax_transform(offset: f64) -> String {
    format!("scale(1.05) translateY({offset:.2}px)")
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TiltAngles {
    pub rotate_x: f64,
    pub rotate_y: f64,
}

pub fn pointer_origin(pointer: Pointer, rect: Rect) -> (f64, f64) {
    (pointer.client_x - rect.left, pointer.client_y - rect.top)
}

pub fn tilt_angles(pointer: Pointer, rect: Rect, divisor: f64) -> TiltAngles {
    let (x, y) = pointer_origin(pointer, rect);
    let center_x = rect.width / 2.0;
    let center_y = rect.height / 2.0;

    TiltAngles {
        rotate_x: (y - center_y) / divisor,
        rotate_y: (center_x - x) / divisor,
    }
}

pub fn tilt_transform(angles: TiltAngles) -> String {
    format!(
        "perspective(1000px) rotateX({:.2}deg) rotateY({:.2}deg) translateY(-8px)",
        angles.rotate_x, angles.rotate_y
    )
}

/// Background video drifting with the scroll position of its section.
pub struct Parallax {
    frames: Option<FrameCoalescer<()>>,
}

impl Parallax {
    pub fn new(host: &Host, section: NodeId, target: NodeId, strength: f64) -> Self {
        if host.reduced_motion {
            return Self { frames: None };
        }

        let dom = Rc::clone(&host.dom);
        let frames = FrameCoalescer::new(Rc::clone(&host.scheduler), move |()| {
            let viewport = dom.viewport();
            let section_box = dom.layout_box(section);
            if let Some(offset) =
                parallax_offset(viewport.scroll_y, section_box, viewport.height, strength)
            {
                dom.set_style(target, "transform", &parallax_transform(offset));
            }
        });

        Self {
            frames: Some(frames),
        }
    }

    pub fn on_scroll(&self) {
        if let Some(frames) = &self.frames {
            frames.schedule(());
        }
    }
}

/// 3D tilt of a card following the pointer.
pub struct Tilt {
    dom: Rc<dyn Dom>,
    card: NodeId,
    hovering: Rc<Cell<bool>>,
    frames: Option<FrameCoalescer<Pointer>>,
}

impl Tilt {
    pub fn new(host: &Host, card: NodeId, divisor: f64) -> Self {
        let hovering = Rc::new(Cell::new(false));
        let frames = (!host.reduced_motion).then(|| {
            let dom = Rc::clone(&host.dom);
            let hovering = Rc::clone(&hovering);
            FrameCoalescer::new(Rc::clone(&host.scheduler), move |pointer: Pointer| {
                if !hovering.get() {
                    return;
                }
                let angles = tilt_angles(pointer, dom.bounding_rect(card), divisor);
                dom.set_style(card, "transform", &tilt_transform(angles));
            })
        });

        Self {
            dom: Rc::clone(&host.dom),
            card,
            hovering,
            frames,
        }
    }

    pub fn on_pointer_move(&self, pointer: Pointer) {
        if let Some(frames) = &self.frames {
            self.hovering.set(true);
            frames.schedule(pointer);
        }
    }

    pub fn on_pointer_leave(&self) {
        if self.frames.is_none() {
            return;
        }
        self.hovering.set(false);
        self.dom.set_style(self.card, "transform", "");
    }
}

/// Gradient origin of the hero overlay following the pointer.
pub struct PointerGlow {
    dom: Rc<dyn Dom>,
    overlay: NodeId,
    moves: Option<Throttle<Pointer>>,
}

impl PointerGlow {
    pub fn new(host: &Host, hero: NodeId, overlay: NodeId, throttle_ms: u32) -> Self {
        let moves = (!host.reduced_motion).then(|| {
            let dom = Rc::clone(&host.dom);
            let frames = FrameCoalescer::new(Rc::clone(&host.scheduler), move |pointer: Pointer| {
                let (x, y) = pointer_origin(pointer, dom.bounding_rect(hero));
                dom.set_style(overlay, "--mouse-x", &format!("{x:.2}px"));
                dom.set_style(overlay, "--mouse-y", &format!("{y:.2}px"));
            });
            Throttle::new(Rc::clone(&host.scheduler), throttle_ms, move |pointer| {
                frames.schedule(pointer)
            })
        });

        Self {
            dom: Rc::clone(&host.dom),
            overlay,
            moves,
        }
    }

    pub fn on_pointer_move(&self, pointer: Pointer) {
        if let Some(moves) = &self.moves {
            moves.call(pointer);
        }
    }

    pub fn on_pointer_enter(&self) {
        if self.moves.is_some() {
            set_class(self.dom.as_ref(), self.overlay, ACTIVE_CLASS, true);
        }
    }

    pub fn on_pointer_leave(&self) {
        if self.moves.is_some() {
            set_class(self.dom.as_ref(), self.overlay, ACTIVE_CLASS, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        host::Viewport,
        testing::{Harness, MutationKind},
    };

    #[test]
    fn parallax_offset_tracks_relative_scroll() {
        let section = Rect::new(0.0, 2_000.0, 1_280.0, 600.0);

        assert_eq!(parallax_offset(1_000.0, section, 800.0, 20.0), None);
        assert_eq!(parallax_offset(2_600.0, section, 800.0, 20.0), None);

        let entering = parallax_offset(1_300.0, section, 800.0, 20.0).expect("in view");
        assert!((entering - 20.0 * 100.0 / 1_400.0).abs() < 1e-9);

        let leaving = parallax_offset(2_500.0, section, 800.0, 20.0).expect("in view");
        assert!((leaving - 20.0 * 1_300.0 / 1_400.0).abs() < 1e-9);
        assert_eq!(parallax_transform(1.0), "scale(1.05) translateY(1.00px)");
    }

    #[test]
    fn tilt_angles_rotate_toward_pointer() {
        let rect = Rect::new(100.0, 50.0, 200.0, 100.0);
        let angles = tilt_angles(Pointer::new(250.0, 75.0), rect, 25.0);

        assert_eq!(angles, TiltAngles { rotate_x: -1.0, rotate_y: -2.0 });
        assert_eq!(
            tilt_transform(angles),
            "perspective(1000px) rotateX(-1.00deg) rotateY(-2.00deg) translateY(-8px)"
        );
    }

    #[test]
    fn reduced_motion_produces_no_mutations() {
        let harness = Harness::new();
        let host = harness.host_with_motion(true);
        let [section, video, card, hero, overlay] = [0; 5].map(|_| harness.dom.add_node("div"));
        harness.dom.seed_layout(section, Rect::new(0.0, 1_000.0, 1_280.0, 600.0));

        let parallax = Parallax::new(&host, section, video, 20.0);
        let tilt = Tilt::new(&host, card, 25.0);
        let glow = PointerGlow::new(&host, hero, overlay, 50);

        for step in 0..50_i32 {
            harness.dom.set_scroll_y(800.0 + f64::from(step) * 10.0);
            parallax.on_scroll();
            tilt.on_pointer_move(Pointer::new(f64::from(step), 10.0));
            glow.on_pointer_enter();
            glow.on_pointer_move(Pointer::new(f64::from(step), 10.0));
            harness.scheduler.run_frame();
            harness.scheduler.advance(16);
        }
        tilt.on_pointer_leave();
        glow.on_pointer_leave();

        assert!(harness.dom.mutations().is_empty());
        assert_eq!(harness.scheduler.frame_requests(), 0);
    }

    #[test]
    fn parallax_writes_once_per_frame() {
        let harness = Harness::new();
        let host = harness.host();
        let section = harness.dom.add_node("section");
        let video = harness.dom.add_node("video");
        harness.dom.seed_layout(section, Rect::new(0.0, 1_000.0, 1_280.0, 600.0));
        harness.dom.set_viewport(Viewport {
            scroll_y: 500.0,
            width: 1_280.0,
            height: 800.0,
        });

        let parallax = Parallax::new(&host, section, video, 20.0);
        for _ in 0..10 {
            parallax.on_scroll();
        }
        harness.dom.set_scroll_y(900.0);
        harness.scheduler.run_frame();

        assert_eq!(harness.dom.mutations().len(), 1);
        // (900 - 1000 + 800) / 1400 * 20
        assert_eq!(
            harness.dom.style(video, "transform").as_deref(),
            Some("scale(1.05) translateY(10.00px)")
        );
    }

    #[test]
    fn tilt_leave_wins_over_pending_frame() {
        let harness = Harness::new();
        let host = harness.host();
        let card = harness.dom.add_node("article");
        harness.dom.seed_rect(card, Rect::new(0.0, 0.0, 200.0, 100.0));
        let tilt = Tilt::new(&host, card, 25.0);

        tilt.on_pointer_move(Pointer::new(150.0, 25.0));
        harness.scheduler.run_frame();
        assert!(harness.dom.style(card, "transform").is_some());

        tilt.on_pointer_move(Pointer::new(10.0, 10.0));
        tilt.on_pointer_leave();
        harness.scheduler.run_frame();
        assert_eq!(harness.dom.style(card, "transform"), None);
    }

    #[test]
    fn pointer_glow_throttles_then_coalesces() {
        let harness = Harness::new();
        let host = harness.host();
        let hero = harness.dom.add_node("section");
        let overlay = harness.dom.add_node("div");
        harness.dom.seed_rect(hero, Rect::new(0.0, 64.0, 1_280.0, 720.0));
        let glow = PointerGlow::new(&host, hero, overlay, 50);

        glow.on_pointer_enter();
        glow.on_pointer_enter();
        for x in 0..10_i32 {
            glow.on_pointer_move(Pointer::new(f64::from(x) * 10.0, 100.0));
            harness.scheduler.advance(10);
        }
        harness.scheduler.run_frame();

        assert_eq!(harness.dom.classes(overlay), vec!["active".to_string()]);
        let style_writes = harness
            .dom
            .mutations()
            .into_iter()
            .filter(|entry| matches!(entry.kind, MutationKind::Style(_)))
            .count();
        // moves at t=0 and t=50 pass the throttle and share one frame
        assert_eq!(style_writes, 2);
        assert_eq!(harness.dom.style(overlay, "--mouse-x").as_deref(), Some("50.00px"));
        assert_eq!(harness.dom.style(overlay, "--mouse-y").as_deref(), Some("36.00px"));

        glow.on_pointer_leave();
        assert!(harness.dom.classes(overlay).is_empty());
    }
}
