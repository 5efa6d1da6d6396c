//! Marker gestures - pointer input on the timeline strip turned into actions.
//!
//! Pure state machine, no egui types: the renderer (timeline_ui.rs) hit-tests
//! markers and feeds [`PointerInput`]s, the editor applies the resulting
//! [`GestureAction`]s. Keeping it UI-free makes drag/seek ordering testable.
//!
//! # Gesture rules
//!
//! - Click on empty strip -> seek, unless a drag session is active.
//! - Press on a marker -> select + start a drag session. The press belongs to
//!   the marker: the strip click that follows the release is swallowed.
//! - Move while dragging -> `Move { id, time }` on every new sample (local only,
//!   the editor debounces persistence).
//! - Release / pointer leaving the strip -> session ends, nothing extra is sent.
//! - Double-click on a marker -> edit.

use super::Viewport;
use crate::entities::{Interaction, InteractionId, InteractionList};

/// Hit radius around a marker center, in pixels.
pub const MARKER_HIT_RADIUS_PX: f64 = 6.0;

/// Transient drag state, alive between marker press and release/leave.
#[derive(Clone, Debug, PartialEq)]
pub struct DragSession {
    pub interaction_id: InteractionId,
    /// Trigger time when the press happened.
    pub origin_time: f64,
    /// Latest time sent to the move callback.
    pub last_time: f64,
}

impl DragSession {
    pub fn moved(&self) -> bool {
        self.last_time != self.origin_time
    }
}

/// Raw pointer input, already hit-tested by the renderer.
/// `x` is the pointer offset from the strip's left edge in pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerInput {
    MarkerEnter { id: InteractionId },
    MarkerExit { id: InteractionId },
    /// Press on a marker whose current trigger time is `time`.
    MarkerDown { id: InteractionId, time: f64 },
    MarkerDoubleClick { id: InteractionId },
    Move { x: f64 },
    Up,
    Leave,
    StripClick { x: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum GestureAction {
    Hover(Option<InteractionId>),
    Select(InteractionId),
    Seek(f64),
    DragStarted { id: InteractionId, origin: f64 },
    Move { id: InteractionId, time: f64 },
    DragEnded { id: InteractionId, from: f64, to: f64 },
    Edit(InteractionId),
}

#[derive(Clone, Debug, Default)]
pub struct MarkerGestures {
    drag: Option<DragSession>,
    /// The current press started on a marker; its trailing click is not a seek.
    swallow_click: bool,
}

impl MarkerGestures {
    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Drop the session without emitting anything (editor unmount, delete).
    pub fn cancel(&mut self) {
        self.drag = None;
        self.swallow_click = false;
    }

    /// Feed one pointer input. `width` is the strip width in pixels.
    pub fn handle(
        &mut self,
        input: PointerInput,
        viewport: &Viewport,
        width: f64,
    ) -> Vec<GestureAction> {
        let mut out = Vec::new();
        match input {
            PointerInput::MarkerEnter { id } => {
                if self.drag.is_none() {
                    out.push(GestureAction::Hover(Some(id)));
                }
            }
            PointerInput::MarkerExit { .. } => {
                if self.drag.is_none() {
                    out.push(GestureAction::Hover(None));
                }
            }
            PointerInput::MarkerDown { id, time } => {
                log::trace!("Drag start on {} at {:.2}s", id, time);
                self.drag = Some(DragSession {
                    interaction_id: id.clone(),
                    origin_time: time,
                    last_time: time,
                });
                self.swallow_click = true;
                out.push(GestureAction::Select(id.clone()));
                out.push(GestureAction::DragStarted { id, origin: time });
            }
            PointerInput::Move { x } => match self.drag.as_mut() {
                Some(session) => {
                    let t = viewport.pixel_to_time(x, width);
                    if t != session.last_time {
                        session.last_time = t;
                        out.push(GestureAction::Move {
                            id: session.interaction_id.clone(),
                            time: t,
                        });
                    }
                }
                None => {
                    // Pointer travelled after release: the marker press is over
                    self.swallow_click = false;
                }
            },
            PointerInput::Up | PointerInput::Leave => {
                if let Some(session) = self.drag.take() {
                    log::trace!(
                        "Drag end on {}: {:.2}s -> {:.2}s",
                        session.interaction_id,
                        session.origin_time,
                        session.last_time
                    );
                    if session.moved() {
                        out.push(GestureAction::DragEnded {
                            id: session.interaction_id,
                            from: session.origin_time,
                            to: session.last_time,
                        });
                    }
                }
            }
            PointerInput::StripClick { x } => {
                if self.drag.is_some() {
                    // Mid-drag click, ignore
                } else if self.swallow_click {
                    self.swallow_click = false;
                } else if !viewport.is_degenerate() {
                    out.push(GestureAction::Seek(viewport.pixel_to_time(x, width)));
                }
            }
            PointerInput::MarkerDoubleClick { id } => {
                self.drag = None;
                self.swallow_click = false;
                out.push(GestureAction::Edit(id));
            }
        }
        out
    }
}

/// Trigger time for "add interaction here" at the playhead (whole seconds).
pub fn add_at_playhead(current_time: f64) -> f64 {
    if current_time.is_finite() {
        current_time.max(0.0).floor()
    } else {
        0.0
    }
}

/// Markers inside the visible window; everything else is not drawn.
pub fn visible_markers<'a>(
    list: &'a InteractionList,
    viewport: &Viewport,
) -> impl Iterator<Item = &'a Interaction> {
    list.in_range(viewport.viewport_start(), viewport.viewport_end())
}

/// Nearest visible persisted marker within `radius` pixels of `x`.
pub fn marker_at(
    list: &InteractionList,
    viewport: &Viewport,
    x: f64,
    width: f64,
    radius: f64,
) -> Option<InteractionId> {
    visible_markers(list, viewport)
        .filter_map(|i| {
            let id = i.id.as_ref()?;
            let dx = (viewport.time_to_pixel(i.trigger_time, width) - x).abs();
            (dx <= radius).then_some((dx, id))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, id)| id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{InteractionConfig, InteractionKind};

    fn id(s: &str) -> InteractionId {
        s.into()
    }

    fn list() -> InteractionList {
        let mk = |s: &str, t: f64| {
            let mut i = Interaction::draft(InteractionConfig::default_for(InteractionKind::Tip), t, s);
            i.id = Some(s.into());
            i
        };
        InteractionList::from_unsorted(vec![mk("a", 10.0), mk("b", 100.0), mk("c", 400.0)])
    }

    #[test]
    fn test_strip_click_seeks() {
        let vp = Viewport::new(600.0);
        let mut g = MarkerGestures::default();
        let actions = g.handle(PointerInput::StripClick { x: 500.0 }, &vp, 1000.0);
        assert_eq!(actions, vec![GestureAction::Seek(300.0)]);
    }

    #[test]
    fn test_drag_emits_moves_and_no_seek() {
        let vp = Viewport::new(600.0);
        let mut g = MarkerGestures::default();

        let a = g.handle(PointerInput::MarkerDown { id: id("a"), time: 10.0 }, &vp, 600.0);
        assert_eq!(a[0], GestureAction::Select(id("a")));
        assert!(g.is_dragging());

        let a = g.handle(PointerInput::Move { x: 12.0 }, &vp, 600.0);
        assert_eq!(a, vec![GestureAction::Move { id: id("a"), time: 12.0 }]);
        // Same sample twice -> nothing new
        assert!(g.handle(PointerInput::Move { x: 12.0 }, &vp, 600.0).is_empty());
        g.handle(PointerInput::Move { x: 15.0 }, &vp, 600.0);

        // Click while dragging is ignored
        assert!(g.handle(PointerInput::StripClick { x: 300.0 }, &vp, 600.0).is_empty());

        let a = g.handle(PointerInput::Up, &vp, 600.0);
        assert_eq!(a, vec![GestureAction::DragEnded { id: id("a"), from: 10.0, to: 15.0 }]);
        assert!(!g.is_dragging());

        // The click trailing the marker press does not seek
        assert!(g.handle(PointerInput::StripClick { x: 15.0 }, &vp, 600.0).is_empty());
        // The next real click does
        assert_eq!(
            g.handle(PointerInput::StripClick { x: 150.0 }, &vp, 600.0),
            vec![GestureAction::Seek(150.0)]
        );
    }

    #[test]
    fn test_move_clamps_to_video() {
        let vp = Viewport::new(600.0);
        let mut g = MarkerGestures::default();
        g.handle(PointerInput::MarkerDown { id: id("c"), time: 400.0 }, &vp, 600.0);
        let a = g.handle(PointerInput::Move { x: 9000.0 }, &vp, 600.0);
        assert_eq!(a, vec![GestureAction::Move { id: id("c"), time: 600.0 }]);
        let a = g.handle(PointerInput::Move { x: -20.0 }, &vp, 600.0);
        assert_eq!(a, vec![GestureAction::Move { id: id("c"), time: 0.0 }]);
    }

    #[test]
    fn test_leave_ends_session_without_move() {
        let vp = Viewport::new(600.0);
        let mut g = MarkerGestures::default();
        g.handle(PointerInput::MarkerDown { id: id("b"), time: 100.0 }, &vp, 600.0);
        assert!(g.handle(PointerInput::Leave, &vp, 600.0).is_empty());
        assert!(!g.is_dragging());
    }

    #[test]
    fn test_double_click_edits() {
        let vp = Viewport::new(600.0);
        let mut g = MarkerGestures::default();
        g.handle(PointerInput::MarkerDown { id: id("b"), time: 100.0 }, &vp, 600.0);
        g.handle(PointerInput::Up, &vp, 600.0);
        let a = g.handle(PointerInput::MarkerDoubleClick { id: id("b") }, &vp, 600.0);
        assert_eq!(a, vec![GestureAction::Edit(id("b"))]);
    }

    #[test]
    fn test_hover_suppressed_while_dragging() {
        let vp = Viewport::new(600.0);
        let mut g = MarkerGestures::default();
        assert_eq!(
            g.handle(PointerInput::MarkerEnter { id: id("a") }, &vp, 600.0),
            vec![GestureAction::Hover(Some(id("a")))]
        );
        g.handle(PointerInput::MarkerDown { id: id("a"), time: 10.0 }, &vp, 600.0);
        assert!(g.handle(PointerInput::MarkerEnter { id: id("b") }, &vp, 600.0).is_empty());
    }

    #[test]
    fn test_add_at_playhead_floors() {
        assert_eq!(add_at_playhead(42.9), 42.0);
        assert_eq!(add_at_playhead(-1.0), 0.0);
        assert_eq!(add_at_playhead(f64::NAN), 0.0);
    }

    #[test]
    fn test_visible_markers_follow_viewport() {
        let l = list();
        let mut vp = Viewport::new(600.0);
        assert_eq!(visible_markers(&l, &vp).count(), 3);
        vp.set_zoom(10.0, 100.0); // 70..130
        let ids: Vec<_> = visible_markers(&l, &vp).map(|i| i.title.clone()).collect();
        assert_eq!(ids, vec!["b"]);
        assert_eq!(l.len(), 3);
    }

    #[test]
    fn test_marker_hit_test() {
        let l = list();
        let vp = Viewport::new(600.0);
        assert_eq!(marker_at(&l, &vp, 104.0, 600.0, MARKER_HIT_RADIUS_PX), Some(id("b")));
        assert_eq!(marker_at(&l, &vp, 200.0, 600.0, MARKER_HIT_RADIUS_PX), None);
    }
}
