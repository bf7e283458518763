use std::time::{Duration, Instant};

use crate::document::model::TextGroupBox;
use crate::foundation::geometry::{ContainerMetrics, Point, Size, inrange};
use crate::mapper::viewport::{self, BoxGeometry};
use crate::overlay::interact::{self, Interaction, PointerTarget};

/// Minimum balloon width in viewport pixels.
pub const MIN_WIDTH: f64 = 150.0;
/// Minimum balloon height in viewport pixels.
pub const MIN_HEIGHT: f64 = 100.0;
/// Margin kept between balloons and the container edges.
pub const BOUNDARY_MARGIN: f64 = 12.0;

/// Grace period after a resize release during which container clicks do not
/// create a new balloon. Suppresses the accidental click that often follows
/// releasing a handle.
const RESIZE_GRACE: Duration = Duration::from_secs(1);

/// Stable identifier of one balloon within an editing session.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct BoxId(pub u64);

/// One editable speech balloon, in viewport space.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayBox {
    /// Session-stable identifier.
    pub id: BoxId,
    /// Left edge in viewport pixels.
    pub left: f64,
    /// Top edge in viewport pixels.
    pub top: f64,
    /// Width in viewport pixels.
    pub width: f64,
    /// Height in viewport pixels.
    pub height: f64,
    /// User-editable balloon text.
    pub text: String,
}

impl OverlayBox {
    /// Geometry fields as a plain rectangle.
    pub fn geometry(&self) -> BoxGeometry {
        BoxGeometry {
            left: self.left,
            top: self.top,
            width: self.width,
            height: self.height,
        }
    }

    fn set_geometry(&mut self, g: BoxGeometry) {
        self.left = g.left;
        self.top = g.top;
        self.width = g.width;
        self.height = g.height;
    }
}

/// Owns the ordered balloon collection and the pointer state machine.
///
/// Insertion order is z-order is rendering order; a newly created balloon is
/// always on top. All mutation happens on the interactive thread, so no two
/// pointer updates for the same balloon ever race.
pub struct OverlayEngine {
    boxes: Vec<OverlayBox>,
    next_id: u64,
    interaction: Interaction,
    add_text: bool,
    resize_grace_until: Option<Instant>,
}

impl Default for OverlayEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayEngine {
    /// Construct an empty engine with "add text" mode off.
    pub fn new() -> Self {
        Self {
            boxes: Vec::new(),
            next_id: 0,
            interaction: Interaction::Idle,
            add_text: false,
            resize_grace_until: None,
        }
    }

    /// Balloons in z-order, bottom first.
    pub fn boxes(&self) -> &[OverlayBox] {
        &self.boxes
    }

    /// Lookup one balloon by id.
    pub fn get(&self, id: BoxId) -> Option<&OverlayBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    /// Current interaction state.
    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// Whether click-to-create mode is active.
    pub fn add_text(&self) -> bool {
        self.add_text
    }

    /// Toggle click-to-create mode.
    pub fn set_add_text(&mut self, on: bool) {
        self.add_text = on;
    }

    /// Drop every balloon and reset interaction state. Used when a new file
    /// supersedes the session.
    pub fn clear(&mut self) {
        self.boxes.clear();
        self.interaction = Interaction::Idle;
        self.resize_grace_until = None;
    }

    /// Append one balloon per detected dialogue anchor, mapped into viewport
    /// space with the constant default size.
    pub fn seed_from_dialogue(
        &mut self,
        anchors: &[TextGroupBox],
        scale: f64,
        default_size: Size,
    ) {
        for anchor in anchors {
            let g = viewport::to_viewport(anchor, scale, default_size);
            let id = self.allocate_id();
            self.boxes.push(OverlayBox {
                id,
                left: g.left,
                top: g.top,
                width: g.width,
                height: g.height,
                text: anchor.name.clone(),
            });
        }
    }

    /// Remove the balloon with `id`; returns whether anything was removed.
    ///
    /// Callers in a view layer must stop event propagation so the same
    /// gesture cannot also reach [`OverlayEngine::click`].
    pub fn delete(&mut self, id: BoxId) -> bool {
        let before = self.boxes.len();
        self.boxes.retain(|b| b.id != id);
        if let Interaction::Dragging { id: active, .. } | Interaction::Resizing { id: active, .. } =
            self.interaction
            && active == id
        {
            self.interaction = Interaction::Idle;
        }
        self.boxes.len() != before
    }

    /// Replace the text of one balloon. No length limit is enforced here.
    pub fn set_text(&mut self, id: BoxId, text: impl Into<String>) -> bool {
        match self.boxes.iter_mut().find(|b| b.id == id) {
            Some(b) => {
                b.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Pointer-down on a balloon body or handle; enters `Dragging` or
    /// `Resizing`. A pointer-down on empty container space is ignored (the
    /// create path is [`OverlayEngine::click`]).
    pub fn pointer_down(&mut self, target: PointerTarget, at: Point) {
        self.interaction = match target {
            PointerTarget::Container => Interaction::Idle,
            PointerTarget::BoxBody(id) => match self.get(id) {
                Some(b) => Interaction::Dragging {
                    id,
                    origin: at,
                    start: b.geometry(),
                },
                None => Interaction::Idle,
            },
            PointerTarget::ResizeHandle(id, handle) => match self.get(id) {
                Some(b) => Interaction::Resizing {
                    id,
                    handle,
                    origin: at,
                    start: b.geometry(),
                },
                None => Interaction::Idle,
            },
        };
    }

    /// Pointer-move while captured; recomputes the active balloon's geometry
    /// from the captured start plus the pointer delta, clamped.
    pub fn pointer_move(&mut self, at: Point, container: ContainerMetrics) {
        let updated = match self.interaction {
            Interaction::Idle => return,
            Interaction::Dragging { id, origin, start } => {
                (id, interact::drag(start, at - origin, container))
            }
            Interaction::Resizing {
                id,
                handle,
                origin,
                start,
            } => (id, interact::resize(start, handle, at - origin, container)),
        };

        let (id, g) = updated;
        if let Some(b) = self.boxes.iter_mut().find(|b| b.id == id) {
            b.set_geometry(g);
        }
    }

    /// Pointer release; returns to `Idle`. Ending a resize arms the grace
    /// period consumed by [`OverlayEngine::click`].
    pub fn pointer_up(&mut self, now: Instant) {
        if matches!(self.interaction, Interaction::Resizing { .. }) {
            self.resize_grace_until = Some(now + RESIZE_GRACE);
        }
        self.interaction = Interaction::Idle;
    }

    /// Click on empty container space. Creates a minimum-size balloon at the
    /// click position when "add text" mode is on, unless a resize is active
    /// or just ended.
    pub fn click(
        &mut self,
        at: Point,
        container: ContainerMetrics,
        now: Instant,
    ) -> Option<BoxId> {
        if !self.add_text {
            return None;
        }
        if !matches!(self.interaction, Interaction::Idle) {
            return None;
        }
        if let Some(until) = self.resize_grace_until {
            if now < until {
                return None;
            }
            self.resize_grace_until = None;
        }

        let id = self.allocate_id();
        self.boxes.push(OverlayBox {
            id,
            left: inrange(
                at.x,
                BOUNDARY_MARGIN,
                container.width - MIN_WIDTH - BOUNDARY_MARGIN,
            ),
            top: inrange(
                at.y,
                BOUNDARY_MARGIN,
                container.scroll_height - MIN_HEIGHT - BOUNDARY_MARGIN,
            ),
            width: MIN_WIDTH,
            height: MIN_HEIGHT,
            text: String::new(),
        });
        Some(id)
    }

    fn allocate_id(&mut self) -> BoxId {
        let id = BoxId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/engine.rs"]
mod tests;
