use crate::foundation::geometry::{ContainerMetrics, Point, Vec2, inrange};
use crate::mapper::viewport::BoxGeometry;
use crate::overlay::engine::{BOUNDARY_MARGIN, BoxId, MIN_HEIGHT, MIN_WIDTH};

/// One of the eight resize handles around a balloon.
///
/// Each handle moves its own edge(s) while the opposite edge stays fixed,
/// until a minimum-size floor or container-boundary ceiling clamps it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Handle {
    /// Top-left corner.
    TopLeft,
    /// Top edge midpoint.
    Top,
    /// Top-right corner.
    TopRight,
    /// Right edge midpoint.
    Right,
    /// Bottom-right corner.
    BottomRight,
    /// Bottom edge midpoint.
    Bottom,
    /// Bottom-left corner.
    BottomLeft,
    /// Left edge midpoint.
    Left,
}

/// What a pointer-down landed on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerTarget {
    /// Empty container space.
    Container,
    /// The body of a balloon (starts a drag).
    BoxBody(BoxId),
    /// A resize handle of a balloon (starts a resize).
    ResizeHandle(BoxId, Handle),
}

/// Interaction state machine driven by pointer events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Interaction {
    /// No pointer capture in progress.
    Idle,
    /// Moving a balloon; geometry captured at pointer-down.
    Dragging {
        /// Balloon being moved.
        id: BoxId,
        /// Pointer position at pointer-down.
        origin: Point,
        /// Geometry at pointer-down.
        start: BoxGeometry,
    },
    /// Resizing a balloon via one handle.
    Resizing {
        /// Balloon being resized.
        id: BoxId,
        /// Active handle.
        handle: Handle,
        /// Pointer position at pointer-down.
        origin: Point,
        /// Geometry at pointer-down.
        start: BoxGeometry,
    },
}

/// Apply a drag delta to `start`, clamped independently per axis.
///
/// Hitting the right wall does not affect vertical motion and vice versa.
/// The vertical ceiling uses the container's full scrollable extent.
pub fn drag(start: BoxGeometry, delta: Vec2, container: ContainerMetrics) -> BoxGeometry {
    BoxGeometry {
        left: inrange(
            start.left + delta.x,
            BOUNDARY_MARGIN,
            container.width - start.width - BOUNDARY_MARGIN,
        ),
        top: inrange(
            start.top + delta.y,
            BOUNDARY_MARGIN,
            container.scroll_height - start.height - BOUNDARY_MARGIN,
        ),
        ..start
    }
}

/// Apply a resize delta for `handle` to `start`.
///
/// The dragged edge moves with the pointer while the opposite edge stays
/// fixed, subject to the minimum-size floors and the container boundary.
/// Bottom-anchored handles clamp against the scrollable extent.
pub fn resize(
    start: BoxGeometry,
    handle: Handle,
    delta: Vec2,
    container: ContainerMetrics,
) -> BoxGeometry {
    let s = start;
    let (dx, dy) = (delta.x, delta.y);

    // Shared per-edge rules. Moving the top or left edge shifts the origin
    // and shrinks the dimension together so the far edge stays put.
    let left_edge = || {
        (
            inrange(s.left + dx, BOUNDARY_MARGIN, s.left + s.width - MIN_WIDTH),
            inrange(s.width - dx, MIN_WIDTH, s.left + s.width - BOUNDARY_MARGIN),
        )
    };
    let top_edge = || {
        (
            inrange(s.top + dy, BOUNDARY_MARGIN, s.top + s.height - MIN_HEIGHT),
            inrange(s.height - dy, MIN_HEIGHT, s.top + s.height - BOUNDARY_MARGIN),
        )
    };
    let right_edge = || {
        inrange(
            s.width + dx,
            MIN_WIDTH,
            container.width - s.left - BOUNDARY_MARGIN,
        )
    };
    let bottom_edge = || {
        inrange(
            s.height + dy,
            MIN_HEIGHT,
            container.scroll_height - s.top - BOUNDARY_MARGIN,
        )
    };

    match handle {
        Handle::TopLeft => {
            let (left, width) = left_edge();
            let (top, height) = top_edge();
            BoxGeometry {
                left,
                top,
                width,
                height,
            }
        }
        Handle::TopRight => {
            let (top, height) = top_edge();
            BoxGeometry {
                top,
                height,
                width: right_edge(),
                ..s
            }
        }
        Handle::BottomLeft => {
            let (left, width) = left_edge();
            BoxGeometry {
                left,
                width,
                height: bottom_edge(),
                ..s
            }
        }
        Handle::BottomRight => BoxGeometry {
            width: right_edge(),
            height: bottom_edge(),
            ..s
        },
        Handle::Top => {
            let (top, height) = top_edge();
            BoxGeometry { top, height, ..s }
        }
        Handle::Bottom => BoxGeometry {
            height: bottom_edge(),
            ..s
        },
        Handle::Right => BoxGeometry {
            width: right_edge(),
            ..s
        },
        Handle::Left => {
            let (left, width) = left_edge();
            BoxGeometry { left, width, ..s }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/interact.rs"]
mod tests;
