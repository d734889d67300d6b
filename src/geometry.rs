//! Anchor points, node outlines and cable paths.
//!
//! Everything in this module is a pure function of an [`EditorConfig`] and node
//! positions. Anchors and outlines are expressed in the node's local space, with
//! the origin at the top-left corner of the node's drag handle:
//!
//! ```text
//!  0     handle_width                      handle_width + body_width
//!  +-----+--------------------------------+
//!  |     |  body                          |
//!  |  h  |                                |  body_height
//!  |  a  +--------------------------------+
//!  |  n  |                  slot 0 label  o  <- slot_anchor(0)
//!  |  d  +--------------------------------+
//!  |     |                  slot 1 label  o  <- slot_anchor(1)
//!  +-----+--------------------------------+
//! ```

use crate::config::EditorConfig;
use std::ops::{Add, Sub};

/// A 2D point (or offset) in scene or node-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Normalized rectangle spanning two corner points in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Left and top edges are inclusive, right and bottom edges exclusive.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Smallest rectangle containing both.
    pub fn united(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    pub fn translated(&self, offset: Point) -> Rect {
        Rect::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Grow each edge outward by its own amount.
    pub fn padded(&self, left: f32, top: f32, right: f32, bottom: f32) -> Rect {
        Rect::new(
            self.x - left,
            self.y - top,
            self.width + left + right,
            self.height + top + bottom,
        )
    }

    /// Grow every edge outward by `margin`.
    pub fn margins_added(&self, margin: f32) -> Rect {
        self.padded(margin, margin, margin, margin)
    }
}

/// Cubic bezier segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Point, // Start point
    pub p1: Point, // Control point 1
    pub p2: Point, // Control point 2
    pub p3: Point, // End point
}

impl CubicBezier {
    /// Evaluate the bezier curve at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f32) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = mt3 * self.p0.x
            + 3.0 * mt2 * t * self.p1.x
            + 3.0 * mt * t2 * self.p2.x
            + t3 * self.p3.x;
        let y = mt3 * self.p0.y
            + 3.0 * mt2 * t * self.p1.y
            + 3.0 * mt * t2 * self.p2.y
            + t3 * self.p3.y;

        Point::new(x, y)
    }

    /// Tight bounds of the curve itself, not of its control polygon.
    pub fn bounding_rect(&self) -> Rect {
        let mut min = Point::new(self.p0.x.min(self.p3.x), self.p0.y.min(self.p3.y));
        let mut max = Point::new(self.p0.x.max(self.p3.x), self.p0.y.max(self.p3.y));

        let tx = axis_extrema(self.p0.x, self.p1.x, self.p2.x, self.p3.x);
        let ty = axis_extrema(self.p0.y, self.p1.y, self.p2.y, self.p3.y);
        for t in tx.into_iter().chain(ty).flatten() {
            let p = self.eval(t);
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }

        Rect::from_corners(min, max)
    }
}

/// Parameters in (0, 1) where the derivative of one coordinate vanishes.
fn axis_extrema(p0: f32, p1: f32, p2: f32, p3: f32) -> [Option<f32>; 2] {
    // B'(t) / 3 = a t^2 + b t + c
    let a = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
    let b = 2.0 * (p0 - 2.0 * p1 + p2);
    let c = p1 - p0;

    let inside = |t: f32| (t > 0.0 && t < 1.0).then_some(t);

    if a.abs() < f32::EPSILON {
        if b.abs() < f32::EPSILON {
            return [None, None];
        }
        return [inside(-c / b), None];
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return [None, None];
    }
    let sq = disc.sqrt();
    [inside((-b + sq) / (2.0 * a)), inside((-b - sq) / (2.0 * a))]
}

/// The visual cable of a connection, in the source node's local space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CablePath {
    /// Unconnected slot: nothing is drawn and nothing contributes to bounds.
    #[default]
    Empty,
    /// Straight lead-in, one cubic, straight lead-out.
    Routed {
        start: Point,
        curve: CubicBezier,
        end: Point,
    },
}

impl CablePath {
    pub fn is_empty(&self) -> bool {
        matches!(self, CablePath::Empty)
    }

    pub fn bounding_rect(&self) -> Option<Rect> {
        match self {
            CablePath::Empty => None,
            CablePath::Routed { start, curve, end } => Some(
                curve
                    .bounding_rect()
                    .united(&Rect::from_corners(*start, *end)),
            ),
        }
    }

    pub fn translated(&self, offset: Point) -> CablePath {
        match *self {
            CablePath::Empty => CablePath::Empty,
            CablePath::Routed { start, curve, end } => CablePath::Routed {
                start: start + offset,
                curve: CubicBezier {
                    p0: curve.p0 + offset,
                    p1: curve.p1 + offset,
                    p2: curve.p2 + offset,
                    p3: curve.p3 + offset,
                },
                end: end + offset,
            },
        }
    }

    /// SVG path commands suitable for a Slint `Path { commands: ... }`.
    ///
    /// Returns an empty string for [`CablePath::Empty`].
    pub fn to_svg_commands(&self) -> String {
        match self {
            CablePath::Empty => String::new(),
            CablePath::Routed { start, curve, end } => format!(
                "M {} {} L {} {} C {} {} {} {} {} {} L {} {}",
                start.x,
                start.y,
                curve.p0.x,
                curve.p0.y,
                curve.p1.x,
                curve.p1.y,
                curve.p2.x,
                curve.p2.y,
                curve.p3.x,
                curve.p3.y,
                end.x,
                end.y
            ),
        }
    }
}

/// Right-edge anchor of an outgoing slot, in node-local space.
pub fn slot_anchor(config: &EditorConfig, slot: usize) -> Point {
    Point::new(
        config.body_width + config.handle_width,
        config.body_height + 0.5 * config.slot_height * (slot as f32 * 2.0 + 1.0),
    )
}

/// Left-edge midpoint where incoming cables end, in node-local space.
pub fn destination_anchor(config: &EditorConfig) -> Point {
    Point::new(0.0, 0.5 * config.body_height)
}

/// Cable from `source`'s slot to `destination`'s anchor, in `source`-local space.
///
/// `source` and `destination` are scene positions of the two nodes.
pub fn connection_path(
    config: &EditorConfig,
    source: Point,
    slot: usize,
    destination: Option<Point>,
) -> CablePath {
    let Some(destination) = destination else {
        return CablePath::Empty;
    };

    let start = slot_anchor(config, slot);
    let end = destination + destination_anchor(config) - source;
    let control = Point::new(config.cable_control_offset, 0.0);
    let lead = Point::new(config.cable_lead, 0.0);

    CablePath::Routed {
        start,
        curve: CubicBezier {
            p0: start + lead,
            p1: start + control + lead,
            p2: end - control - lead,
            p3: end - lead,
        },
        end,
    }
}

/// Clickable outline of a node: handle, body and all slot rows.
pub fn node_shape(config: &EditorConfig, slot_count: usize) -> Rect {
    Rect::new(
        0.0,
        0.0,
        config.body_width + config.handle_width,
        config.body_height + slot_count as f32 * config.slot_height,
    )
}

/// Vertical drag handle on the node's left edge.
pub fn handle_rect(config: &EditorConfig, slot_count: usize) -> Rect {
    Rect::new(
        0.0,
        0.0,
        config.handle_width,
        config.body_height + slot_count as f32 * config.slot_height,
    )
}

pub fn body_rect(config: &EditorConfig) -> Rect {
    Rect::new(config.handle_width, 0.0, config.body_width, config.body_height)
}

pub fn slot_rect(config: &EditorConfig, slot: usize) -> Rect {
    Rect::new(
        config.handle_width,
        config.body_height + slot as f32 * config.slot_height,
        config.body_width,
        config.slot_height,
    )
}

/// Node bounds grown to cover every cable anchored to it.
///
/// `outgoing` are the node's own cables (already node-local); `incoming` are
/// cables targeting the node, already translated into this node's space.
pub fn node_bounds<O, I>(config: &EditorConfig, slot_count: usize, outgoing: O, incoming: I) -> Rect
where
    O: IntoIterator<Item = CablePath>,
    I: IntoIterator<Item = CablePath>,
{
    outgoing
        .into_iter()
        .chain(incoming)
        .filter_map(|cable| cable.bounding_rect())
        .fold(node_shape(config, slot_count), |acc, cable| {
            acc.united(&cable.margins_added(config.cable_margin))
        })
}
