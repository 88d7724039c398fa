//! Edge bands and the intersection/offset arithmetic behind snapping.
//!
//! Every rectangle contributes four thin bands of thickness `2s` along its
//! edges, stretched by `s` past both ends. Two rectangles are "close" on an
//! edge when the matching bands overlap, and the snap offset aligns the
//! source band onto the target band.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use crate::model::{Band, Point, Rect};

/// Edge of a rectangle. The discriminants index into [`Bands`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoPrimitive, TryFromPrimitive,
)]
#[repr(u8)]
pub enum Edge {
    Top = 0,
    Right = 1,
    Bottom = 2,
    Left = 3,
}

impl Edge {
    /// Top and bottom bands run horizontally and can only snap vertically.
    pub fn is_horizontal(self) -> bool { matches!(self, Edge::Top | Edge::Bottom) }
}

/// Window corner, numbered clockwise from top-left.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIter,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    #[default]
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
}

impl Corner {
    pub fn index(self) -> u8 { self.into() }

    fn from_index(i: u8) -> Corner { Corner::try_from(i % 4).unwrap_or_default() }

    pub fn next(self) -> Corner { Corner::from_index(self.index() + 1) }

    pub fn prev(self) -> Corner { Corner::from_index(self.index() + 3) }

    pub fn opposite(self) -> Corner { Corner::from_index(self.index() + 2) }

    pub fn is_right(self) -> bool { self.index() % 3 != 0 }

    pub fn is_bottom(self) -> bool { self.index() / 2 != 0 }

    /// The two edges meeting at this corner, horizontal one first.
    pub fn edges(self) -> (Edge, Edge) {
        match self {
            Corner::TopLeft => (Edge::Top, Edge::Left),
            Corner::TopRight => (Edge::Top, Edge::Right),
            Corner::BottomRight => (Edge::Bottom, Edge::Right),
            Corner::BottomLeft => (Edge::Bottom, Edge::Left),
        }
    }

    /// Position of this corner on `rect`.
    pub fn of(self, rect: Rect) -> Point {
        Point::new(
            if self.is_right() { rect.right() } else { rect.x },
            if self.is_bottom() { rect.bottom() } else { rect.y },
        )
    }
}

/// The four bands of one rectangle, indexed by [`Edge`].
pub type Bands = [Band; 4];

pub fn band(rect: Rect, s: i32, edge: Edge) -> Band {
    let Rect { x, y, w, h } = rect;
    match edge {
        Edge::Top => Band::new(x - s, y - s, x + w + s, y + s),
        Edge::Right => Band::new(x + w - s, y - s, x + w + s, y + h + s),
        Edge::Bottom => Band::new(x - s, y + h - s, x + w + s, y + h + s),
        Edge::Left => Band::new(x - s, y - s, x + s, y + h + s),
    }
}

pub fn bands_for_rect(rect: Rect, s: i32) -> Bands {
    [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left].map(|e| band(rect, s, e))
}

/// A band of the rectangle being moved, tagged with the edge it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source {
    pub edge: Edge,
    pub band: Band,
}

/// All four bands of `rect`, or only the two meeting at `corner`.
pub fn sources_for_rect(rect: Rect, s: i32, corner: Option<Corner>) -> Vec<Source> {
    let source = |edge| Source { edge, band: band(rect, s, edge) };
    match corner {
        None => Edge::iter().map(source).collect(),
        Some(corner) => {
            let (a, b) = corner.edges();
            vec![source(a), source(b)]
        }
    }
}

/// Axis-aligned overlap test; touching bands count as overlapping.
pub fn intersects(a: &Band, b: &Band) -> bool {
    !(a.y1 < b.y0 || a.y0 > b.y1 || a.x1 < b.x0 || a.x0 > b.x1)
}

/// `(source, target)` bands found to overlap.
pub type Pair = (Band, Band);

/// First overlapping pair per orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Intersections {
    /// Top/bottom source against top/bottom target.
    pub horizontal: Option<Pair>,
    /// Left/right source against left/right target.
    pub vertical: Option<Pair>,
}

impl Intersections {
    pub fn is_empty(&self) -> bool { self.horizontal.is_none() && self.vertical.is_none() }
}

fn first_pair(sources: &[Source], targets: &[Bands], horizontal: bool) -> Option<Pair> {
    for target in targets {
        for source in sources.iter().filter(|s| s.edge.is_horizontal() == horizontal) {
            for edge in Edge::iter().filter(|e| e.is_horizontal() == horizontal) {
                let candidate = &target[usize::from(u8::from(edge))];
                if intersects(&source.band, candidate) {
                    return Some((source.band, *candidate));
                }
            }
        }
    }
    None
}

/// Finds at most one horizontal and one vertical overlap between `sources`
/// and the target band sets. Bands never match across orientations.
pub fn check_intersections(sources: &[Source], targets: &[Bands]) -> Intersections {
    let horizontal = first_pair(sources, targets, true);
    let vertical = first_pair(sources, targets, false);
    Intersections { horizontal, vertical }
}

/// Offset that moves the source band onto the target band along the band's
/// thin axis.
pub fn offset_for_intersecting_pair(pair: Option<Pair>, s: i32) -> (i32, i32) {
    let Some((source, target)) = pair else {
        return (0, 0);
    };
    if source.width() == 2 * s && target.width() == 2 * s {
        (target.x0 - source.x0, 0)
    } else {
        (0, target.y0 - source.y0)
    }
}

/// Combined `(dx, dy)`: `dx` only from the vertical pair, `dy` only from the
/// horizontal one.
pub fn offset_for_intersections(hits: &Intersections, s: i32) -> (i32, i32) {
    let (dx, _) = offset_for_intersecting_pair(hits.vertical, s);
    let (_, dy) = offset_for_intersecting_pair(hits.horizontal, s);
    (dx, dy)
}
