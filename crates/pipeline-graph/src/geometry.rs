//! Edge attachment geometry
//!
//! Connections leave and enter nodes at one of four canonical points: the
//! midpoint of the top, right, bottom or left side of the node's bounding
//! box. The side is picked from the angle between the two node centres, so
//! the result is O(1) per edge and fully deterministic.
//!
//! Canvas coordinates grow rightwards and downwards, so 90° points down.

use serde::{Deserialize, Serialize};

use crate::store::GraphStore;
use crate::types::{Edge, Position};

/// Rendered width of a node, padding and border included
pub const NODE_WIDTH: f64 = 188.0;

/// Rendered height of a node, padding and border included
pub const NODE_HEIGHT: f64 = 118.0;

/// A point in canvas space
pub type Point = Position;

/// Bounding box dimensions shared by every node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: f64,
    pub height: f64,
}

impl Default for Footprint {
    fn default() -> Self {
        Self {
            width: NODE_WIDTH,
            height: NODE_HEIGHT,
        }
    }
}

impl Footprint {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Centre of a node whose top-left corner is at `origin`
    pub fn center(&self, origin: Position) -> Point {
        Point::new(origin.x + self.width / 2.0, origin.y + self.height / 2.0)
    }

    /// Midpoint of one side of a node's box
    pub fn side_midpoint(&self, origin: Position, side: Side) -> Point {
        match side {
            Side::Right => Point::new(origin.x + self.width, origin.y + self.height / 2.0),
            Side::Bottom => Point::new(origin.x + self.width / 2.0, origin.y + self.height),
            Side::Left => Point::new(origin.x, origin.y + self.height / 2.0),
            Side::Top => Point::new(origin.x + self.width / 2.0, origin.y),
        }
    }

    /// Attachment point for one end of a connection
    ///
    /// The angle is always measured from the source centre to the target
    /// centre; for the target end it is rotated by 180° so that the entry
    /// point faces the source.
    pub fn attachment_point(&self, source: Position, target: Position, end: EdgeEnd) -> Point {
        let from = self.center(source);
        let to = self.center(target);
        let angle = normalize_degrees((to.y - from.y).atan2(to.x - from.x).to_degrees());

        match end {
            EdgeEnd::Source => self.side_midpoint(source, Side::for_angle(angle)),
            EdgeEnd::Target => {
                self.side_midpoint(target, Side::for_angle(normalize_degrees(angle + 180.0)))
            }
        }
    }
}

/// Which end of a connection is being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeEnd {
    /// Exit point on the source node
    Source,
    /// Entry point on the target node
    Target,
}

/// Side of a node's bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Bucket an angle in [0, 360) into a 90°-wide sector
    ///
    /// Sectors are centred on right (0°), bottom (90°), left (180°) and
    /// top (270°). A boundary angle belongs to the sector that follows it
    /// clockwise, e.g. 45° is bottom and 315° is right.
    pub fn for_angle(degrees: f64) -> Side {
        if !(45.0..315.0).contains(&degrees) {
            Side::Right
        } else if degrees < 135.0 {
            Side::Bottom
        } else if degrees < 225.0 {
            Side::Left
        } else {
            Side::Top
        }
    }
}

/// Map any angle in degrees into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Attachment point with the default node footprint
pub fn attachment_point(source: Position, target: Position, end: EdgeEnd) -> Point {
    Footprint::default().attachment_point(source, target, end)
}

/// Exit and entry points for an edge of a store
///
/// Returns `None` if either endpoint is missing from the store.
pub fn edge_anchors(store: &GraphStore, edge: &Edge, footprint: &Footprint) -> Option<(Point, Point)> {
    let source = store.node(&edge.from)?.position;
    let target = store.node(&edge.to)?.position;
    Some((
        footprint.attachment_point(source, target, EdgeEnd::Source),
        footprint.attachment_point(source, target, EdgeEnd::Target),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewNode;

    #[test]
    fn test_horizontal_neighbours() {
        let n1 = Position::new(100.0, 100.0);
        let n2 = Position::new(300.0, 100.0);

        assert_eq!(attachment_point(n1, n2, EdgeEnd::Source), Point::new(288.0, 159.0));
        assert_eq!(attachment_point(n1, n2, EdgeEnd::Target), Point::new(300.0, 159.0));
    }

    #[test]
    fn test_vertical_neighbours() {
        let above = Position::new(100.0, 100.0);
        let below = Position::new(100.0, 400.0);

        // target is straight down (90°): leave from the bottom, enter at the top
        assert_eq!(attachment_point(above, below, EdgeEnd::Source), Point::new(194.0, 218.0));
        assert_eq!(attachment_point(above, below, EdgeEnd::Target), Point::new(194.0, 400.0));

        // and the other way round
        assert_eq!(attachment_point(below, above, EdgeEnd::Source), Point::new(194.0, 400.0));
        assert_eq!(attachment_point(below, above, EdgeEnd::Target), Point::new(194.0, 218.0));
    }

    #[test]
    fn test_leftward_connection() {
        let right = Position::new(500.0, 100.0);
        let left = Position::new(100.0, 150.0);

        assert_eq!(attachment_point(right, left, EdgeEnd::Source), Point::new(500.0, 159.0));
        assert_eq!(attachment_point(right, left, EdgeEnd::Target), Point::new(288.0, 209.0));
    }

    #[test]
    fn test_sector_boundaries() {
        assert_eq!(Side::for_angle(0.0), Side::Right);
        assert_eq!(Side::for_angle(44.9), Side::Right);
        assert_eq!(Side::for_angle(45.0), Side::Bottom);
        assert_eq!(Side::for_angle(134.9), Side::Bottom);
        assert_eq!(Side::for_angle(135.0), Side::Left);
        assert_eq!(Side::for_angle(225.0), Side::Top);
        assert_eq!(Side::for_angle(314.9), Side::Top);
        assert_eq!(Side::for_angle(315.0), Side::Right);
        assert_eq!(Side::for_angle(359.9), Side::Right);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(540.0), 180.0);
        assert!((0.0..360.0).contains(&normalize_degrees(-1e-20)));
    }

    #[test]
    fn test_coincident_nodes_are_deterministic() {
        let p = Position::new(50.0, 50.0);
        // atan2(0, 0) = 0: source exits right, target enters left
        assert_eq!(attachment_point(p, p, EdgeEnd::Source), Point::new(238.0, 109.0));
        assert_eq!(attachment_point(p, p, EdgeEnd::Target), Point::new(50.0, 109.0));
    }

    #[test]
    fn test_repeated_calls_agree() {
        let a = Position::new(12.5, -40.0);
        let b = Position::new(-300.0, 220.0);
        let first = attachment_point(a, b, EdgeEnd::Source);
        for _ in 0..10 {
            assert_eq!(attachment_point(a, b, EdgeEnd::Source), first);
        }
    }

    #[test]
    fn test_custom_footprint() {
        let footprint = Footprint::new(100.0, 50.0);
        let a = Position::new(0.0, 0.0);
        let b = Position::new(300.0, 0.0);
        assert_eq!(footprint.attachment_point(a, b, EdgeEnd::Source), Point::new(100.0, 25.0));
        assert_eq!(footprint.center(a), Point::new(50.0, 25.0));
    }

    #[test]
    fn test_edge_anchors() {
        let mut store = GraphStore::new();
        let a = store.add_node(NewNode::new("data-source", (100.0, 100.0)));
        let b = store.add_node(NewNode::new("split", (300.0, 100.0)));
        store.add_edge(&a, &b);

        let edge = store.edges()[0].clone();
        let anchors = edge_anchors(&store, &edge, &Footprint::default()).unwrap();
        assert_eq!(anchors, (Point::new(288.0, 159.0), Point::new(300.0, 159.0)));

        store.remove_node(&b);
        assert!(edge_anchors(&store, &edge, &Footprint::default()).is_none());
    }
}
