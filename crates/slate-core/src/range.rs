//! Ranges: an anchor and a focus point, as used for selections.

use std::cmp::Ordering;

use crate::node::Properties;
use crate::point::{Affinity, Point};

/// A span between two points.
///
/// The anchor is where the range started and the focus where it ends up;
/// the focus may come first in document order, in which case the range is
/// backward. Extra selection properties ride along in `properties`.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
    pub properties: Properties,
}

/// Which end of a range a point is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Anchor,
    Focus,
}

/// Tie-break policy when rebasing a whole range.
///
/// `Inward` resolves boundary ambiguity so the range shrinks: the start
/// point leans forward and the end point backward. `Outward` is the mirror
/// and lets the range grow. A collapsed range rebased `Inward` gives both
/// points the same affinity so it stays collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeAffinity {
    Forward,
    Backward,
    Inward,
    Outward,
}

/// Something a range can be tested to include.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Path(&'a [usize]),
    Point(&'a Point),
    Range(&'a Range),
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self {
            anchor,
            focus,
            properties: Default::default(),
        }
    }

    /// A collapsed range at `point`.
    pub fn collapsed(point: Point) -> Self {
        Self::new(point.clone(), point)
    }

    pub fn is_backward(&self) -> bool {
        self.anchor.is_after(&self.focus)
    }

    pub fn is_forward(&self) -> bool {
        !self.is_backward()
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_expanded(&self) -> bool {
        !self.is_collapsed()
    }

    /// Start and end points in document order.
    pub fn edges(&self) -> (&Point, &Point) {
        if self.is_backward() {
            (&self.focus, &self.anchor)
        } else {
            (&self.anchor, &self.focus)
        }
    }

    pub fn start(&self) -> &Point {
        self.edges().0
    }

    pub fn end(&self) -> &Point {
        self.edges().1
    }

    /// Check if both ranges have the same anchor and focus.
    ///
    /// Extra properties are not compared.
    pub fn equals(&self, another: &Range) -> bool {
        self.anchor == another.anchor && self.focus == another.focus
    }

    /// Both points, tagged with the edge they belong to.
    ///
    /// ```
    /// use slate_core::{Edge, Point, Range};
    ///
    /// let range = Range::new(Point::new(vec![0, 1], 4), Point::new(vec![0, 0], 2));
    /// let [(anchor, first), (focus, second)] = range.points();
    /// assert_eq!((anchor.offset, first), (4, Edge::Anchor));
    /// assert_eq!((focus.offset, second), (2, Edge::Focus));
    /// ```
    pub fn points(&self) -> [(&Point, Edge); 2] {
        [(&self.anchor, Edge::Anchor), (&self.focus, Edge::Focus)]
    }

    pub fn point_mut(&mut self, edge: Edge) -> &mut Point {
        match edge {
            Edge::Anchor => &mut self.anchor,
            Edge::Focus => &mut self.focus,
        }
    }

    /// Check if the range includes a path, point or another range.
    pub fn includes(&self, target: Target<'_>) -> bool {
        let (start, end) = self.edges();
        match target {
            Target::Range(other) => {
                if self.includes(Target::Point(&other.anchor))
                    || self.includes(Target::Point(&other.focus))
                {
                    return true;
                }
                let (other_start, other_end) = other.edges();
                start.is_before(other_start) && end.is_after(other_end)
            }
            Target::Point(point) => {
                point.compare(start) != Ordering::Less && point.compare(end) != Ordering::Greater
            }
            Target::Path(path) => {
                slate_path::compare(path, &start.path) != Ordering::Less
                    && slate_path::compare(path, &end.path) != Ordering::Greater
            }
        }
    }

    /// The overlap of two ranges, or `None` if they do not overlap.
    ///
    /// The result is forward and keeps this range's extra properties.
    pub fn intersection(&self, another: &Range) -> Option<Range> {
        let (s1, e1) = self.edges();
        let (s2, e2) = another.edges();
        let start = if s1.is_before(s2) { s2 } else { s1 };
        let end = if e1.is_before(e2) { e1 } else { e2 };
        if end.is_before(start) {
            return None;
        }
        Some(Range {
            anchor: start.clone(),
            focus: end.clone(),
            properties: self.properties.clone(),
        })
    }

    /// Check if this range fully covers `target`.
    pub fn surrounds(&self, target: &Range) -> bool {
        self.intersection(target).is_some_and(|r| r.equals(target))
    }

    /// Per-point affinities derived from a range policy.
    pub(crate) fn point_affinities(
        &self,
        affinity: Option<RangeAffinity>,
    ) -> (Option<Affinity>, Option<Affinity>) {
        let forward = self.is_forward();
        match affinity {
            Some(RangeAffinity::Inward) => {
                let anchor = if forward { Affinity::Forward } else { Affinity::Backward };
                let focus = if self.is_collapsed() {
                    anchor
                } else if forward {
                    Affinity::Backward
                } else {
                    Affinity::Forward
                };
                (Some(anchor), Some(focus))
            }
            Some(RangeAffinity::Outward) => {
                if forward {
                    (Some(Affinity::Backward), Some(Affinity::Forward))
                } else {
                    (Some(Affinity::Forward), Some(Affinity::Backward))
                }
            }
            Some(RangeAffinity::Forward) => (Some(Affinity::Forward), Some(Affinity::Forward)),
            Some(RangeAffinity::Backward) => (Some(Affinity::Backward), Some(Affinity::Backward)),
            None => (None, None),
        }
    }
}
