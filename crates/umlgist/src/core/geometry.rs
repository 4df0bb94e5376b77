//! Geometry primitives for resolved diagram layouts
//!
//! Lines are polylines made of straight segments. Positions along a line are
//! expressed either as a fraction of the whole line, or as a segment index
//! plus a fraction within that segment.

use serde::{Deserialize, Serialize};

/// Lines shorter than this are treated as having no length
const LENGTH_EPSILON: f64 = 1e-9;

/// A point in canvas coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation towards `other` by `t`
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Axis-aligned bounding box of an element
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// One straight piece of a line, ending at `end`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub end: Point,
}

/// A polyline starting at `start` and following `segments` in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl Line {
    /// Build a line through the given points
    ///
    /// The first point is the start; each further point ends a segment.
    pub fn through(points: &[Point]) -> Self {
        let start = points.first().copied().unwrap_or_default();
        let segments = points
            .iter()
            .skip(1)
            .map(|&end| Segment { end })
            .collect();
        Self { start, segments }
    }

    /// Euclidean length of every segment, in order
    pub fn segment_lengths(&self) -> Vec<f64> {
        let mut previous = self.start;
        self.segments
            .iter()
            .map(|segment| {
                let length = previous.distance(segment.end);
                previous = segment.end;
                length
            })
            .collect()
    }

    /// Total length of the line
    pub fn length(&self) -> f64 {
        self.segment_lengths().iter().sum()
    }

    /// Normalized arc-length position (0..=1) of a point on this line
    ///
    /// With a segment index, `pos` is the fraction within that segment.
    /// Without one, `pos` already is a fraction of the whole line.
    /// Lines without length always yield 0.
    pub fn normalized_position(&self, segment: Option<usize>, pos: f64) -> f64 {
        let pos = pos.clamp(0.0, 1.0);
        let Some(segment) = segment else {
            return pos;
        };

        let lengths = self.segment_lengths();
        let total: f64 = lengths.iter().sum();
        if total <= LENGTH_EPSILON || lengths.is_empty() {
            return 0.0;
        }

        let index = segment.min(lengths.len() - 1);
        let before: f64 = lengths[..index].iter().sum();
        ((before + lengths[index] * pos) / total).clamp(0.0, 1.0)
    }

    /// Split a normalized position into a segment index and a fraction within it
    ///
    /// Inverse of [`Line::normalized_position`] for lines with length.
    pub fn locate(&self, t: f64) -> (usize, f64) {
        let lengths = self.segment_lengths();
        let total: f64 = lengths.iter().sum();
        if total <= LENGTH_EPSILON || lengths.is_empty() {
            return (0, 0.0);
        }

        let target = t.clamp(0.0, 1.0) * total;
        let mut travelled = 0.0;
        for (index, &length) in lengths.iter().enumerate() {
            if length > LENGTH_EPSILON && target <= travelled + length {
                return (index, ((target - travelled) / length).clamp(0.0, 1.0));
            }
            travelled += length;
        }

        // Rounding left the target just past the end
        let last = lengths
            .iter()
            .rposition(|&length| length > LENGTH_EPSILON)
            .unwrap_or(lengths.len() - 1);
        (last, 1.0)
    }

    /// Coordinates of the point at normalized position `t`
    pub fn point_at(&self, t: f64) -> Point {
        if self.segments.is_empty() {
            return self.start;
        }
        let (index, fraction) = self.locate(t);
        let from = if index == 0 {
            self.start
        } else {
            self.segments[index - 1].end
        };
        from.lerp(self.segments[index].end, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> Line {
        // 30 right, then 10 down: total 40
        Line::through(&[
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 10.0),
        ])
    }

    #[test]
    fn test_point_distance() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_line_length() {
        let line = l_shape();
        assert_eq!(line.segment_lengths(), vec![30.0, 10.0]);
        assert_eq!(line.length(), 40.0);
    }

    #[test]
    fn test_normalized_position_with_segment() {
        let line = l_shape();
        assert!((line.normalized_position(Some(0), 0.5) - 0.375).abs() < 1e-9);
        assert!((line.normalized_position(Some(1), 0.5) - 0.875).abs() < 1e-9);
        assert_eq!(line.normalized_position(Some(1), 1.0), 1.0);
    }

    #[test]
    fn test_normalized_position_without_segment() {
        let line = l_shape();
        assert_eq!(line.normalized_position(None, 0.25), 0.25);
        assert_eq!(line.normalized_position(None, 4.0), 1.0);
    }

    #[test]
    fn test_segment_index_out_of_range_clamps() {
        let line = l_shape();
        assert_eq!(line.normalized_position(Some(9), 1.0), 1.0);
    }

    #[test]
    fn test_zero_length_line() {
        let line = Line::through(&[Point::new(5.0, 5.0), Point::new(5.0, 5.0)]);
        assert_eq!(line.normalized_position(Some(0), 0.7), 0.0);
        assert_eq!(line.locate(0.7), (0, 0.0));
    }

    #[test]
    fn test_locate_skips_empty_segments() {
        let line = Line::through(&[
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(0.0, 20.0),
        ]);
        let (index, fraction) = line.locate(0.75);
        assert_eq!(index, 2);
        assert!((fraction - 0.5).abs() < 1e-9);
        assert!((line.normalized_position(Some(index), fraction) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_point_at() {
        let line = l_shape();
        assert_eq!(line.point_at(0.0), Point::new(0.0, 0.0));
        let middle = line.point_at(0.5);
        assert!((middle.x - 20.0).abs() < 1e-9);
        assert_eq!(middle.y, 0.0);
        assert_eq!(line.point_at(1.0), Point::new(30.0, 10.0));
    }
}
