//! Freehand ink primitives shared by the wire protocol, persistence, and the
//! eraser hit-testing path.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single 2D point of a stroke, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StrokePoint {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// One continuous freehand gesture drawn over a PDF page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    /// Song the stroke belongs to.
    pub song_id: i64,
    /// 1-based page of the song's PDF.
    pub page: u32,
    /// CSS color of the ink (e.g. `#e11d48`).
    pub color: String,
    /// Line thickness in page pixels.
    pub width: f64,
    /// Ordered points of the gesture.
    pub points: Vec<StrokePoint>,
}

impl Stroke {
    /// A gesture only leaves a visible mark once it spans two points; a
    /// single tap is discarded instead of broadcast or persisted.
    pub fn is_complete(&self) -> bool {
        self.points.len() >= 2
    }

    /// Whether an eraser touch at `point` with the given radius removes this
    /// stroke. Half the stroke width is added to the radius so thicker ink is
    /// as easy to erase as its visual footprint suggests.
    pub fn hit_by(&self, point: StrokePoint, radius: f64) -> bool {
        self.points
            .windows(2)
            .any(|pair| distance_to_segment(point, pair[0], pair[1]) <= radius + self.width / 2.0)
    }
}

/// Euclidean distance from `p` to the segment `a` -> `b`.
///
/// The projection fraction is clamped to `[0, 1]` so the result is the
/// distance to the nearest point on the segment, not the infinite line. A
/// zero-length segment degrades to point-to-point distance.
pub fn distance_to_segment(p: StrokePoint, a: StrokePoint, b: StrokePoint) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((p.x - a.x).powi(2) + (p.y - a.y).powi(2)).sqrt();
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    let proj_x = a.x + t * dx;
    let proj_y = a.y + t * dy;
    ((p.x - proj_x).powi(2) + (p.y - proj_y).powi(2)).sqrt()
}

/// Indices of every stroke in `strokes` that an eraser touch removes.
///
/// Indices reference the caller's current ordering, matching the index set
/// carried by an erase event.
pub fn erase_hits(strokes: &[Stroke], point: StrokePoint, radius: f64) -> Vec<usize> {
    strokes
        .iter()
        .enumerate()
        .filter(|(_, stroke)| stroke.hit_by(point, radius))
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> StrokePoint {
        StrokePoint { x, y }
    }

    fn stroke(points: Vec<StrokePoint>, width: f64) -> Stroke {
        Stroke {
            song_id: 1,
            page: 1,
            color: "#000000".into(),
            width,
            points,
        }
    }

    #[test]
    fn distance_projects_onto_segment() {
        assert_eq!(
            distance_to_segment(p(5.0, 3.0), p(0.0, 0.0), p(10.0, 0.0)),
            3.0
        );
    }

    #[test]
    fn distance_clamps_beyond_endpoints() {
        // (14, 3) projects past the right endpoint; distance is to (10, 0).
        assert_eq!(
            distance_to_segment(p(14.0, 3.0), p(0.0, 0.0), p(10.0, 0.0)),
            5.0
        );
        assert_eq!(
            distance_to_segment(p(-3.0, 4.0), p(0.0, 0.0), p(10.0, 0.0)),
            5.0
        );
    }

    #[test]
    fn zero_length_segment_degrades_to_point_distance() {
        assert_eq!(
            distance_to_segment(p(3.0, 4.0), p(2.0, 2.0), p(2.0, 2.0)),
            ((1.0f64).powi(2) + (2.0f64).powi(2)).sqrt()
        );
    }

    #[test]
    fn thick_stroke_hit_regression() {
        let s = stroke(vec![p(0.0, 0.0), p(10.0, 0.0)], 4.0);
        // Distance 3 > 0 + 4/2, no hit.
        assert!(!s.hit_by(p(5.0, 3.0), 0.0));
        // Distance 1 <= 2, hit.
        assert!(s.hit_by(p(5.0, 1.0), 0.0));
        // Exactly on the inked edge still counts.
        assert!(s.hit_by(p(5.0, 2.0), 0.0));
    }

    #[test]
    fn hit_is_symmetric_under_point_reversal() {
        let forward = stroke(vec![p(0.0, 0.0), p(4.0, 0.0), p(4.0, 6.0)], 2.0);
        let mut reversed_points = forward.points.clone();
        reversed_points.reverse();
        let reversed = stroke(reversed_points, 2.0);

        for probe in [p(2.0, 1.0), p(5.0, 3.0), p(8.0, 8.0), p(4.0, 6.0)] {
            assert_eq!(forward.hit_by(probe, 1.0), reversed.hit_by(probe, 1.0));
        }
    }

    #[test]
    fn hit_is_translation_invariant() {
        let base = stroke(vec![p(0.0, 0.0), p(10.0, 0.0)], 4.0);
        let shifted = stroke(vec![p(7.0, -3.0), p(17.0, -3.0)], 4.0);

        for (probe, moved) in [
            (p(5.0, 3.0), p(12.0, 0.0)),
            (p(5.0, 1.0), p(12.0, -2.0)),
            (p(11.0, 0.0), p(18.0, -3.0)),
        ] {
            assert_eq!(base.hit_by(probe, 0.0), shifted.hit_by(moved, 0.0));
        }
    }

    #[test]
    fn single_point_stroke_is_never_hit() {
        let tap = stroke(vec![p(5.0, 5.0)], 10.0);
        assert!(!tap.is_complete());
        assert!(!tap.hit_by(p(5.0, 5.0), 100.0));
    }

    #[test]
    fn erase_hits_returns_positional_indices() {
        let strokes = vec![
            stroke(vec![p(0.0, 0.0), p(10.0, 0.0)], 2.0),
            stroke(vec![p(0.0, 50.0), p(10.0, 50.0)], 2.0),
            stroke(vec![p(5.0, -2.0), p(5.0, 2.0)], 2.0),
        ];

        assert_eq!(erase_hits(&strokes, p(5.0, 0.0), 1.0), vec![0, 2]);
        assert!(erase_hits(&strokes, p(100.0, 100.0), 1.0).is_empty());
    }
}
