use eframe::egui::{Vec2, vec2};

const LEAF_SIZE: usize = 8;
const MAX_DEPTH: u8 = 12;

/// Axis-aligned square region of the layout plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Square {
    center: Vec2,
    half: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        if !points.iter().all(|point| point.x.is_finite() && point.y.is_finite()) {
            return None;
        }
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), point| (min.min(*point), max.max(*point)));

        let extent = max - min;
        Some(Self {
            center: (min + max) * 0.5,
            half: extent.max_elem() * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point - self.center).abs().max_elem() <= self.half
    }

    pub(super) fn side(self) -> f32 {
        self.half * 2.0
    }

    /// Bit 0 is the right half, bit 1 the lower half.
    fn quadrant(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half * 0.5;
        let sign = |bit: usize| if quadrant & bit == 0 { -quarter } else { quarter };
        Self {
            center: self.center + vec2(sign(1), sign(2)),
            half: quarter,
        }
    }
}

/// Barnes-Hut cell. Seen from far enough away, the members' centroid stands in for all of
/// them; leaves keep their member indices for exact pairwise forces.
#[derive(Debug)]
pub(super) struct Cell {
    pub(super) square: Square,
    pub(super) centroid: Vec2,
    pub(super) count: usize,
    pub(super) members: Vec<usize>,
    pub(super) quadrants: Vec<Cell>,
}

impl Cell {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let square = Square::enclosing(positions)?;
        Some(Self::split(square, (0..positions.len()).collect(), positions, 0))
    }

    fn split(square: Square, members: Vec<usize>, positions: &[Vec2], depth: u8) -> Self {
        let count = members.len();
        let centroid = members
            .iter()
            .fold(Vec2::ZERO, |sum, &index| sum + positions[index])
            / count.max(1) as f32;

        let mut cell = Self {
            square,
            centroid,
            count,
            members,
            quadrants: Vec::new(),
        };
        if depth >= MAX_DEPTH || count <= LEAF_SIZE {
            return cell;
        }

        let mut buckets: [Vec<usize>; 4] = Default::default();
        for &index in &cell.members {
            buckets[square.quadrant(positions[index])].push(index);
        }
        // Coincident points cannot be separated by splitting.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() < 2 {
            return cell;
        }

        cell.quadrants = buckets
            .into_iter()
            .enumerate()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(quadrant, bucket)| {
                Self::split(square.child(quadrant), bucket, positions, depth + 1)
            })
            .collect();
        cell.members.clear();
        cell
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.quadrants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_members(cell: &Cell, out: &mut Vec<usize>) {
        if cell.is_leaf() {
            out.extend(&cell.members);
        }
        for quadrant in &cell.quadrants {
            leaf_members(quadrant, out);
        }
    }

    #[test]
    fn every_point_lands_in_exactly_one_leaf() {
        let positions = (0..300)
            .map(|index| vec2((index % 17) as f32 * 31.0, (index / 17) as f32 * -23.0))
            .collect::<Vec<_>>();
        let root = Cell::build(&positions).expect("finite points");

        let mut members = Vec::new();
        leaf_members(&root, &mut members);
        members.sort_unstable();
        assert_eq!(members, (0..300).collect::<Vec<_>>());
        assert_eq!(root.count, 300);
        assert!(!root.is_leaf());
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let root = Cell::build(&[Vec2::ZERO; 20]).expect("finite points");
        assert!(root.is_leaf());
        assert_eq!(root.members.len(), 20);
    }

    #[test]
    fn non_finite_points_build_nothing() {
        assert!(Cell::build(&[]).is_none());
        assert!(Cell::build(&[vec2(f32::NAN, 0.0), Vec2::ZERO]).is_none());
    }
}
