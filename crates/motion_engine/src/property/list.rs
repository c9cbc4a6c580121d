//! Ordered control-point lists
//!
//! Deformable outlines are animated through a list of resettable vector
//! points. The list is always owned by a [`Property`](super::Property) and
//! mutated through [`Property::points_mut`](super::Property::points_mut), so
//! every element change reaches the property's observers as one coalesced
//! notification.

use crate::foundation::math::Vec3;

/// A single resettable point inside a [`ControlPointList`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    original: Vec3,
    current: Vec3,
}

impl ControlPoint {
    /// Create a point whose baseline and live value both start at `value`
    pub fn new(value: Vec3) -> Self {
        Self {
            original: value,
            current: value,
        }
    }

    /// Get the live value
    pub fn get(&self) -> Vec3 {
        self.current
    }

    /// Get the construction-time baseline
    pub fn original(&self) -> Vec3 {
        self.original
    }

    /// Replace the live value
    pub fn set(&mut self, value: Vec3) {
        self.current = value;
    }

    /// Restore the live value to the baseline
    pub fn reset(&mut self) {
        self.current = self.original;
    }
}

/// Insertion-order-preserving sequence of control points
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlPointList {
    points: Vec<ControlPoint>,
}

impl ControlPointList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list from baseline point values
    pub fn from_points(values: impl IntoIterator<Item = Vec3>) -> Self {
        Self {
            points: values.into_iter().map(ControlPoint::new).collect(),
        }
    }

    /// Append a point at the end of the list
    pub fn push(&mut self, value: Vec3) {
        self.points.push(ControlPoint::new(value));
    }

    /// Insert a point at the given position, shifting later points right
    pub fn insert(&mut self, index: usize, value: Vec3) {
        self.points.insert(index, ControlPoint::new(value));
    }

    /// Get a point by position
    pub fn point(&self, index: usize) -> Option<&ControlPoint> {
        self.points.get(index)
    }

    /// Get a point by position for mutation
    pub fn point_mut(&mut self, index: usize) -> Option<&mut ControlPoint> {
        self.points.get_mut(index)
    }

    /// Remove every point
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Number of points in the list
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the list holds no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the points in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ControlPoint> {
        self.points.iter()
    }

    /// Restore every point to its baseline
    pub fn reset_all(&mut self) {
        for point in &mut self.points {
            point.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::math::EPSILON;

    #[test]
    fn test_insertion_order_preserved() {
        let mut list = ControlPointList::new();
        list.push(Vec3::new(0.0, 0.0, 0.0));
        list.push(Vec3::new(2.0, 0.0, 0.0));
        list.insert(1, Vec3::new(1.0, 0.0, 0.0));

        let xs: Vec<f32> = list.iter().map(|p| p.get().x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_point_reset_restores_baseline() {
        let mut list = ControlPointList::from_points([Vec3::new(1.0, 1.0, 1.0)]);
        let point = list.point_mut(0).unwrap();
        point.set(Vec3::new(5.0, 5.0, 5.0));
        point.reset();
        assert_relative_eq!(point.get(), point.original(), epsilon = EPSILON);
    }

    #[test]
    fn test_clear_empties_list() {
        let mut list = ControlPointList::from_points([Vec3::zeros(), Vec3::zeros()]);
        list.clear();
        assert!(list.is_empty());
    }
}
