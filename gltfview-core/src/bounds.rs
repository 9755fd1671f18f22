//! Axis-aligned bounding boxes

use serde::{Deserialize, Serialize};

use crate::point::*;

/// An axis-aligned box described by its minimum and maximum corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3f,
    pub max: Point3f,
}

impl Aabb {
    /// Create a box from two corners, normalising their order per axis
    pub fn new(a: Point3f, b: Point3f) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Smallest box containing all the given points, `None` if there are none
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3f>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self { min: first, max: first };
        for p in iter {
            bounds.encapsulate(p);
        }
        Some(bounds)
    }

    /// Grow the box to contain `point`
    pub fn encapsulate(&mut self, point: &Point3f) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Smallest box containing both boxes
    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    pub fn size(&self) -> Vector3f {
        self.max - self.min
    }

    pub fn center(&self) -> Point3f {
        nalgebra::center(&self.min, &self.max)
    }

    /// Largest of the three edge lengths
    pub fn max_extent(&self) -> f32 {
        self.size().max()
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [Point3f; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3f::new(a.x, a.y, a.z),
            Point3f::new(b.x, a.y, a.z),
            Point3f::new(a.x, b.y, a.z),
            Point3f::new(b.x, b.y, a.z),
            Point3f::new(a.x, a.y, b.z),
            Point3f::new(b.x, a.y, b.z),
            Point3f::new(a.x, b.y, b.z),
            Point3f::new(b.x, b.y, b.z),
        ]
    }

    /// Axis-aligned box enclosing this box after applying `matrix`
    pub fn transformed(&self, matrix: &Matrix4f) -> Aabb {
        let corners = self.corners().map(|c| matrix.transform_point(&c));
        // corners is never empty
        Aabb::from_points(corners.iter()).unwrap_or(*self)
    }
}
