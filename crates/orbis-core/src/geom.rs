//! Grid coordinates for [`Layer::point_of`](crate::Layer::point_of) and
//! [`Layer::index_of`](crate::Layer::index_of).

/// A 2D integer point on a grid layer. X grows east, Y grows south.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return a point shifted by (dx, dy).
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_moves_both_axes() {
        assert_eq!(Point::new(3, 3).shift(-1, 2), Point::new(2, 5));
        assert_eq!(Point::default().shift(0, 0), Point::new(0, 0));
    }
}
