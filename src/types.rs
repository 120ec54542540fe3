use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    /// Unit vector for a heading in degrees. 0° points along +y and positive
    /// angles turn clockwise on a y-down screen.
    pub fn from_heading(degrees: f64) -> Self {
        Vector2D::new(0.0, 1.0).rotate_degrees(degrees)
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x - other.x, self.y - other.y)
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(&self, other: Vector2D) -> f64 {
        self.sub(other).length()
    }

    pub fn rotate_degrees(&self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Vector2D::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

/// An RGB triple, written as `[r, g, b]` in config files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

impl From<Rgb> for crossterm::style::Color {
    fn from(color: Rgb) -> Self {
        crossterm::style::Color::Rgb { r: color.0, g: color.1, b: color.2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rotating_quarter_turn_swaps_axes() {
        let rotated = Vector2D::new(0.0, 1.0).rotate_degrees(90.0);
        assert_abs_diff_eq!(rotated.x, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rotated.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn rotation_preserves_length() {
        let v = Vector2D::new(3.0, -4.0);
        for degrees in [-170.0, -30.0, 0.0, 45.0, 359.0] {
            assert_abs_diff_eq!(v.rotate_degrees(degrees).length(), 5.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn heading_zero_points_down_the_y_axis() {
        assert_eq!(Vector2D::from_heading(0.0), Vector2D::new(0.0, 1.0));
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Vector2D::new(1.0, 1.0);
        let b = Vector2D::new(4.0, 5.0);
        assert_abs_diff_eq!(a.distance_to(b), 5.0);
        assert_abs_diff_eq!(b.distance_to(a), 5.0);
    }
}
