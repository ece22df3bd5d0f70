#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }

    /// A circle of radius `r` at the origin, ready to be positioned by [`crate::pack_siblings`].
    pub fn with_radius(r: f64) -> Self {
        Self { x: 0.0, y: 0.0, r }
    }

    pub fn distance_to(&self, other: &Circle) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether `other` lies entirely inside `self`, up to `epsilon` of slack.
    pub fn contains(&self, other: &Circle, epsilon: f64) -> bool {
        self.distance_to(other) + other.r <= self.r + epsilon
    }

    /// Whether the two discs overlap by more than `epsilon`.
    pub fn overlaps(&self, other: &Circle, epsilon: f64) -> bool {
        self.distance_to(other) + epsilon < self.r + other.r
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}
