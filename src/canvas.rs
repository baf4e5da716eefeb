//! Drawing surfaces.
//!
//! [`Canvas`] is the small set of primitives the render pass needs. The
//! crate ships one implementation, [`DrawList`], which records a frame as
//! shapes. The GPU presenter turns each recorded shape into one instance of
//! its shape pipeline, so rasterization, blending and the trail fade all
//! happen on the GPU.

use glam::Vec2;

/// Straight-alpha color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Convert HSV (all components 0.0-1.0) to an opaque color.
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let c = v * s;
        let h = h.rem_euclid(1.0) * 6.0;
        let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
        let m = v - c;

        let (r, g, b) = if h < 1.0 {
            (c, x, 0.0)
        } else if h < 2.0 {
            (x, c, 0.0)
        } else if h < 3.0 {
            (0.0, c, x)
        } else if h < 4.0 {
            (0.0, x, c)
        } else if h < 5.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };

        Rgba::rgb(r + m, g + m, b + m)
    }

    /// Linear blend; `t = 0` gives `self`, `t = 1` gives `other`.
    pub fn lerp(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Rgba::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Drawing context the render pass draws into.
pub trait Canvas {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Start a new frame by replacing every pixel with `color`.
    fn fill(&mut self, color: Rgba);

    /// Start a new frame by blending `color` over the previous one at
    /// `alpha`, leaving a fading trail.
    fn fade(&mut self, color: Rgba, alpha: f32);

    fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Rgba);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba);

    /// Ellipse with semi-axes `radii`, rotated by `rotation` radians.
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Rgba);

    fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Rgba);
}

/// One primitive, in canvas pixels with a top-left origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Rect { min: Vec2, max: Vec2 },
    Disc { center: Vec2, radius: f32 },
    Ring { center: Vec2, radius: f32, width: f32 },
    Ellipse { center: Vec2, radii: Vec2, rotation: f32 },
    Triangle { points: [Vec2; 3] },
}

impl Shape {
    /// Axis-aligned bounds, including the half-pixel antialiasing fringe.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let fringe = Vec2::splat(1.0);
        match *self {
            Shape::Rect { min, max } => (min, max),
            Shape::Disc { center, radius } => {
                let r = Vec2::splat(radius) + fringe;
                (center - r, center + r)
            }
            Shape::Ring {
                center,
                radius,
                width,
            } => {
                let r = Vec2::splat(radius + width * 0.5) + fringe;
                (center - r, center + r)
            }
            Shape::Ellipse {
                center,
                radii,
                rotation,
            } => {
                let axis = Vec2::from_angle(rotation);
                let extent = Vec2::new(
                    ((radii.x * axis.x).powi(2) + (radii.y * axis.y).powi(2)).sqrt(),
                    ((radii.x * axis.y).powi(2) + (radii.y * axis.x).powi(2)).sqrt(),
                ) + fringe;
                (center - extent, center + extent)
            }
            Shape::Triangle { points: [a, b, c] } => {
                (a.min(b).min(c) - fringe, a.max(b).max(c) + fringe)
            }
        }
    }

    /// Whether the shape would cover anything at all.
    fn is_drawable(&self) -> bool {
        match *self {
            Shape::Rect { min, max } => {
                min.is_finite() && max.is_finite() && max.x > min.x && max.y > min.y
            }
            Shape::Disc { center, radius } => center.is_finite() && radius > 0.0,
            Shape::Ring {
                center,
                radius,
                width,
            } => center.is_finite() && radius > 0.0 && width > 0.0,
            Shape::Ellipse {
                center,
                radii,
                rotation,
            } => center.is_finite() && rotation.is_finite() && radii.x > 0.0 && radii.y > 0.0,
            Shape::Triangle { points: [a, b, c] } => {
                a.is_finite()
                    && b.is_finite()
                    && c.is_finite()
                    && (b - a).perp_dot(c - a).abs() > f32::EPSILON
            }
        }
    }
}

/// A recorded shape and its straight-alpha color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    pub shape: Shape,
    pub color: Rgba,
}

/// How a frame treats the one before it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Backdrop {
    /// Overwrite with an opaque color.
    Clear(Rgba),
    /// Blend this color, at its alpha, over the previous frame.
    Fade(Rgba),
}

/// One frame of shapes, drawn in order.
///
/// `fill` and `fade` start a new frame and drop the previous shapes. Shapes
/// that are degenerate, non-finite or entirely off the canvas are never
/// recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawList {
    width: u32,
    height: u32,
    backdrop: Option<Backdrop>,
    items: Vec<DrawItem>,
}

impl DrawList {
    /// An empty frame; nothing is cleared until the first `fill` or `fade`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            backdrop: None,
            items: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn backdrop(&self) -> Option<Backdrop> {
        self.backdrop
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn begin(&mut self, backdrop: Backdrop) {
        self.backdrop = Some(backdrop);
        self.items.clear();
    }

    fn push(&mut self, shape: Shape, color: Rgba) {
        if !shape.is_drawable() || color.a <= 0.0 {
            return;
        }
        let (min, max) = shape.bounds();
        if max.x < 0.0 || max.y < 0.0 || min.x > self.width as f32 || min.y > self.height as f32 {
            return;
        }
        self.items.push(DrawItem { shape, color });
    }
}

impl Canvas for DrawList {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill(&mut self, color: Rgba) {
        self.begin(Backdrop::Clear(color.with_alpha(1.0)));
    }

    fn fade(&mut self, color: Rgba, alpha: f32) {
        self.begin(Backdrop::Fade(color.with_alpha(alpha.clamp(0.0, 1.0))));
    }

    fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Rgba) {
        self.push(Shape::Rect { min, max }, color);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.push(Shape::Disc { center, radius }, color);
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        self.push(
            Shape::Ring {
                center,
                radius,
                width,
            },
            color,
        );
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Rgba) {
        self.push(
            Shape::Ellipse {
                center,
                radii,
                rotation,
            },
            color,
        );
    }

    fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Rgba) {
        self.push(Shape::Triangle { points: [a, b, c] }, color);
    }
}
