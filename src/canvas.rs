/// Colour with straight alpha, as a 2d context `fillStyle` would take it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOp {
    Clear,
    Circle { x: f32, y: f32, radius: f32, color: Rgba },
}

/// Recording drawing surface. Each frame the owner clears it and records
/// fresh ops; a renderer replays whatever is present.
#[derive(Debug, Default)]
pub struct Canvas {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Setting the backing size wipes the surface, same as assigning
    /// `canvas.width` in a browser.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.ops.clear();
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
    }

    pub fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        self.ops.push(DrawOp::Circle {
            x,
            y,
            radius,
            color,
        });
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn circles(&self) -> impl Iterator<Item = (f32, f32, f32, Rgba)> + '_ {
        self.ops.iter().filter_map(|op| match *op {
            DrawOp::Circle {
                x,
                y,
                radius,
                color,
            } => Some((x, y, radius, color)),
            DrawOp::Clear => None,
        })
    }
}
