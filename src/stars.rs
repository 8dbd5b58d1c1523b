use crate::canvas::Rgba;
use crate::page::{ElementId, Page};
use crate::schedule::{FrameHandle, FrameLoop, FrameQueue, FrameTarget, Tick};
use noise::{NoiseFn, Perlin};
use std::f32::consts::TAU;
use std::time::Duration;

pub const STAR_CANVAS_ID: &str = "starCanvas";
pub const DEFAULT_STAR_COUNT: usize = 100;
/// Upper bound on the full velocity range per axis, px per frame.
pub const DEFAULT_DRIFT_SPEED: f32 = 0.012;

const STAR_COLOR: (u8, u8, u8) = (200, 230, 255);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Twinkle {
    /// Constant opacity per star
    #[default]
    Off,
    /// Sinusoidal flicker with a per-star phase and frequency
    Sine,
    /// Perlin-noise flicker, less regular than `sine`
    Shimmer,
}

#[derive(Clone, Debug)]
pub struct StarFieldConfig {
    pub count: usize,
    pub speed: f32,
    pub twinkle: Twinkle,
    pub seed: Option<u64>,
}

impl Default for StarFieldConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_STAR_COUNT,
            speed: DEFAULT_DRIFT_SPEED,
            twinkle: Twinkle::Off,
            seed: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub alpha: f32,
    pub twinkle_amp: f32,
    pub twinkle_phase: f32,
    pub twinkle_freq: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Star {
    fn random(rng: &mut fastrand::Rng, width: f32, height: f32, speed: f32) -> Self {
        Self {
            x: rng.f32() * width,
            y: rng.f32() * height,
            radius: rng.f32() + 0.3,
            alpha: rng.f32() * 0.5 + 0.1,
            twinkle_amp: rng.f32() * 0.3,
            twinkle_phase: rng.f32() * TAU,
            twinkle_freq: 0.5 + rng.f32() * 1.5,
            dx: (rng.f32() - 0.5) * speed,
            dy: (rng.f32() - 0.5) * speed,
        }
    }

    fn advance(&mut self, width: f32, height: f32) {
        self.x = wrap(self.x, self.dx, width);
        self.y = wrap(self.y, self.dy, height);
    }
}

/// Toroidal step: `(p + d + extent) mod extent`, always in `[0, extent)`.
pub fn wrap(p: f32, d: f32, extent: f32) -> f32 {
    if !(extent.is_finite() && extent > 0.0) {
        return 0.0;
    }
    let next = (p + d + extent).rem_euclid(extent);
    if !next.is_finite() {
        // a non-finite step leaves the star where it was
        return if (0.0..extent).contains(&p) { p } else { 0.0 };
    }
    // rem_euclid can round up to exactly `extent`
    if next >= extent { 0.0 } else { next }
}

pub struct StarField {
    canvas: ElementId,
    config: StarFieldConfig,
    rng: fastrand::Rng,
    perlin: Perlin,
    stars: Vec<Star>,
    width: f32,
    height: f32,
    frame_loop: FrameLoop,
}

impl StarField {
    /// Bind to the page's star canvas, sized to the window and populated.
    /// Pages without the canvas get `None`.
    pub fn attach(page: &mut Page, config: StarFieldConfig) -> Option<Self> {
        let canvas = page.get_by_id(STAR_CANVAS_ID)?;
        page.element(canvas).canvas()?;

        let mut rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let perlin = Perlin::new(rng.u32(..));

        let mut field = Self {
            canvas,
            config,
            rng,
            perlin,
            stars: Vec::new(),
            width: 0.0,
            height: 0.0,
            frame_loop: FrameLoop::new(FrameTarget::Stars),
        };
        field.resize(page);
        Some(field)
    }

    /// Match the canvas to the window and throw away the current stars.
    pub fn resize(&mut self, page: &mut Page) {
        let (width, height) = (page.window.inner_width, page.window.inner_height);
        if let Some(canvas) = page.canvas_mut(self.canvas) {
            canvas.resize(width, height);
        }
        self.width = width as f32;
        self.height = height as f32;
        self.populate();
        tracing::debug!(width, height, count = self.stars.len(), "star field regenerated");
    }

    fn populate(&mut self) {
        let (width, height, speed) = (self.width, self.height, self.config.speed);
        let rng = &mut self.rng;
        self.stars = (0..self.config.count)
            .map(|_| Star::random(rng, width, height, speed))
            .collect();
    }

    pub fn start(&mut self, frames: &mut FrameQueue) -> bool {
        self.frame_loop.start(frames)
    }

    pub fn stop(&mut self, frames: &mut FrameQueue) -> bool {
        self.frame_loop.stop(frames)
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        page: &mut Page,
        frames: &mut FrameQueue,
        now: Duration,
    ) {
        if self.frame_loop.claim(handle) {
            let tick = self.tick(page, now);
            self.frame_loop.finish(frames, tick);
        }
    }

    /// Draw every star at its current spot, then move it one step.
    pub fn tick(&mut self, page: &mut Page, now: Duration) -> Tick {
        if page.window.hidden {
            return Tick::Halt;
        }
        let Some(canvas) = page.canvas_mut(self.canvas) else {
            return Tick::Halt;
        };

        let t = now.as_secs_f32();
        canvas.clear();
        for star in &mut self.stars {
            let alpha = display_alpha(star, self.config.twinkle, &self.perlin, t);
            let (r, g, b) = STAR_COLOR;
            canvas.fill_circle(star.x, star.y, star.radius, Rgba::new(r, g, b, alpha));
            star.advance(self.width, self.height);
        }
        Tick::Continue
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

fn display_alpha(star: &Star, twinkle: Twinkle, perlin: &Perlin, t: f32) -> f32 {
    let wobble = match twinkle {
        Twinkle::Off => 0.0,
        Twinkle::Sine => (t * star.twinkle_freq + star.twinkle_phase).sin(),
        Twinkle::Shimmer => {
            perlin.get([star.twinkle_phase as f64, (t * star.twinkle_freq) as f64]) as f32
        }
    };
    (star.alpha + star.twinkle_amp * wobble).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Tag, Window};

    fn page(width: u32, height: u32) -> Page {
        let mut page = Page::new(Window::new(width, height));
        page.append(None, Tag::Canvas).id(STAR_CANVAS_ID).finish();
        page
    }

    fn seeded(twinkle: Twinkle) -> StarFieldConfig {
        StarFieldConfig {
            twinkle,
            seed: Some(7),
            ..StarFieldConfig::default()
        }
    }

    fn in_bounds(field: &StarField) -> bool {
        let (w, h) = field.bounds();
        field
            .stars()
            .iter()
            .all(|s| (0.0..w).contains(&s.x) && (0.0..h).contains(&s.y))
    }

    #[test]
    fn missing_canvas_is_a_no_op() {
        let mut page = Page::new(Window::new(800, 600));
        assert!(StarField::attach(&mut page, StarFieldConfig::default()).is_none());

        // an element with the id but no drawing surface does not count
        page.append(None, Tag::Div).id(STAR_CANVAS_ID).finish();
        assert!(StarField::attach(&mut page, StarFieldConfig::default()).is_none());
    }

    #[test]
    fn attach_populates_within_viewport() {
        let mut page = page(1024, 768);
        let field = StarField::attach(&mut page, seeded(Twinkle::Off)).unwrap();
        assert_eq!(field.stars().len(), DEFAULT_STAR_COUNT);
        assert!(in_bounds(&field));
        for star in field.stars() {
            assert!((0.3..1.3).contains(&star.radius));
            assert!((0.1..0.6).contains(&star.alpha));
            assert!(star.dx.abs() <= DEFAULT_DRIFT_SPEED / 2.0);
            assert!(star.dy.abs() <= DEFAULT_DRIFT_SPEED / 2.0);
        }
    }

    #[test]
    fn resize_regenerates_for_new_bounds() {
        let mut page = page(1920, 1080);
        let mut field = StarField::attach(&mut page, seeded(Twinkle::Off)).unwrap();

        for (w, h) in [(320, 480), (1024, 768), (1, 1)] {
            page.window.inner_width = w;
            page.window.inner_height = h;
            field.resize(&mut page);
            assert_eq!(field.stars().len(), DEFAULT_STAR_COUNT);
            assert_eq!(field.bounds(), (w as f32, h as f32));
            assert!(in_bounds(&field));
        }
        let canvas = page.get_by_id(STAR_CANVAS_ID).unwrap();
        assert_eq!(page.element(canvas).canvas().unwrap().width(), 1);
    }

    #[test]
    fn wrap_matches_modular_formula() {
        let w = 1024.0;
        assert_eq!(wrap(10.0, 0.5, w), 10.5);
        assert!((wrap(1023.995, 0.006, w) - 0.001).abs() < 1e-3);
        assert!((wrap(0.002, -0.006, w) - 1023.996).abs() < 1e-3);
        assert_eq!(wrap(5.0, 1.0, 0.0), 0.0);
        for (p, d) in [(0.0, -0.006), (1023.999, 0.006), (512.0, 0.0)] {
            let next = wrap(p, d, w);
            assert!((0.0..w).contains(&next));
            assert!((next - (p + d + w) % w).abs() < 1e-3);
        }
    }

    #[test]
    fn ticks_keep_every_star_on_the_torus() {
        let mut page = page(64, 48);
        let config = StarFieldConfig {
            speed: 40.0,
            ..seeded(Twinkle::Off)
        };
        let mut field = StarField::attach(&mut page, config).unwrap();
        for frame in 0..500 {
            assert_eq!(field.tick(&mut page, Duration::from_millis(frame * 16)), Tick::Continue);
            assert!(in_bounds(&field));
        }
    }

    #[test]
    fn non_finite_steps_stay_on_the_torus() {
        let w = 800.0;
        assert_eq!(wrap(10.0, f32::INFINITY, w), 10.0);
        assert_eq!(wrap(10.0, f32::NAN, w), 10.0);
        assert_eq!(wrap(f32::NAN, 1.0, w), 0.0);
        assert_eq!(wrap(10.0, 1.0, f32::INFINITY), 0.0);

        let mut page = page(800, 600);
        let config = StarFieldConfig {
            speed: f32::INFINITY,
            ..seeded(Twinkle::Off)
        };
        let mut field = StarField::attach(&mut page, config).unwrap();
        for frame in 0..3 {
            field.tick(&mut page, Duration::from_millis(frame * 16));
            assert!(in_bounds(&field));
        }
    }

    #[test]
    fn tick_draws_one_circle_per_star() {
        let mut page = page(800, 600);
        let mut field = StarField::attach(&mut page, seeded(Twinkle::Sine)).unwrap();
        field.tick(&mut page, Duration::from_millis(16));

        let canvas = page.get_by_id(STAR_CANVAS_ID).unwrap();
        let surface = page.element(canvas).canvas().unwrap();
        assert_eq!(surface.circles().count(), DEFAULT_STAR_COUNT);
        assert!(surface.circles().all(|(_, _, _, c)| (0.0..=1.0).contains(&c.a)));
    }

    #[test]
    fn twinkle_off_uses_base_alpha() {
        let perlin = Perlin::new(1);
        let star = Star {
            x: 0.0,
            y: 0.0,
            radius: 1.0,
            alpha: 0.4,
            twinkle_amp: 0.3,
            twinkle_phase: 1.0,
            twinkle_freq: 1.0,
            dx: 0.0,
            dy: 0.0,
        };
        assert_eq!(display_alpha(&star, Twinkle::Off, &perlin, 3.0), 0.4);
        let sine = display_alpha(&star, Twinkle::Sine, &perlin, 3.0);
        assert!((sine - (0.4 + 0.3 * 4.0f32.sin())).abs() < 1e-6);
        let shimmer = display_alpha(&star, Twinkle::Shimmer, &perlin, 3.0);
        assert!((0.0..=1.0).contains(&shimmer));
    }

    #[test]
    fn hidden_page_halts_the_loop() {
        let mut page = page(800, 600);
        let mut field = StarField::attach(&mut page, seeded(Twinkle::Off)).unwrap();
        let mut frames = FrameQueue::new();
        field.start(&mut frames);

        page.window.hidden = true;
        let (handle, _) = frames.take_pending()[0];
        field.on_frame(handle, &mut page, &mut frames, Duration::from_millis(16));
        assert!(frames.is_empty());
        assert!(!field.is_running());
    }
}
