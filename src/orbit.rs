use crate::page::{ElementId, Page, Transform};
use crate::phrases::phrase_for;
use crate::schedule::{FrameHandle, FrameLoop, FrameQueue, FrameTarget, Tick, TimerHandle, TimerTarget, Timers};
use std::time::Duration;

pub const SATELLITE_CLASS: &str = "satellite";
pub const SATELLITE_TEXT_CLASS: &str = "satellite-text";
pub const CENTER_TEXT_ID: &str = "centerText";
pub const SHOW_CLASS: &str = "show";
pub const ANGLE_OFFSET_KEY: &str = "angle-offset";
pub const HREF_KEY: &str = "href";

/// One revolution every 15 seconds.
pub const BASE_SPEED: f32 = 360.0 / 15.0;
pub const HOVER_SLOWDOWN_DELAY: Duration = Duration::from_millis(2000);
/// Longest step a single frame may simulate.
pub const MAX_FRAME_STEP: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeedTier {
    Base,
    Slow,
    VerySlow,
}

impl SpeedTier {
    pub fn degrees_per_sec(self) -> f32 {
        match self {
            SpeedTier::Base => BASE_SPEED,
            SpeedTier::Slow => BASE_SPEED / 1.67,
            SpeedTier::VerySlow => BASE_SPEED / 2.67,
        }
    }
}

/// Orbit radius in px for a viewport width.
pub fn radius_for_width(width: u32) -> f32 {
    match width {
        0..=480 => 130.0,
        481..=768 => 150.0,
        _ => 250.0,
    }
}

/// How satellites react to press/release on `(hover: none)` devices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TouchBehavior {
    /// Navigate as soon as the satellite is pressed, no reveal
    NavigateOnPress,
    /// Press reveals and slows down, release navigates
    #[default]
    RevealThenNavigate,
    /// Like reveal-then-navigate, but release restores speed and hides the
    /// text before navigating
    RevealRestoreThenNavigate,
}

#[derive(Clone, Debug, Default)]
pub struct OrbitConfig {
    pub touch: TouchBehavior,
}

#[derive(Debug)]
struct Satellite {
    element: ElementId,
    label_el: Option<ElementId>,
    label: String,
    href: Option<String>,
    angle: f32,
}

pub struct Orbit {
    satellites: Vec<Satellite>,
    center_text: Option<ElementId>,
    config: OrbitConfig,
    speed: SpeedTier,
    radius: f32,
    last_frame: Option<Duration>,
    hover_timer: Option<TimerHandle>,
    frame_loop: FrameLoop,
}

impl Orbit {
    /// `None` when the page has no satellites.
    pub fn attach(page: &Page, config: OrbitConfig) -> Option<Self> {
        let satellites: Vec<Satellite> = page
            .query_all_class(SATELLITE_CLASS)
            .into_iter()
            .map(|element| {
                let el = page.element(element);
                let label_el = page.find_descendant_class(element, SATELLITE_TEXT_CLASS);
                let offset = el
                    .data(ANGLE_OFFSET_KEY)
                    .and_then(|v| v.trim().parse::<f32>().ok())
                    .filter(|v| v.is_finite())
                    .unwrap_or(0.0);
                Satellite {
                    element,
                    label_el,
                    label: label_el
                        .map(|l| page.element(l).text().to_string())
                        .unwrap_or_default(),
                    href: el.data(HREF_KEY).filter(|h| !h.is_empty()).map(str::to_string),
                    angle: wrap_degrees(offset),
                }
            })
            .collect();
        if satellites.is_empty() {
            return None;
        }

        tracing::debug!(count = satellites.len(), "orbit attached");
        Some(Self {
            satellites,
            center_text: page.get_by_id(CENTER_TEXT_ID),
            config,
            speed: SpeedTier::Base,
            radius: radius_for_width(page.window.inner_width),
            last_frame: None,
            hover_timer: None,
            frame_loop: FrameLoop::new(FrameTarget::Orbit),
        })
    }

    pub fn speed(&self) -> SpeedTier {
        self.speed
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn angles(&self) -> impl Iterator<Item = f32> + '_ {
        self.satellites.iter().map(|s| s.angle)
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    /// Start (or resume) the loop. The first tick after a real start moves
    /// nothing, so time spent stopped is never simulated.
    pub fn start(&mut self, frames: &mut FrameQueue) -> bool {
        let started = self.frame_loop.start(frames);
        if started {
            self.last_frame = None;
        }
        started
    }

    pub fn stop(&mut self, frames: &mut FrameQueue) -> bool {
        self.frame_loop.stop(frames)
    }

    pub fn resize(&mut self, page: &Page) {
        self.radius = radius_for_width(page.window.inner_width);
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

    pub fn tick(&mut self, page: &mut Page, now: Duration) -> Tick {
        if page.window.hidden {
            return Tick::Halt;
        }
        let delta = match self.last_frame {
            Some(last) => now.saturating_sub(last).min(MAX_FRAME_STEP),
            None => Duration::ZERO,
        };
        self.last_frame = Some(now);

        let step = self.speed.degrees_per_sec() * delta.as_secs_f32();
        for sat in &mut self.satellites {
            sat.angle = wrap_degrees(sat.angle + step);
            page.set_transform(
                sat.element,
                Transform {
                    rotate_deg: sat.angle,
                    translate_x: self.radius,
                },
            );
            if let Some(label) = sat.label_el {
                page.set_transform(
                    label,
                    Transform {
                        rotate_deg: -sat.angle,
                        translate_x: 0.0,
                    },
                );
            }
        }
        Tick::Continue
    }

    /// Index of the satellite `el` belongs to, if any.
    fn satellite_of(&self, page: &Page, el: ElementId) -> Option<usize> {
        let sat = page.closest(el, |e| e.has_class(SATELLITE_CLASS))?;
        self.satellites.iter().position(|s| s.element == sat)
    }

    /// Interactions need somewhere to show the phrase.
    fn interactive(&self) -> Option<ElementId> {
        self.center_text
    }

    pub fn pointer_enter(&mut self, el: ElementId, page: &mut Page, timers: &mut Timers, now: Duration) {
        if page.window.hover_none {
            return;
        }
        if let Some(index) = self.satellite_of(page, el) {
            self.reveal(index, page, timers, now);
        }
    }

    pub fn pointer_leave(&mut self, el: ElementId, page: &mut Page, timers: &mut Timers) {
        if page.window.hover_none {
            return;
        }
        if self.satellite_of(page, el).is_some() {
            self.conceal(page, timers);
        }
    }

    /// Returns true when the click was a satellite navigation.
    pub fn click(&mut self, el: ElementId, page: &mut Page) -> bool {
        if page.window.hover_none || self.interactive().is_none() {
            return false;
        }
        match self.satellite_of(page, el) {
            Some(index) => {
                self.navigate(index, page);
                true
            }
            None => false,
        }
    }

    /// Returns true when the press was consumed by a satellite, which
    /// suppresses the synthetic click a release would otherwise produce.
    pub fn touch_start(&mut self, el: ElementId, page: &mut Page, timers: &mut Timers, now: Duration) -> bool {
        if self.interactive().is_none() {
            return false;
        }
        let Some(index) = self.satellite_of(page, el) else {
            return false;
        };
        match self.config.touch {
            TouchBehavior::NavigateOnPress => self.navigate(index, page),
            TouchBehavior::RevealThenNavigate | TouchBehavior::RevealRestoreThenNavigate => {
                self.reveal(index, page, timers, now)
            }
        }
        true
    }

    pub fn touch_end(&mut self, el: ElementId, page: &mut Page, timers: &mut Timers) {
        if self.interactive().is_none() {
            return;
        }
        let Some(index) = self.satellite_of(page, el) else {
            return;
        };
        match self.config.touch {
            TouchBehavior::NavigateOnPress => {}
            TouchBehavior::RevealThenNavigate => self.navigate(index, page),
            TouchBehavior::RevealRestoreThenNavigate => {
                self.conceal(page, timers);
                self.navigate(index, page);
            }
        }
    }

    pub fn on_timer(&mut self, handle: TimerHandle) {
        if self.hover_timer == Some(handle) {
            self.hover_timer = None;
            self.speed = SpeedTier::VerySlow;
            tracing::trace!("orbit slowed further after sustained hover");
        }
    }

    fn reveal(&mut self, index: usize, page: &mut Page, timers: &mut Timers, now: Duration) {
        let Some(center) = self.interactive() else {
            return;
        };
        self.clear_hover_timer(timers);
        self.speed = SpeedTier::Slow;
        page.set_text(center, phrase_for(&self.satellites[index].label));
        page.restart_transition(center);
        page.toggle_class(center, SHOW_CLASS, true);
        self.hover_timer = Some(timers.set(TimerTarget::HoverSlowdown, now, HOVER_SLOWDOWN_DELAY));
    }

    fn conceal(&mut self, page: &mut Page, timers: &mut Timers) {
        let Some(center) = self.interactive() else {
            return;
        };
        self.clear_hover_timer(timers);
        self.speed = SpeedTier::Base;
        page.toggle_class(center, SHOW_CLASS, false);
        page.set_text(center, "");
        page.restart_transition(center);
    }

    fn clear_hover_timer(&mut self, timers: &mut Timers) {
        if let Some(timer) = self.hover_timer.take() {
            timers.clear(timer);
        }
    }

    fn navigate(&self, index: usize, page: &mut Page) {
        if let Some(href) = &self.satellites[index].href {
            tracing::info!(href = %href, label = %self.satellites[index].label, "satellite selected");
            page.navigate(href);
        }
    }
}

fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
