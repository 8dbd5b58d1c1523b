//! Page-level driver. Owns the page, the scheduler and whichever of the
//! four decorations the page supports, and routes events and due
//! frames/timers to them.

use crate::burger::BurgerMenu;
use crate::config::SiteConfig;
use crate::nav::NavFade;
use crate::orbit::Orbit;
use crate::page::{ElementId, Page, Tag};
use crate::schedule::{FrameQueue, FrameTarget, TimerTarget, Timers};
use crate::stars::StarField;
use crate::timing::Debounce;
use std::time::Duration;

/// Quiet period after the last resize before anything is rebuilt.
pub const RESIZE_SETTLE: Duration = Duration::from_millis(150);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SiteEvent {
    Resize { width: u32, height: u32 },
    Visibility { hidden: bool },
    Scroll { y: f32 },
    PointerEnter(ElementId),
    PointerLeave(ElementId),
    Click(ElementId),
    TouchStart(ElementId),
    /// Release of the current touch, delivered to wherever it started.
    TouchEnd,
}

pub struct Site {
    page: Page,
    frames: FrameQueue,
    timers: Timers,
    stars: Option<StarField>,
    orbit: Option<Orbit>,
    nav: Option<NavFade>,
    burger: Option<BurgerMenu>,
    resize: Debounce,
    touch_origin: Option<(ElementId, bool)>,
}

impl Site {
    /// Attach every decoration the page has markup for and start the
    /// animation loops.
    pub fn boot(mut page: Page, config: &SiteConfig) -> Self {
        let stars = StarField::attach(&mut page, config.stars.clone());
        let orbit = Orbit::attach(&page, config.orbit.clone());
        let nav = NavFade::attach(&page);
        let burger = BurgerMenu::attach(&page);
        tracing::info!(
            stars = stars.is_some(),
            orbit = orbit.is_some(),
            nav = nav.is_some(),
            burger = burger.is_some(),
            "page decorations attached"
        );

        let mut site = Self {
            page,
            frames: FrameQueue::new(),
            timers: Timers::new(),
            stars,
            orbit,
            nav,
            burger,
            resize: Debounce::new(TimerTarget::ResizeSettled, RESIZE_SETTLE),
            touch_origin: None,
        };
        if !site.page.window.hidden {
            site.start_loops();
        }
        site
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn stars(&self) -> Option<&StarField> {
        self.stars.as_ref()
    }

    pub fn orbit(&self) -> Option<&Orbit> {
        self.orbit.as_ref()
    }

    pub fn nav(&self) -> Option<&NavFade> {
        self.nav.as_ref()
    }

    pub fn burger(&self) -> Option<&BurgerMenu> {
        self.burger.as_ref()
    }

    pub fn frames(&self) -> &FrameQueue {
        &self.frames
    }

    /// Earliest pending timer, so the caller can sleep until it.
    pub fn next_timer(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    /// Destination picked since the last call, if any.
    pub fn take_navigation(&mut self) -> Option<String> {
        self.page.take_location()
    }

    pub fn dispatch(&mut self, event: SiteEvent, now: Duration) {
        match event {
            SiteEvent::Resize { width, height } => {
                self.page.window.inner_width = width;
                self.page.window.inner_height = height;
                self.resize.call(&mut self.timers, now);
            }
            SiteEvent::Visibility { hidden } => self.set_hidden(hidden),
            SiteEvent::Scroll { y } => {
                if self.page.scroll_locked() {
                    return;
                }
                self.page.window.scroll_y = y.max(0.0);
                if let Some(nav) = &mut self.nav {
                    nav.on_scroll(&mut self.frames);
                }
            }
            SiteEvent::PointerEnter(el) => {
                if let Some(orbit) = &mut self.orbit {
                    orbit.pointer_enter(el, &mut self.page, &mut self.timers, now);
                }
            }
            SiteEvent::PointerLeave(el) => {
                if let Some(orbit) = &mut self.orbit {
                    orbit.pointer_leave(el, &mut self.page, &mut self.timers);
                }
            }
            SiteEvent::Click(el) => self.click(el),
            SiteEvent::TouchStart(el) => {
                let consumed = match &mut self.orbit {
                    Some(orbit) => orbit.touch_start(el, &mut self.page, &mut self.timers, now),
                    None => false,
                };
                self.touch_origin = Some((el, consumed));
            }
            SiteEvent::TouchEnd => {
                let Some((el, consumed)) = self.touch_origin.take() else {
                    return;
                };
                if let Some(orbit) = &mut self.orbit {
                    orbit.touch_end(el, &mut self.page, &mut self.timers);
                }
                // a press nobody claimed turns into an ordinary click
                if !consumed {
                    self.click(el);
                }
            }
        }
    }

    /// Fire due timers, then run one animation frame. A hidden page keeps
    /// its frame requests queued until it is visible again.
    pub fn advance(&mut self, now: Duration) {
        for (handle, target) in self.timers.take_due(now) {
            match target {
                TimerTarget::ResizeSettled => {
                    if self.resize.claim(handle) {
                        self.resize_settled();
                    }
                }
                TimerTarget::HoverSlowdown => {
                    if let Some(orbit) = &mut self.orbit {
                        orbit.on_timer(handle);
                    }
                }
            }
        }

        if self.page.window.hidden {
            return;
        }
        for (handle, target) in self.frames.take_pending() {
            match target {
                FrameTarget::Stars => {
                    if let Some(stars) = &mut self.stars {
                        stars.on_frame(handle, &mut self.page, &mut self.frames, now);
                    }
                }
                FrameTarget::Orbit => {
                    if let Some(orbit) = &mut self.orbit {
                        orbit.on_frame(handle, &mut self.page, &mut self.frames, now);
                    }
                }
                FrameTarget::Nav => {
                    if let Some(nav) = &mut self.nav {
                        nav.on_frame(handle, &mut self.page);
                    }
                }
            }
        }
    }

    fn click(&mut self, el: ElementId) {
        if let Some(burger) = &mut self.burger {
            burger.click(el, &mut self.page);
        }
        if let Some(orbit) = &mut self.orbit {
            if orbit.click(el, &mut self.page) {
                return;
            }
        }
        // default action of a link
        let href = self
            .page
            .closest(el, |e| e.tag() == Tag::Anchor)
            .and_then(|link| self.page.element(link).href().map(str::to_string));
        if let Some(href) = href {
            self.page.navigate(&href);
        }
    }

    fn set_hidden(&mut self, hidden: bool) {
        if self.page.window.hidden == hidden {
            return;
        }
        self.page.window.hidden = hidden;
        if hidden {
            self.stop_loops();
        } else {
            self.start_loops();
        }
        tracing::debug!(hidden, "page visibility changed");
    }

    fn start_loops(&mut self) {
        if let Some(stars) = &mut self.stars {
            stars.start(&mut self.frames);
        }
        if let Some(orbit) = &mut self.orbit {
            orbit.start(&mut self.frames);
        }
    }

    fn stop_loops(&mut self) {
        if let Some(stars) = &mut self.stars {
            stars.stop(&mut self.frames);
        }
        if let Some(orbit) = &mut self.orbit {
            orbit.stop(&mut self.frames);
        }
    }

    fn resize_settled(&mut self) {
        if let Some(stars) = &mut self.stars {
            stars.resize(&mut self.page);
        }
        if let Some(orbit) = &mut self.orbit {
            orbit.resize(&self.page);
        }
    }
}
