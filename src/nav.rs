use crate::page::{ElementId, Page};
use crate::schedule::{FrameHandle, FrameQueue, FrameTarget};
use crate::timing::FrameThrottle;

pub const NAV_LINKS_CLASS: &str = "links";
pub const NAV_TITLE_CLASS: &str = "title";
pub const NAV_HIDDEN_CLASS: &str = "nav-hidden";
/// Scroll offset in px past which the nav fades out.
pub const FADE_AFTER: f32 = 80.0;

pub struct NavFade {
    links: Option<ElementId>,
    title: Option<ElementId>,
    throttle: FrameThrottle,
    faded: bool,
}

impl NavFade {
    pub fn attach(page: &Page) -> Option<Self> {
        let links = page.query_class(NAV_LINKS_CLASS);
        let title = page.query_class(NAV_TITLE_CLASS);
        if links.is_none() && title.is_none() {
            return None;
        }
        Some(Self {
            links,
            title,
            throttle: FrameThrottle::new(FrameTarget::Nav),
            faded: false,
        })
    }

    pub fn is_faded(&self) -> bool {
        self.faded
    }

    /// Scroll listener body: defer the update to the next frame.
    pub fn on_scroll(&mut self, frames: &mut FrameQueue) {
        self.throttle.schedule(frames);
    }

    pub fn on_frame(&mut self, handle: FrameHandle, page: &mut Page) {
        if self.throttle.claim(handle) {
            self.update(page);
        }
    }

    fn update(&mut self, page: &mut Page) {
        let faded = page.window.scroll_y > FADE_AFTER;
        for el in [self.links, self.title].into_iter().flatten() {
            page.toggle_class(el, NAV_HIDDEN_CLASS, faded);
        }
        if faded != self.faded {
            tracing::debug!(faded, scroll_y = page.window.scroll_y, "nav fade changed");
            self.faded = faded;
        }
    }
}
