//! Maps terminal input onto page events and keeps a tiny navigation
//! history, so following a satellite or menu link swaps pages.

use crate::burger::BURGER_BUTTON_ID;
use crate::config::SiteConfig;
use crate::layout::{self, HOME_HREF};
use crate::page::{ElementId, Window};
use crate::render::{viewport_for, Renderer};
use crate::site::{Site, SiteEvent};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::time::{Duration, Instant};

pub const SCROLL_STEP: f32 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Screen geometry or page changed; clear before the next draw.
    Redraw,
    Quit,
}

pub struct Browser {
    config: SiteConfig,
    touch: bool,
    size: (u16, u16),
    location: String,
    history: Vec<String>,
    site: Site,
    loaded: Instant,
    hovered: Option<ElementId>,
    /// Cell the mouse was last seen over.
    pointer: Option<(u16, u16)>,
}

impl Browser {
    pub fn new(config: SiteConfig, touch: bool, size: (u16, u16)) -> Self {
        let location = HOME_HREF.to_string();
        let site = Self::load(&location, &config, touch, size);
        Self {
            config,
            touch,
            size,
            location,
            history: Vec::new(),
            site,
            loaded: Instant::now(),
            hovered: None,
            pointer: None,
        }
    }

    fn load(location: &str, config: &SiteConfig, touch: bool, (cols, rows): (u16, u16)) -> Site {
        let (width, height) = viewport_for(cols, rows);
        let mut window = Window::new(width, height);
        window.hover_none = touch;
        let page = if location == HOME_HREF {
            layout::home(window)
        } else {
            layout::content(&layout::title_for_href(location), window)
        };
        Site::boot(page, config)
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Time since the current page loaded.
    pub fn now(&self) -> Duration {
        self.loaded.elapsed()
    }

    /// Run one frame and follow any navigation it produced.
    pub fn advance(&mut self) -> Flow {
        let now = self.now();
        self.site.advance(now);
        self.follow_navigation()
    }

    pub fn handle(&mut self, event: &Event, renderer: &Renderer) -> Flow {
        match event {
            Event::Key(key) => return self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse, renderer),
            Event::Resize(cols, rows) => {
                self.size = (*cols, *rows);
                let (width, height) = viewport_for(*cols, *rows);
                self.dispatch(SiteEvent::Resize { width, height });
                return Flow::Redraw;
            }
            Event::FocusLost => self.dispatch(SiteEvent::Visibility { hidden: true }),
            Event::FocusGained => self.dispatch(SiteEvent::Visibility { hidden: false }),
            _ => {}
        }
        self.follow_navigation()
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Flow::Quit,
            KeyCode::Char('m') => {
                if let Some(button) = self.site.page().get_by_id(BURGER_BUTTON_ID) {
                    self.dispatch(SiteEvent::Click(button));
                }
            }
            KeyCode::Char(c @ '1'..='9') => {
                let link = self.site.burger().filter(|b| b.is_open()).and_then(|b| {
                    let index = c as usize - '1' as usize;
                    b.links(self.site.page()).get(index).copied()
                });
                if let Some(link) = link {
                    self.dispatch(SiteEvent::Click(link));
                }
            }
            KeyCode::Up => self.scroll_by(-SCROLL_STEP),
            KeyCode::Down => self.scroll_by(SCROLL_STEP),
            KeyCode::PageUp => self.scroll_by(-SCROLL_STEP * 5.0),
            KeyCode::PageDown => self.scroll_by(SCROLL_STEP * 5.0),
            KeyCode::Backspace => return self.back(),
            _ => {}
        }
        self.follow_navigation()
    }

    /// Re-check what sits under a resting mouse after the page was redrawn,
    /// since satellites move out from under it.
    pub fn refresh_hover(&mut self, renderer: &Renderer) {
        if let Some((column, row)) = self.pointer {
            self.hover(renderer.hit_test(column, row));
        }
    }

    fn hover(&mut self, target: Option<ElementId>) {
        if target == self.hovered {
            return;
        }
        if let Some(old) = self.hovered.take() {
            self.dispatch(SiteEvent::PointerLeave(old));
        }
        if let Some(new) = target {
            self.dispatch(SiteEvent::PointerEnter(new));
        }
        self.hovered = target;
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent, renderer: &Renderer) {
        self.pointer = Some((mouse.column, mouse.row));
        let target = renderer.hit_test(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => self.hover(target),
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(el) = target {
                    let event = if self.touch {
                        SiteEvent::TouchStart(el)
                    } else {
                        SiteEvent::Click(el)
                    };
                    self.dispatch(event);
                }
            }
            MouseEventKind::Up(MouseButton::Left) if self.touch => self.dispatch(SiteEvent::TouchEnd),
            MouseEventKind::ScrollDown => self.scroll_by(SCROLL_STEP),
            MouseEventKind::ScrollUp => self.scroll_by(-SCROLL_STEP),
            _ => {}
        }
    }

    fn scroll_by(&mut self, delta: f32) {
        let y = self.site.page().window.scroll_y + delta;
        self.dispatch(SiteEvent::Scroll { y });
    }

    fn dispatch(&mut self, event: SiteEvent) {
        let now = self.now();
        self.site.dispatch(event, now);
    }

    fn follow_navigation(&mut self) -> Flow {
        let Some(href) = self.site.take_navigation() else {
            return Flow::Continue;
        };
        if href == self.location {
            return Flow::Continue;
        }
        let previous = std::mem::replace(&mut self.location, href);
        self.history.push(previous);
        self.open_current();
        Flow::Redraw
    }

    fn back(&mut self) -> Flow {
        let Some(previous) = self.history.pop() else {
            return Flow::Continue;
        };
        self.location = previous;
        self.open_current();
        Flow::Redraw
    }

    fn open_current(&mut self) {
        tracing::info!(location = %self.location, "navigating");
        self.site = Self::load(&self.location, &self.config, self.touch, self.size);
        self.loaded = Instant::now();
        self.hovered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::{SpeedTier, SATELLITE_CLASS};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn browser(touch: bool) -> (Browser, Renderer) {
        (Browser::new(SiteConfig::default(), touch, (160, 50)), Renderer::new((0, 0, 0)))
    }

    #[test]
    fn quit_keys() {
        let (mut b, r) = browser(false);
        assert_eq!(b.handle(&key(KeyCode::Char('q')), &r), Flow::Quit);
        assert_eq!(b.handle(&key(KeyCode::Esc), &r), Flow::Quit);
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(b.handle(&ctrl_c, &r), Flow::Quit);
    }

    #[test]
    fn menu_keys_navigate_and_backspace_returns() {
        let (mut b, r) = browser(false);
        assert_eq!(b.handle(&key(KeyCode::Char('2')), &r), Flow::Continue);
        assert_eq!(b.location(), HOME_HREF);

        b.handle(&key(KeyCode::Char('m')), &r);
        assert!(b.site().burger().unwrap().is_open());
        assert_eq!(b.handle(&key(KeyCode::Char('2')), &r), Flow::Redraw);
        assert_eq!(b.location(), "about.html");
        assert!(b.site().orbit().is_none());

        assert_eq!(b.handle(&key(KeyCode::Backspace), &r), Flow::Redraw);
        assert_eq!(b.location(), HOME_HREF);
        assert!(b.site().orbit().is_some());
        assert_eq!(b.handle(&key(KeyCode::Backspace), &r), Flow::Continue);
    }

    #[test]
    fn resize_reaches_the_site_after_settling() {
        let (mut b, r) = browser(false);
        assert_eq!(b.handle(&Event::Resize(60, 40), &r), Flow::Redraw);
        assert_eq!(b.site().page().window.inner_width, 480);
        assert!(b.site().next_timer().is_some());
    }

    #[test]
    fn focus_changes_pause_and_resume() {
        let (mut b, r) = browser(false);
        b.handle(&Event::FocusLost, &r);
        assert!(b.site().frames().is_empty());
        b.handle(&Event::FocusGained, &r);
        assert!(!b.site().frames().is_empty());
    }

    #[test]
    fn wheel_scrolls_the_page() {
        let (mut b, r) = browser(false);
        b.handle(&mouse(MouseEventKind::ScrollDown, 0, 10), &r);
        b.handle(&mouse(MouseEventKind::ScrollDown, 0, 10), &r);
        b.handle(&key(KeyCode::Down), &r);
        assert_eq!(b.site().page().window.scroll_y, 3.0 * SCROLL_STEP);
        b.handle(&key(KeyCode::PageUp), &r);
        assert_eq!(b.site().page().window.scroll_y, 0.0);
    }

    #[test]
    fn clicking_the_rendered_burger_opens_the_menu() {
        let (mut b, mut r) = browser(false);
        r.render(b.site().page(), &mut Vec::new()).unwrap();
        b.handle(&mouse(MouseEventKind::Down(MouseButton::Left), 157, 0), &r);
        assert!(b.site().burger().unwrap().is_open());
    }

    fn first_satellite_cell(b: &Browser, r: &Renderer) -> (u16, u16, ElementId) {
        let page = b.site().page();
        (1..50u16)
            .flat_map(|row| (0..160u16).map(move |col| (col, row)))
            .find_map(|(col, row)| {
                r.hit_test(col, row)
                    .filter(|&el| page.has_class(el, SATELLITE_CLASS))
                    .map(|el| (col, row, el))
            })
            .unwrap()
    }

    #[test]
    fn resting_pointer_lets_go_of_a_satellite_that_moved_away() {
        let (mut b, mut r) = browser(false);
        r.render(b.site().page(), &mut Vec::new()).unwrap();
        let (col, row, sat) = first_satellite_cell(&b, &r);

        b.handle(&mouse(MouseEventKind::Moved, col, row), &r);
        assert_eq!(b.hovered, Some(sat));
        assert_eq!(b.site().orbit().unwrap().speed(), SpeedTier::Slow);

        let mut let_go = false;
        for frame in 1..=300u64 {
            b.site.advance(Duration::from_millis(frame * 16));
            r.render(b.site().page(), &mut Vec::new()).unwrap();
            b.refresh_hover(&r);

            assert_eq!(b.hovered, r.hit_test(col, row));
            if b.hovered != Some(sat) {
                let_go = true;
            }
            if b.hovered.is_none() {
                assert_eq!(b.site().orbit().unwrap().speed(), SpeedTier::Base);
            }
        }
        assert!(let_go);
    }

    #[test]
    fn refresh_without_a_pointer_changes_nothing() {
        let (mut b, mut r) = browser(false);
        r.render(b.site().page(), &mut Vec::new()).unwrap();
        b.refresh_hover(&r);
        assert_eq!(b.hovered, None);
        assert_eq!(b.site().orbit().unwrap().speed(), SpeedTier::Base);
    }

    #[test]
    fn touch_mode_presses_and_releases() {
        let (mut b, mut r) = browser(true);
        r.render(b.site().page(), &mut Vec::new()).unwrap();
        b.handle(&mouse(MouseEventKind::Down(MouseButton::Left), 157, 0), &r);
        assert!(!b.site().burger().unwrap().is_open());
        b.handle(&mouse(MouseEventKind::Up(MouseButton::Left), 157, 0), &r);
        assert!(b.site().burger().unwrap().is_open());
    }
}
