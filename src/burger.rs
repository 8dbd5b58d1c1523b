use crate::page::{ElementId, Page, Tag};

pub const BURGER_BUTTON_ID: &str = "burgerBtn";
pub const MOBILE_MENU_ID: &str = "mobileMenu";
pub const OPEN_CLASS: &str = "open";

pub struct BurgerMenu {
    button: ElementId,
    menu: ElementId,
    open: bool,
}

impl BurgerMenu {
    /// Needs both the button and the panel.
    pub fn attach(page: &Page) -> Option<Self> {
        Some(Self {
            button: page.get_by_id(BURGER_BUTTON_ID)?,
            menu: page.get_by_id(MOBILE_MENU_ID)?,
            open: false,
        })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn menu(&self) -> ElementId {
        self.menu
    }

    /// Menu links in document order.
    pub fn links(&self, page: &Page) -> Vec<ElementId> {
        page.descendants_with_tag(self.menu, Tag::Anchor)
    }

    pub fn toggle(&mut self, page: &mut Page) {
        self.set_open(page, !self.open);
    }

    pub fn close(&mut self, page: &mut Page) {
        self.set_open(page, false);
    }

    /// Click listener for the button and the links inside the panel.
    /// Returns whether the click was one of ours.
    pub fn click(&mut self, el: ElementId, page: &mut Page) -> bool {
        if page.is_within(el, self.button) {
            self.toggle(page);
            return true;
        }
        let on_link = page
            .closest(el, |e| e.tag() == Tag::Anchor)
            .is_some_and(|link| page.is_within(link, self.menu));
        if on_link {
            self.close(page);
        }
        on_link
    }

    fn set_open(&mut self, page: &mut Page, open: bool) {
        self.open = open;
        page.toggle_class(self.button, OPEN_CLASS, open);
        page.toggle_class(self.menu, OPEN_CLASS, open);
        page.set_scroll_locked(open);
        tracing::debug!(open, "mobile menu toggled");
    }
}
