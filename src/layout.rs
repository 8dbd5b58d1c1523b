//! Built-in page fixtures: the home page with the orbit menu and a plain
//! content page per topic. Both carry the star canvas, nav bar and burger.

use crate::burger::{BURGER_BUTTON_ID, MOBILE_MENU_ID};
use crate::nav::{NAV_LINKS_CLASS, NAV_TITLE_CLASS};
use crate::orbit::{ANGLE_OFFSET_KEY, CENTER_TEXT_ID, HREF_KEY, SATELLITE_CLASS, SATELLITE_TEXT_CLASS};
use crate::page::{Page, Tag, Window};
use crate::phrases;
use crate::stars::STAR_CANVAS_ID;

pub const HOME_HREF: &str = "index.html";
pub const SITE_TITLE: &str = "ORBIT";
pub const HEADLINE_CLASS: &str = "headline";

const NAV_LINKS: [(&str, &str); 3] = [
    ("Home", HOME_HREF),
    ("About", "about.html"),
    ("Contact", "contact.html"),
];

/// Page a satellite label links to.
pub fn topic_href(label: &str) -> String {
    format!("{}.html", label.to_lowercase())
}

/// Topic title for a destination, the inverse of [`topic_href`].
pub fn title_for_href(href: &str) -> String {
    let stem = href.trim_end_matches(".html");
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn home(window: Window) -> Page {
    let mut page = frame(window);
    let container = page.append(None, Tag::Div).class("orbit-container").finish();
    page.append(Some(container), Tag::Div).id(CENTER_TEXT_ID).finish();

    let labels = phrases::labels();
    let step = 360.0 / labels.len() as f32;
    for (i, label) in labels.into_iter().enumerate() {
        let sat = page
            .append(Some(container), Tag::Div)
            .class(SATELLITE_CLASS)
            .data(ANGLE_OFFSET_KEY, &format!("{}", i as f32 * step))
            .data(HREF_KEY, &topic_href(label))
            .finish();
        page.append(Some(sat), Tag::Span)
            .class(SATELLITE_TEXT_CLASS)
            .text(label)
            .finish();
    }
    page
}

pub fn content(title: &str, window: Window) -> Page {
    let mut page = frame(window);
    page.append(None, Tag::Div).class(HEADLINE_CLASS).text(title).finish();
    page
}

fn frame(window: Window) -> Page {
    let mut page = Page::new(window);
    page.append(None, Tag::Canvas).id(STAR_CANVAS_ID).finish();

    let nav = page.append(None, Tag::Nav).finish();
    page.append(Some(nav), Tag::Div)
        .class(NAV_TITLE_CLASS)
        .text(SITE_TITLE)
        .finish();
    let links = page.append(Some(nav), Tag::Div).class(NAV_LINKS_CLASS).finish();
    for (text, href) in NAV_LINKS {
        page.append(Some(links), Tag::Anchor).href(href).text(text).finish();
    }
    page.append(Some(nav), Tag::Button).id(BURGER_BUTTON_ID).text("☰").finish();

    let menu = page.append(None, Tag::Div).id(MOBILE_MENU_ID).finish();
    for (text, href) in NAV_LINKS {
        page.append(Some(menu), Tag::Anchor).href(href).text(text).finish();
    }
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_has_every_topic() {
        let page = home(Window::new(1024, 768));
        let sats = page.query_all_class(SATELLITE_CLASS);
        assert_eq!(sats.len(), 11);
        let energy = sats
            .iter()
            .find(|&&s| page.element(s).data(HREF_KEY) == Some("energy.html"));
        assert!(energy.is_some());
        assert!(page.get_by_id(CENTER_TEXT_ID).is_some());
    }

    #[test]
    fn content_page_has_no_satellites() {
        let page = content("Joy", Window::new(1024, 768));
        assert!(page.query_all_class(SATELLITE_CLASS).is_empty());
        assert!(page.get_by_id(STAR_CANVAS_ID).is_some());
        assert!(page.get_by_id(MOBILE_MENU_ID).is_some());
    }

    #[test]
    fn hrefs_round_trip_to_titles() {
        assert_eq!(topic_href("Challenges"), "challenges.html");
        assert_eq!(title_for_href("challenges.html"), "Challenges");
        assert_eq!(title_for_href(""), "");
    }
}
