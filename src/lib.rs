//! Decorations for the orbit site: a drifting star field, a menu of
//! satellites orbiting a centre phrase, a nav bar that fades on scroll and
//! a mobile burger menu. Each runs against a headless [`page::Page`] and is
//! driven by [`site::Site`]; the `terminal` and `render` modules put it on
//! screen.

pub mod burger;
pub mod canvas;
pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod nav;
pub mod orbit;
pub mod page;
pub mod phrases;
pub mod render;
pub mod schedule;
pub mod site;
pub mod stars;
pub mod terminal;
pub mod timing;
