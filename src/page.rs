//! Headless page model: an element tree with the handful of DOM features
//! the decorations touch (ids, classes, data attributes, text, inline
//! transform, transition restarts) plus window and document state.

use crate::canvas::Canvas;
use std::collections::{BTreeSet, HashMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    Div,
    Span,
    Nav,
    Anchor,
    Button,
    Canvas,
}

/// `rotate(deg) translateX(px)`, applied in that order.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Transform {
    pub rotate_deg: f32,
    pub translate_x: f32,
}

#[derive(Debug)]
pub struct Element {
    tag: Tag,
    id: Option<String>,
    classes: BTreeSet<String>,
    data: HashMap<String, String>,
    href: Option<String>,
    text: String,
    transform: Option<Transform>,
    canvas: Option<Canvas>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    transition_restarts: u32,
    revision: u64,
}

impl Element {
    fn new(tag: Tag, parent: Option<ElementId>) -> Self {
        Self {
            tag,
            id: None,
            classes: BTreeSet::new(),
            data: HashMap::new(),
            href: None,
            text: String::new(),
            transform: None,
            canvas: (tag == Tag::Canvas).then(Canvas::default),
            parent,
            children: Vec::new(),
            transition_restarts: 0,
            revision: 0,
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn transform(&self) -> Option<Transform> {
        self.transform
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// How many times a running transition was forced to restart.
    pub fn transition_restarts(&self) -> u32 {
        self.transition_restarts
    }

    /// Bumped on every class or text mutation that actually changed
    /// something.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Window-level environment the page sees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    pub inner_width: u32,
    pub inner_height: u32,
    pub scroll_y: f32,
    pub hidden: bool,
    /// `(hover: none)` media query result, true on touch-first devices.
    pub hover_none: bool,
}

impl Window {
    pub fn new(inner_width: u32, inner_height: u32) -> Self {
        Self {
            inner_width,
            inner_height,
            scroll_y: 0.0,
            hidden: false,
            hover_none: false,
        }
    }
}

#[derive(Debug)]
pub struct Page {
    elements: Vec<Element>,
    pub window: Window,
    scroll_locked: bool,
    location: Option<String>,
}

impl Page {
    pub fn new(window: Window) -> Self {
        Self {
            elements: Vec::new(),
            window,
            scroll_locked: false,
            location: None,
        }
    }

    /// Append an element under `parent` (or at the top level) and return a
    /// builder for its attributes.
    pub fn append(&mut self, parent: Option<ElementId>, tag: Tag) -> ElementBuilder<'_> {
        let id = ElementId(self.elements.len());
        self.elements.push(Element::new(tag, parent));
        if let Some(parent) = parent {
            self.elements[parent.0].children.push(id);
        }
        ElementBuilder { page: self, id }
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, el)| (ElementId(i), el))
    }

    pub fn get_by_id(&self, id: &str) -> Option<ElementId> {
        self.elements()
            .find(|(_, el)| el.id() == Some(id))
            .map(|(handle, _)| handle)
    }

    pub fn query_class(&self, class: &str) -> Option<ElementId> {
        self.elements()
            .find(|(_, el)| el.has_class(class))
            .map(|(handle, _)| handle)
    }

    pub fn query_all_class(&self, class: &str) -> Vec<ElementId> {
        self.elements()
            .filter(|(_, el)| el.has_class(class))
            .map(|(handle, _)| handle)
            .collect()
    }

    /// First descendant of `root` (depth first) carrying `class`.
    pub fn find_descendant_class(&self, root: ElementId, class: &str) -> Option<ElementId> {
        self.descendants(root)
            .into_iter()
            .find(|&id| self.element(id).has_class(class))
    }

    pub fn descendants_with_tag(&self, root: ElementId, tag: Tag) -> Vec<ElementId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.element(id).tag() == tag)
            .collect()
    }

    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.element(root).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.element(id).children.iter().rev().copied());
        }
        out
    }

    /// `el` itself or any of its ancestors equals `ancestor`.
    pub fn is_within(&self, el: ElementId, ancestor: ElementId) -> bool {
        self.ancestors(el).any(|id| id == ancestor)
    }

    /// Closest element, starting at `el` itself and walking up, that
    /// satisfies `pred`.
    pub fn closest(&self, el: ElementId, pred: impl Fn(&Element) -> bool) -> Option<ElementId> {
        self.ancestors(el).find(|&id| pred(self.element(id)))
    }

    fn ancestors(&self, el: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(Some(el), |&id| self.element(id).parent)
    }

    /// Add or remove `class`. Returns whether the class list changed.
    pub fn toggle_class(&mut self, el: ElementId, class: &str, on: bool) -> bool {
        let element = &mut self.elements[el.0];
        let changed = if on {
            element.classes.insert(class.to_string())
        } else {
            element.classes.remove(class)
        };
        if changed {
            element.revision += 1;
        }
        changed
    }

    pub fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.element(el).has_class(class)
    }

    pub fn set_text(&mut self, el: ElementId, text: &str) {
        let element = &mut self.elements[el.0];
        if element.text != text {
            element.text = text.to_string();
            element.revision += 1;
        }
    }

    pub fn set_transform(&mut self, el: ElementId, transform: Transform) {
        self.elements[el.0].transform = Some(transform);
    }

    /// Disable the transition, force a layout read, re-enable it. The net
    /// effect is that the next class change animates from scratch.
    pub fn restart_transition(&mut self, el: ElementId) {
        self.elements[el.0].transition_restarts += 1;
    }

    pub fn canvas_mut(&mut self, el: ElementId) -> Option<&mut Canvas> {
        self.elements[el.0].canvas.as_mut()
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// `body.style.overflow = hidden` while locked.
    pub fn set_scroll_locked(&mut self, locked: bool) {
        self.scroll_locked = locked;
    }

    pub fn navigate(&mut self, href: &str) {
        self.location = Some(href.to_string());
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn take_location(&mut self) -> Option<String> {
        self.location.take()
    }
}

pub struct ElementBuilder<'a> {
    page: &'a mut Page,
    id: ElementId,
}

impl ElementBuilder<'_> {
    fn element(&mut self) -> &mut Element {
        &mut self.page.elements[self.id.0]
    }

    pub fn id(mut self, id: &str) -> Self {
        self.element().id = Some(id.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.element().classes.insert(class.to_string());
        self
    }

    pub fn data(mut self, key: &str, value: &str) -> Self {
        self.element().data.insert(key.to_string(), value.to_string());
        self
    }

    pub fn href(mut self, href: &str) -> Self {
        self.element().href = Some(href.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.element().text = text.to_string();
        self
    }

    pub fn finish(self) -> ElementId {
        self.id
    }
}
