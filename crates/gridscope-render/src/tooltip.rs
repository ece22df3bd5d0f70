//! The floating tooltip shared by every view.

use serde::Serialize;
use std::cell::RefCell;

use crate::svg::escape_xml;

/// Pointer position in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Pointer {
    pub page_x: f64,
    pub page_y: f64,
}

impl Pointer {
    pub fn new(page_x: f64, page_y: f64) -> Self {
        Self { page_x, page_y }
    }
}

/// What the host should display: an HTML fragment at `(left, top)` page pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tooltip {
    pub html: String,
    pub left: f64,
    pub top: f64,
    pub visible: bool,
}

/// Single tooltip element; views share it through an `Rc`.
#[derive(Debug, Default)]
pub struct TooltipOverlay {
    state: RefCell<Tooltip>,
}

impl TooltipOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self, html: String) {
        let mut t = self.state.borrow_mut();
        t.html = html;
        t.visible = true;
    }

    /// Places the tooltip `padding` pixels below and right of the pointer.
    pub fn move_to(&self, pointer: Pointer, padding: f64) {
        let mut t = self.state.borrow_mut();
        t.left = pointer.page_x + padding;
        t.top = pointer.page_y + padding;
    }

    pub fn hide(&self) {
        self.state.borrow_mut().visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    pub fn snapshot(&self) -> Tooltip {
        self.state.borrow().clone()
    }
}

pub(crate) fn list_item(text: &str) -> String {
    format!(r#"<li class="tooltip-listItem">{}</li>"#, escape_xml(text))
}
