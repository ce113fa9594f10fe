//! DOM node host: one absolutely positioned `<div>` per particle

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use super::retained::{NodeHost, NodeView};
use crate::error::{FxError, Result};

const BASE_STYLE: &str =
    "position:absolute;left:0;top:0;border-radius:50%;pointer-events:none;will-change:transform;";

#[derive(Clone)]
pub struct DomNodeHost {
    document: Document,
    container: HtmlElement,
}

impl DomNodeHost {
    /// Host nodes inside the element with the given id
    pub fn from_id(document: &Document, id: &str) -> Result<Self> {
        let container = document
            .get_element_by_id(id)
            .ok_or_else(|| FxError::MissingSurface(id.to_string()))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| FxError::ContextUnavailable(format!("{id} is not an HTML element")))?;
        Ok(Self {
            document: document.clone(),
            container,
        })
    }

    pub fn container(&self) -> &HtmlElement {
        &self.container
    }
}

impl NodeHost for DomNodeHost {
    type Node = HtmlElement;

    fn create(&mut self) -> Option<HtmlElement> {
        let node = self
            .document
            .create_element("div")
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        node.style().set_css_text(BASE_STYLE);
        if self.container.append_child(&node).is_err() {
            log::warn!("Failed to attach particle node");
            return None;
        }
        Some(node)
    }

    fn update(&mut self, node: &HtmlElement, view: &NodeView) {
        let style = node.style();
        let diameter = view.radius * 2.0;
        let _ = style.set_property(
            "transform",
            &format!(
                "translate({:.1}px, {:.1}px)",
                view.center.x - view.radius,
                view.center.y - view.radius
            ),
        );
        let _ = style.set_property("width", &format!("{diameter:.1}px"));
        let _ = style.set_property("height", &format!("{diameter:.1}px"));
        let _ = style.set_property("background", &view.color.with_alpha(1.0).to_css());
        let _ = style.set_property("opacity", &format!("{:.3}", view.opacity));
    }

    fn detach(&mut self, node: HtmlElement) {
        node.remove();
    }
}
