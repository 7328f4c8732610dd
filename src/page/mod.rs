//! The page: a fixed set of named regions that controllers and renderers update.
//!
//! Regions are addressed by the anchor ids of the web page markup, so an exported
//! document keeps the same contract with stylesheets and scripts.

pub mod anchors;
pub mod document;
mod node;

pub use node::{escape_text, safe_href, safe_image_src, Element, Node};

use crate::chart::PlotCall;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub type SharedPage = Arc<Mutex<Page>>;

/// Lock a shared page, recovering the guard if a previous holder panicked.
pub fn lock(page: &SharedPage) -> MutexGuard<'_, Page> {
    page.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Serialize)]
pub struct Region {
    pub visible: bool,
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<PlotCall>,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            visible: true,
            children: Vec::new(),
            plot: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    regions: BTreeMap<String, Region>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    /// A page with every anchor present; loading indicators and the error banner start hidden.
    pub fn new() -> Self {
        let mut regions = BTreeMap::new();
        for id in anchors::REGIONS {
            regions.insert(id.to_string(), Region::default());
        }
        for id in anchors::HIDDEN_ON_LOAD {
            if let Some(region) = regions.get_mut(*id) {
                region.visible = false;
            }
        }
        Self { regions }
    }

    pub fn shared() -> SharedPage {
        Arc::new(Mutex::new(Self::new()))
    }

    fn region_mut(&mut self, id: &str) -> &mut Region {
        self.regions.entry(id.to_string()).or_default()
    }

    /// Remove all content and any plot from a region.
    pub fn clear(&mut self, id: &str) {
        let region = self.region_mut(id);
        region.children.clear();
        region.plot = None;
    }

    pub fn append(&mut self, id: &str, node: impl Into<Node>) {
        self.region_mut(id).children.push(node.into());
    }

    pub fn replace(&mut self, id: &str, nodes: Vec<Node>) {
        let region = self.region_mut(id);
        region.children = nodes;
        region.plot = None;
    }

    /// Equivalent of assigning `textContent`: one literal text node.
    pub fn set_text(&mut self, id: &str, text: &str) {
        self.replace(id, vec![Node::text(text)]);
    }

    pub fn set_plot(&mut self, id: &str, plot: PlotCall) {
        self.region_mut(id).plot = Some(plot);
    }

    pub fn show(&mut self, id: &str) {
        self.region_mut(id).visible = true;
    }

    pub fn hide(&mut self, id: &str) {
        self.region_mut(id).visible = false;
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.regions.get(id).map(|r| r.visible).unwrap_or(false)
    }

    pub fn children(&self, id: &str) -> &[Node] {
        self.regions
            .get(id)
            .map(|r| r.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn plot(&self, id: &str) -> Option<&PlotCall> {
        self.regions.get(id).and_then(|r| r.plot.as_ref())
    }

    pub fn text_content(&self, id: &str) -> String {
        self.children(id).iter().map(Node::text_content).collect()
    }

    /// Serialized markup of a region's children.
    pub fn inner_html(&self, id: &str) -> String {
        let mut out = String::new();
        for node in self.children(id) {
            node.write_html(&mut out);
        }
        out
    }

    /// Elements anywhere in a region carrying `class`, in document order.
    pub fn find_by_class(&self, id: &str, class: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        for node in self.children(id) {
            if let Node::Element(el) = node {
                el.find_by_class(class, &mut found);
            }
        }
        found
    }

    /// The text shown in the shared error banner, if it is visible.
    pub fn error_message(&self) -> Option<String> {
        if self.is_visible(anchors::ERROR_MESSAGE) {
            Some(self.text_content(anchors::ERROR_MESSAGE))
        } else {
            None
        }
    }

    pub fn outline(&self, id: &str) -> Vec<OutlineLine> {
        outline(self.children(id))
    }
}

/// One line of flattened region text, split into segments tagged with the nearest class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineLine {
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub class: Option<String>,
}

impl OutlineLine {
    pub fn plain(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Flatten nodes into lines: block elements start new lines, whitespace-only text is dropped.
pub fn outline(nodes: &[Node]) -> Vec<OutlineLine> {
    let mut lines = Vec::new();
    let mut current = OutlineLine::default();
    for node in nodes {
        walk(node, None, &mut current, &mut lines);
    }
    flush(&mut current, &mut lines);
    lines
}

fn walk<'a>(
    node: &'a Node,
    class: Option<&'a str>,
    current: &mut OutlineLine,
    lines: &mut Vec<OutlineLine>,
) {
    match node {
        Node::Text(text) => {
            let text = text.trim();
            if !text.is_empty() {
                if !current.segments.is_empty() {
                    current.segments.push(Segment {
                        text: " ".into(),
                        class: None,
                    });
                }
                current.segments.push(Segment {
                    text: text.to_string(),
                    class: class.map(str::to_string),
                });
            }
        }
        Node::Element(el) => {
            let class = el.get_attr("class").or(class);
            if el.is_block() {
                flush(current, lines);
            }
            match el.tag.as_str() {
                "img" => {
                    let alt = el.get_attr("alt").unwrap_or("image");
                    walk(&Node::text(format!("[{alt}]")), class, current, lines);
                }
                "a" => {
                    for child in &el.children {
                        walk(child, class, current, lines);
                    }
                    if let Some(href) = el.get_attr("href") {
                        walk(&Node::text(format!("<{href}>")), Some("link-target"), current, lines);
                    }
                }
                _ => {
                    for child in &el.children {
                        walk(child, class, current, lines);
                    }
                }
            }
            if el.is_block() {
                flush(current, lines);
            }
        }
    }
}

fn flush(current: &mut OutlineLine, lines: &mut Vec<OutlineLine>) {
    if !current.segments.is_empty() {
        lines.push(std::mem::take(current));
    }
}
