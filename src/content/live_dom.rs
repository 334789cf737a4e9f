//! 基于 rcdom 的可变文档
//!
//! 提供浏览器 DOM 的最小子集：节点增删、子树变更订阅、字幕浮层。
//! 命令行的整页翻译和测试都通过它驱动翻译流程。

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use html5ever::interface::{Attribute, QualName};
use html5ever::tendril::format_tendril;
use html5ever::tree_builder::create_element;
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tokio::sync::mpsc;

use super::document::{
    CaptionHost, DomNode, MutationBatch, MutationReceiver, NodeKind, PageDocument,
};
use crate::parsers::html::dom::{
    self, append_child, detach, find_by_class, get_child_node_by_name, get_node_attr,
    get_parent_node, html_to_dom, is_ancestor_or_self, set_node_attr,
};
use crate::parsers::html::serializer::serialize_node;

/// 字幕浮层元素 id
pub const OVERLAY_ID: &str = "ai-yt-caption";

/// 播放器容器类名
pub const PLAYER_CLASS: &str = "html5-video-player";

/// 原生字幕片段类名
pub const CAPTION_SEGMENT_CLASS: &str = "ytp-caption-segment";

const OVERLAY_STYLE: &str = "position:absolute;bottom:60px;left:50%;transform:translateX(-50%);\
padding:8px 14px;background:rgba(0,0,0,0.7);color:white;font-size:20px;border-radius:6px;\
text-shadow:0 0 5px black;pointer-events:none;z-index:999999";

fn overlay_style(visible: bool) -> String {
    format!(
        "{};display:{}",
        OVERLAY_STYLE,
        if visible { "block" } else { "none" }
    )
}

/// 文档节点句柄
#[derive(Clone)]
pub struct LiveNode(Handle);

impl LiveNode {
    pub fn handle(&self) -> &Handle {
        &self.0
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        get_node_attr(&self.0, name)
    }

    pub fn tag_name(&self) -> Option<&str> {
        dom::get_node_name(&self.0)
    }

    pub fn parent(&self) -> Option<LiveNode> {
        get_parent_node(&self.0).map(LiveNode)
    }
}

impl fmt::Debug for LiveNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.data {
            NodeData::Element { name, .. } => write!(f, "<{}>", name.local),
            NodeData::Text { contents } => write!(f, "{:?}", &**contents.borrow()),
            _ => write!(f, "#node"),
        }
    }
}

impl DomNode for LiveNode {
    fn kind(&self) -> NodeKind {
        match self.0.data {
            NodeData::Text { .. } => NodeKind::Text,
            NodeData::Element { .. } => NodeKind::Element,
            _ => NodeKind::Other,
        }
    }

    fn node_id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    fn text_content(&self) -> String {
        dom::text_content(&self.0)
    }

    fn set_text_content(&self, text: &str) {
        dom::set_text_content(&self.0, text);
    }

    fn child_nodes(&self) -> Vec<Self> {
        self.0.children.borrow().iter().cloned().map(LiveNode).collect()
    }

    fn descendant_elements(&self) -> Vec<Self> {
        dom::descendant_elements(&self.0)
            .into_iter()
            .map(LiveNode)
            .collect()
    }

    fn is_connected(&self) -> bool {
        let mut current = self.0.clone();
        while let Some(parent) = get_parent_node(&current) {
            current = parent;
        }
        matches!(current.data, NodeData::Document)
    }
}

struct Observer {
    root: Handle,
    sender: mpsc::UnboundedSender<MutationBatch<LiveNode>>,
}

/// 可变 HTML 文档
pub struct LiveDocument {
    dom: RcDom,
    observers: RefCell<Vec<Observer>>,
}

impl LiveDocument {
    pub fn parse(markup: &str) -> Self {
        Self {
            dom: html_to_dom(markup.as_bytes(), "utf-8"),
            observers: RefCell::new(Vec::new()),
        }
    }

    /// 整个文档的标记
    pub fn markup(&self) -> String {
        serialize_node(&self.dom.document)
    }

    pub fn document_element(&self) -> Option<LiveNode> {
        get_child_node_by_name(&self.dom.document, "html").map(LiveNode)
    }

    pub fn query_class(&self, class_name: &str) -> Option<LiveNode> {
        find_by_class(&self.dom.document, class_name).map(LiveNode)
    }

    pub fn element_by_id(&self, id: &str) -> Option<LiveNode> {
        dom::descendant_elements(&self.dom.document)
            .into_iter()
            .find(|node| get_node_attr(node, "id").as_deref() == Some(id))
            .map(LiveNode)
    }

    /// 解析片段并追加到 `parent` 末尾，返回新增的顶层节点
    pub fn append_html(&self, parent: &LiveNode, markup: &str) -> Vec<LiveNode> {
        let added = parse_fragment(markup);
        for node in &added {
            append_child(&parent.0, node.clone());
        }
        self.notify(&parent.0, &added);
        added.into_iter().map(LiveNode).collect()
    }

    pub fn append_text(&self, parent: &LiveNode, text: &str) -> LiveNode {
        let node = dom::create_text_node(text);
        append_child(&parent.0, node.clone());
        self.notify(&parent.0, std::slice::from_ref(&node));
        LiveNode(node)
    }

    /// 替换 `parent` 的全部子节点（`innerHTML = markup`）
    pub fn set_inner_html(&self, parent: &LiveNode, markup: &str) -> Vec<LiveNode> {
        clear_children(&parent.0);
        self.append_html(parent, markup)
    }

    pub fn remove(&self, node: &LiveNode) {
        detach(&node.0);
    }

    /// 仍在监听的订阅数
    pub fn observer_count(&self) -> usize {
        let mut observers = self.observers.borrow_mut();
        observers.retain(|o| !o.sender.is_closed());
        observers.len()
    }

    /// 浮层当前是否可见
    pub fn overlay_visible(&self, overlay: &LiveNode) -> bool {
        overlay.is_connected()
            && overlay
                .attr("style")
                .map(|style| style.ends_with("display:block"))
                .unwrap_or(false)
    }

    fn notify(&self, parent: &Handle, added: &[Handle]) {
        if added.is_empty() {
            return;
        }

        let mut observers = self.observers.borrow_mut();
        observers.retain(|o| !o.sender.is_closed());
        for observer in observers.iter() {
            if is_ancestor_or_self(&observer.root, parent) {
                let batch = MutationBatch {
                    added: added.iter().cloned().map(LiveNode).collect(),
                };
                let _ = observer.sender.send(batch);
            }
        }
    }
}

impl fmt::Debug for LiveDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveDocument")
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}

fn clear_children(node: &Handle) {
    let children: Vec<Handle> = node.children.borrow_mut().drain(..).collect();
    for child in children {
        child.parent.set(None);
    }
}

/// 按 body 上下文解析片段，返回脱离文档的顶层节点
fn parse_fragment(markup: &str) -> Vec<Handle> {
    let wrapped = format!("<html><head></head><body>{}</body></html>", markup);
    let fragment = html_to_dom(wrapped.as_bytes(), "utf-8");

    let Some(body) = get_child_node_by_name(&fragment.document, "html")
        .and_then(|html| get_child_node_by_name(&html, "body"))
    else {
        return Vec::new();
    };

    let children: Vec<Handle> = body.children.borrow_mut().drain(..).collect();
    for child in &children {
        child.parent.set(None);
    }
    children
}

impl PageDocument for LiveDocument {
    type Node = LiveNode;

    fn document_markup(&self) -> String {
        self.document_element()
            .map(|html| serialize_node(&html.0))
            .unwrap_or_default()
    }

    fn replace_root_contents(&self, markup: &str) {
        let Some(html) = self.document_element() else {
            return;
        };

        let parsed = html_to_dom(markup.as_bytes(), "utf-8");
        let Some(new_root) = get_child_node_by_name(&parsed.document, "html") else {
            return;
        };

        let incoming: Vec<Handle> = new_root.children.borrow_mut().drain(..).collect();
        clear_children(&html.0);
        for node in &incoming {
            node.parent.set(None);
            append_child(&html.0, node.clone());
        }
        self.notify(&html.0, &incoming);
    }

    fn body(&self) -> Option<LiveNode> {
        self.document_element()
            .and_then(|html| get_child_node_by_name(&html.0, "body"))
            .map(LiveNode)
    }

    fn observe(&self, root: &LiveNode) -> MutationReceiver<LiveNode> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.observers.borrow_mut().push(Observer {
            root: root.0.clone(),
            sender,
        });
        receiver
    }
}

impl CaptionHost for LiveDocument {
    fn caption_text(&self) -> Option<String> {
        self.query_class(CAPTION_SEGMENT_CLASS)
            .map(|segment| segment.text_content().trim().to_string())
            .filter(|text| !text.is_empty())
    }

    fn mount_overlay(&self) -> Option<LiveNode> {
        if let Some(existing) = self.element_by_id(OVERLAY_ID) {
            return Some(existing);
        }

        let parent = self.query_class(PLAYER_CLASS).or_else(|| self.body())?;
        let overlay = create_element(
            &self.dom,
            QualName::new(None, ns!(html), LocalName::from("div")),
            vec![
                Attribute {
                    name: QualName::new(None, ns!(), LocalName::from("id")),
                    value: format_tendril!("{}", OVERLAY_ID),
                },
                Attribute {
                    name: QualName::new(None, ns!(), LocalName::from("style")),
                    value: format_tendril!("{}", overlay_style(false)),
                },
            ],
        );
        append_child(&parent.0, overlay.clone());
        Some(LiveNode(overlay))
    }

    fn show_overlay(&self, overlay: &LiveNode, text: &str) {
        dom::set_text_content(&overlay.0, text);
        set_node_attr(&overlay.0, "style", Some(overlay_style(true)));
    }

    fn unmount_overlay(&self, overlay: &LiveNode) {
        detach(&overlay.0);
    }
}
