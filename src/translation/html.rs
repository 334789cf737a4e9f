//! HTML 文档的可翻译片段拆分与回填
//!
//! 文档解析两次：第一次收集片段，第二次按相同的遍历顺序写回译文。
//! rcdom 节点不是 `Send`，拆成两个同步阶段后，异步翻译请求之间不持有 DOM。

use std::collections::BTreeMap;

use markup5ever_rcdom::{Handle, NodeData};

use crate::parsers::html::{
    get_node_attr, get_node_name, html_to_dom, is_skipped_element, serialize_node,
    set_node_attr, utils::TRANSLATABLE_META_NAMES, TRANSLATABLE_ATTRS,
};

/// 片段在文档中的位置
struct SegmentTarget {
    key: String,
    node: Handle,
    attr: Option<String>,
}

fn collect_targets(node: &Handle, element_index: &mut usize, text_index: &mut usize, out: &mut Vec<SegmentTarget>) {
    match &node.data {
        NodeData::Text { contents } => {
            if !contents.borrow().trim().is_empty() {
                out.push(SegmentTarget {
                    key: format!("t{}", text_index),
                    node: node.clone(),
                    attr: None,
                });
                *text_index += 1;
            }
            return;
        }
        NodeData::Element { .. } => {
            let name = get_node_name(node).unwrap_or_default().to_string();
            if is_skipped_element(&name) {
                return;
            }

            let index = *element_index;
            *element_index += 1;

            for attr in TRANSLATABLE_ATTRS {
                if has_content(get_node_attr(node, attr)) {
                    out.push(SegmentTarget {
                        key: format!("a{}:{}", index, attr),
                        node: node.clone(),
                        attr: Some(attr.to_string()),
                    });
                }
            }

            if name == "meta" {
                let meta_name = get_node_attr(node, "name").unwrap_or_default().to_lowercase();
                if TRANSLATABLE_META_NAMES.contains(&meta_name.as_str())
                    && has_content(get_node_attr(node, "content"))
                {
                    out.push(SegmentTarget {
                        key: format!("a{}:content", index),
                        node: node.clone(),
                        attr: Some("content".to_string()),
                    });
                }
            }
        }
        NodeData::Document => {}
        _ => return,
    }

    for child in node.children.borrow().iter() {
        collect_targets(child, element_index, text_index, out);
    }
}

fn has_content(value: Option<String>) -> bool {
    value.map(|v| !v.trim().is_empty()).unwrap_or(false)
}

fn targets_of(document: &Handle) -> Vec<SegmentTarget> {
    let mut out = Vec::new();
    collect_targets(document, &mut 0, &mut 0, &mut out);
    out
}

/// 收集文档中的可翻译片段（键 -> 去除首尾空白的原文）
pub fn collect_html_segments(html: &str) -> BTreeMap<String, String> {
    let dom = html_to_dom(html.as_bytes(), "utf-8");

    targets_of(&dom.document)
        .into_iter()
        .filter_map(|target| {
            let value = match &target.attr {
                Some(attr) => get_node_attr(&target.node, attr)?,
                None => match &target.node.data {
                    NodeData::Text { contents } => contents.borrow().to_string(),
                    _ => return None,
                },
            };
            Some((target.key, value.trim().to_string()))
        })
        .collect()
}

/// 把译文写回文档并重新序列化
///
/// 文本节点保留原有的首尾空白，缺失的键保持原文不变
pub fn apply_html_segments(html: &str, translations: &BTreeMap<String, String>) -> String {
    let dom = html_to_dom(html.as_bytes(), "utf-8");

    for target in targets_of(&dom.document) {
        let Some(translated) = translations.get(&target.key) else {
            continue;
        };

        match &target.attr {
            Some(attr) => set_node_attr(&target.node, attr, Some(translated.clone())),
            None => {
                if let NodeData::Text { contents } = &target.node.data {
                    let original = contents.borrow().to_string();
                    let leading = &original[..original.len() - original.trim_start().len()];
                    let trailing = &original[original.trim_end().len()..];
                    let replaced = format!("{}{}{}", leading, translated, trailing);

                    let mut contents = contents.borrow_mut();
                    contents.clear();
                    contents.push_slice(&replaced);
                }
            }
        }
    }

    serialize_node(&dom.document)
}
