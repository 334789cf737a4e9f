//! # 解析器模块
//!
//! 基于 html5ever / rcdom 的 HTML 解析、遍历与序列化，
//! 供 HTML 本地化和内容脚本的文档模型共同使用

pub mod html;

pub use html::{html_to_dom, serialize_children, serialize_node};
