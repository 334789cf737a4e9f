//! HTML解析和处理模块
//!
//! - `utils`: 常量与元素分类
//! - `dom`: 基础DOM操作
//! - `serializer`: 序列化功能

pub mod dom;
pub mod serializer;
pub mod utils;

pub use dom::{
    append_child, create_text_node, descendant_elements, detach, find_by_class,
    get_child_node_by_name, get_node_attr, get_node_name, get_parent_node, has_class,
    html_to_dom, is_ancestor_or_self, set_node_attr, set_text_content, text_content,
};
pub use serializer::{serialize_children, serialize_node};
pub use utils::{is_skipped_element, SKIP_ELEMENTS, TRANSLATABLE_ATTRS, WHITESPACES};
