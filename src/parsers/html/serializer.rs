use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, NodeData, SerializableHandle};

/// 序列化节点本身及其子树
///
/// 对文档节点而言即为整个文档（含 doctype）
pub fn serialize_node(node: &Handle) -> String {
    let scope = match node.data {
        NodeData::Document => TraversalScope::ChildrenOnly(None),
        _ => TraversalScope::IncludeNode,
    };
    serialize_with_scope(node, scope)
}

/// 仅序列化子节点，相当于 `innerHTML`
pub fn serialize_children(node: &Handle) -> String {
    serialize_with_scope(node, TraversalScope::ChildrenOnly(None))
}

fn serialize_with_scope(node: &Handle, traversal_scope: TraversalScope) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };

    if let Err(e) = serialize(&mut buf, &serializable, opts) {
        tracing::error!("DOM 序列化失败: {}", e);
    }

    String::from_utf8_lossy(&buf).into_owned()
}
