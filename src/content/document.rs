//! 内容脚本与宿主页面之间的接缝
//!
//! 翻译流程只通过这些 trait 访问页面，浏览器 DOM 与测试用的 `LiveDocument` 都可以接入。

use tokio::sync::mpsc;

/// 节点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Element,
    Other,
}

/// 页面节点句柄
pub trait DomNode: Clone + 'static {
    fn kind(&self) -> NodeKind;

    /// 节点身份，同一节点的多个句柄返回相同的值
    fn node_id(&self) -> usize;

    fn text_content(&self) -> String;

    fn set_text_content(&self, text: &str);

    fn child_nodes(&self) -> Vec<Self>;

    /// 全部后代元素，文档顺序，不含自身
    fn descendant_elements(&self) -> Vec<Self>;

    /// 节点是否仍挂在文档上
    fn is_connected(&self) -> bool;
}

/// 一次 childList 变更中新增的节点
#[derive(Debug, Clone)]
pub struct MutationBatch<N> {
    pub added: Vec<N>,
}

pub type MutationReceiver<N> = mpsc::UnboundedReceiver<MutationBatch<N>>;

/// 整页翻译需要的文档操作
pub trait PageDocument {
    type Node: DomNode;

    /// 根元素的完整标记（`outerHTML`）
    fn document_markup(&self) -> String;

    /// 一次性替换根元素的全部内容
    fn replace_root_contents(&self, markup: &str);

    fn body(&self) -> Option<Self::Node>;

    /// 订阅 `root` 子树中的新增节点，接收端被丢弃即取消订阅
    fn observe(&self, root: &Self::Node) -> MutationReceiver<Self::Node>;
}

/// 视频页字幕宿主
pub trait CaptionHost: PageDocument {
    /// 当前显示的字幕文本（已去除首尾空白）
    fn caption_text(&self) -> Option<String>;

    /// 创建隐藏的字幕浮层并挂到播放器上（无播放器时挂到 body）
    fn mount_overlay(&self) -> Option<Self::Node>;

    /// 写入文本并显示浮层
    fn show_overlay(&self, overlay: &Self::Node, text: &str);

    fn unmount_overlay(&self, overlay: &Self::Node);
}

/// 向用户弹出提示
pub trait UserNotifier {
    fn alert(&self, message: &str);
}

/// 只写日志的提示器
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl UserNotifier for LogNotifier {
    fn alert(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}
