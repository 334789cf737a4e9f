//! 单线程防抖
//!
//! 计时任务与执行任务分开：重新调度只会取消尚未到期的计时器，
//! 已经开始执行的动作（例如正在等待的网络请求）不会被中断。
//! 所有任务通过 `spawn_local` 运行，调用方必须处于 `LocalSet` 中。

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use tokio::task::{spawn_local, JoinHandle};

/// 增量翻译的防抖方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebounceMode {
    /// 所有节点共享一个计时器，只有最后一次调度会执行
    #[default]
    Shared,
    /// 每个节点独立计时
    PerNode,
}

fn spawn_timer<F, Fut>(window: Duration, action: F) -> JoinHandle<()>
where
    F: FnOnce() -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    spawn_local(async move {
        tokio::time::sleep(window).await;
        spawn_local(action());
    })
}

/// 单槽防抖器
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: RefCell<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: RefCell::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// 在窗口结束后执行 `action`，替换掉尚未到期的上一次调度
    pub fn schedule<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let timer = spawn_timer(self.window, action);
        if let Some(previous) = self.pending.replace(Some(timer)) {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .borrow()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// 按键独立计时的防抖器
#[derive(Debug)]
pub struct KeyedDebouncer<K> {
    window: Duration,
    pending: RefCell<HashMap<K, JoinHandle<()>>>,
}

impl<K: Eq + Hash> KeyedDebouncer<K> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: RefCell::new(HashMap::new()),
        }
    }

    pub fn schedule<F, Fut>(&self, key: K, action: F)
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let timer = spawn_timer(self.window, action);
        let mut pending = self.pending.borrow_mut();
        pending.retain(|_, handle| !handle.is_finished());
        if let Some(previous) = pending.insert(key, timer) {
            previous.abort();
        }
    }

    pub fn cancel_all(&self) {
        for (_, handle) in self.pending.borrow_mut().drain() {
            handle.abort();
        }
    }

    /// 尚未到期的计时器数量
    pub fn pending_count(&self) -> usize {
        self.pending
            .borrow()
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }
}

impl<K> Drop for KeyedDebouncer<K> {
    fn drop(&mut self) {
        for (_, handle) in self.pending.get_mut().drain() {
            handle.abort();
        }
    }
}
