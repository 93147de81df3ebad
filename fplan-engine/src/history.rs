use std::collections::VecDeque;
use std::sync::Arc;

use tracing::trace;

/// 线性撤销/重做历史：`past` / `present` / `future` 三段，均保存完整快照。
///
/// 快照以 `Arc<T>` 持有，`snapshot()` 复制当前状态只增加引用计数。
/// `commit` 在新值与当前值为同一个 `Arc` 时不做任何事。
#[derive(Debug)]
pub struct History<T> {
    /// 最旧的快照位于队首。
    past: VecDeque<Arc<T>>,
    present: Arc<T>,
    /// 下一次 redo 的目标位于队首。
    future: VecDeque<Arc<T>>,
    max_depth: Option<usize>,
}

impl<T> History<T> {
    pub fn new(initial: impl Into<Arc<T>>) -> Self {
        Self::with_max_depth(initial, None)
    }

    /// `max_depth` 限制 `past` 的长度，超出时丢弃最旧的快照。
    pub fn with_max_depth(initial: impl Into<Arc<T>>, max_depth: Option<usize>) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial.into(),
            future: VecDeque::new(),
            max_depth,
        }
    }

    #[inline]
    pub fn present(&self) -> &T {
        &self.present
    }

    #[inline]
    pub fn present_arc(&self) -> &Arc<T> {
        &self.present
    }

    /// 提交新状态并形成一个独立的撤销步骤，同时清空 `future`。
    pub fn commit(&mut self, value: impl Into<Arc<T>>) -> bool {
        let value = value.into();
        if Arc::ptr_eq(&value, &self.present) {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, value);
        self.past.push_back(previous);
        self.future.clear();
        self.enforce_depth();
        true
    }

    /// 原地替换 `present`，不触碰 `past` 与 `future`。连续拖拽的每一帧都走这里。
    pub fn commit_overwrite(&mut self, value: impl Into<Arc<T>>) -> bool {
        let value = value.into();
        if Arc::ptr_eq(&value, &self.present) {
            return false;
        }
        self.present = value;
        true
    }

    /// 将当前状态压入 `past`（present 不变）并清空 `future`，用作手势开始前的检查点。
    pub fn snapshot(&mut self) {
        self.past.push_back(Arc::clone(&self.present));
        self.future.clear();
        self.enforce_depth();
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            trace!("undo 栈为空，忽略");
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            trace!("redo 栈为空，忽略");
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        self.enforce_depth();
        true
    }

    /// 丢弃全部历史并以新值作为起点，用于整体加载文档。
    pub fn reset(&mut self, value: impl Into<Arc<T>>) {
        self.present = value.into();
        self.past.clear();
        self.future.clear();
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    #[inline]
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    #[inline]
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn past(&self) -> impl Iterator<Item = &T> + '_ {
        self.past.iter().map(|value| value.as_ref())
    }

    pub fn future(&self) -> impl Iterator<Item = &T> + '_ {
        self.future.iter().map(|value| value.as_ref())
    }

    fn enforce_depth(&mut self) {
        if let Some(limit) = self.max_depth {
            while self.past.len() > limit {
                self.past.pop_front();
            }
        }
    }
}

impl<T: Clone> History<T> {
    /// 复制当前状态，用于"复制-修改-提交"式编辑。
    #[inline]
    pub fn present_cloned(&self) -> T {
        self.present.as_ref().clone()
    }
}
