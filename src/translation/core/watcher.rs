//! 结构变化监听
//!
//! 文档只负责把变化记录放进通道；去抖计时器由这里持有。
//! 每收到一条新记录，计时器重新开始。

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{self, Instant};

use crate::parsers::html::MutationRecord;

/// 去抖的结构变化监听器
#[derive(Debug)]
pub struct MutationWatcher {
    receiver: UnboundedReceiver<MutationRecord>,
    debounce: Duration,
}

impl MutationWatcher {
    pub fn new(receiver: UnboundedReceiver<MutationRecord>, debounce: Duration) -> Self {
        Self { receiver, debounce }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// 等待下一条记录，通道关闭时返回 `None`
    pub async fn next_record(&mut self) -> Option<MutationRecord> {
        self.receiver.recv().await
    }

    /// 等待一个完整的静默期
    ///
    /// 期间每到达一条记录都重新计时。返回 `false` 表示通道已关闭。
    pub async fn settle(&mut self) -> bool {
        let sleep = time::sleep(self.debounce);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                record = self.receiver.recv() => match record {
                    Some(_) => sleep.as_mut().reset(Instant::now() + self.debounce),
                    None => return false,
                },
                _ = &mut sleep => return true,
            }
        }
    }
}
