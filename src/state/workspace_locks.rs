//! 工作副本互斥
//!
//! 同名工作副本的部署串行执行，避免"删除旧目录再 clone"的竞态；
//! 不同名称之间互不阻塞

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// 按工作副本名称分配的异步锁
#[derive(Default)]
pub struct WorkspaceLocks {
    /// 名称 -> 锁（弱引用，没有持有者时自动失效）
    locks: Mutex<HashMap<String, Weak<Mutex<()>>>>,
}

impl WorkspaceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指定名称的锁，持有期间同名请求等待
    pub async fn acquire(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, weak| weak.strong_count() > 0);

            match locks.get(name).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(Mutex::new(()));
                    locks.insert(name.to_string(), Arc::downgrade(&lock));
                    lock
                }
            }
        };

        lock.lock_owned().await
    }

    /// 当前仍被持有或等待的名称数量
    pub async fn active_count(&self) -> usize {
        let locks = self.locks.lock().await;
        locks.values().filter(|w| w.strong_count() > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_name_is_serialized() {
        let locks = Arc::new(WorkspaceLocks::new());
        let guard = locks.acquire("app").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("app").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should acquire after release")
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_names_do_not_block() {
        let locks = WorkspaceLocks::new();
        let _a = locks.acquire("a").await;
        let b = tokio::time::timeout(Duration::from_millis(200), locks.acquire("b")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_released_entries_are_dropped() {
        let locks = WorkspaceLocks::new();
        {
            let _guard = locks.acquire("app").await;
            assert_eq!(locks.active_count().await, 1);
        }
        assert_eq!(locks.active_count().await, 0);
    }
}
