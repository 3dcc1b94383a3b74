use dashmap::DashMap;
use serenity::model::id::MessageId;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Serializes work on a single original message. Idle locks are dropped from the map.
#[derive(Debug, Default)]
pub struct MessageLocks {
    inner: DashMap<MessageId, Arc<Mutex<()>>>,
}

pub struct MessageGuard<'a> {
    locks: &'a MessageLocks,
    id: MessageId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl MessageLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, id: MessageId) -> MessageGuard<'_> {
        let mutex = self.inner.entry(id).or_default().clone();
        let guard = mutex.lock_owned().await;
        MessageGuard {
            locks: self,
            id,
            guard: Some(guard),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Drop for MessageGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // only the map's handle left means nobody holds or waits on it
        self.locks
            .inner
            .remove_if(&self.id, |_, m| Arc::strong_count(m) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn second_lock_waits_for_the_first() {
        let locks = Arc::new(MessageLocks::new());
        let id = MessageId::new(42);
        let first = locks.lock(id).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.lock(id).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(first);
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn different_messages_do_not_block() {
        let locks = MessageLocks::new();
        let _a = locks.lock(MessageId::new(1)).await;
        let _b = tokio::time::timeout(Duration::from_secs(1), locks.lock(MessageId::new(2)))
            .await
            .unwrap();
        assert_eq!(locks.len(), 2);
    }
}
