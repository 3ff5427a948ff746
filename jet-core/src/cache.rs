use tokio::sync::watch;

/// Latest value of a cache, or `Pending` before the first population.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Snapshot<T> {
    #[default]
    Pending,
    Ready(T),
}

impl<T> Snapshot<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Snapshot::Ready(_))
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Snapshot::Ready(value) => Some(value),
            Snapshot::Pending => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            Snapshot::Ready(value) => Some(value),
            Snapshot::Pending => None,
        }
    }
}

/// Single-slot, overwrite-on-write, multi-reader cache.
#[derive(Debug)]
pub struct BroadcastCache<T> {
    tx: watch::Sender<Snapshot<T>>,
}

impl<T: Clone> BroadcastCache<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Snapshot::Pending);
        Self { tx }
    }

    /// Replaces the whole snapshot; every reader observes the new value.
    pub fn publish(&self, value: T) {
        self.tx.send_replace(Snapshot::Ready(value));
    }

    pub fn latest(&self) -> Snapshot<T> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> CacheReader<T> {
        CacheReader {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T: Clone> Default for BroadcastCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct CacheReader<T> {
    rx: watch::Receiver<Snapshot<T>>,
}

impl<T: Clone> CacheReader<T> {
    pub fn latest(&self) -> Snapshot<T> {
        self.rx.borrow().clone()
    }

    /// Marks the current value as seen and returns it.
    pub fn current(&mut self) -> Snapshot<T> {
        self.rx.borrow_and_update().clone()
    }

    /// Waits for the next publish. Returns `None` once the cache is gone.
    pub async fn changed(&mut self) -> Option<Snapshot<T>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Waits for the first population. Returns `None` if the cache is dropped
    /// while still pending.
    pub async fn wait_ready(&mut self) -> Option<T> {
        let snapshot = self.rx.wait_for(Snapshot::is_ready).await.ok()?;
        snapshot.as_ready().cloned()
    }
}
