use std::future::Future;

/// Completed background jobs waiting to be picked up by the frame loop.
/// Jobs run on a worker thread natively and as `spawn_local` futures in the
/// browser; either way results only surface through `drain`.
#[cfg(not(target_arch = "wasm32"))]
pub struct LoadQueue<T> {
    tx: std::sync::mpsc::Sender<T>,
    rx: std::sync::mpsc::Receiver<T>,
}

#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + 'static> LoadQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = std::sync::mpsc::channel();
        Self { tx, rx }
    }

    pub fn spawn<F, Fut>(&self, job: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + 'static,
    {
        let tx = self.tx.clone();
        let spawned = std::thread::Builder::new()
            .name("asset-loader".to_string())
            .spawn(move || {
                // Receiver gone means the app is shutting down
                let _ = tx.send(pollster::block_on(job()));
            });
        if let Err(e) = spawned {
            tracing::error!("failed to spawn asset loader thread: {e}");
        }
    }

    /// Take every result that completed since the last call
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }
}

#[cfg(target_arch = "wasm32")]
pub struct LoadQueue<T> {
    done: std::rc::Rc<std::cell::RefCell<Vec<T>>>,
}

#[cfg(target_arch = "wasm32")]
impl<T: 'static> LoadQueue<T> {
    pub fn new() -> Self {
        Self { done: Default::default() }
    }

    pub fn spawn<F, Fut>(&self, job: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + 'static,
    {
        let done = self.done.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = job().await;
            done.borrow_mut().push(result);
        });
    }

    /// Take every result that completed since the last call
    pub fn drain(&self) -> Vec<T> {
        std::mem::take(&mut *self.done.borrow_mut())
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn results_arrive_through_drain() {
        let queue = LoadQueue::new();
        queue.spawn(|| async { 1 });
        queue.spawn(|| async { 2 });

        let mut seen = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while seen.len() < 2 && Instant::now() < deadline {
            seen.extend(queue.drain());
            std::thread::sleep(Duration::from_millis(5));
        }

        seen.sort();
        assert_eq!(seen, vec![1, 2]);
        assert!(queue.drain().is_empty());
    }
}
