use std::time::Duration;

use tokio::task::JoinHandle;

/// Interval timer for carousel autoplay on a tokio host.
///
/// Calls `on_tick` once per interval (typically forwarding to
/// `CarouselController::tick`). The task is aborted on [`cancel`] and on
/// drop, so detaching an element releases its timer. Hosts restart the
/// driver when the element's `autoplay_interval` changes.
///
/// [`cancel`]: AutoplayDriver::cancel
pub struct AutoplayDriver {
    handle: JoinHandle<()>,
}

impl AutoplayDriver {
    pub fn spawn(interval: Duration, mut on_tick: impl FnMut() + Send + 'static) -> Self {
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            // A tokio interval yields immediately on its first tick.
            timer.tick().await;
            loop {
                timer.tick().await;
                on_tick();
            }
        });
        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for AutoplayDriver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
