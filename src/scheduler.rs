use crate::event::AppEvent;
use std::sync::mpsc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time;
use tokio_util::sync::CancellationToken;

/// What one scheduler tick refreshes, given the page in view. Statistics
/// always refresh; the message page only on page 1, so a user reviewing a
/// later page is not disrupted by shifting data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPlan {
    pub stats: bool,
    pub messages: bool,
}

pub fn plan_tick(current_page: u32) -> TickPlan {
    TickPlan {
        stats: true,
        messages: current_page == 1,
    }
}

/// Recurring background refresh. Emits `RefreshTick` on the event channel at
/// a fixed interval; the UI thread decides what to fetch. Fetch failures
/// never stop the schedule. Cancelled explicitly via `stop` or on drop.
pub struct RefreshScheduler {
    cancel: CancellationToken,
}

impl RefreshScheduler {
    pub fn start(
        runtime_handle: Handle,
        tx: mpsc::Sender<AppEvent>,
        repaint: egui::Context,
        interval: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        runtime_handle.spawn(async move {
            let mut ticker = time::interval(interval);
            // The first tick completes immediately; the initial load is
            // triggered by the app itself, so skip it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if tx.send(AppEvent::RefreshTick).is_err() {
                            break;
                        }
                        repaint.request_repaint();
                    }
                }
            }
        });

        Self { cancel }
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::plan_tick;

    #[test]
    fn tick_on_page_one_refreshes_stats_and_messages() {
        let plan = plan_tick(1);
        assert!(plan.stats);
        assert!(plan.messages);
    }

    #[test]
    fn tick_on_a_later_page_refreshes_stats_only() {
        let plan = plan_tick(2);
        assert!(plan.stats);
        assert!(!plan.messages);
    }
}
