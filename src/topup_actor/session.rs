use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::gateway::HostedWindow;

/// How watching a hosted checkout window ended.
///
/// `Closed` only means the user is done with the page; whether they paid is
/// for verification to decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Closed,
    TimedOut,
    Cancelled,
}

/// Polls `window` every `poll_interval` until it closes, `timeout` elapses or
/// `cancel` fires. Poll and timeout live in this one future, so whichever
/// finishes first retires both.
pub async fn watch_window(
    window: &dyn HostedWindow,
    poll_interval: Duration,
    timeout: Duration,
    cancel: &CancellationToken,
) -> SessionEvent {
    let mut ticker = time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the window is checked after a full interval.
    ticker.tick().await;

    let deadline = time::sleep(timeout);
    tokio::pin!(deadline);

    let mut polls: u32 = 0;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return SessionEvent::Cancelled,
            _ = &mut deadline => return SessionEvent::TimedOut,
            _ = ticker.tick() => {
                polls += 1;
                if window.is_closed() {
                    debug!(polls, "Checkout window closed");
                    return SessionEvent::Closed;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_framework::ScriptedWindow;

    #[tokio::test(start_paused = true)]
    async fn reports_closure_after_polling() {
        let window = ScriptedWindow::closing_after(3);
        let started = time::Instant::now();

        let event = watch_window(&window, Duration::from_secs(2), Duration::from_secs(600), &CancellationToken::new()).await;

        assert_eq!(event, SessionEvent::Closed);
        assert_eq!(window.polls(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_at_the_deadline() {
        let window = ScriptedWindow::never_closing();

        let event = watch_window(&window, Duration::from_secs(2), Duration::from_secs(600), &CancellationToken::new()).await;

        assert_eq!(event, SessionEvent::TimedOut);
        assert!(window.polls() >= 299);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_polling() {
        let window = ScriptedWindow::never_closing();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(5)).await;
            trigger.cancel();
        });

        let event = watch_window(&window, Duration::from_secs(2), Duration::from_secs(600), &cancel).await;

        assert_eq!(event, SessionEvent::Cancelled);
        assert_eq!(window.polls(), 2);
    }
}
