use std::time::Duration;

use tokio::time::Instant;

/// Tracks server pings. Engine.IO v4 servers ping and the client answers, so
/// the client only has to notice when pings stop.
#[derive(Debug, Clone)]
pub struct PingMonitor {
    window: Duration,
    last_ping: Instant,
    pings: u64,
}

impl PingMonitor {
    /// The connection is dead once no ping arrived within
    /// `ping_interval + ping_timeout`.
    #[must_use]
    pub fn new(ping_interval_ms: u64, ping_timeout_ms: u64) -> Self {
        Self {
            window: Duration::from_millis(ping_interval_ms.saturating_add(ping_timeout_ms)),
            last_ping: Instant::now(),
            pings: 0,
        }
    }

    pub fn record_ping(&mut self) {
        self.last_ping = Instant::now();
        self.pings += 1;
    }

    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.last_ping + self.window
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    #[must_use]
    pub const fn pings(&self) -> u64 {
        self.pings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_moves_with_each_ping() {
        let mut monitor = PingMonitor::new(25_000, 20_000);
        let start = Instant::now();

        assert_eq!(monitor.window(), Duration::from_secs(45));
        assert_eq!(monitor.deadline(), start + Duration::from_secs(45));

        tokio::time::advance(Duration::from_secs(10)).await;
        monitor.record_ping();

        assert_eq!(monitor.deadline(), start + Duration::from_secs(55));
        assert_eq!(monitor.pings(), 1);
    }
}
