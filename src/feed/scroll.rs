//! Scroll position restoration.
//!
//! When the feed is re-entered with a `pos` index, [`ScrollRestore`] drives
//! enough page loads to cover that index, waits for the renderer to actually
//! draw the row, jumps to it, lets layout settle and finally asks for the
//! token to be stripped from the location.
//!
//! The machine does no I/O and reads no clock. Callers feed it observations
//! and an [`Instant`] and act on the returned [`ScrollDirective`].

use std::time::{Duration, Instant};

/// Locate attempts before giving up.
pub const MAX_LOCATE_ATTEMPTS: u32 = 10;

/// First retry delay while waiting for the target row to be drawn.
pub const INITIAL_BACKOFF: Duration = Duration::from_millis(16);

/// Ceiling for the doubling retry delay.
pub const MAX_BACKOFF: Duration = Duration::from_millis(512);

/// Pause between the jump and stripping the token.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// What the machine needs to know about the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedObservation {
    pub item_count: usize,
    pub exhausted: bool,
    pub loading: bool,
    pub next_page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPhase {
    Idle,
    AwaitingData {
        target: usize,
    },
    Locating {
        index: usize,
        attempts: u32,
        retry_at: Instant,
    },
    Settling {
        index: usize,
        until: Instant,
    },
    Resolved,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirective {
    /// Nothing to do yet.
    Wait,
    /// Fetch this page (subject to the one-in-flight rule).
    LoadPage(u32),
    /// Center row `i` in the viewport without animation.
    JumpTo(usize),
    /// Remove `pos` from the location with a history replace.
    StripToken,
}

#[derive(Debug, Clone)]
pub struct ScrollRestore {
    phase: ScrollPhase,
}

impl Default for ScrollRestore {
    fn default() -> Self {
        Self {
            phase: ScrollPhase::Idle,
        }
    }
}

impl ScrollRestore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    /// True while a target is being worked towards.
    pub fn is_active(&self) -> bool {
        matches!(
            self.phase,
            ScrollPhase::AwaitingData { .. }
                | ScrollPhase::Locating { .. }
                | ScrollPhase::Settling { .. }
        )
    }

    /// Start restoring to `target`, replacing any restoration in progress.
    pub fn arm(&mut self, target: usize) {
        tracing::debug!(target, "Scroll restoration armed");
        self.phase = ScrollPhase::AwaitingData { target };
    }

    /// Back to `Idle`, dropping any pending target.
    pub fn disarm(&mut self) {
        if self.is_active() {
            tracing::debug!(phase = ?self.phase, "Scroll restoration disarmed");
        }
        self.phase = ScrollPhase::Idle;
    }

    /// Earliest instant at which [`step`](Self::step) may return something new
    /// without a change in observations.
    pub fn next_wakeup(&self) -> Option<Instant> {
        match self.phase {
            ScrollPhase::Locating { retry_at, .. } => Some(retry_at),
            ScrollPhase::Settling { until, .. } => Some(until),
            _ => None,
        }
    }

    /// Advance the machine.
    ///
    /// `rendered_count` is how many rows the last drawn frame laid out; a row
    /// at `index` is only considered present once `rendered_count > index`.
    pub fn step(
        &mut self,
        feed: FeedObservation,
        rendered_count: usize,
        now: Instant,
    ) -> ScrollDirective {
        match self.phase {
            ScrollPhase::Idle | ScrollPhase::Resolved | ScrollPhase::Abandoned => {
                ScrollDirective::Wait
            }
            ScrollPhase::AwaitingData { target } => {
                if feed.item_count > target {
                    self.begin_locating(target, now);
                    self.step(feed, rendered_count, now)
                } else if feed.exhausted {
                    if feed.item_count == 0 {
                        tracing::debug!(target, "Feed exhausted with no items, abandoning");
                        self.phase = ScrollPhase::Abandoned;
                        return ScrollDirective::StripToken;
                    }
                    let clamped = feed.item_count - 1;
                    tracing::debug!(target, clamped, "Feed exhausted, clamping scroll target");
                    self.begin_locating(clamped, now);
                    self.step(feed, rendered_count, now)
                } else if feed.loading {
                    ScrollDirective::Wait
                } else {
                    ScrollDirective::LoadPage(feed.next_page)
                }
            }
            ScrollPhase::Locating {
                index,
                attempts,
                retry_at,
            } => {
                if now < retry_at {
                    return ScrollDirective::Wait;
                }
                if rendered_count > index {
                    tracing::debug!(index, attempts, "Scroll target located");
                    self.phase = ScrollPhase::Settling {
                        index,
                        until: now + SETTLE_DELAY,
                    };
                    return ScrollDirective::JumpTo(index);
                }
                let attempts = attempts + 1;
                if attempts >= MAX_LOCATE_ATTEMPTS {
                    tracing::debug!(index, attempts, "Scroll target never rendered, abandoning");
                    self.phase = ScrollPhase::Abandoned;
                    return ScrollDirective::StripToken;
                }
                self.phase = ScrollPhase::Locating {
                    index,
                    attempts,
                    retry_at: now + backoff(attempts),
                };
                ScrollDirective::Wait
            }
            ScrollPhase::Settling { index, until } => {
                if now < until {
                    return ScrollDirective::Wait;
                }
                tracing::debug!(index, "Scroll restoration resolved");
                self.phase = ScrollPhase::Resolved;
                ScrollDirective::StripToken
            }
        }
    }

    fn begin_locating(&mut self, index: usize, now: Instant) {
        self.phase = ScrollPhase::Locating {
            index,
            attempts: 0,
            retry_at: now,
        };
    }
}

/// Delay before locate attempt `attempt + 1`: 16ms doubling, capped.
pub fn backoff(attempt: u32) -> Duration {
    let shift = attempt.saturating_sub(1).min(16);
    INITIAL_BACKOFF
        .saturating_mul(1u32 << shift)
        .min(MAX_BACKOFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feed(item_count: usize, exhausted: bool, loading: bool) -> FeedObservation {
        FeedObservation {
            item_count,
            exhausted,
            loading,
            next_page: if item_count == 0 {
                1
            } else {
                (item_count / 10) as u32 + 1
            },
        }
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        let delays: Vec<u64> = (1..=8).map(|a| backoff(a).as_millis() as u64).collect();
        assert_eq!(delays, vec![16, 32, 64, 128, 256, 512, 512, 512]);
    }

    #[test]
    fn test_idle_waits() {
        let mut scroll = ScrollRestore::new();
        let now = Instant::now();
        assert_eq!(scroll.step(feed(50, false, false), 50, now), ScrollDirective::Wait);
        assert!(!scroll.is_active());
    }

    #[test]
    fn test_requests_pages_until_target_covered() {
        let mut scroll = ScrollRestore::new();
        let now = Instant::now();
        scroll.arm(23);

        assert_eq!(scroll.step(feed(0, false, false), 0, now), ScrollDirective::LoadPage(1));
        assert_eq!(scroll.step(feed(0, false, true), 0, now), ScrollDirective::Wait);
        assert_eq!(scroll.step(feed(10, false, false), 10, now), ScrollDirective::LoadPage(2));
        assert_eq!(scroll.step(feed(20, false, false), 20, now), ScrollDirective::LoadPage(3));
        assert_eq!(scroll.step(feed(30, false, false), 30, now), ScrollDirective::JumpTo(23));
    }

    #[test]
    fn test_full_resolution_strips_token_after_settle() {
        let mut scroll = ScrollRestore::new();
        let start = Instant::now();
        scroll.arm(4);

        assert_eq!(scroll.step(feed(10, false, false), 10, start), ScrollDirective::JumpTo(4));
        assert_eq!(scroll.next_wakeup(), Some(start + SETTLE_DELAY));

        let early = start + Duration::from_millis(100);
        assert_eq!(scroll.step(feed(10, false, false), 10, early), ScrollDirective::Wait);

        let settled = start + SETTLE_DELAY;
        assert_eq!(scroll.step(feed(10, false, false), 10, settled), ScrollDirective::StripToken);
        assert_eq!(scroll.phase(), ScrollPhase::Resolved);
        assert_eq!(scroll.step(feed(10, false, false), 10, settled), ScrollDirective::Wait);
    }

    #[test]
    fn test_exhausted_feed_clamps_target() {
        let mut scroll = ScrollRestore::new();
        let now = Instant::now();
        scroll.arm(40);

        assert_eq!(scroll.step(feed(7, true, false), 7, now), ScrollDirective::JumpTo(6));
    }

    #[test]
    fn test_exhausted_empty_feed_abandons() {
        let mut scroll = ScrollRestore::new();
        scroll.arm(3);

        let directive = scroll.step(feed(0, true, false), 0, Instant::now());

        assert_eq!(directive, ScrollDirective::StripToken);
        assert_eq!(scroll.phase(), ScrollPhase::Abandoned);
    }

    #[test]
    fn test_waits_for_row_to_be_drawn_with_backoff() {
        let mut scroll = ScrollRestore::new();
        let start = Instant::now();
        scroll.arm(15);

        // Data is there but the last frame only laid out 12 rows.
        assert_eq!(scroll.step(feed(20, false, false), 12, start), ScrollDirective::Wait);
        assert_eq!(scroll.next_wakeup(), Some(start + Duration::from_millis(16)));

        // Before the retry instant nothing happens even if the row appears.
        let before = start + Duration::from_millis(5);
        assert_eq!(scroll.step(feed(20, false, false), 20, before), ScrollDirective::Wait);

        let retry = start + Duration::from_millis(16);
        assert_eq!(scroll.step(feed(20, false, false), 20, retry), ScrollDirective::JumpTo(15));
    }

    #[test]
    fn test_abandons_after_max_attempts() {
        let mut scroll = ScrollRestore::new();
        let mut now = Instant::now();
        scroll.arm(5);

        let mut strips = 0;
        for _ in 0..MAX_LOCATE_ATTEMPTS {
            match scroll.step(feed(10, false, false), 0, now) {
                ScrollDirective::StripToken => strips += 1,
                ScrollDirective::Wait => {}
                other => panic!("unexpected directive {other:?}"),
            }
            now = scroll.next_wakeup().unwrap_or(now);
        }

        assert_eq!(strips, 1);
        assert_eq!(scroll.phase(), ScrollPhase::Abandoned);
    }

    #[test]
    fn test_rearm_restarts_from_awaiting() {
        let mut scroll = ScrollRestore::new();
        let now = Instant::now();
        scroll.arm(2);
        scroll.step(feed(10, false, false), 10, now);

        scroll.arm(30);
        assert_eq!(scroll.phase(), ScrollPhase::AwaitingData { target: 30 });

        scroll.disarm();
        assert_eq!(scroll.phase(), ScrollPhase::Idle);
    }
}
