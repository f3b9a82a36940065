//! Scroll geometry, untangled from any rendering layer.
//!
//! The widget reacts to two scroll positions: near the top (backfill older
//! history) and near the bottom (re-arm follow-the-conversation). Raw scroll
//! events arrive far faster than either needs, so [`ScrollTranslator`]
//! throttles them and emits at most one command per event.
//!
//! Backfill prepends content, which would visually yank the viewport to
//! older messages; [`preserve_offset`](ScrollMetrics::preserve_offset)
//! computes the corrected scroll position that keeps the pre-fetch anchor
//! message in place.

/// Scroll events closer together than this are dropped.
const THROTTLE_INTERVAL_MS: i64 = 200;

/// Distance from the top edge, in pixels, that triggers a backfill.
const NEAR_TOP_PX: f64 = 50.0;

/// Distance from the bottom edge that counts as "following the latest".
const NEAR_BOTTOM_PX: f64 = 50.0;

/// A snapshot of the scroll container's geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Pixels scrolled from the top.
    pub scroll_top: f64,
    /// Total scrollable content height.
    pub scroll_height: f64,
    /// Visible viewport height.
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn near_top(&self) -> bool {
        self.scroll_top <= NEAR_TOP_PX
    }

    pub fn near_bottom(&self) -> bool {
        self.scroll_height - (self.scroll_top + self.viewport_height) <= NEAR_BOTTOM_PX
    }

    /// The scroll position that keeps the current anchor message in place
    /// after content of height `new_scroll_height - self.scroll_height` was
    /// prepended above it.
    pub fn preserve_offset(&self, new_scroll_height: f64) -> f64 {
        self.scroll_top + (new_scroll_height - self.scroll_height)
    }
}

/// What the widget should do in response to a scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCommand {
    /// Backfill a page of older history.
    LoadOlder,
    /// The user is at the latest message again; resume auto-follow.
    FollowLatest,
    /// Fetch the next page of the session listing.
    LoadMore,
}

/// Throttled translator from raw scroll events to [`ScrollCommand`]s.
#[derive(Debug, Default)]
pub struct ScrollTranslator {
    last_event_ms: Option<i64>,
}

impl ScrollTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one scroll event. Returns at most one command; events inside the
    /// throttle window return nothing.
    pub fn translate(&mut self, metrics: ScrollMetrics, now_ms: i64) -> Option<ScrollCommand> {
        if let Some(last) = self.last_event_ms {
            if now_ms - last < THROTTLE_INTERVAL_MS {
                return None;
            }
        }
        self.last_event_ms = Some(now_ms);

        if metrics.near_top() {
            Some(ScrollCommand::LoadOlder)
        } else if metrics.near_bottom() {
            Some(ScrollCommand::FollowLatest)
        } else {
            None
        }
    }

    /// Feed one session-list scroll event. The listing paginates downward,
    /// so only the bottom edge matters. Use a separate translator per
    /// container; the throttle window is not shared.
    pub fn translate_list(&mut self, metrics: ScrollMetrics, now_ms: i64) -> Option<ScrollCommand> {
        if let Some(last) = self.last_event_ms {
            if now_ms - last < THROTTLE_INTERVAL_MS {
                return None;
            }
        }
        self.last_event_ms = Some(now_ms);

        metrics.near_bottom().then_some(ScrollCommand::LoadMore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(scroll_top: f64) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top,
            scroll_height: 2000.0,
            viewport_height: 600.0,
        }
    }

    #[test]
    fn test_near_top_triggers_backfill() {
        let mut translator = ScrollTranslator::new();
        assert_eq!(
            translator.translate(metrics(10.0), 0),
            Some(ScrollCommand::LoadOlder)
        );
    }

    #[test]
    fn test_near_bottom_rearms_follow() {
        let mut translator = ScrollTranslator::new();
        // 2000 - (1380 + 600) = 20px from the bottom.
        assert_eq!(
            translator.translate(metrics(1380.0), 0),
            Some(ScrollCommand::FollowLatest)
        );
    }

    #[test]
    fn test_middle_of_log_is_quiet() {
        let mut translator = ScrollTranslator::new();
        assert_eq!(translator.translate(metrics(800.0), 0), None);
    }

    #[test]
    fn test_events_inside_throttle_window_dropped() {
        let mut translator = ScrollTranslator::new();
        assert!(translator.translate(metrics(10.0), 0).is_some());
        assert!(translator.translate(metrics(10.0), 100).is_none());
        assert!(translator.translate(metrics(10.0), 199).is_none());
        assert!(translator.translate(metrics(10.0), 250).is_some());
    }

    #[test]
    fn test_list_translator_only_fires_at_bottom() {
        let mut translator = ScrollTranslator::new();
        assert_eq!(translator.translate_list(metrics(10.0), 0), None);
        assert_eq!(
            translator.translate_list(metrics(1390.0), 300),
            Some(ScrollCommand::LoadMore)
        );
    }

    #[test]
    fn test_preserve_offset_accounts_for_prepended_height() {
        let before = metrics(30.0);
        // A backfill grew the content from 2000 to 2700 pixels.
        assert_eq!(before.preserve_offset(2700.0), 730.0);
    }
}
