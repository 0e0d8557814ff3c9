//! Transient notifications shown in the status bar.

use std::time::{Duration, Instant};

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Success,
  Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
  pub level:   Level,
  pub message: String,
  raised:      Instant,
}

/// Holds at most one notice; a newer notice replaces the older one.
#[derive(Debug)]
pub struct Notifier {
  current: Option<Notice>,
  ttl:     Duration,
}

impl Default for Notifier {
  fn default() -> Self { Self::with_ttl(NOTICE_TTL) }
}

impl Notifier {
  pub fn with_ttl(ttl: Duration) -> Self { Self { current: None, ttl } }

  pub fn success(&mut self, message: impl Into<String>) {
    self.raise(Level::Success, message.into(), Instant::now());
  }

  /// Surface a failure to the user. Every failure is logged as well.
  pub fn error(&mut self, message: impl Into<String>) {
    let message = message.into();
    tracing::error!(%message, "operation failed");
    self.raise(Level::Error, message, Instant::now());
  }

  fn raise(&mut self, level: Level, message: String, raised: Instant) {
    self.current = Some(Notice { level, message, raised });
  }

  /// The visible notice at `now`, if it has not expired.
  pub fn visible_at(&self, now: Instant) -> Option<&Notice> {
    self
      .current
      .as_ref()
      .filter(|n| now.saturating_duration_since(n.raised) < self.ttl)
  }

  pub fn visible(&self) -> Option<&Notice> { self.visible_at(Instant::now()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn notices_expire_after_ttl() {
    let mut n = Notifier::with_ttl(Duration::from_secs(2));
    let t0 = Instant::now();
    n.raise(Level::Success, "saved".into(), t0);

    assert_eq!(n.visible_at(t0).map(|n| n.message.as_str()), Some("saved"));
    assert!(n.visible_at(t0 + Duration::from_secs(1)).is_some());
    assert!(n.visible_at(t0 + Duration::from_secs(2)).is_none());
  }

  #[test]
  fn newer_notice_replaces_older() {
    let mut n = Notifier::default();
    n.success("saved");
    n.error("delete failed");
    let visible = n.visible().unwrap();
    assert_eq!(visible.level, Level::Error);
    assert_eq!(visible.message, "delete failed");
  }
}
