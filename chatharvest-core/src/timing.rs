use std::time::Duration;

/// Delays, poll intervals and loop bounds used while driving the page.
///
/// The defaults were picked empirically against live sites and have no
/// deeper meaning; every value can be overridden from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    /// Wait after opening the sidebar (UI animation).
    pub sidebar_settle: Duration,
    /// Wait between a scroll step and the next count read.
    pub discovery_poll: Duration,
    /// Upper bound on scroll rounds during discovery.
    pub discovery_max_rounds: usize,
    /// Consecutive unchanged counts that mark the list as fully loaded.
    pub discovery_stable_rounds: usize,
    /// Wait for the conversation page to render before touching it.
    pub render_settle: Duration,
    /// Wait between scroll-to-bottom checks while materializing content.
    pub materialize_poll: Duration,
    /// Upper bound on scroll-to-bottom checks.
    pub materialize_max_checks: usize,
    /// Wait between materializing and running the strategy cascade.
    pub cascade_settle: Duration,
    /// Interval between `document.readyState` polls after navigation.
    pub ready_poll: Duration,
    /// Upper bound on readiness polls.
    pub ready_max_polls: usize,
    /// Extra wait once the document reports ready.
    pub navigate_settle: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            sidebar_settle: Duration::from_millis(1500),
            discovery_poll: Duration::from_millis(800),
            discovery_max_rounds: 100,
            discovery_stable_rounds: 5,
            render_settle: Duration::from_millis(2000),
            materialize_poll: Duration::from_millis(700),
            materialize_max_checks: 60,
            cascade_settle: Duration::from_millis(1000),
            ready_poll: Duration::from_millis(500),
            ready_max_polls: 30,
            navigate_settle: Duration::from_millis(3000),
        }
    }
}
