//! Change monitoring and debounced re-highlighting
//!
//! The monitor drains the document's mutation journal, decides which records
//! touch a watched message body, and re-runs the highlighter once the
//! document has been quiet for the debounce period. Time always comes from
//! the caller; nothing here sleeps or spawns.

use crate::dom::{Document, Mutation, NodeId};
use crate::error::HighlightError;
use crate::highlight::{Highlighter, PassReport};
use crate::keywords::KeywordStore;
use crate::visibility::VisibilityProbe;
use std::time::Instant;

/// Debounce state machine: `Idle → Pending → Running → Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    /// A pass is due at `deadline` unless another relevant mutation arrives
    Pending { deadline: Instant },
    Running,
}

/// Result of a poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing to do
    Idle,
    /// Waiting for the debounce period to pass
    Pending,
    /// A pass ran
    Ran(PassReport),
    /// A pass was due but could not run
    Skipped(HighlightError),
}

/// Watches a document and re-highlights after relevant changes
pub struct ChangeMonitor<S, P> {
    highlighter: Highlighter<S, P>,
    state: MonitorState,
}

impl<S: KeywordStore, P: VisibilityProbe> ChangeMonitor<S, P> {
    pub fn new(highlighter: Highlighter<S, P>) -> Self {
        ChangeMonitor {
            highlighter,
            state: MonitorState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn highlighter(&self) -> &Highlighter<S, P> {
        &self.highlighter
    }

    /// Arm the debounce timer as if a relevant mutation happened at `now`
    pub fn trigger(&mut self, now: Instant) {
        if self.state != MonitorState::Running {
            self.state = MonitorState::Pending {
                deadline: now + self.highlighter.config().debounce,
            };
        }
    }

    /// Drain pending mutation records; any relevant one (re)arms the timer
    pub fn observe(&mut self, doc: &mut Document, now: Instant) -> MonitorState {
        let records = doc.take_mutations();
        let doc: &Document = doc;
        let mut relevant = 0;
        for record in records.iter().filter(|m| self.is_relevant(doc, m)) {
            tracing::trace!(kind = ?record.kind, target = record.target, "relevant mutation");
            relevant += 1;
        }
        if relevant > 0 {
            tracing::trace!(relevant, total = records.len(), "mutations observed");
            self.trigger(now);
        }
        self.state
    }

    /// Observe, then run the pass if its deadline has passed
    pub fn poll(&mut self, doc: &mut Document, now: Instant) -> PollOutcome {
        self.observe(doc, now);

        match self.state {
            MonitorState::Idle => PollOutcome::Idle,
            MonitorState::Pending { deadline } if now < deadline => PollOutcome::Pending,
            MonitorState::Pending { .. } | MonitorState::Running => {
                self.state = MonitorState::Running;
                let result = self.highlighter.run(doc);
                self.state = MonitorState::Idle;
                match result {
                    Ok(report) => PollOutcome::Ran(report),
                    Err(err) => PollOutcome::Skipped(err),
                }
            }
        }
    }

    /// Check whether a mutation touches a watched body.
    ///
    /// Relevant when the target is, or is inside, a body element, or when an
    /// added or removed node is or contains one. The highlighter's own writes
    /// never reach the journal, so host edits inside markers count like any
    /// other.
    pub fn is_relevant(&self, doc: &Document, mutation: &Mutation) -> bool {
        let config = self.highlighter.config();
        if std::iter::once(mutation.target)
            .chain(doc.ancestors(mutation.target))
            .any(|id| doc.has_class(id, &config.body_class))
        {
            return true;
        }
        mutation
            .added
            .iter()
            .chain(&mutation.removed)
            .any(|&id| self.holds_body(doc, id))
    }

    fn holds_body(&self, doc: &Document, id: NodeId) -> bool {
        let class = &self.highlighter.config().body_class;
        doc.has_class(id, class) || doc.first_with_class(id, class).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::dom::{inner_markup, DOCUMENT_NODE};
    use crate::keywords::MemoryStore;
    use crate::visibility::InlineStyleProbe;
    use std::time::Duration;

    type Monitor = ChangeMonitor<MemoryStore, InlineStyleProbe>;

    fn monitor(keywords: &[&str]) -> Monitor {
        let store = MemoryStore::with_keywords(keywords.iter().map(|s| s.to_string()).collect());
        ChangeMonitor::new(Highlighter::new(EngineConfig::default(), store, InlineStyleProbe))
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn body_text(doc: &Document) -> NodeId {
        let body = doc.first_with_class(DOCUMENT_NODE, "a3s").unwrap();
        doc.get(body).unwrap().first_child.unwrap()
    }

    #[test]
    fn test_debounce_timed_from_last_mutation() {
        let mut doc = Document::parse(r#"<div class="a3s">hello</div>"#);
        let mut monitor = monitor(&["spam"]);
        let t0 = Instant::now();
        let text = body_text(&doc);

        doc.set_text(text, "hello spam");
        assert_eq!(
            monitor.observe(&mut doc, t0),
            MonitorState::Pending { deadline: t0 + ms(100) }
        );

        doc.set_text(text, "hello spam again");
        monitor.observe(&mut doc, t0 + ms(10));
        assert_eq!(monitor.state(), MonitorState::Pending { deadline: t0 + ms(110) });

        assert_eq!(monitor.poll(&mut doc, t0 + ms(100)), PollOutcome::Pending);
        let outcome = monitor.poll(&mut doc, t0 + ms(110));
        assert_eq!(outcome, PollOutcome::Ran(PassReport { removed: 0, spans: 1, markers: 1 }));
        assert_eq!(monitor.poll(&mut doc, t0 + ms(500)), PollOutcome::Idle);
    }

    #[test]
    fn test_own_writes_do_not_rearm() {
        let mut doc = Document::parse(r#"<div class="a3s">spam spam</div>"#);
        let mut monitor = monitor(&["spam"]);
        let t0 = Instant::now();

        monitor.trigger(t0);
        assert!(matches!(monitor.poll(&mut doc, t0 + ms(100)), PollOutcome::Ran(_)));
        assert_eq!(doc.pending_mutations(), 0);
        assert_eq!(monitor.poll(&mut doc, t0 + ms(300)), PollOutcome::Idle);
    }

    #[test]
    fn test_mutations_outside_body_ignored() {
        let mut doc = Document::parse(r#"<div id="nav">inbox</div><div class="a3s">x</div>"#);
        let mut monitor = monitor(&["spam"]);
        let nav = doc.descendants(DOCUMENT_NODE).next().unwrap();
        let extra = doc.create_text(" (3)");
        doc.append_child(nav, extra);

        assert_eq!(monitor.observe(&mut doc, Instant::now()), MonitorState::Idle);
        assert_eq!(doc.pending_mutations(), 0);
    }

    #[test]
    fn test_host_edit_inside_marker_rearms() {
        let mut doc = Document::parse(r#"<div class="a3s">a spam b</div>"#);
        let mut monitor = monitor(&["spam"]);
        let t0 = Instant::now();
        monitor.trigger(t0);
        monitor.poll(&mut doc, t0 + ms(100));

        let marker = doc.first_with_class(DOCUMENT_NODE, "spamlight-hit").unwrap();
        let text = doc.get(marker).unwrap().first_child.unwrap();
        doc.set_text(text, "ham");
        assert_eq!(
            monitor.observe(&mut doc, t0 + ms(200)),
            MonitorState::Pending { deadline: t0 + ms(300) }
        );

        let outcome = monitor.poll(&mut doc, t0 + ms(900));
        assert_eq!(outcome, PollOutcome::Ran(PassReport { removed: 1, spans: 0, markers: 0 }));
        assert!(doc.first_with_class(DOCUMENT_NODE, "spamlight-hit").is_none());
        assert_eq!(inner_markup(&doc, DOCUMENT_NODE), r#"<div class="a3s">a ham b</div>"#);
    }

    #[test]
    fn test_new_body_is_relevant() {
        let mut doc = Document::parse(r#"<div id="view"></div>"#);
        let mut monitor = monitor(&["offer"]);
        let view = doc.descendants(DOCUMENT_NODE).next().unwrap();
        let t0 = Instant::now();

        doc.replace_children(view, r#"<div><div class="a3s">special offer</div></div>"#);
        assert!(matches!(monitor.observe(&mut doc, t0), MonitorState::Pending { .. }));

        let outcome = monitor.poll(&mut doc, t0 + ms(100));
        assert!(matches!(outcome, PollOutcome::Ran(PassReport { markers: 1, .. })));
    }

    #[test]
    fn test_removed_body_is_relevant() {
        let mut doc = Document::parse(r#"<div id="view"><div class="a3s">x</div></div>"#);
        let mut monitor = monitor(&[]);
        let body = doc.first_with_class(DOCUMENT_NODE, "a3s").unwrap();
        doc.detach(body);
        assert!(matches!(monitor.observe(&mut doc, Instant::now()), MonitorState::Pending { .. }));
    }

    #[test]
    fn test_skipped_without_visible_body() {
        let mut doc = Document::parse(r#"<div class="a3s" hidden>spam</div>"#);
        let mut monitor = monitor(&["spam"]);
        let t0 = Instant::now();
        monitor.trigger(t0);
        assert_eq!(
            monitor.poll(&mut doc, t0 + ms(100)),
            PollOutcome::Skipped(HighlightError::NoVisibleRoot)
        );
        assert_eq!(monitor.state(), MonitorState::Idle);
    }
}
