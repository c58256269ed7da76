//! Elixir Term Conversion Utilities
//!
//! Converts pass reports, scan summaries and monitor states to Elixir terms.

use crate::error::HighlightError;
use crate::highlight::PassReport;
use crate::inbox::ScanSummary;
use crate::monitor::{MonitorState, PollOutcome};
use rustler::{Encoder, Env, NewBinary, NifResult, Term};

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
    skipped,
    ran,
    pending,
    idle,
    running,
    no_visible_root,
    removed,
    spans,
    markers,
    scanned,
    flagged,
}

/// Create a binary term from a string
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}

/// `{:ok, value}`
pub fn ok_tuple<'a>(env: Env<'a>, value: Term<'a>) -> Term<'a> {
    (ok(), value).encode(env)
}

/// `{:error, reason}` with a binary reason
pub fn error_tuple<'a>(env: Env<'a>, reason: &str) -> Term<'a> {
    (error(), str_to_binary(env, reason)).encode(env)
}

/// `%{removed: _, spans: _, markers: _}`
pub fn report_to_term<'a>(env: Env<'a>, report: &PassReport) -> NifResult<Term<'a>> {
    let pairs = [
        (removed().encode(env), report.removed.encode(env)),
        (spans().encode(env), report.spans.encode(env)),
        (markers().encode(env), report.markers.encode(env)),
    ];
    Term::map_from_pairs(env, &pairs)
}

/// `%{scanned: _, flagged: _}`
pub fn summary_to_term<'a>(env: Env<'a>, summary: &ScanSummary) -> NifResult<Term<'a>> {
    let pairs = [
        (scanned().encode(env), summary.scanned.encode(env)),
        (flagged().encode(env), summary.flagged.encode(env)),
    ];
    Term::map_from_pairs(env, &pairs)
}

/// Why a pass did not run: an atom for known reasons, a binary otherwise
pub fn skip_reason<'a>(env: Env<'a>, err: &HighlightError) -> Term<'a> {
    match err {
        HighlightError::NoVisibleRoot => no_visible_root().encode(env),
        other => str_to_binary(env, &other.to_string()),
    }
}

/// `:idle`, `:pending` or `:running`
pub fn state_to_term<'a>(env: Env<'a>, state: MonitorState) -> Term<'a> {
    match state {
        MonitorState::Idle => idle().encode(env),
        MonitorState::Pending { .. } => pending().encode(env),
        MonitorState::Running => running().encode(env),
    }
}

/// `{:ran, report}`, `{:skipped, reason}`, `:pending` or `:idle`
pub fn outcome_to_term<'a>(env: Env<'a>, outcome: &PollOutcome) -> NifResult<Term<'a>> {
    Ok(match outcome {
        PollOutcome::Idle => idle().encode(env),
        PollOutcome::Pending => pending().encode(env),
        PollOutcome::Ran(report) => (ran(), report_to_term(env, report)?).encode(env),
        PollOutcome::Skipped(err) => (skipped(), skip_reason(env, err)).encode(env),
    })
}
