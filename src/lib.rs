//! Spamlight - keyword flagging and cross-node highlighting for mail documents
//!
//! Documents: parse, serialize, highlight, clean, scan
//! Monitors: debounced re-highlighting driven by host mutations and clock
//! Keywords: list maintenance (add, remove, import, export)

use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

mod config;
mod core;
mod dom;
mod error;
mod highlight;
mod inbox;
mod keywords;
mod monitor;
mod resource;
mod term;
mod visibility;

use config::EngineConfig;
use dom::{inner_markup, outer_markup, Document, DOCUMENT_NODE};
use highlight::{clear, flatten, Highlighter};
use inbox::scan_inbox;
use keywords::{KeywordList, KeywordStore, MemoryStore};
use resource::{DocumentRef, DocumentResource, MonitorRef, MonitorResource};
use term::{error_tuple, ok_tuple, outcome_to_term, report_to_term, skip_reason, state_to_term, str_to_binary, summary_to_term};
use visibility::{visible_root, InlineStyleProbe};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Documents
// ============================================================================

/// Parse markup into a live document (returns {:ok, doc} or {:error, reason})
///
/// Options are `{key, value}` string pairs overriding the engine defaults.
#[rustler::nif]
fn parse<'a>(env: Env<'a>, input: Binary<'a>, opts: Vec<(String, String)>) -> NifResult<Term<'a>> {
    let config = match EngineConfig::from_pairs(&opts) {
        Ok(config) => config,
        Err(e) => return Ok(error_tuple(env, &e.to_string())),
    };
    let markup = String::from_utf8_lossy(input.as_slice());
    let doc = Document::parse(&markup);
    let resource = ResourceArc::new(DocumentResource::new(doc, config));
    Ok(ok_tuple(env, resource.encode(env)))
}

/// Serialize the whole document back to markup
#[rustler::nif]
fn serialize<'a>(env: Env<'a>, doc_ref: DocumentRef) -> NifResult<Term<'a>> {
    Ok(match doc_ref.with_doc(|doc, _| inner_markup(doc, DOCUMENT_NODE)) {
        Ok(markup) => str_to_binary(env, &markup),
        Err(e) => error_tuple(env, e),
    })
}

/// Serialize the first element carrying `class`, including its own tags
#[rustler::nif]
fn serialize_class<'a>(env: Env<'a>, doc_ref: DocumentRef, class: &str) -> NifResult<Term<'a>> {
    let result = doc_ref.with_doc(|doc, _| {
        doc.first_with_class(DOCUMENT_NODE, class)
            .map(|target| outer_markup(doc, target))
    });
    Ok(match result {
        Ok(Some(markup)) => ok_tuple(env, str_to_binary(env, &markup)),
        Ok(None) => error_tuple(env, "not_found"),
        Err(e) => error_tuple(env, e),
    })
}

/// Flattened text of the visible message body
#[rustler::nif]
fn flattened_text<'a>(env: Env<'a>, doc_ref: DocumentRef) -> NifResult<Term<'a>> {
    let result = doc_ref.with_doc(|doc, config| {
        visible_root(doc, config, &InlineStyleProbe).map(|root| flatten(doc, root, config).text)
    });
    Ok(match result {
        Ok(Some(text)) => ok_tuple(env, str_to_binary(env, &text)),
        Ok(None) => (term::skipped(), term::no_visible_root()).encode(env),
        Err(e) => error_tuple(env, e),
    })
}

/// Highlight keywords in the visible message body
/// (returns {:ok, report} or {:skipped, reason})
#[rustler::nif(name = "highlight")]
fn highlight_body<'a>(env: Env<'a>, doc_ref: DocumentRef, keywords: Vec<String>) -> NifResult<Term<'a>> {
    let result = doc_ref.with_doc(|doc, config| {
        let store = MemoryStore::with_keywords(keywords);
        Highlighter::new(config.clone(), store, InlineStyleProbe).run(doc)
    });
    match result {
        Ok(Ok(report)) => Ok(ok_tuple(env, report_to_term(env, &report)?)),
        Ok(Err(e)) => Ok((term::skipped(), skip_reason(env, &e)).encode(env)),
        Err(e) => Ok(error_tuple(env, e)),
    }
}

/// Remove every highlight marker from the document
#[rustler::nif]
fn clean<'a>(env: Env<'a>, doc_ref: DocumentRef) -> NifResult<Term<'a>> {
    Ok(match doc_ref.with_doc(|doc, config| clear(doc, DOCUMENT_NODE, config)) {
        Ok(removed) => ok_tuple(env, removed.encode(env)),
        Err(e) => error_tuple(env, e),
    })
}

/// Flag inbox items matching any keyword (returns %{scanned: n, flagged: n})
#[rustler::nif(schedule = "DirtyCpu")]
fn scan<'a>(env: Env<'a>, doc_ref: DocumentRef, keywords: Vec<String>) -> NifResult<Term<'a>> {
    match doc_ref.with_doc(|doc, config| scan_inbox(doc, &keywords, config)) {
        Ok(summary) => summary_to_term(env, &summary),
        Err(e) => Ok(error_tuple(env, e)),
    }
}

/// Replace the children of the first element carrying `class` with parsed
/// markup. The change is recorded for monitors like any host edit.
#[rustler::nif]
fn replace_children<'a>(
    env: Env<'a>,
    doc_ref: DocumentRef,
    class: &str,
    input: Binary<'a>,
) -> NifResult<Term<'a>> {
    let markup = String::from_utf8_lossy(input.as_slice());
    let result = doc_ref.with_doc(|doc, _| {
        doc.first_with_class(DOCUMENT_NODE, class)
            .map(|target| doc.replace_children(target, &markup).len())
    });
    Ok(match result {
        Ok(Some(added)) => ok_tuple(env, added.encode(env)),
        Ok(None) => error_tuple(env, "not_found"),
        Err(e) => error_tuple(env, e),
    })
}

// ============================================================================
// Change Monitor
// ============================================================================

/// Create a monitor (returns {:ok, monitor} or {:error, reason})
#[rustler::nif]
fn monitor_new<'a>(env: Env<'a>, opts: Vec<(String, String)>) -> NifResult<Term<'a>> {
    Ok(match EngineConfig::from_pairs(&opts) {
        Ok(config) => ok_tuple(env, ResourceArc::new(MonitorResource::new(config)).encode(env)),
        Err(e) => error_tuple(env, &e.to_string()),
    })
}

/// Replace the keywords used by future passes
#[rustler::nif]
fn monitor_set_keywords<'a>(env: Env<'a>, monitor_ref: MonitorRef, keywords: Vec<String>) -> NifResult<Term<'a>> {
    let keywords = KeywordList::from_keywords(&keywords).into_vec();
    let result = monitor_ref.with_monitor(|monitor| monitor.highlighter().store().save(&keywords));
    Ok(match result {
        Ok(Ok(())) => term::ok().encode(env),
        Ok(Err(e)) => error_tuple(env, &e.to_string()),
        Err(e) => error_tuple(env, e),
    })
}

/// Feed pending document mutations to the monitor; returns its state
#[rustler::nif]
fn monitor_observe<'a>(env: Env<'a>, monitor_ref: MonitorRef, doc_ref: DocumentRef, now_ms: u64) -> NifResult<Term<'a>> {
    let now = monitor_ref.instant(now_ms);
    let result = monitor_ref.with_monitor(|monitor| doc_ref.with_doc(|doc, _| monitor.observe(doc, now)));
    Ok(match result {
        Ok(Ok(state)) => state_to_term(env, state),
        Ok(Err(e)) | Err(e) => error_tuple(env, e),
    })
}

/// Run the debounced pass if it is due
/// (returns {:ran, report}, {:skipped, reason}, :pending or :idle)
#[rustler::nif]
fn monitor_poll<'a>(env: Env<'a>, monitor_ref: MonitorRef, doc_ref: DocumentRef, now_ms: u64) -> NifResult<Term<'a>> {
    let now = monitor_ref.instant(now_ms);
    let result = monitor_ref.with_monitor(|monitor| doc_ref.with_doc(|doc, _| monitor.poll(doc, now)));
    match result {
        Ok(Ok(outcome)) => outcome_to_term(env, &outcome),
        Ok(Err(e)) | Err(e) => Ok(error_tuple(env, e)),
    }
}

// ============================================================================
// Keyword List
// ============================================================================

/// Add a keyword (trimmed; blanks and duplicates ignored)
#[rustler::nif]
fn keywords_add(keywords: Vec<String>, keyword: &str) -> Vec<String> {
    let mut list = KeywordList::from_keywords(&keywords);
    list.add(keyword);
    list.into_vec()
}

/// Remove the keyword at `index`; out-of-range indexes change nothing
#[rustler::nif]
fn keywords_remove(keywords: Vec<String>, index: usize) -> Vec<String> {
    let mut list = KeywordList::from_keywords(&keywords);
    list.remove(index);
    list.into_vec()
}

/// Drop every keyword
#[rustler::nif]
fn keywords_clear(keywords: Vec<String>) -> Vec<String> {
    let mut list = KeywordList::from_keywords(&keywords);
    list.clear();
    list.into_vec()
}

/// Merge newline- or comma-separated keywords into the list
#[rustler::nif]
fn keywords_import(keywords: Vec<String>, text: &str) -> Vec<String> {
    let mut list = KeywordList::from_keywords(&keywords);
    list.import(text);
    list.into_vec()
}

/// One keyword per line
#[rustler::nif]
fn keywords_export(keywords: Vec<String>) -> String {
    KeywordList::from_keywords(&keywords).export()
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.Spamlight.Native");
