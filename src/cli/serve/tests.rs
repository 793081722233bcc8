use super::*;
use crate::config::KilnConfig;
use crate::preview::PreviewError;
use crate::reload::ReloadMessage;
use crate::sandbox::{ErrorKind, MonitorOutcome};
use crate::vfs::FileStore;

const APP: &str = "import Counter from '@/components/Counter';\nexport default function App() { return <Counter />; }";
const COUNTER: &str = "export default function Counter() { return <button>0</button>; }";

fn state() -> (Arc<ServeState>, Receiver<StoreEvent>) {
    let mut store = FileStore::new();
    store.create_file("/App.jsx", APP).unwrap();
    store.create_file("/components/Counter.jsx", COUNTER).unwrap();
    ServeState::new(store, &KilnConfig::default(), None)
}

fn rendered_generation(state: &ServeState) -> RenderGeneration {
    match state.last_message() {
        Some(ReloadMessage::Render { generation, url }) => {
            assert_eq!(url, document_url(generation));
            generation
        }
        other => panic!("expected a render message, got {other:?}"),
    }
}

fn edit_counter(state: &ServeState, label: &str) {
    let call = format!(
        r#"{{"tool":"str_replace_editor","command":"str_replace","path":"/components/Counter.jsx","old_str":"<button>0</button>","new_str":"<button>{label}</button>"}}"#
    );
    let results = state.apply_tools(&call).unwrap();
    assert!(results[0].success, "{}", results[0].message);
}

#[test]
fn initial_render_publishes_document_and_blobs() {
    let (state, _events) = state();
    let generation = state.render().unwrap();
    assert_eq!(rendered_generation(&state), generation);

    let document = state.document(generation).unwrap();
    let url = document.import_map.get("@/components/Counter").unwrap();
    let body = state.blob(&url[BLOB_ROUTE.len()..]).unwrap();
    assert!(body.contains("button"));

    assert!(state.host_page().contains(&document_url(generation)));
    assert_eq!(state.status().rendered, Some(generation));
}

#[test]
fn tool_edits_reach_the_render_worker() {
    let (state, events) = state();
    let first = state.render().unwrap();

    edit_counter(&state, "1");
    let event = events.try_recv().unwrap();
    assert_eq!(event.change.path(), Some("/components/Counter.jsx"));

    let second = state.render().unwrap();
    assert!(second > first);
    assert!(state.document(first).is_none());
    assert!(state.document(second).is_some());
    assert!(state.is_dirty());
}

#[test]
fn invalid_tool_json_is_rejected() {
    let (state, events) = state();
    assert!(state.apply_tools(r#"{"tool":"terminal","command":"ls"}"#).is_err());
    assert!(events.try_recv().is_err());
    assert!(!state.is_dirty());
}

#[test]
fn syntax_error_publishes_failure_and_keeps_last_document() {
    let (state, _events) = state();
    let good = state.render().unwrap();

    let call = r#"{"tool":"str_replace_editor","command":"str_replace","path":"/App.jsx","old_str":"<Counter />","new_str":"<div>"}"#;
    assert!(state.apply_tools(call).unwrap()[0].success);
    assert_eq!(state.render(), None);

    match state.last_message() {
        Some(ReloadMessage::Error { path, line, .. }) => {
            assert_eq!(path.as_deref(), Some("/App.jsx"));
            assert!(line.is_some());
        }
        other => panic!("expected an error message, got {other:?}"),
    }
    assert!(state.document(good).is_some());
    assert!(state.status().last_error.is_some());
}

#[test]
fn ready_report_releases_older_generations() {
    let (state, _events) = state();
    let first = state.render().unwrap();
    edit_counter(&state, "1");
    let second = state.render().unwrap();
    assert_eq!(state.status().leased, vec![first, second]);

    let stale = SandboxReport::Ready { generation: first };
    assert_eq!(state.receive_report(stale), MonitorOutcome::Discarded);
    assert_eq!(state.status().leased, vec![first, second]);

    let ready = SandboxReport::Ready { generation: second };
    assert_eq!(state.receive_report(ready), MonitorOutcome::Loaded(second));
    let status = state.status();
    assert_eq!(status.leased, vec![second]);
    assert!(status.loaded);
}

#[test]
fn unreported_generations_do_not_pile_up() {
    let (state, _events) = state();
    state.render().unwrap();
    for label in 1..=12 {
        let call = format!(
            r#"{{"tool":"str_replace_editor","command":"str_replace","path":"/components/Counter.jsx","old_str":"<button>{}</button>","new_str":"<button>{label}</button>"}}"#,
            label - 1
        );
        assert!(state.apply_tools(&call).unwrap()[0].success);
        state.render().unwrap();
    }
    let status = state.status();
    assert_eq!(status.leased.len(), 2, "{:?}", status.leased);
    assert_eq!(status.live_blobs, 3);
}

#[test]
fn warnings_of_the_last_render_are_in_status() {
    let (state, _events) = state();
    let call = r#"{"tool":"str_replace_editor","command":"str_replace","path":"/App.jsx","old_str":"@/components/Counter","new_str":"@/components/Missing"}"#;
    assert!(state.apply_tools(call).unwrap()[0].success);

    state.render().unwrap();
    let status = state.status();
    assert_eq!(status.warnings.len(), 1);
    assert!(status.warnings[0].contains("Missing"), "{}", status.warnings[0]);
}

#[test]
fn runtime_errors_are_recorded_for_the_mounted_generation() {
    let (state, _events) = state();
    let generation = state.render().unwrap();

    let report = SandboxReport::Error {
        generation,
        kind: ErrorKind::Uncaught,
        message: "boom".into(),
        stack: None,
    };
    assert_eq!(state.receive_report(report), MonitorOutcome::Recorded);
    let status = state.status();
    assert_eq!(status.runtime_errors.len(), 1);
    assert_eq!(status.runtime_errors[0].message, "boom");
    assert!(status.last_error.is_none());
}

#[test]
fn missing_entry_is_reported_not_rendered() {
    let (state, _events) = state();
    let call = r#"{"tool":"file_manager","command":"delete","path":"/App.jsx"}"#;
    assert!(state.apply_tools(call).unwrap()[0].success);

    assert_eq!(state.render(), None);
    let status = state.status();
    assert!(status.rendered.is_none());
    let expected = PreviewError::MissingEntry { path: "/App.jsx".into() }.to_string();
    assert_eq!(status.last_error.as_deref(), Some(expected.as_str()));
}

#[test]
fn edits_are_saved_once_dirty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.json");
    let (state, _events) = state();
    assert!(!state.save_if_dirty(&path).unwrap());
    assert!(!path.exists());

    edit_counter(&state, "2");
    assert!(state.save_if_dirty(&path).unwrap());
    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains("<button>2</button>"));
    assert_eq!(state.export().unwrap().trim(), saved.trim());
}

#[test]
fn render_loop_stops_on_shutdown_signal() {
    let (state, events) = state();
    let (tx, rx) = channel::unbounded();
    tx.send(()).unwrap();
    render_loop(&state, &events, &rx);
    assert!(state.last_message().is_none());
}
