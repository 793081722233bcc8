use super::*;

const APP: &str = "import Counter from '@/components/Counter';\nexport default function App() { return <Counter />; }";
const COUNTER: &str = "export default function Counter() { return <button>0</button>; }";

fn project() -> FileStore {
    let mut store = FileStore::new();
    store.create_file("/App.jsx", APP).unwrap();
    store.create_file("/components/Counter.jsx", COUNTER).unwrap();
    store
}

fn pipeline(store: &FileStore) -> RenderPipeline<ServedBlobs> {
    RenderPipeline::for_store(store, ImportMapBuilder::default(), ServedBlobs::new())
}

#[test]
fn alias_scenario_renders() {
    let store = project();
    let document = render_preview(&store, ImportMapBuilder::default(), DEFAULT_ENTRY).unwrap();

    let map = &document.import_map;
    let id = map.get("@/components/Counter").unwrap();
    assert_eq!(map.get("/components/Counter.jsx"), Some(id));
    assert_eq!(map.get("/components/Counter"), Some(id));
    assert_eq!(map.get("components/Counter"), Some(id));
    assert!(document.html.contains("<script type=\"importmap\">"));
    assert_eq!(document.entry, "/App.jsx");
}

#[test]
fn syntax_error_keeps_store_and_last_good_preview() {
    let mut store = project();
    let mut pipeline = pipeline(&store);
    let good = pipeline.render(&store, DEFAULT_ENTRY).unwrap();

    store.write("/App.jsx", "export default function App() {\n  return <div>;\n").unwrap();
    let before = store.export_flat();

    let err = pipeline.render(&store, DEFAULT_ENTRY).unwrap_err();
    let diagnostic = err.diagnostic().expect("syntax error");
    assert!(!diagnostic.message.is_empty());
    assert!(diagnostic.line >= 1);
    assert_eq!(diagnostic.path, "/App.jsx");

    assert_eq!(store.export_flat(), before);
    assert!(Arc::ptr_eq(pipeline.last_good().unwrap(), &good));
    assert_eq!(pipeline.last_error(), Some(&err));
}

#[test]
fn comment_like_specifier_keeps_import_map_valid() {
    let mut store = FileStore::new();
    store
        .create_file("/App.jsx", "import Odd from './a<!--b';\nexport default () => <Odd />;")
        .unwrap();
    let document = render_preview(&store, ImportMapBuilder::default(), DEFAULT_ENTRY).unwrap();

    let open = r#"<script type="importmap">"#;
    let start = document.html.find(open).unwrap() + open.len();
    let len = document.html[start..].find("</script>").unwrap();
    let map: serde_json::Value = serde_json::from_str(&document.html[start..start + len]).unwrap();
    assert!(map["imports"]["@/a<!--b"].is_string());
    assert_eq!(document.warnings.len(), 1);
}

#[test]
fn missing_entry_is_fatal() {
    let store = project();
    let mut pipeline = pipeline(&store);
    assert_eq!(
        pipeline.render(&store, "/main.jsx").unwrap_err(),
        PreviewError::MissingEntry { path: "/main.jsx".into() }
    );
    assert!(pipeline.last_good().is_none());
}

mod stale {
    use super::*;

    #[test]
    fn superseded_pass_fails_before_transforming() {
        let store = project();
        let mut pipeline = pipeline(&store);

        let first = pipeline.begin(store.snapshot(), DEFAULT_ENTRY).unwrap();
        let second = pipeline.begin(store.snapshot(), DEFAULT_ENTRY).unwrap();

        let err = first.build(pipeline.builder()).unwrap_err();
        assert!(err.is_stale());
        assert_eq!(pipeline.builder().cache().stats().parses, 0);

        let built = second.build(pipeline.builder()).unwrap();
        let document = pipeline.commit(built).unwrap();
        assert_eq!(pipeline.last_good().unwrap().generation, document.generation);
    }

    #[test]
    fn mutation_after_build_blocks_commit() {
        let mut store = project();
        let mut pipeline = pipeline(&store);

        let built = pipeline
            .begin(store.snapshot(), DEFAULT_ENTRY)
            .unwrap()
            .build(pipeline.builder())
            .unwrap();
        store.write("/components/Counter.jsx", "export default () => null;").unwrap();

        let err = pipeline.commit(built).unwrap_err();
        assert!(err.is_stale());
        assert_eq!(pipeline.blobs().live(), 0);
        assert!(pipeline.last_good().is_none());
        assert!(pipeline.leased_generations().is_empty());
    }

    #[test]
    fn stale_failure_does_not_replace_last_error() {
        let store = project();
        let mut pipeline = pipeline(&store);
        pipeline.render(&store, "/missing.jsx").unwrap_err();

        let pass = pipeline.begin(store.snapshot(), DEFAULT_ENTRY).unwrap();
        pipeline.begin(store.snapshot(), DEFAULT_ENTRY).unwrap();
        assert!(pass.build(pipeline.builder()).unwrap_err().is_stale());
        assert!(matches!(pipeline.last_error(), Some(PreviewError::MissingEntry { .. })));
    }

    #[test]
    fn snapshot_older_than_store_is_rejected() {
        let mut store = project();
        let mut pipeline = pipeline(&store);
        let good = pipeline.render(&store, DEFAULT_ENTRY).unwrap();

        let old = store.snapshot();
        store
            .write("/components/Counter.jsx", "export default () => 'NEW';")
            .unwrap();

        let err = pipeline.render_snapshot(old, DEFAULT_ENTRY).unwrap_err();
        assert!(err.is_stale());
        assert!(Arc::ptr_eq(pipeline.last_good().unwrap(), &good));
        assert!(pipeline.last_error().is_none());

        let fresh = pipeline.render(&store, DEFAULT_ENTRY).unwrap();
        assert_eq!(fresh.generation, store.generation());
    }

    #[test]
    fn snapshot_older_than_another_pass_is_rejected() {
        let store = project();
        let pipeline = pipeline(&store);
        let old = store.snapshot();
        pipeline.begin(store.snapshot(), DEFAULT_ENTRY).unwrap();
        assert!(pipeline.begin(old, DEFAULT_ENTRY).unwrap_err().is_stale());
    }
}

mod leases {
    use super::*;

    #[test]
    fn older_leases_released_when_newer_loads() {
        let mut store = project();
        let mut pipeline = pipeline(&store);

        let first = pipeline.render(&store, DEFAULT_ENTRY).unwrap();
        store.write("/components/Counter.jsx", "export default () => null;").unwrap();
        let second = pipeline.render(&store, DEFAULT_ENTRY).unwrap();

        // App body is unchanged, so it is shared by both generations.
        assert_eq!(pipeline.blobs().live(), 3);
        assert_eq!(pipeline.leased_generations(), vec![first.generation, second.generation]);

        let released = pipeline.confirm_loaded(second.generation);
        assert_eq!(released, 2);
        assert_eq!(pipeline.blobs().live(), 2);
        assert_eq!(pipeline.leased_generations(), vec![second.generation]);
    }

    #[test]
    fn commits_without_ready_reports_stay_bounded() {
        let mut store = project();
        let mut pipeline = pipeline(&store);

        for label in 0..20 {
            let body = format!("export default () => <b>{label}</b>;");
            store.write("/components/Counter.jsx", &body).unwrap();
            pipeline.render(&store, DEFAULT_ENTRY).unwrap();
        }

        // Current and previous generation, App shared between them.
        assert_eq!(pipeline.leased_generations().len(), 2);
        assert_eq!(pipeline.blobs().live(), 3);
    }

    #[test]
    fn loaded_generation_survives_later_commits() {
        let mut store = project();
        let mut pipeline = pipeline(&store);
        let loaded = pipeline.render(&store, DEFAULT_ENTRY).unwrap().generation;
        pipeline.confirm_loaded(loaded);

        for label in 0..5 {
            let body = format!("export default () => <i>{label}</i>;");
            store.write("/components/Counter.jsx", &body).unwrap();
            pipeline.render(&store, DEFAULT_ENTRY).unwrap();
        }

        let leased = pipeline.leased_generations();
        assert_eq!(leased.len(), 3);
        assert_eq!(leased[0], loaded);
        assert_eq!(leased[2], pipeline.last_good().unwrap().generation);
    }

    #[test]
    fn confirming_current_generation_releases_nothing() {
        let store = project();
        let mut pipeline = pipeline(&store);
        let document = pipeline.render(&store, DEFAULT_ENTRY).unwrap();
        assert_eq!(pipeline.confirm_loaded(document.generation), 0);
        assert_eq!(pipeline.blobs().live(), 2);
    }
}

#[test]
fn generations_increase_per_pass() {
    let store = project();
    let mut pipeline = pipeline(&store);
    let a = pipeline.render(&store, DEFAULT_ENTRY).unwrap();
    let b = pipeline.render(&store, DEFAULT_ENTRY).unwrap();
    assert!(b.generation > a.generation);
    assert_eq!(store.generation(), b.generation);
}
