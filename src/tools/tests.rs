use super::*;

fn call(json: &str) -> ToolCall {
    serde_json::from_str(json).unwrap()
}

fn project() -> FileStore {
    let mut store = FileStore::new();
    store.create_file("/App.jsx", "line one\nline two\nline three\n").unwrap();
    store.create_file("/components/Counter.jsx", "export default 1;").unwrap();
    store
}

mod parse {
    use super::*;

    #[test]
    fn nested_tags() {
        assert_eq!(
            call(r#"{"tool":"str_replace_editor","command":"create","path":"/a.js","file_text":"x"}"#),
            ToolCall::StrReplaceEditor(EditorCommand::Create {
                path: "/a.js".into(),
                file_text: "x".into()
            })
        );
        assert_eq!(
            call(r#"{"tool":"file_manager","command":"delete","path":"/a.js"}"#),
            ToolCall::FileManager(ManagerCommand::Delete { path: "/a.js".into() })
        );
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(serde_json::from_str::<ToolCall>(r#"{"tool":"file_manager","command":"chmod","path":"/a"}"#).is_err());
    }

    #[test]
    fn one_or_many() {
        let one = r#"{"tool":"file_manager","command":"delete","path":"/a"}"#;
        assert_eq!(ToolCall::parse_many(one).unwrap().len(), 1);
        assert_eq!(ToolCall::parse_many(&format!("[{one},{one}]")).unwrap().len(), 2);
    }
}

mod editor {
    use super::*;

    #[test]
    fn view_numbers_lines() {
        let mut store = project();
        let result = apply(&mut store, &call(r#"{"tool":"str_replace_editor","command":"view","path":"/App.jsx"}"#));
        assert!(result.success);
        assert_eq!(result.message, "1\tline one\n2\tline two\n3\tline three");
    }

    #[test]
    fn view_range_to_end() {
        let mut store = project();
        let result = apply(
            &mut store,
            &call(r#"{"tool":"str_replace_editor","command":"view","path":"/App.jsx","view_range":[2,-1]}"#),
        );
        assert_eq!(result.message, "2\tline two\n3\tline three");
    }

    #[test]
    fn view_invalid_range_fails() {
        let mut store = project();
        let result = apply(
            &mut store,
            &call(r#"{"tool":"str_replace_editor","command":"view","path":"/App.jsx","view_range":[5,6]}"#),
        );
        assert!(!result.success);
    }

    #[test]
    fn view_directory_lists_children() {
        let mut store = project();
        let result = apply(&mut store, &call(r#"{"tool":"str_replace_editor","command":"view","path":"/"}"#));
        assert_eq!(result.message, "[FILE] App.jsx\n[DIR] components");
    }

    #[test]
    fn create_then_conflict() {
        let mut store = project();
        let create = call(r#"{"tool":"str_replace_editor","command":"create","path":"lib/util.js","file_text":"x"}"#);
        assert!(apply(&mut store, &create).success);
        assert!(store.read("/lib").unwrap().is_dir());

        let again = apply(&mut store, &create);
        assert!(!again.success);
        assert!(again.message.contains("already exists"));
    }

    #[test]
    fn str_replace_and_insert() {
        let mut store = project();
        let replaced = apply(
            &mut store,
            &call(r#"{"tool":"str_replace_editor","command":"str_replace","path":"/App.jsx","old_str":"line","new_str":"row"}"#),
        );
        assert_eq!(replaced.message, "Replaced 3 occurrences in /App.jsx");

        let inserted = apply(
            &mut store,
            &call(r#"{"tool":"str_replace_editor","command":"insert","path":"/App.jsx","insert_line":1,"new_str":"row 1.5"}"#),
        );
        assert!(inserted.success);
        assert_eq!(
            store.read("/App.jsx").unwrap().content(),
            Some("row one\nrow 1.5\nrow two\nrow three\n")
        );
    }

    #[test]
    fn str_replace_without_match_fails() {
        let mut store = project();
        let before = store.export_flat();
        let result = apply(
            &mut store,
            &call(r#"{"tool":"str_replace_editor","command":"str_replace","path":"/App.jsx","old_str":"nope","new_str":""}"#),
        );
        assert!(!result.success);
        assert_eq!(store.export_flat(), before);
    }

    #[test]
    fn undo_is_unsupported() {
        let mut store = project();
        let undo = call(r#"{"tool":"str_replace_editor","command":"undo_edit","path":"/App.jsx"}"#);
        assert!(!undo.mutates());
        assert!(!apply(&mut store, &undo).success);
    }
}

mod manager {
    use super::*;

    #[test]
    fn rename_directory() {
        let mut store = project();
        let result = apply(
            &mut store,
            &call(r#"{"tool":"file_manager","command":"rename","path":"components","new_path":"/widgets"}"#),
        );
        assert_eq!(result.message, "Renamed /components to /widgets");
        assert!(store.exists("/widgets/Counter.jsx"));
    }

    #[test]
    fn delete_missing_fails() {
        let mut store = project();
        let result = apply(&mut store, &call(r#"{"tool":"file_manager","command":"delete","path":"/ghost"}"#));
        assert!(!result.success);
        assert!(result.message.starts_with("Error:"));
    }
}

#[test]
fn apply_all_continues_after_failure() {
    let mut store = project();
    let calls = ToolCall::parse_many(
        r#"[
            {"tool":"file_manager","command":"delete","path":"/ghost"},
            {"tool":"file_manager","command":"delete","path":"/App.jsx"}
        ]"#,
    )
    .unwrap();
    let results = apply_all(&mut store, &calls);
    assert_eq!(results.iter().map(|r| r.success).collect::<Vec<_>>(), vec![false, true]);
    assert!(!store.exists("/App.jsx"));
}
