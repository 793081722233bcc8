use super::*;

fn compile(path: &str, source: &str) -> TransformedModule {
    ModuleTransformer::default()
        .transform_source(path, source)
        .unwrap_or_else(|diag| panic!("{diag}"))
}

mod scripts {
    use super::*;

    #[test]
    fn jsx_is_lowered_to_automatic_runtime() {
        let module = compile(
            "/App.jsx",
            "export default function App() { return <div className=\"app\">hi</div>; }",
        );
        assert!(module.compiled_body.contains("react/jsx-runtime"));
        assert!(!module.compiled_body.contains("<div"));
        assert_eq!(module.import_specifiers, vec!["react/jsx-runtime"]);
    }

    #[test]
    fn typescript_is_stripped() {
        let module = compile(
            "/lib/math.ts",
            "interface Pair { a: number; b: number }\nexport const sum = (p: Pair): number => p.a + p.b;",
        );
        assert!(!module.compiled_body.contains("interface"));
        assert!(!module.compiled_body.contains(": number"));
        assert!(module.compiled_body.contains("export const sum"));
    }

    #[test]
    fn tsx_component() {
        let module = compile(
            "/components/Card.tsx",
            "type Props = { title: string };\nexport function Card({ title }: Props) { return <h2>{title}</h2>; }",
        );
        assert!(module.compiled_body.contains("react/jsx-runtime"));
        assert!(!module.compiled_body.contains("Props"));
    }

    #[test]
    fn source_specifiers_come_first_then_runtime() {
        let module = compile(
            "/App.jsx",
            r#"
            import { useState } from "react";
            import Counter from "@/components/Counter";
            import { Button } from "./components/ui/Button";
            import { useState as again } from "react";
            export default function App() { return <Counter />; }
            "#,
        );
        assert_eq!(
            module.import_specifiers,
            vec!["react", "@/components/Counter", "./components/ui/Button", "react/jsx-runtime"]
        );
    }

    #[test]
    fn local_specifiers_are_rewritten_to_alias_form() {
        let module = compile(
            "/components/Counter.jsx",
            r#"
            import { Button } from "./ui/Button";
            import { cn } from "../lib/utils.js";
            import App from "/App";
            export { Button };
            export const all = [cn, App];
            "#,
        );
        let body = &module.compiled_body;
        assert!(body.contains("@/components/ui/Button"));
        assert!(body.contains("@/lib/utils.js"));
        assert!(body.contains("@/App"));
        assert!(!body.contains("./ui/Button"));
        // Specifiers stay as written; rewriting only affects the body.
        assert_eq!(module.import_specifiers[0], "./ui/Button");
    }

    #[test]
    fn stylesheets_are_lifted() {
        let module = compile(
            "/App.jsx",
            "import './index.css';\nimport 'pkg/dist/theme.css';\nexport default () => <main />;",
        );
        assert_eq!(module.stylesheets, vec!["./index.css", "pkg/dist/theme.css"]);
        assert!(!module.compiled_body.contains(".css"));
        assert!(!module.import_specifiers.iter().any(|s| s.ends_with(".css")));
    }
}

mod other_formats {
    use super::*;

    #[test]
    fn json_becomes_default_export() {
        let module = compile("/data/items.json", r#"{"items": [1, 2]}"#);
        assert!(module.compiled_body.starts_with("export default {"));
        assert!(module.import_specifiers.is_empty());
    }

    #[test]
    fn invalid_json_is_a_diagnostic() {
        let err = ModuleTransformer::default()
            .transform_source("/data.json", "{\n  \"a\": }")
            .unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("JSON"));
    }

    #[test]
    fn text_becomes_string_export() {
        let module = compile("/README.md", "# Title\n\"quoted\"");
        assert_eq!(
            &*module.compiled_body,
            "export default \"# Title\\n\\\"quoted\\\"\";\n"
        );
    }
}

mod errors {
    use super::*;

    #[test]
    fn unmatched_braces_report_position() {
        let err = ModuleTransformer::default()
            .transform_source(
                "/App.jsx",
                "export default function App() {\n  return <div>hi</div>;\n",
            )
            .unwrap_err();
        assert_eq!(err.path, "/App.jsx");
        assert!(!err.message.is_empty());
        assert!(err.line >= 1);
        assert!(err.column >= 1);
    }

    #[test]
    fn error_points_at_the_offending_line() {
        let err = ModuleTransformer::default()
            .transform_source("/a.js", "const a = 1;\nconst b = ;\n")
            .unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn redeclaration_is_rejected() {
        let result = ModuleTransformer::default().transform_source("/a.js", "let a = 1;\nlet a = 2;\n");
        assert!(result.is_err());
    }
}

#[test]
fn transform_is_deterministic() {
    let source = "import x from './x';\nexport default () => <p>{x}</p>;";
    let a = compile("/App.jsx", source);
    let b = compile("/App.jsx", source);
    assert_eq!(a, b);
    assert!(a.is_fresh(source));
    assert!(!a.is_fresh("changed"));
}
