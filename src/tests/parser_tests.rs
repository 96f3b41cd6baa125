//! Tests for parser.rs: module tables and registration blocks.

use crate::exports::ExportBinding;
use crate::imports::{ImportBinding, ImportKind};
use crate::module_table::ModuleTable;
use crate::parser::{ModuleParseError, parse_module_table, parse_registrations};
use crate::scanner::LanguageVariant;

fn table(source: &str) -> ModuleTable {
    parse_module_table(source, LanguageVariant::Standard).expect("module should parse")
}

fn registrations(source: &str) -> Vec<(String, String)> {
    parse_registrations(source, LanguageVariant::Standard, &["Options", "Component"]).expect("source should scan")
}

fn pair(public: &str, local: &str) -> (String, String) {
    (public.to_string(), local.to_string())
}

// =============================================================================
// Imports
// =============================================================================

#[test]
fn test_import_clause_forms() {
    let table = table(
        r#"
        import Header from './Header.vue'
        import { Footer, Nav as SiteNav } from "@/components";
        import * as widgets from './widgets'
        import App, { version } from './app'
        import Vue, * as all from 'vue'
        import './styles.css'
        "#,
    );

    assert_eq!(
        table.imports,
        vec![
            ImportBinding::default_import("Header", "./Header.vue"),
            ImportBinding::named("Footer", "Footer", "@/components"),
            ImportBinding::named("SiteNav", "Nav", "@/components"),
            ImportBinding::namespace("widgets", "./widgets"),
            ImportBinding::default_import("App", "./app"),
            ImportBinding::named("version", "version", "./app"),
            ImportBinding::default_import("Vue", "vue"),
            ImportBinding::namespace("all", "vue"),
        ]
    );
}

#[test]
fn test_type_only_imports() {
    let table = table(
        r#"
        import type { Props } from './types'
        import { type Emits, Button } from './button'
        import type from './type-default'
        "#,
    );
    assert_eq!(table.imports.len(), 4);
    // Type-only imports bind like value imports.
    assert_eq!(table.imports[0], ImportBinding::named("Props", "Props", "./types"));
    assert_eq!(table.imports[1].kind, ImportKind::Named("Emits".into()));
    assert_eq!(table.imports[2].local_name, "Button");
    // A default import that happens to be called `type`.
    assert_eq!(table.imports[3], ImportBinding::default_import("type", "./type-default"));
}

#[test]
fn test_imports_ignore_dynamic_and_meta() {
    let table = table(
        r#"
        const Lazy = () => import('./Lazy.vue')
        const url = import.meta.url
        import x = require('./legacy')
        "#,
    );
    assert!(table.imports.is_empty());
    assert_eq!(table.declarations, vec!["Lazy", "url"]);
}

#[test]
fn test_string_import_names() {
    let table = table(r#"import { "my-header" as MyHeader, default as Card } from './lib'"#);
    assert_eq!(table.imports[0], ImportBinding::named("MyHeader", "my-header", "./lib"));
    assert_eq!(table.imports[1], ImportBinding::named("Card", "default", "./lib"));
    assert_eq!(table.imports[1].imported_name(), Some("default"));
}

// =============================================================================
// Exports
// =============================================================================

#[test]
fn test_export_forms() {
    let table = table(
        r#"
        import Local from './Local.vue'
        export { HeaderImpl as Header } from './header-impl'
        export { default as HeaderImpl } from './Header.vue'
        export * from './a'
        export * as ui from './ui'
        export { Local, Local as Alias }
        export default Local
        "#,
    );

    assert_eq!(
        table.exports,
        vec![
            ExportBinding::ReExportNamed {
                exported_name: "Header".into(),
                local_name: "HeaderImpl".into(),
                from_module: "./header-impl".into(),
            },
            ExportBinding::ReExportNamed {
                exported_name: "HeaderImpl".into(),
                local_name: "default".into(),
                from_module: "./Header.vue".into(),
            },
            ExportBinding::ReExportAll {
                from_module: "./a".into(),
            },
            ExportBinding::ReExportNamespace {
                exported_name: "ui".into(),
                from_module: "./ui".into(),
            },
            ExportBinding::LocalNamed {
                exported_name: "Local".into(),
                local_name: "Local".into(),
            },
            ExportBinding::LocalNamed {
                exported_name: "Alias".into(),
                local_name: "Local".into(),
            },
            ExportBinding::DefaultAssignment {
                local_name: "Local".into(),
            },
        ]
    );
    let stats = table.export_stats();
    assert_eq!(stats.reexport_named, 2);
    assert_eq!(stats.total(), 7);
}

#[test]
fn test_exported_declarations() {
    let table = table(
        r#"
        export class Button {}
        export const Card = defineComponent({})
        export function* gen() {}
        export abstract class Base {}
        export interface Props {}
        export declare const version: string
        export const enum Size { Small }
        "#,
    );
    let names: Vec<_> = table
        .exports
        .iter()
        .filter_map(|binding| match binding {
            ExportBinding::Declaration { name } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["Button", "Card", "gen", "Base", "Props", "version", "Size"]);
    assert_eq!(table.declarations, names);
}

#[test]
fn test_export_default_expressions_are_declarations() {
    for source in [
        "export default class Home extends Vue {}",
        "export default { name: 'Home' }",
        "export default defineComponent({ components: { A } })",
        "export default Foo.extend({})",
        "export default async function () {}",
    ] {
        let table = table(source);
        assert_eq!(
            table.exports,
            vec![ExportBinding::Declaration {
                name: "default".into()
            }],
            "{source}"
        );
    }
    assert_eq!(table("export default class Home {}").declarations, vec!["Home"]);
}

#[test]
fn test_export_default_identifier_with_asi() {
    let table = table("export default Header\nconst x = 1");
    assert_eq!(
        table.exports,
        vec![ExportBinding::DefaultAssignment {
            local_name: "Header".into()
        }]
    );
    assert_eq!(table.declarations, vec!["x"]);
}

#[test]
fn test_decorated_export_class() {
    let table = table(
        r#"
        import { Options, Vue } from 'vue-class-component'
        @Options({ components: { Header } }) export default class Home extends Vue {}
        "#,
    );
    assert_eq!(table.imports.len(), 2);
    assert_eq!(table.declarations, vec!["Home"]);
}

#[test]
fn test_nested_and_member_keywords_are_not_declarations() {
    let table = table(
        r#"
        function setup() {
          const inner = 1
          return { inner }
        }
        obj.export = 1
        const config = { import: true, export: false }
        "#,
    );
    assert!(table.exports.is_empty());
    assert_eq!(table.declarations, vec!["setup", "config"]);
}

#[test]
fn test_typescript_only_exports_are_ignored() {
    let table = table("export = Foo\nexport as namespace Lib\nexport import A = B.C");
    assert!(table.exports.is_empty());
}

#[test]
fn test_malformed_declarations_are_errors() {
    assert!(matches!(
        parse_module_table("import { from './x'", LanguageVariant::Standard),
        Err(ModuleParseError::Syntax(_))
    ));
    assert!(matches!(
        parse_module_table("export { A } from", LanguageVariant::Standard),
        Err(ModuleParseError::Syntax(_))
    ));
    assert!(matches!(
        parse_module_table("import A from './A", LanguageVariant::Standard),
        Err(ModuleParseError::Scan(_))
    ));
}

// =============================================================================
// Registration blocks
// =============================================================================

#[test]
fn test_options_decorator_shorthand() {
    let source = r#"
        import { Options, Vue } from 'vue-class-component'
        import { Header } from './widgets'
        import Footer from './Footer.vue'

        @Options({
          props: { msg: String },
          components: { Header, Footer },
        })
        export default class Home extends Vue {}
    "#;
    assert_eq!(registrations(source), vec![pair("Header", "Header"), pair("Footer", "Footer")]);
}

#[test]
fn test_component_decorator_with_renamed_entries() {
    let source = r#"
        @Component({
          components: {
            AppHeader: Header,
            'app-footer': Footer,
            Lazy: () => import('./Lazy.vue'),
            Nav,
          }
        })
        export default class App extends Vue {}
    "#;
    assert_eq!(
        registrations(source),
        vec![
            pair("AppHeader", "Header"),
            pair("app-footer", "Footer"),
            pair("Nav", "Nav"),
        ]
    );
}

#[test]
fn test_unrecognized_or_detached_decorators_are_ignored() {
    // Not a recognized decorator name.
    assert!(registrations("@Other({ components: { A } }) class X {}").is_empty());
    // Recognized, but not applied to a class.
    assert!(registrations("const opts = Options({ components: { A } })").is_empty());
    assert!(registrations("@Options({ components: { A } }) function f() {}").is_empty());
}

#[test]
fn test_stacked_and_namespaced_decorators() {
    let source = r#"
        @VueDecorators.Options({ components: { A } })
        @Other()
        export default abstract class X {}
    "#;
    assert_eq!(registrations(source), vec![pair("A", "A")]);
}

#[test]
fn test_default_export_options_objects() {
    assert_eq!(
        registrations("export default { components: { A, B: C } }"),
        vec![pair("A", "A"), pair("B", "C")]
    );
    assert_eq!(
        registrations("export default defineComponent({ name: 'X', components: { D } })"),
        vec![pair("D", "D")]
    );
    assert!(registrations("export default { name: 'NoComponents' }").is_empty());
}

#[test]
fn test_custom_decorator_names() {
    let source = "@Page({ components: { A } }) class P {}";
    assert_eq!(
        parse_registrations(source, LanguageVariant::Standard, &["Page"]).unwrap(),
        vec![pair("A", "A")]
    );
    assert!(registrations(source).is_empty());
}
