//! End-to-end compile scenarios
//!
//! Diagnostic cases compile in-memory sources and compare the exact message
//! text. File-system cases build fixtures in a temp directory so that include
//! and embed resolution runs against real paths.

use promptc::promptc::ast::{BlockKind, DiagnosticKind};
use promptc::{compile, CompileFailure, Compiler, EmitOptions};
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn messages(failure: &CompileFailure) -> Vec<String> {
    failure.diagnostics.iter().map(ToString::to_string).collect()
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(&path, contents).expect("write fixture");
    path
}

#[rstest]
#[case::tab_in_indentation(
    "Context:\n\tx\nAction:\n    go\n",
    "[Tab] Tab character used in indentation: line 2, column 1, file main.m6r"
)]
#[case::tab_after_spaces(
    "Context:\n  \tx\nAction:\n    go\n",
    "[Tab] Tab character used in indentation: line 2, column 3, file main.m6r"
)]
#[case::context_indented_five_spaces(
    "Context: Top\n    notes\n     Context: Inner\n        detail\nAction:\n    go\n",
    "[Bad Indent] Indentation must be a multiple of 4 spaces: line 3, column 6, file main.m6r"
)]
#[case::top_level_context_indented_five_spaces(
    "     Context: Top\n    notes\nAction:\n    go\n",
    "[Bad Indent] Indentation must be a multiple of 4 spaces: line 1, column 6, file main.m6r"
)]
#[case::outdent_between_levels(
    "Context:\n    Context:\n        x\n      y\nAction:\n    go\n",
    "[Bad Outdent] Outdent does not match any enclosing indentation level: line 4, column 7, file main.m6r"
)]
#[case::missing_action(
    "Context:\n    c\n",
    "Missing 'Action' block: line 1, column 1, file main.m6r"
)]
#[case::missing_context(
    "Action:\n    go\n",
    "Missing 'Context' block: line 1, column 1, file main.m6r"
)]
#[case::second_action(
    "Context:\n    c\nAction:\n    a\nAction:\n    b\n",
    "'Action' already defined: line 5, column 1, file main.m6r"
)]
#[case::second_role(
    "Role:\n    r\nRole:\n    s\nContext:\n    c\nAction:\n    go\n",
    "'Role' already defined: line 3, column 1, file main.m6r"
)]
#[case::late_role(
    "Context:\n    c\nRole:\n    r\nAction:\n    go\n",
    "'Role' must precede all 'Context' and 'Action' blocks: line 3, column 1, file main.m6r"
)]
#[case::keyword_without_space(
    "Context:\n    c\nAction:go\n",
    "Expected a space after 'Action:': line 3, column 1, file main.m6r"
)]
#[case::include_without_file(
    "Context:\n    Include:\nAction:\n    go\n",
    "Expected file name for 'Include': line 2, column 5, file main.m6r"
)]
#[case::embed_without_file(
    "Context:\n    Embed:\nAction:\n    go\n",
    "Expected file name for 'Embed': line 2, column 5, file main.m6r"
)]
#[case::stray_top_level_text(
    "hello\nContext:\n    c\nAction:\n    go\n",
    "Unexpected text at top level: line 1, column 1, file main.m6r"
)]
#[case::action_inside_context(
    "Context:\n    Action:\n        x\nAction:\n    go\n",
    "Unexpected 'Action' in 'Context' block: line 2, column 5, file main.m6r"
)]
#[case::skipped_level(
    "Context:\n    c\n        deeper\nAction:\n    go\n",
    "Indentation skips a level: line 3, column 9, file main.m6r"
)]
fn reports_single_diagnostic(#[case] source: &str, #[case] expected: &str) {
    let failure = compile(source, "main.m6r", &[]).unwrap_err();
    assert_eq!(messages(&failure), vec![expected.to_string()]);
}

#[test]
fn scenario_context_then_action() {
    let prompt = compile(
        "Context: Top\n    Some notes\n\nAction:\n    Do X\n",
        "main.m6r",
        &[],
    )
    .expect("scenario compiles");

    assert!(prompt.diagnostics.is_empty());
    assert_eq!(prompt.sections.len(), 2);
    assert_eq!(prompt.sections[0].kind, BlockKind::Context);
    assert_eq!(prompt.sections[0].label.as_deref(), Some("Top"));
    assert_eq!(prompt.sections[1].kind, BlockKind::Action);
    assert_eq!(
        prompt.render(&EmitOptions::default()),
        "Context: Top\n    Some notes\nAction:\n    Do X\n"
    );
}

#[test]
fn action_written_first_is_emitted_last() {
    let prompt = compile(
        "Action:\n    Do X\nContext: Top\n    notes\n",
        "main.m6r",
        &[],
    )
    .expect("either order compiles");

    let kinds: Vec<BlockKind> = prompt.sections.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![BlockKind::Context, BlockKind::Action]);
    assert_eq!(prompt.document.action_position, 0);
    assert_eq!(
        prompt.render(&EmitOptions::default()),
        "Context: Top\n    notes\nAction:\n    Do X\n"
    );
}

#[test]
fn all_problems_reported_in_one_pass() {
    let source = "Context:\n\tfirst\n    Context:\n         second\nRole:\n    late\n";
    let failure = compile(source, "main.m6r", &[]).unwrap_err();
    let kinds: Vec<DiagnosticKind> = failure.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::Indentation,
            DiagnosticKind::Indentation,
            DiagnosticKind::Structure,
            DiagnosticKind::Structure,
        ]
    );
    let lines: Vec<usize> = failure
        .diagnostics
        .iter()
        .map(|d| d.location.line)
        .collect();
    assert_eq!(lines, vec![2, 4, 5, 1]);
}

#[test]
fn include_nests_at_directive_depth() {
    let dir = TempDir::new().expect("temp dir");
    let root = write(
        dir.path(),
        "main.m6r",
        "Context: Outer\n    Include: parts/inner.m6r\nAction:\n    go\n",
    );
    write(dir.path(), "parts/inner.m6r", "Context: Inner\n    detail\n");

    let prompt = Compiler::default()
        .compile_file(&root)
        .expect("include compiles");
    let inner = prompt
        .sections
        .iter()
        .find(|s| s.label.as_deref() == Some("Inner"))
        .expect("inner section");
    assert_eq!(inner.depth, 1);
    assert_eq!(inner.location.file, dir.path().join("parts/inner.m6r"));
    assert_eq!(
        prompt.render(&EmitOptions::default()),
        "Context: Outer\n    Context: Inner\n        detail\nAction:\n    go\n"
    );
}

#[test]
fn nested_include_resolves_relative_to_including_file() {
    let dir = TempDir::new().expect("temp dir");
    let root = write(
        dir.path(),
        "main.m6r",
        "Context:\n    Include: parts/a.m6r\nAction:\n    go\n",
    );
    write(dir.path(), "parts/a.m6r", "Context: A\n    Include: b.m6r\n");
    write(dir.path(), "parts/b.m6r", "Context: B\n    deep\n");

    let prompt = Compiler::default().compile_file(&root).expect("compiles");
    let b = prompt
        .sections
        .iter()
        .find(|s| s.label.as_deref() == Some("B"))
        .expect("section B");
    assert_eq!(b.depth, 2);
}

#[test]
fn include_cycle_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let a = write(
        dir.path(),
        "a.m6r",
        "Context: A\n    Include: b.m6r\nAction:\n    go\n",
    );
    write(dir.path(), "b.m6r", "Context: B\n    Include: a.m6r\n");

    let failure = Compiler::default().compile_file(&a).unwrap_err();
    assert_eq!(failure.diagnostics.len(), 1);
    let diagnostic = &failure.diagnostics.as_slice()[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::Include);
    assert_eq!(
        diagnostic.message,
        format!(
            "Circular include detected: {} -> {} -> {}",
            a.display(),
            dir.path().join("b.m6r").display(),
            a.display()
        )
    );
    assert_eq!(diagnostic.location.file, dir.path().join("b.m6r"));
}

#[test]
fn self_include_is_a_cycle() {
    let dir = TempDir::new().expect("temp dir");
    let root = write(
        dir.path(),
        "main.m6r",
        "Context:\n    Include: ./main.m6r\nAction:\n    go\n",
    );
    let failure = Compiler::default().compile_file(&root).unwrap_err();
    assert_eq!(failure.diagnostics.len(), 1);
    assert!(failure.diagnostics.as_slice()[0]
        .message
        .starts_with("Circular include detected: "));
}

#[test]
fn missing_include_and_embed_are_both_reported() {
    let dir = TempDir::new().expect("temp dir");
    let root = write(
        dir.path(),
        "main.m6r",
        "Context:\n    Include: gone.m6r\n    Embed: gone.py\nAction:\n    go\n",
    );

    let failure = Compiler::default().compile_file(&root).unwrap_err();
    let diagnostics = failure.diagnostics.as_slice();
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Include);
    assert_eq!(
        diagnostics[0].message,
        format!("File not found: {}", dir.path().join("gone.m6r").display())
    );
    assert_eq!(diagnostics[1].kind, DiagnosticKind::Embed);
    assert_eq!(diagnostics[1].location.line, 3);
}

#[test]
fn embedding_a_directory_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    fs::create_dir(dir.path().join("assets")).expect("create dir");
    let root = write(
        dir.path(),
        "main.m6r",
        "Context:\n    Embed: assets\nAction:\n    go\n",
    );

    let failure = Compiler::default().compile_file(&root).unwrap_err();
    assert_eq!(
        messages(&failure),
        vec![format!(
            "Is a directory: {}: line 2, column 5, file {}",
            dir.path().join("assets").display(),
            root.display()
        )]
    );
}

#[test]
fn embedded_tabs_are_preserved() {
    let dir = TempDir::new().expect("temp dir");
    let root = write(
        dir.path(),
        "main.m6r",
        "Context: Code\n    Embed: tool.py\nAction:\n    Review it\n",
    );
    write(dir.path(), "tool.py", "def f():\n\treturn 1\n");

    let prompt = Compiler::default().compile_file(&root).expect("compiles");
    let output = prompt.render(&EmitOptions::default());
    assert_eq!(
        output,
        "Context: Code\n    File: tool.py\n    ```python\n    def f():\n    \treturn 1\n    ```\nAction:\n    Review it\n"
    );
    for line in output.lines().filter(|line| !line.contains("return")) {
        assert!(!line.contains('\t'), "unexpected tab in {:?}", line);
    }
}

#[test]
fn search_paths_are_tried_after_local_directory() {
    let dir = TempDir::new().expect("temp dir");
    let root = write(
        dir.path(),
        "prompts/main.m6r",
        "Context:\n    Include: shared.m6r\nAction:\n    go\n",
    );
    write(dir.path(), "library/shared.m6r", "Context: Shared\n    from library\n");

    let search = vec![dir.path().join("library")];
    let source = fs::read_to_string(&root).expect("read root");
    let prompt = compile(&source, &root, &search).expect("found in search path");
    assert!(prompt
        .sections
        .iter()
        .any(|s| s.label.as_deref() == Some("Shared")));

    let failure = compile(&source, &root, &[]).unwrap_err();
    assert_eq!(failure.diagnostics.as_slice()[0].kind, DiagnosticKind::Include);
}

#[test]
fn unreadable_root_aborts_immediately() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("missing.m6r");
    let failure = Compiler::default().compile_file(&missing).unwrap_err();
    assert_eq!(
        messages(&failure),
        vec![format!(
            "File not found: {}: line 1, column 1, file {}",
            missing.display(),
            missing.display()
        )]
    );
}

#[test]
fn comments_and_code_fences() {
    let source = "# A prompt\nContext: Examples\n    Here is code:\n    ```rust\n    fn main() {\n        println!(\"hi\");\n    }\n    ```\nAction:\n    Explain it\n";
    let prompt = compile(source, "main.m6r", &[]).expect("compiles");
    assert_eq!(
        prompt.render(&EmitOptions::default()),
        "Context: Examples\n    Here is code:\n    ```rust\n    fn main() {\n        println!(\"hi\");\n    }\n    ```\nAction:\n    Explain it\n"
    );
}
