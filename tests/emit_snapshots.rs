//! Snapshot tests for rendered prompts and inspection output

use promptc::promptc::formats::{format_analysis, OutputFormat};
use promptc::{CompiledPrompt, Compiler, EmbedFraming, EmitOptions, MemorySourceProvider};
use std::path::Path;

const PROJECT: &str = "Context: Code\n    Include: parts/notes.m6r\n    Embed: src/lib.rs\nAction:\n    Summarize.\n";

fn project_files() -> MemorySourceProvider {
    MemorySourceProvider::new()
        .with_file("main.m6r", PROJECT)
        .with_file("parts/notes.m6r", "Context: Notes\n    Keep it short.\n")
        .with_file(
            "src/lib.rs",
            "pub fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n",
        )
}

fn compile_project() -> CompiledPrompt {
    Compiler::default()
        .with_provider(project_files())
        .compile_file(Path::new("main.m6r"))
        .expect("project compiles")
}

#[test]
fn renders_nested_document() {
    let source = "# reviewer prompt\nRole: Reviewer\n    You review code carefully.\n\nContext: Project\n    A small CLI tool.\n    Context: Conventions\n        Four-space indentation.\n    Tests live next to the code.\n\nAction: Review\n    Review the change.\n    Context: Focus\n        Error handling.\n";
    let prompt = Compiler::default()
        .with_provider(MemorySourceProvider::new())
        .compile(source, Path::new("review.m6r"))
        .expect("valid document");

    insta::assert_snapshot!(prompt.render(&EmitOptions::default()).trim_end(), @r###"
Role: Reviewer
    You review code carefully.
Context: Project
    A small CLI tool.
    Context: Conventions
        Four-space indentation.
    Tests live next to the code.
Action: Review
    Review the change.
    Context: Focus
        Error handling.
"###);
}

#[test]
fn renders_fenced_embed() {
    let output = compile_project().render(&EmitOptions::default());

    insta::assert_snapshot!(output.trim_end(), @r###"
Context: Code
    Context: Notes
        Keep it short.
    File: src/lib.rs
    ```rust
    pub fn add(a: i32, b: i32) -> i32 {
        a + b
    }
    ```
Action:
    Summarize.
"###);
}

#[test]
fn renders_raw_embed() {
    let options = EmitOptions {
        framing: EmbedFraming::Raw,
    };
    let output = compile_project().render(&options);

    insta::assert_snapshot!(output.trim_end(), @r###"
Context: Code
    Context: Notes
        Keep it short.
    pub fn add(a: i32, b: i32) -> i32 {
        a + b
    }
Action:
    Summarize.
"###);
}

#[test]
fn expanded_token_stream() {
    let compiler = Compiler::default().with_provider(project_files());
    let analysis = compiler.analyze(PROJECT, Path::new("main.m6r"), &[]);
    let tokens = format_analysis(&analysis, OutputFormat::Tokens).expect("tokens");

    insta::assert_snapshot!(tokens.trim_end(), @r###"
<context:Code>
<indent>
<context:Notes>
<indent>
<text:Keep it short.>
<dedent>
<embedded:src/lib.rs (rust)>
<dedent>
<action>
<indent>
<text:Summarize.>
<dedent>
<eos>
"###);
}

#[test]
fn failure_lists_every_diagnostic() {
    let source = "Context:\n\tx\n    Context:\n         y\nAction:\n    a\nAction:\n    b\n";
    let failure = Compiler::default()
        .with_provider(MemorySourceProvider::new())
        .compile(source, Path::new("broken.m6r"))
        .unwrap_err();

    insta::assert_snapshot!(failure.to_string(), @r###"
[Tab] Tab character used in indentation: line 2, column 1, file broken.m6r
[Bad Indent] Indentation must be a multiple of 4 spaces: line 4, column 10, file broken.m6r
'Action' already defined: line 7, column 1, file broken.m6r
"###);
}
