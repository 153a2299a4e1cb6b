//! Syntax highlighting through the cached buffer and the editing core.
//!
//! Run with:
//!   cargo test --test `highlight_pipeline` -- --nocapture

mod common;

use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::Arc;

use common::{monospace, setup_test_logging};
use textcore::highlight::{ColorClass, HighlightedBuffer, LanguageDefinition, LanguageRegistry};
use textcore::text::{LineLayout, Rect};
use textcore::{Error, Rgba, TextBuffer, TextEditingCore};
use tracing::{debug, info};

const SAMPLE: &str = "/* one\ntwo */ 3\nvar a; /* start\nvar inside\nend */ return 1\nx // it's";

fn render(highlighted: &HighlightedBuffer) -> String {
    let buffer = highlighted.buffer();
    let mut lines = Vec::with_capacity(buffer.line_count());
    for line in 0..buffer.line_count() {
        let text = buffer.line_or_empty(line);
        let mut out = format!("{line} ");
        for token in highlighted.tokens_for_line(line) {
            let _ = write!(out, "[{}:{}]", token.class.label(), token.text(&text));
        }
        lines.push(out);
    }
    lines.join("\n")
}

fn render_layout(layout: &[LineLayout]) -> String {
    layout
        .iter()
        .map(|line| {
            let runs: Vec<String> = line
                .runs
                .iter()
                .map(|run| format!("{}@{}:{}", run.class.label(), run.x, run.text))
                .collect();
            format!("{} {}", line.line, runs.join("|"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn javascript_buffer(text: &str) -> HighlightedBuffer {
    HighlightedBuffer::new(TextBuffer::with_text(text))
        .with_language(Arc::new(LanguageDefinition::javascript()))
}

#[test]
fn test_comment_state_flows_across_lines() {
    setup_test_logging();
    let mut highlighted = javascript_buffer(SAMPLE);
    highlighted.update_highlighting();
    info!("highlighted sample document");

    insta::assert_snapshot!(render(&highlighted), @r"
    0 [comment:/* one]
    1 [comment:two */][text: ][number:3]
    2 [reserved:var][text: a; ][comment:/* start]
    3 [comment:var inside]
    4 [comment:end */][text: ][reserved:return][text: ][number:1]
    5 [text:x ][comment:// it's]
    ");
}

#[test]
fn test_closing_comment_rehighlights_following_lines() {
    setup_test_logging();
    let mut highlighted = javascript_buffer(SAMPLE);
    highlighted.update_highlighting();

    highlighted.buffer_mut().replace_line(0, "/* one */");
    highlighted.mark_dirty(0);
    highlighted.update_highlighting();
    debug!(dirty = ?highlighted.dirty_from(), "after edit");

    let classes = |line: usize| -> Vec<ColorClass> {
        highlighted
            .tokens_for_line(line)
            .iter()
            .map(|token| token.class)
            .collect()
    };
    assert_eq!(classes(0), vec![ColorClass::Comment]);
    assert_eq!(classes(1), vec![ColorClass::PlainText, ColorClass::NumericLiteral]);
    assert_eq!(classes(3), vec![ColorClass::Comment]);
}

#[test]
fn test_code_editor_layout_runs() {
    let mut core = TextEditingCore::code_edit(monospace());
    core.set_content_rect(Rect::new(5.0, 0.0, 400.0, 200.0));
    core.value_from_model(Some("var n = 10;\n// done"));

    let layout = core.layout();
    insta::assert_snapshot!(render_layout(&layout), @r"
    0 reserved@5:var|text@35: n = |number@85:10|text@105:;
    1 comment@5:// done
    ");
}

#[test]
fn test_empty_line_has_no_runs() {
    let mut core = TextEditingCore::text_edit(monospace());
    core.set_content_rect(Rect::new(0.0, 0.0, 400.0, 200.0));
    core.value_from_model(Some("plain\n\nwords"));
    let layout = core.layout();
    assert_eq!(layout.len(), 3);
    assert_eq!(layout[0].runs.len(), 1);
    assert_eq!(layout[0].runs[0].class, ColorClass::PlainText);
    assert!(layout[1].runs.is_empty());
}

// ============================================================================
// Language definition files
// ============================================================================

const LUA: &str = r##"{
    "name": "Lua",
    "line_comment": "--",
    "reserved": ["local", "function", "end", "return"],
    "builtins": ["print"],
    "palette": { "Reserved": "#FF0000" }
}"##;

#[test]
fn test_language_file_drives_highlighting() {
    setup_test_logging();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(LUA.as_bytes()).unwrap();

    let lua = LanguageDefinition::from_path(file.path()).unwrap();
    assert_eq!(lua.name, "Lua");
    assert_eq!(lua.multi_line_comment, None);

    let mut registry = LanguageRegistry::new();
    let index = registry.register(lua);
    let mut core = TextEditingCore::code_edit(monospace()).with_languages(registry);
    core.set_language_index(index).unwrap();
    core.set_content_rect(Rect::new(0.0, 0.0, 400.0, 200.0));
    core.value_from_model(Some("local x -- note"));

    let layout = core.layout();
    let runs = &layout[0].runs;
    assert_eq!(runs[0].class, ColorClass::Reserved);
    assert_eq!(runs[0].text, "local");
    assert_eq!(runs[0].color, Rgba::from_rgb_u8(255, 0, 0));
    assert_eq!(runs.last().map(|run| run.class), Some(ColorClass::Comment));
}

#[test]
fn test_language_file_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = LanguageDefinition::from_path(dir.path().join("missing.json"));
    assert!(matches!(missing, Err(Error::Io(_))));

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{ not json").unwrap();
    assert!(matches!(
        LanguageDefinition::from_path(&broken),
        Err(Error::Json(_))
    ));

    let unnamed = dir.path().join("unnamed.json");
    std::fs::write(&unnamed, r##"{"name": "", "line_comment": "#"}"##).unwrap();
    assert!(matches!(
        LanguageDefinition::from_path(&unnamed),
        Err(Error::InvalidLanguage { .. })
    ));
}

#[test]
fn test_language_index_out_of_range() {
    let mut core = TextEditingCore::code_edit(monospace());
    let err = core.set_language_index(7).unwrap_err();
    assert_eq!(
        err.to_string(),
        "language index 7 out of range for 2 registered languages"
    );
}
