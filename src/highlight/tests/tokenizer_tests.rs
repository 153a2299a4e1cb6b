use std::sync::Once;

use tracing::{debug, info};

use crate::highlight::{ColorClass, LanguageDefinition, LineState, SyntaxHighlighter, Token, Tokenizer};

fn setup_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

fn js() -> SyntaxHighlighter {
    SyntaxHighlighter::from(LanguageDefinition::javascript())
}

fn raysl() -> SyntaxHighlighter {
    SyntaxHighlighter::from(LanguageDefinition::raysl())
}

/// No keyword tables, only the namespace marker.
fn bare_script() -> SyntaxHighlighter {
    SyntaxHighlighter::from(LanguageDefinition::new("Script", "//").with_namespace_marker("VG."))
}

fn assert_covers_line(tokens: &[Token], line_len: usize) {
    let mut last_end = 0usize;
    for token in tokens {
        assert!(token.start < token.end, "token is empty");
        assert_eq!(token.start, last_end, "tokens must be contiguous");
        last_end = token.end;
    }
    assert_eq!(last_end, line_len, "tokens must cover the line");
}

fn runs(
    tokenizer: &SyntaxHighlighter,
    line: &str,
    state: LineState,
) -> (Vec<(ColorClass, String)>, LineState) {
    setup_test_logging();
    info!(case = line, ?state, "tokenizing");
    let (tokens, state) = tokenizer.tokenize_line(line, state);
    debug!(?tokens, ?state, "tokenization result");
    assert_covers_line(&tokens, line.chars().count());
    (
        tokens.iter().map(|t| (t.class, t.text(line))).collect(),
        state,
    )
}

macro_rules! assert_first_class {
    ($name:ident, $tokenizer:expr, $input:expr, $class:expr) => {
        #[test]
        fn $name() {
            let (tokens, _) = runs(&$tokenizer, $input, LineState::Normal);
            assert!(!tokens.is_empty(), "tokens should not be empty");
            assert_eq!(tokens[0].0, $class);
        }
    };
}

macro_rules! assert_runs {
    ($name:ident, $tokenizer:expr, $input:expr, [$(($class:ident, $text:expr)),* $(,)?]) => {
        #[test]
        fn $name() {
            let (tokens, state) = runs(&$tokenizer, $input, LineState::Normal);
            let expected: Vec<(ColorClass, String)> =
                vec![$((ColorClass::$class, $text.to_string())),*];
            assert_eq!(tokens, expected);
            assert_eq!(state, LineState::Normal);
        }
    };
}

assert_first_class!(js_reserved_function, js(), "function f()", ColorClass::Reserved);
assert_first_class!(js_builtin_math, js(), "Math.floor(x)", ColorClass::Builtin);
assert_first_class!(js_line_comment, js(), "// all comment", ColorClass::Comment);
assert_first_class!(js_string_double, js(), "\"text\"", ColorClass::StringLiteral);
assert_first_class!(js_string_single, js(), "'text'", ColorClass::StringLiteral);
assert_first_class!(js_number, js(), "42", ColorClass::NumericLiteral);
assert_first_class!(js_namespace, js(), "VG.context", ColorClass::NamespaceMarker);
assert_first_class!(raysl_reserved_float3, raysl(), "float3 c", ColorClass::Reserved);
assert_first_class!(raysl_global_out_color, raysl(), "outColor = c", ColorClass::GlobalVar);
assert_first_class!(raysl_hash_comment, raysl(), "# shading", ColorClass::Comment);

assert_runs!(
    this_wins_over_namespace,
    js(),
    "this.VG.Math",
    [
        (Reserved, "this"),
        (PlainText, "."),
        (NamespaceMarker, "VG."),
        (Builtin, "Math"),
    ]
);

assert_runs!(
    namespace_run_extends_to_terminator,
    js(),
    "VG.draw.rect(x)",
    [(NamespaceMarker, "VG.draw.rect"), (PlainText, "(x)")]
);

// `.` does not end a namespace run, so without a `Math` builtin the whole
// dotted path is one marker.
assert_runs!(
    namespace_swallows_dotted_path_without_builtin,
    bare_script(),
    "this.VG.Math",
    [
        (Reserved, "this"),
        (PlainText, "."),
        (NamespaceMarker, "VG.Math"),
    ]
);

assert_runs!(
    raysl_namespace,
    raysl(),
    "c = VG.noise(uv)",
    [
        (PlainText, "c = "),
        (NamespaceMarker, "VG.noise"),
        (PlainText, "(uv)"),
    ]
);

assert_runs!(
    comment_before_quote_wins,
    js(),
    "x // it's",
    [(PlainText, "x "), (Comment, "// it's")]
);

assert_runs!(
    quote_before_comment_wins,
    js(),
    "s = \"a//b\"",
    [(PlainText, "s = "), (StringLiteral, "\"a//b\"")]
);

assert_runs!(
    escaped_quote_stays_in_string,
    js(),
    r#"x = "say \"hi\"" + y"#,
    [
        (PlainText, "x = "),
        (StringLiteral, r#""say \"hi\"""#),
        (PlainText, " + y"),
    ]
);

assert_runs!(
    unterminated_quote_runs_to_end,
    js(),
    "'open",
    [(StringLiteral, "'open")]
);

assert_runs!(
    earliest_quote_kind_opens,
    js(),
    r#"'a"b' "#,
    [(StringLiteral, r#"'a"b'"#), (PlainText, " ")]
);

assert_runs!(
    signed_number_marks_first_char_only,
    js(),
    "x=-1",
    [(PlainText, "x="), (NumericLiteral, "-1")]
);

assert_runs!(
    decimal_number,
    js(),
    "a .5",
    [(PlainText, "a "), (NumericLiteral, ".5")]
);

assert_runs!(
    keyword_needs_boundaries,
    js(),
    "newItem",
    [(PlainText, "newItem")]
);

// Only the first occurrence of a table word is considered.
assert_runs!(
    first_occurrence_only,
    js(),
    "renew new",
    [(PlainText, "renew new")]
);

// Reserved beats builtin even when the builtin occurs earlier.
assert_runs!(
    category_priority_beats_position,
    js(),
    "Math.max; return",
    [
        (Builtin, "Math"),
        (PlainText, ".max; "),
        (Reserved, "return"),
    ]
);

assert_runs!(
    globals_are_not_boundary_checked,
    raysl(),
    "xinUVy",
    [(PlainText, "x"), (GlobalVar, "inUV"), (PlainText, "y")]
);

assert_runs!(
    boundary_check_is_relative_to_run,
    js(),
    "\"s\"this",
    [(StringLiteral, "\"s\""), (Reserved, "this")]
);

#[test]
fn category_priority_tie_break_order() {
    // "return" (reserved) is classified before "Math" (builtin) is looked
    // at, so the prefix containing Math is classified afterwards on its own.
    let (tokens, _) = runs(&js(), "Math.max; return", LineState::Normal);
    assert_eq!(tokens[2], (ColorClass::Reserved, "return".to_string()));
}

#[test]
fn multi_line_comment_open_sets_state() {
    let (tokens, state) = runs(&js(), "var a; /* start", LineState::Normal);
    assert_eq!(state, LineState::InComment);
    assert_eq!(tokens[0], (ColorClass::Reserved, "var".to_string()));
    assert_eq!(tokens.last().unwrap(), &(ColorClass::Comment, "/* start".to_string()));
}

#[test]
fn multi_line_comment_continues_whole_line() {
    let (tokens, state) = runs(&js(), "var inside", LineState::InComment);
    assert_eq!(state, LineState::InComment);
    assert_eq!(tokens, vec![(ColorClass::Comment, "var inside".to_string())]);
}

#[test]
fn multi_line_comment_close_resumes_code() {
    let (tokens, state) = runs(&js(), "end */ return 1", LineState::InComment);
    assert_eq!(state, LineState::Normal);
    assert_eq!(
        tokens,
        vec![
            (ColorClass::Comment, "end */".to_string()),
            (ColorClass::PlainText, " ".to_string()),
            (ColorClass::Reserved, "return".to_string()),
            (ColorClass::PlainText, " ".to_string()),
            (ColorClass::NumericLiteral, "1".to_string()),
        ]
    );
}

#[test]
fn closed_then_reopened_comment() {
    let (_, state) = runs(&js(), "a */ b /* c", LineState::InComment);
    assert_eq!(state, LineState::InComment);
}

#[test]
fn line_comment_never_changes_state() {
    let (_, state) = runs(&js(), "x // /* not a block", LineState::Normal);
    assert_eq!(state, LineState::Normal);
}

#[test]
fn raysl_has_no_block_state() {
    let (tokens, state) = runs(&raysl(), "a /* b", LineState::Normal);
    assert_eq!(state, LineState::Normal);
    assert!(tokens.iter().all(|(class, _)| *class != ColorClass::Comment));
}

#[test]
fn non_ascii_columns_are_characters() {
    let line = "ü = \"ß\" // é";
    let (tokens, _) = js().tokenize_line(line, LineState::Normal);
    assert_covers_line(&tokens, line.chars().count());
    let string = tokens
        .iter()
        .find(|t| t.class == ColorClass::StringLiteral)
        .unwrap();
    assert_eq!(string.range(), 4..7);
}

#[test]
fn custom_language_from_json() {
    setup_test_logging();
    let lang = LanguageDefinition::from_json(
        r#"{
            "name": "Lua",
            "line_comment": "--",
            "multi_line_comment": {"open": "--[[", "close": "]]"},
            "reserved": ["local", "end"],
            "builtins": ["print"]
        }"#,
    )
    .unwrap();
    let lua = SyntaxHighlighter::from(lang);
    // "--" and "--[[" start at the same column; the line comment wins ties.
    let (tokens, state) = runs(&lua, "local x --[[ note", LineState::Normal);
    assert_eq!(state, LineState::Normal);
    assert_eq!(tokens[0], (ColorClass::Reserved, "local".to_string()));
    assert_eq!(tokens.last().unwrap().0, ColorClass::Comment);

    let (_, state) = runs(&lua, "]] print(x)", LineState::InComment);
    assert_eq!(state, LineState::Normal);
}
