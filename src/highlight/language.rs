//! Language definition tables and the registry that orders them.

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::highlight::palette::Palette;
use crate::highlight::token::ColorClass;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Open/close markers of a multi-line comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDelimiters {
    pub open: String,
    pub close: String,
}

/// Keyword tables, comment markers and colors for one language.
///
/// Word lists are ordered: the first entry of a list that matches a piece of
/// text wins, regardless of where later entries would match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LanguageDefinition {
    pub name: String,
    pub line_comment: String,
    #[serde(default)]
    pub multi_line_comment: Option<CommentDelimiters>,
    #[serde(default)]
    pub reserved: Vec<String>,
    #[serde(default)]
    pub builtins: Vec<String>,
    #[serde(default)]
    pub global_vars: Vec<String>,
    /// Dotted prefix such as `VG.` that marks a namespace run.
    #[serde(default)]
    pub namespace_marker: Option<String>,
    #[serde(default)]
    pub palette: Palette,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| (*w).to_string()).collect()
}

impl LanguageDefinition {
    /// Definition with only a name and line comment marker.
    #[must_use]
    pub fn new(name: impl Into<String>, line_comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            line_comment: line_comment.into(),
            multi_line_comment: None,
            reserved: Vec::new(),
            builtins: Vec::new(),
            global_vars: Vec::new(),
            namespace_marker: None,
            palette: Palette::default(),
        }
    }

    /// Builder: multi-line comment markers.
    #[must_use]
    pub fn with_multi_line_comment(mut self, open: &str, close: &str) -> Self {
        self.multi_line_comment = Some(CommentDelimiters {
            open: open.to_string(),
            close: close.to_string(),
        });
        self
    }

    /// Builder: reserved words.
    #[must_use]
    pub fn with_reserved(mut self, list: &[&str]) -> Self {
        self.reserved = words(list);
        self
    }

    /// Builder: builtin identifiers.
    #[must_use]
    pub fn with_builtins(mut self, list: &[&str]) -> Self {
        self.builtins = words(list);
        self
    }

    /// Builder: global variable names.
    #[must_use]
    pub fn with_global_vars(mut self, list: &[&str]) -> Self {
        self.global_vars = words(list);
        self
    }

    /// Builder: namespace marker.
    #[must_use]
    pub fn with_namespace_marker(mut self, marker: &str) -> Self {
        self.namespace_marker = Some(marker.to_string());
        self
    }

    /// Builder: palette.
    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// JavaScript, the default language of code widgets.
    #[must_use]
    pub fn javascript() -> Self {
        Self::new("JavaScript", "//")
            .with_multi_line_comment("/*", "*/")
            .with_reserved(&[
                "abstract", "arguments", "boolean", "break", "byte", "case", "catch", "char",
                "class", "const", "continue", "debugger", "default", "delete", "do", "double",
                "else", "enum", "eval", "export", "extends", "false", "final", "finally",
                "float", "for", "function", "goto", "if", "implements", "import", "in",
                "instanceof", "int", "interface", "let", "long", "native", "new", "null",
                "package", "private", "protected", "public", "return", "short", "static",
                "super", "switch", "synchronized", "this", "throw", "throws", "transient",
                "true", "try", "typeof", "var", "void", "volatile", "while", "with", "yield",
            ])
            .with_builtins(&[
                "Array", "Date", "eval", "function", "hasOwnProperty", "Infinity", "isFinite",
                "isNaN", "isPrototypeOf", "length", "Math", "NaN", "name", "Number", "Object",
                "prototype", "String", "toString", "undefined", "valueOf",
            ])
            .with_namespace_marker("VG.")
            .with_palette(code_palette(
                (252, 124, 34),
                (156, 211, 102),
                (181, 144, 215),
                (108, 150, 190),
                (212, 179, 77),
                (189, 152, 240),
            ))
    }

    /// RaySL shading language.
    #[must_use]
    pub fn raysl() -> Self {
        Self::new("RaySL", "#")
            .with_reserved(&["float", "float2", "float3", "float4"])
            .with_builtins(&["gradientNoise", "mix", "sin"])
            .with_global_vars(&[
                "inUV",
                "outColor",
                "outMetallic",
                "outSmoothness",
                "outReflectance",
                "outBump",
            ])
            .with_namespace_marker("VG.")
            .with_palette(code_palette(
                (146, 204, 153),
                (242, 119, 122),
                (102, 148, 198),
                (108, 150, 190),
                (255, 204, 102),
                (245, 124, 61),
            ))
    }

    /// Parse a definition from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let definition: Self = serde_json::from_str(json)?;
        definition.validate()?;
        debug!(name = %definition.name, "loaded language definition");
        Ok(definition)
    }

    /// Read and parse a definition file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject definitions the tokenizer cannot scan.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidLanguage {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.is_empty() {
            return Err(invalid("empty name"));
        }
        if self.line_comment.is_empty() {
            return Err(invalid("empty line comment marker"));
        }
        if let Some(markers) = &self.multi_line_comment {
            if markers.open.is_empty() || markers.close.is_empty() {
                return Err(invalid("empty multi-line comment marker"));
            }
        }
        if self.namespace_marker.as_deref() == Some("") {
            return Err(invalid("empty namespace marker"));
        }
        let lists = [&self.reserved, &self.builtins, &self.global_vars];
        if lists.iter().any(|list| list.iter().any(String::is_empty)) {
            return Err(invalid("empty word in keyword table"));
        }
        Ok(())
    }

    /// Display color for a class.
    #[must_use]
    pub fn color_for(&self, class: ColorClass) -> Rgba {
        self.palette.color_for(class)
    }
}

type Rgb = (u8, u8, u8);

fn code_palette(
    string: Rgb,
    reserved: Rgb,
    builtin: Rgb,
    global: Rgb,
    namespace: Rgb,
    digit: Rgb,
) -> Palette {
    let rgb = |(r, g, b): Rgb| Rgba::from_rgb_u8(r, g, b);
    Palette::default()
        .with_color(ColorClass::StringLiteral, rgb(string))
        .with_color(ColorClass::Reserved, rgb(reserved))
        .with_color(ColorClass::Builtin, rgb(builtin))
        .with_color(ColorClass::GlobalVar, rgb(global))
        .with_color(ColorClass::NamespaceMarker, rgb(namespace))
        .with_color(ColorClass::NumericLiteral, rgb(digit))
}

/// Ordered set of languages. Index 0 is the default.
#[derive(Clone, Debug, Default)]
pub struct LanguageRegistry {
    languages: Vec<Arc<LanguageDefinition>>,
    by_name: HashMap<String, usize>,
}

impl LanguageRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, returning its index. A later definition with
    /// the same (case-insensitive) name takes over name lookups.
    pub fn register(&mut self, definition: LanguageDefinition) -> usize {
        let index = self.languages.len();
        self.by_name
            .insert(definition.name.to_ascii_lowercase(), index);
        self.languages.push(Arc::new(definition));
        index
    }

    /// Number of registered languages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// Definition at `index`.
    pub fn get(&self, index: usize) -> Result<Arc<LanguageDefinition>> {
        self.languages
            .get(index)
            .cloned()
            .ok_or(Error::LanguageIndexOutOfRange {
                index,
                count: self.languages.len(),
            })
    }

    /// Index of a definition by name (case-insensitive).
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(&name.to_ascii_lowercase()).copied()
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(|lang| lang.name.as_str())
    }

    /// Registry with JavaScript (index 0) and RaySL (index 1).
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(LanguageDefinition::javascript());
        registry.register(LanguageDefinition::raysl());
        registry
    }
}
