//! Grammar selection for the JavaScript family.

use crate::core::Language;
use std::path::Path;
use tree_sitter::Language as TsLanguage;

/// Dialect implied by a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsVariant {
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
}

impl JsVariant {
    /// Case-insensitive, matching how files are assigned a language.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Some(Self::JavaScript),
            "jsx" => Some(Self::Jsx),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }
}

/// Variant for a path, defaulting to the analyzer's own language.
pub fn detect_variant(path: &str, language: Language) -> JsVariant {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(JsVariant::from_extension)
        .unwrap_or(match language {
            Language::TypeScript => JsVariant::TypeScript,
            _ => JsVariant::JavaScript,
        })
}

pub fn grammar(variant: JsVariant) -> TsLanguage {
    match variant {
        JsVariant::JavaScript | JsVariant::Jsx => tree_sitter_javascript::LANGUAGE.into(),
        JsVariant::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        JsVariant::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
    }
}
