//! Strict-mode template rendering plus the unexpanded-token sweep.
//!
//! Two independent defenses are layered here: handlebars' own strict mode
//! rejects a misspelled field name the moment the template executes, and the
//! sweep below catches shell-style `${...}` leftovers that template source
//! content can accidentally carry in from elsewhere. Neither replaces the
//! other.

use std::collections::HashMap;

use handlebars::Handlebars;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// `$CLAUDE_PROJECT_DIR` and `$ARGUMENTS` are resolved by a downstream
/// runtime, never by this renderer, so the token sweep must not flag them.
const PASSTHROUGH_TOKENS: &[&str] = &["$CLAUDE_PROJECT_DIR", "$ARGUMENTS"];

/// Private-use code point used to mask passthrough tokens during the sweep;
/// it cannot itself match any of the three token patterns below.
const MASK_MARKER: char = '\u{E000}';

static DOLLAR_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{[A-Za-z_][A-Za-z0-9_]*\}").unwrap());
static HANDLEBARS_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*[A-Za-z_][A-Za-z0-9_.]*\s*\}\}").unwrap());
static BARE_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$[A-Z_][A-Z0-9_]*\b").unwrap());

#[derive(Debug, Error)]
pub enum Error {
    #[error("template not found: {0}")]
    TemplateNotFound(String),
    #[error("missing template key: {0}")]
    MissingTemplateKey(String),
    #[error("unexpanded token left in rendered output: {0}")]
    UnexpandedToken(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Wraps a `handlebars::Handlebars` configured for strict-mode key lookup.
pub struct Renderer {
    engine: Handlebars<'static>,
}

impl Default for Renderer {
    fn default() -> Self {
        let mut engine = Handlebars::new();
        engine.set_strict_mode(true);
        register_helpers(&mut engine);
        Self { engine }
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `source` under `name` for later lookup via [`Renderer::render`].
    pub fn register_template(&mut self, name: &str, source: &str) -> Result<()> {
        self.engine
            .register_template_string(name, source)
            .map_err(|e| Error::MissingTemplateKey(e.to_string()))?;
        Ok(())
    }

    /// Renders a previously registered template by name.
    pub fn render(&self, name: &str, data: &impl Serialize) -> Result<Vec<u8>> {
        let rendered = self
            .engine
            .render(name, data)
            .map_err(|e| classify_render_error(name, e))?;
        finish(rendered)
    }

    /// Renders `source` directly without registering it, for one-off
    /// rendering of deployer-walked template members.
    pub fn render_str(&self, source: &str, data: &impl Serialize) -> Result<Vec<u8>> {
        let rendered = self
            .engine
            .render_template(source, data)
            .map_err(|e| classify_render_error(source, e))?;
        finish(rendered)
    }
}

fn classify_render_error(context: &str, err: handlebars::RenderError) -> Error {
    let message = err.to_string();
    if message.contains("Couldn't find") || message.contains("strict") {
        Error::MissingTemplateKey(format!("{context}: {message}"))
    } else if message.contains("Template not found") {
        Error::TemplateNotFound(context.to_string())
    } else {
        Error::MissingTemplateKey(format!("{context}: {message}"))
    }
}

fn finish(rendered: String) -> Result<Vec<u8>> {
    sweep_unexpanded_tokens(&rendered)?;
    Ok(rendered.into_bytes())
}

fn sweep_unexpanded_tokens(rendered: &str) -> Result<()> {
    let masked = mask_passthrough(rendered);
    if let Some(m) = DOLLAR_BRACE.find(&masked) {
        return Err(Error::UnexpandedToken(m.as_str().to_string()));
    }
    if let Some(m) = HANDLEBARS_TOKEN.find(&masked) {
        return Err(Error::UnexpandedToken(m.as_str().to_string()));
    }
    if let Some(m) = BARE_UPPER.find(&masked) {
        return Err(Error::UnexpandedToken(m.as_str().to_string()));
    }
    Ok(())
}

fn mask_passthrough(input: &str) -> String {
    let mut masked = input.to_string();
    for (i, token) in PASSTHROUGH_TOKENS.iter().enumerate() {
        let replacement: String = std::iter::repeat(MASK_MARKER).take(i + 1).collect();
        masked = masked.replace(token, &replacement);
    }
    masked
}

/// Encodes `s` as a JSON-safe inner string (no surrounding quotes), by
/// round-tripping through `serde_json`'s own string encoder rather than
/// hand-rolled substitution.
pub fn json_escape(s: &str) -> String {
    let quoted = serde_json::to_string(s).expect("string serialization cannot fail");
    quoted[1..quoted.len() - 1].to_string()
}

/// Replaces every backslash with a forward slash.
pub fn posix_path(s: &str) -> String {
    s.replace('\\', "/")
}

/// Registers the `jsonEscape` and `posixPath` helpers on a handlebars
/// engine so templates can call them directly.
pub fn register_helpers(engine: &mut Handlebars<'static>) {
    engine.register_helper(
        "jsonEscape",
        Box::new(
            |h: &handlebars::Helper,
             _: &Handlebars,
             _: &handlebars::Context,
             _: &mut handlebars::RenderContext,
             out: &mut dyn handlebars::Output|
             -> handlebars::HelperResult {
                let value = h.param(0).and_then(|p| p.value().as_str()).unwrap_or("");
                out.write(&json_escape(value))?;
                Ok(())
            },
        ),
    );
    engine.register_helper(
        "posixPath",
        Box::new(
            |h: &handlebars::Helper,
             _: &Handlebars,
             _: &handlebars::Context,
             _: &mut handlebars::RenderContext,
             out: &mut dyn handlebars::Output|
             -> handlebars::HelperResult {
                let value = h.param(0).and_then(|p| p.value().as_str()).unwrap_or("");
                out.write(&posix_path(value))?;
                Ok(())
            },
        ),
    );
}

#[derive(Debug, Serialize, Default)]
pub struct EmptyData {}

pub type ContextMap = HashMap<String, serde_json::Value>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_key_is_an_error() {
        let renderer = Renderer::new();
        let err = renderer
            .render_str("Hello {{name}}", &json!({}))
            .unwrap_err();
        assert!(matches!(err, Error::MissingTemplateKey(_)));
    }

    #[test]
    fn present_key_renders_cleanly() {
        let renderer = Renderer::new();
        let bytes = renderer
            .render_str("Hello {{name}}", &json!({"name": "moai"}))
            .unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Hello moai");
    }

    #[test]
    fn dollar_brace_leftover_is_rejected() {
        let renderer = Renderer::new();
        let err = renderer
            .render_str("path is ${HOME}/x", &json!({}))
            .unwrap_err();
        assert!(matches!(err, Error::UnexpandedToken(_)));
    }

    #[test]
    fn bare_upper_leftover_is_rejected() {
        let renderer = Renderer::new();
        let err = renderer
            .render_str("export $FOO_BAR", &json!({}))
            .unwrap_err();
        assert!(matches!(err, Error::UnexpandedToken(_)));
    }

    #[test]
    fn passthrough_tokens_survive_unflagged() {
        let renderer = Renderer::new();
        let bytes = renderer
            .render_str("$CLAUDE_PROJECT_DIR and $ARGUMENTS", &json!({}))
            .unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "$CLAUDE_PROJECT_DIR and $ARGUMENTS"
        );
    }

    #[test]
    fn json_escape_handles_quotes_and_backslashes() {
        assert_eq!(json_escape("a\"b\\c"), "a\\\"b\\\\c");
    }

    #[test]
    fn posix_path_normalizes_separators() {
        assert_eq!(posix_path("a\\b\\c"), "a/b/c");
    }
}
