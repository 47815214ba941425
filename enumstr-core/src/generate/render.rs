//! Template expansion behind the [`Renderer`] trait.

use handlebars::{no_escape, Handlebars};
use serde::Serialize;

use crate::error::{EnumstrError, EnumstrResult};

/// Default template for the generated file.
///
/// Layout is normalized afterwards by `format_source`, so the template only
/// has to produce the right tokens in the right order.
pub const STRINGER_TEMPLATE: &str = r#"// Code generated by {{tool}}; DO NOT EDIT.

package {{package}}
{{#if types}}

import "fmt"
{{/if}}
{{#each types}}

func ({{receiver}} {{name}}) String() string {
{{#each constants}}
	if {{../receiver}} == {{this}} {
		return "{{this}}"
	}
{{/each}}
	type {{plain}} {{name}}
	return fmt.Sprintf("{{name}}(%v)", {{plain}}({{receiver}}))
}
{{/each}}
"#;

const TEMPLATE_NAME: &str = "stringer";

const PLAIN_TYPE: &str = "plain";

/// Data handed to the template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    pub tool: String,
    pub package: String,
    pub types: Vec<TypeModel>,
}

/// One String method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeModel {
    pub name: String,
    pub receiver: String,
    /// Method-less local copy of the type, used to format unknown values
    /// without calling `String` again.
    pub plain: String,
    pub constants: Vec<String>,
}

/// Turns a model into (not yet canonical) Go text.
pub trait Renderer {
    fn render(&self, model: &RenderModel) -> EnumstrResult<String>;
}

/// Handlebars-backed renderer in strict mode: a missing field is an error.
pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    /// Renderer using [`STRINGER_TEMPLATE`].
    pub fn new() -> EnumstrResult<Self> {
        Self::with_template(STRINGER_TEMPLATE)
    }

    pub fn with_template(template: &str) -> EnumstrResult<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(no_escape);
        registry
            .register_template_string(TEMPLATE_NAME, template)
            .map_err(|e| EnumstrError::render(e.to_string()))?;
        Ok(Self { registry })
    }
}

impl Renderer for HandlebarsRenderer {
    fn render(&self, model: &RenderModel) -> EnumstrResult<String> {
        self.registry
            .render(TEMPLATE_NAME, model)
            .map_err(|e| EnumstrError::render(e.to_string()))
    }
}

/// Receiver name for a String method on `type_name`.
///
/// The lower-cased first letter of the type, unless that would be blank or
/// clash with the type or one of its constants; then a numeric suffix is
/// appended until the name is free.
pub fn receiver_name(type_name: &str, constants: &[String]) -> String {
    let base: String = type_name
        .chars()
        .next()
        .map(|c| c.to_lowercase().collect())
        .unwrap_or_else(|| "v".to_string());

    let taken = |candidate: &str| {
        candidate == "_" || candidate == type_name || constants.iter().any(|c| c == candidate)
    };

    let mut candidate = base.clone();
    let mut suffix = 0;
    while taken(&candidate) {
        suffix += 1;
        candidate = format!("{}{}", base, suffix);
    }
    candidate
}

/// Name of the local type declared for the fallback conversion.
pub fn plain_type_name(type_name: &str) -> String {
    let mut candidate = PLAIN_TYPE.to_string();
    let mut suffix = 0;
    while candidate == type_name {
        suffix += 1;
        candidate = format!("{}{}", PLAIN_TYPE, suffix);
    }
    candidate
}
