//! Code generation: render a [`Selection`] into a Go file with one
//! `String() string` method per selected type.
//!
//! ```text
//! Selection ──▶ RenderModel ──▶ Renderer ──▶ format_source ──▶ Go text
//! ```

pub mod format;
pub mod render;

pub use format::format_source;
pub use render::{
    plain_type_name, receiver_name, HandlebarsRenderer, RenderModel, Renderer, TypeModel,
    STRINGER_TEMPLATE,
};

use crate::error::EnumstrResult;
use crate::select::Selection;

/// Name written into the generated file header.
pub const TOOL_NAME: &str = "enumstr";

/// Builds the template model. Types keep the selection's (lexicographic)
/// order, constants their declaration order.
pub fn build_model(package: &str, selection: &Selection) -> RenderModel {
    let types = selection
        .types
        .iter()
        .map(|(name, constants)| {
            let constants: Vec<String> = constants.iter().map(|c| c.name.clone()).collect();
            TypeModel {
                name: name.clone(),
                receiver: receiver_name(name, &constants),
                plain: plain_type_name(name),
                constants,
            }
        })
        .collect();
    RenderModel {
        tool: TOOL_NAME.to_string(),
        package: package.to_string(),
        types,
    }
}

/// Renders and canonicalizes the generated file.
pub fn generate_source(
    package: &str,
    selection: &Selection,
    renderer: &dyn Renderer,
) -> EnumstrResult<String> {
    let model = build_model(package, selection);
    let rendered = renderer.render(&model)?;
    format_source(&rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnumstrError;
    use crate::extract::TypeRegistry;
    use crate::select::{select_types, InclusionFilter};
    use pretty_assertions::assert_eq;

    fn selection(entries: &[(&str, &str)]) -> Selection {
        let mut reg = TypeRegistry::new();
        for (ty, name) in entries {
            reg.insert(ty, name, "a.go", 1);
        }
        select_types(&reg, InclusionFilter::Exported)
    }

    #[test]
    fn test_generate_single_type() {
        let sel = selection(&[("Int", "One"), ("Int", "Two")]);
        let renderer = HandlebarsRenderer::new().unwrap();
        let out = generate_source("example", &sel, &renderer).unwrap();

        let expected = r#"// Code generated by enumstr; DO NOT EDIT.

package example

import "fmt"

func (i Int) String() string {
	if i == One {
		return "One"
	}
	if i == Two {
		return "Two"
	}
	type plain Int
	return fmt.Sprintf("Int(%v)", plain(i))
}
"#;
        assert_eq!(out, expected);
    }

    #[test]
    fn test_types_sorted_by_name() {
        let sel = selection(&[("Zoo", "Lion"), ("Color", "Red"), ("Mode", "Fast")]);
        let out = generate_source("p", &sel, &HandlebarsRenderer::new().unwrap()).unwrap();
        let color = out.find("func (c Color)").unwrap();
        let mode = out.find("func (m Mode)").unwrap();
        let zoo = out.find("func (z Zoo)").unwrap();
        assert!(color < mode && mode < zoo);
    }

    #[test]
    fn test_empty_selection() {
        let out = generate_source("p", &Selection::default(), &HandlebarsRenderer::new().unwrap())
            .unwrap();
        assert_eq!(out, "// Code generated by enumstr; DO NOT EDIT.\n\npackage p\n");
    }

    #[test]
    fn test_build_model_receiver_collision() {
        let sel = selection(&[("Mode", "m"), ("Mode", "Fast")]);
        let model = build_model("p", &sel);
        assert_eq!(model.tool, TOOL_NAME);
        assert_eq!(model.types[0].receiver, "m1");
        assert_eq!(model.types[0].constants, vec!["m", "Fast"]);
    }

    #[test]
    fn test_fallback_formats_method_less_copy() {
        let mut reg = TypeRegistry::new();
        reg.insert("plain", "Flat", "a.go", 1);
        let sel = select_types(&reg, InclusionFilter::from_names(["plain"]));
        let out = generate_source("p", &sel, &HandlebarsRenderer::new().unwrap()).unwrap();
        assert!(out.contains("\ttype plain1 plain\n"));
        assert!(out.contains("return fmt.Sprintf(\"plain(%v)\", plain1(p))"));
    }

    struct BrokenRenderer;

    impl Renderer for BrokenRenderer {
        fn render(&self, _model: &RenderModel) -> EnumstrResult<String> {
            Ok("package p\n\nfunc (i Int String() string {\n}\n".to_string())
        }
    }

    #[test]
    fn test_invalid_render_is_format_error() {
        let sel = selection(&[("Int", "One")]);
        let err = generate_source("p", &sel, &BrokenRenderer).unwrap_err();
        assert!(matches!(err, EnumstrError::Format { line: 3, .. }));
    }
}
