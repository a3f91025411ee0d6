//!
//! C Rendering
//!
//! Turns a lowered unit into a C translation unit: one `#include` per
//! bridge in first-use order, then one `void` function per compiled source
//! function with its temporaries declared up front.
//!

use std::fmt::Write;

use super::{FunctionOutput, UnitOutput};
use crate::config::CodegenConfig;

pub fn render_unit(unit: &UnitOutput, config: &CodegenConfig) -> String {
    let mut out = String::new();

    for bridge in &unit.headers {
        let _ = writeln!(out, "#include \"{}.h\"", bridge.header());
    }

    for func in &unit.functions {
        if !out.is_empty() {
            out.push('\n');
        }
        render_function(&mut out, func, &config.indent);
    }

    out
}

fn render_function(out: &mut String, func: &FunctionOutput, indent: &str) {
    let params = if func.params.is_empty() {
        "void".to_string()
    } else {
        func.params
            .iter()
            .map(|p| format!("zval *{}", p))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let _ = writeln!(out, "void {}({})", func.symbol, params);
    out.push_str("{\n");

    for temp in &func.temps {
        let _ = writeln!(out, "{}{} {};", indent, temp.kind.c_type(), temp.name);
    }
    if !func.temps.is_empty() && !func.statements.is_empty() {
        out.push('\n');
    }

    for statement in &func.statements {
        let _ = writeln!(out, "{}{}", indent, statement);
    }

    out.push_str("}\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::compile_source;
    use crate::lowering::BuiltinRegistry;
    use crate::source::SourceFile;

    fn render(source: &str, config: &CodegenConfig) -> String {
        let file = SourceFile::new("test.coral", source);
        let unit = compile_source(&file, &BuiltinRegistry::with_defaults(), config);
        assert!(!unit.has_errors(), "{:?}", unit.errors);
        render_unit(&unit, config)
    }

    #[test]
    fn test_render_single_function() {
        let c = render(
            "fn tokenize(text, locale) { word_break(text, locale); }",
            &CodegenConfig::default(),
        );
        insta::assert_snapshot!(c, @r###"
        #include "icu_bridge.h"

        void coral_tokenize(zval *text, zval *locale)
        {
        	zval _0;

        	icu_word_break(Z_STR_P(text), Z_STRVAL_P(locale), &_0);
        }
        "###);
    }

    #[test]
    fn test_render_double_temp_and_custom_layout() {
        let config = CodegenConfig {
            temp_prefix: "t".to_string(),
            function_prefix: "".to_string(),
            indent: "  ".to_string(),
        };
        let c = render("fn dist(a, b) { let d = vector_distance(a, b); }", &config);
        insta::assert_snapshot!(c, @r###"
        #include "lapack_bridge.h"

        void dist(zval *a, zval *b)
        {
          double t0;

          linear_algebra_vector_distance_zval(a, b, zephir_get_intval(1), zephir_get_doubleval(3.0), &t0);
        }
        "###);
    }

    #[test]
    fn test_render_empty_function() {
        let c = render("fn noop() { }", &CodegenConfig::default());
        assert_eq!(c, "void coral_noop(void)\n{\n}\n");
    }
}
