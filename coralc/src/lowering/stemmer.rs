//!
//! Snowball Stemming
//!
//! `libstemmer_stem` returns a fresh `zend_string *`, so the result goes
//! through `ZVAL_STR` into a string temporary.
//!

use super::context::{Bridge, Lowering, LoweringContext, TempKind};
use super::operands::Coercion;
use super::signature::{Param, Signature};
use super::template::{NativeCall, Sink};
use super::{CompiledExpression, LoweringError, Optimizer};
use crate::ast::CallExpression;

const WORD_LANG: Signature = Signature::new(&[Param::required("word"), Param::required("lang")]);

pub struct Stem;

impl Optimizer for Stem {
    fn name(&self) -> &'static str {
        "stem"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["libstemmer_stem"]
    }

    fn signature(&self) -> &'static Signature {
        &WORD_LANG
    }

    fn bridge(&self) -> Bridge {
        Bridge::Snowball
    }

    fn temp_kind(&self) -> TempKind {
        TempKind::String
    }

    fn optimize(
        &self,
        call: &CallExpression,
        cx: &mut LoweringContext<'_>,
    ) -> Result<CompiledExpression, LoweringError> {
        WORD_LANG.check(self.name(), call)?;
        let params = cx.resolve(&call.args)?;

        let native = NativeCall::new("libstemmer_stem")
            .arg(Coercion::ZendString, params.required(0))
            .arg(Coercion::CString, params.required(1));

        cx.complete(
            call,
            Lowering {
                builtin: self.name(),
                bridge: Bridge::Snowball,
                temp: TempKind::String,
                sink: Sink::WrapString,
                native,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lowering::testing::lower_with;
    use crate::lowering::ResultKind;

    #[test]
    fn test_stem() {
        let outcome = lower_with(&Stem, "stem(word, lang)");
        assert_eq!(
            outcome.statement(),
            "ZVAL_STR(&_0, libstemmer_stem(Z_STR_P(word), Z_STRVAL_P(lang)));"
        );
        assert_eq!(outcome.temps[0].kind, TempKind::String);
        assert_eq!(outcome.result.as_ref().ok().map(|c| c.kind), Some(ResultKind::Variable));
        assert_eq!(outcome.headers.headers(), vec!["snowball_bridge"]);
    }

    #[test]
    fn test_stem_requires_language() {
        let outcome = lower_with(&Stem, "stem(word)");
        let err = outcome.result.as_ref().unwrap_err();
        assert_eq!(
            err.to_string(),
            "'stem' requires exactly 2 parameters (word, lang), found 1"
        );
        outcome.assert_untouched();
    }
}
