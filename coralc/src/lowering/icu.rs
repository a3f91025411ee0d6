//!
//! ICU Text Builtins
//!
//! Locale-aware casing, diacritic folding and segmentation, all backed by
//! `icu_bridge`. The bridge takes the text as a `zend_string *`, the locale
//! as a `char *`, and writes its result through `zval *return_value`.
//!

use super::context::{Bridge, Lowering, LoweringContext};
use super::operands::Coercion;
use super::signature::{Param, Signature};
use super::template::{NativeCall, Sink};
use super::{CompiledExpression, LoweringError, Optimizer};
use crate::ast::CallExpression;

const TEXT_LOCALE: Signature = Signature::new(&[Param::required("text"), Param::required("locale")]);
const TEXT: Signature = Signature::new(&[Param::required("text")]);

/// `icu_<fn>(Z_STR_P(text), Z_STRVAL_P(locale), &tmp);`
fn lower_text_locale(
    optimizer: &dyn Optimizer,
    function: &'static str,
    call: &CallExpression,
    cx: &mut LoweringContext<'_>,
) -> Result<CompiledExpression, LoweringError> {
    optimizer.signature().check(optimizer.name(), call)?;
    let params = cx.resolve(&call.args)?;

    let native = NativeCall::new(function)
        .arg(Coercion::ZendString, params.required(0))
        .arg(Coercion::CString, params.required(1));

    cx.complete(
        call,
        Lowering {
            builtin: optimizer.name(),
            bridge: optimizer.bridge(),
            temp: optimizer.temp_kind(),
            sink: Sink::OutParam,
            native,
        },
    )
}

pub struct Lowercase;

impl Optimizer for Lowercase {
    fn name(&self) -> &'static str {
        "lowercase"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["icu_lowercase"]
    }

    fn signature(&self) -> &'static Signature {
        &TEXT_LOCALE
    }

    fn bridge(&self) -> Bridge {
        Bridge::Icu
    }

    fn optimize(
        &self,
        call: &CallExpression,
        cx: &mut LoweringContext<'_>,
    ) -> Result<CompiledExpression, LoweringError> {
        lower_text_locale(self, "icu_lowercase", call, cx)
    }
}

pub struct RemoveDiacritics;

impl Optimizer for RemoveDiacritics {
    fn name(&self) -> &'static str {
        "remove_diacritics"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["icu_remove_diacritics"]
    }

    fn signature(&self) -> &'static Signature {
        &TEXT
    }

    fn bridge(&self) -> Bridge {
        Bridge::Icu
    }

    fn optimize(
        &self,
        call: &CallExpression,
        cx: &mut LoweringContext<'_>,
    ) -> Result<CompiledExpression, LoweringError> {
        TEXT.check(self.name(), call)?;
        let params = cx.resolve(&call.args)?;

        let native =
            NativeCall::new("icu_remove_diacritics").arg(Coercion::ZendString, params.required(0));

        cx.complete(
            call,
            Lowering {
                builtin: self.name(),
                bridge: self.bridge(),
                temp: self.temp_kind(),
                sink: Sink::OutParam,
                native,
            },
        )
    }
}

pub struct WordBreak;

impl Optimizer for WordBreak {
    fn name(&self) -> &'static str {
        "word_break"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["icu_word_break"]
    }

    fn signature(&self) -> &'static Signature {
        &TEXT_LOCALE
    }

    fn bridge(&self) -> Bridge {
        Bridge::Icu
    }

    fn optimize(
        &self,
        call: &CallExpression,
        cx: &mut LoweringContext<'_>,
    ) -> Result<CompiledExpression, LoweringError> {
        lower_text_locale(self, "icu_word_break", call, cx)
    }
}

pub struct SentenceBreak;

impl Optimizer for SentenceBreak {
    fn name(&self) -> &'static str {
        "sentence_break"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["icu_sentence_break"]
    }

    fn signature(&self) -> &'static Signature {
        &TEXT_LOCALE
    }

    fn bridge(&self) -> Bridge {
        Bridge::Icu
    }

    fn optimize(
        &self,
        call: &CallExpression,
        cx: &mut LoweringContext<'_>,
    ) -> Result<CompiledExpression, LoweringError> {
        lower_text_locale(self, "icu_sentence_break", call, cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lowering::testing::lower_with;
    use crate::lowering::ResultKind;

    #[test]
    fn test_lowercase() {
        let outcome = lower_with(&Lowercase, "lowercase(text, locale)");
        assert_eq!(
            outcome.statement(),
            "icu_lowercase(Z_STR_P(text), Z_STRVAL_P(locale), &_0);"
        );
        let compiled = outcome.result.as_ref().expect("lowers");
        assert_eq!(compiled.kind, ResultKind::Variable);
        assert_eq!(compiled.name, "_0");
        assert!(outcome.headers.contains(Bridge::Icu));
    }

    #[test]
    fn test_remove_diacritics() {
        let outcome = lower_with(&RemoveDiacritics, "remove_diacritics(text)");
        assert_eq!(outcome.statement(), "icu_remove_diacritics(Z_STR_P(text), &_0);");
    }

    #[test]
    fn test_remove_diacritics_arity() {
        let outcome = lower_with(&RemoveDiacritics, "remove_diacritics(text, locale)");
        let err = outcome.result.as_ref().unwrap_err();
        assert_eq!(
            err.to_string(),
            "'remove_diacritics' requires exactly 1 parameter (text), found 2"
        );
        outcome.assert_untouched();
    }

    #[test]
    fn test_word_and_sentence_break() {
        let outcome = lower_with(&WordBreak, "word_break(text, locale)");
        assert_eq!(
            outcome.statement(),
            "icu_word_break(Z_STR_P(text), Z_STRVAL_P(locale), &_0);"
        );

        let outcome = lower_with(&SentenceBreak, "sentence_break(text, locale)");
        assert_eq!(
            outcome.statement(),
            "icu_sentence_break(Z_STR_P(text), Z_STRVAL_P(locale), &_0);"
        );
    }

    #[test]
    fn test_word_break_missing_locale() {
        let outcome = lower_with(&WordBreak, "word_break(text)");
        assert!(matches!(
            outcome.result,
            Err(LoweringError::Arity { found: 1, .. })
        ));
        outcome.assert_untouched();
    }
}
