///
/// Builtin Registry
///
/// Maps builtin names to their optimizers. Every optimizer is stored once;
/// its canonical name and each alias point at the same entry, so an alias
/// always lowers exactly like the canonical name.
///
/// Names are unique across canonical names and aliases. Registering a name
/// that is already taken fails with DuplicateBuiltin rather than replacing
/// the earlier entry.
///
/// Disabling a builtin removes every name that points at it. Calls to it
/// then fail with UnknownBuiltin like any other unregistered name.
///

use indexmap::IndexMap;
use lasso::Rodeo;

use super::error::{LoweringError, RegistryError};
use super::{default_optimizers, CompiledExpression, LoweringContext, Optimizer};
use crate::ast::CallExpression;

pub struct BuiltinRegistry {
    optimizers: Vec<Box<dyn Optimizer>>,
    names: IndexMap<String, usize>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self {
            optimizers: Vec::new(),
            names: IndexMap::new(),
        }
    }

    /// All shipped builtins under their canonical names and aliases.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for optimizer in default_optimizers() {
            if let Err(err) = registry.register(optimizer) {
                // shipped names are distinct; a clash here is a bug
                unreachable!("default builtins clash: {}", err);
            }
        }
        registry
    }

    pub fn register(&mut self, optimizer: Box<dyn Optimizer>) -> Result<(), RegistryError> {
        let mut claimed = vec![optimizer.name()];
        claimed.extend_from_slice(optimizer.aliases());

        for (i, name) in claimed.iter().enumerate() {
            if self.names.contains_key(*name) || claimed[..i].contains(name) {
                return Err(RegistryError::DuplicateBuiltin {
                    name: name.to_string(),
                });
            }
        }

        let index = self.optimizers.len();
        for name in claimed {
            self.names.insert(name.to_string(), index);
        }
        tracing::trace!(builtin = optimizer.name(), "registered");
        self.optimizers.push(optimizer);
        Ok(())
    }

    /// Adds another name for an already registered builtin.
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<(), RegistryError> {
        if self.names.contains_key(alias) {
            return Err(RegistryError::DuplicateBuiltin {
                name: alias.to_string(),
            });
        }
        let index = *self
            .names
            .get(target)
            .ok_or_else(|| RegistryError::UnknownBuiltin {
                name: target.to_string(),
            })?;

        self.names.insert(alias.to_string(), index);
        Ok(())
    }

    /// Removes a builtin and every name that refers to it.
    pub fn disable(&mut self, name: &str) -> Result<(), RegistryError> {
        let index = *self
            .names
            .get(name)
            .ok_or_else(|| RegistryError::UnknownBuiltin {
                name: name.to_string(),
            })?;

        self.names.retain(|_, i| *i != index);
        tracing::warn!(
            builtin = self.optimizers[index].name(),
            "builtin disabled by configuration"
        );
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn Optimizer> {
        self.names
            .get(name)
            .map(|&index| self.optimizers[index].as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Enabled builtins in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Optimizer> + '_ {
        self.optimizers
            .iter()
            .enumerate()
            .filter(|(index, _)| self.names.values().any(|i| i == index))
            .map(|(_, optimizer)| optimizer.as_ref())
    }

    /// Every name a builtin answers to, canonical name first.
    pub fn names_of(&self, optimizer: &dyn Optimizer) -> Vec<&str> {
        let Some(&index) = self.names.get(optimizer.name()) else {
            return Vec::new();
        };
        self.names
            .iter()
            .filter(|(_, i)| **i == index)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Dispatches a call to the optimizer registered under its callee name.
    pub fn lower(
        &self,
        call: &CallExpression,
        interner: &Rodeo,
        cx: &mut LoweringContext<'_>,
    ) -> Result<CompiledExpression, LoweringError> {
        let name = interner.resolve(&call.callee.symbol);
        let optimizer = self
            .lookup(name)
            .ok_or_else(|| LoweringError::UnknownBuiltin {
                name: name.to_string(),
                span: call.span,
            })?;

        let compiled = optimizer.optimize(call, cx)?;
        tracing::debug!(
            builtin = compiled.builtin,
            temp = %compiled.name,
            kind = %compiled.kind,
            bridge = %optimizer.bridge(),
            "lowered"
        );
        Ok(compiled)
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lowering::icu::Lowercase;
    use crate::lowering::linalg::Dot;

    #[test]
    fn test_defaults_register_canonical_and_aliases() {
        let registry = BuiltinRegistry::with_defaults();
        assert_eq!(registry.iter().count(), 19);

        for (alias, canonical) in [
            ("icu_lowercase", "lowercase"),
            ("icu_word_break", "word_break"),
            ("libstemmer_stem", "stem"),
            ("ccontrol_dot", "dot"),
            ("linear_algebra_matmul", "matmul"),
            ("linear_algebra_matrix_scale", "matrix_scale"),
        ] {
            let optimizer = registry.lookup(alias).expect(alias);
            assert_eq!(optimizer.name(), canonical);
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = BuiltinRegistry::new();
        registry.register(Box::new(Dot)).expect("first registration");

        let err = registry.register(Box::new(Dot)).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateBuiltin { name: "dot".to_string() });

        let err = registry.alias("ccontrol_dot", "dot").unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateBuiltin { name: "ccontrol_dot".to_string() }
        );
    }

    #[test]
    fn test_alias_and_disable() {
        let mut registry = BuiltinRegistry::new();
        registry.register(Box::new(Lowercase)).expect("registers");
        registry.alias("lower", "icu_lowercase").expect("aliases");
        assert_eq!(
            registry.names_of(&Lowercase),
            vec!["lowercase", "icu_lowercase", "lower"]
        );

        assert_eq!(
            registry.alias("upper", "uppercase"),
            Err(RegistryError::UnknownBuiltin { name: "uppercase".to_string() })
        );

        registry.disable("lower").expect("disables");
        assert!(!registry.contains("lowercase"));
        assert!(!registry.contains("icu_lowercase"));
        assert_eq!(registry.iter().count(), 0);
    }
}
