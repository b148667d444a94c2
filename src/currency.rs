//! The currency registry: `code -> (name, fraction)`.
//!
//! Seeding is a one-time initialization step on [`crate::Ledger`]
//! construction rather than a process-global mutable table, per the
//! design note against global mutable state.

use crate::error::KorovaError;
use crate::ids::CurrencyCode;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    pub code: CurrencyCode,
    pub name: String,
    /// Integer subdivisions per unit (e.g. 100 for cents, 1 for a currency
    /// with no subdivision).
    pub fraction: u32,
}

#[derive(Debug, Default)]
pub struct CurrencyRegistry {
    by_code: HashMap<CurrencyCode, Currency>,
}

impl CurrencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four currencies the kernel ships seeded, matching the host
    /// deployment this was modeled on.
    pub fn seeded() -> Self {
        let mut registry = Self::new();
        for (code, name, fraction) in [
            ("BRL", "Brazilian Real", 100),
            ("USD", "American Dollar", 100),
            ("EUR", "Euro", 100),
            ("CLP", "Chilean Peso", 1),
        ] {
            registry
                .register(code.into(), name.to_string(), fraction)
                .expect("seeded currency codes are unique");
        }
        registry
    }

    pub fn register(
        &mut self,
        code: CurrencyCode,
        name: String,
        fraction: u32,
    ) -> Result<(), KorovaError> {
        if self.by_code.contains_key(&code) {
            return Err(KorovaError::DuplicateCode {
                code: code.0,
                scope: "currency",
            });
        }
        self.by_code.insert(
            code.clone(),
            Currency {
                code,
                name,
                fraction,
            },
        );
        Ok(())
    }

    pub fn get(&self, code: &CurrencyCode) -> Result<&Currency, KorovaError> {
        self.by_code
            .get(code)
            .ok_or_else(|| KorovaError::UnknownCurrency(code.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_registry_has_the_four_defaults() {
        let registry = CurrencyRegistry::seeded();
        assert_eq!(registry.get(&"BRL".into()).unwrap().fraction, 100);
        assert_eq!(registry.get(&"CLP".into()).unwrap().fraction, 1);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = CurrencyRegistry::seeded();
        let err = registry
            .register("BRL".into(), "Duplicate Real".to_string(), 100)
            .unwrap_err();
        assert!(matches!(err, KorovaError::DuplicateCode { .. }));
    }
}
