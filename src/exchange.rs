//! The exchange-rate provider capability.
//!
//! The kernel calls this only for foreign-currency credit splits that
//! arrive without a local amount already attached; everything else is
//! pure CPU plus persistence. Implementations own caching and rate
//! sourcing entirely (a live HTTP scraper, a database snapshot, a fixed
//! table); the kernel only needs a deterministic answer for a given pair
//! within the lifetime of one `Transaction::create` call.

use crate::error::KorovaError;
use crate::ids::CurrencyCode;
use rust_decimal::Decimal;

pub trait ExchangeRateProvider: Send + Sync {
    fn get_exchange_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Decimal, KorovaError>;
}

/// A fixed-table provider for host test suites. Not part of the kernel's
/// production surface — gate it behind `test-util` in downstream crates
/// the same way this crate gates it for its own tests.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default, Clone)]
pub struct MockExchangeRateProvider {
    rates: std::collections::HashMap<(CurrencyCode, CurrencyCode), Decimal>,
}

#[cfg(any(test, feature = "test-util"))]
impl MockExchangeRateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, from: CurrencyCode, to: CurrencyCode, rate: Decimal) -> Self {
        self.rates.insert((from, to), rate);
        self
    }
}

#[cfg(any(test, feature = "test-util"))]
impl ExchangeRateProvider for MockExchangeRateProvider {
    fn get_exchange_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Decimal, KorovaError> {
        self.rates
            .get(&(from.clone(), to.clone()))
            .copied()
            .ok_or_else(|| KorovaError::ExchangeRateUnavailable {
                from: from.clone(),
                to: to.clone(),
            })
    }
}
