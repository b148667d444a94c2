//! Identifiers for every entity in the ledger.
//!
//! Entities refer to each other by identifier, never by embedded
//! sub-object: a `Book`'s designated accounts and a `Split`'s account and
//! transaction are all resolved against the owning [`crate::Ledger`] on
//! use, which keeps the object graph acyclic and lets every entity stay a
//! plain record with explicit fields.

use std::fmt;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

id_type!(ProfileId);
id_type!(BookId);
id_type!(GroupId);
id_type!(AccountId);
id_type!(PocketId);
id_type!(TransactionId);
id_type!(SplitId);

/// A currency's ISO-style three-character code. Unlike the numeric ids
/// above this is the natural key for a [`crate::currency::Currency`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CurrencyCode(pub String);

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        CurrencyCode(s.to_uppercase())
    }
}
