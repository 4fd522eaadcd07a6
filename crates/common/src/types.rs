//! Public identifiers for Trades Management records.
//!
//! Every record is addressed externally by a random v4 UUID (`uid`). The
//! newtypes keep a broker uid from being passed where an account uid is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uid_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse from text, `None` when it is not a UUID.
            #[must_use]
            pub fn parse(raw: &str) -> Option<Self> {
                Uuid::parse_str(raw).ok().map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

uid_type!(
    /// Public identifier of a user
    UserUid
);
uid_type!(
    /// Public identifier of a broker
    BrokerUid
);
uid_type!(
    /// Public identifier of an account
    AccountUid
);
uid_type!(
    /// Public identifier of a strategy
    StrategyUid
);
uid_type!(
    /// Public identifier of a trade
    TradeUid
);
