//! Small dense integer namespaces used on the host boundary.
//!
//! Each namespace is its own newtype: a [`DefinitionId`] and an [`EventId`]
//! with the same numeric value are unrelated, and the compiler keeps them
//! apart.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(
    /// Identifier of a simulation-object data definition (record).
    DefinitionId,
    "definition"
);
id_newtype!(
    /// Identifier of a client event mapped to a host trigger.
    EventId,
    "event"
);
id_newtype!(
    /// Identifier of a notification group events are subscribed through.
    GroupId,
    "group"
);
id_newtype!(
    /// Identifier of an outstanding data request.
    RequestId,
    "request"
);
id_newtype!(
    /// Identifier of a named client-data area.
    ClientDataId,
    "client-data"
);
id_newtype!(
    /// Identifier of a client-data definition.  Scoped separately from
    /// [`DefinitionId`].
    ClientDataDefinitionId,
    "client-data-definition"
);
