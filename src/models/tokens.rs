//! Opaque identifiers and capability tokens.
//!
//! Document ids, read codes and update codes are distinct types so they can
//! never be passed in each other's place. Secrets redact themselves in
//! `Debug` output.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! public_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }
    };
}

macro_rules! secret_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Expose the secret, e.g. to put it on the wire.
            pub fn expose(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(<redacted>)", stringify!($name))
            }
        }
    };
}

public_token!(
    /// Backend identity of a document. Not a capability.
    DocumentId
);

public_token!(
    /// Capability granting read access to one document.
    ///
    /// It appears in shareable URLs, so it may be displayed.
    ReadCode
);

secret_token!(
    /// Capability granting mutation and deletion rights.
    UpdateCode
);

secret_token!(
    /// Client-held key revealing an encrypted document. Not recoverable if lost.
    DecryptionKey
);

secret_token!(Password);

impl Password {
    /// Length after trimming surrounding whitespace.
    pub fn trimmed_len(&self) -> usize {
        self.0.trim().chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_are_redacted() {
        let key = DecryptionKey::new("super-secret-key");
        let debug = format!("{:?}", key);
        assert!(!debug.contains("super-secret-key"));
        assert_eq!(debug, "DecryptionKey(<redacted>)");

        let code = UpdateCode::new("upd-123");
        assert!(!format!("{:?}", code).contains("upd-123"));
    }

    #[test]
    fn test_read_code_is_displayable() {
        let code = ReadCode::new("abc123");
        assert_eq!(code.to_string(), "abc123");
        assert_eq!(format!("{:?}", code), "ReadCode(\"abc123\")");
    }

    #[test]
    fn test_transparent_serialization() {
        let code = ReadCode::new("abc123");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"abc123\"");
        let id: DocumentId = serde_json::from_str("\"66f0\"").unwrap();
        assert_eq!(id.as_str(), "66f0");
    }

    #[test]
    fn test_password_trimmed_len() {
        assert_eq!(Password::new("  short  ").trimmed_len(), 5);
        assert!(Password::new("   ").is_empty());
    }
}
