//! Macro for strongly-typed, non-blank string names.

/// Define a string newtype that can never hold a blank value.
///
/// Generates the struct plus `new()` (panics on blank input), `try_new()`,
/// `as_str()`, `into_inner()`, a validating `Deserialize`, and the usual
/// string-like conversions (`Display`, `Deref<Target = str>`, `AsRef<str>`,
/// `Borrow<str>`, `TryFrom`, `PartialEq<str>`).
macro_rules! define_name {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl<'de> serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $Name::try_new(s).ok_or_else(|| {
                    serde::de::Error::custom(concat!(stringify!($Name), " must not be blank"))
                })
            }
        }

        impl $Name {
            /// Create a new name, panicking if it is blank.
            ///
            /// Prefer [`try_new`](Self::try_new) for untrusted input.
            pub fn new(name: impl Into<String>) -> Self {
                let s = name.into();
                assert!(!s.trim().is_empty(), concat!(stringify!($Name), " must not be blank"));
                Self(s)
            }

            /// Create a new name, returning `None` if it is blank.
            pub fn try_new(name: impl Into<String>) -> Option<Self> {
                let s = name.into();
                if s.trim().is_empty() { None } else { Some(Self(s)) }
            }

            /// Borrow the name as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper, returning the inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str { &self.0 }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str { &self.0 }
        }

        impl std::borrow::Borrow<str> for $Name {
            fn borrow(&self) -> &str { &self.0 }
        }

        impl TryFrom<String> for $Name {
            type Error = &'static str;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                $Name::try_new(s).ok_or(concat!(stringify!($Name), " must not be blank"))
            }
        }

        impl TryFrom<&str> for $Name {
            type Error = &'static str;
            fn try_from(s: &str) -> Result<Self, Self::Error> {
                $Name::try_new(s).ok_or(concat!(stringify!($Name), " must not be blank"))
            }
        }

        impl PartialEq<str> for $Name {
            fn eq(&self, other: &str) -> bool { self.0 == other }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool { self.0 == *other }
        }
    };
}

pub(crate) use define_name;
