//! Macro for declaring forward-compatible string enums
//!
//! Server-side registries (load balancer statuses, job statuses, algorithms)
//! grow over time. Enums declared with this macro carry an `Unknown(String)`
//! variant so a value this client has never seen still deserializes and
//! round-trips unchanged, without any runtime registration.
//!
//! # Example
//!
//! ```rust
//! use nimbus_domain::extensible_enum;
//!
//! extensible_enum! {
//!     /// Job lifecycle
//!     pub enum JobStatus {
//!         Running => "RUNNING",
//!         Completed => "COMPLETED",
//!     }
//! }
//!
//! assert_eq!(JobStatus::from("completed"), JobStatus::Completed);
//! assert_eq!(JobStatus::from("PAUSED"), JobStatus::Unknown("PAUSED".into()));
//! assert_eq!(JobStatus::Running.to_string(), "RUNNING");
//! ```

/// Declares an enum with string-mapped variants plus an `Unknown(String)`
/// fallback.
///
/// This macro generates:
/// - the enum itself (`Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`)
/// - `as_str()` and `is_known()`
/// - `Display` using the canonical wire string
/// - infallible `FromStr` / `From<&str>` / `From<String>` with
///   case-insensitive matching
/// - `Serialize` / `Deserialize` as a plain string
#[macro_export]
macro_rules! extensible_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $str:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value not known to this version of the client.
            Unknown(String),
        }

        impl $name {
            /// Wire representation of this value.
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $str, )+
                    Self::Unknown(value) => value.as_str(),
                }
            }

            /// False for the `Unknown` fallback.
            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Unknown(_))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Ok(Self::Unknown(s.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match <Self as std::str::FromStr>::from_str(value) {
                    Ok(parsed) => parsed,
                    Err(never) => match never {},
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::from(value.as_str())
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                let value =
                    <String as $crate::__private::serde::Deserialize>::deserialize(deserializer)?;
                Ok(Self::from(value))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    extensible_enum! {
        /// Test enum for macro validation
        enum TestStatus {
            Pending => "PENDING",
            InProgress => "IN_PROGRESS",
            Done => "DONE",
        }
    }

    #[test]
    fn test_display_uses_wire_string() {
        assert_eq!(TestStatus::Pending.to_string(), "PENDING");
        assert_eq!(TestStatus::InProgress.to_string(), "IN_PROGRESS");
        assert_eq!(TestStatus::Done.to_string(), "DONE");
    }

    #[test]
    fn test_fromstr_mixed_case() {
        assert_eq!(TestStatus::from_str("pending").unwrap(), TestStatus::Pending);
        assert_eq!(TestStatus::from_str("In_Progress").unwrap(), TestStatus::InProgress);
        assert_eq!(TestStatus::from_str("DONE").unwrap(), TestStatus::Done);
    }

    #[test]
    fn test_unknown_value_is_preserved() {
        let status = TestStatus::from("ARCHIVED");
        assert_eq!(status, TestStatus::Unknown("ARCHIVED".to_string()));
        assert!(!status.is_known());
        assert_eq!(status.to_string(), "ARCHIVED");
    }

    #[test]
    fn test_serde_as_plain_string() {
        let json = serde_json::to_string(&TestStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");

        let parsed: TestStatus = serde_json::from_str("\"SHELVED\"").unwrap();
        assert_eq!(parsed, TestStatus::Unknown("SHELVED".to_string()));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"SHELVED\"");
    }
}
