//! Error types for the registry.

use std::fmt;

/// Boxed error returned by user-supplied shutdown callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Registry errors
///
/// Every failure of a lookup, construction, hook or shutdown is reported to the
/// caller through this type. Nothing is swallowed or only logged.
///
/// # Examples
///
/// ```rust
/// use maker_registry::{ConfigurationBag, MakerError, RegistryBuilder, ResolverCore};
///
/// let registry = RegistryBuilder::new().build(ConfigurationBag::new());
/// match registry.resolve_any("does-not-exist") {
///     Err(MakerError::UnknownEntry(name)) => assert_eq!(name, "does-not-exist"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use maker_registry::MakerError;
///
/// let missing = MakerError::MissingConfiguration("sparky.name".to_string());
/// assert_eq!(missing.to_string(), "Missing configuration key: sparky.name");
/// ```
#[derive(Debug, Clone)]
pub enum MakerError {
    /// No entry is registered under this name
    UnknownEntry(String),
    /// A required configuration key is absent
    MissingConfiguration(String),
    /// A configuration value could not be interpreted
    InvalidConfiguration {
        key: String,
        value: String,
        reason: String,
    },
    /// Default or hook construction failed for any other reason
    ConstructionFailure { entry: String, message: String },
    /// The stored instance is not of the requested (or declared) type
    TypeMismatch {
        entry: String,
        expected: &'static str,
    },
    /// An entry's shutdown callback failed
    ShutdownFailure { entry: String, message: String },
    /// Every failure collected by `shutdown_all`, in registration order
    ShutdownAll(Vec<MakerError>),
    /// A configuration source could not be read or parsed
    ConfigurationSource { origin: String, message: String },
}

impl MakerError {
    /// Builds a [`MakerError::ConstructionFailure`] from any displayable error.
    pub fn construction(entry: impl Into<String>, error: impl fmt::Display) -> Self {
        MakerError::ConstructionFailure {
            entry: entry.into(),
            message: error.to_string(),
        }
    }

    /// Builds an [`MakerError::InvalidConfiguration`].
    pub fn invalid(key: impl Into<String>, value: impl Into<String>, reason: impl fmt::Display) -> Self {
        MakerError::InvalidConfiguration {
            key: key.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// True for the two configuration error kinds raised by construction logic.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MakerError::MissingConfiguration(_) | MakerError::InvalidConfiguration { .. }
        )
    }
}

impl fmt::Display for MakerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MakerError::UnknownEntry(name) => write!(f, "Unknown entry: {}", name),
            MakerError::MissingConfiguration(key) => {
                write!(f, "Missing configuration key: {}", key)
            }
            MakerError::InvalidConfiguration { key, value, reason } => {
                write!(f, "Invalid configuration {}={:?}: {}", key, value, reason)
            }
            MakerError::ConstructionFailure { entry, message } => {
                write!(f, "Construction of {} failed: {}", entry, message)
            }
            MakerError::TypeMismatch { entry, expected } => {
                write!(f, "Type mismatch for {}: expected {}", entry, expected)
            }
            MakerError::ShutdownFailure { entry, message } => {
                write!(f, "Shutdown of {} failed: {}", entry, message)
            }
            MakerError::ShutdownAll(failures) => {
                write!(f, "{} entries failed to shut down", failures.len())?;
                for failure in failures {
                    write!(f, "; {}", failure)?;
                }
                Ok(())
            }
            MakerError::ConfigurationSource { origin, message } => {
                write!(f, "Configuration source {}: {}", origin, message)
            }
        }
    }
}

impl std::error::Error for MakerError {}

/// Result type for registry operations
///
/// # Examples
///
/// ```rust
/// use maker_registry::{MakerError, MakerResult};
///
/// fn port(raw: &str) -> MakerResult<u16> {
///     raw.parse().map_err(|e| MakerError::invalid("port", raw, e))
/// }
///
/// assert_eq!(port("8080").unwrap(), 8080);
/// assert!(port("eighty").unwrap_err().is_configuration());
/// ```
pub type MakerResult<T> = Result<T, MakerError>;
