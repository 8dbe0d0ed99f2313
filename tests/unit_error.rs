/// Display and classification tests for MakerError

use maker_registry::{MakerError, MakerResult};
use std::error::Error;

#[test]
fn test_error_display_unknown_entry() {
    let error = MakerError::UnknownEntry("ceiba".to_string());
    assert_eq!(format!("{}", error), "Unknown entry: ceiba");
}

#[test]
fn test_error_display_missing_configuration() {
    let error = MakerError::MissingConfiguration("pinky.name".to_string());
    assert_eq!(error.to_string(), "Missing configuration key: pinky.name");
    assert!(error.is_configuration());
}

#[test]
fn test_error_display_invalid_configuration() {
    let parse_error = "old".parse::<u32>().unwrap_err();
    let error = MakerError::invalid("ceiba_age", "old", parse_error);
    assert_eq!(
        error.to_string(),
        "Invalid configuration ceiba_age=\"old\": invalid digit found in string"
    );
    assert!(error.is_configuration());
}

#[test]
fn test_error_display_construction_and_type_mismatch() {
    let error = MakerError::construction("sparky_family", "parents missing");
    assert_eq!(error.to_string(), "Construction of sparky_family failed: parents missing");
    assert!(!error.is_configuration());

    let error = MakerError::TypeMismatch {
        entry: "sparky".to_string(),
        expected: "alloc::string::String",
    };
    assert_eq!(error.to_string(), "Type mismatch for sparky: expected alloc::string::String");
}

#[test]
fn test_error_display_shutdown_aggregate() {
    let error = MakerError::ShutdownAll(vec![
        MakerError::ShutdownFailure {
            entry: "a".to_string(),
            message: "busy".to_string(),
        },
        MakerError::ShutdownFailure {
            entry: "b".to_string(),
            message: "gone".to_string(),
        },
    ]);
    assert_eq!(
        error.to_string(),
        "2 entries failed to shut down; Shutdown of a failed: busy; Shutdown of b failed: gone"
    );
}

#[test]
fn test_error_display_configuration_source() {
    let error = MakerError::ConfigurationSource {
        origin: "animal-config.properties".to_string(),
        message: "not found".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Configuration source animal-config.properties: not found"
    );
}

#[test]
fn test_error_trait_and_clone() {
    let error = MakerError::UnknownEntry("x".to_string());
    let boxed: Box<dyn Error + Send + Sync> = Box::new(error.clone());
    assert!(boxed.source().is_none());
    assert_eq!(boxed.to_string(), error.to_string());

    let result: MakerResult<()> = Err(error);
    assert!(result.is_err());
}
