use super::*;

macro_rules! test_error_contains {
    ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
        #[test]
        fn $test_name() {
            let err = $err;
            let error_string = err.to_string();
            $(
                assert!(error_string.contains($contains),
                    "Error message should contain '{}', got: {}",
                    $contains,
                    error_string
                );
            )+
        }
    };
}

#[test]
fn test_error_display() {
    let err = state::not_installed("com.example.app");
    assert_eq!(err.to_string(), "Bundle 'com.example.app' is not installed");
}

#[test]
fn test_error_code() {
    let err = overlay::invalid_priority("feature", 0);
    assert_eq!(
        err.code().map(|c| c.to_string()),
        Some("bms::overlay::invalid_priority".to_string())
    );
}

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: BmsError = io_err.into();
    assert!(matches!(err, BmsError::IoError { .. }));
    assert_eq!(err.kind(), ErrorKind::IoFailure);
}

#[test]
fn test_storage_full_maps_to_disk_space() {
    let io_err = std::io::Error::new(std::io::ErrorKind::StorageFull, "no space left");
    let err = io::extraction_failed(std::path::Path::new("/data/app"), &io_err);
    assert!(matches!(err, BmsError::InsufficientDiskSpace { .. }));
}

#[test]
fn test_result_codes_are_positive_and_grouped() {
    let samples = [
        (param::invalid("x"), ErrorKind::ParamError),
        (version::downgrade("b", 2, 1), ErrorKind::VersionConflict),
        (
            BmsError::FingerprintNotSame {
                bundle: "b".to_string(),
            },
            ErrorKind::SignatureConflict,
        ),
        (overlay::inconsistent_version_code("b"), ErrorKind::OverlayConflict),
        (quick_fix::so_incompatible("m"), ErrorKind::QuickFixConflict),
        (state::install_state_error("b"), ErrorKind::StateConflict),
        (io::registry_write_failed("disk"), ErrorKind::IoFailure),
        (
            BmsError::Internal {
                message: "boom".to_string(),
            },
            ErrorKind::Internal,
        ),
    ];

    for (err, kind) in samples {
        assert!(err.result_code() > ERR_OK);
        assert_eq!(err.kind(), kind, "{err}");
    }
}

#[test]
fn test_distinct_codes_for_overlay_errors() {
    let a = BmsError::TargetModuleNotExisted {
        module: "m".to_string(),
        target: "t".to_string(),
    };
    let b = BmsError::MissingOverlayModule {
        target: "t".to_string(),
        module: "m".to_string(),
    };
    assert_ne!(a.result_code(), b.result_code());
}

test_error_contains!(
    test_downgrade_message,
    version::downgrade("com.example", 3, 2),
    "downgrade",
    "com.example"
);

test_error_contains!(
    test_state_error_message,
    state::install_state_error("com.example"),
    "in progress"
);

test_error_contains!(
    test_entry_count_message,
    version::invalid_entry_count("com.example", 2),
    "entry modules"
);

#[test]
fn test_json_error_conversion() {
    let parse_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("{nope");
    let err: BmsError = parse_result.unwrap_err().into();
    assert!(matches!(err, BmsError::ManifestParseFailed { .. }));
}

#[test]
fn test_yaml_error_conversion() {
    let parse_result: std::result::Result<serde_yaml::Value, _> =
        serde_yaml::from_str("invalid: yaml: content: [unclosed");
    let err: BmsError = parse_result.unwrap_err().into();
    assert!(matches!(err, BmsError::ConfigParseFailed { .. }));
}

#[test]
fn test_transaction_failed_keeps_reported_code() {
    let err = BmsError::TransactionFailed {
        code: 45,
        message: "Target module 'm3' of overlay 'm2' is itself an overlay module".to_string(),
    };
    assert_eq!(err.result_code(), 45);
    assert_eq!(err.kind(), ErrorKind::OverlayConflict);
    assert!(err.to_string().ends_with("(code 45)"));
}
