//! Schema version tests

use doc_migration_sdk::{MalformedVersion, SchemaVersion};

mod parsing_tests {
    use super::*;

    #[test]
    fn test_parse_and_display_round_trip() {
        let version: SchemaVersion = "7.11.0".parse().unwrap();
        assert_eq!(version, SchemaVersion::new(7, 11, 0));
        assert_eq!(version.to_string(), "7.11.0");
    }

    #[test]
    fn test_malformed_versions_are_rejected() {
        for input in [
            "",
            "7",
            "7.11",
            "7.11.0.0",
            "a.b.c",
            "7.x.0",
            "7.-1.0",
            "7.+1.0",
            " 7.11.0",
            "7.11.0 ",
            "7.11.0-beta",
        ] {
            let err = input.parse::<SchemaVersion>().unwrap_err();
            assert_eq!(err, MalformedVersion(input.to_string()));
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let version = SchemaVersion::new(8, 1, 0);
        let json = serde_json::to_string(&version).unwrap();
        assert_eq!(json, "\"8.1.0\"");
        let back: SchemaVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, version);
    }

    #[test]
    fn test_malformed_version_fails_deserialization() {
        assert!(serde_json::from_str::<SchemaVersion>("\"8.1\"").is_err());
    }
}

mod ordering_tests {
    use super::*;

    #[test]
    fn test_ordering_is_numeric_per_component() {
        let mut versions: Vec<SchemaVersion> = ["8.0.0", "7.9.3", "7.10.0", "7.9.10"]
            .iter()
            .map(|v| v.parse().unwrap())
            .collect();
        versions.sort();

        let rendered: Vec<String> = versions.iter().map(SchemaVersion::to_string).collect();
        assert_eq!(rendered, vec!["7.9.3", "7.9.10", "7.10.0", "8.0.0"]);
    }

    #[test]
    fn test_is_at_least() {
        let minimum = SchemaVersion::new(8, 10, 0);
        assert!(SchemaVersion::new(8, 10, 0).is_at_least(&minimum));
        assert!(SchemaVersion::new(9, 0, 0).is_at_least(&minimum));
        assert!(!SchemaVersion::new(8, 9, 9).is_at_least(&minimum));
    }

    #[test]
    fn test_equality_is_exact_component_match() {
        let a: SchemaVersion = "7.11.0".parse().unwrap();
        let b: SchemaVersion = "7.11.0".parse().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, SchemaVersion::new(7, 11, 1));
    }
}
