//! Transform registry tests

use doc_migration_sdk::{
    Document, RegistrySource, SchemaVersion, TransformEntry, TransformRegistry,
};
use serde_json::json;

/// A transform appending `value` to the document's `trail` attribute, so
/// composition order is observable.
fn tag(value: &'static str) -> TransformEntry {
    TransformEntry::eager(move |doc: &Document| {
        let trail = doc.attribute_str("trail").unwrap_or_default();
        Ok(doc.with_attribute("trail", json!(format!("{trail}{value}"))))
    })
}

fn run_path(registry: &TransformRegistry, from: SchemaVersion, to: SchemaVersion) -> String {
    let mut doc = Document::new("d1");
    for (_, entry) in registry.resolve_path(from, to) {
        doc = (entry.transform)(&doc).unwrap();
    }
    doc.attribute_str("trail").unwrap_or_default().to_string()
}

mod registration_tests {
    use super::*;

    #[test]
    fn test_colliding_key_composes_instead_of_replacing() {
        let mut registry = TransformRegistry::new();
        let version = SchemaVersion::new(7, 12, 0);
        registry.register(version, tag("a"));
        registry.register(version, tag("b"));

        assert_eq!(registry.len(), 1);
        let trail = run_path(&registry, SchemaVersion::new(7, 11, 0), version);
        assert_eq!(trail, "ab");
    }

    #[test]
    fn test_string_keyed_assembly_rejects_malformed_keys() {
        let entries = vec![
            ("7.11.0".to_string(), tag("a")),
            ("not-a-version".to_string(), tag("b")),
        ];
        let err = TransformRegistry::from_string_keyed(entries).unwrap_err();
        assert_eq!(err.0, "not-a-version");
    }

    #[test]
    fn test_versions_are_sorted_regardless_of_registration_order() {
        let mut registry = TransformRegistry::new();
        registry.register(SchemaVersion::new(8, 0, 0), tag("c"));
        registry.register(SchemaVersion::new(7, 9, 0), tag("a"));
        registry.register(SchemaVersion::new(7, 10, 0), tag("b"));

        assert_eq!(
            registry.versions(),
            vec![
                SchemaVersion::new(7, 9, 0),
                SchemaVersion::new(7, 10, 0),
                SchemaVersion::new(8, 0, 0),
            ]
        );
        assert_eq!(registry.latest_version(), Some(SchemaVersion::new(8, 0, 0)));
    }
}

mod merge_tests {
    use super::*;

    fn singleton(version: SchemaVersion, value: &'static str) -> TransformRegistry {
        let mut registry = TransformRegistry::new();
        registry.register(version, tag(value));
        registry
    }

    #[test]
    fn test_merge_is_associative_for_disjoint_keys() {
        let a = singleton(SchemaVersion::new(7, 1, 0), "a");
        let b = singleton(SchemaVersion::new(7, 2, 0), "b");
        let c = singleton(SchemaVersion::new(7, 3, 0), "c");

        let left = a.clone().merge(b.clone()).merge(c.clone());
        let right = a.merge(b.merge(c));

        assert_eq!(left.versions(), right.versions());

        let from = SchemaVersion::new(7, 0, 0);
        let to = SchemaVersion::new(7, 3, 0);
        assert_eq!(run_path(&left, from, to), "abc");
        assert_eq!(run_path(&right, from, to), "abc");
    }

    #[test]
    fn test_merge_composes_colliding_keys_in_registration_order() {
        let version = SchemaVersion::new(8, 0, 0);
        let merged = singleton(version, "a").merge(singleton(version, "b"));

        assert_eq!(merged.len(), 1);
        let trail = run_path(&merged, SchemaVersion::new(7, 0, 0), version);
        assert_eq!(trail, "ab");
    }
}

mod resolve_path_tests {
    use super::*;

    #[test]
    fn test_path_is_exclusive_below_and_inclusive_above() {
        let mut registry = TransformRegistry::new();
        for minor in [11, 12, 14] {
            registry.register(SchemaVersion::new(7, minor, 0), tag("x"));
        }
        registry.register(SchemaVersion::new(8, 0, 0), tag("x"));

        let path = registry.resolve_path(SchemaVersion::new(7, 11, 0), SchemaVersion::new(8, 0, 0));
        let versions: Vec<SchemaVersion> = path.iter().map(|(v, _)| *v).collect();
        assert_eq!(
            versions,
            vec![
                SchemaVersion::new(7, 12, 0),
                SchemaVersion::new(7, 14, 0),
                SchemaVersion::new(8, 0, 0),
            ]
        );
    }

    #[test]
    fn test_equal_bounds_resolve_to_empty_path() {
        let mut registry = TransformRegistry::new();
        registry.register(SchemaVersion::new(8, 1, 0), tag("x"));

        let same = SchemaVersion::new(8, 1, 0);
        assert!(registry.resolve_path(same, same).is_empty());
    }
}

mod source_tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_factory_source_is_invoked_once_at_resolution() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let source: RegistrySource<TransformRegistry> = RegistrySource::Factory(Box::new(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            let mut registry = TransformRegistry::new();
            registry.register(SchemaVersion::new(7, 11, 0), tag("a"));
            registry
        }));

        let registry = source.resolve();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_eager_source_resolves_to_itself() {
        let mut registry = TransformRegistry::new();
        registry.register(SchemaVersion::new(7, 11, 0), tag("a"));

        let resolved = RegistrySource::Eager(registry).resolve();
        assert_eq!(resolved.versions(), vec![SchemaVersion::new(7, 11, 0)]);
    }
}
