//! Property-based tests for the reference model.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use patchset::core::backend::ListedRef;
use patchset::core::lineage::build_lineage;
use patchset::core::refs::{NameRef, PatchRef, PatchType, RefKind};
use patchset::core::version::Version;

/// Strategy for patchset names (one path component).
fn patch_name() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9_.-]{0,19}"
}

/// Strategy for arbitrary ref-ish strings, separators included.
fn ref_string() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9]{1,6}|/|//", 1..8).prop_map(|parts| parts.concat())
}

fn version() -> impl Strategy<Value = Version> {
    (1u64..100, 0u64..100).prop_map(|(major, minor)| Version::new(major, minor))
}

fn patch_type() -> impl Strategy<Value = PatchType> {
    prop_oneof![Just(PatchType::Draft), Just(PatchType::Archived)]
}

fn namespace() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["", "heads/", "refs/heads/"])
}

proptest! {
    /// Formatting a parsed NameRef and parsing it again changes nothing.
    #[test]
    fn nameref_roundtrip_is_idempotent(input in ref_string()) {
        if let Ok(first) = NameRef::parse(&input) {
            let again = NameRef::parse(&first.fullname()).unwrap();
            prop_assert_eq!(again.fullname(), first.fullname());
            prop_assert_eq!(again.name(), first.name());
            prop_assert_eq!(again.kind(), first.kind());
        }
    }

    /// PatchRef fields survive a format/parse round trip.
    #[test]
    fn patchref_roundtrip(
        name in patch_name(),
        ty in patch_type(),
        vers in version(),
        ns in namespace(),
    ) {
        let input = format!("{}patchset/{}/{}{}", ns, name, ty, vers);
        let first = PatchRef::parse(&input).unwrap();

        prop_assert_eq!(first.kind(), Some(&RefKind::Heads));
        prop_assert_eq!(first.patch_name(), name.as_str());
        prop_assert_eq!(first.patch_type(), Some(ty));
        prop_assert_eq!(first.version(), Some(vers));

        let again = PatchRef::parse(&first.fullname()).unwrap();
        prop_assert_eq!(again.fullname(), first.fullname());
        prop_assert_eq!(again.short_name(), first.short_name());
        prop_assert_eq!(again.covertag(), first.covertag());
    }

    /// A branch's cover tag is a tag that is its own cover tag.
    #[test]
    fn covertag_is_a_fixed_point(name in patch_name(), ty in patch_type(), vers in version()) {
        let branch = PatchRef::for_version(&name, ty, vers).unwrap();
        let tag = PatchRef::parse(&branch.covertag()).unwrap();

        prop_assert_eq!(tag.kind(), Some(&RefKind::Tags));
        prop_assert_eq!(tag.covertag(), branch.covertag());
    }

    /// Versions compare like (major, minor) integer pairs.
    #[test]
    fn version_order_is_numeric(a in version(), b in version()) {
        prop_assert_eq!(a.cmp(&b), (a.major(), a.minor()).cmp(&(b.major(), b.minor())));
    }

    /// The newest version of a lineage wins regardless of listing order.
    #[test]
    fn lineage_latest_is_maximum(
        versions in prop::collection::btree_set((1u64..20, 0u64..20), 1..8),
        seed in any::<u64>(),
    ) {
        let mut refs: Vec<ListedRef> = versions
            .iter()
            .map(|(major, minor)| {
                ListedRef::new("0000000", format!("refs/heads/patchset/p/v{}.{}", major, minor))
            })
            .collect();
        let len = refs.len();
        refs.rotate_left((seed as usize) % len);

        let lineage = build_lineage(refs);
        let latest = &lineage["p"];
        let (major, minor) = *versions.iter().max().unwrap();

        prop_assert_eq!(latest.version(), Some(Version::new(major, minor)));
        prop_assert_eq!(latest.prev_vers.len(), versions.len() - 1);
        prop_assert!(latest.prev_vers.values().all(|r| r.prev_vers.is_empty()));
    }
}
