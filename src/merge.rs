//! Recursive merging of option usage into accumulated value sets.
//!
//! Merging widens every scalar into a set and unions sets, so the result of
//! folding many usages holds every distinct value seen per key. Nested
//! mappings merge key-wise; a key that is a mapping in one usage and a value in
//! another is a structural conflict.
use crate::error::{GenerateError, GenerateResult};
use crate::value::{OptionMap, OptionValue, ParamValue};
use std::collections::BTreeSet;

/// Merge two option maps into a fresh map of accumulated value sets.
///
/// The result only contains `Set` and `Mapping` values and does not depend on
/// argument order.
pub fn merge(a: &OptionMap, b: &OptionMap) -> GenerateResult<OptionMap> {
    let mut merged = OptionMap::new();
    for (key, value) in a.iter().chain(b.iter()) {
        absorb(&mut merged, key, value)?;
    }
    Ok(merged)
}

/// Fold any number of option maps through [`merge`].
pub fn merge_all<'a, I>(maps: I) -> GenerateResult<OptionMap>
where
    I: IntoIterator<Item = &'a OptionMap>,
{
    let mut accumulated = OptionMap::new();
    for map in maps {
        accumulated = merge(&accumulated, map)?;
    }
    Ok(accumulated)
}

fn absorb(merged: &mut OptionMap, key: &str, value: &OptionValue) -> GenerateResult<()> {
    match value {
        OptionValue::Mapping(nested) => {
            let slot = merged
                .entry(key.to_string())
                .or_insert_with(|| OptionValue::Mapping(OptionMap::new()));
            match slot {
                OptionValue::Mapping(existing) => {
                    let combined = merge(existing, nested)?;
                    *existing = combined;
                }
                other => return Err(mismatch(key, "mapping", other)),
            }
        }
        OptionValue::Set(values) => {
            let existing = value_set(merged, key)?;
            existing.extend(values.iter().cloned());
        }
        OptionValue::Scalar(value) => {
            let existing = value_set(merged, key)?;
            existing.insert(value.clone());
        }
    }
    Ok(())
}

fn value_set<'a>(
    merged: &'a mut OptionMap,
    key: &str,
) -> GenerateResult<&'a mut BTreeSet<ParamValue>> {
    let slot = merged
        .entry(key.to_string())
        .or_insert_with(|| OptionValue::Set(BTreeSet::new()));
    match slot {
        OptionValue::Set(values) => Ok(values),
        other => Err(mismatch(key, "set", other)),
    }
}

fn mismatch(key: &str, expected: &'static str, found: &OptionValue) -> GenerateError {
    GenerateError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::option_map;

    fn set<const N: usize>(values: [i32; N]) -> OptionValue {
        OptionValue::one_of(values)
    }

    #[test]
    fn scalars_widen_into_sets() {
        let merged = merge(&option_map([("a", 1.into())]), &option_map([("a", 2.into())]))
            .expect("merge");
        assert_eq!(merged, option_map([("a", set([1, 2]))]));
    }

    #[test]
    fn disjoint_keys_are_kept() {
        let merged = merge(&option_map([("a", 1.into())]), &option_map([("b", 2.into())]))
            .expect("merge");
        assert_eq!(merged, option_map([("a", set([1])), ("b", set([2]))]));
    }

    #[test]
    fn nested_mappings_merge_recursively() {
        let left = option_map([("a", OptionValue::Mapping(option_map([("b", 2.into())])))]);
        let right = option_map([("a", OptionValue::Mapping(option_map([("b", 1.into())])))]);
        let merged = merge(&left, &right).expect("merge");
        assert_eq!(
            merged,
            option_map([("a", OptionValue::Mapping(option_map([("b", set([1, 2]))])))])
        );
    }

    #[test]
    fn sets_union_with_sets_and_scalars() {
        let merged = merge(&option_map([("a", set([1]))]), &option_map([("a", set([2]))]))
            .expect("merge");
        assert_eq!(merged, option_map([("a", set([1, 2]))]));

        let merged = merge(&option_map([("a", 1.into())]), &option_map([("a", set([2]))]))
            .expect("merge");
        assert_eq!(merged, option_map([("a", set([1, 2]))]));
    }

    #[test]
    fn scalar_against_mapping_is_a_type_mismatch() {
        let scalar = option_map([("a", 1.into())]);
        let nested = option_map([("a", OptionValue::Mapping(option_map([("b", 1.into())])))]);

        let err = merge(&scalar, &nested).expect_err("mismatch");
        assert_eq!(
            err,
            GenerateError::TypeMismatch {
                key: "a".to_string(),
                expected: "mapping",
                found: "set",
            }
        );

        let err = merge(&nested, &scalar).expect_err("mismatch");
        assert!(matches!(err, GenerateError::TypeMismatch { key, .. } if key == "a"));
    }

    #[test]
    fn merge_order_does_not_matter() {
        let maps = [
            option_map([("camera", "m12".into()), ("z", 30.into())]),
            option_map([("camera", "picamera_2".into())]),
            option_map([("z", OptionValue::one_of([45, 30])), ("riser", "slide".into())]),
        ];
        let forward = merge_all(maps.iter()).expect("forward");
        let backward = merge_all(maps.iter().rev()).expect("backward");
        let shuffled = merge_all([&maps[1], &maps[2], &maps[0]]).expect("shuffled");
        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);
        assert_eq!(forward["z"], set([30, 45]));
    }

    #[test]
    fn merging_is_associative() {
        let a = option_map([("x", 1.into())]);
        let b = option_map([("x", 2.into()), ("y", true.into())]);
        let c = option_map([("y", false.into())]);
        let left = merge(&merge(&a, &b).expect("ab"), &c).expect("ab_c");
        let right = merge(&a, &merge(&b, &c).expect("bc")).expect("a_bc");
        assert_eq!(left, right);
    }
}
