//! RPM version ordering.
//!
//! RPM versions look dot separated, but the separators do not matter: a
//! version is a sequence of digit runs, letter runs, `^` and `~`, and
//! everything else only splits runs apart.

use std::cmp::Ordering;

use super::Version;

/// Compare two versions.
///
/// The epoch decides outright when both sides carry one and they differ.
/// Otherwise the version strings are compared, then the releases when both
/// sides have one (a missing release is unconstrained).
pub fn compare(a: &Version, b: &Version) -> Ordering {
    if let (Some(epoch_a), Some(epoch_b)) = (a.epoch, b.epoch) {
        if epoch_a != epoch_b {
            return epoch_a.cmp(&epoch_b);
        }
    }
    match compare_part(&a.ver, &b.ver) {
        Ordering::Equal => {}
        ordering => return ordering,
    }
    match (a.rel.as_deref(), b.rel.as_deref()) {
        (Some(rel_a), Some(rel_b)) => compare_part(rel_a, rel_b),
        _ => Ordering::Equal,
    }
}

/// Compare one part of a version: either the version or the release.
pub fn compare_part(a: &str, b: &str) -> Ordering {
    let segs_a = split_part(a);
    let segs_b = split_part(b);

    for (part_a, part_b) in segs_a.iter().zip(segs_b.iter()) {
        if part_a == part_b {
            continue;
        }
        // Tilde sorts before everything, even caret.
        if *part_a == "~" {
            return Ordering::Less;
        }
        if *part_b == "~" {
            return Ordering::Greater;
        }
        // Caret sorts before everything else. Running out of segments is
        // handled after the loop.
        if *part_a == "^" {
            return Ordering::Less;
        }
        if *part_b == "^" {
            return Ordering::Greater;
        }

        let digits_a = is_digit_run(part_a);
        let digits_b = is_digit_run(part_b);
        if digits_a != digits_b {
            // Numeric segments are always newer than alpha segments.
            return if digits_a {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let ordering = if digits_a {
            let trimmed_a = part_a.trim_start_matches('0');
            let trimmed_b = part_b.trim_start_matches('0');
            trimmed_a
                .len()
                .cmp(&trimmed_b.len())
                .then_with(|| trimmed_a.cmp(trimmed_b))
        } else {
            part_a.cmp(part_b)
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    let (len_a, len_b) = (segs_a.len(), segs_b.len());
    match len_a.cmp(&len_b) {
        Ordering::Equal => Ordering::Equal,
        // The longer side is newer unless its next segment is a tilde. An
        // empty shorter side is smaller than anything, tilde included.
        Ordering::Greater => {
            if len_b > 0 && segs_a[len_b] == "~" {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        Ordering::Less => {
            if len_a > 0 && segs_b[len_a] == "~" {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
    }
}

/// Split a version part into its comparable segments.
pub fn split_part(input: &str) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut segments = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let end = if c.is_ascii_digit() {
            run_end(bytes, i, |b| b.is_ascii_digit())
        } else if c.is_ascii_alphabetic() {
            run_end(bytes, i, |b| b.is_ascii_alphabetic())
        } else if c == b'^' || c == b'~' {
            i + 1
        } else {
            i += 1;
            continue;
        };
        segments.push(&input[i..end]);
        i = end;
    }
    segments
}

fn run_end(bytes: &[u8], start: usize, accept: impl Fn(u8) -> bool) -> usize {
    bytes[start..]
        .iter()
        .position(|b| !accept(*b))
        .map_or(bytes.len(), |offset| start + offset)
}

fn is_digit_run(segment: &str) -> bool {
    segment.as_bytes().first().is_some_and(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_part() {
        let cases: &[(&str, &[&str])] = &[
            ("hello world", &["hello", "world"]),
            ("1.0.2", &["1", "0", "2"]),
            ("1.0.2^", &["1", "0", "2", "^"]),
            ("1.0~rc1", &["1", "0", "~", "rc", "1"]),
            ("~~~", &["~", "~", "~"]),
            ("", &[]),
            ("._+", &[]),
        ];
        for (input, expected) in cases {
            assert_eq!(split_part(input), *expected, "splitting {:?}", input);
        }
    }

    #[test]
    fn test_compare_part() {
        // Expected values agree with `rpmdev-vercmp`.
        let cases = [
            ("1.0.0", "1.0.0", Ordering::Equal),
            ("1.0.0~", "1.0.0", Ordering::Less), // tilde is smaller than nothing
            ("1.0.0", "1.0.0~", Ordering::Greater),
            ("1.0.0^", "1.0.0", Ordering::Greater), // caret is bigger than nothing
            ("1.0.0^", "1.0.0.a", Ordering::Less),  // caret is smaller than alpha
            ("0", "a", Ordering::Greater),          // digits beat alpha
            ("1.a", "1.0", Ordering::Less),
            ("^", "", Ordering::Greater),
            ("~", "0", Ordering::Less),
            ("~", "", Ordering::Greater), // an empty side loses even to tilde
            ("~", "^", Ordering::Less),
            ("1.02", "1.1", Ordering::Greater),
            ("1.2", "1.10", Ordering::Less),   // longest digit run wins
            ("1.002", "1.10", Ordering::Less), // after dropping leading zeros
            ("1.0~rc1", "1.0~rc2", Ordering::Less),
            ("1.0~rc1", "1.0", Ordering::Less),
            ("abc", "abd", Ordering::Less),
            ("1_0", "1.0", Ordering::Equal),
        ];
        for (a, b, expected) in cases {
            assert_eq!(compare_part(a, b), expected, "comparing {:?} to {:?}", a, b);
        }
    }

    #[test]
    fn test_compare_part_skips_equal_numbers() {
        assert_eq!(compare_part("01.2", "1.1"), Ordering::Greater);
        assert_eq!(compare_part("01.2", "1.2"), Ordering::Equal);
        assert_eq!(compare_part("1.01", "1.1.0"), Ordering::Less);
    }

    #[test]
    fn test_compare_epoch_decides() {
        let a = Version::new("1.0").with_epoch(2);
        let b = Version::new("9.0").with_epoch(1);
        assert_eq!(compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_compare_missing_epoch_is_skipped() {
        let a = Version::new("1.0").with_epoch(5);
        let b = Version::new("1.0");
        assert_eq!(compare(&a, &b), Ordering::Equal);
    }

    #[test]
    fn test_compare_release() {
        let a = Version::new("9.0.1").with_release("2");
        let b = Version::new("9.0.1").with_release("10");
        assert_eq!(compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_compare_release_after_segment_equal_version() {
        let a = Version::new("1_0").with_release("2");
        let b = Version::new("1.0").with_release("1");
        assert_eq!(compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_compare_missing_release_is_unconstrained() {
        let a = Version::new("9.0.1").with_release("1");
        let b = Version::new("9.0.1");
        assert_eq!(compare(&a, &b), Ordering::Equal);
        assert_eq!(compare(&b, &a), Ordering::Equal);
    }

    #[test]
    fn test_compare_version_beats_release() {
        let a = Version::new("9.0.10").with_release("1");
        let b = Version::new("9.0.9").with_release("99");
        assert_eq!(compare(&a, &b), Ordering::Greater);
    }

    fn version_part() -> impl Strategy<Value = String> {
        "[0-9ab.~^]{0,8}"
    }

    proptest! {
        #[test]
        fn prop_compare_part_reflexive(a in version_part()) {
            prop_assert_eq!(compare_part(&a, &a), Ordering::Equal);
        }

        #[test]
        fn prop_compare_part_antisymmetric(a in version_part(), b in version_part()) {
            prop_assert_eq!(compare_part(&a, &b), compare_part(&b, &a).reverse());
        }

        #[test]
        fn prop_compare_part_transitive(
            a in version_part(),
            b in version_part(),
            c in version_part(),
        ) {
            let ab = compare_part(&a, &b);
            let bc = compare_part(&b, &c);
            if ab == bc {
                prop_assert_eq!(compare_part(&a, &c), ab);
            }
            if ab != Ordering::Greater && bc != Ordering::Greater {
                prop_assert_ne!(compare_part(&a, &c), Ordering::Greater);
            }
        }

        #[test]
        fn prop_compare_full_versions_antisymmetric(
            epoch_a in 0u64..3,
            epoch_b in 0u64..3,
            ver_a in version_part(),
            ver_b in version_part(),
            rel_a in version_part(),
            rel_b in version_part(),
        ) {
            let a = Version::new(ver_a).with_epoch(epoch_a).with_release(rel_a);
            let b = Version::new(ver_b).with_epoch(epoch_b).with_release(rel_b);
            prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
        }
    }
}
