//! Version coercion for platform manifests.

/// Major, minor and patch used when a version has fewer than three numeric
/// components.
pub const FALLBACK_VERSION: [u64; 3] = [1, 0, 0];

/// Largest value of one MSIX version part.
pub const MSIX_PART_MAX: u64 = 65535;

/// Numeric components of a version string.
///
/// Strict semver parses directly. Anything else drops its pre-release and
/// build-metadata suffix (everything from the first `-` or `+`), then each
/// dot-separated piece keeps its digits only; pieces without digits are
/// skipped. A piece too large for `u64` saturates to `u64::MAX`.
///
/// - `"2.3.1"` -> `[2, 3, 1]`
/// - `"v2.3.1"` -> `[2, 3, 1]`
/// - `"2025.12.1-b6"` -> `[2025, 12, 1]`
/// - `"1.2"` -> `[1, 2]`
pub fn numeric_components(version: &str) -> Vec<u64> {
    let version = version.trim();
    if let Ok(parsed) = semver::Version::parse(version) {
        return vec![parsed.major, parsed.minor, parsed.patch];
    }

    let core = version.split(['-', '+']).next().unwrap_or_default();
    core.split('.')
        .filter_map(|piece| {
            let digits: String = piece.chars().filter(char::is_ascii_digit).collect();
            if digits.is_empty() {
                return None;
            }
            Some(digits.parse().unwrap_or_else(|_| {
                log::warn!("Version component {digits} overflows, saturating");
                u64::MAX
            }))
        })
        .collect()
}

/// Four-part Windows package version.
///
/// The first three numeric components of `version` followed by the build
/// number (0 when absent). Versions with fewer than three components fall
/// back to `1.0.0.<build>`. Every part is clamped to [`MSIX_PART_MAX`].
pub fn windows_version(version: &str, build: Option<u64>) -> String {
    let components = numeric_components(version);
    let [major, minor, patch] = match components.as_slice() {
        [major, minor, patch, ..] => [*major, *minor, *patch],
        _ => {
            log::warn!(
                "Version {version:?} has fewer than three numeric components, using {}.{}.{}",
                FALLBACK_VERSION[0],
                FALLBACK_VERSION[1],
                FALLBACK_VERSION[2]
            );
            FALLBACK_VERSION
        }
    };
    [major, minor, patch, build.unwrap_or(0)]
        .map(|part| {
            if part > MSIX_PART_MAX {
                log::warn!("Version part {part} of {version:?} exceeds {MSIX_PART_MAX}, clamping");
            }
            part.min(MSIX_PART_MAX).to_string()
        })
        .join(".")
}

/// `CFBundleShortVersionString` for iOS: up to three numeric components.
///
/// Falls back to `1.0.0` when the version has no numeric component.
pub fn marketing_version(version: &str) -> String {
    let components = numeric_components(version);
    if components.is_empty() {
        return FALLBACK_VERSION.map(|c| c.to_string()).join(".");
    }
    components
        .iter()
        .take(3)
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}
