use std::cmp::Ordering;

use crate::model::ParseError;

/// How many consecutive minor versions are probed, starting at the current one.
pub const MINOR_COUNT: u64 = 4;
/// Highest patch number probed for every minor version.
pub const PATCH_COUNT: u64 = 5;

/// Enumerates `vMAJOR.MINOR.PATCH` candidates for [`MINOR_COUNT`] minors starting
/// at `start_minor`, highest version first.
pub fn generate_versions(start_major: &str, start_minor: &str) -> Result<Vec<String>, ParseError> {
    let major: u64 = start_major.parse()?;
    let minor: u64 = start_minor.parse()?;
    let end = minor
        .checked_add(MINOR_COUNT)
        .ok_or_else(|| ParseError::InvalidVersion(format!("{start_major}.{start_minor}")))?;

    let mut versions: Vec<String> = (minor..end)
        .flat_map(|minor| (0..=PATCH_COUNT).map(move |patch| format!("v{major}.{minor}.{patch}")))
        .collect();
    versions.reverse();

    Ok(versions)
}

/// Candidate tool versions around `current_version`, which must look like
/// `[v]MAJOR.MINOR.PATCH`.
pub fn candidate_tool_versions(current_version: &str) -> Result<Vec<String>, ParseError> {
    let parts: Vec<&str> = strip_v(current_version).split('.').collect();
    match parts.as_slice() {
        [major, minor, _patch] => generate_versions(major, minor),
        _ => Err(ParseError::InvalidVersion(current_version.to_string())),
    }
}

/// Whether both versions share the same major and minor number.
pub fn same_minor(v1: &str, v2: &str) -> Result<bool, ParseError> {
    Ok(major_minor(v1)? == major_minor(v2)?)
}

fn major_minor(version: &str) -> Result<(u64, u64), ParseError> {
    let mut parts = strip_v(version).split('.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) => Ok((major.parse()?, minor.parse()?)),
        _ => Err(ParseError::InvalidVersion(version.to_string())),
    }
}

fn strip_v(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

/// Ordering used to decide whether an installed version is behind a requested one.
///
/// Versions are compared as plain strings, so `v0.9.0` sorts after `v0.10.0` and a
/// `v0.0.0-...` pseudo-version sorts before most tagged releases.
pub fn compare_versions(installed: &str, requested: &str) -> Ordering {
    installed.cmp(requested)
}

pub fn needs_upgrade(installed: &str, requested: &str) -> bool {
    compare_versions(installed, requested) == Ordering::Less
}
