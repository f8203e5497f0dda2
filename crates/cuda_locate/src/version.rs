// version.rs - Linker version parsing and comparison

use anyhow::{anyhow, bail, Result};
use std::cmp::Ordering;
use std::fmt;

/// Dotted version as reported by a linker, e.g. "2.25.1".
///
/// Comparison is component-wise; a missing trailing component counts as
/// zero, so "2.25" < "2.25.1" and "2.25" == "2.25.0".
#[derive(Clone, Debug)]
pub struct LdVersion(pub Vec<u32>);

impl LdVersion {
    /// Parse a bare dotted version string ("2.25.1").
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            bail!("empty version string");
        }
        let components = trimmed
            .split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|e| anyhow!("bad version component '{}' in '{}': {}", part, trimmed, e))
            })
            .collect::<Result<Vec<u32>>>()?;
        Ok(Self(components))
    }

    /// Extract the version from the output of `ld --version`: the last
    /// whitespace-delimited token of the first line.
    ///
    /// "GNU ld (GNU Binutils) 2.25.1" -> [2, 25, 1]
    pub fn from_version_output(output: &str) -> Result<Self> {
        let first_line = output
            .lines()
            .next()
            .ok_or_else(|| anyhow!("version output is empty"))?;
        let token = first_line
            .split_whitespace()
            .last()
            .ok_or_else(|| anyhow!("version output line is blank"))?;
        Self::parse(token)
    }
}

impl fmt::Display for LdVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .0
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&text)
    }
}

impl Ord for LdVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        for i in 0..len {
            let a = self.0.get(i).copied().unwrap_or(0);
            let b = other.0.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for LdVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for LdVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LdVersion {}
