//! SPDX tag matcher.
//!
//! Matches the `SPDX-License-Identifier: short-name` convention, where the
//! short name is drawn from the SPDX identifier list and follows the pattern
//! `[A-Za-z0-9.-]+`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;

const LICENSE_IDENTIFIER: &str = "SPDX-License-Identifier:";

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"SPDX-License-Identifier:\s([A-Za-z0-9.\-]+)").unwrap());

/// Matcher for one SPDX short identifier.
#[derive(Debug, Clone)]
pub struct SpdxTag {
    name: String,
}

impl SpdxTag {
    pub fn new(name: &str) -> Result<Self, ConfigError> {
        if name.trim().is_empty() {
            return Err(ConfigError::InvalidMatcher(
                "spdx matcher requires a name".into(),
            ));
        }
        Ok(SpdxTag {
            name: name.trim().to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the line carries this identifier in an SPDX tag.
    pub(crate) fn check(&self, line: &str) -> bool {
        if !line.contains(LICENSE_IDENTIFIER) {
            return false;
        }
        TAG.captures_iter(line)
            .any(|captures| &captures[1] == self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_its_identifier() {
        let tag = SpdxTag::new("Apache-2.0").unwrap();
        assert!(tag.check("// SPDX-License-Identifier: Apache-2.0"));
        assert!(!tag.check("// SPDX-License-Identifier: MIT"));
        assert!(!tag.check("// Apache-2.0 without the tag"));
    }

    #[test]
    fn finds_identifier_among_several() {
        let tag = SpdxTag::new("MIT").unwrap();
        assert!(tag.check(
            "SPDX-License-Identifier: Apache-2.0 SPDX-License-Identifier: MIT"
        ));
    }

    #[test]
    fn blank_name_rejected() {
        assert!(SpdxTag::new("  ").is_err());
    }
}
