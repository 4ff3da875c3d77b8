//! License family identity.
//!
//! A family groups every license variant that shares one approval decision
//! (for example the Apache License 2.0 with and without an SPDX tag). The
//! category code is stored at a fixed width so report columns line up; all
//! comparison and display happen on the trimmed form.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed storage width of a category code.
pub const CATEGORY_WIDTH: usize = 5;

/// A normalized license category code.
///
/// Construction pads short codes with spaces to [`CATEGORY_WIDTH`] and
/// truncates longer ones, so two categories are equal exactly when their
/// trimmed text is equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FamilyCategory(String);

impl FamilyCategory {
    pub fn new(code: &str) -> Self {
        let trimmed = code.trim();
        let mut padded = String::with_capacity(CATEGORY_WIDTH);
        for ch in trimmed.chars().take(CATEGORY_WIDTH) {
            padded.push(ch);
        }
        while padded.chars().count() < CATEGORY_WIDTH {
            padded.push(' ');
        }
        FamilyCategory(padded)
    }

    /// The padded, fixed-width form.
    pub fn padded(&self) -> &str {
        &self.0
    }

    /// The trimmed form used for comparison and display.
    pub fn trimmed(&self) -> &str {
        self.0.trim_end()
    }
}

impl fmt::Display for FamilyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.trimmed())
    }
}

impl From<String> for FamilyCategory {
    fn from(code: String) -> Self {
        FamilyCategory::new(&code)
    }
}

impl From<FamilyCategory> for String {
    fn from(category: FamilyCategory) -> Self {
        category.trimmed().to_string()
    }
}

/// A license family: normalized category code plus human-readable name.
///
/// Identity and ordering are by category alone; the name is display metadata.
#[derive(Debug, Clone)]
pub struct LicenseFamily {
    category: FamilyCategory,
    name: String,
}

impl LicenseFamily {
    pub fn new(category: &str, name: &str) -> Self {
        LicenseFamily {
            category: FamilyCategory::new(category),
            name: name.to_string(),
        }
    }

    pub fn category(&self) -> &FamilyCategory {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for LicenseFamily {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category
    }
}

impl Eq for LicenseFamily {}

impl PartialOrd for LicenseFamily {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LicenseFamily {
    fn cmp(&self, other: &Self) -> Ordering {
        self.category.cmp(&other.category)
    }
}

impl fmt::Display for LicenseFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.name)
    }
}
