//! Declarative catalog definitions.
//!
//! These are the serde-facing types every configuration source yields,
//! whatever its syntax: the YAML/JSON tree form deserializes into them
//! directly, and the flat key-value form is parsed into them by the caller.
//! A [`CatalogDef`] is pure data; nothing is validated or resolved until it
//! reaches [`crate::RegistryBuilder`].

use matcher::MatcherSpec;
use serde::{Deserialize, Serialize};

/// One license family: a category code and its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyDef {
    pub category: String,
    pub name: String,
}

/// One license definition.
///
/// `family` and `matcher` may be omitted when `derived-from` names another
/// license to inherit them from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        default,
        rename = "derived-from",
        alias = "derived_from",
        skip_serializing_if = "Option::is_none"
    )]
    pub derived_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matcher: Option<MatcherSpec>,
}

/// Everything one configuration source contributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDef {
    /// Families defined by this source.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub families: Vec<FamilyDef>,
    /// Standalone named matchers, referenceable from any license.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matchers: Vec<MatcherSpec>,
    /// License definitions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<LicenseDef>,
    /// Family categories this source marks approved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub approved: Vec<String>,
}

impl LicenseDef {
    pub fn new(id: &str, family: &str, matcher: MatcherSpec) -> Self {
        LicenseDef {
            id: id.to_string(),
            family: Some(family.to_string()),
            notes: None,
            derived_from: None,
            matcher: Some(matcher),
        }
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_yaml_with_forward_reference() {
        let yaml = r#"
families:
  - category: AL
    name: Apache License Version 2.0
matchers:
  - type: spdx
    id: apache-spdx
    name: Apache-2.0
licenses:
  - id: Apache-2.0
    family: AL
    matcher:
      type: or
      children:
        - type: ref
          ref: apache-spdx
        - type: text
          text: Licensed under the Apache License
approved:
  - AL
"#;
        let def: CatalogDef = serde_yaml::from_str(yaml).expect("catalog parses");
        assert_eq!(def.families.len(), 1);
        assert_eq!(def.matchers.len(), 1);
        assert_eq!(def.licenses[0].id, "Apache-2.0");
        assert_eq!(def.approved, ["AL"]);
    }

    #[test]
    fn derived_from_accepts_both_spellings() {
        let dashed: LicenseDef =
            serde_yaml::from_str("id: X\nderived-from: base\n").expect("dashed parses");
        let underscored: LicenseDef =
            serde_yaml::from_str("id: X\nderived_from: base\n").expect("underscored parses");
        assert_eq!(dashed, underscored);
        assert_eq!(dashed.derived_from.as_deref(), Some("base"));
    }

    #[test]
    fn empty_sections_default() {
        let def: CatalogDef = serde_yaml::from_str("licenses: []\n").expect("parses");
        assert!(def.families.is_empty());
        assert!(def.matchers.is_empty());
        assert!(def.approved.is_empty());
    }
}
