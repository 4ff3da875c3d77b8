//! Registry construction and lookup.
//!
//! A [`RegistryBuilder`] merges any number of [`CatalogDef`] sources, then
//! [`RegistryBuilder::build`] runs the whole load phase in one shot: families
//! are indexed, standalone matchers and license matchers are inserted into a
//! single arena, `derived-from` chains are resolved eagerly through the same
//! table discipline as matcher references, and the arena itself is resolved
//! and cycle-checked. Every configuration mistake surfaces here; the
//! resulting [`Registry`] is immutable and cannot fail a lookup mid-scan.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use matcher::{
    ArenaBuilder, ConfigError, FamilyCategory, LicenseFamily, MatcherArena, MatcherSpec, NodeId,
};
use tracing::{info, warn, Level};

use crate::defs::{CatalogDef, FamilyDef, LicenseDef};
use crate::error::CatalogError;
use crate::filter::ApprovalFilter;
use crate::license::License;

/// Accumulates catalog sources until [`RegistryBuilder::build`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    catalogs: Vec<CatalogDef>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        RegistryBuilder::default()
    }

    /// Add one configuration source. Sources merge; definition order across
    /// sources does not matter.
    pub fn add_catalog(&mut self, catalog: CatalogDef) -> &mut Self {
        self.catalogs.push(catalog);
        self
    }

    /// Resolve everything into an immutable [`Registry`].
    pub fn build(self) -> Result<Registry, CatalogError> {
        let span = tracing::span!(Level::INFO, "registry.build");
        let _guard = span.enter();

        let mut families: BTreeMap<FamilyCategory, LicenseFamily> = BTreeMap::new();
        let mut defs: BTreeMap<String, LicenseDef> = BTreeMap::new();
        let mut approved: BTreeSet<FamilyCategory> = BTreeSet::new();
        let mut arena = ArenaBuilder::new();
        let mut standalone: Vec<NodeId> = Vec::new();

        for catalog in self.catalogs {
            for family in catalog.families {
                let category = FamilyCategory::new(&family.category);
                if families.contains_key(&category) {
                    return Err(CatalogError::DuplicateFamily(category.trimmed().to_string()));
                }
                families.insert(
                    category.clone(),
                    LicenseFamily::new(&family.category, &family.name),
                );
            }
            for spec in catalog.matchers {
                if spec.id().is_none() {
                    return Err(CatalogError::Matcher(ConfigError::InvalidMatcher(
                        "standalone matcher requires an id".into(),
                    )));
                }
                standalone.push(arena.insert(&spec)?);
            }
            for license in catalog.licenses {
                if defs.contains_key(&license.id) {
                    return Err(CatalogError::DuplicateLicense(license.id));
                }
                defs.insert(license.id.clone(), license);
            }
            for category in catalog.approved {
                approved.insert(FamilyCategory::new(&category));
            }
        }

        let mut materializer = Materializer {
            arena: &mut arena,
            families: &families,
            defs: &defs,
            done: BTreeMap::new(),
            in_progress: HashSet::new(),
        };
        for id in defs.keys() {
            materializer.materialize(id)?;
        }
        let done = materializer.done;

        let mut licenses: Vec<License> = defs
            .values()
            .map(|def| {
                let materialized = &done[&def.id];
                License {
                    id: def.id.clone(),
                    family: materialized.family.clone(),
                    node: materialized.licensed,
                    notes: def.notes.clone(),
                    derived_from: def.derived_from.clone(),
                }
            })
            .collect();
        licenses.sort();
        // Needed to rebuild each definition faithfully in `to_catalog`: the
        // id a license's own matcher declared, keyed by license id. A license
        // absent here inherited its matcher through `derived-from`.
        let own_matcher: BTreeMap<String, Option<String>> = defs
            .values()
            .filter_map(|def| {
                def.matcher
                    .as_ref()
                    .map(|spec| (def.id.clone(), spec.id().map(str::to_string)))
            })
            .collect();

        let arena = arena.resolve()?;
        for category in &approved {
            if !families.contains_key(category) {
                warn!(category = %category, "approved category has no family definition");
            }
        }
        info!(
            families = families.len(),
            licenses = licenses.len(),
            matchers = standalone.len(),
            "registry_built"
        );
        Ok(Registry {
            arena,
            families,
            licenses,
            approved,
            standalone,
            own_matcher,
        })
    }
}

/// Memoized license materialization. `derived-from` resolves against the
/// same definition table whatever order sources arrived in; a chain that
/// re-enters a license still being materialized is a cycle.
struct Materializer<'a> {
    arena: &'a mut ArenaBuilder,
    families: &'a BTreeMap<FamilyCategory, LicenseFamily>,
    defs: &'a BTreeMap<String, LicenseDef>,
    done: BTreeMap<String, Materialized>,
    in_progress: HashSet<String>,
}

struct Materialized {
    licensed: NodeId,
    operand: NodeId,
    family: LicenseFamily,
}

impl Materializer<'_> {
    fn materialize(&mut self, id: &str) -> Result<&Materialized, CatalogError> {
        if self.done.contains_key(id) {
            return Ok(&self.done[id]);
        }
        if !self.in_progress.insert(id.to_string()) {
            return Err(CatalogError::DerivedCycle(id.to_string()));
        }
        let def = &self.defs[id];

        if let Some(target) = &def.derived_from {
            if !self.defs.contains_key(target) {
                return Err(CatalogError::UnknownLicense {
                    license: id.to_string(),
                    target: target.clone(),
                });
            }
        }
        // An explicit matcher always wins; derivation fills whatever the
        // definition leaves out.
        let inherited = match &def.derived_from {
            Some(target) if def.matcher.is_none() || def.family.is_none() => {
                let target = self.materialize(target)?;
                Some((target.operand, target.family.clone()))
            }
            _ => None,
        };

        let operand = match &def.matcher {
            Some(spec) => self.arena.insert(spec)?,
            None => match inherited {
                Some((operand, _)) => operand,
                None => return Err(CatalogError::MissingMatcher(id.to_string())),
            },
        };
        let family = match &def.family {
            Some(category) => self
                .families
                .get(&FamilyCategory::new(category))
                .cloned()
                .ok_or_else(|| CatalogError::UnknownFamily {
                    license: id.to_string(),
                    family: category.clone(),
                })?,
            None => match inherited {
                Some((_, family)) => family,
                None => return Err(CatalogError::MissingFamily(id.to_string())),
            },
        };

        let licensed = self.arena.insert_licensed(Some(id), family.clone(), operand)?;
        self.in_progress.remove(id);
        self.done.insert(
            id.to_string(),
            Materialized {
                licensed,
                operand,
                family,
            },
        );
        Ok(&self.done[id])
    }
}

/// The resolved catalog: immutable and shared for the lifetime of a run.
#[derive(Debug)]
pub struct Registry {
    arena: MatcherArena,
    families: BTreeMap<FamilyCategory, LicenseFamily>,
    licenses: Vec<License>,
    approved: BTreeSet<FamilyCategory>,
    standalone: Vec<NodeId>,
    own_matcher: BTreeMap<String, Option<String>>,
}

impl Registry {
    /// The arena holding every matcher node in the catalog.
    pub fn arena(&self) -> &MatcherArena {
        &self.arena
    }

    /// All licenses, ordered by (family category, id).
    pub fn licenses(&self) -> &[License] {
        &self.licenses
    }

    /// The license registered under `id`.
    pub fn license(&self, id: &str) -> Option<&License> {
        self.licenses.iter().find(|license| license.id() == id)
    }

    /// All families, ordered by category.
    pub fn families(&self) -> impl Iterator<Item = &LicenseFamily> {
        self.families.values()
    }

    /// The family registered under `category`.
    pub fn family(&self, category: &str) -> Option<&LicenseFamily> {
        self.families.get(&FamilyCategory::new(category))
    }

    /// Approved family categories for one run: the catalog's approved set,
    /// plus the run's allow list, minus its deny list. Deny wins over both.
    pub fn approved_set(&self, allow: &[String], deny: &[String]) -> BTreeSet<FamilyCategory> {
        let mut set = self.approved.clone();
        for category in allow {
            set.insert(FamilyCategory::new(category));
        }
        for category in deny {
            set.remove(&FamilyCategory::new(category));
        }
        set
    }

    /// The licenses a scan should try under `filter`, in classification
    /// order.
    pub fn selected(
        &self,
        filter: ApprovalFilter,
        approved: &BTreeSet<FamilyCategory>,
    ) -> Vec<&License> {
        match filter {
            ApprovalFilter::All => self.licenses.iter().collect(),
            ApprovalFilter::Approved => self
                .licenses
                .iter()
                .filter(|license| approved.contains(license.family().category()))
                .collect(),
            ApprovalFilter::None => Vec::new(),
        }
    }

    /// Serialize the whole registry back into one declarative catalog.
    ///
    /// Licenses that referenced a standalone matcher serialize as a `ref` to
    /// it; licenses that inherited their matcher through `derived-from` omit
    /// the matcher entirely, so the output parses back to an equivalent
    /// registry.
    pub fn to_catalog(&self) -> CatalogDef {
        let families = self
            .families
            .values()
            .map(|family| FamilyDef {
                category: family.category().trimmed().to_string(),
                name: family.name().to_string(),
            })
            .collect();
        let matchers = self
            .standalone
            .iter()
            .map(|node| self.arena.to_spec(*node))
            .collect();
        let licenses = self
            .licenses
            .iter()
            .map(|license| LicenseDef {
                id: license.id().to_string(),
                family: Some(license.family().category().trimmed().to_string()),
                notes: license.notes().map(str::to_string),
                derived_from: license.derived_from().map(str::to_string),
                matcher: self.matcher_def_of(license),
            })
            .collect();
        let approved = self
            .approved
            .iter()
            .map(|category| category.trimmed().to_string())
            .collect();
        CatalogDef {
            families,
            matchers,
            licenses,
            approved,
        }
    }

    fn matcher_def_of(&self, license: &License) -> Option<MatcherSpec> {
        // No entry: the matcher was inherited through `derived-from` and the
        // serialized definition must omit it.
        let declared_id = self.own_matcher.get(license.id())?;
        let operand = self
            .arena
            .operand_of(license.node())
            .unwrap_or_else(|| license.node());
        match self.arena.id_of(operand) {
            // The definition pointed at a node owned elsewhere, so it comes
            // back as the reference it was written as.
            Some(name) if declared_id.as_deref() != Some(name) => {
                Some(MatcherSpec::reference(name))
            }
            _ => Some(self.arena.to_spec(operand)),
        }
    }
}
