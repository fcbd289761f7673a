//! Category to pipeline lookup.
//!
//! Callers decide which category an input belongs to; this table only maps
//! that label to a configured pipeline. Unknown labels get the default.

use std::collections::BTreeMap;
use std::fmt;

use super::{displace_by_noise, displace_normal, sequence, smooth, subdivide, SharedOp};

/// Categories that get one subdivision and light smoothing.
pub const TIER_ONE: [&str; 12] = [
    "Amanita",
    "Agaricus",
    "Boletus",
    "Cantharellus",
    "Russula",
    "Coprinus",
    "Mycena",
    "Ganoderma",
    "Pleurotus",
    "Psilocybe",
    "Clavaria",
    "Tuber",
];

/// Categories that get two subdivisions, smoothing, and noise.
pub const TIER_TWO: [&str; 5] = ["Lactarius", "Armillaria", "Cordyceps", "Xylaria", "Phallus"];

/// Stock pipelines.
pub struct StandardPipelines;

impl StandardPipelines {
    /// One subdivision, two smoothing passes. Used for unknown categories.
    pub fn default_pipeline() -> SharedOp {
        sequence(vec![subdivide(1), smooth(2, 0.5)])
    }

    /// Same steps as the default.
    pub fn tier_one() -> SharedOp {
        sequence(vec![subdivide(1), smooth(2, 0.5)])
    }

    /// Two subdivisions, three smoothing passes, fine noise.
    pub fn tier_two() -> SharedOp {
        sequence(vec![subdivide(2), smooth(3, 0.5), displace_by_noise(0.02, 6.0)])
    }

    /// Strong high-frequency noise for pitted surfaces.
    pub fn pitted() -> SharedOp {
        sequence(vec![subdivide(2), smooth(2, 0.5), displace_by_noise(0.04, 12.0)])
    }

    /// Subdivision only; spines are instanced elsewhere.
    pub fn spined() -> SharedOp {
        sequence(vec![subdivide(1)])
    }

    /// Slight outward inflation for shelf thickness.
    pub fn shelf() -> SharedOp {
        sequence(vec![subdivide(1), displace_normal(0.02)])
    }

    /// Lighter treatment for secondary cylinders such as stems.
    pub fn stem() -> SharedOp {
        sequence(vec![subdivide(1), smooth(1, 0.5)])
    }
}

/// Maps category labels to pipelines.
#[derive(Clone)]
pub struct PipelineTable {
    entries: BTreeMap<String, SharedOp>,
    default: SharedOp,
    secondary: SharedOp,
}

impl PipelineTable {
    /// An empty table with the given fallback and secondary pipelines.
    pub fn new(default: SharedOp, secondary: SharedOp) -> Self {
        Self {
            entries: BTreeMap::new(),
            default,
            secondary,
        }
    }

    /// The stock table.
    ///
    /// Tier-one and tier-two categories share one pipeline instance per tier.
    pub fn standard() -> Self {
        let mut table = Self::new(StandardPipelines::default_pipeline(), StandardPipelines::stem());

        let tier_one = StandardPipelines::tier_one();
        for category in TIER_ONE {
            table.insert(category, tier_one.clone());
        }
        let tier_two = StandardPipelines::tier_two();
        for category in TIER_TWO {
            table.insert(category, tier_two.clone());
        }
        table.insert("Morchella", StandardPipelines::pitted());
        table.insert("Hericium", StandardPipelines::spined());
        table.insert("Trametes", StandardPipelines::shelf());
        table
    }

    /// Add or replace a category, returning the previous pipeline.
    pub fn insert(&mut self, category: impl Into<String>, op: SharedOp) -> Option<SharedOp> {
        self.entries.insert(category.into(), op)
    }

    /// Replace the fallback pipeline.
    pub fn with_default(mut self, op: SharedOp) -> Self {
        self.default = op;
        self
    }

    /// Replace the secondary pipeline.
    pub fn with_secondary(mut self, op: SharedOp) -> Self {
        self.secondary = op;
        self
    }

    /// The pipeline for `category`, or the default for unknown labels.
    pub fn get(&self, category: &str) -> SharedOp {
        self.entries
            .get(category)
            .unwrap_or(&self.default)
            .clone()
    }

    /// True if `category` has its own entry.
    pub fn contains(&self, category: &str) -> bool {
        self.entries.contains_key(category)
    }

    /// The fallback pipeline.
    pub fn default_pipeline(&self) -> SharedOp {
        self.default.clone()
    }

    /// The pipeline for secondary cylinders.
    pub fn secondary(&self) -> SharedOp {
        self.secondary.clone()
    }

    /// Known categories in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Number of known categories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no category has its own entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PipelineTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for PipelineTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineTable")
            .field(
                "entries",
                &self
                    .entries
                    .iter()
                    .map(|(k, op)| (k.as_str(), op.name()))
                    .collect::<Vec<_>>(),
            )
            .field("default", &self.default.name())
            .field("secondary", &self.secondary.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_standard_table_covers_all_categories() {
        let table = PipelineTable::standard();
        assert_eq!(table.len(), 20);
        assert!(table.contains("Amanita"));
        assert!(table.contains("Morchella"));
        assert!(!table.contains("Unknown"));
    }

    #[test]
    fn test_tiers() {
        let table = PipelineTable::standard();
        assert_eq!(table.get("Boletus").names(), ["subdivide(1)", "smooth(2, 0.5)"]);
        assert_eq!(
            table.get("Xylaria").names(),
            ["subdivide(2)", "smooth(3, 0.5)", "displaceByNoise(0.02, 6)"]
        );
        assert_eq!(
            table.get("Morchella").names(),
            ["subdivide(2)", "smooth(2, 0.5)", "displaceByNoise(0.04, 12)"]
        );
        assert_eq!(table.get("Hericium").names(), ["subdivide(1)"]);
        assert_eq!(table.get("Trametes").names(), ["subdivide(1)", "displaceNormal(0.02)"]);
        assert_eq!(table.secondary().names(), ["subdivide(1)", "smooth(1, 0.5)"]);
    }

    #[test]
    fn test_tier_members_share_one_pipeline() {
        let table = PipelineTable::standard();
        assert!(Arc::ptr_eq(&table.get("Amanita"), &table.get("Tuber")));
        assert!(Arc::ptr_eq(&table.get("Lactarius"), &table.get("Phallus")));
    }

    #[test]
    fn test_unknown_resolves_to_default() {
        let table = PipelineTable::standard();
        assert!(Arc::ptr_eq(&table.get("NotACategory"), &table.default_pipeline()));
        assert!(Arc::ptr_eq(&table.get(""), &table.default_pipeline()));
    }

    #[test]
    fn test_custom_entries() {
        let mut table = PipelineTable::new(subdivide(0), smooth(1, 0.5)).with_default(subdivide(3));
        assert!(table.is_empty());
        assert!(table.insert("Shell", displace_normal(0.1)).is_none());
        assert!(table.insert("Shell", displace_normal(0.2)).is_some());

        assert_eq!(table.get("Shell").name(), "displaceNormal(0.2)");
        assert_eq!(table.get("other").name(), "subdivide(3)");
        assert_eq!(table.categories().collect::<Vec<_>>(), ["Shell"]);
    }
}
