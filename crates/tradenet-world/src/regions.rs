//! Region catalog: which goods each regional population carries.
//!
//! The default catalog describes eleven Mediterranean regions, each
//! producing one kind of pottery at a fixed unit price. The composite
//! "Private" type is derived from the catalog: it takes the next free type
//! id and carries one unit of every region's good.
//!
//! | Id | Region  | Good              | Price |
//! |----|---------|-------------------|-------|
//! | 0  | Adria   | `AdriaticPottery` | 4     |
//! | 1  | Aegean  | `AegeanPottery`   | 6     |
//! | 2  | Baetica | `BaeticanPottery` | 7     |
//! | 3  | EM      | `EMPottery`       | 6     |
//! | 4  | Egypt   | `EgyptianPottery` | 4     |
//! | 5  | Gallia  | `GallicPottery`   | 4     |
//! | 6  | Iberia  | `IberianPottery`  | 7     |
//! | 7  | Italy   | `ItalianPottery`  | 7     |
//! | 8  | NA      | `NAPottery`       | 6     |
//! | 9  | Tarr    | `TarrPottery`     | 5     |
//! | 10 | WM      | `WMPottery`       | 6     |

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tradenet_types::{Good, NodeId, RegionType};

use crate::error::WorldError;

/// Descriptor of one regional population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSpec {
    /// Numeric type id.
    pub type_id: u32,
    /// Region name.
    pub name: String,
    /// Name of the good its agents start with.
    pub good: String,
    /// Unit price of that good.
    pub price: Decimal,
}

impl RegionSpec {
    fn new(type_id: u32, name: &str, good: &str, price: i64) -> Self {
        Self {
            type_id,
            name: name.to_owned(),
            good: good.to_owned(),
            price: Decimal::from(price),
        }
    }
}

/// Validated set of regions, indexed by type id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionCatalog {
    /// Regions by type id.
    regions: BTreeMap<u32, RegionSpec>,
    /// Type id given to the composite "Private" type.
    private_type_id: u32,
}

impl RegionCatalog {
    /// Build a catalog from region descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidRegion`] if the list is empty, a type
    /// id or name repeats, or a price is negative.
    pub fn new(specs: Vec<RegionSpec>) -> Result<Self, WorldError> {
        if specs.is_empty() {
            return Err(WorldError::InvalidRegion {
                reason: "at least one region is required".to_owned(),
            });
        }

        let mut regions = BTreeMap::new();
        let mut names = BTreeSet::new();
        for spec in specs {
            if spec.price < Decimal::ZERO {
                return Err(WorldError::InvalidRegion {
                    reason: format!("region {} has negative price {}", spec.name, spec.price),
                });
            }
            if !names.insert(spec.name.clone()) {
                return Err(WorldError::InvalidRegion {
                    reason: format!("duplicate region name {}", spec.name),
                });
            }
            let type_id = spec.type_id;
            if regions.insert(type_id, spec).is_some() {
                return Err(WorldError::InvalidRegion {
                    reason: format!("duplicate region type id {type_id}"),
                });
            }
        }

        let private_type_id = regions
            .keys()
            .next_back()
            .and_then(|max| max.checked_add(1))
            .ok_or_else(|| WorldError::InvalidRegion {
                reason: "no type id left for the private type".to_owned(),
            })?;

        Ok(Self {
            regions,
            private_type_id,
        })
    }

    /// The eleven Mediterranean regions.
    pub fn mediterranean() -> Self {
        let regions: BTreeMap<u32, RegionSpec> = default_region_specs()
            .into_iter()
            .map(|spec| (spec.type_id, spec))
            .collect();
        Self {
            regions,
            private_type_id: 11,
        }
    }

    /// Return the descriptor for a type id.
    pub fn get(&self, type_id: u32) -> Option<&RegionSpec> {
        self.regions.get(&type_id)
    }

    /// Return the number of regional types (excluding "Private").
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the catalog has no regions. Never true for a built catalog.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterate over the regional descriptors in type-id order.
    pub fn iter(&self) -> impl Iterator<Item = &RegionSpec> {
        self.regions.values()
    }

    /// Return the regional type for a type id.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownRegion`] for an id not in the catalog.
    pub fn region_type(&self, type_id: u32) -> Result<RegionType, WorldError> {
        self.get(type_id)
            .map(|spec| RegionType::regional(spec.type_id, spec.name.clone()))
            .ok_or(WorldError::UnknownRegion(type_id))
    }

    /// Return the composite "Private" type.
    pub fn private_type(&self) -> RegionType {
        RegionType::private(self.private_type_id)
    }

    /// Starting ledger for a regional agent: `count` separate single-unit
    /// entries of the region's good.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownRegion`] for an id not in the catalog.
    pub fn starting_goods(&self, type_id: u32, count: u32) -> Result<Vec<Good>, WorldError> {
        let spec = self.get(type_id).ok_or(WorldError::UnknownRegion(type_id))?;
        Ok((0..count)
            .map(|_| Good::unit(spec.good.clone(), spec.price))
            .collect())
    }

    /// Starting ledger for a "Private" agent: one unit of every region's
    /// good, in type-id order.
    pub fn private_goods(&self) -> Vec<Good> {
        self.regions
            .values()
            .map(|spec| Good::unit(spec.good.clone(), spec.price))
            .collect()
    }
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::mediterranean()
    }
}

/// The default region descriptors, in type-id order.
pub fn default_region_specs() -> Vec<RegionSpec> {
    vec![
        RegionSpec::new(0, "Adria", "AdriaticPottery", 4),
        RegionSpec::new(1, "Aegean", "AegeanPottery", 6),
        RegionSpec::new(2, "Baetica", "BaeticanPottery", 7),
        RegionSpec::new(3, "EM", "EMPottery", 6),
        RegionSpec::new(4, "Egypt", "EgyptianPottery", 4),
        RegionSpec::new(5, "Gallia", "GallicPottery", 4),
        RegionSpec::new(6, "Iberia", "IberianPottery", 7),
        RegionSpec::new(7, "Italy", "ItalianPottery", 7),
        RegionSpec::new(8, "NA", "NAPottery", 6),
        RegionSpec::new(9, "Tarr", "TarrPottery", 5),
        RegionSpec::new(10, "WM", "WMPottery", 6),
    ]
}

/// Default node-to-region table: node `i` is home to region `i` for the
/// eleven default regions.
pub fn default_node_regions() -> BTreeMap<NodeId, u32> {
    (0..11_u32).map(|id| (NodeId(u64::from(id)), id)).collect()
}
