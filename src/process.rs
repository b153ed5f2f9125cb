//! Processes convert between commodities. The data structures in this module hold the
//! per-site cost parameters of each process and the conversion ratios tying processes to the
//! commodities they consume and produce.
use crate::commodity::CommodityID;
use crate::id::define_id_type;
use crate::site::SiteID;
use crate::units::{Dimensionless, MoneyPerCapacity, MoneyPerEnergy};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;

define_id_type! {ProcessID}

/// A map of [`Process`]es, keyed by site and process ID
pub type ProcessMap = IndexMap<(SiteID, ProcessID), Process>;

/// Cost and financing parameters for a process at a particular site
#[derive(PartialEq, Debug, Deserialize)]
pub struct Process {
    /// The site at which the process can be built
    pub site_id: SiteID,
    /// A unique identifier for the process (e.g. "Wind park")
    pub id: ProcessID,
    /// Overnight investment cost per unit capacity
    pub inv_cost: MoneyPerCapacity,
    /// Annual fixed operating cost per unit capacity
    pub fix_cost: MoneyPerCapacity,
    /// Variable operating cost per unit of energy produced
    pub var_cost: MoneyPerEnergy,
    /// Weighted average cost of capital (as a fraction)
    pub wacc: Dimensionless,
    /// Depreciation period in years
    pub depreciation: u32,
}

/// Direction of a commodity flow relative to a process
#[derive(PartialEq, Eq, Clone, Copy, Debug, std::hash::Hash, DeserializeLabeledStringEnum)]
pub enum FlowDirection {
    /// The commodity is consumed by the process
    #[string = "In"]
    In,
    /// The commodity is produced by the process
    #[string = "Out"]
    Out,
}

/// Raw record from the process-commodity ratios CSV file
#[derive(PartialEq, Debug, Deserialize)]
pub struct ProcessCommodityRaw {
    /// The process the ratio belongs to
    pub process_id: ProcessID,
    /// The commodity consumed or produced
    pub commodity_id: CommodityID,
    /// Whether the commodity flows into or out of the process
    pub direction: FlowDirection,
    /// Conversion efficiency contribution of this commodity
    pub ratio: Dimensionless,
}

/// Conversion ratios for every process, keyed by (process, commodity, direction).
///
/// Lookups on partially specified keys return entries in insertion order, so repeated range
/// queries are deterministic.
#[derive(PartialEq, Debug, Default)]
pub struct RatioMap(IndexMap<(ProcessID, CommodityID, FlowDirection), Dimensionless>);

impl RatioMap {
    /// Create a new, empty [`RatioMap`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a ratio, returning the previous value if the key was already present
    pub fn insert(
        &mut self,
        process_id: ProcessID,
        commodity_id: CommodityID,
        direction: FlowDirection,
        ratio: Dimensionless,
    ) -> Option<Dimensionless> {
        self.0.insert((process_id, commodity_id, direction), ratio)
    }

    /// Retrieve the ratio for a fully specified key, if present
    pub fn get(
        &self,
        process_id: &ProcessID,
        commodity_id: &CommodityID,
        direction: FlowDirection,
    ) -> Option<Dimensionless> {
        self.0
            .get(&(process_id.clone(), commodity_id.clone(), direction))
            .copied()
    }

    /// Whether the given process produces the given commodity
    pub fn has_output(&self, process_id: &ProcessID, commodity_id: &CommodityID) -> bool {
        self.get(process_id, commodity_id, FlowDirection::Out)
            .is_some()
    }

    /// Iterate over the entries for one process in the given direction
    pub fn flows_for(
        &self,
        process_id: &ProcessID,
        direction: FlowDirection,
    ) -> impl Iterator<Item = (&CommodityID, Dimensionless)> {
        self.0.iter().filter_map(move |((pro, com, dir), ratio)| {
            (pro == process_id && *dir == direction).then_some((com, *ratio))
        })
    }

    /// Iterate over all entries
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&ProcessID, &CommodityID, FlowDirection, Dimensionless)> {
        self.0
            .iter()
            .map(|((pro, com, dir), ratio)| (pro, com, *dir, *ratio))
    }
}
