//! Code for evaluation models: the relational tables loaded from a model directory, along with
//! the joins the evaluation engine performs on them.
use crate::commodity::{CO2_COMMODITY_ID, CommodityMap, CommodityType};
use crate::process::{FlowDirection, Process, ProcessMap, RatioMap};
use crate::site::SiteMap;
use crate::units::{Dimensionless, Energy, Hours, MoneyPerEnergy};
use crate::{commodity::CommodityID, process::ProcessID, site::SiteID};
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, IndexSet};

/// Annual demand per site and commodity
pub type DemandMap = IndexMap<(SiteID, CommodityID), Energy>;

/// Full-load hours per site and intermittent-supply commodity
pub type FullLoadHoursMap = IndexMap<(SiteID, CommodityID), Hours>;

/// An evaluation model: every table is loaded once and read many times during the site loop.
///
/// All maps preserve file order, so range lookups on partially specified keys are deterministic
/// between runs.
pub struct Model {
    /// The sites making up the energy system
    pub sites: SiteMap,
    /// Commodities declared per site
    pub commodities: CommodityMap,
    /// Process cost parameters per site
    pub processes: ProcessMap,
    /// Process-commodity conversion ratios
    pub ratios: RatioMap,
    /// Annual demand sums; a commodity with demand at a site is a "main" commodity there
    pub demand: DemandMap,
    /// Full-load hours, i.e. the sum of each intermittent-supply capacity-fraction series
    pub full_load_hours: FullLoadHoursMap,
}

impl Model {
    /// The main commodities to evaluate at a site (those with demand declared)
    pub fn main_commodities<'a>(
        &'a self,
        site_id: &'a SiteID,
    ) -> impl Iterator<Item = &'a CommodityID> {
        self.demand
            .keys()
            .filter_map(move |(site, commodity)| (site == site_id).then_some(commodity))
    }

    /// Look up a process's cost parameters at a site
    pub fn process(&self, site_id: &SiteID, process_id: &ProcessID) -> Option<&Process> {
        self.processes
            .get(&(site_id.clone(), process_id.clone()))
    }

    /// The balance type of a commodity at a site
    pub fn commodity_kind(
        &self,
        site_id: &SiteID,
        commodity_id: &CommodityID,
    ) -> Option<CommodityType> {
        self.commodities
            .get(&(site_id.clone(), commodity_id.clone()))
            .map(|commodity| commodity.kind)
    }

    /// The market price of a commodity at a site (0 if the commodity is not traded)
    pub fn commodity_price(&self, site_id: &SiteID, commodity_id: &CommodityID) -> MoneyPerEnergy {
        self.commodities
            .get(&(site_id.clone(), commodity_id.clone()))
            .map_or(MoneyPerEnergy(0.0), |commodity| commodity.price)
    }

    /// The commodity fuelling a process: its first input of stock or intermittent-supply type
    pub fn fuel_commodity(
        &self,
        site_id: &SiteID,
        process_id: &ProcessID,
    ) -> Result<&CommodityID> {
        self.ratios
            .flows_for(process_id, FlowDirection::In)
            .map(|(commodity_id, _)| commodity_id)
            .find(|commodity_id| {
                matches!(
                    self.commodity_kind(site_id, commodity_id),
                    Some(CommodityType::Stock | CommodityType::SupplyIntermittent)
                )
            })
            .with_context(|| {
                format!(
                    "Process {process_id} at site {site_id} has no stock or \
                    intermittent-supply input commodity"
                )
            })
    }

    /// The process's total conversion efficiency: the sum of its output ratios to all
    /// non-environmental commodities
    pub fn total_efficiency(&self, site_id: &SiteID, process_id: &ProcessID) -> Dimensionless {
        self.ratios
            .flows_for(process_id, FlowDirection::Out)
            .filter(|(commodity_id, _)| {
                self.commodity_kind(site_id, commodity_id) != Some(CommodityType::Environmental)
            })
            .fold(Dimensionless(0.0), |total, (_, ratio)| total + ratio)
    }

    /// The process's CO2 output ratio, applied directly as an emission cost factor.
    ///
    /// Defaults to 0 for processes without a CO2 output.
    pub fn co2_cost(&self, process_id: &ProcessID) -> MoneyPerEnergy {
        let ratio = self
            .ratios
            .get(process_id, &CO2_COMMODITY_ID.into(), FlowDirection::Out)
            .unwrap_or(Dimensionless(0.0));
        MoneyPerEnergy(ratio.0)
    }

    /// The set of processes that can be costed: those consuming a stock or intermittent-supply
    /// commodity at their site.
    ///
    /// These are the valid choices for an evaluation request; a process without a fuel input
    /// has no cost to levelize.
    pub fn process_universe(&self) -> IndexSet<ProcessID> {
        self.processes
            .keys()
            .filter(|(site_id, process_id)| self.fuel_commodity(site_id, process_id).is_ok())
            .map(|(_, process_id)| process_id.clone())
            .collect()
    }

    /// The full-load hours of an intermittent-supply commodity at a site
    pub fn full_load_hours(&self, site_id: &SiteID, commodity_id: &CommodityID) -> Option<Hours> {
        self.full_load_hours
            .get(&(site_id.clone(), commodity_id.clone()))
            .copied()
    }

    /// Check relational integrity between the process-commodity and commodity tables.
    ///
    /// Every commodity consumed or produced by a process at a site must be declared for that
    /// site, otherwise the evaluation's joins would silently come up empty.
    pub fn validate(&self) -> Result<()> {
        for (site_id, process_id) in self.processes.keys() {
            for (_, commodity_id, _, _) in
                self.ratios.iter().filter(|(pro, ..)| *pro == process_id)
            {
                ensure!(
                    self.commodities
                        .contains_key(&(site_id.clone(), commodity_id.clone())),
                    "Commodities used by a process at a site must be declared for that site: \
                    commodity {commodity_id} (process {process_id}) is missing for site {site_id}"
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::model;
    use itertools::assert_equal;
    use rstest::rstest;

    #[rstest]
    fn test_main_commodities(model: Model) {
        let site = SiteID::new("South");
        assert_equal(model.main_commodities(&site), [&CommodityID::new("Elec")]);
    }

    #[rstest]
    fn test_fuel_commodity(model: Model) {
        let site = SiteID::new("South");
        assert_eq!(
            model.fuel_commodity(&site, &"Wind park".into()).unwrap(),
            &CommodityID::new("Wind")
        );
        assert_eq!(
            model.fuel_commodity(&site, &"Gas plant".into()).unwrap(),
            &CommodityID::new("Gas")
        );
        assert!(model.fuel_commodity(&site, &"Unknown".into()).is_err());
    }

    #[rstest]
    fn test_total_efficiency_excludes_environmental(model: Model) {
        let site = SiteID::new("South");

        // The Gas plant has Out ratios of 0.6 (Elec) and 0.2 (CO2); only the former counts
        assert_eq!(
            model.total_efficiency(&site, &"Gas plant".into()),
            Dimensionless(0.6)
        );
    }

    #[rstest]
    fn test_co2_cost_defaults_to_zero(model: Model) {
        assert_eq!(model.co2_cost(&"Gas plant".into()), MoneyPerEnergy(0.2));
        assert_eq!(model.co2_cost(&"Wind park".into()), MoneyPerEnergy(0.0));
    }

    #[rstest]
    fn test_process_universe_requires_fuel_input(mut model: Model) {
        assert_equal(
            model.process_universe(),
            [ProcessID::new("Wind park"), ProcessID::new("Gas plant")],
        );

        // A process whose only input is not a stock or intermittent-supply commodity has no fuel
        // and is not a valid evaluation choice
        let heater = Process {
            site_id: "South".into(),
            id: "Heater".into(),
            inv_cost: crate::units::MoneyPerCapacity(100.0),
            fix_cost: crate::units::MoneyPerCapacity(5.0),
            var_cost: MoneyPerEnergy(1.0),
            wacc: Dimensionless(0.05),
            depreciation: 10,
        };
        model
            .processes
            .insert(("South".into(), "Heater".into()), heater);
        model.ratios.insert(
            "Heater".into(),
            "Elec".into(),
            FlowDirection::In,
            Dimensionless(1.0),
        );

        assert!(!model.process_universe().contains("Heater"));
    }

    #[rstest]
    fn test_validate_ok(model: Model) {
        assert!(model.validate().is_ok());
    }

    #[rstest]
    fn test_validate_missing_commodity(mut model: Model) {
        let site = SiteID::new("South");
        model
            .commodities
            .shift_remove(&(site, CommodityID::new("Gas")))
            .unwrap();
        assert!(model.validate().is_err());
    }
}
