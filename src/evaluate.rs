//! The LCOE evaluation engine.
//!
//! For every site and main commodity, the engine walks the user's requested process list,
//! classifies each process (intermittent "regular" producer, dispatchable "conventional"
//! producer, or chain link feeding a downstream producer) and resolves its fuel cost, falling
//! back to the computed cost of its chain predecessor when no market price exists.
use crate::commodity::{CommodityID, CommodityType};
use crate::finance::CostTerms;
use crate::model::Model;
use crate::process::ProcessID;
use crate::site::SiteID;
use crate::units::{Hours, MoneyPerEnergy};
use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use log::{error, warn};
use std::rc::Rc;

/// The number of operating hours in a year; conventional cost curves span 1..=8760
pub const HOURS_PER_YEAR: u32 = 8760;

/// A user request naming the processes to evaluate and an optional process chain.
///
/// The chain is an ordered sequence of processes representing a physical fuel-supply
/// dependency, upstream first (e.g. a gasifier feeding a gas turbine).
#[derive(PartialEq, Debug, Default)]
pub struct EvaluationRequest {
    /// The processes to evaluate, in evaluation order
    pub processes: Vec<ProcessID>,
    /// The declared process chain (may be empty)
    pub chain: Vec<ProcessID>,
}

impl EvaluationRequest {
    /// Parse a request from comma-separated process and chain strings.
    ///
    /// Entries are trimmed of surrounding whitespace; an empty chain string means "no chain",
    /// not a one-element chain containing an empty name.
    pub fn from_strs(processes: &str, chain: &str) -> Self {
        Self {
            processes: parse_process_list(processes),
            chain: parse_process_list(chain),
        }
    }
}

/// Parse a comma-separated list of process names, ignoring empty entries
fn parse_process_list(input: &str) -> Vec<ProcessID> {
    input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ProcessID::from)
        .collect()
}

/// A resolved fuel cost: either a flat price or an upstream process's hourly cost curve
#[derive(PartialEq, Debug, Clone)]
pub enum FuelCost {
    /// A single price per unit of energy
    Flat(MoneyPerEnergy),
    /// A cost curve over operating hours 1..=8760
    PerHour(Rc<Vec<MoneyPerEnergy>>),
}

impl FuelCost {
    /// The fuel cost at the given operating hour (curves are sampled, flat costs returned as-is)
    fn at_hour(&self, hour: u32) -> MoneyPerEnergy {
        match self {
            Self::Flat(cost) => *cost,
            Self::PerHour(curve) => curve[(hour.clamp(1, HOURS_PER_YEAR) - 1) as usize],
        }
    }
}

/// The LCOE of an intermittent-supply process, valid at its full-load hours
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct RegularLcoe {
    /// The full-load hours at which the process operates
    pub full_load_hours: u32,
    /// The levelized cost at that operating point
    pub value: MoneyPerEnergy,
}

/// The result tables accumulated for one (site, commodity) pair.
///
/// Both tables may be empty; that is a valid result, not an error.
#[derive(PartialEq, Debug)]
pub struct CommodityResults {
    /// The commodity the results refer to
    pub commodity_id: CommodityID,
    /// Scalar results for intermittent-supply processes, indexed by their full-load hours
    pub regular: IndexMap<ProcessID, RegularLcoe>,
    /// Cost curves over operating hours 1..=8760 for dispatchable processes
    pub conventional: IndexMap<ProcessID, Rc<Vec<MoneyPerEnergy>>>,
}

impl CommodityResults {
    fn new(commodity_id: CommodityID) -> Self {
        Self {
            commodity_id,
            regular: IndexMap::new(),
            conventional: IndexMap::new(),
        }
    }

    /// Whether no process produced a result for this commodity
    pub fn is_empty(&self) -> bool {
        self.regular.is_empty() && self.conventional.is_empty()
    }
}

/// All result tables for one site, one entry per main commodity
#[derive(PartialEq, Debug)]
pub struct SiteResults {
    /// The site the results refer to
    pub site_id: SiteID,
    /// Per-commodity result tables, in evaluation order
    pub commodities: Vec<CommodityResults>,
}

impl SiteResults {
    /// Look up a process's cost in the combined per-site table (all commodities evaluated so
    /// far), conventional columns before regular ones, in evaluation order.
    fn lookup_process(&self, process_id: &ProcessID) -> Option<FuelCost> {
        self.commodities.iter().find_map(|results| {
            results
                .conventional
                .get(process_id)
                .map(|curve| FuelCost::PerHour(Rc::clone(curve)))
                .or_else(|| {
                    results
                        .regular
                        .get(process_id)
                        .map(|lcoe| FuelCost::Flat(lcoe.value))
                })
        })
    }
}

/// A cursor into the process chain, reset for every (site, commodity) pair.
///
/// The cursor tracks how much of the chain has been consumed; processes before it are no longer
/// eligible as chain links.
struct ChainCursor<'a> {
    chain: &'a [ProcessID],
    pos: usize,
}

impl<'a> ChainCursor<'a> {
    fn new(chain: &'a [ProcessID]) -> Self {
        Self { chain, pos: 0 }
    }

    /// Advance past a consumed chain entry.
    ///
    /// NB: the last two chain entries never advance the cursor. This boundary behaviour is
    /// deliberate and pinned by tests; the final link's fuel lookup must still see its
    /// predecessor in the unconsumed suffix.
    fn advance(&mut self) {
        if self.pos + 2 < self.chain.len() {
            self.pos += 1;
        }
    }

    /// Advance only if the given process is a chain member
    fn advance_for(&mut self, process_id: &ProcessID) {
        if self.chain.contains(process_id) {
            self.advance();
        }
    }

    /// Classify a process as a chain link producing an intermediate commodity.
    ///
    /// Applies when the process lies in the unconsumed chain suffix and the *next* chain
    /// entry produces the main commodity; the evaluation key is then the next entry's fuel
    /// commodity (the intermediate this process produces).
    fn intermediate_commodity(
        &self,
        model: &Model,
        site_id: &SiteID,
        process_id: &ProcessID,
        main_commodity: &CommodityID,
    ) -> Option<CommodityID> {
        if !self.chain[self.pos..].contains(process_id) {
            return None;
        }

        let next = self.chain.get(self.pos + 1)?;
        if !model.ratios.has_output(next, main_commodity) {
            return None;
        }

        model.fuel_commodity(site_id, next).ok().cloned()
    }
}

/// Evaluate the requested processes for every site and main commodity in the model.
///
/// Recoverable problems (unknown requested processes, domain errors local to a single process)
/// are logged and skipped; the returned results contain whatever could be computed.
pub fn evaluate_model(model: &Model, request: &EvaluationRequest) -> Vec<SiteResults> {
    let universe = model.process_universe();

    model
        .sites
        .keys()
        .map(|site_id| {
            let mut site_results = SiteResults {
                site_id: site_id.clone(),
                commodities: Vec::new(),
            };
            for commodity_id in model.main_commodities(site_id) {
                let results =
                    evaluate_commodity(model, site_id, commodity_id, request, &universe, &site_results);
                site_results.commodities.push(results);
            }

            site_results
        })
        .collect()
}

/// Evaluate the requested process list for a single (site, main-commodity) pair
fn evaluate_commodity(
    model: &Model,
    site_id: &SiteID,
    main_commodity: &CommodityID,
    request: &EvaluationRequest,
    universe: &IndexSet<ProcessID>,
    earlier: &SiteResults,
) -> CommodityResults {
    let mut results = CommodityResults::new(main_commodity.clone());
    let mut cursor = ChainCursor::new(&request.chain);

    for process_id in &request.processes {
        if !universe.contains(process_id) {
            warn!(
                "{process_id} is not a valid process; valid choices are: {}. \
                Skipping the remaining requested processes for commodity {main_commodity}.",
                universe.iter().join(", ")
            );
            break;
        }

        if model.process(site_id, process_id).is_none() {
            // The process cannot be built at this site
            continue;
        }

        if model.ratios.has_output(process_id, main_commodity) {
            // A direct producer of the main commodity
            if let Err(err) = evaluate_process(
                model,
                site_id,
                process_id,
                main_commodity,
                request,
                &mut results,
                earlier,
            ) {
                error!("Skipping process {process_id} at site {site_id}: {err:#}");
            }
            cursor.advance_for(process_id);
        } else if let Some(intermediate) =
            cursor.intermediate_commodity(model, site_id, process_id, main_commodity)
        {
            // A chain link producing the intermediate commodity feeding the next chain entry
            if let Err(err) = evaluate_process(
                model,
                site_id,
                process_id,
                &intermediate,
                request,
                &mut results,
                earlier,
            ) {
                error!("Skipping process {process_id} at site {site_id}: {err:#}");
            }
            cursor.advance();
        }
        // Otherwise the process is irrelevant to this commodity; not an error
    }

    results
}

/// Compute the LCOE of one process and append it to the per-commodity accumulators.
///
/// `eval_commodity` is the commodity whose output ratio defines the process's efficiency: the
/// main commodity for direct producers, or the intermediate commodity for chain links.
fn evaluate_process(
    model: &Model,
    site_id: &SiteID,
    process_id: &ProcessID,
    eval_commodity: &CommodityID,
    request: &EvaluationRequest,
    results: &mut CommodityResults,
    earlier: &SiteResults,
) -> Result<()> {
    let process = model
        .process(site_id, process_id)
        .context("Process not declared at site")?;
    let efficiency = model
        .ratios
        .get(process_id, eval_commodity, crate::process::FlowDirection::Out)
        .with_context(|| format!("Process has no output ratio for commodity {eval_commodity}"))?;
    let total_efficiency = model.total_efficiency(site_id, process_id);
    let terms = CostTerms::new(process, efficiency, total_efficiency, model.co2_cost(process_id))?;

    let fuel_commodity = model.fuel_commodity(site_id, process_id)?;
    let market_price = model.commodity_price(site_id, fuel_commodity);
    let fuel_cost = resolve_fuel_cost(request, process_id, market_price, results, earlier);

    if model.commodity_kind(site_id, fuel_commodity) == Some(CommodityType::SupplyIntermittent) {
        // Regular process: a single value at the supply series' full-load hours
        let full_load_hours = model
            .full_load_hours(site_id, fuel_commodity)
            .with_context(|| {
                format!("No supply-intermittency series for commodity {fuel_commodity}")
            })?;
        let hour = full_load_hours.value() as u32;
        let value = terms.at(full_load_hours, fuel_cost.at_hour(hour))?;
        results.regular.insert(
            process_id.clone(),
            RegularLcoe {
                full_load_hours: hour,
                value,
            },
        );
    } else {
        // Conventional process: a cost curve over every possible operating-hour level
        let curve: Vec<MoneyPerEnergy> = (1..=HOURS_PER_YEAR)
            .map(|hour| terms.at(Hours(hour as f64), fuel_cost.at_hour(hour)))
            .collect::<Result<_>>()?;
        results
            .conventional
            .insert(process_id.clone(), Rc::new(curve));
    }

    Ok(())
}

/// Resolve a process's fuel cost.
///
/// The market price applies unless the process is a chain member whose declared price is
/// exactly zero; in that case the cost of the chain predecessor is substituted, trying an
/// ordered sequence of lookups: the current commodity's regular table, its conventional table,
/// the combined per-site table, and finally a default of zero. A missing entry in one tier is
/// not an error; the next tier is simply tried.
fn resolve_fuel_cost(
    request: &EvaluationRequest,
    process_id: &ProcessID,
    market_price: MoneyPerEnergy,
    results: &CommodityResults,
    earlier: &SiteResults,
) -> FuelCost {
    if market_price != MoneyPerEnergy(0.0) {
        return FuelCost::Flat(market_price);
    }
    let Some(position) = request.chain.iter().position(|p| p == process_id) else {
        return FuelCost::Flat(market_price);
    };
    let Some(predecessor) = position.checked_sub(1).map(|i| &request.chain[i]) else {
        // The first chain entry has no predecessor to take a cost from
        return FuelCost::Flat(market_price);
    };

    let lookups: [&dyn Fn() -> Option<FuelCost>; 3] = [
        &|| {
            results
                .regular
                .get(predecessor)
                .map(|lcoe| FuelCost::Flat(lcoe.value))
        },
        &|| {
            results
                .conventional
                .get(predecessor)
                .map(|curve| FuelCost::PerHour(Rc::clone(curve)))
        },
        &|| earlier.lookup_process(predecessor),
    ];

    lookups
        .iter()
        .find_map(|lookup| lookup())
        .unwrap_or(FuelCost::Flat(MoneyPerEnergy(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::annuity_factor;
    use crate::fixture::{chain_model, model};
    use crate::units::Dimensionless;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[test]
    fn test_parse_request() {
        let request = EvaluationRequest::from_strs("Wind park, Gas plant", "");
        assert_eq!(
            request.processes,
            vec![ProcessID::new("Wind park"), ProcessID::new("Gas plant")]
        );

        // An empty chain string means no chain, not a one-element chain
        assert!(request.chain.is_empty());
        assert_eq!(
            request,
            EvaluationRequest {
                processes: vec![ProcessID::new("Wind park"), ProcessID::new("Gas plant")],
                chain: Vec::new(),
            }
        );
    }

    #[test]
    fn test_chain_cursor_boundary() {
        let chain: Vec<ProcessID> = ["a", "b", "c", "d"].into_iter().map(Into::into).collect();
        let mut cursor = ChainCursor::new(&chain);

        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.pos, 2);

        // The last two chain entries never advance the cursor further
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.pos, 2);

        // A two-element chain never advances at all
        let chain: Vec<ProcessID> = ["a", "b"].into_iter().map(Into::into).collect();
        let mut cursor = ChainCursor::new(&chain);
        cursor.advance();
        assert_eq!(cursor.pos, 0);
    }

    fn empty_site_results() -> SiteResults {
        SiteResults {
            site_id: "South".into(),
            commodities: Vec::new(),
        }
    }

    fn results_with_conventional(process_id: &str) -> CommodityResults {
        let mut results = CommodityResults::new("Elec".into());
        results.conventional.insert(
            process_id.into(),
            Rc::new(vec![MoneyPerEnergy(7.0); HOURS_PER_YEAR as usize]),
        );
        results
    }

    #[test]
    fn test_resolve_fuel_cost_market_price_wins() {
        let request = EvaluationRequest::from_strs("B", "A, B");
        let resolved = resolve_fuel_cost(
            &request,
            &"B".into(),
            MoneyPerEnergy(27.0),
            &results_with_conventional("A"),
            &empty_site_results(),
        );
        assert_eq!(resolved, FuelCost::Flat(MoneyPerEnergy(27.0)));
    }

    #[test]
    fn test_resolve_fuel_cost_uses_conventional_tier() {
        // The regular table lacks the predecessor but the conventional table has it; the
        // conventional value must be used rather than the zero default
        let request = EvaluationRequest::from_strs("B", "A, B");
        let resolved = resolve_fuel_cost(
            &request,
            &"B".into(),
            MoneyPerEnergy(0.0),
            &results_with_conventional("A"),
            &empty_site_results(),
        );
        assert_eq!(resolved.at_hour(1), MoneyPerEnergy(7.0));
        assert!(matches!(resolved, FuelCost::PerHour(_)));
    }

    #[test]
    fn test_resolve_fuel_cost_site_table_tier() {
        let request = EvaluationRequest::from_strs("B", "A, B");
        let earlier = SiteResults {
            site_id: "South".into(),
            commodities: vec![results_with_conventional("A")],
        };
        let resolved = resolve_fuel_cost(
            &request,
            &"B".into(),
            MoneyPerEnergy(0.0),
            &CommodityResults::new("Heat".into()),
            &earlier,
        );
        assert!(matches!(resolved, FuelCost::PerHour(_)));
    }

    #[test]
    fn test_resolve_fuel_cost_defaults_to_zero() {
        let request = EvaluationRequest::from_strs("B", "A, B");
        let resolved = resolve_fuel_cost(
            &request,
            &"B".into(),
            MoneyPerEnergy(0.0),
            &CommodityResults::new("Elec".into()),
            &empty_site_results(),
        );
        assert_eq!(resolved, FuelCost::Flat(MoneyPerEnergy(0.0)));
    }

    #[test]
    fn test_resolve_fuel_cost_first_chain_entry() {
        // The first chain entry has no predecessor; its (zero) market price stands
        let request = EvaluationRequest::from_strs("A", "A, B");
        let resolved = resolve_fuel_cost(
            &request,
            &"A".into(),
            MoneyPerEnergy(0.0),
            &results_with_conventional("B"),
            &empty_site_results(),
        );
        assert_eq!(resolved, FuelCost::Flat(MoneyPerEnergy(0.0)));
    }

    #[rstest]
    fn test_evaluate_model_regular_value(model: Model) {
        let request = EvaluationRequest::from_strs("Wind park", "");
        let results = evaluate_model(&model, &request);

        assert_eq!(results.len(), 1);
        let elec = &results[0].commodities[0];
        let lcoe = &elec.regular[&ProcessID::new("Wind park")];
        assert_eq!(lcoe.full_load_hours, 2000);

        // (inv * annuity(0.08, 20) + fix) / FLH + var, with eff == total_eff and no fuel cost
        let annuity = annuity_factor(Dimensionless(0.08), 20).unwrap();
        let expected = (1000.0 * annuity.0 + 50.0) / 2000.0 + 5.0;
        assert_approx_eq!(f64, lcoe.value.value(), expected, epsilon = 1e-10);
    }

    #[rstest]
    fn test_evaluate_model_conventional_curve(model: Model) {
        let request = EvaluationRequest::from_strs("Gas plant", "");
        let results = evaluate_model(&model, &request);

        let elec = &results[0].commodities[0];
        let curve = &elec.conventional[&ProcessID::new("Gas plant")];
        assert_eq!(curve.len(), HOURS_PER_YEAR as usize);

        // Costs fall monotonically as operating hours grow
        assert!(curve.windows(2).all(|pair| pair[1] <= pair[0]));
    }

    #[rstest]
    fn test_evaluate_model_unknown_process_aborts_list(model: Model) {
        // The valid process before the unknown one is evaluated; the one after it is not
        let request = EvaluationRequest::from_strs("Wind park, Nonsense, Gas plant", "");
        let results = evaluate_model(&model, &request);

        let elec = &results[0].commodities[0];
        assert!(elec.regular.contains_key("Wind park"));
        assert!(elec.conventional.is_empty());
    }

    #[rstest]
    fn test_evaluate_model_fuelless_process_treated_as_unknown(mut model: Model) {
        // A process whose only input is a demand commodity has no fuel to cost; requesting it
        // triggers the unknown-process warning and aborts the list, like any invalid name
        let heater = crate::process::Process {
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
            crate::process::FlowDirection::In,
            Dimensionless(1.0),
        );

        let request = EvaluationRequest::from_strs("Heater, Gas plant", "");
        let results = evaluate_model(&model, &request);
        assert!(results[0].commodities[0].is_empty());
    }

    #[rstest]
    fn test_evaluate_model_chain_substitutes_regular_lcoe(mut model: Model) {
        // Two-element chain [Wind park, Gas plant] with an unpriced fuel: the downstream
        // process's fuel cost must be the upstream computed LCOE, not the market price
        model
            .commodities
            .get_mut(&("South".into(), "Gas".into()))
            .unwrap()
            .price = MoneyPerEnergy(0.0);

        let request = EvaluationRequest::from_strs("Wind park, Gas plant", "Wind park, Gas plant");
        let results = evaluate_model(&model, &request);
        let elec = &results[0].commodities[0];

        let wind = elec.regular[&ProcessID::new("Wind park")];
        let gas_curve = &elec.conventional[&ProcessID::new("Gas plant")];

        // Closed form at hour 100 for the Gas plant with the substituted fuel cost
        let hour = 100;
        let annuity = annuity_factor(Dimensionless(0.07), 30).unwrap();
        let expected = (((450.0 * annuity.0 + 6.0) / hour as f64)
            + 1.62
            + (wind.value.value() + 0.2) / 0.6)
            * (0.6 / 0.6);
        assert_approx_eq!(
            f64,
            gas_curve[hour as usize - 1].value(),
            expected,
            epsilon = 1e-10
        );
    }

    #[rstest]
    fn test_evaluate_model_chain_intermediate_commodity(chain_model: Model) {
        let request =
            EvaluationRequest::from_strs("Gasifier, Gas turbine", "Gasifier, Gas turbine");
        let results = evaluate_model(&chain_model, &request);

        let elec = &results[0].commodities[0];
        let gasifier = &elec.conventional[&ProcessID::new("Gasifier")];
        let turbine = &elec.conventional[&ProcessID::new("Gas turbine")];

        // The turbine's unpriced syngas input takes the gasifier's hourly cost curve
        let hour = 500;
        let annuity = annuity_factor(Dimensionless(0.07), 25).unwrap();
        let expected = (((800.0 * annuity.0 + 20.0) / hour as f64)
            + 2.0
            + gasifier[hour - 1].value() / 0.45)
            * (0.45 / 0.45);
        assert_approx_eq!(f64, turbine[hour - 1].value(), expected, epsilon = 1e-10);
    }

    #[rstest]
    fn test_evaluate_model_irrelevant_process_skipped(chain_model: Model) {
        // The gasifier alone produces no electricity and is not a chain link without a chain,
        // so requesting it yields an empty (but well-formed) result
        let request = EvaluationRequest::from_strs("Gasifier", "");
        let results = evaluate_model(&chain_model, &request);
        assert!(results[0].commodities[0].is_empty());
    }

    #[rstest]
    fn test_evaluate_model_idempotent(model: Model) {
        let request = EvaluationRequest::from_strs("Wind park, Gas plant", "");
        assert_eq!(
            evaluate_model(&model, &request),
            evaluate_model(&model, &request)
        );
    }
}
