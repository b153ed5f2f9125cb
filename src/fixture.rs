//! Common fixtures for tests
use crate::commodity::{Commodity, CommodityID, CommodityMap, CommodityType};
use crate::model::{DemandMap, FullLoadHoursMap, Model};
use crate::process::{FlowDirection, Process, ProcessMap, RatioMap};
use crate::site::{Site, SiteID, SiteMap};
use crate::units::{Dimensionless, Energy, Hours, MoneyPerCapacity, MoneyPerEnergy};
use rstest::fixture;

/// A wind-park process with typical onshore cost parameters
#[fixture]
pub fn process() -> Process {
    Process {
        site_id: "South".into(),
        id: "Wind park".into(),
        inv_cost: MoneyPerCapacity(1000.0),
        fix_cost: MoneyPerCapacity(50.0),
        var_cost: MoneyPerEnergy(5.0),
        wacc: Dimensionless(0.08),
        depreciation: 20,
    }
}

fn commodity(
    site_id: &str,
    id: &str,
    kind: CommodityType,
    price: f64,
) -> ((SiteID, CommodityID), Commodity) {
    (
        (site_id.into(), id.into()),
        Commodity {
            site_id: site_id.into(),
            id: id.into(),
            kind,
            price: MoneyPerEnergy(price),
        },
    )
}

/// A single-site model with an intermittent wind park and a dispatchable gas plant, both
/// producing electricity
#[fixture]
pub fn model(process: Process) -> Model {
    let sites: SiteMap = [(
        "South".into(),
        Site {
            id: "South".into(),
            description: "Reference site".into(),
        },
    )]
    .into_iter()
    .collect();

    let commodities: CommodityMap = [
        commodity("South", "Elec", CommodityType::Demand, 0.0),
        commodity("South", "Wind", CommodityType::SupplyIntermittent, 0.0),
        commodity("South", "Gas", CommodityType::Stock, 27.0),
        commodity("South", "CO2", CommodityType::Environmental, 0.0),
    ]
    .into_iter()
    .collect();

    let gas_plant = Process {
        site_id: "South".into(),
        id: "Gas plant".into(),
        inv_cost: MoneyPerCapacity(450.0),
        fix_cost: MoneyPerCapacity(6.0),
        var_cost: MoneyPerEnergy(1.62),
        wacc: Dimensionless(0.07),
        depreciation: 30,
    };
    let processes: ProcessMap = [process, gas_plant]
        .into_iter()
        .map(|process| ((process.site_id.clone(), process.id.clone()), process))
        .collect();

    let mut ratios = RatioMap::new();
    ratios.insert("Wind park".into(), "Wind".into(), FlowDirection::In, Dimensionless(1.0));
    ratios.insert("Wind park".into(), "Elec".into(), FlowDirection::Out, Dimensionless(0.4));
    ratios.insert("Gas plant".into(), "Gas".into(), FlowDirection::In, Dimensionless(1.0));
    ratios.insert("Gas plant".into(), "Elec".into(), FlowDirection::Out, Dimensionless(0.6));
    ratios.insert("Gas plant".into(), "CO2".into(), FlowDirection::Out, Dimensionless(0.2));

    let demand: DemandMap = [(("South".into(), "Elec".into()), Energy(930.0))]
        .into_iter()
        .collect();
    let full_load_hours: FullLoadHoursMap =
        [(("South".into(), "Wind".into()), Hours(2000.0))].into_iter().collect();

    Model {
        sites,
        commodities,
        processes,
        ratios,
        demand,
        full_load_hours,
    }
}

/// A model whose electricity is produced by a gasifier feeding a gas turbine through an
/// unpriced syngas commodity
#[fixture]
pub fn chain_model() -> Model {
    let sites: SiteMap = [(
        "North".into(),
        Site {
            id: "North".into(),
            description: "Chain site".into(),
        },
    )]
    .into_iter()
    .collect();

    let commodities: CommodityMap = [
        commodity("North", "Elec", CommodityType::Demand, 0.0),
        commodity("North", "Biomass", CommodityType::Stock, 9.0),
        commodity("North", "Syngas", CommodityType::Stock, 0.0),
    ]
    .into_iter()
    .collect();

    let gasifier = Process {
        site_id: "North".into(),
        id: "Gasifier".into(),
        inv_cost: MoneyPerCapacity(600.0),
        fix_cost: MoneyPerCapacity(15.0),
        var_cost: MoneyPerEnergy(1.0),
        wacc: Dimensionless(0.06),
        depreciation: 20,
    };
    let turbine = Process {
        site_id: "North".into(),
        id: "Gas turbine".into(),
        inv_cost: MoneyPerCapacity(800.0),
        fix_cost: MoneyPerCapacity(20.0),
        var_cost: MoneyPerEnergy(2.0),
        wacc: Dimensionless(0.07),
        depreciation: 25,
    };
    let processes: ProcessMap = [gasifier, turbine]
        .into_iter()
        .map(|process| ((process.site_id.clone(), process.id.clone()), process))
        .collect();

    let mut ratios = RatioMap::new();
    ratios.insert("Gasifier".into(), "Biomass".into(), FlowDirection::In, Dimensionless(1.0));
    ratios.insert("Gasifier".into(), "Syngas".into(), FlowDirection::Out, Dimensionless(0.8));
    ratios.insert("Gas turbine".into(), "Syngas".into(), FlowDirection::In, Dimensionless(1.0));
    ratios.insert("Gas turbine".into(), "Elec".into(), FlowDirection::Out, Dimensionless(0.45));

    let demand: DemandMap = [(("North".into(), "Elec".into()), Energy(500.0))]
        .into_iter()
        .collect();

    Model {
        sites,
        commodities,
        processes,
        ratios,
        demand,
        full_load_hours: FullLoadHoursMap::new(),
    }
}
