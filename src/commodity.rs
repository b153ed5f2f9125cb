//! Commodities are the energy carriers, resources and emissions flowing into and out of
//! processes. They are declared per site, along with their market price where one exists.
use crate::id::define_id_type;
use crate::site::SiteID;
use crate::units::MoneyPerEnergy;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;

define_id_type! {CommodityID}

/// The commodity against which emission cost ratios are accounted
pub const CO2_COMMODITY_ID: &str = "CO2";

/// A map of [`Commodity`]s, keyed by site and commodity ID
pub type CommodityMap = IndexMap<(SiteID, CommodityID), Commodity>;

/// A commodity as declared for a particular site
#[derive(PartialEq, Debug)]
pub struct Commodity {
    /// The site at which the commodity is declared
    pub site_id: SiteID,
    /// A unique identifier for the commodity (e.g. "Elec")
    pub id: CommodityID,
    /// The commodity's balance type
    pub kind: CommodityType,
    /// Market price per unit of energy. Zero if the commodity is not traded.
    pub price: MoneyPerEnergy,
}

/// Commodity balance type.
///
/// The type decides how a process consuming the commodity is evaluated: an intermittent supply
/// yields a single cost value at its full-load hours, while a stock-fuelled process can be
/// dispatched at any operating-hour level and yields a cost curve.
#[derive(PartialEq, Eq, Clone, Copy, Debug, DeserializeLabeledStringEnum)]
pub enum CommodityType {
    /// Intermittent supply, described by a per-timestep capacity-fraction time series
    #[string = "SupIm"]
    SupplyIntermittent,
    /// A freely purchasable stock commodity (e.g. a fuel)
    #[string = "Stock"]
    Stock,
    /// A commodity with a demand time series (the "main" commodities under evaluation)
    #[string = "Demand"]
    Demand,
    /// An environmental commodity (e.g. CO2)
    #[string = "Env"]
    Environmental,
    /// A commodity purchasable at a time-varying price
    #[string = "Buy"]
    Buy,
    /// A commodity sellable at a time-varying price
    #[string = "Sell"]
    Sell,
}

/// Raw record from the commodities CSV file
#[derive(PartialEq, Debug, Deserialize)]
pub struct CommodityRaw {
    /// The site at which the commodity is declared
    pub site_id: SiteID,
    /// A unique identifier for the commodity
    pub commodity_id: CommodityID,
    #[serde(rename = "type")] // NB: we can't name a field type as it's a reserved keyword
    /// The commodity's balance type
    pub kind: CommodityType,
    /// Market price per unit of energy (defaults to 0)
    pub price: Option<MoneyPerEnergy>,
}

impl From<CommodityRaw> for Commodity {
    fn from(raw: CommodityRaw) -> Self {
        Self {
            site_id: raw.site_id,
            id: raw.commodity_id,
            kind: raw.kind,
            price: raw.price.unwrap_or(MoneyPerEnergy(0.0)),
        }
    }
}
