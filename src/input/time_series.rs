//! Code for reading the demand and supply-intermittency time series CSV files.
//!
//! The evaluation engine only consumes aggregates of these series: demand identifies each
//! site's main commodities, and the sum of a supply-intermittency series is the corresponding
//! process's full-load hours.
use crate::commodity::{CommodityID, CommodityMap, CommodityType};
use crate::input::*;
use crate::model::{DemandMap, FullLoadHoursMap};
use crate::site::SiteID;
use crate::units::{Energy, Hours};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const DEMAND_FILE_NAME: &str = "demand.csv";
const SUPIM_FILE_NAME: &str = "supim.csv";

/// A single timestep of a demand series
#[derive(PartialEq, Debug, Deserialize)]
struct DemandRaw {
    site_id: SiteID,
    commodity_id: CommodityID,
    t: u32,
    value: Energy,
}

/// A single timestep of a supply-intermittency series (a fraction of peak capacity)
#[derive(PartialEq, Debug, Deserialize)]
struct SupImRaw {
    site_id: SiteID,
    commodity_id: CommodityID,
    t: u32,
    #[serde(deserialize_with = "deserialise_proportion")]
    value: f64,
}

/// Read annual demand sums from the specified model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing the model CSV files
/// * `commodities` - All declared commodities, for checking references
pub fn read_demand(model_dir: &Path, commodities: &CommodityMap) -> Result<DemandMap> {
    let file_path = model_dir.join(DEMAND_FILE_NAME);
    let iter = read_csv::<DemandRaw>(&file_path)?;
    read_demand_from_iter(iter, commodities).with_context(|| input_err_msg(&file_path))
}

fn read_demand_from_iter<I>(iter: I, commodities: &CommodityMap) -> Result<DemandMap>
where
    I: Iterator<Item = DemandRaw>,
{
    let mut demand = DemandMap::new();
    for row in iter {
        let key = (row.site_id, row.commodity_id);
        let kind = commodities.get(&key).map(|commodity| commodity.kind);
        ensure!(
            kind == Some(CommodityType::Demand),
            "Demand series for ({}, {}) must refer to a declared commodity of type Demand",
            key.0,
            key.1
        );
        ensure!(
            row.value.value() >= 0.0,
            "Demand for ({}, {}) at t={} must be non-negative",
            key.0,
            key.1,
            row.t
        );

        let total = demand.entry(key).or_insert(Energy(0.0));
        *total = *total + row.value;
    }

    Ok(demand)
}

/// Read full-load hours (summed supply-intermittency series) from the specified model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing the model CSV files
/// * `commodities` - All declared commodities, for checking references
pub fn read_supim(model_dir: &Path, commodities: &CommodityMap) -> Result<FullLoadHoursMap> {
    let file_path = model_dir.join(SUPIM_FILE_NAME);
    let iter = read_csv::<SupImRaw>(&file_path)?;
    read_supim_from_iter(iter, commodities).with_context(|| input_err_msg(&file_path))
}

fn read_supim_from_iter<I>(iter: I, commodities: &CommodityMap) -> Result<FullLoadHoursMap>
where
    I: Iterator<Item = SupImRaw>,
{
    let mut full_load_hours = FullLoadHoursMap::new();
    for row in iter {
        let key = (row.site_id, row.commodity_id);
        let kind = commodities.get(&key).map(|commodity| commodity.kind);
        ensure!(
            kind == Some(CommodityType::SupplyIntermittent),
            "Supply-intermittency series for ({}, {}) must refer to a declared commodity of \
            type SupIm",
            key.0,
            key.1
        );

        let total = full_load_hours.entry(key).or_insert(Hours(0.0));
        *total = *total + Hours(row.value);
    }

    Ok(full_load_hours)
}
