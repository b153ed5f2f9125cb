//! Code for reading the commodities CSV file
use crate::commodity::{Commodity, CommodityMap, CommodityRaw};
use crate::input::*;
use crate::site::SiteID;
use anyhow::{Context, Result, ensure};
use std::collections::HashSet;
use std::path::Path;

const COMMODITIES_FILE_NAME: &str = "commodities.csv";

/// Read commodity declarations from the specified model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing the model CSV files
/// * `site_ids` - All possible site IDs
pub fn read_commodities(model_dir: &Path, site_ids: &HashSet<SiteID>) -> Result<CommodityMap> {
    let file_path = model_dir.join(COMMODITIES_FILE_NAME);
    let iter = read_csv::<CommodityRaw>(&file_path)?;
    read_commodities_from_iter(iter, site_ids).with_context(|| input_err_msg(&file_path))
}

fn read_commodities_from_iter<I>(iter: I, site_ids: &HashSet<SiteID>) -> Result<CommodityMap>
where
    I: Iterator<Item = CommodityRaw>,
{
    let mut commodities = CommodityMap::new();
    for raw in iter {
        ensure!(
            site_ids.contains(&raw.site_id),
            "Commodity {} declared for unknown site {}",
            raw.commodity_id,
            raw.site_id
        );

        let commodity: Commodity = raw.into();
        let key = (commodity.site_id.clone(), commodity.id.clone());
        ensure!(
            commodities.insert(key, commodity).is_none(),
            "More than one declaration for the same commodity at the same site"
        );
    }

    Ok(commodities)
}
