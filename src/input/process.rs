//! Code for reading the process parameters and process-commodity ratios CSV files
use crate::input::*;
use crate::process::{Process, ProcessCommodityRaw, ProcessID, ProcessMap, RatioMap};
use crate::site::SiteID;
use anyhow::{Context, Result, ensure};
use std::collections::HashSet;
use std::path::Path;

const PROCESSES_FILE_NAME: &str = "processes.csv";
const PROCESS_COMMODITIES_FILE_NAME: &str = "process_commodities.csv";

/// Read process parameters and conversion ratios from the specified model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing the model CSV files
/// * `site_ids` - All possible site IDs
///
/// # Returns
///
/// The process parameter table and the ratio table, or an error.
pub fn read_processes(
    model_dir: &Path,
    site_ids: &HashSet<SiteID>,
) -> Result<(ProcessMap, RatioMap)> {
    let file_path = model_dir.join(PROCESSES_FILE_NAME);
    let iter = read_csv::<Process>(&file_path)?;
    let processes =
        read_processes_from_iter(iter, site_ids).with_context(|| input_err_msg(&file_path))?;

    let process_ids = processes.keys().map(|(_, id)| id.clone()).collect();
    let file_path = model_dir.join(PROCESS_COMMODITIES_FILE_NAME);
    let iter = read_csv::<ProcessCommodityRaw>(&file_path)?;
    let ratios =
        read_ratios_from_iter(iter, &process_ids).with_context(|| input_err_msg(&file_path))?;

    Ok((processes, ratios))
}

fn read_processes_from_iter<I>(iter: I, site_ids: &HashSet<SiteID>) -> Result<ProcessMap>
where
    I: Iterator<Item = Process>,
{
    let mut processes = ProcessMap::new();
    for process in iter {
        validate_process(&process)?;
        ensure!(
            site_ids.contains(&process.site_id),
            "Process {} declared for unknown site {}",
            process.id,
            process.site_id
        );

        let key = (process.site_id.clone(), process.id.clone());
        ensure!(
            processes.insert(key, process).is_none(),
            "More than one parameter set provided for the same process at the same site"
        );
    }

    Ok(processes)
}

/// Check the financial parameters of a process.
///
/// # Errors
///
/// Returns an error if any cost is negative, if `wacc` is outside `[0, 1)` or if the
/// depreciation period is zero.
fn validate_process(process: &Process) -> Result<()> {
    ensure!(
        process.inv_cost.value() >= 0.0
            && process.fix_cost.value() >= 0.0
            && process.var_cost.value() >= 0.0,
        "Error in parameters for process {}: costs must be non-negative",
        process.id
    );
    ensure!(
        (0.0..1.0).contains(&process.wacc.0),
        "Error in parameters for process {}: wacc must be in [0, 1)",
        process.id
    );
    ensure!(
        process.depreciation > 0,
        "Error in parameters for process {}: depreciation period must be greater than 0",
        process.id
    );

    Ok(())
}

fn read_ratios_from_iter<I>(iter: I, process_ids: &HashSet<ProcessID>) -> Result<RatioMap>
where
    I: Iterator<Item = ProcessCommodityRaw>,
{
    let mut ratios = RatioMap::new();
    for raw in iter {
        ensure!(
            process_ids.contains(&raw.process_id),
            "Ratio provided for unknown process {}",
            raw.process_id
        );
        ensure!(
            raw.ratio.0.is_finite() && raw.ratio.0 >= 0.0,
            "Ratio for process {} and commodity {} must be a non-negative number",
            raw.process_id,
            raw.commodity_id
        );

        ensure!(
            ratios
                .insert(raw.process_id, raw.commodity_id, raw.direction, raw.ratio)
                .is_none(),
            "Duplicate process-commodity ratio entry"
        );
    }

    Ok(ratios)
}
