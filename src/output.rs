//! The module responsible for writing output data to disk.
//!
//! Results are written one CSV file per site. Each file is a wide table: the first column holds
//! operating hours, every further column the levelized cost of one (process, commodity) pair.
//! Conventional processes fill every row from 1 to 8760; regular processes only have a value at
//! their full-load hours, with the remaining rows filled with zero.
use crate::evaluate::{CommodityResults, HOURS_PER_YEAR, SiteResults};
use anyhow::{Context, Result, bail, ensure};
use log::error;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "lcoe_eval_results";

/// Get the default output directory for the model specified at `model_dir`
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model specified at `model_dir`.
///
/// An existing directory is only replaced if `overwrite` is set.
///
/// # Returns
///
/// Whether an existing directory was replaced.
pub fn create_output_directory(output_dir: &Path, overwrite: bool) -> Result<bool> {
    let replaced = output_dir.is_dir();
    if replaced {
        if !overwrite {
            bail!(
                "Output directory {} already exists. Use --overwrite to replace it.",
                output_dir.display()
            );
        }

        fs::remove_dir_all(output_dir).context("Could not remove existing output directory")?;
    }

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(replaced)
}

/// Write the result tables for every site to CSV files in `output_path`.
///
/// Sites are written independently; a failure for one site is logged and does not prevent the
/// remaining sites from being written, though it still fails the run as a whole.
pub fn write_results(
    output_path: &Path,
    results: &[SiteResults],
    raw_tables: bool,
) -> Result<()> {
    let mut failures = 0;
    for site_results in results {
        if let Err(err) = write_site_results(output_path, site_results, raw_tables) {
            error!(
                "Failed to write results for site {}: {err:#}",
                site_results.site_id
            );
            failures += 1;
        }
    }

    ensure!(failures == 0, "Failed to write results for {failures} site(s)");
    Ok(())
}

/// The operating hours making up the rows of a result table.
///
/// Any conventional result forces the full hourly range; otherwise only the full-load hours of
/// the regular results appear.
fn row_hours<'a, I>(commodities: I) -> BTreeSet<u32>
where
    I: Iterator<Item = &'a CommodityResults>,
{
    let mut hours = BTreeSet::new();
    for results in commodities {
        if !results.conventional.is_empty() {
            hours.extend(1..=HOURS_PER_YEAR);
        }
        hours.extend(results.regular.values().map(|lcoe| lcoe.full_load_hours));
    }

    hours
}

/// Write one site's combined result table to `lcoe_{site}.csv`
fn write_site_results(
    output_path: &Path,
    site_results: &SiteResults,
    raw_tables: bool,
) -> Result<()> {
    let file_path = output_path.join(format!("lcoe_{}.csv", site_results.site_id));
    let hours = row_hours(site_results.commodities.iter());
    write_wide_table(&file_path, &hours, &site_results.commodities, true)?;

    if raw_tables {
        for results in &site_results.commodities {
            let file_path = output_path.join(format!(
                "lcoe_{}_{}.csv",
                site_results.site_id, results.commodity_id
            ));
            let hours = row_hours(std::iter::once(results));
            write_wide_table(&file_path, &hours, std::slice::from_ref(results), false)?;
        }
    }

    Ok(())
}

/// Write a wide cost table, one column per (process, commodity) pair.
///
/// For each commodity the conventional columns come before the regular ones. With
/// `qualified_names` set, columns are named `{process}_{commodity}`; otherwise the bare process
/// name is used (only unambiguous within a single commodity's table).
fn write_wide_table(
    file_path: &Path,
    hours: &BTreeSet<u32>,
    commodities: &[CommodityResults],
    qualified_names: bool,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)?;

    let mut header = vec!["hours".to_string()];
    for results in commodities {
        let column_name = |process_id: &crate::process::ProcessID| {
            if qualified_names {
                format!("{process_id}_{}", results.commodity_id)
            } else {
                process_id.to_string()
            }
        };
        header.extend(results.conventional.keys().map(&column_name));
        header.extend(results.regular.keys().map(&column_name));
    }
    writer.write_record(&header)?;

    let mut record = Vec::with_capacity(header.len());
    for &hour in hours {
        record.clear();
        record.push(hour.to_string());
        for results in commodities {
            for curve in results.conventional.values() {
                record.push(curve[(hour - 1) as usize].value().to_string());
            }
            for lcoe in results.regular.values() {
                let value = if lcoe.full_load_hours == hour {
                    lcoe.value.value()
                } else {
                    0.0
                };
                record.push(value.to_string());
            }
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
