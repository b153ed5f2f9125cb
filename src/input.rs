//! Common routines for loading model input data from CSV and TOML files.
use crate::model::Model;
use anyhow::{Context, Result, ensure};
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub mod commodity;
pub mod process;
pub mod site;
pub mod time_series;

/// Read a series of type `T`s from the specified CSV file.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<impl Iterator<Item = T>> {
    let vec = read_csv_internal(file_path).with_context(|| input_err_msg(file_path))?;
    Ok(vec.into_iter())
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(file_path)?;
    let vec: Vec<T> = reader.deserialize().collect::<Result<_, _>>()?;
    ensure!(!vec.is_empty(), "CSV file cannot be empty");

    Ok(vec)
}

/// Format an error message to include the path of the offending input file
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Parse a TOML file at the specified path.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;

    Ok(toml_data)
}

/// Read an f64, checking that it is between 0 and 1
pub fn deserialise_proportion<'de, D>(deserialiser: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Deserialize::deserialize(deserialiser)?;
    if !(0.0..=1.0).contains(&value) {
        Err(serde::de::Error::custom("Value is not between 0 and 1"))?;
    }

    Ok(value)
}

/// Read and validate a model from the specified directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing the model CSV files
///
/// # Returns
///
/// The fully loaded [`Model`], or an error naming the offending file or tuple.
pub fn load_model(model_dir: &Path) -> Result<Model> {
    let sites = site::read_sites(model_dir)?;
    let site_ids: HashSet<_> = sites.keys().cloned().collect();

    let commodities = commodity::read_commodities(model_dir, &site_ids)?;
    let (processes, ratios) = process::read_processes(model_dir, &site_ids)?;
    let demand = time_series::read_demand(model_dir, &commodities)?;
    let full_load_hours = time_series::read_supim(model_dir, &commodities)?;

    let model = Model {
        sites,
        commodities,
        processes,
        ratios,
        demand,
        full_load_hours,
    };
    model.validate()?;

    Ok(model)
}
