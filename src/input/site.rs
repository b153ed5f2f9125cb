//! Code for reading the sites CSV file
use crate::input::*;
use crate::site::{Site, SiteMap};
use anyhow::{Context, Result, ensure};
use std::path::Path;

const SITES_FILE_NAME: &str = "sites.csv";

/// Read sites from the specified model directory
pub fn read_sites(model_dir: &Path) -> Result<SiteMap> {
    let file_path = model_dir.join(SITES_FILE_NAME);
    let iter = read_csv::<Site>(&file_path)?;
    read_sites_from_iter(iter).with_context(|| input_err_msg(&file_path))
}

fn read_sites_from_iter<I>(iter: I) -> Result<SiteMap>
where
    I: Iterator<Item = Site>,
{
    let mut sites = SiteMap::new();
    for site in iter {
        let id = site.id.clone();
        ensure!(
            sites.insert(id.clone(), site).is_none(),
            "Duplicate site ID {id}"
        );
    }

    Ok(sites)
}
