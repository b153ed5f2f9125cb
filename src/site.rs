//! Sites are the geographical locations making up an energy system model. Every commodity and
//! process is declared per site; the evaluation loop runs once per site.
use crate::id::define_id_type;
use indexmap::IndexMap;
use serde::Deserialize;

define_id_type! {SiteID}

/// A map of [`Site`]s, keyed by site ID
pub type SiteMap = IndexMap<SiteID, Site>;

/// A geographical location within the model
#[derive(PartialEq, Debug, Deserialize)]
pub struct Site {
    /// A unique identifier for the site (e.g. "South")
    pub id: SiteID,
    /// A human-readable description for the site
    pub description: String,
}
