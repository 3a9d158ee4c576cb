pub mod artists;
pub mod shows;
pub mod venues;

use serde::Deserialize;

/// Body of the venue and artist search forms.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search_term: String,
}
