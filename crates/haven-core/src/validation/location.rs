use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The closed set of Malaysian states and federal territories.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum MalaysianState {
    Johor,
    Kedah,
    Kelantan,
    Malacca,
    #[strum(to_string = "Negeri Sembilan")]
    #[serde(rename = "Negeri Sembilan")]
    NegeriSembilan,
    Pahang,
    Penang,
    Perak,
    Perlis,
    Sabah,
    Sarawak,
    Selangor,
    Terengganu,
    #[strum(to_string = "Kuala Lumpur")]
    #[serde(rename = "Kuala Lumpur")]
    KualaLumpur,
    Labuan,
    Putrajaya,
}

impl MalaysianState {
    /// Display names of every region, in listing order.
    pub fn names() -> Vec<String> {
        Self::iter().map(|state| state.to_string()).collect()
    }
}

/// Validates a location against [`MalaysianState`], ignoring case.
pub fn validate_malaysian_location(location: &str) -> Option<String> {
    if location.is_empty() {
        return Some("Location is required".to_string());
    }
    match location.parse::<MalaysianState>() {
        Ok(_) => None,
        Err(_) => Some("Please select a valid Malaysian state".to_string()),
    }
}
