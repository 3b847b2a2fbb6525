//! US state names, matched as whole words.

use std::sync::LazyLock;

use regex::Regex;

/// Full names of the fifty states, in reporting order.
pub const US_STATES: [&str; 50] = [
    "Alabama",
    "Alaska",
    "Arizona",
    "Arkansas",
    "California",
    "Colorado",
    "Connecticut",
    "Delaware",
    "Florida",
    "Georgia",
    "Hawaii",
    "Idaho",
    "Illinois",
    "Indiana",
    "Iowa",
    "Kansas",
    "Kentucky",
    "Louisiana",
    "Maine",
    "Maryland",
    "Massachusetts",
    "Michigan",
    "Minnesota",
    "Mississippi",
    "Missouri",
    "Montana",
    "Nebraska",
    "Nevada",
    "New Hampshire",
    "New Jersey",
    "New Mexico",
    "New York",
    "North Carolina",
    "North Dakota",
    "Ohio",
    "Oklahoma",
    "Oregon",
    "Pennsylvania",
    "Rhode Island",
    "South Carolina",
    "South Dakota",
    "Tennessee",
    "Texas",
    "Utah",
    "Vermont",
    "Virginia",
    "Washington",
    "West Virginia",
    "Wisconsin",
    "Wyoming",
];

static STATE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    US_STATES
        .iter()
        .map(|state| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(state));
            let re = Regex::new(&pattern).expect("state pattern should compile");
            (*state, re)
        })
        .collect()
});

/// States named anywhere in `text`, in `US_STATES` order (not text order).
///
/// "West Virginia" also yields "Virginia".
pub fn match_states(text: &str) -> Vec<&'static str> {
    STATE_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(state, _)| *state)
        .collect()
}
