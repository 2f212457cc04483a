//! US state abbreviations and names.

use ahash::AHashMap as HashMap;
use once_cell::sync::Lazy;

/// Two-letter abbreviation and full name for every state, DC and Puerto Rico.
pub const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("PR", "Puerto Rico"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

static BY_KEY: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    US_STATES
        .iter()
        .flat_map(|(abbr, name)| {
            [
                (abbr.to_ascii_lowercase(), *abbr),
                (name.to_ascii_lowercase(), *abbr),
            ]
        })
        .collect()
});

/// Resolve either an abbreviation or a full state name to the canonical
/// upper-case abbreviation.
///
/// ```rust
/// use roster_geo::states::abbreviation_for;
///
/// assert_eq!(abbreviation_for("oh"), Some("OH"));
/// assert_eq!(abbreviation_for("New York"), Some("NY"));
/// assert_eq!(abbreviation_for("Atlantis"), None);
/// ```
pub fn abbreviation_for(state: &str) -> Option<&'static str> {
    BY_KEY.get(&state.trim().to_ascii_lowercase()).copied()
}

pub fn name_for(abbreviation: &str) -> Option<&'static str> {
    let abbreviation = abbreviation.trim();
    US_STATES
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(abbreviation))
        .map(|(_, name)| *name)
}
