//! A small built-in roster for `roster demo` and documentation examples.

use std::{collections::HashMap, sync::Arc};

use chrono::{TimeZone, Utc};

use crate::{
    OfficeDirectory, Roster,
    config::ResolverConfigBuilder,
    model::Profile,
    store::MemoryProfileStore,
};

// (first name, initial, city, state, postal code, office, profession, summary)
type Row = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

const ROWS: &[Row] = &[
    (
        "Avery",
        "M",
        "Akron",
        "OH",
        "44310",
        "Cleveland",
        "Project Management",
        "Construction project manager with 12 years on commercial builds.",
    ),
    (
        "Jordan",
        "T",
        "Cuyahoga Falls",
        "OH",
        "44221",
        "Cleveland",
        "Accounting",
        "Staff accountant, month-end close and audit prep.",
    ),
    (
        "Riley",
        "S",
        "Cleveland",
        "OH",
        "44114",
        "Cleveland",
        "Data Analysis",
        "Financial analyst building forecasting models in SQL and Python.",
    ),
    (
        "Morgan",
        "K",
        "Columbus",
        "OH",
        "43215",
        "Columbus",
        "Human Resources",
        "HR generalist focused on onboarding and benefits.",
    ),
    (
        "Casey",
        "L",
        "Canton",
        "OH",
        "44702",
        "Cleveland",
        "Engineering",
        "Mechanical engineer, tooling and fixture design.",
    ),
    (
        "Taylor",
        "R",
        "Pittsburgh",
        "PA",
        "15222",
        "Pittsburgh",
        "Data Analysis",
        "Business intelligence analyst, dashboards and reporting.",
    ),
    (
        "Quinn",
        "D",
        "Philadelphia",
        "PA",
        "19103",
        "Philadelphia",
        "Legal",
        "Paralegal supporting commercial contracts.",
    ),
    (
        "Drew",
        "P",
        "New York",
        "NY",
        "10001",
        "New York",
        "Marketing",
        "Digital marketing manager for B2B campaigns.",
    ),
    (
        "Skyler",
        "J",
        "Buffalo",
        "NY",
        "14202",
        "New York",
        "Engineering",
        "Electrical engineer, controls and PLC programming.",
    ),
    (
        "Parker",
        "W",
        "Chicago",
        "IL",
        "60601",
        "Chicago",
        "Project Management",
        "IT program manager running ERP rollouts.",
    ),
    (
        "Rowan",
        "B",
        "Detroit",
        "MI",
        "48226",
        "Detroit",
        "Accounting",
        "Senior accountant, revenue recognition.",
    ),
    (
        "Emerson",
        "H",
        "Ann Arbor",
        "MI",
        "48104",
        "Detroit",
        "Data Analysis",
        "Data scientist with experimentation and A/B testing experience.",
    ),
    (
        "Hayden",
        "C",
        "Indianapolis",
        "IN",
        "46204",
        "Chicago",
        "Human Resources",
        "Talent acquisition partner for technical roles.",
    ),
    (
        "Sage",
        "V",
        "Houston",
        "TX",
        "77002",
        "Houston",
        "Engineering",
        "Process engineer in refining and petrochemicals.",
    ),
    (
        "Reese",
        "N",
        "Austin",
        "TX",
        "78701",
        "Houston",
        "Marketing",
        "Content strategist and brand manager.",
    ),
    (
        "Blake",
        "E",
        "Denver",
        "CO",
        "80202",
        "Denver",
        "Legal",
        "Compliance analyst, privacy and records management.",
    ),
    (
        "Finley",
        "G",
        "Seattle",
        "WA",
        "98101",
        "Seattle",
        "Engineering",
        "Civil engineer, transportation projects.",
    ),
    (
        "Kendall",
        "A",
        "Los Angeles",
        "CA",
        "90012",
        "Los Angeles",
        "Accounting",
        "Accounts payable lead, vendor management.",
    ),
];

/// The sample profiles. Every profile is active; ids start at 1.
pub fn sample_profiles() -> Vec<Profile> {
    let created = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).single().unwrap_or_default();
    ROWS.iter()
        .zip(1..)
        .map(|(row, id)| {
            let &(first_name, last_initial, city, state, postal_code, office, profession, summary) =
                row;
            Profile {
                id,
                first_name: first_name.to_owned(),
                last_initial: last_initial.to_owned(),
                city: city.to_owned(),
                state: state.to_owned(),
                postal_code: postal_code.to_owned(),
                summary: summary.to_owned(),
                office: office.to_owned(),
                profession_type: profession.to_owned(),
                skills: None,
                source_file: Some("demo".to_owned()),
                active: true,
                created_at: created,
                updated_at: created,
            }
        })
        .collect()
}

/// An offline roster over [`sample_profiles`].
pub fn demo_roster() -> Roster {
    let offices = ROWS
        .iter()
        .map(|row| {
            let inbox = format!("{}@example.com", row.5.to_lowercase().replace(' ', "-"));
            (row.5.to_owned(), inbox)
        })
        .collect::<HashMap<_, _>>();

    Roster::builder(Arc::new(MemoryProfileStore::new(sample_profiles())))
        .resolver_config(ResolverConfigBuilder::offline().build())
        .office_directory(OfficeDirectory::new("info@example.com", &offices))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SearchQuery;

    #[test]
    fn test_sample_ids_are_unique() {
        let profiles = sample_profiles();
        let mut ids = profiles.iter().map(|p| p.id).collect::<Vec<_>>();
        ids.dedup();
        assert_eq!(ids.len(), ROWS.len());
    }

    #[tokio::test]
    async fn test_demo_radius_search_runs_offline() {
        let roster = demo_roster();
        let query = SearchQuery::builder()
            .postal_code("44310")
            .radius(40.0)
            .limit(50)
            .build();
        let page = roster.search(&query).await.unwrap();

        let cities = page.profiles.iter().map(|p| p.city.as_str()).collect::<Vec<_>>();
        assert!(cities.contains(&"Akron"));
        assert!(cities.contains(&"Canton"));
        assert!(!cities.contains(&"Columbus"));
    }
}
