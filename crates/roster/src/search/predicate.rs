//! Filter predicates.
//!
//! Every [`Predicate`] carries its own bound values and renders to a
//! parameterised SQL fragment as well as an in-memory check, so the Postgres
//! and in-memory stores agree on what matches. A [`FilterSet`] is the AND of
//! its predicates.

use roster_geo::normalize_postal_code;
use sqlx::{Postgres, QueryBuilder};

use crate::model::{Profile, SearchQuery};

/// A filterable profile column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Summary,
    FirstName,
    LastInitial,
    City,
    State,
    /// Compared on its five-digit form, so ZIP+4 rows still match.
    PostalCode,
    Office,
    ProfessionType,
}

impl Field {
    pub const KEYWORD_FIELDS: [Self; 4] =
        [Self::Summary, Self::FirstName, Self::LastInitial, Self::City];

    pub const fn expr(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::FirstName => "first_name",
            Self::LastInitial => "last_initial",
            Self::City => "city",
            Self::State => "state",
            Self::PostalCode => "LEFT(postal_code, 5)",
            Self::Office => "office",
            Self::ProfessionType => "profession_type",
        }
    }

    pub fn value(self, profile: &Profile) -> &str {
        match self {
            Self::Summary => &profile.summary,
            Self::FirstName => &profile.first_name,
            Self::LastInitial => &profile.last_initial,
            Self::City => &profile.city,
            Self::State => &profile.state,
            Self::PostalCode => profile.postal_code.get(..5).unwrap_or(&profile.postal_code),
            Self::Office => &profile.office,
            Self::ProfessionType => &profile.profession_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Any field contains any needle, case-insensitively.
    ContainsAny {
        fields: Vec<Field>,
        needles: Vec<String>,
    },
    Equals {
        field: Field,
        value: String,
    },
    EqualsIgnoreCase {
        field: Field,
        value: String,
    },
    OneOf {
        field: Field,
        values: Vec<String>,
    },
    IdIn(Vec<i64>),
    Active,
}

impl Predicate {
    pub fn keywords(keywords: &[String]) -> Option<Self> {
        (!keywords.is_empty()).then(|| Self::ContainsAny {
            fields: Field::KEYWORD_FIELDS.to_vec(),
            needles: keywords.to_vec(),
        })
    }

    pub fn professions(professions: &[String]) -> Option<Self> {
        (!professions.is_empty()).then(|| Self::ContainsAny {
            fields: vec![Field::ProfessionType],
            needles: professions.to_vec(),
        })
    }

    pub fn state(state: &str) -> Self {
        Self::Equals {
            field: Field::State,
            value: state.trim().to_uppercase(),
        }
    }

    pub fn office(office: &str) -> Self {
        Self::Equals {
            field: Field::Office,
            value: office.to_owned(),
        }
    }

    pub fn city(city: &str) -> Self {
        Self::EqualsIgnoreCase {
            field: Field::City,
            value: city.to_owned(),
        }
    }

    pub fn postal_code(postal_code: &str) -> Self {
        Self::Equals {
            field: Field::PostalCode,
            value: normalize_postal_code(postal_code).unwrap_or_else(|| postal_code.to_owned()),
        }
    }

    pub fn postal_codes<S: AsRef<str>>(postal_codes: &[S]) -> Self {
        Self::OneOf {
            field: Field::PostalCode,
            values: postal_codes
                .iter()
                .map(|c| normalize_postal_code(c.as_ref()).unwrap_or_else(|| c.as_ref().to_owned()))
                .collect(),
        }
    }

    /// Append this predicate as a SQL boolean expression.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Self::ContainsAny { fields, needles } => {
                let patterns = needles
                    .iter()
                    .map(|n| format!("%{}%", escape_like(n)))
                    .collect::<Vec<_>>();
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(field.expr())
                        .push(" ILIKE ANY(")
                        .push_bind(patterns.clone())
                        .push(")");
                }
            }
            Self::Equals { field, value } => {
                qb.push(field.expr()).push(" = ").push_bind(value.clone());
            }
            Self::EqualsIgnoreCase { field, value } => {
                qb.push("LOWER(")
                    .push(field.expr())
                    .push(") = LOWER(")
                    .push_bind(value.clone())
                    .push(")");
            }
            Self::OneOf { field, values } => {
                qb.push(field.expr())
                    .push(" = ANY(")
                    .push_bind(values.clone())
                    .push(")");
            }
            Self::IdIn(ids) => {
                qb.push("id = ANY(").push_bind(ids.clone()).push(")");
            }
            Self::Active => {
                qb.push("active = TRUE");
            }
        }
    }

    pub fn matches(&self, profile: &Profile) -> bool {
        match self {
            Self::ContainsAny { fields, needles } => {
                let needles = needles.iter().map(|n| n.to_lowercase()).collect::<Vec<_>>();
                fields.iter().any(|field| {
                    let haystack = field.value(profile).to_lowercase();
                    needles.iter().any(|n| haystack.contains(n.as_str()))
                })
            }
            Self::Equals { field, value } => field.value(profile) == value,
            Self::EqualsIgnoreCase { field, value } => {
                field.value(profile).to_lowercase() == value.to_lowercase()
            }
            Self::OneOf { field, values } => {
                let actual = field.value(profile);
                values.iter().any(|v| v == actual)
            }
            Self::IdIn(ids) => ids.contains(&profile.id),
            Self::Active => profile.active,
        }
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Conjunction of predicates. Always starts from [`Predicate::Active`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet {
    predicates: Vec<Predicate>,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::active_only()
    }
}

impl FilterSet {
    pub fn active_only() -> Self {
        Self {
            predicates: vec![Predicate::Active],
        }
    }

    /// Keyword, profession and office filters. These also serve as the
    /// pre-filter for radius resolution.
    pub fn base(query: &SearchQuery) -> Self {
        Self::active_only()
            .and_opt(Predicate::keywords(&query.keywords))
            .and_opt(Predicate::professions(&query.professions))
            .and_opt(query.office.as_deref().map(Predicate::office))
    }

    /// Base filters plus the plain (non-radius) location predicates.
    pub fn with_location(self, query: &SearchQuery) -> Self {
        let postal_codes = (!query.postal_codes.is_empty())
            .then(|| Predicate::postal_codes(&query.postal_codes));
        self.and_opt(postal_codes)
            .and_opt(query.postal_code.as_deref().map(Predicate::postal_code))
            .and_opt(query.city.as_deref().map(Predicate::city))
            .and_opt(query.state.as_deref().map(Predicate::state))
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.push(predicate);
        self
    }

    pub fn and_opt(self, predicate: Option<Predicate>) -> Self {
        match predicate {
            Some(p) => self.and(p),
            None => self,
        }
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Append ` WHERE (..) AND (..)`. Returns whether anything was written.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) -> bool {
        if self.predicates.is_empty() {
            return false;
        }
        qb.push(" WHERE ");
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                qb.push(" AND ");
            }
            qb.push("(");
            predicate.push_sql(qb);
            qb.push(")");
        }
        true
    }

    pub fn matches(&self, profile: &Profile) -> bool {
        self.predicates.iter().all(|p| p.matches(profile))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn profile() -> Profile {
        Profile {
            id: 7,
            first_name: "Dana".into(),
            last_initial: "K".into(),
            city: "Akron".into(),
            state: "OH".into(),
            postal_code: "44310-2201".into(),
            summary: "Senior project manager, 100% remote-ready".into(),
            office: "Cleveland".into(),
            profession_type: "Project Management".into(),
            skills: None,
            source_file: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sql_of(filters: &FilterSet) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM profiles");
        filters.push_where(&mut qb);
        qb.sql().to_owned()
    }

    #[test]
    fn test_active_only_sql() {
        assert_eq!(
            sql_of(&FilterSet::active_only()),
            "SELECT id FROM profiles WHERE (active = TRUE)"
        );
    }

    #[test]
    fn test_keywords_or_across_fields_and_with_others() {
        let query = SearchQuery::builder()
            .keywords(["manager"])
            .office("Cleveland")
            .state("oh")
            .build();
        let filters = FilterSet::base(&query).with_location(&query);

        assert_eq!(
            sql_of(&filters),
            "SELECT id FROM profiles WHERE (active = TRUE) AND (summary ILIKE ANY($1) OR \
             first_name ILIKE ANY($2) OR last_initial ILIKE ANY($3) OR city ILIKE ANY($4)) AND \
             (office = $5) AND (state = $6)"
        );
    }

    #[test]
    fn test_location_predicates_sql() {
        let query = SearchQuery::builder()
            .postal_codes(["44310", "44289-1234"])
            .postal_code("10001")
            .city("akron")
            .build();
        let filters = FilterSet::active_only().with_location(&query);

        assert_eq!(
            sql_of(&filters),
            "SELECT id FROM profiles WHERE (active = TRUE) AND (LEFT(postal_code, 5) = ANY($1)) \
             AND (LEFT(postal_code, 5) = $2) AND (LOWER(city) = LOWER($3))"
        );
        assert_eq!(
            filters.predicates()[1],
            Predicate::OneOf {
                field: Field::PostalCode,
                values: vec!["44310".into(), "44289".into()],
            }
        );
    }

    #[test]
    fn test_id_in_sql() {
        let filters = FilterSet::active_only().and(Predicate::IdIn(vec![1, 2]));
        assert_eq!(
            sql_of(&filters),
            "SELECT id FROM profiles WHERE (active = TRUE) AND (id = ANY($1))"
        );
    }

    #[rstest]
    #[case("100%", "100\\%")]
    #[case("snake_case", "snake\\_case")]
    #[case("back\\slash", "back\\\\slash")]
    #[case("plain", "plain")]
    fn test_escape_like(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_like(input), expected);
    }

    #[rstest]
    #[case(Predicate::keywords(&["MANAGER".into()]).unwrap(), true)]
    #[case(Predicate::keywords(&["dan".into()]).unwrap(), true)]
    #[case(Predicate::keywords(&["100%".into()]).unwrap(), true)]
    #[case(Predicate::keywords(&["welder".into()]).unwrap(), false)]
    #[case(Predicate::professions(&["management".into()]).unwrap(), true)]
    #[case(Predicate::professions(&["nursing".into()]).unwrap(), false)]
    #[case(Predicate::state("oh"), true)]
    #[case(Predicate::state("PA"), false)]
    #[case(Predicate::city("AKRON"), true)]
    #[case(Predicate::office("Cleveland"), true)]
    #[case(Predicate::office("cleveland"), false)]
    #[case(Predicate::postal_code("44310"), true)]
    #[case(Predicate::postal_codes(&["44289", "44310-9999"]), true)]
    #[case(Predicate::postal_codes(&["44289"]), false)]
    #[case(Predicate::IdIn(vec![7]), true)]
    #[case(Predicate::IdIn(vec![]), false)]
    #[case(Predicate::Active, true)]
    fn test_in_memory_matching(#[case] predicate: Predicate, #[case] expected: bool) {
        assert_eq!(predicate.matches(&profile()), expected);
    }

    #[test]
    fn test_inactive_profiles_never_match() {
        let mut inactive = profile();
        inactive.active = false;
        assert!(!FilterSet::active_only().matches(&inactive));
    }

    #[test]
    fn test_empty_lists_add_no_predicate() {
        assert!(Predicate::keywords(&[]).is_none());
        assert!(Predicate::professions(&[]).is_none());
        let query = SearchQuery::default();
        assert_eq!(FilterSet::base(&query).with_location(&query), FilterSet::active_only());
    }
}
