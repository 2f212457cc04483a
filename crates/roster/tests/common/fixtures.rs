//! Test doubles for the geocoder, the bulk radius service and the mailer,
//! plus the standard radius corpus.

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use ahash::AHashMap;
use async_trait::async_trait;
use roster::{
    Profile,
    contact::{ContactError, EmailMessage, Mailer},
    geo::{
        Coordinate, GeoError, Geocoder, LocationSource, RadiusLookup, ZipLocation,
        normalize_postal_code,
    },
};

use super::ProfileBuilder;

/// Geocoder answering from fixed tables and counting postal lookups.
#[derive(Default)]
pub struct StubGeocoder {
    postal: AHashMap<String, (Coordinate, &'static str)>,
    cities: AHashMap<(String, &'static str), Coordinate>,
    postal_calls: AtomicUsize,
}

impl StubGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn postal(
        mut self,
        code: &str,
        latitude: f64,
        longitude: f64,
        state: &'static str,
    ) -> Self {
        self.postal
            .insert(code.to_owned(), (Coordinate::new(latitude, longitude), state));
        self
    }

    pub fn city(mut self, city: &str, state: &'static str, latitude: f64, longitude: f64) -> Self {
        self.cities
            .insert((city.to_lowercase(), state), Coordinate::new(latitude, longitude));
        self
    }

    pub fn postal_calls(&self) -> usize {
        self.postal_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode_postal_code(&self, postal_code: &str) -> Option<ZipLocation> {
        self.postal_calls.fetch_add(1, Ordering::SeqCst);
        let code = normalize_postal_code(postal_code)?;
        let (coordinate, state) = self.postal.get(&code)?;
        Some(ZipLocation {
            label: code,
            coordinate: *coordinate,
            state: Some((*state).to_owned()),
            source: LocationSource::Remote,
        })
    }

    async fn geocode_city(&self, city: &str, state: Option<&str>) -> Option<ZipLocation> {
        let key = city.to_lowercase();
        let (found_state, coordinate) = self
            .cities
            .iter()
            .find(|((c, s), _)| {
                *c == key && state.is_none_or(|wanted| wanted.eq_ignore_ascii_case(s))
            })
            .map(|((_, s), coordinate)| (*s, *coordinate))?;
        Some(ZipLocation {
            label: city.to_owned(),
            coordinate,
            state: Some(found_state.to_owned()),
            source: LocationSource::Remote,
        })
    }
}

/// Bulk radius service returning a fixed answer.
pub struct StubRadiusLookup {
    answer: Result<Vec<String>, ()>,
    calls: AtomicUsize,
}

impl StubRadiusLookup {
    pub fn returning(codes: &[&str]) -> Self {
        Self {
            answer: Ok(codes.iter().map(|c| (*c).to_owned()).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: Err(()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RadiusLookup for StubRadiusLookup {
    async fn postal_codes_within(
        &self,
        postal_code: &str,
        _radius_miles: f64,
    ) -> roster::geo::Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
            .clone()
            .map_err(|()| GeoError::NotFound(postal_code.to_owned()))
    }
}

/// Mailer that keeps every message.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), ContactError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Mailer whose relay always refuses.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: &EmailMessage) -> Result<(), ContactError> {
        Err(ContactError::Rejected("503: relay unavailable".to_owned()))
    }
}

/// Center used by the radius corpus.
pub const CENTER: &str = "44289";

/// Geocoder for [`radius_corpus`]: the center, five candidate postal codes
/// and a remote Alaskan code. `99999` is deliberately unknown.
pub fn radius_geocoder() -> StubGeocoder {
    StubGeocoder::new()
        .postal(CENTER, 41.00, -81.00, "OH")
        .postal("44310", 41.10, -81.10, "OH") // ~9 miles
        .postal("44240", 41.20, -81.20, "OH") // ~17 miles
        .postal("43215", 40.00, -83.00, "OH") // ~125 miles
        .postal("15222", 40.44, -80.00, "PA") // ~65 miles
        .postal("10001", 40.75, -73.99, "NY")
        .postal("99501", 61.22, -149.90, "AK")
        .city("Springfield", "OH", 39.92, -83.81)
        .city("Springfield", "IL", 39.80, -89.64)
}

/// Six active profiles, two of them within 25 miles of [`CENTER`], one with
/// an ungeocodable postal code.
pub fn radius_corpus() -> Vec<Profile> {
    vec![
        ProfileBuilder::new("Avery").id(1).postal_code("44310").city("Akron", "OH").build(),
        ProfileBuilder::new("Blake").id(2).postal_code("44240-1234").city("Kent", "OH").build(),
        ProfileBuilder::new("Casey").id(3).postal_code("43215").city("Columbus", "OH").build(),
        ProfileBuilder::new("Drew").id(4).postal_code("15222").city("Pittsburgh", "PA").build(),
        ProfileBuilder::new("Emery").id(5).postal_code("10001").city("New York", "NY").build(),
        ProfileBuilder::new("Finley").id(6).postal_code("99999").city("Nowhere", "OH").build(),
    ]
}
