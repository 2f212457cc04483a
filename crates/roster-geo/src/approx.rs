//! Static approximation table keyed by three-digit US postal prefixes.
//!
//! Each range maps to a representative coordinate for the region it serves
//! and the state it belongs to. The estimate can be tens of miles off for a
//! specific code, which is acceptable for a fallback used only when the
//! remote lookup is unavailable. Prefixes assigned to military mail
//! (`090`-`098`, `340`, `962`-`966`) and unassigned prefixes are absent.

use crate::{Coordinate, ZipLocation, geocoder::LocationSource, normalize_postal_code};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrefixRange {
    pub start: u16,
    pub end: u16,
    pub state: &'static str,
    pub coordinate: Coordinate,
}

const fn range(start: u16, end: u16, state: &'static str, lat: f64, lon: f64) -> PrefixRange {
    PrefixRange {
        start,
        end,
        state,
        coordinate: Coordinate::new(lat, lon),
    }
}

/// Sorted by `start`, non-overlapping.
pub const PREFIX_RANGES: &[PrefixRange] = &[
    range(5, 5, "NY", 40.81, -73.04),
    range(6, 9, "PR", 18.22, -66.59),
    range(10, 13, "MA", 42.10, -72.59),
    range(14, 17, "MA", 42.26, -71.80),
    range(18, 19, "MA", 42.63, -71.10),
    range(20, 27, "MA", 42.36, -71.06),
    range(28, 29, "RI", 41.82, -71.41),
    range(30, 38, "NH", 43.21, -71.54),
    range(39, 49, "ME", 44.31, -69.78),
    range(50, 59, "VT", 44.26, -72.58),
    range(60, 69, "CT", 41.60, -72.70),
    range(70, 79, "NJ", 40.74, -74.17),
    range(80, 89, "NJ", 39.95, -74.70),
    range(100, 104, "NY", 40.75, -73.99),
    range(105, 109, "NY", 41.03, -73.76),
    range(110, 119, "NY", 40.73, -73.45),
    range(120, 129, "NY", 42.65, -73.76),
    range(130, 139, "NY", 43.05, -76.15),
    range(140, 149, "NY", 42.89, -78.88),
    range(150, 168, "PA", 40.44, -80.00),
    range(169, 179, "PA", 40.27, -76.88),
    range(180, 196, "PA", 40.00, -75.50),
    range(197, 199, "DE", 39.16, -75.52),
    range(200, 205, "DC", 38.91, -77.04),
    range(206, 219, "MD", 39.29, -76.61),
    range(220, 246, "VA", 37.54, -77.44),
    range(247, 268, "WV", 38.35, -81.63),
    range(270, 289, "NC", 35.78, -78.64),
    range(290, 299, "SC", 34.00, -81.03),
    range(300, 319, "GA", 33.75, -84.39),
    range(320, 326, "FL", 30.33, -81.66),
    range(327, 329, "FL", 28.54, -81.38),
    range(330, 334, "FL", 25.76, -80.19),
    range(335, 339, "FL", 27.95, -82.46),
    range(341, 349, "FL", 27.34, -81.90),
    range(350, 359, "AL", 33.52, -86.80),
    range(360, 369, "AL", 32.37, -86.30),
    range(370, 374, "TN", 36.16, -86.78),
    range(375, 375, "TN", 35.15, -90.05),
    range(376, 379, "TN", 35.96, -83.92),
    range(380, 385, "TN", 35.15, -90.05),
    range(386, 397, "MS", 32.30, -90.18),
    range(398, 399, "GA", 31.58, -84.16),
    range(400, 427, "KY", 37.84, -84.27),
    range(430, 432, "OH", 39.96, -83.00),
    range(433, 433, "OH", 40.59, -83.13),
    range(434, 436, "OH", 41.65, -83.54),
    range(437, 438, "OH", 39.94, -82.01),
    range(439, 439, "OH", 40.36, -80.61),
    range(440, 441, "OH", 41.50, -81.69),
    range(442, 443, "OH", 41.08, -81.52),
    range(444, 445, "OH", 41.10, -80.65),
    range(446, 447, "OH", 40.80, -81.38),
    range(448, 449, "OH", 40.76, -82.52),
    range(450, 452, "OH", 39.10, -84.51),
    range(453, 455, "OH", 39.76, -84.19),
    range(456, 456, "OH", 39.33, -82.98),
    range(457, 457, "OH", 39.33, -82.10),
    range(458, 458, "OH", 40.74, -84.11),
    range(459, 459, "OH", 39.10, -84.51),
    range(460, 462, "IN", 39.77, -86.16),
    range(463, 464, "IN", 41.59, -87.35),
    range(465, 469, "IN", 41.08, -85.14),
    range(470, 479, "IN", 38.50, -86.50),
    range(480, 485, "MI", 42.33, -83.05),
    range(486, 489, "MI", 43.00, -84.50),
    range(490, 499, "MI", 42.96, -85.67),
    range(500, 528, "IA", 41.59, -93.62),
    range(530, 534, "WI", 43.04, -87.91),
    range(535, 539, "WI", 43.07, -89.40),
    range(540, 549, "WI", 44.51, -88.01),
    range(550, 567, "MN", 44.98, -93.27),
    range(570, 577, "SD", 43.55, -96.73),
    range(580, 588, "ND", 46.88, -96.79),
    range(590, 599, "MT", 45.78, -108.50),
    range(600, 608, "IL", 41.88, -87.63),
    range(609, 619, "IL", 40.69, -89.59),
    range(620, 629, "IL", 39.80, -89.64),
    range(630, 639, "MO", 38.63, -90.20),
    range(640, 649, "MO", 39.10, -94.58),
    range(650, 658, "MO", 37.21, -93.29),
    range(660, 669, "KS", 39.05, -95.68),
    range(670, 679, "KS", 37.69, -97.34),
    range(680, 693, "NE", 41.26, -95.94),
    range(700, 708, "LA", 29.95, -90.07),
    range(710, 715, "LA", 32.52, -93.75),
    range(716, 729, "AR", 34.75, -92.29),
    range(730, 749, "OK", 35.47, -97.52),
    range(750, 759, "TX", 32.78, -96.80),
    range(760, 769, "TX", 32.76, -97.33),
    range(770, 779, "TX", 29.76, -95.37),
    range(780, 789, "TX", 29.42, -98.49),
    range(790, 797, "TX", 33.58, -101.85),
    range(798, 799, "TX", 31.76, -106.49),
    range(800, 816, "CO", 39.74, -104.99),
    range(820, 831, "WY", 41.14, -104.82),
    range(832, 838, "ID", 43.62, -116.20),
    range(840, 847, "UT", 40.76, -111.89),
    range(850, 865, "AZ", 33.45, -112.07),
    range(870, 884, "NM", 35.08, -106.65),
    range(885, 885, "TX", 31.76, -106.49),
    range(889, 891, "NV", 36.17, -115.14),
    range(893, 898, "NV", 39.53, -119.81),
    range(900, 918, "CA", 34.05, -118.24),
    range(919, 921, "CA", 32.72, -117.16),
    range(922, 928, "CA", 33.90, -117.60),
    range(930, 935, "CA", 35.37, -119.02),
    range(936, 939, "CA", 36.74, -119.79),
    range(940, 951, "CA", 37.55, -122.10),
    range(952, 958, "CA", 38.58, -121.49),
    range(959, 961, "CA", 40.59, -122.39),
    range(967, 968, "HI", 21.31, -157.86),
    range(970, 979, "OR", 45.52, -122.68),
    range(980, 989, "WA", 47.61, -122.33),
    range(990, 994, "WA", 47.66, -117.43),
    range(995, 999, "AK", 61.22, -149.90),
];

/// Find the range covering a three-digit prefix.
pub fn lookup_prefix(prefix: u16) -> Option<&'static PrefixRange> {
    let idx = PREFIX_RANGES.partition_point(|r| r.end < prefix);
    PREFIX_RANGES
        .get(idx)
        .filter(|r| r.start <= prefix && prefix <= r.end)
}

/// Estimate a postal code's location from its three-digit prefix.
pub fn approximate(postal_code: &str) -> Option<ZipLocation> {
    let code = normalize_postal_code(postal_code)?;
    let prefix: u16 = code[..3].parse().ok()?;
    lookup_prefix(prefix).map(|r| ZipLocation {
        label: code,
        coordinate: r.coordinate,
        state: Some(r.state.to_owned()),
        source: LocationSource::Approximation,
    })
}
