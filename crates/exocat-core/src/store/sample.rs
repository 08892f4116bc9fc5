//! Static dataset the browser ships with.

/// The five-planet reference catalog, in display order.
pub const SAMPLE_CATALOG_JSON: &str = r#"[
  {
    "id": "KEP-452b",
    "name": "Kepler-452b",
    "classification": "CONFIRMED",
    "discoveryDate": "2015-07-23",
    "distanceLy": 1402.0,
    "radiusEarth": 1.6,
    "orbitalPeriodDays": 385.0,
    "stellarTempK": 5757.0,
    "transitDepthPpm": 115.0,
    "habitabilityScore": 8.2,
    "discoveryMission": "Kepler"
  },
  {
    "id": "TRAPPIST-1e",
    "name": "TRAPPIST-1e",
    "classification": "CONFIRMED",
    "discoveryDate": "2016-05-02",
    "distanceLy": 40.0,
    "radiusEarth": 0.92,
    "orbitalPeriodDays": 6.1,
    "stellarTempK": 2559.0,
    "transitDepthPpm": 89.0,
    "habitabilityScore": 9.1,
    "discoveryMission": "TRAPPIST"
  },
  {
    "id": "TOI-715b",
    "name": "TOI-715 b",
    "classification": "CANDIDATE",
    "discoveryDate": "2024-01-31",
    "distanceLy": 137.0,
    "radiusEarth": 1.55,
    "orbitalPeriodDays": 19.3,
    "stellarTempK": 3600.0,
    "transitDepthPpm": 203.0,
    "habitabilityScore": 6.9,
    "discoveryMission": "TESS"
  },
  {
    "id": "K2-18b",
    "name": "K2-18 b",
    "classification": "CONFIRMED",
    "discoveryDate": "2015-12-15",
    "distanceLy": 124.0,
    "radiusEarth": 2.3,
    "orbitalPeriodDays": 33.0,
    "stellarTempK": 3457.0,
    "transitDepthPpm": 156.0,
    "habitabilityScore": 8.7,
    "discoveryMission": "K2"
  },
  {
    "id": "LHS-1140b",
    "name": "LHS 1140 b",
    "classification": "CONFIRMED",
    "discoveryDate": "2017-04-19",
    "distanceLy": 40.7,
    "radiusEarth": 1.4,
    "orbitalPeriodDays": 24.7,
    "stellarTempK": 3216.0,
    "transitDepthPpm": 178.0,
    "habitabilityScore": 7.8,
    "discoveryMission": "K2"
  }
]"#;
