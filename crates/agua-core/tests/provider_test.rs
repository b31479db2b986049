use agua_core::{InMemoryReadings, Measurement, ReadingQuery, ReadingsProvider, TimeRange};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 2, 16, 0, 0).unwrap() + Duration::minutes(minute)
}

fn seeded() -> InMemoryReadings {
    // inserted out of order on purpose
    InMemoryReadings::with_readings(vec![
        Measurement::new("SETOR-A-01", at(2), 12.0),
        Measurement::new("SETOR-B-01", at(1), 20.0),
        Measurement::new("SETOR-A-01", at(0), 10.0),
        Measurement::new("SETOR-A-01", at(1), 11.0),
        Measurement::new("SETOR-B-01", at(3), 21.0),
    ])
    .unwrap()
}

#[test]
fn test_fetch_is_ascending() {
    let store = seeded();
    let all = store.fetch(&ReadingQuery::default()).unwrap();

    assert_eq!(all.len(), 5);
    assert!(all.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn test_fetch_by_meter() {
    let store = seeded();
    let a = store.fetch(&ReadingQuery::for_meter("SETOR-A-01")).unwrap();

    let flows: Vec<f64> = a.iter().map(|m| m.flow_value).collect();
    assert_eq!(flows, vec![10.0, 11.0, 12.0]);
}

#[test]
fn test_fetch_limit_keeps_most_recent() {
    let store = seeded();
    let latest = store.fetch(&ReadingQuery::default().with_limit(2)).unwrap();

    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].timestamp, at(2));
    assert_eq!(latest[1].timestamp, at(3));
}

#[test]
fn test_fetch_time_range_then_limit() {
    let store = seeded();
    let query = ReadingQuery::default()
        .with_time_range(TimeRange::new(Some(at(0)), Some(at(2))))
        .with_limit(3);
    let rows = store.fetch(&query).unwrap();

    // at(3) is outside the range; of the four remaining the oldest is dropped
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|m| m.timestamp >= at(1) && m.timestamp <= at(2)));
}

#[test]
fn test_count() {
    let store = seeded();
    assert_eq!(store.count(None).unwrap(), 5);
    assert_eq!(store.count(Some("SETOR-B-01")).unwrap(), 2);
    assert_eq!(store.count(Some("SETOR-Z-99")).unwrap(), 0);
}

#[test]
fn test_insert_rejects_bad_reading() {
    let store = InMemoryReadings::new();
    assert!(store.insert(Measurement::new("", at(0), 1.0)).is_err());
    assert!(store.insert(Measurement::new("SETOR-A-01", at(0), f64::NAN)).is_err());
    assert_eq!(store.count(None).unwrap(), 0);
}

#[test]
fn test_measurement_json_shape() {
    let m = Measurement::new("SETOR-A-01", at(0), 12.5);
    let json = serde_json::to_value(&m).unwrap();

    assert_eq!(json["meter_code"], "SETOR-A-01");
    assert_eq!(json["flow_value"], 12.5);
    assert_eq!(json["timestamp"], "2025-11-02T16:00:00Z");
}
