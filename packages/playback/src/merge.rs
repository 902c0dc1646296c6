//! Joining the active date's records onto boundary geometry.

use covid_map_covid_models::{DailyRecord, DateKey, TimeSeriesIndex};
use covid_map_geography::boundaries::feature_region;
use covid_map_geography_models::fips::postal_to_name;
use geojson::{FeatureCollection, JsonObject, JsonValue};

/// Copies `geometry` and annotates every region with its record for `date`.
///
/// Regions without a record for `date` get a zero-valued record rather than
/// being left bare, so the fill expression always has a number to read.
/// Features whose region cannot be identified are copied unchanged.
/// Geometry is never modified.
#[must_use]
pub fn compute_merged_geometry(
    geometry: &FeatureCollection,
    series: &TimeSeriesIndex,
    date: DateKey,
) -> FeatureCollection {
    let features = geometry
        .features
        .iter()
        .map(|feature| {
            let mut merged = feature.clone();
            let Some(region) = feature_region(feature) else {
                return merged;
            };

            let fallback;
            let record = if let Some(record) = series.get(region, date) {
                record
            } else {
                fallback = DailyRecord::empty(region, date);
                &fallback
            };

            let properties = merged.properties.get_or_insert_with(JsonObject::new);
            if !properties.contains_key("name") {
                if let Some(name) = postal_to_name(region) {
                    properties.insert("name".to_string(), JsonValue::from(name));
                }
            }
            properties.extend(record_properties(record));
            merged
        })
        .collect();

    FeatureCollection {
        bbox: geometry.bbox.clone(),
        features,
        foreign_members: geometry.foreign_members.clone(),
    }
}

/// A record's fields as feature properties, keyed the way the provider
/// names them.
fn record_properties(record: &DailyRecord) -> JsonObject {
    let mut properties = JsonObject::new();
    properties.insert("state".to_string(), JsonValue::from(record.state.clone()));
    properties.insert("date".to_string(), JsonValue::from(record.date.value()));
    properties.insert("positive".to_string(), JsonValue::from(record.positive));
    properties.insert(
        "positiveIncrease".to_string(),
        JsonValue::from(record.positive_increase),
    );
    properties.insert("death".to_string(), JsonValue::from(record.death));
    properties.insert(
        "dataQualityGrade".to_string(),
        record
            .data_quality_grade
            .as_ref()
            .map_or(JsonValue::Null, |g| JsonValue::from(g.as_str())),
    );
    properties.insert(
        "dateChecked".to_string(),
        record
            .date_checked
            .clone()
            .map_or(JsonValue::Null, JsonValue::from),
    );
    properties
}

#[cfg(test)]
mod tests {
    use covid_map_covid_models::DataQualityGrade;
    use covid_map_geography::boundaries::parse_boundaries;

    use super::*;

    const STATES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "NY",
                "properties": { "name": "New York", "density": 412.3 },
                "geometry": { "type": "Point", "coordinates": [-75.0, 43.0] }
            },
            {
                "type": "Feature",
                "id": "56",
                "properties": {},
                "geometry": { "type": "Point", "coordinates": [-107.5, 43.0] }
            },
            {
                "type": "Feature",
                "properties": { "name": "Nowhere" },
                "geometry": null
            }
        ]
    }"#;

    fn series() -> TimeSeriesIndex {
        TimeSeriesIndex::from_records(vec![
            DailyRecord {
                positive: 7102,
                positive_increase: 2950,
                death: 35,
                ..DailyRecord::empty("NY", DateKey::new(20200320))
            },
            DailyRecord {
                positive: 1,
                ..DailyRecord::empty("WY", DateKey::new(20200319))
            },
        ])
    }

    #[test]
    fn attaches_active_date_record() {
        let geometry = parse_boundaries(STATES).unwrap();
        let merged = compute_merged_geometry(&geometry, &series(), DateKey::new(20200320));

        let ny = merged.features[0].properties.as_ref().unwrap();
        assert_eq!(ny["positive"], 7102);
        assert_eq!(ny["positiveIncrease"], 2950);
        assert_eq!(ny["death"], 35);
        assert_eq!(ny["date"], 20200320);
        assert_eq!(ny["name"], "New York");
        assert_eq!(ny["density"], 412.3);
    }

    #[test]
    fn missing_record_gets_zero_default() {
        let geometry = parse_boundaries(STATES).unwrap();
        let merged = compute_merged_geometry(&geometry, &series(), DateKey::new(20200320));

        let wy = merged.features[1].properties.as_ref().unwrap();
        assert_eq!(wy["positive"], 0);
        assert_eq!(wy["death"], 0);
        assert_eq!(wy["state"], "WY");
        assert_eq!(wy["name"], "Wyoming");
    }

    #[test]
    fn provider_grade_written_verbatim() {
        let geometry = parse_boundaries(STATES).unwrap();
        let series = TimeSeriesIndex::from_records(vec![DailyRecord {
            data_quality_grade: Some(DataQualityGrade::Other("N/A".to_string())),
            ..DailyRecord::empty("NY", DateKey::new(20200320))
        }]);
        let merged = compute_merged_geometry(&geometry, &series, DateKey::new(20200320));

        let ny = merged.features[0].properties.as_ref().unwrap();
        assert_eq!(ny["dataQualityGrade"], "N/A");
        let wy = merged.features[1].properties.as_ref().unwrap();
        assert!(wy["dataQualityGrade"].is_null());
    }

    #[test]
    fn unresolvable_feature_is_copied() {
        let geometry = parse_boundaries(STATES).unwrap();
        let merged = compute_merged_geometry(&geometry, &series(), DateKey::new(20200320));
        assert_eq!(merged.features[2], geometry.features[2]);
    }

    #[test]
    fn geometry_and_source_untouched() {
        let geometry = parse_boundaries(STATES).unwrap();
        let before = geometry.clone();
        let merged = compute_merged_geometry(&geometry, &series(), DateKey::new(20200320));

        assert_eq!(geometry, before);
        assert_eq!(merged.features.len(), geometry.features.len());
        for (m, g) in merged.features.iter().zip(&geometry.features) {
            assert_eq!(m.geometry, g.geometry);
            assert_eq!(m.id, g.id);
        }
    }

    #[test]
    fn idempotent() {
        let geometry = parse_boundaries(STATES).unwrap();
        let series = series();
        let a = compute_merged_geometry(&geometry, &series, DateKey::new(20200320));
        let b = compute_merged_geometry(&geometry, &series, DateKey::new(20200320));
        assert_eq!(a, b);
    }

    #[test]
    fn follows_date_change() {
        let geometry = parse_boundaries(STATES).unwrap();
        let merged = compute_merged_geometry(&geometry, &series(), DateKey::new(20200319));
        let ny = merged.features[0].properties.as_ref().unwrap();
        let wy = merged.features[1].properties.as_ref().unwrap();
        assert_eq!(ny["positive"], 0);
        assert_eq!(wy["positive"], 1);
    }
}
