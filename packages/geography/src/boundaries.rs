//! Boundary `FeatureCollection` loading and region id resolution.

use std::path::{Path, PathBuf};

use covid_map_geography_models::fips::normalize_region;
use geojson::{Feature, FeatureCollection, GeoJson, feature::Id};

use crate::GeoError;

/// Property names checked, in order, when a feature has no usable `id`.
const REGION_PROPERTY_KEYS: &[&str] = &["state", "postal", "STUSPS", "STATEFP"];

/// Where the boundary document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundarySource {
    File(PathBuf),
    Url(String),
}

impl BoundarySource {
    /// Interprets a configuration value: `http://` and `https://` values
    /// are URLs, anything else is a file path.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}

/// Loads the boundary collection from its configured source.
///
/// # Errors
///
/// Returns [`GeoError`] if the document cannot be read or is not a
/// `FeatureCollection`.
pub async fn load_boundaries(source: &BoundarySource) -> Result<FeatureCollection, GeoError> {
    let collection = match source {
        BoundarySource::File(path) => read_boundaries(path).await?,
        BoundarySource::Url(url) => fetch_boundaries(url).await?,
    };

    let unresolved = collection
        .features
        .iter()
        .filter(|f| feature_region(f).is_none())
        .count();
    if unresolved > 0 {
        log::warn!(
            "{unresolved} of {} boundary features have no recognizable region id",
            collection.features.len()
        );
    }
    log::info!("Loaded {} boundary features", collection.features.len());

    Ok(collection)
}

async fn read_boundaries(path: &Path) -> Result<FeatureCollection, GeoError> {
    log::info!("Reading boundaries from {}", path.display());
    let text = tokio::fs::read_to_string(path).await?;
    parse_boundaries(&text)
}

async fn fetch_boundaries(url: &str) -> Result<FeatureCollection, GeoError> {
    log::info!("Fetching boundaries from {url}");
    let text = reqwest::get(url).await?.error_for_status()?.text().await?;
    parse_boundaries(&text)
}

/// Parses a `GeoJSON` document that must be a `FeatureCollection`.
///
/// # Errors
///
/// Returns [`GeoError`] if the text is not `GeoJSON` or is a bare
/// `Feature`/`Geometry`.
pub fn parse_boundaries(text: &str) -> Result<FeatureCollection, GeoError> {
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(_) => Err(GeoError::Conversion {
            message: "expected a FeatureCollection, found a single Feature".to_string(),
        }),
        GeoJson::Geometry(_) => Err(GeoError::Conversion {
            message: "expected a FeatureCollection, found a bare Geometry".to_string(),
        }),
    }
}

/// Resolves a feature to its canonical postal code.
///
/// Uses the feature `id` first (postal or FIPS, string or number), then
/// falls back to well-known property names.
#[must_use]
pub fn feature_region(feature: &Feature) -> Option<&'static str> {
    let from_id = feature.id.as_ref().and_then(|id| match id {
        Id::String(s) => normalize_region(s),
        Id::Number(n) => normalize_region(&n.to_string()),
    });

    from_id.or_else(|| {
        REGION_PROPERTY_KEYS.iter().find_map(|key| {
            feature
                .property(key)
                .and_then(serde_json::Value::as_str)
                .and_then(normalize_region)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "NY",
                "properties": { "name": "New York" },
                "geometry": { "type": "Point", "coordinates": [-75.0, 43.0] }
            },
            {
                "type": "Feature",
                "id": 6,
                "properties": { "name": "California" },
                "geometry": { "type": "Point", "coordinates": [-119.0, 37.0] }
            },
            {
                "type": "Feature",
                "properties": { "name": "Washington", "STUSPS": "WA" },
                "geometry": { "type": "Point", "coordinates": [-120.0, 47.0] }
            },
            {
                "type": "Feature",
                "properties": { "name": "Atlantis" },
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn parses_collection() {
        let collection = parse_boundaries(SAMPLE).unwrap();
        assert_eq!(collection.features.len(), 4);
    }

    #[test]
    fn resolves_regions_from_ids_and_properties() {
        let collection = parse_boundaries(SAMPLE).unwrap();
        let regions: Vec<Option<&str>> = collection.features.iter().map(feature_region).collect();
        assert_eq!(regions, vec![Some("NY"), Some("CA"), Some("WA"), None]);
    }

    #[test]
    fn rejects_single_feature() {
        let text = r#"{"type":"Feature","properties":{},"geometry":null}"#;
        assert!(matches!(
            parse_boundaries(text),
            Err(GeoError::Conversion { .. })
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_boundaries("not json"),
            Err(GeoError::GeoJson(_))
        ));
    }

    #[test]
    fn source_parsing() {
        assert_eq!(
            BoundarySource::parse("https://example.com/states.json"),
            BoundarySource::Url("https://example.com/states.json".to_string())
        );
        assert_eq!(
            BoundarySource::parse("data/us-states.geojson"),
            BoundarySource::File(PathBuf::from("data/us-states.geojson"))
        );
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let source = BoundarySource::File(PathBuf::from("/nonexistent/us-states.geojson"));
        assert!(matches!(
            load_boundaries(&source).await,
            Err(GeoError::Io(_))
        ));
    }
}
