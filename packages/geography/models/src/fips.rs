//! US region code utilities.
//!
//! Maps between two-digit FIPS codes, two-letter postal abbreviations, and
//! full names for the 50 states, DC, and the five inhabited territories the
//! case-data provider reports on.

/// `(fips, postal, name)` for every region the map can display.
pub const REGIONS: &[(&str, &str, &str)] = &[
    ("01", "AL", "Alabama"),
    ("02", "AK", "Alaska"),
    ("04", "AZ", "Arizona"),
    ("05", "AR", "Arkansas"),
    ("06", "CA", "California"),
    ("08", "CO", "Colorado"),
    ("09", "CT", "Connecticut"),
    ("10", "DE", "Delaware"),
    ("11", "DC", "District of Columbia"),
    ("12", "FL", "Florida"),
    ("13", "GA", "Georgia"),
    ("15", "HI", "Hawaii"),
    ("16", "ID", "Idaho"),
    ("17", "IL", "Illinois"),
    ("18", "IN", "Indiana"),
    ("19", "IA", "Iowa"),
    ("20", "KS", "Kansas"),
    ("21", "KY", "Kentucky"),
    ("22", "LA", "Louisiana"),
    ("23", "ME", "Maine"),
    ("24", "MD", "Maryland"),
    ("25", "MA", "Massachusetts"),
    ("26", "MI", "Michigan"),
    ("27", "MN", "Minnesota"),
    ("28", "MS", "Mississippi"),
    ("29", "MO", "Missouri"),
    ("30", "MT", "Montana"),
    ("31", "NE", "Nebraska"),
    ("32", "NV", "Nevada"),
    ("33", "NH", "New Hampshire"),
    ("34", "NJ", "New Jersey"),
    ("35", "NM", "New Mexico"),
    ("36", "NY", "New York"),
    ("37", "NC", "North Carolina"),
    ("38", "ND", "North Dakota"),
    ("39", "OH", "Ohio"),
    ("40", "OK", "Oklahoma"),
    ("41", "OR", "Oregon"),
    ("42", "PA", "Pennsylvania"),
    ("44", "RI", "Rhode Island"),
    ("45", "SC", "South Carolina"),
    ("46", "SD", "South Dakota"),
    ("47", "TN", "Tennessee"),
    ("48", "TX", "Texas"),
    ("49", "UT", "Utah"),
    ("50", "VT", "Vermont"),
    ("51", "VA", "Virginia"),
    ("53", "WA", "Washington"),
    ("54", "WV", "West Virginia"),
    ("55", "WI", "Wisconsin"),
    ("56", "WY", "Wyoming"),
    ("60", "AS", "American Samoa"),
    ("66", "GU", "Guam"),
    ("69", "MP", "Northern Mariana Islands"),
    ("72", "PR", "Puerto Rico"),
    ("78", "VI", "U.S. Virgin Islands"),
];

/// Maps a two-digit FIPS code to its postal abbreviation.
#[must_use]
pub fn fips_to_postal(fips: &str) -> Option<&'static str> {
    REGIONS
        .iter()
        .find(|(f, _, _)| *f == fips)
        .map(|(_, postal, _)| *postal)
}

/// Maps a postal abbreviation (any case) to its FIPS code.
#[must_use]
pub fn postal_to_fips(postal: &str) -> Option<&'static str> {
    REGIONS
        .iter()
        .find(|(_, p, _)| p.eq_ignore_ascii_case(postal))
        .map(|(fips, _, _)| *fips)
}

/// Full region name for a postal abbreviation (any case).
#[must_use]
pub fn postal_to_name(postal: &str) -> Option<&'static str> {
    REGIONS
        .iter()
        .find(|(_, p, _)| p.eq_ignore_ascii_case(postal))
        .map(|(_, _, name)| *name)
}

/// Normalizes a region identifier to its canonical postal abbreviation.
///
/// Accepts postal codes in any case or two-digit FIPS codes (a single
/// digit is zero-padded, since numeric GeoJSON ids drop the leading zero).
#[must_use]
pub fn normalize_region(id: &str) -> Option<&'static str> {
    let id = id.trim();
    if id.bytes().all(|b| b.is_ascii_digit()) {
        return match id.len() {
            1 => fips_to_postal(&format!("0{id}")),
            2 => fips_to_postal(id),
            _ => None,
        };
    }
    REGIONS
        .iter()
        .find(|(_, p, _)| p.eq_ignore_ascii_case(id))
        .map(|(_, postal, _)| *postal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_count() {
        assert_eq!(REGIONS.len(), 56);
    }

    #[test]
    fn postal_roundtrip() {
        for (fips, postal, _) in REGIONS {
            assert_eq!(fips_to_postal(fips), Some(*postal));
            assert_eq!(
                postal_to_fips(postal),
                Some(*fips),
                "roundtrip failed for {fips} -> {postal}"
            );
        }
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(fips_to_postal("99"), None);
        assert_eq!(postal_to_fips("XX"), None);
        assert_eq!(postal_to_name("XX"), None);
    }

    #[test]
    fn case_insensitive_postal() {
        assert_eq!(postal_to_fips("ny"), Some("36"));
        assert_eq!(postal_to_name("Pr"), Some("Puerto Rico"));
    }

    #[test]
    fn normalize_accepts_fips_and_postal() {
        assert_eq!(normalize_region("36"), Some("NY"));
        assert_eq!(normalize_region("6"), Some("CA"));
        assert_eq!(normalize_region("wa"), Some("WA"));
        assert_eq!(normalize_region(" DC "), Some("DC"));
        assert_eq!(normalize_region("360"), None);
        assert_eq!(normalize_region("New York"), None);
    }
}
