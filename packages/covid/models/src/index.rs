//! Grouped lookups over daily records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{DailyRecord, DateKey, NationalRecord};

/// Region -> date -> record lookup.
///
/// Holds at most one record per `(region, date)` pair. Built once per
/// fetch and replaced wholesale afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeSeriesIndex {
    regions: BTreeMap<String, BTreeMap<DateKey, DailyRecord>>,
}

impl TimeSeriesIndex {
    /// Groups a flat list of records by region, then by date.
    ///
    /// When two records share a `(region, date)` slot the later one wins.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = DailyRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Places a record in its `(region, date)` slot, returning the record
    /// it displaced, if any.
    pub fn insert(&mut self, record: DailyRecord) -> Option<DailyRecord> {
        self.regions
            .entry(record.state.clone())
            .or_default()
            .insert(record.date, record)
    }

    /// Looks up a region's record for a date.
    #[must_use]
    pub fn get(&self, region: &str, date: DateKey) -> Option<&DailyRecord> {
        self.regions.get(region).and_then(|dates| dates.get(&date))
    }

    /// All records for one region, ordered by date.
    #[must_use]
    pub fn region(&self, region: &str) -> Option<&BTreeMap<DateKey, DailyRecord>> {
        self.regions.get(region)
    }

    /// Region codes present in the index, in sorted order.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    /// Number of distinct regions.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Total number of records across all regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.values().all(BTreeMap::is_empty)
    }
}

/// Date -> national aggregate lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NationalAggregateIndex {
    by_date: BTreeMap<DateKey, NationalRecord>,
}

impl NationalAggregateIndex {
    /// Indexes national records by date. Later records replace earlier ones
    /// for the same date.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = NationalRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Places a record in its date slot, returning the displaced record.
    pub fn insert(&mut self, record: NationalRecord) -> Option<NationalRecord> {
        self.by_date.insert(record.date, record)
    }

    #[must_use]
    pub fn get(&self, date: DateKey) -> Option<&NationalRecord> {
        self.by_date.get(&date)
    }

    /// The ascending range of dates this index covers.
    #[must_use]
    pub fn date_range(&self) -> DateRange {
        DateRange(self.by_date.keys().copied().collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

/// Strictly ascending, duplicate-free sequence of available dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DateRange(Vec<DateKey>);

impl DateRange {
    /// Builds a range from dates in any order, sorting and removing
    /// duplicates.
    #[must_use]
    pub fn from_dates(dates: impl IntoIterator<Item = DateKey>) -> Self {
        let mut dates: Vec<DateKey> = dates.into_iter().collect();
        dates.sort_unstable();
        dates.dedup();
        Self(dates)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<DateKey> {
        self.0.get(index).copied()
    }

    /// Position of a date in the range.
    #[must_use]
    pub fn position(&self, date: DateKey) -> Option<usize> {
        self.0.binary_search(&date).ok()
    }

    #[must_use]
    pub fn first(&self) -> Option<DateKey> {
        self.0.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<DateKey> {
        self.0.last().copied()
    }

    /// Index of the last date, or `None` when empty.
    #[must_use]
    pub const fn last_index(&self) -> Option<usize> {
        self.0.len().checked_sub(1)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[DateKey] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(state: &str, date: u32, positive: u64) -> DailyRecord {
        DailyRecord {
            positive,
            ..DailyRecord::empty(state, DateKey::new(date))
        }
    }

    fn national(date: u32) -> NationalRecord {
        NationalRecord {
            date: DateKey::new(date),
            positive: 0,
            positive_increase: 0,
            death: 0,
            date_checked: None,
        }
    }

    #[test]
    fn groups_every_record_into_one_slot() {
        let records = vec![
            record("NY", 20200302, 1),
            record("WA", 20200302, 2),
            record("NY", 20200301, 3),
            record("WA", 20200303, 4),
        ];
        let index = TimeSeriesIndex::from_records(records.clone());

        assert_eq!(index.len(), records.len());
        assert_eq!(index.region_count(), 2);
        for r in &records {
            assert_eq!(index.get(&r.state, r.date), Some(r));
        }
    }

    #[test]
    fn later_duplicate_wins() {
        let mut index = TimeSeriesIndex::default();
        assert!(index.insert(record("NY", 20200302, 1)).is_none());
        let displaced = index.insert(record("NY", 20200302, 9));
        assert_eq!(displaced.map(|r| r.positive), Some(1));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("NY", DateKey::new(20200302)).unwrap().positive, 9);
    }

    #[test]
    fn missing_lookups_are_none() {
        let index = TimeSeriesIndex::from_records(vec![record("NY", 20200302, 1)]);
        assert!(index.get("NY", DateKey::new(20200303)).is_none());
        assert!(index.get("CA", DateKey::new(20200302)).is_none());
    }

    #[test]
    fn empty_index() {
        let index = TimeSeriesIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn national_date_range_is_ascending() {
        let index = NationalAggregateIndex::from_records(vec![
            national(20200305),
            national(20200301),
            national(20200303),
            national(20200301),
        ]);
        let range = index.date_range();
        assert_eq!(
            range.as_slice(),
            &[
                DateKey::new(20200301),
                DateKey::new(20200303),
                DateKey::new(20200305)
            ]
        );
        assert!(range.as_slice().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn date_range_from_unordered_dates() {
        let range =
            DateRange::from_dates([20200103, 20200101, 20200102, 20200101].map(DateKey::new));
        assert_eq!(range.len(), 3);
        assert_eq!(range.first(), Some(DateKey::new(20200101)));
        assert_eq!(range.last(), Some(DateKey::new(20200103)));
        assert_eq!(range.position(DateKey::new(20200102)), Some(1));
        assert_eq!(range.last_index(), Some(2));
    }

    #[test]
    fn empty_range_has_no_last_index() {
        assert_eq!(DateRange::default().last_index(), None);
    }
}
