use crate::data::price::PriceRecord;
use crate::error::{MetricsError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Reverse;

//price history for one security, most recent record first
//dates are unique and strictly decreasing by index
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceSeries {
    records: Vec<PriceRecord>,
}

impl PriceSeries {
    //builds a series from records in any order
    pub fn new(mut records: Vec<PriceRecord>) -> Result<Self> {
        records.sort_by_key(|r| Reverse(r.date));

        if let Some(pair) = records.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(MetricsError::DuplicateDate { date: pair[0].date });
        }

        Ok(PriceSeries { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    //most recent record
    pub fn latest(&self) -> Option<&PriceRecord> {
        self.records.first()
    }

    pub fn oldest(&self) -> Option<&PriceRecord> {
        self.records.last()
    }

    pub fn get(&self, index: usize) -> Option<&PriceRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceRecord> {
        self.records.iter()
    }

    //exact-date lookup; binary search over the descending order
    pub fn find(&self, date: NaiveDate) -> Option<&PriceRecord> {
        self.records
            .binary_search_by(|r| date.cmp(&r.date))
            .ok()
            .map(|i| &self.records[i])
    }

    //index of the first record dated on or before the cutoff
    pub fn position_on_or_before(&self, cutoff: NaiveDate) -> Option<usize> {
        let index = self.records.partition_point(|r| r.date > cutoff);
        (index < self.records.len()).then_some(index)
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PriceRecord;
    type IntoIter = std::slice::Iter<'a, PriceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
