use std::collections::BTreeMap;

use crate::scoring::Score;
use crate::types::TransactionRecord;

/// The original input rows with a score attached to every row the encoder kept.
#[derive(Debug, Clone)]
pub struct ScoredTable {
    headers: Vec<String>,
    records: Vec<TransactionRecord>,
    scores: Vec<Option<Score>>
}

/// Mean fraud risk of the rows sharing one combination of field values.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRisk {
    pub key: Vec<String>,
    pub mean_risk: f64,
    pub transactions: usize
}

impl ScoredTable {
    /// `scores` must be parallel to `records`; rows dropped by the encoder carry `None`.
    pub fn new(headers: Vec<String>, records: Vec<TransactionRecord>, scores: Vec<Option<Score>>) -> Self {
        debug_assert_eq!(records.len(), scores.len());

        Self {
            headers,
            records,
            scores
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All rows in input order, scored or not.
    pub fn rows(&self) -> impl Iterator<Item = (&TransactionRecord, Option<&Score>)> {
        self.records.iter().zip(self.scores.iter().map(Option::as_ref))
    }

    pub fn scored_rows(&self) -> impl Iterator<Item = (&TransactionRecord, &Score)> {
        self.records.iter().zip(&self.scores).filter_map(|(record, score)| score.as_ref().map(|score| (record, score)))
    }

    pub fn scored_count(&self) -> usize {
        self.scores.iter().flatten().count()
    }

    pub fn flagged_count(&self) -> usize {
        self.scores.iter().flatten().filter(|score| score.flagged).count()
    }

    /// Rows whose probability is strictly above `threshold`.
    pub fn above_threshold(&self, threshold: f64) -> Vec<(&TransactionRecord, f64)> {
        self.scored_rows()
            .filter(|(_, score)| score.probability > threshold)
            .map(|(record, score)| (record, score.probability))
            .collect()
    }

    pub fn high_risk_count(&self, level: f64) -> usize {
        self.scored_rows().filter(|(_, score)| score.probability > level).count()
    }

    /// Mean probability per combination of `fields` values, ordered by key.
    /// Rows missing any grouping value are left out.
    pub fn mean_risk_by(&self, fields: &[String]) -> Vec<GroupRisk> {
        let mut groups: BTreeMap<Vec<String>, (f64, usize)> = BTreeMap::new();

        for (record, score) in self.scored_rows() {
            let key: Option<Vec<String>> = fields.iter()
                .map(|field| record.value(field).map(str::to_string))
                .collect();

            if let Some(key) = key {
                let entry = groups.entry(key).or_insert((0.0, 0));
                entry.0 += score.probability;
                entry.1 += 1;
            }
        }

        groups.into_iter()
            .map(|(key, (total, transactions))| GroupRisk {
                key,
                mean_risk: total / transactions as f64,
                transactions
            })
            .collect()
    }
}
