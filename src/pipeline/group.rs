//! Group/aggregate engine.
//!
//! Rows are partitioned by the display string of the grouping column,
//! partitions are emitted in first-seen order, and each partition collapses
//! into one row holding the group value plus one field per aggregation.

use crate::data::upper_median;
use crate::pipeline::config::{AggregateFunction, Aggregation};
use crate::types::{CellValue, Record};
use std::collections::HashMap;

impl AggregateFunction {
    /// Reduce the parseable values of a partition of `partition_size` rows.
    ///
    /// `count` is the partition size. Every other function yields `0` when
    /// no value parses.
    pub fn reduce(&self, values: &[f64], partition_size: usize) -> f64 {
        if *self == AggregateFunction::Count {
            return partition_size as f64;
        }
        if values.is_empty() {
            return 0.0;
        }
        match self {
            AggregateFunction::Sum => values.iter().sum(),
            AggregateFunction::Average => values.iter().sum::<f64>() / values.len() as f64,
            AggregateFunction::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            AggregateFunction::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            AggregateFunction::Median => upper_median(values).unwrap_or(0.0),
            AggregateFunction::Count => partition_size as f64,
        }
    }
}

/// Replace `rows` with one aggregated row per distinct `group_by` value.
///
/// A `None` grouping column passes rows through unchanged.
pub fn apply_grouping(rows: Vec<Record>, group_by: Option<&str>, aggregations: &[Aggregation]) -> Vec<Record> {
    let Some(group_by) = group_by else {
        return rows;
    };

    // Partition, preserving first-seen order
    let mut group_order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Record>> = HashMap::new();
    for row in rows {
        let key = row.value(group_by).to_string();
        if !groups.contains_key(&key) {
            group_order.push(key.clone());
        }
        groups.entry(key).or_default().push(row);
    }

    let active: Vec<&Aggregation> = aggregations.iter().filter(|a| !a.column.is_empty()).collect();

    group_order
        .into_iter()
        .filter_map(|key| groups.remove(&key).map(|members| (key, members)))
        .map(|(key, members)| {
            let mut row = Record::with_capacity(active.len() + 1);
            row.insert(group_by, CellValue::Text(key));
            for aggregation in &active {
                let values: Vec<f64> = members
                    .iter()
                    .filter_map(|member| member.value(&aggregation.column).leading_f64())
                    .collect();
                let result = aggregation.function.reduce(&values, members.len());
                row.insert(aggregation.output_name(), CellValue::Number(result));
            }
            row
        })
        .collect()
}
