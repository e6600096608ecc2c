//! Percentile extraction and median smoothing

use crate::estimator::{
    error::EstimationError,
    types::FeeHistoryBatch,
};

/// Collect the reward at `percentile_index` from every sample, oldest first.
pub fn extract_percentile_column(
    batch: &FeeHistoryBatch,
    percentile_index: usize,
) -> Result<Vec<u128>, EstimationError> {
    batch
        .samples
        .iter()
        .map(|sample| {
            sample.rewards.get(percentile_index).copied().ok_or_else(|| {
                EstimationError::data_integrity(format!(
                    "block {} has no reward at percentile index {}",
                    sample.block_number, percentile_index
                ))
            })
        })
        .collect()
}

/// Median of `values`; even lengths average the two middle values.
pub fn median(values: &[u128]) -> Result<f64, EstimationError> {
    if values.is_empty() {
        return Err(EstimationError::insufficient_data("median of empty reward sequence"));
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(sorted[mid] as f64)
    } else {
        Ok((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
    }
}

/// Outlier-resistant priority fee for one percentile column.
pub fn smoothed_priority_fee(
    batch: &FeeHistoryBatch,
    percentile_index: usize,
) -> Result<f64, EstimationError> {
    if batch.is_empty() {
        return Err(EstimationError::insufficient_data(
            "priority fee smoothing over an empty batch",
        ));
    }
    median(&extract_percentile_column(batch, percentile_index)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::types::FeeHistorySample;

    fn batch_from_rows(rows: Vec<Vec<u128>>) -> FeeHistoryBatch {
        FeeHistoryBatch {
            samples: rows
                .into_iter()
                .enumerate()
                .map(|(i, rewards)| FeeHistorySample {
                    block_number: 100 + i as u64,
                    base_fee_per_gas: 1_000,
                    gas_used_ratio: 0.5,
                    rewards,
                })
                .collect(),
            pending_base_fee: 1_000,
            percentiles: vec![30.0, 60.0],
        }
    }

    #[test]
    fn odd_length_median_is_middle_value() {
        assert_eq!(median(&[5, 1, 3]).unwrap(), 3.0);
    }

    #[test]
    fn even_length_median_averages_middle_pair() {
        assert_eq!(median(&[4, 1, 3, 2]).unwrap(), 2.5);
    }

    #[test]
    fn empty_sequence_is_insufficient_data() {
        assert!(matches!(
            median(&[]),
            Err(EstimationError::InsufficientData { .. })
        ));
    }

    #[test]
    fn extracts_requested_column_in_block_order() {
        let batch = batch_from_rows(vec![vec![1, 10], vec![2, 20], vec![3, 30]]);
        assert_eq!(extract_percentile_column(&batch, 1).unwrap(), vec![10, 20, 30]);
    }

    #[test]
    fn missing_column_is_integrity_error() {
        let batch = batch_from_rows(vec![vec![1, 10], vec![2]]);
        assert!(matches!(
            extract_percentile_column(&batch, 1),
            Err(EstimationError::DataIntegrity { .. })
        ));
    }

    #[test]
    fn single_outlier_block_is_ignored() {
        let batch = batch_from_rows(vec![
            vec![1_000_000_000, 2_000_000_000],
            vec![1_000_000_000, 2_000_000_000],
            vec![1_000_000_000, 900_000_000_000],
            vec![1_000_000_000, 2_000_000_000],
            vec![1_000_000_000, 2_000_000_000],
        ]);
        assert_eq!(smoothed_priority_fee(&batch, 1).unwrap(), 2_000_000_000.0);
    }

    #[test]
    fn empty_batch_is_insufficient_data() {
        let batch = batch_from_rows(vec![]);
        assert!(matches!(
            smoothed_priority_fee(&batch, 0),
            Err(EstimationError::InsufficientData { .. })
        ));
    }
}
