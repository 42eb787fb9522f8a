//! Daily sentiment series built from the batch result set.
//!
//! Rows are grouped by their manifest date. Each day carries summed
//! sentence buckets, the mean article score, and a centered rolling mean of
//! that mean. The window is the configured size (5 by default) shrunk to
//! the number of days when the series is shorter. Days too close to either
//! end of the series for a full window get no rolling value; partial
//! windows are never averaged.

use crate::models::{DailyAggregate, ResultRow};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Default)]
struct DayTotals {
    articles: usize,
    positive: usize,
    negative: usize,
    neutral: usize,
    score_sum: f64,
}

/// Group rows by date, oldest first.
pub fn aggregate(rows: &[ResultRow], window: usize) -> Vec<DailyAggregate> {
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for row in rows {
        let day = days.entry(row.date).or_default();
        day.articles += 1;
        day.positive += row.positive_count;
        day.negative += row.negative_count;
        day.neutral += row.neutral_count;
        day.score_sum += row.sentiment_score;
    }

    let means: Vec<f64> = days
        .values()
        .map(|d| d.score_sum / d.articles as f64)
        .collect();
    let rolling = centered_rolling_mean(&means, window.min(means.len()));

    days.into_iter()
        .zip(means)
        .zip(rolling)
        .map(|(((date, d), mean_score), rolling_mean_score)| DailyAggregate {
            date,
            article_count: d.articles,
            positive_count: d.positive,
            negative_count: d.negative,
            neutral_count: d.neutral,
            mean_score,
            rolling_mean_score,
        })
        .collect()
}

/// Centered moving average with no partial windows.
///
/// The window ending at `i + (window - 1) / 2` is reported at `i`, so an odd
/// window is symmetric around `i` and an even one leans one step back.
pub fn centered_rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    let ahead = (window - 1) / 2;
    let behind = window - 1 - ahead;
    (0..values.len())
        .map(|i| {
            if i < behind || i + ahead >= values.len() {
                return None;
            }
            let slice = &values[i - behind..=i + ahead];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentLabel;

    fn row(date: (i32, u32, u32), score: f64, pos: usize, neg: usize, neu: usize) -> ResultRow {
        ResultRow {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            url: format!("https://example.com/{}-{}", date.2, score),
            title: "t".to_string(),
            sentiment_score: score,
            overall_sentiment: SentimentLabel::from_score(score, 0.1),
            positive_count: pos,
            negative_count: neg,
            neutral_count: neu,
            total_sentences: pos + neg + neu,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rolling_mean_seven_days_window_five() {
        let series = [0.2, 0.1, -0.3, 0.4, 0.0, -0.1, 0.2];
        let rolling = centered_rolling_mean(&series, 5);
        assert_eq!(rolling.len(), 7);
        assert_eq!(rolling[0], None);
        assert_eq!(rolling[1], None);
        assert!(close(rolling[2].unwrap(), (0.2 + 0.1 - 0.3 + 0.4 + 0.0) / 5.0));
        assert!(close(rolling[3].unwrap(), (0.1 - 0.3 + 0.4 + 0.0 - 0.1) / 5.0));
        assert!(close(rolling[4].unwrap(), (-0.3 + 0.4 + 0.0 - 0.1 + 0.2) / 5.0));
        assert_eq!(rolling[5], None);
        assert_eq!(rolling[6], None);
    }

    #[test]
    fn test_rolling_mean_even_window() {
        let rolling = centered_rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(rolling[0], None);
        assert!(close(rolling[1].unwrap(), 1.5));
        assert!(close(rolling[3].unwrap(), 3.5));
    }

    #[test]
    fn test_rolling_mean_edge_windows() {
        assert_eq!(centered_rolling_mean(&[], 5), Vec::<Option<f64>>::new());
        assert_eq!(centered_rolling_mean(&[0.3], 1), vec![Some(0.3)]);
        assert_eq!(centered_rolling_mean(&[0.3, 0.1], 0), vec![None, None]);
    }

    #[test]
    fn test_groups_and_orders_by_date() {
        let rows = vec![
            row((2025, 9, 24), 0.4, 2, 0, 1),
            row((2025, 9, 23), 0.2, 1, 0, 1),
            row((2025, 9, 23), -0.4, 0, 2, 0),
        ];
        let days = aggregate(&rows, 5);
        assert_eq!(days.len(), 2);

        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 9, 23).unwrap());
        assert_eq!(days[0].article_count, 2);
        assert_eq!(days[0].positive_count, 1);
        assert_eq!(days[0].negative_count, 2);
        assert_eq!(days[0].neutral_count, 1);
        assert!(close(days[0].mean_score, -0.1));

        assert_eq!(days[1].article_count, 1);
        assert!(close(days[1].mean_score, 0.4));
    }

    #[test]
    fn test_window_shrinks_to_number_of_days() {
        let rows = vec![
            row((2025, 9, 1), 0.3, 1, 0, 0),
            row((2025, 9, 2), 0.0, 0, 0, 1),
            row((2025, 9, 3), -0.3, 0, 1, 0),
        ];
        let days = aggregate(&rows, 5);
        assert_eq!(days[0].rolling_mean_score, None);
        assert!(close(days[1].rolling_mean_score.unwrap(), 0.0));
        assert_eq!(days[2].rolling_mean_score, None);
    }

    #[test]
    fn test_single_day_rolls_onto_itself() {
        let days = aggregate(&[row((2025, 9, 1), 0.25, 1, 0, 0)], 5);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].rolling_mean_score, Some(0.25));
    }

    #[test]
    fn test_empty_rows() {
        assert!(aggregate(&[], 5).is_empty());
    }
}
