//! Descriptive statistics and the likes regression over the merged table.

pub mod ols;
pub mod summary;
pub mod utility;

use serde::Serialize;
use tracing::{info, warn};

use crate::records::MergedRecord;
use ols::{OlsFit, fit_ols};
use summary::{Highlight, HistogramBin, SourceCount, count_by_source, histogram, largest_by};
use utility::{mean, stddev};

pub const HISTOGRAM_BINS: usize = 50;

#[derive(Debug, Serialize)]
pub struct Report {
    pub rows: usize,
    pub source_counts: Vec<SourceCount>,
    pub mean_rating_numerator: f64,
    pub rating_numerator_stddev: f64,
    pub most_retweeted: Option<Highlight>,
    pub most_liked: Option<Highlight>,
    /// `likes ~ intercept + retweets + rating_numerator`; absent when the fit is impossible.
    pub likes_model: Option<OlsFit>,
    pub rating_histogram: Vec<HistogramBin>,
}

#[tracing::instrument(skip_all, fields(rows = rows.len()))]
pub fn build_report(rows: &[MergedRecord]) -> Report {
    let numerators: Vec<f64> = rows.iter().map(|r| r.rating_numerator as f64).collect();
    let retweets: Vec<f64> = rows.iter().map(|r| r.retweets as f64).collect();
    let likes: Vec<f64> = rows.iter().map(|r| r.likes as f64).collect();

    let mean_rating_numerator = mean(&numerators);

    let likes_model = match fit_ols(
        ("likes", likes.as_slice()),
        &[
            ("retweets", retweets.as_slice()),
            ("rating_numerator", numerators.as_slice()),
        ],
    ) {
        Ok(fit) => {
            info!(
                intercept = fit.intercept.estimate,
                retweets = ?fit.coefficient("retweets"),
                rating_numerator = ?fit.coefficient("rating_numerator"),
                r_squared = fit.r_squared,
                "Likes model fitted"
            );
            info!("\n{}", fit.summary());
            Some(fit)
        }
        Err(e) => {
            warn!(error = %e, "Likes model could not be fitted");
            None
        }
    };

    Report {
        rows: rows.len(),
        source_counts: count_by_source(rows),
        mean_rating_numerator,
        rating_numerator_stddev: stddev(&numerators, mean_rating_numerator),
        most_retweeted: largest_by(rows, |r| r.retweets).map(Highlight::from),
        most_liked: largest_by(rows, |r| r.likes).map(Highlight::from),
        likes_model,
        rating_histogram: histogram(&numerators, HISTOGRAM_BINS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use summary::tests::merged;

    #[test]
    fn test_build_report() {
        let mut rows = vec![
            merged(1, "Twitter for iPhone", 100, 350),
            merged(2, "Twitter for iPhone", 200, 640),
            merged(3, "Twitter Web Client", 50, 250),
            merged(4, "Twitter for iPhone", 400, 1300),
        ];
        for (row, numerator) in rows.iter_mut().zip([10, 12, 13, 11]) {
            row.rating_numerator = numerator;
        }

        let report = build_report(&rows);

        assert_eq!(report.rows, 4);
        assert_eq!(report.source_counts[0].source, "Twitter for iPhone");
        assert_eq!(report.source_counts[0].count, 3);
        assert_eq!(report.mean_rating_numerator, 11.5);
        assert_eq!(report.most_retweeted.as_ref().unwrap().tweet_id, 4);
        assert_eq!(report.most_liked.as_ref().unwrap().likes, 1300);
        assert_eq!(report.rating_histogram.len(), HISTOGRAM_BINS);

        let model = report.likes_model.unwrap();
        assert_eq!(model.observations, 4);
        assert!(model.coefficient("retweets").unwrap() > 0.0);
    }

    #[test]
    fn test_build_report_on_empty_table() {
        let report = build_report(&[]);
        assert_eq!(report.rows, 0);
        assert!(report.source_counts.is_empty());
        assert!(report.most_liked.is_none());
        assert!(report.likes_model.is_none());
        assert!(report.rating_histogram.is_empty());
    }
}
