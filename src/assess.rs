//! Diagnostics over the raw tables, one figure per defect the cleaner fixes.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use crate::cleaner::archive::collapse_dog_type;
use crate::loader::StatusLines;
use crate::records::{DogType, ImageRecord, RawArchiveRecord};

#[derive(Debug, Default, Serialize)]
pub struct ArchiveAssessment {
    pub rows: usize,
    pub retweets: usize,
    pub replies: usize,
    pub no_dog_type: usize,
    pub multiple_dog_types: usize,
    pub denominators: BTreeMap<i64, usize>,
    pub lowercase_names: BTreeSet<String>,
    pub sources: BTreeMap<String, usize>,
}

pub fn assess_archive(rows: &[RawArchiveRecord]) -> ArchiveAssessment {
    let mut a = ArchiveAssessment {
        rows: rows.len(),
        ..Default::default()
    };

    for row in rows {
        if row.retweeted_status_id.is_some() {
            a.retweets += 1;
        }
        if row.in_reply_to_status_id.is_some() {
            a.replies += 1;
        }

        match collapse_dog_type(&row.doggo, &row.floofer, &row.pupper, &row.puppo) {
            DogType::NotSpecified => a.no_dog_type += 1,
            DogType::Multiple => a.multiple_dog_types += 1,
            _ => {}
        }

        *a.denominators.entry(row.rating_denominator).or_default() += 1;

        if let Some(name) = &row.name {
            if !name.chars().next().is_some_and(char::is_uppercase) {
                a.lowercase_names.insert(name.clone());
            }
        }

        *a.sources.entry(row.source.clone()).or_default() += 1;
    }

    a
}

#[derive(Debug, Default, Serialize)]
pub struct ImageAssessment {
    pub rows: usize,
    pub top_prediction_not_dog: usize,
    pub no_dog_prediction: usize,
    pub distinct_top_labels: usize,
}

pub fn assess_images(rows: &[ImageRecord]) -> ImageAssessment {
    let top_labels: HashSet<&str> = rows
        .iter()
        .map(|r| r.predictions[0].label.as_str())
        .collect();

    ImageAssessment {
        rows: rows.len(),
        top_prediction_not_dog: rows.iter().filter(|r| !r.predictions[0].is_dog).count(),
        no_dog_prediction: rows.iter().filter(|r| !r.has_dog_prediction()).count(),
        distinct_top_labels: top_labels.len(),
    }
}

#[derive(Debug, Default, Serialize)]
pub struct EngagementAssessment {
    pub rows: usize,
    pub repeated_ids: usize,
}

/// Counts lines as read, so repeats dropped by the loader still show up.
pub fn assess_engagement(parsed: &StatusLines) -> EngagementAssessment {
    EngagementAssessment {
        rows: parsed.lines,
        repeated_ids: parsed.repeated_ids(),
    }
}

#[derive(Debug, Serialize)]
pub struct Assessment {
    pub archive: ArchiveAssessment,
    pub images: ImageAssessment,
    pub engagement: Option<EngagementAssessment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::archive::tests::raw;
    use crate::cleaner::images::tests::image;
    use crate::loader::read_status_lines;

    #[test]
    fn test_assess_archive() {
        let mut retweet = raw(1);
        retweet.retweeted_status_id = Some(9.0);
        let mut reply = raw(2);
        reply.in_reply_to_status_id = Some(9.0);
        reply.name = Some("a".to_string());
        let mut both = raw(3);
        both.doggo = "doggo".to_string();
        both.puppo = "puppo".to_string();
        both.rating_denominator = 50;

        let a = assess_archive(&[retweet, reply, both, raw(4)]);

        assert_eq!(a.rows, 4);
        assert_eq!(a.retweets, 1);
        assert_eq!(a.replies, 1);
        assert_eq!(a.no_dog_type, 3);
        assert_eq!(a.multiple_dog_types, 1);
        assert_eq!(a.denominators.get(&10), Some(&3));
        assert_eq!(a.denominators.get(&50), Some(&1));
        assert_eq!(a.lowercase_names, BTreeSet::from(["a".to_string()]));
        assert_eq!(a.sources.len(), 1);
    }

    #[test]
    fn test_assess_images() {
        let mut other = image(3, [false, false, false]);
        other.predictions[0].label = "desk".to_string();
        let a = assess_images(&[
            image(1, [true, false, false]),
            image(2, [false, true, false]),
            other,
        ]);
        assert_eq!(a.rows, 3);
        assert_eq!(a.top_prediction_not_dog, 2);
        assert_eq!(a.no_dog_prediction, 1);
        assert_eq!(a.distinct_top_labels, 2);
    }

    #[test]
    fn test_assess_engagement() {
        let input = concat!(
            "{\"id\": 1, \"retweet_count\": 1, \"favorite_count\": 1}\n",
            "{\"id\": 2, \"retweet_count\": 1, \"favorite_count\": 1}\n",
            "{\"id\": 1, \"retweet_count\": 2, \"favorite_count\": 2}\n",
        );
        let a = assess_engagement(&read_status_lines(input.as_bytes()).unwrap());
        assert_eq!(a.rows, 3);
        assert_eq!(a.repeated_ids, 1);
    }
}
