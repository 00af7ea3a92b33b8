//! Reading the three raw tables from disk or over HTTP.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::fetch::{BasicClient, fetch_bytes};
use crate::records::{ImageRecord, RawArchiveRecord, RawImageRow, StatusCounts, TweetId};

/// Parses the comma-separated twitter archive.
pub fn read_archive<R: Read>(reader: R) -> Result<Vec<RawArchiveRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for (line, result) in rdr.deserialize().enumerate() {
        let record: RawArchiveRecord =
            result.with_context(|| format!("archive row {} is malformed", line + 1))?;
        rows.push(record);
    }

    Ok(rows)
}

#[tracing::instrument]
pub fn load_archive(path: &str) -> Result<Vec<RawArchiveRecord>> {
    let file = File::open(path).with_context(|| format!("cannot open archive {path}"))?;
    let rows = read_archive(file)?;
    info!(rows = rows.len(), "Archive loaded");
    Ok(rows)
}

fn is_remote(source: &str) -> bool {
    reqwest::Url::parse(source).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Loads bytes from a local file path or fetches them over HTTP.
#[tracing::instrument]
pub async fn load_source(source: &str) -> Result<Vec<u8>> {
    let bytes = if is_remote(source) {
        let client = BasicClient::new()?;
        fetch_bytes(&client, source).await?
    } else {
        std::fs::read(source).with_context(|| format!("cannot read {source}"))?
    };
    debug!(bytes = bytes.len(), "Source loaded");
    Ok(bytes)
}

/// Parses the tab-separated image predictions table.
pub fn parse_image_predictions(bytes: &[u8]) -> Result<Vec<ImageRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_reader(bytes);
    let mut rows = Vec::new();

    for (line, result) in rdr.deserialize().enumerate() {
        let row: RawImageRow =
            result.with_context(|| format!("image prediction row {} is malformed", line + 1))?;
        rows.push(ImageRecord::from(row));
    }

    Ok(rows)
}

pub async fn load_images(source: &str) -> Result<Vec<ImageRecord>> {
    let bytes = load_source(source).await?;
    let rows = parse_image_predictions(&bytes)?;
    info!(rows = rows.len(), "Image predictions loaded");
    Ok(rows)
}

/// Every identifier seen in either the archive or the image table, first-seen order.
pub fn tweet_ids_to_query(archive: &[RawArchiveRecord], images: &[ImageRecord]) -> Vec<TweetId> {
    let mut seen = HashSet::new();
    archive
        .iter()
        .map(|r| r.tweet_id)
        .chain(images.iter().map(|r| r.tweet_id))
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Writes one raw status object per line.
pub fn write_status_lines<W: Write>(mut writer: W, statuses: &[Value]) -> Result<()> {
    for status in statuses {
        serde_json::to_writer(&mut writer, status)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Engagement counters read from the JSON-lines status file.
#[derive(Debug, Default)]
pub struct StatusLines {
    /// One row per identifier, in first-seen order.
    pub rows: Vec<StatusCounts>,
    /// Non-blank lines read, repeats included.
    pub lines: usize,
}

impl StatusLines {
    /// Lines whose `id` had already been seen.
    pub fn repeated_ids(&self) -> usize {
        self.lines - self.rows.len()
    }
}

/// Reads the JSON-lines status file, keeping only the engagement counters.
///
/// A later line for the same `id` replaces the earlier one. Blank lines are ignored.
pub fn read_status_lines<R: BufRead>(reader: R) -> Result<StatusLines> {
    let mut parsed = StatusLines::default();
    let mut positions: HashMap<TweetId, usize> = HashMap::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let counts: StatusCounts = serde_json::from_str(&line)
            .with_context(|| format!("status line {} is malformed", line_no + 1))?;
        parsed.lines += 1;

        match positions.get(&counts.id) {
            Some(&pos) => parsed.rows[pos] = counts,
            None => {
                positions.insert(counts.id, parsed.rows.len());
                parsed.rows.push(counts);
            }
        }
    }

    Ok(parsed)
}

pub fn parse_status_lines<R: BufRead>(reader: R) -> Result<Vec<StatusCounts>> {
    Ok(read_status_lines(reader)?.rows)
}

#[tracing::instrument]
pub fn load_status_file(path: &str) -> Result<StatusLines> {
    let file = File::open(path).with_context(|| format!("cannot open status file {path}"))?;
    let parsed = read_status_lines(BufReader::new(file))?;
    info!(
        rows = parsed.rows.len(),
        repeated_ids = parsed.repeated_ids(),
        "Engagement counters loaded"
    );
    Ok(parsed)
}

pub fn load_status_lines(path: &str) -> Result<Vec<StatusCounts>> {
    Ok(load_status_file(path)?.rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ARCHIVE: &str = "\
tweet_id,in_reply_to_status_id,in_reply_to_user_id,timestamp,source,text,retweeted_status_id,retweeted_status_user_id,retweeted_status_timestamp,expanded_urls,rating_numerator,rating_denominator,name,doggo,floofer,pupper,puppo
892420643555336193,,,2017-08-01 16:23:56 +0000,\"<a href=\"\"http://twitter.com/download/iphone\"\" rel=\"\"nofollow\"\">Twitter for iPhone</a>\",\"This is Phineas. 13/10\",,,,https://twitter.com/dog_rates/status/892420643555336193/photo/1,13,10,Phineas,None,None,None,None
886267009285017600,8.86266357075128e+17,2281181600.0,2017-07-15 16:51:35 +0000,\"<a href=\"\"http://twitter.com/download/iphone\"\" rel=\"\"nofollow\"\">Twitter for iPhone</a>\",\"@NBCSports THE VERY BEST\",,,,,12,10,None,None,None,None,None
";

    const IMAGES: &str = "tweet_id\tjpg_url\timg_num\tp1\tp1_conf\tp1_dog\tp2\tp2_conf\tp2_dog\tp3\tp3_conf\tp3_dog
666020888022790149\thttps://pbs.twimg.com/media/CT4udn0WwAA0aMy.jpg\t1\tWelsh_springer_spaniel\t0.465074\tTrue\tcollie\t0.156665\tTrue\tShetland_sheepdog\t0.0614285\tTrue
666268910803644416\thttps://pbs.twimg.com/media/CT8QCd1WEAADXws.jpg\t1\tdesktop_computer\t0.0860249\tFalse\tdesk\t0.0853086\tFalse\tbookcase\t0.0794797\tFalse
";

    #[test]
    fn test_read_archive() {
        let rows = read_archive(ARCHIVE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.tweet_id, 892420643555336193);
        assert!(first.in_reply_to_status_id.is_none());
        assert!(first.retweeted_status_id.is_none());
        assert_eq!(first.name.as_deref(), Some("Phineas"));
        assert_eq!(first.rating_numerator, 13);
        assert_eq!(first.doggo, "None");
        assert!(first.source.contains("Twitter for iPhone"));

        let reply = &rows[1];
        assert!(reply.in_reply_to_status_id.is_some());
        assert!(reply.name.is_none(), "the None sentinel reads as absent");
        assert!(reply.expanded_urls.is_none());
    }

    #[test]
    fn test_parse_image_predictions() {
        let rows = parse_image_predictions(IMAGES.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].predictions[0].label, "Welsh_springer_spaniel");
        assert!(rows[0].predictions[2].is_dog);
        assert!(!rows[1].has_dog_prediction());
    }

    #[test]
    fn test_parse_image_predictions_rejects_bad_bool() {
        let bad = IMAGES.replace("\tTrue\tcollie", "\tmaybe\tcollie");
        assert!(parse_image_predictions(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_tweet_ids_to_query_is_outer_union() {
        let archive = read_archive(ARCHIVE.as_bytes()).unwrap();
        let mut images = parse_image_predictions(IMAGES.as_bytes()).unwrap();
        images[1].tweet_id = 892420643555336193;

        let ids = tweet_ids_to_query(&archive, &images);
        assert_eq!(
            ids,
            vec![892420643555336193, 886267009285017600, 666020888022790149]
        );
    }

    #[test]
    fn test_status_lines_keep_last_per_id() {
        let statuses = vec![
            json!({"id": 1, "retweet_count": 5, "favorite_count": 50, "full_text": "x"}),
            json!({"id": 2, "retweet_count": 7, "favorite_count": 70}),
            json!({"id": 1, "retweet_count": 6, "favorite_count": 60}),
        ];
        let mut buf = Vec::new();
        write_status_lines(&mut buf, &statuses).unwrap();

        let rows = parse_status_lines(buf.as_slice()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            StatusCounts {
                id: 1,
                retweet_count: 6,
                favorite_count: 60
            }
        );
        assert_eq!(rows[1].id, 2);
    }

    #[test]
    fn test_status_lines_skip_blank_and_reject_garbage() {
        let input = "\n{\"id\": 3, \"retweet_count\": 1, \"favorite_count\": 2}\n\n";
        assert_eq!(parse_status_lines(input.as_bytes()).unwrap().len(), 1);

        assert!(parse_status_lines("{not json}\n".as_bytes()).is_err());
    }

    #[test]
    fn test_status_file_counts_repeated_ids() {
        let input = concat!(
            "{\"id\": 1, \"retweet_count\": 5, \"favorite_count\": 50}\n",
            "{\"id\": 2, \"retweet_count\": 7, \"favorite_count\": 70}\n",
            "\n",
            "{\"id\": 1, \"retweet_count\": 6, \"favorite_count\": 60}\n",
        );
        let path = std::env::temp_dir().join("weratedogs_repeated_status_lines.txt");
        std::fs::write(&path, input).unwrap();

        let parsed = load_status_file(path.to_str().unwrap()).unwrap();
        assert_eq!(parsed.lines, 3);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.repeated_ids(), 1);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_only_http_urls_are_remote() {
        assert!(is_remote("https://example.com/image-predictions.tsv"));
        assert!(is_remote("http://localhost:8080/data.tsv"));
        assert!(!is_remote("httpdump.tsv"));
        assert!(!is_remote("http_exports/image-predictions.tsv"));
        assert!(!is_remote("./image-predictions.tsv"));
        assert!(!is_remote("ftp://example.com/image-predictions.tsv"));
    }

    #[tokio::test]
    async fn test_load_source_reads_local_file_named_like_http() {
        let path = std::env::temp_dir().join("httpdump.tsv");
        std::fs::write(&path, b"tweet_id\tjpg_url\n").unwrap();

        let bytes = load_source(path.to_str().unwrap()).await.unwrap();
        assert_eq!(bytes, b"tweet_id\tjpg_url\n");

        std::fs::remove_file(path).ok();
    }
}
