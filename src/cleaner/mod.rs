//! Defect corrections for the raw tables.
//!
//! [`RawTables`] is the snapshot as loaded and is never modified;
//! [`clean`] returns a separate [`CleanTables`] snapshot.

pub mod archive;
pub mod engagement;
pub mod images;

use tracing::info;

use crate::error::CleanError;
use crate::records::{
    ArchiveRecord, EngagementRecord, ImageRecord, RawArchiveRecord, StatusCounts,
};

/// The three tables exactly as loaded.
#[derive(Debug, Clone)]
pub struct RawTables {
    pub archive: Vec<RawArchiveRecord>,
    pub images: Vec<ImageRecord>,
    pub engagement: Vec<StatusCounts>,
}

/// The three tables after every cleaning rule has run.
#[derive(Debug, Clone)]
pub struct CleanTables {
    pub archive: Vec<ArchiveRecord>,
    pub images: Vec<ImageRecord>,
    pub engagement: Vec<EngagementRecord>,
}

#[tracing::instrument(skip_all)]
pub fn clean(raw: &RawTables) -> Result<CleanTables, CleanError> {
    let archive = archive::clean_archive(raw.archive.clone())?;
    let images = images::keep_dog_images(raw.images.clone());
    let engagement = engagement::unify_engagement_ids(raw.engagement.clone());

    info!(
        archive_before = raw.archive.len(),
        archive_after = archive.len(),
        images_before = raw.images.len(),
        images_after = images.len(),
        engagement = engagement.len(),
        "Tables cleaned"
    );

    Ok(CleanTables {
        archive,
        images,
        engagement,
    })
}
