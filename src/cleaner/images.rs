use crate::records::ImageRecord;

/// Keeps images where at least one of the three predictions is a dog breed.
pub fn keep_dog_images(records: Vec<ImageRecord>) -> Vec<ImageRecord> {
    records
        .into_iter()
        .filter(ImageRecord::has_dog_prediction)
        .collect()
}
