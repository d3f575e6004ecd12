use lesson_core::model::ChapterId;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn chapter_id_to_i64(id: ChapterId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| ser("chapter_id overflow"))
}

pub(crate) fn chapter_id_from_i64(v: i64) -> Result<ChapterId, StorageError> {
    u64::try_from(v)
        .map(ChapterId::new)
        .map_err(|_| ser(format!("invalid chapter_id: {v}")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| ser(format!("invalid {field}: {v}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_chapter_id_is_rejected() {
        assert!(chapter_id_from_i64(-1).is_err());
        assert_eq!(chapter_id_from_i64(9).unwrap(), ChapterId::new(9));
    }

    #[test]
    fn huge_chapter_id_does_not_fit() {
        assert!(chapter_id_to_i64(ChapterId::new(u64::MAX)).is_err());
    }
}
