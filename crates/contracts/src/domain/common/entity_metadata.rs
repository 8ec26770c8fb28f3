use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Служебные поля записи автомобиля или продажи
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Запись скрыта из списков и недоступна для новых продаж
    pub is_deleted: bool,
    /// Счётчик сохранений, 0 у ещё не записанного агрегата
    pub version: i32,
}

impl EntityMetadata {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            is_deleted: false,
            version: 0,
        }
    }

    /// Отметка очередной записи в БД
    pub fn mark_written(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
    }
}

impl Default for EntityMetadata {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_written_bumps_version_and_keeps_creation_date() {
        let mut metadata = EntityMetadata::new();
        let created = metadata.created_at;
        assert_eq!(metadata.version, 0);
        assert!(!metadata.is_deleted);

        metadata.mark_written();
        metadata.mark_written();
        assert_eq!(metadata.version, 2);
        assert_eq!(metadata.created_at, created);
        assert!(metadata.updated_at >= created);
    }
}
