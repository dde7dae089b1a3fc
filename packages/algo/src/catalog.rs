//! Item catalog
//!
//! An arena of items addressed by stable index. Identifiers are unique and the
//! catalog is never empty. Difficulty is the only mutable field and is written
//! through [`Catalog::set_difficulty`]; a catalog shared by several learners
//! needs a single writer per item, so hosts either keep one catalog per session
//! and merge [`Catalog::difficulty_snapshot`] afterwards, or wrap it in a lock.

use std::collections::HashMap;

use crate::error::{EngineError, Result};
use crate::sanitize::ensure_finite;
use crate::types::{CatalogRecord, DifficultyBand, Item, PartOfSpeech};

#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    by_id: HashMap<String, usize>,
    by_pos: HashMap<PartOfSpeech, Vec<usize>>,
}

impl Catalog {
    pub fn from_records(records: Vec<CatalogRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }

        let mut items = Vec::with_capacity(records.len());
        let mut by_id = HashMap::with_capacity(records.len());
        let mut by_pos: HashMap<PartOfSpeech, Vec<usize>> = HashMap::new();

        for record in records {
            ensure_finite("difficulty", record.difficulty)?;
            let index = items.len();
            if by_id.insert(record.identifier.clone(), index).is_some() {
                return Err(EngineError::DuplicateItem {
                    id: record.identifier,
                });
            }
            by_pos.entry(record.part_of_speech).or_default().push(index);
            items.push(Item::from(record));
        }

        tracing::debug!(items = items.len(), "Catalog loaded");
        Ok(Self {
            items,
            by_id,
            by_pos,
        })
    }

    /// Parse a JSON array of records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<CatalogRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Item> {
        self.index_of(id).map(|i| &self.items[i])
    }

    /// Indices of items sharing a part of speech, in catalog order.
    pub fn indices_for_pos(&self, pos: PartOfSpeech) -> &[usize] {
        self.by_pos.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn band_members(&self, band: DifficultyBand) -> Vec<&Item> {
        self.items.iter().filter(|item| item.band() == band).collect()
    }

    pub fn set_difficulty(&mut self, index: usize, difficulty: f64) -> Result<()> {
        ensure_finite("difficulty", difficulty)?;
        let len = self.items.len();
        let item = self.items.get_mut(index).ok_or_else(|| EngineError::UnknownItem {
            id: format!("#{index} (catalog has {len} items)"),
        })?;
        item.difficulty = difficulty;
        Ok(())
    }

    pub fn set_difficulty_by_id(&mut self, id: &str, difficulty: f64) -> Result<()> {
        let index = self
            .index_of(id)
            .ok_or_else(|| EngineError::UnknownItem { id: id.to_string() })?;
        self.set_difficulty(index, difficulty)
    }

    /// `(identifier, difficulty)` pairs in catalog order.
    pub fn difficulty_snapshot(&self) -> Vec<(String, f64)> {
        self.items
            .iter()
            .map(|item| (item.id.clone(), item.difficulty))
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(
            Catalog::from_records(vec![]),
            Err(EngineError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let records = vec![
            record("apple", PartOfSpeech::Noun, 1000.0),
            record("apple", PartOfSpeech::Noun, 1100.0),
        ];
        assert!(matches!(
            Catalog::from_records(records),
            Err(EngineError::DuplicateItem { id }) if id == "apple"
        ));
    }

    #[test]
    fn test_non_finite_difficulty_rejected() {
        let records = vec![record("apple", PartOfSpeech::Noun, f64::NAN)];
        assert!(matches!(
            Catalog::from_records(records),
            Err(EngineError::NonFiniteInput { .. })
        ));
    }

    #[test]
    fn test_pos_index_keeps_catalog_order() {
        let catalog = ladder_catalog(6, 1000.0, 50.0);
        assert_eq!(catalog.indices_for_pos(PartOfSpeech::Noun), &[0, 2, 4]);
        assert_eq!(catalog.indices_for_pos(PartOfSpeech::Verb), &[1, 3, 5]);
        assert!(catalog.indices_for_pos(PartOfSpeech::Adverb).is_empty());
    }

    #[test]
    fn test_set_difficulty() {
        let mut catalog = ladder_catalog(3, 1000.0, 100.0);
        catalog.set_difficulty_by_id("w1", 1234.0).unwrap();
        assert_eq!(catalog.get_by_id("w1").unwrap().difficulty(), 1234.0);
        assert!(catalog.set_difficulty(1, f64::INFINITY).is_err());
        assert!(matches!(
            catalog.set_difficulty_by_id("missing", 1.0),
            Err(EngineError::UnknownItem { .. })
        ));
        assert!(catalog.set_difficulty(9, 1.0).is_err());
    }

    #[test]
    fn test_band_members() {
        let catalog = ladder_catalog(8, 1000.0, 100.0);
        let easy: Vec<_> = catalog
            .band_members(DifficultyBand::Easy)
            .iter()
            .map(|i| i.id.clone())
            .collect();
        assert_eq!(easy, vec!["w0", "w1"]);
        assert_eq!(catalog.band_members(DifficultyBand::Expert).len(), 2);
    }

    #[test]
    fn test_from_json_accepts_source_field_names() {
        let json = r#"[
            {"word": "serene", "pos": "s", "definition": "calm", "difficulty": 1350.0},
            {"identifier": "run", "part_of_speech": "v", "definition": "move fast",
             "example": "run home", "difficulty": 1010.5}
        ]"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(catalog.len(), 2);
        let serene = catalog.get_by_id("serene").unwrap();
        assert_eq!(serene.part_of_speech, PartOfSpeech::Adjective);
        assert!(serene.example.is_empty());
    }

    #[test]
    fn test_from_json_reports_parse_errors() {
        assert!(matches!(
            Catalog::from_json_str("{not json"),
            Err(EngineError::CatalogParse(_))
        ));
    }
}
