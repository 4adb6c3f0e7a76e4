//! Private per-apartment checklists.
//!
//! A checklist is a plain snapshot: the tracked-listing entity loads it
//! wholesale, the caller edits it in memory, and an explicit save writes the
//! whole thing back. Ratings are keyed by checklist field id; entries whose
//! field has since been deleted are simply never rendered.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChecklistError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecklistError {
    #[error("rating scores run from 1 to 5")]
    ScoreOutOfRange,
}

/// A 1-5 star rating with optional free-form notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    score: u8,
    pub notes: String,
}

impl Rating {
    pub fn new(score: u8, notes: impl Into<String>) -> Result<Self> {
        if !(1..=5).contains(&score) {
            return Err(ChecklistError::ScoreOutOfRange);
        }

        Ok(Self {
            score,
            notes: notes.into(),
        })
    }

    pub fn score(&self) -> u8 {
        self.score
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
    pub created_at: String,
}

impl Photo {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrivateChecklist {
    pub ratings: BTreeMap<String, Rating>,
    pub general_notes: String,
    pub pros: String,
    pub cons: String,
    pub photos: Vec<Photo>,
}

impl PrivateChecklist {
    /// Rate a checklist field. When no new notes are given, notes already
    /// attached to the field's rating are kept.
    pub fn rate(&mut self, field_id: &str, score: u8, notes: Option<&str>) -> Result<()> {
        let notes = match notes {
            Some(notes) => notes.to_string(),
            None => self
                .ratings
                .get(field_id)
                .map(|rating| rating.notes.clone())
                .unwrap_or_default(),
        };

        self.ratings
            .insert(field_id.to_string(), Rating::new(score, notes)?);

        Ok(())
    }

    pub fn rating(&self, field_id: &str) -> Option<&Rating> {
        self.ratings.get(field_id)
    }

    pub fn add_photo(&mut self, url: &str) {
        self.photos.push(Photo::new(url));
    }

    /// Mean of all scores, or `None` when nothing has been rated yet.
    pub fn average_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }

        let total: u32 = self
            .ratings
            .values()
            .map(|rating| u32::from(rating.score()))
            .sum();
        let count = u32::try_from(self.ratings.len()).expect("rating count fits in u32");

        Some(f64::from(total) / f64::from(count))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_score_range() {
        assert!(Rating::new(0, "").is_err());
        assert!(Rating::new(6, "").is_err());
        assert_eq!(Rating::new(5, "spacious").unwrap().score(), 5);
    }

    #[test]
    fn test_rate_keeps_old_notes() {
        let mut checklist = PrivateChecklist::default();
        checklist.rate("location", 4, Some("near the park")).unwrap();
        checklist.rate("location", 2, None).unwrap();

        let rating = checklist.rating("location").unwrap();
        assert_eq!(rating.score(), 2);
        assert_eq!(rating.notes, "near the park");
    }

    #[test]
    fn test_average_rating() {
        let mut checklist = PrivateChecklist::default();
        assert_eq!(checklist.average_rating(), None);

        checklist.rate("location", 5, None).unwrap();
        checklist.rate("price", 2, None).unwrap();

        assert_eq!(checklist.average_rating(), Some(3.5));
    }

    #[test]
    fn test_photos_are_stamped() {
        let mut checklist = PrivateChecklist::default();
        checklist.add_photo("https://example.com/kitchen.jpg");

        let photo = checklist.photos.first().unwrap();
        assert_eq!(photo.url, "https://example.com/kitchen.jpg");
        assert!(!photo.created_at.is_empty());
    }
}
