//! Catalog models: courses and their lessons.

use serde::{Deserialize, Serialize};

/// A course as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Course {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Price in whole currency units; zero means free.
    pub price: i64,
    #[serde(default)]
    pub thumbnail: String,
    /// Highlighted on the storefront.
    #[serde(default)]
    pub feature: bool,
}

impl Course {
    pub fn is_free(&self) -> bool {
        self.price <= 0
    }

    pub fn price_display(&self) -> String {
        if self.is_free() {
            "Free".to_string()
        } else {
            format!("¥{}", self.price)
        }
    }
}

/// A single lesson (video) within a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub video_url: String,
    /// Free preview lessons are playable without purchase.
    #[serde(default)]
    pub is_free: bool,
    /// Length in seconds.
    #[serde(default)]
    pub duration: i64,
}

impl Lesson {
    /// Duration as `m:ss`, or `h:mm:ss` for an hour or more.
    pub fn duration_display(&self) -> String {
        let total = self.duration.max(0);
        let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
        if h > 0 {
            format!("{}:{:02}:{:02}", h, m, s)
        } else {
            format!("{}:{:02}", m, s)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_course_with_defaults() {
        let json = r#"{"id": 7, "title": "Rust 101", "price": 0}"#;
        let course: Course = serde_json::from_str(json).unwrap();
        assert_eq!(course.id, 7);
        assert!(course.description.is_empty());
        assert!(!course.feature);
        assert!(course.is_free());
        assert_eq!(course.price_display(), "Free");
    }

    #[test]
    fn test_paid_course_price_display() {
        let json = r#"{"id": 1, "title": "Async", "description": "d", "price": 199, "thumbnail": "", "feature": true}"#;
        let course: Course = serde_json::from_str(json).unwrap();
        assert!(!course.is_free());
        assert_eq!(course.price_display(), "¥199");
    }

    #[test]
    fn test_lesson_duration_display() {
        let mut lesson: Lesson =
            serde_json::from_str(r#"{"id": 1, "title": "Intro", "duration": 95}"#).unwrap();
        assert_eq!(lesson.duration_display(), "1:35");
        lesson.duration = 3725;
        assert_eq!(lesson.duration_display(), "1:02:05");
        lesson.duration = 0;
        assert_eq!(lesson.duration_display(), "0:00");
    }
}
