//! Client-side playback gating.
//!
//! Mirrors the backend rule so the UI can show locked lessons before the
//! server answers with a 403: free courses and free preview lessons are open
//! to everyone, the rest needs a valid VIP membership or a paid order.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::{Course, Lesson, Order, UserProfile};

/// Why a lesson can or cannot be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackAccess {
    FreeCourse,
    FreePreview,
    Vip,
    Purchased,
    /// Not logged in and the lesson is paid content.
    LoginRequired,
    /// Logged in but neither VIP nor an owner of the course.
    PurchaseRequired,
}

impl PlaybackAccess {
    pub fn is_allowed(&self) -> bool {
        !matches!(
            self,
            PlaybackAccess::LoginRequired | PlaybackAccess::PurchaseRequired
        )
    }
}

/// Parse a VIP expiry timestamp.
///
/// RFC 3339 values keep their offset. Offset-less timestamps are taken as
/// UTC, and a bare date means midnight UTC at the start of that day.
fn parse_expiry(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A VIP membership counts while its expiry lies strictly after `now`.
pub fn vip_valid_at(profile: &UserProfile, now: DateTime<Utc>) -> bool {
    if !profile.is_vip() {
        return false;
    }
    profile
        .vip_expiry_date
        .as_deref()
        .and_then(parse_expiry)
        .map(|expiry| expiry > now)
        .unwrap_or(false)
}

/// Decide playback access as of `now`.
pub fn access_at(
    course: &Course,
    lesson: &Lesson,
    user: Option<&UserProfile>,
    orders: &[Order],
    now: DateTime<Utc>,
) -> PlaybackAccess {
    if course.is_free() {
        return PlaybackAccess::FreeCourse;
    }
    if lesson.is_free {
        return PlaybackAccess::FreePreview;
    }
    let Some(profile) = user else {
        return PlaybackAccess::LoginRequired;
    };
    if vip_valid_at(profile, now) {
        return PlaybackAccess::Vip;
    }
    if orders.iter().any(|o| o.course == course.id && o.is_paid()) {
        return PlaybackAccess::Purchased;
    }
    PlaybackAccess::PurchaseRequired
}

/// Decide playback access as of the current time.
pub fn playback_access(
    course: &Course,
    lesson: &Lesson,
    user: Option<&UserProfile>,
    orders: &[Order],
) -> PlaybackAccess {
    access_at(course, lesson, user, orders, Utc::now())
}

pub fn can_play(
    course: &Course,
    lesson: &Lesson,
    user: Option<&UserProfile>,
    orders: &[Order],
) -> bool {
    playback_access(course, lesson, user, orders).is_allowed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderStatus;

    fn course(price: i64) -> Course {
        Course {
            id: 1,
            title: "Course".to_string(),
            description: String::new(),
            price,
            thumbnail: String::new(),
            feature: false,
        }
    }

    fn lesson(is_free: bool) -> Lesson {
        Lesson {
            id: 10,
            title: "Lesson".to_string(),
            video_url: String::new(),
            is_free,
            duration: 60,
        }
    }

    fn user(role: &str, expiry: Option<&str>) -> UserProfile {
        UserProfile {
            username: "u".to_string(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            role: role.to_string(),
            vip_expiry_date: expiry.map(str::to_string),
        }
    }

    fn order(course: i64, status: OrderStatus) -> Order {
        Order {
            order_number: "N1".to_string(),
            course,
            price: 10.0,
            status,
            payment_method: String::new(),
            created_at: String::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_free_course_and_preview_are_open() {
        assert_eq!(
            access_at(&course(0), &lesson(false), None, &[], now()),
            PlaybackAccess::FreeCourse
        );
        assert_eq!(
            access_at(&course(99), &lesson(true), None, &[], now()),
            PlaybackAccess::FreePreview
        );
    }

    #[test]
    fn test_paid_lesson_requires_login() {
        let access = access_at(&course(99), &lesson(false), None, &[], now());
        assert_eq!(access, PlaybackAccess::LoginRequired);
        assert!(!access.is_allowed());
    }

    #[test]
    fn test_vip_expiry_is_strictly_after_now() {
        assert!(vip_valid_at(&user("vip", Some("2025-06-01T12:00:01Z")), now()));
        assert!(vip_valid_at(&user("vip", Some("2025-06-02")), now()));
        assert!(!vip_valid_at(&user("vip", Some("2025-06-01T20:00:00+08:00")), now()));
        // Expired earlier the same day
        assert!(!vip_valid_at(&user("vip", Some("2025-06-01T00:00:01Z")), now()));
        // Expiring exactly now is no longer valid
        assert!(!vip_valid_at(&user("vip", Some("2025-06-01T12:00:00Z")), now()));
        // A bare date is midnight at the start of that day
        assert!(!vip_valid_at(&user("vip", Some("2025-06-01")), now()));
        assert!(!vip_valid_at(&user("vip", Some("")), now()));
        assert!(!vip_valid_at(&user("vip", None), now()));
        assert!(!vip_valid_at(&user("user", Some("2099-01-01")), now()));
    }

    #[test]
    fn test_parse_expiry_formats() {
        let expected = now();
        assert_eq!(parse_expiry("2025-06-01T12:00:00Z"), Some(expected));
        assert_eq!(parse_expiry("2025-06-01T14:00:00+02:00"), Some(expected));
        assert_eq!(parse_expiry("2025-06-01T12:00:00"), Some(expected));
        assert_eq!(parse_expiry("2025-06-01 12:00:00.000000"), Some(expected));
        assert_eq!(parse_expiry("not a date"), None);
    }

    #[test]
    fn test_vip_expired_today_loses_paid_lesson() {
        let lapsed = user("vip", Some("2025-06-01T00:00:01Z"));
        assert_eq!(
            access_at(&course(99), &lesson(false), Some(&lapsed), &[], now()),
            PlaybackAccess::PurchaseRequired
        );
        let active = user("vip", Some("2026-06-01T00:00:00Z"));
        assert_eq!(
            access_at(&course(99), &lesson(false), Some(&active), &[], now()),
            PlaybackAccess::Vip
        );
    }

    #[test]
    fn test_paid_order_unlocks_only_its_course() {
        let u = user("user", None);
        let paid_other = [order(2, OrderStatus::Paid)];
        let unpaid_same = [order(1, OrderStatus::Unpaid)];
        let paid_same = [order(1, OrderStatus::Paid)];

        assert_eq!(
            access_at(&course(99), &lesson(false), Some(&u), &paid_other, now()),
            PlaybackAccess::PurchaseRequired
        );
        assert_eq!(
            access_at(&course(99), &lesson(false), Some(&u), &unpaid_same, now()),
            PlaybackAccess::PurchaseRequired
        );
        assert_eq!(
            access_at(&course(99), &lesson(false), Some(&u), &paid_same, now()),
            PlaybackAccess::Purchased
        );
    }
}
