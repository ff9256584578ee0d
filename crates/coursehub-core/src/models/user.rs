//! Account models: the current user's profile and profile edits.

use serde::{Deserialize, Serialize};

/// Role granting access to every course while the membership is valid.
pub const VIP_ROLE: &str = "vip";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default = "default_role")]
    pub role: String,
    /// `YYYY-MM-DD` or a full timestamp; empty when not a VIP.
    #[serde(default)]
    pub vip_expiry_date: Option<String>,
}

fn default_role() -> String {
    "user".to_string()
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    pub fn is_vip(&self) -> bool {
        self.role.eq_ignore_ascii_case(VIP_ROLE)
    }
}

/// Editable profile fields for `POST /user/update_profile`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProfileUpdate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&UserProfile> for ProfileUpdate {
    fn from(profile: &UserProfile) -> Self {
        Self {
            email: profile.email.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_profile() {
        let profile: UserProfile = serde_json::from_str(r#"{"username": "alice"}"#).unwrap();
        assert_eq!(profile.role, "user");
        assert!(!profile.is_vip());
        assert_eq!(profile.display_name(), "alice");
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        let json = r#"{"username": "bob", "email": "b@x.io", "first_name": "Bob", "last_name": "Li", "role": "VIP", "vip_expiry_date": "2030-01-01"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.display_name(), "Bob Li");
        assert!(profile.is_vip());
    }

    #[test]
    fn test_profile_update_from_profile() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"username": "c", "email": "c@x.io", "first_name": "C"}"#)
                .unwrap();
        let update = ProfileUpdate::from(&profile);
        assert_eq!(update.email, "c@x.io");
        assert_eq!(update.first_name, "C");
        assert!(update.last_name.is_empty());
    }
}
