//! User profile model for NewsPulse.
//!
//! Only the columns the news and push engine read are modelled here;
//! credentials and sessions live in the auth subsystem.

use tracing::warn;

use crate::news::Category;

/// A user profile row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// User ID.
    pub id: i64,
    /// Email address.
    pub email: String,
    /// Preferred categories as a JSON array.
    pub preferences: String,
    /// Push descriptor as JSON (None when absent).
    pub push_subscription: Option<String>,
    /// When the user was created.
    pub created_at: String,
}

impl User {
    /// Decode the stored preference list.
    ///
    /// Entries that are not a known category are dropped.
    pub fn preference_categories(&self) -> Vec<Category> {
        decode_preferences(self.id, &self.preferences)
    }
}

/// New user for creation.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address.
    pub email: String,
}

impl NewUser {
    /// Create a new user request.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

pub(super) fn decode_preferences(user_id: i64, raw: &str) -> Vec<Category> {
    let entries: Vec<String> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(user_id, error = %e, "Stored preferences are not a JSON array");
            return Vec::new();
        }
    };

    let mut categories = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.parse::<Category>() {
            Ok(category) if !categories.contains(&category) => categories.push(category),
            Ok(_) => {}
            Err(_) => warn!(user_id, entry = %entry, "Ignoring unknown stored preference"),
        }
    }
    categories
}

pub(super) fn encode_preferences(categories: &[Category]) -> String {
    let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
    serde_json::Value::from(names).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_preferences() {
        let categories = decode_preferences(1, r#"["sports","technology"]"#);
        assert_eq!(categories, vec![Category::Sports, Category::Technology]);
    }

    #[test]
    fn test_decode_preferences_skips_unknown_and_duplicates() {
        let categories = decode_preferences(1, r#"["sports","weather","sports"]"#);
        assert_eq!(categories, vec![Category::Sports]);
    }

    #[test]
    fn test_decode_preferences_malformed() {
        assert!(decode_preferences(1, "not json").is_empty());
    }

    #[test]
    fn test_encode_preferences() {
        let json = encode_preferences(&[Category::Health, Category::General]);
        assert_eq!(json, r#"["health","general"]"#);
    }
}
