use serde::{Deserialize, Serialize};

/// Identity returned by the server after login, verification or `/users/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(rename = "profileImageUrl", default)]
    pub profile_image_url: Option<String>,
}

impl User {
    /// Name to greet the user with, falling back to the handle
    pub fn greeting_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_without_optionals() {
        let json = r#"{"id":"u1","username":"neonbyte","displayName":"Neon Byte"}"#;
        let user: User = serde_json::from_str(json).expect("Failed to parse user JSON");
        assert_eq!(user.id, "u1");
        assert_eq!(user.display_name, "Neon Byte");
        assert!(user.bio.is_none());
        assert!(user.profile_image_url.is_none());
    }

    #[test]
    fn test_serialized_user_uses_wire_names() {
        let user = User {
            id: "u1".to_string(),
            username: "neonbyte".to_string(),
            display_name: "Neon Byte".to_string(),
            bio: Some("synthwave".to_string()),
            profile_image_url: None,
        };
        let value = serde_json::to_value(&user).expect("Failed to serialize user");
        assert_eq!(value["displayName"], "Neon Byte");
        assert_eq!(value["bio"], "synthwave");
        assert!(value.get("display_name").is_none());
    }

    #[test]
    fn test_greeting_name_falls_back_to_username() {
        let mut user = User {
            id: "u1".to_string(),
            username: "neonbyte".to_string(),
            display_name: "Neon Byte".to_string(),
            bio: None,
            profile_image_url: None,
        };
        assert_eq!(user.greeting_name(), "Neon Byte");
        user.display_name = "  ".to_string();
        assert_eq!(user.greeting_name(), "neonbyte");
    }
}
