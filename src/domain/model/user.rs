/// The authenticated caller, as asserted by the OAuth provider's token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub preferred_username: Option<String>,
}

impl User {
    /// Social handle stored on the account (`@` + provider username).
    ///
    /// Falls back to the local part of the email, then to the user id, when the
    /// provider did not send a username.
    pub fn handle(&self) -> String {
        let name = self
            .preferred_username
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| n.trim_start_matches('@').to_string())
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| self.id.clone());
        format!("@{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: Option<&str>, email: Option<&str>) -> User {
        User {
            id: "u-1".to_string(),
            email: email.map(str::to_string),
            preferred_username: name.map(str::to_string),
        }
    }

    #[test]
    fn handle_prefers_username() {
        assert_eq!(user(Some("alice"), Some("a@x.io")).handle(), "@alice");
        assert_eq!(user(Some("@alice"), None).handle(), "@alice");
    }

    #[test]
    fn handle_falls_back_to_email_then_id() {
        assert_eq!(user(None, Some("bob@x.io")).handle(), "@bob");
        assert_eq!(user(Some("  "), None).handle(), "@u-1");
    }
}
