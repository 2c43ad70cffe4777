//! Account credentials for the bot.

use std::fmt;

/// Username, password and account class used to log in.
///
/// The password is redacted in Debug output.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
    registered_bot: bool,
}

impl Credentials {
    /// Creates credentials. `registered_bot` selects `assert=bot` over
    /// `assert=user` on edits.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        registered_bot: bool,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            registered_bot,
        }
    }

    /// Account name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Account password. Never log the return value.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Whether the account holds the bot right.
    #[must_use]
    pub fn registered_bot(&self) -> bool {
        self.registered_bot
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("registered_bot", &self.registered_bot)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("ChapterBot", "hunter2", true);
        let debug_str = format!("{credentials:?}");
        assert!(debug_str.contains("ChapterBot"));
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[test]
    fn test_credentials_accessors() {
        let credentials = Credentials::new("ChapterBot", "pw", false);
        assert_eq!(credentials.username(), "ChapterBot");
        assert_eq!(credentials.password(), "pw");
        assert!(!credentials.registered_bot());
    }
}
