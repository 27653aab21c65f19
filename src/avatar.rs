use sha2::{Digest, Sha256};

/// Gravatar-style avatar URL derived from the email address. The email is
/// trimmed and lowercased first so the same mailbox always maps to the same
/// image regardless of how it was typed.
pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("https://www.gravatar.com/avatar/{hex}?s=200&r=pg&d=mm")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_email() {
        assert_eq!(gravatar_url("a@example.com"), gravatar_url("a@example.com"));
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(
            gravatar_url("  A@Example.COM "),
            gravatar_url("a@example.com")
        );
    }

    #[test]
    fn different_emails_differ() {
        assert_ne!(gravatar_url("a@example.com"), gravatar_url("b@example.com"));
    }
}
