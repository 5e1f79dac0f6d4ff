/// Gravatar image for an email, falling back to a generated identicon.
/// MD5 is what the avatar service keys on, it protects nothing here.
pub fn avatar_url(email: &str) -> String {
    let digest = md5::compute(email.to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{:x}?d=identicon&s=100", digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_url() {
        pretty_assertions::assert_eq!(
            avatar_url("test@example.com"),
            "https://www.gravatar.com/avatar/55502f40dc8b7c769880b10874abc9d0?d=identicon&s=100"
        );
    }

    #[test]
    fn test_avatar_ignores_case() {
        pretty_assertions::assert_eq!(avatar_url("Test@Example.COM"), avatar_url("test@example.com"));
    }
}
