use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

pub fn validate_name(field: &'static str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(validate_email("ada@x.io").is_ok());
        assert!(validate_email("alan.turing+cs@bletchley.ac.uk").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in ["", "ada", "ada@", "@x.io", "ada@x", "ada lovelace@x.io"] {
            assert!(validate_email(email).is_err(), "{email} should be rejected");
        }
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(validate_name("first_name", "Ada").is_ok());
        assert_eq!(
            validate_name("last_name", "   ").unwrap_err(),
            "last_name must not be blank"
        );
    }
}
