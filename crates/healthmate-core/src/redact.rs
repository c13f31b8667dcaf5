//! PII redaction applied to user text before it is persisted or forwarded.
//!
//! Two patterns are removed: email addresses and generalized phone numbers.
//! Email substitution runs first, phone substitution second over the already
//! partially-redacted string. The placeholder tokens contain no digits, so a
//! placeholder can never itself match the phone pattern.

use regex::Regex;

use crate::config::SafetyConfig;

/// Replacement token for email addresses.
pub const EMAIL_PLACEHOLDER: &str = "[redacted email]";

/// Replacement token for phone-like digit runs.
pub const PHONE_PLACEHOLDER: &str = "[redacted phone]";

const EMAIL_PATTERN: &str = r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}";

// A leading optional '+', then 7+ digits possibly separated by spaces,
// hyphens, or parentheses, ending on a digit.
const PHONE_PATTERN: &str = r"\+?\d[\d\s\-()]{6,}\d";

/// Deterministic, total text transform removing email and phone patterns.
pub struct Redactor {
    config: SafetyConfig,
    email_re: Regex,
    phone_re: Regex,
}

impl Redactor {
    /// Compile the redaction patterns with the given per-kind toggles.
    pub fn new(config: SafetyConfig) -> Self {
        // Both patterns are fixed literals, compilation cannot fail.
        let email_re = Regex::new(EMAIL_PATTERN).expect("email pattern is valid");
        let phone_re = Regex::new(PHONE_PATTERN).expect("phone pattern is valid");
        Self {
            config,
            email_re,
            phone_re,
        }
    }

    /// Replace every email match, then every phone match. Never fails.
    pub fn redact(&self, text: &str) -> String {
        let mut out = if self.config.email_redaction {
            self.email_re.replace_all(text, EMAIL_PLACEHOLDER).into_owned()
        } else {
            text.to_string()
        };
        if self.config.phone_redaction {
            out = self.phone_re.replace_all(&out, PHONE_PLACEHOLDER).into_owned();
        }
        out
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(SafetyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redactor() -> Redactor {
        Redactor::default()
    }

    #[test]
    fn test_plain_text_unchanged() {
        let r = redactor();
        assert_eq!(r.redact("I have a mild headache"), "I have a mild headache");
    }

    #[test]
    fn test_email_redacted() {
        let r = redactor();
        let out = r.redact("contact me at jane.doe+health@example.co.uk please");
        assert_eq!(out, "contact me at [redacted email] please");
        assert!(!out.contains('@'));
    }

    #[test]
    fn test_email_case_insensitive() {
        let r = redactor();
        let out = r.redact("Mail JANE@EXAMPLE.COM now");
        assert!(out.contains(EMAIL_PLACEHOLDER));
        assert!(!out.contains("EXAMPLE.COM"));
    }

    #[test]
    fn test_phone_redacted() {
        let r = redactor();
        let out = r.redact("call +1 (555) 123-4567 tomorrow");
        assert_eq!(out, "call [redacted phone] tomorrow");
    }

    #[test]
    fn test_phone_plain_digit_run() {
        let r = redactor();
        assert_eq!(r.redact("my number is 5551234567"), "my number is [redacted phone]");
    }

    #[test]
    fn test_short_digit_run_kept() {
        let r = redactor();
        // Six digits total is below the phone threshold.
        assert_eq!(r.redact("room 123456"), "room 123456");
    }

    #[test]
    fn test_email_then_phone_order() {
        let r = redactor();
        let out = r.redact("jane@example.com or 555-123-4567");
        assert!(out.contains(EMAIL_PLACEHOLDER));
        assert!(out.contains(PHONE_PLACEHOLDER));
    }

    #[test]
    fn test_placeholders_contain_no_digits() {
        assert!(!EMAIL_PLACEHOLDER.chars().any(|c| c.is_ascii_digit()));
        assert!(!PHONE_PLACEHOLDER.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_placeholder_not_re_redacted() {
        let r = redactor();
        let once = r.redact("call 555-123-4567");
        let twice = r.redact(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_multiple_emails() {
        let r = redactor();
        let out = r.redact("a@b.com and c@d.org");
        assert_eq!(out.matches(EMAIL_PLACEHOLDER).count(), 2);
    }

    #[test]
    fn test_deterministic() {
        let r = redactor();
        let input = "jane@example.com 555-123-4567";
        assert_eq!(r.redact(input), r.redact(input));
    }

    #[test]
    fn test_empty_string() {
        let r = redactor();
        assert_eq!(r.redact(""), "");
    }

    #[test]
    fn test_toggles_disable_redaction() {
        let r = Redactor::new(SafetyConfig {
            email_redaction: false,
            phone_redaction: false,
        });
        let input = "jane@example.com 555-123-4567";
        assert_eq!(r.redact(input), input);
    }

    #[test]
    fn test_phone_only_toggle() {
        let r = Redactor::new(SafetyConfig {
            email_redaction: false,
            phone_redaction: true,
        });
        let out = r.redact("jane@example.com 555-123-4567");
        assert!(out.contains("jane@example.com"));
        assert!(out.contains(PHONE_PLACEHOLDER));
    }

    #[test]
    fn test_unicode_text_preserved() {
        let r = redactor();
        let out = r.redact("fi\u{00e8}vre depuis hier, joindre 06 12 34 56 78");
        assert!(out.starts_with("fi\u{00e8}vre depuis hier"));
        assert!(out.contains(PHONE_PLACEHOLDER));
    }
}
