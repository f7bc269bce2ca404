use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;

pub const CODE_MIN: u32 = 100_000;
pub const CODE_MAX: u32 = 999_999;
pub const CODE_VALID_MINUTES: u32 = 10;

lazy_static! {
    // local@domain.tld, exactly one '@', no whitespace anywhere
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

const MAX_LABEL_CHARS: usize = 64;

// What the code is for. Unrecognised values land in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OtpPurpose {
    #[default]
    Registration,
    ForgotPassword,
    Login,
    Verification,
    Other,
}

impl OtpPurpose {
    pub fn from_name(name: &str) -> Self {
        match name {
            "registration" => OtpPurpose::Registration,
            "forgot-password" => OtpPurpose::ForgotPassword,
            "login" => OtpPurpose::Login,
            "verification" => OtpPurpose::Verification,
            _ => OtpPurpose::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OtpPurpose::Registration => "registration",
            OtpPurpose::ForgotPassword => "forgot-password",
            OtpPurpose::Login => "login",
            OtpPurpose::Verification => "verification",
            OtpPurpose::Other => "other",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            OtpPurpose::Registration => "Complete Your Registration",
            OtpPurpose::ForgotPassword => "Reset Your Password",
            OtpPurpose::Login => "Login Verification",
            OtpPurpose::Verification => "Email Verification",
            OtpPurpose::Other => "Verification Code",
        }
    }
}

// Caller's purpose as shown in the subject: "forgot-password" -> "Forgot-password".
// Control characters are dropped and the length is capped, it ends up in a header.
pub fn subject_label(purpose: &str) -> String {
    let mut chars = purpose
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_LABEL_CHARS);
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

// Rate limit key for a recipient
pub fn normalize_recipient(email: &str) -> String {
    email.to_ascii_lowercase()
}

// Uniform over 100000..=999999, never a leading zero
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX).to_string()
}

pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

// Mask an address for logs: `use***@example.com`
pub fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at) => {
            let local = &email[..at];
            let visible = local.char_indices().nth(3).map(|(i, _)| i).unwrap_or(local.len());
            format!("{}***{}", &local[..visible], &email[at..])
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "no-at-sign", "a@b", "a b@c.com", "a@@b.com", "a@b@c.com", "@b.com", "a@.com ", " a@b.com"] {
            assert!(!is_valid_email(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn accepts_ordinary_addresses() {
        for good in ["user@example.com", "first.last+tag@mail.example.co.uk", "X@Y.IO"] {
            assert!(is_valid_email(good), "{good:?} should be accepted");
        }
    }

    #[test]
    fn recipient_key_is_case_insensitive() {
        assert_eq!(normalize_recipient("User@Example.COM"), "user@example.com");
    }

    #[test]
    fn purpose_parses_known_and_unknown_values() {
        assert_eq!(OtpPurpose::from_name("registration"), OtpPurpose::Registration);
        assert_eq!(OtpPurpose::from_name("forgot-password"), OtpPurpose::ForgotPassword);
        assert_eq!(OtpPurpose::from_name("login"), OtpPurpose::Login);
        assert_eq!(OtpPurpose::from_name("verification"), OtpPurpose::Verification);
        assert_eq!(OtpPurpose::from_name("password-rotation"), OtpPurpose::Other);
        assert_eq!(OtpPurpose::default(), OtpPurpose::Registration);
    }

    #[test]
    fn purpose_titles() {
        assert_eq!(OtpPurpose::ForgotPassword.title(), "Reset Your Password");
        assert_eq!(OtpPurpose::Other.title(), "Verification Code");
    }

    #[test]
    fn subject_label_keeps_callers_purpose() {
        assert_eq!(subject_label("forgot-password"), "Forgot-password");
        assert_eq!(subject_label("login"), "Login");
        assert_eq!(subject_label("password-rotation"), "Password-rotation");
        assert_eq!(subject_label("x\r\nBcc: evil@example.com"), "XBcc: evil@example.com");
        assert_eq!(subject_label(&"a".repeat(200)).chars().count(), 64);
        assert_eq!(subject_label(""), "");
    }

    #[test]
    fn code_shape_check() {
        assert!(is_well_formed_code("012345"));
        assert!(is_well_formed_code("999999"));
        assert!(!is_well_formed_code("12345"));
        assert!(!is_well_formed_code("1234567"));
        assert!(!is_well_formed_code("12a456"));
        assert!(!is_well_formed_code("１２３４５６"));
    }

    #[test]
    fn masks_local_part() {
        assert_eq!(mask_email("someone@example.com"), "som***@example.com");
        assert_eq!(mask_email("ab@example.com"), "ab***@example.com");
        assert_eq!(mask_email("garbage"), "***");
    }

    #[test]
    fn codes_are_uniform_over_a_million_draws() {
        const TRIALS: usize = 1_000_000;
        // bucket by leading digit: 1..=9, each should get 1/9 of the draws
        let mut buckets = [0usize; 9];
        for _ in 0..TRIALS {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            let lead = code.as_bytes()[0] - b'1';
            buckets[lead as usize] += 1;
        }

        let expected = TRIALS as f64 / 9.0;
        let chi2: f64 = buckets
            .iter()
            .map(|&n| {
                let d = n as f64 - expected;
                d * d / expected
            })
            .sum();
        // 8 degrees of freedom, p = 0.001 critical value is 26.12
        assert!(chi2 < 26.12, "chi2 = {chi2}, buckets = {buckets:?}");
    }

    proptest! {
        #[test]
        fn generated_codes_stay_in_range(_seed in 0u8..255) {
            let code = generate_code();
            prop_assert!(is_well_formed_code(&code));
            let n: u32 = code.parse().unwrap();
            prop_assert!((CODE_MIN..=CODE_MAX).contains(&n));
        }
    }
}
