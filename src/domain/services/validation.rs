use crate::error::AppError;

/// Customer contact fields after validation. Construct through [`ContactDetails::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

impl ContactDetails {
    pub fn parse(name: &str, phone: &str, email: Option<&str>) -> Result<Self, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Please fill in your name".into()));
        }

        let phone = phone.trim();
        if phone.is_empty() {
            return Err(AppError::Validation("Please fill in your phone number".into()));
        }
        if !is_valid_phone(phone) {
            return Err(AppError::Validation("Phone number must be 8 digits starting with 2, 4, 5 or 9".into()));
        }

        let email = match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(e) if is_plausible_email(e) => Some(e.to_string()),
            Some(_) => return Err(AppError::Validation("Invalid email address".into())),
            None => None,
        };

        Ok(Self { name: name.to_string(), phone: phone.to_string(), email })
    }
}

/// Local mobile/landline format: exactly 8 digits, leading 9, 2, 4 or 5.
pub fn is_valid_phone(phone: &str) -> bool {
    let bytes = phone.as_bytes();
    bytes.len() == 8
        && bytes.iter().all(u8::is_ascii_digit)
        && matches!(bytes[0], b'9' | b'2' | b'4' | b'5')
}

fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        }
        _ => false,
    }
}
