use crate::error::{Error, Result};

pub const PHONE_MIN_DIGITS: usize = 10;
pub const PHONE_MAX_DIGITS: usize = 15;

/// Accepts 10-15 ASCII digits after trimming, returns the trimmed number
pub fn phone_number(input: &str) -> Result<&str> {
    let phone = input.trim();
    let digits_only = phone.bytes().all(|b| b.is_ascii_digit());

    if !digits_only || !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&phone.len()) {
        return Err(Error::Validation(format!(
            "Please enter a valid phone number ({}-{} digits)",
            PHONE_MIN_DIGITS, PHONE_MAX_DIGITS
        )));
    }

    Ok(phone)
}

pub fn otp(input: &str) -> Result<&str> {
    let otp = input.trim();
    if otp.is_empty() {
        return Err(Error::Validation("Please enter the OTP".to_string()));
    }
    Ok(otp)
}

pub fn username(input: &str) -> Result<&str> {
    let name = input.trim();
    if name.is_empty() {
        return Err(Error::Validation("Please enter a username".to_string()));
    }
    Ok(name)
}
