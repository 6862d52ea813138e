use crate::database::models::PersonalDetails;
use anyhow::{anyhow, Result};

const MAX_NAME_LEN: usize = 50;

/// Parses a `Name, Surname, Phone` line.
pub fn parse_personal_details(input: &str) -> Result<PersonalDetails> {
    let fields: Vec<&str> = input.trim().split(',').map(str::trim).collect();

    if fields.len() != 3 {
        return Err(anyhow!("Expected 3 comma-separated fields, got {}", fields.len()));
    }

    let name = validate_name("Name", fields[0])?;
    let surname = validate_name("Surname", fields[1])?;
    let phone = validate_phone(fields[2])?;

    Ok(PersonalDetails {
        name,
        surname,
        phone,
    })
}

pub fn validate_name(field: &str, value: &str) -> Result<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(anyhow!("{} cannot be empty", field));
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(anyhow!("{} cannot be longer than {} characters", field, MAX_NAME_LEN));
    }

    if value.chars().any(char::is_control) {
        return Err(anyhow!("{} cannot contain control characters", field));
    }

    Ok(value.to_string())
}

pub fn validate_phone(value: &str) -> Result<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(anyhow!("Phone number cannot be empty"));
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'))
    {
        return Err(anyhow!("Phone number can only contain digits, spaces, +, - and parentheses"));
    }

    if value.chars().skip(1).any(|c| c == '+') {
        return Err(anyhow!("Phone number can only have + as its first character"));
    }

    let digits = value.chars().filter(char::is_ascii_digit).count();
    if !(7..=15).contains(&digits) {
        return Err(anyhow!("Phone number must have between 7 and 15 digits"));
    }

    Ok(value.to_string())
}
