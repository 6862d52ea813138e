use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses the `YYYY-MM-DD` form used in callback payloads.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    // chrono accepts unpadded fields; payloads are always zero padded
    if input.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Human label for a date button, e.g. `Sat 01.06`.
pub fn format_date_label(date: NaiveDate) -> String {
    date.format("%a %d.%m").to_string()
}
