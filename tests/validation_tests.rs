use playroom_booking_bot::utils::validation::*;

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_valid_details_lines() {
        let cases = [
            ("John, Doe, +380671234567", "John", "Doe", "+380671234567"),
            ("  Anna ,Lee,  067 123 45 67 ", "Anna", "Lee", "067 123 45 67"),
            ("Jean-Luc, O'Neil, (067) 123-4567", "Jean-Luc", "O'Neil", "(067) 123-4567"),
            ("Олена, Шевченко, 0671234567", "Олена", "Шевченко", "0671234567"),
        ];

        for (input, name, surname, phone) in cases {
            let details = parse_personal_details(input).unwrap();
            assert_eq!(details.name, name, "{input}");
            assert_eq!(details.surname, surname, "{input}");
            assert_eq!(details.phone, phone, "{input}");
        }
    }

    #[test]
    fn test_wrong_field_count() {
        for input in ["John, Doe", "John", "", "John, Doe, 0671234567, extra"] {
            assert!(parse_personal_details(input).is_err(), "{input:?}");
        }
    }

    #[test]
    fn test_empty_fields_rejected() {
        for input in [", Doe, 0671234567", "John, , 0671234567", "John, Doe, "] {
            assert!(parse_personal_details(input).is_err(), "{input:?}");
        }
    }

    #[test]
    fn test_name_limits() {
        assert!(validate_name("Name", &"A".repeat(50)).is_ok());
        assert!(validate_name("Name", &"A".repeat(51)).is_err());
        assert!(validate_name("Name", "Jo\u{0007}hn").is_err());

        let error = validate_name("Surname", "").unwrap_err().to_string();
        assert!(error.contains("Surname"));
    }

    #[test]
    fn test_phone_rules() {
        for valid in ["1234567", "+123456789012345", "(067) 123-45-67"] {
            assert!(validate_phone(valid).is_ok(), "{valid}");
        }
        for invalid in ["123456", "+1234567890123456", "067-abc-4567", "067+1234567", "++3806712345"] {
            assert!(validate_phone(invalid).is_err(), "{invalid}");
        }
    }
}
