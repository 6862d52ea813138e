use playroom_booking_bot::bot::commands::Command;
use teloxide::utils::command::BotCommands;

#[cfg(test)]
mod command_parsing_tests {
    use super::*;

    #[test]
    fn test_every_command_parses() {
        let cases = [
            ("/help", Command::Help),
            ("/start", Command::Start),
            ("/select_date", Command::SelectDate),
            ("/reserve", Command::Reserve),
            ("/view_my_current_reservations", Command::ViewMyCurrentReservations),
            ("/view_my_all_reservations", Command::ViewMyAllReservations),
            ("/cancel_reservation", Command::CancelReservation),
            ("/cancel_all_reservations", Command::CancelAllReservations),
        ];

        for (input, expected) in cases {
            assert_eq!(Command::parse(input, "playroombot").unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_command_addressed_to_bot() {
        let result = Command::parse("/select_date@playroombot", "playroombot");
        assert_eq!(result.unwrap(), Command::SelectDate);
    }

    #[test]
    fn test_command_addressed_to_other_bot_is_rejected() {
        assert!(Command::parse("/select_date@otherbot", "playroombot").is_err());
    }

    #[test]
    fn test_unknown_commands_are_rejected() {
        for input in ["/selectdate", "/schedule", "/SelectDate", "hello"] {
            assert!(Command::parse(input, "playroombot").is_err(), "{input}");
        }
    }

    #[test]
    fn test_descriptions_list_booking_commands() {
        let help = Command::descriptions().to_string();
        assert!(help.contains("/select_date"));
        assert!(help.contains("/cancel_all_reservations"));
    }
}
