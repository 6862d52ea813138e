use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Playroom booking commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Choose a date for a new booking")]
    SelectDate,
    #[command(description = "Show free slots for the chosen date")]
    Reserve,
    #[command(description = "Show your upcoming reservations")]
    ViewMyCurrentReservations,
    #[command(description = "Show all your reservations")]
    ViewMyAllReservations,
    #[command(description = "Cancel one of your reservations")]
    CancelReservation,
    #[command(description = "Cancel all your reservations")]
    CancelAllReservations,
}
