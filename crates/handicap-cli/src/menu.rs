use strum::EnumString;

pub const MENU_TEXT: &str = "Please choose an option:\n\
1. Add a new golf score\n\
2. Calculate your current handicap score\n\
3. View all scores\n\
Type 'Q' or 'q' to quit.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
pub enum MenuChoice {
    #[strum(serialize = "1")]
    AddScore,
    #[strum(serialize = "2")]
    ShowHandicap,
    #[strum(serialize = "3")]
    ListScores,
    #[strum(serialize = "q", serialize = "Q")]
    Quit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        input.trim().parse().ok()
    }
}
