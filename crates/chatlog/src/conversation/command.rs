//! Bot command recognition.

/// Commands the orchestrator handles itself instead of passing to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Erase the sender's stored history.
    Forget,
}

impl Command {
    /// Parse a command from raw message text.
    ///
    /// Accepts `/forget` and the addressed form `/forget@SomeBot`, ignoring
    /// surrounding whitespace and any trailing arguments. Anything else,
    /// including unknown slash commands, is a plain message.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let name = token.strip_prefix('/')?;
        let name = name.split_once('@').map_or(name, |(name, _bot)| name);

        if name.eq_ignore_ascii_case("forget") {
            Some(Self::Forget)
        } else {
            None
        }
    }
}
