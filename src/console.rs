use callcenter_dashboard_config::{
    RosterFilter,
    Sector,
};
use std::str::FromStr;

pub const HELP: &str = "\
commands:
  r, refresh          force a refresh of the active sector
  s, sector <name>    switch sector (suporte, comercial)
  f, filter <name>    filter the ranking (all, interns, staff)
  d, detail <code>    show one collaborator
  h, help             show this help
  q, quit             exit";

/// One line typed at the dashboard prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Refresh,
    Sector(Sector),
    Filter(RosterFilter),
    Detail(String),
    Help,
    Quit,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("empty command, type `help` for the list of commands")]
    Empty,
    #[error("unknown command `{0}`, type `help` for the list of commands")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("unknown sector `{0}`, expected suporte or comercial")]
    InvalidSector(String),
    #[error("unknown filter `{0}`, expected all, interns or staff")]
    InvalidFilter(String),
}

impl FromStr for ConsoleCommand {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or(ConsoleError::Empty)?.to_lowercase();
        let argument = words.next();

        match command.as_str() {
            "r" | "refresh" => Ok(ConsoleCommand::Refresh),
            "s" | "sector" => {
                let name = argument.ok_or(ConsoleError::MissingArgument("sector"))?;
                name.parse()
                    .map(ConsoleCommand::Sector)
                    .map_err(|_| ConsoleError::InvalidSector(name.to_string()))
            }
            "f" | "filter" => {
                let name = argument.ok_or(ConsoleError::MissingArgument("filter"))?;
                name.parse()
                    .map(ConsoleCommand::Filter)
                    .map_err(|_| ConsoleError::InvalidFilter(name.to_string()))
            }
            "d" | "detail" => argument
                .map(|code| ConsoleCommand::Detail(code.to_string()))
                .ok_or(ConsoleError::MissingArgument("detail")),
            "h" | "help" | "?" => Ok(ConsoleCommand::Help),
            "q" | "quit" | "exit" => Ok(ConsoleCommand::Quit),
            _ => Err(ConsoleError::Unknown(command)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!("r".parse(), Ok(ConsoleCommand::Refresh));
        assert_eq!("  REFRESH ".parse(), Ok(ConsoleCommand::Refresh));
        assert_eq!("s comercial".parse(), Ok(ConsoleCommand::Sector(Sector::Commercial)));
        assert_eq!("sector support".parse(), Ok(ConsoleCommand::Sector(Sector::Support)));
        assert_eq!("f interns".parse(), Ok(ConsoleCommand::Filter(RosterFilter::Interns)));
        assert_eq!("detail 4002".parse(), Ok(ConsoleCommand::Detail("4002".to_string())));
        assert_eq!("q".parse(), Ok(ConsoleCommand::Quit));
        assert_eq!("help".parse(), Ok(ConsoleCommand::Help));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!("".parse::<ConsoleCommand>(), Err(ConsoleError::Empty));
        assert_eq!(
            "launch".parse::<ConsoleCommand>(),
            Err(ConsoleError::Unknown("launch".to_string()))
        );
        assert_eq!("s".parse::<ConsoleCommand>(), Err(ConsoleError::MissingArgument("sector")));
        assert_eq!(
            "s sales".parse::<ConsoleCommand>(),
            Err(ConsoleError::InvalidSector("sales".to_string()))
        );
        assert_eq!(
            "f everyone".parse::<ConsoleCommand>(),
            Err(ConsoleError::InvalidFilter("everyone".to_string()))
        );
        assert_eq!("d".parse::<ConsoleCommand>(), Err(ConsoleError::MissingArgument("detail")));
    }
}
