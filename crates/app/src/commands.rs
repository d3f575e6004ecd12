//! Learner commands typed at the prompt.
//!
//! Numbers are 1-based on the prompt and converted to the 0-based indices the
//! session works with.

use std::fmt;

use services::LessonAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Action(LessonAction),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument { command: &'static str, name: &'static str },
    InvalidNumber { raw: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "empty command"),
            CommandError::Unknown(cmd) => write!(f, "unknown command: {cmd} (try `help`)"),
            CommandError::MissingArgument { command, name } => {
                write!(f, "`{command}` needs <{name}>")
            }
            CommandError::InvalidNumber { raw } => {
                write!(f, "expected a number starting at 1, got `{raw}`")
            }
        }
    }
}

impl std::error::Error for CommandError {}

pub const HELP: &str = "\
Commands:
  answer <question> <option>   pick an option (both start at 1)
  submit                       finish the quiz
  play <n>                     jump to playlist item n
  ended                        the current video finished
  back                         leave the lesson
  help                         show this help";

fn one_based(
    raw: Option<&str>,
    command: &'static str,
    name: &'static str,
) -> Result<usize, CommandError> {
    let raw = raw.ok_or(CommandError::MissingArgument { command, name })?;
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(CommandError::InvalidNumber {
            raw: raw.to_owned(),
        }),
    }
}

/// Parse one input line.
///
/// # Errors
///
/// Returns `CommandError` for blank lines, unknown commands and bad numbers.
pub fn parse_command(line: &str) -> Result<Input, CommandError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Err(CommandError::Empty);
    };

    let action = match command.to_ascii_lowercase().as_str() {
        "answer" | "a" => {
            let question = one_based(words.next(), "answer", "question")?;
            let option = one_based(words.next(), "answer", "option")?;
            LessonAction::Answer { question, option }
        }
        "submit" | "s" => LessonAction::Submit,
        "play" | "p" => LessonAction::SelectVideo(one_based(words.next(), "play", "n")?),
        "ended" | "next" => LessonAction::VideoEnded,
        "back" | "quit" | "q" => LessonAction::Back,
        "help" | "?" => return Ok(Input::Help),
        _ => return Err(CommandError::Unknown(command.to_owned())),
    };
    Ok(Input::Action(action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_converts_to_zero_based() {
        assert_eq!(
            parse_command("answer 2 3").unwrap(),
            Input::Action(LessonAction::Answer {
                question: 1,
                option: 2
            })
        );
        assert_eq!(
            parse_command("  A 1 1 ").unwrap(),
            Input::Action(LessonAction::Answer {
                question: 0,
                option: 0
            })
        );
    }

    #[test]
    fn zero_is_not_a_valid_position() {
        assert_eq!(
            parse_command("play 0").unwrap_err(),
            CommandError::InvalidNumber { raw: "0".into() }
        );
    }

    #[test]
    fn missing_arguments_are_named() {
        assert_eq!(
            parse_command("answer 1").unwrap_err(),
            CommandError::MissingArgument {
                command: "answer",
                name: "option"
            }
        );
    }

    #[test]
    fn simple_commands() {
        assert_eq!(
            parse_command("submit").unwrap(),
            Input::Action(LessonAction::Submit)
        );
        assert_eq!(
            parse_command("ended").unwrap(),
            Input::Action(LessonAction::VideoEnded)
        );
        assert_eq!(
            parse_command("back").unwrap(),
            Input::Action(LessonAction::Back)
        );
        assert_eq!(parse_command("help").unwrap(), Input::Help);
        assert_eq!(parse_command("   ").unwrap_err(), CommandError::Empty);
        assert!(matches!(
            parse_command("dance").unwrap_err(),
            CommandError::Unknown(_)
        ));
    }
}
