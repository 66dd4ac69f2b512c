//! Line commands typed at the review prompt.

use anyhow::{anyhow, bail, Result};
use review_client::NavigationIntent;
use shared::domain::{Acceptability, InstanceIndex, InstanceQuality, Panel, Preference};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCommand {
    Accept(Panel, Acceptability),
    Prefer(Preference),
    Quality(Option<InstanceQuality>),
    Comment(String),
    SubmitEvaluation,
    SubmitFeedback,
    Navigate(NavigationIntent),
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  a yes|no                 judge completion A
  b yes|no                 judge completion B
  pref <value>             a-is-better | a-is-slightly-better | tie | b-is-slightly-better | b-is-better
  quality <value>|none     good | acceptable | poor
  comment <text>           set the feedback comment (empty clears it)
  submit                   submit the evaluation
  feedback                 submit feedback
  next | prev | goto <n>   navigate between instances
  left                     open the remaining-instances page
  logout                   log out and exit
  show | help | quit";

pub fn parse(line: &str) -> Result<Option<ReviewCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "a" => ReviewCommand::Accept(Panel::A, rest.parse()?),
        "b" => ReviewCommand::Accept(Panel::B, rest.parse()?),
        "pref" | "preference" => ReviewCommand::Prefer(rest.parse()?),
        "quality" => match rest {
            "" | "none" => ReviewCommand::Quality(None),
            value => ReviewCommand::Quality(Some(value.parse()?)),
        },
        "comment" => ReviewCommand::Comment(rest.to_string()),
        "submit" => ReviewCommand::SubmitEvaluation,
        "feedback" => ReviewCommand::SubmitFeedback,
        "next" => ReviewCommand::Navigate(NavigationIntent::Next),
        "prev" => ReviewCommand::Navigate(NavigationIntent::Prev),
        "goto" => {
            let index = rest
                .parse::<u64>()
                .map_err(|_| anyhow!("goto expects a non-negative index, got '{rest}'"))?;
            ReviewCommand::Navigate(NavigationIntent::Goto(InstanceIndex(index)))
        }
        "left" => ReviewCommand::Navigate(NavigationIntent::LeftInstances),
        "logout" => ReviewCommand::Navigate(NavigationIntent::Logout),
        "show" => ReviewCommand::Show,
        "help" | "?" => ReviewCommand::Help,
        "quit" | "exit" => ReviewCommand::Quit,
        other => bail!("unknown command '{other}' (type `help`)"),
    };
    Ok(Some(command))
}
