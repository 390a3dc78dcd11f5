use std::collections::BTreeSet;

use crate::core::audio::Timbre;
use crate::core::settings::SettingsChange;
use crate::core::theory::{parse_pitch_class, HandRange, KeySelection, Notation, Scale};
use crate::messaging::TrainerMessage;

pub const HELP: &str = "\
commands:
  p, play              play the melody again
  n, new               new melody
  r, restart           start the current melody over
  stats-reset          zero the counters
  c, cancel            stop playback
  length N             notes per melody
  interval N           largest jump between notes, in semitones
  notation NAME        western | solfege | japanese
  scale NAME [ROOT]    e.g. `scale minor A`
  keys C,D,E...        pick the keys by hand
  hand left|right|both keyboard range
  timbre NAME          piano | guitar | sine
  volume V             0.0 to 1.0
  save                 write settings to disk
  help                 this text
  q, quit              exit";

/// One line of console input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Send(TrainerMessage),
    Help,
}

impl From<SettingsChange> for Command {
    fn from(change: SettingsChange) -> Self {
        Command::Send(TrainerMessage::ChangeSettings(change))
    }
}

/// Parse a console line. Empty lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "p" | "play" => Command::Send(TrainerMessage::PlayDemo),
        "n" | "new" => Command::Send(TrainerMessage::NewMelody),
        "r" | "restart" => Command::Send(TrainerMessage::RestartRound),
        "stats-reset" => Command::Send(TrainerMessage::ResetStatistics),
        "c" | "cancel" => Command::Send(TrainerMessage::CancelPlayback),
        "save" => Command::Send(TrainerMessage::SaveSettings),
        "q" | "quit" | "exit" => Command::Send(TrainerMessage::Quit),
        "h" | "help" | "?" => Command::Help,
        "length" => {
            let value = single(&args, "length N")?;
            let length = value
                .parse::<usize>()
                .map_err(|_| format!("'{}' is not a length", value))?;
            SettingsChange::MelodyLength(length).into()
        }
        "interval" => {
            let value = single(&args, "interval N")?;
            let interval = value
                .parse::<i32>()
                .map_err(|_| format!("'{}' is not an interval", value))?;
            SettingsChange::MaxInterval(interval).into()
        }
        "notation" => {
            let notation: Notation = single(&args, "notation NAME")?.parse()?;
            SettingsChange::Notation(notation).into()
        }
        "scale" => {
            let (name, root) = match args.as_slice() {
                [name] => (*name, 0),
                [name, root] => (
                    *name,
                    parse_pitch_class(root).ok_or_else(|| format!("unknown root '{}'", root))?,
                ),
                _ => return Err("usage: scale NAME [ROOT]".to_string()),
            };
            let scale: Scale = name.parse()?;
            SettingsChange::Keys(KeySelection::Scale { root, scale }).into()
        }
        "keys" => {
            if args.is_empty() {
                return Err("usage: keys C,D,E...".to_string());
            }
            let classes = args
                .iter()
                .flat_map(|arg| arg.split(','))
                .filter(|name| !name.is_empty())
                .map(|name| parse_pitch_class(name).ok_or_else(|| format!("unknown key '{}'", name)))
                .collect::<Result<BTreeSet<_>, _>>()?;
            SettingsChange::Keys(KeySelection::Manual(classes)).into()
        }
        "hand" => {
            let hand: HandRange = single(&args, "hand left|right|both")?.parse()?;
            SettingsChange::HandRange(hand).into()
        }
        "timbre" => {
            let timbre: Timbre = single(&args, "timbre NAME")?.parse()?;
            SettingsChange::Timbre(timbre).into()
        }
        "volume" => {
            let value = single(&args, "volume V")?;
            let volume = value
                .parse::<f32>()
                .map_err(|_| format!("'{}' is not a volume", value))?;
            SettingsChange::Volume(volume).into()
        }
        other => return Err(format!("unknown command '{}', try `help`", other)),
    };
    Ok(Some(command))
}

fn single<'a>(args: &[&'a str], usage: &str) -> Result<&'a str, String> {
    match args {
        [value] => Ok(value),
        _ => Err(format!("usage: {}", usage)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn change(line: &str) -> SettingsChange {
        match parse_command(line) {
            Ok(Some(Command::Send(TrainerMessage::ChangeSettings(change)))) => change,
            other => panic!("{:?} did not parse as a settings change: {:?}", line, other),
        }
    }

    #[test]
    fn round_commands_and_aliases() {
        assert_eq!(parse_command("p"), Ok(Some(Command::Send(TrainerMessage::PlayDemo))));
        assert_eq!(parse_command("  NEW "), Ok(Some(Command::Send(TrainerMessage::NewMelody))));
        assert_eq!(
            parse_command("stats-reset"),
            Ok(Some(Command::Send(TrainerMessage::ResetStatistics)))
        );
        assert_eq!(parse_command("help"), Ok(Some(Command::Help)));
        assert_eq!(parse_command(""), Ok(None));
    }

    #[test]
    fn settings_commands() {
        assert_eq!(change("length 6"), SettingsChange::MelodyLength(6));
        assert_eq!(change("interval 0"), SettingsChange::MaxInterval(0));
        assert_eq!(change("notation solfege"), SettingsChange::Notation(Notation::Solfege));
        assert_eq!(change("hand both"), SettingsChange::HandRange(HandRange::Both));
        assert_eq!(change("timbre guitar"), SettingsChange::Timbre(Timbre::Guitar));
    }

    #[test]
    fn scale_root_defaults_to_c() {
        assert_eq!(
            change("scale blues"),
            SettingsChange::Keys(KeySelection::Scale { root: 0, scale: Scale::Blues })
        );
        assert_eq!(
            change("scale minor A"),
            SettingsChange::Keys(KeySelection::Scale { root: 9, scale: Scale::NaturalMinor })
        );
    }

    #[test]
    fn manual_keys_accept_commas_and_spaces() {
        assert_eq!(
            change("keys C,E G"),
            SettingsChange::Keys(KeySelection::Manual(BTreeSet::from([0, 4, 7])))
        );
        assert!(parse_command("keys C,H").is_err());
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert!(parse_command("length").is_err());
        assert!(parse_command("length -2").is_err());
        assert!(parse_command("scale dorian").is_err());
        assert!(parse_command("dance").is_err());
    }
}
