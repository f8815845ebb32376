//! Line-oriented console front end: command parsing and update rendering.

use lab_core::{CorePreset, PromptSource, StateUpdate, UiEvent};

use crate::validation::{
    parse_entry_ref, validate_image_count, validate_prompt, EntryRef, ValidationError,
};

/// Help text printed by `/help`.
pub const HELP: &str = "\
Commands:
  /magic | /storm | /trend   generate from a preset core
  /generate <prompt>         generate from your own prompt
  /refine <request>          refine the concept (a bare line does the same)
  /manifest [1|4]            manifest concept images (default 1)
  /speak [text]              narrate the console text, or the given text
  /listen <selection>        narrate a selection of more than 15 words
  /remove <n|id>             remove a gallery image by position or id
  /clear                     clear the gallery
  /export                    export the session as PDF
  /edit <text>               replace the console text by hand
  /show                      print the session state
  /help                      show this help
  /quit                      leave";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Forward to the session.
    Event(UiEvent),
    /// Remove a gallery entry by reference.
    Remove(EntryRef),
    /// Print the session state.
    Show,
    /// Print help.
    Help,
    /// Leave.
    Quit,
    /// Blank line.
    Nothing,
}

/// Errors from parsing a console line.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown slash command.
    #[error("unknown command: /{0} (try /help)")]
    UnknownCommand(String),
    /// Argument failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Parse one line of console input.
///
/// # Errors
///
/// Returns [`ParseError`] for unknown commands or invalid arguments.
pub fn parse_line(line: &str) -> Result<ConsoleCommand, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ConsoleCommand::Nothing);
    }

    let Some(command) = line.strip_prefix('/') else {
        let text = validate_prompt(line)?.to_string();
        return Ok(ConsoleCommand::Event(UiEvent::Refine { text }));
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, rest)| (name, rest.trim()));

    let event = match name.to_ascii_lowercase().as_str() {
        "magic" | "storm" | "trend" => {
            let preset = name
                .parse::<CorePreset>()
                .map_err(|_| ParseError::UnknownCommand(name.to_string()))?;
            UiEvent::Generate {
                prompt: PromptSource::Preset(preset),
            }
        }
        "generate" | "gen" => UiEvent::Generate {
            prompt: PromptSource::Custom(validate_prompt(rest)?.to_string()),
        },
        "refine" => UiEvent::Refine {
            text: validate_prompt(rest)?.to_string(),
        },
        "manifest" | "visual" => UiEvent::Manifest {
            count: if rest.is_empty() {
                1
            } else {
                validate_image_count(rest)?
            },
        },
        "speak" | "voice" => UiEvent::Speak {
            text: (!rest.is_empty()).then(|| rest.to_string()),
        },
        "listen" => UiEvent::Listen {
            selection: validate_prompt(rest)?.to_string(),
        },
        "remove" | "rm" => return Ok(ConsoleCommand::Remove(parse_entry_ref(rest)?)),
        "clear" => UiEvent::ClearGallery,
        "export" | "save" => UiEvent::Export,
        "edit" => UiEvent::Edit {
            text: rest.to_string(),
        },
        "show" => return Ok(ConsoleCommand::Show),
        "help" | "?" => return Ok(ConsoleCommand::Help),
        "quit" | "exit" => return Ok(ConsoleCommand::Quit),
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(ConsoleCommand::Event(event))
}

/// Human-readable rendering of a state update, or `None` for updates not
/// worth printing.
#[must_use]
pub fn describe(update: &StateUpdate) -> Option<String> {
    match update {
        StateUpdate::Text { text } => Some(format!("\n{text}\n")),
        StateUpdate::ControlBusy { control, busy: true } => Some(format!("[{control}] working...")),
        StateUpdate::ControlBusy { .. } | StateUpdate::ImageLoader { .. } => None,
        StateUpdate::ActionBar { visible } => visible
            .then(|| "[actions] /manifest 1 | /manifest 4 | /speak | /refine <request>".to_string()),
        StateUpdate::Gallery { entries, .. } if entries.is_empty() => None,
        StateUpdate::Gallery { entries, .. } => Some(
            entries
                .iter()
                .enumerate()
                .map(|(i, id)| format!("  [{}] {id}", i + 1))
                .fold(format!("[gallery] {} image(s)", entries.len()), |acc, line| {
                    acc + "\n" + &line
                }),
        ),
        StateUpdate::ExportControl { visible } => {
            visible.then(|| "[export] /export to save a PDF".to_string())
        }
        StateUpdate::EmptyIndicator { visible, message } => {
            visible.then(|| format!("[gallery] {message}"))
        }
        StateUpdate::AudioReady {
            location,
            duration_ms,
        } => Some(format!("[voice] {location} ({duration_ms} ms)")),
        StateUpdate::Exported { path, pages } => {
            Some(format!("✨ Export Success: {} ({pages} pages)", path.display()))
        }
        StateUpdate::Error { message } => Some(format!("[error] {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lab_core::{Control, EntryId};

    #[test]
    fn bare_line_is_refinement() {
        assert_eq!(
            parse_line("make it darker"),
            Ok(ConsoleCommand::Event(UiEvent::Refine {
                text: "make it darker".into()
            }))
        );
        assert_eq!(parse_line("   "), Ok(ConsoleCommand::Nothing));
    }

    #[test]
    fn presets_and_prompts() {
        assert_eq!(
            parse_line("/Storm"),
            Ok(ConsoleCommand::Event(UiEvent::Generate {
                prompt: PromptSource::Preset(CorePreset::Storm)
            }))
        );
        assert_eq!(
            parse_line("/generate  a chrome login page "),
            Ok(ConsoleCommand::Event(UiEvent::Generate {
                prompt: PromptSource::Custom("a chrome login page".into())
            }))
        );
        assert!(matches!(
            parse_line("/generate"),
            Err(ParseError::Invalid(ValidationError::EmptyPrompt))
        ));
    }

    #[test]
    fn manifest_counts() {
        assert_eq!(
            parse_line("/manifest"),
            Ok(ConsoleCommand::Event(UiEvent::Manifest { count: 1 }))
        );
        assert_eq!(
            parse_line("/manifest 4"),
            Ok(ConsoleCommand::Event(UiEvent::Manifest { count: 4 }))
        );
        assert!(parse_line("/manifest 3").is_err());
    }

    #[test]
    fn speak_remove_and_misc() {
        assert_eq!(
            parse_line("/speak"),
            Ok(ConsoleCommand::Event(UiEvent::Speak { text: None }))
        );
        assert_eq!(
            parse_line("/speak hello there"),
            Ok(ConsoleCommand::Event(UiEvent::Speak {
                text: Some("hello there".into())
            }))
        );
        assert_eq!(
            parse_line("/remove 2"),
            Ok(ConsoleCommand::Remove(EntryRef::Position(2)))
        );
        let id = EntryId::new();
        assert_eq!(
            parse_line(&format!("/rm {id}")),
            Ok(ConsoleCommand::Remove(EntryRef::Id(id)))
        );
        assert_eq!(parse_line("/clear"), Ok(ConsoleCommand::Event(UiEvent::ClearGallery)));
        assert_eq!(parse_line("/export"), Ok(ConsoleCommand::Event(UiEvent::Export)));
        assert_eq!(parse_line("/show"), Ok(ConsoleCommand::Show));
        assert_eq!(parse_line("/quit"), Ok(ConsoleCommand::Quit));
        assert_eq!(
            parse_line("/dance"),
            Err(ParseError::UnknownCommand("dance".into()))
        );
    }

    #[test]
    fn edit_allows_empty_text() {
        assert_eq!(
            parse_line("/edit"),
            Ok(ConsoleCommand::Event(UiEvent::Edit { text: String::new() }))
        );
    }

    #[test]
    fn describe_skips_noise() {
        assert_eq!(
            describe(&StateUpdate::ControlBusy {
                control: Control::Voice,
                busy: false
            }),
            None
        );
        assert_eq!(
            describe(&StateUpdate::Error {
                message: "boom".into()
            }),
            Some("[error] boom".to_string())
        );
        let ids = vec![EntryId::new(), EntryId::new()];
        let text = describe(&StateUpdate::Gallery {
            entries: ids.clone(),
            scroll_to: Some(ids[0]),
        })
        .expect("gallery printed");
        assert!(text.starts_with("[gallery] 2 image(s)"));
        assert!(text.contains(&format!("[2] {}", ids[1])));
    }
}
