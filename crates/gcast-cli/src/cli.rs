use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};

use gcast_core::{MessageRef, Payload};

#[derive(Debug, Parser)]
#[command(name = "gcast", version, about = "Broadcast a message to every recipient in a list")]
pub struct Cli {
    /// Config file (default: $GCAST_CONFIG, then ~/.gcast/gcast.toml).
    #[arg(long)]
    pub config: Option<String>,

    /// File with one recipient ID per line.
    #[arg(long)]
    pub recipients: PathBuf,

    /// Print the result as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Copy a message into every recipient's chat and pin the copy.
    Copy {
        /// Chat the source message lives in.
        #[arg(long, allow_negative_numbers = true)]
        chat: i64,
        /// ID of the source message.
        #[arg(long)]
        message: i32,
        /// Do not pin the delivered copies.
        #[arg(long)]
        no_pin: bool,
    },
    /// Forward a message to every recipient.
    Forward {
        #[arg(long, allow_negative_numbers = true)]
        chat: i64,
        #[arg(long)]
        message: i32,
    },
    /// Send the given words, joined by spaces, as a text message.
    Text {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
}

impl Command {
    pub fn payload(&self) -> anyhow::Result<Payload> {
        let payload = match self {
            Command::Copy {
                chat,
                message,
                no_pin,
            } => Payload::Copy {
                source: MessageRef::new(*chat, *message),
                pin: !no_pin,
            },
            Command::Forward { chat, message } => Payload::Forward {
                source: MessageRef::new(*chat, *message),
            },
            Command::Text { words } => {
                let body = words.join(" ");
                if body.trim().is_empty() {
                    bail!("text broadcast needs a non-empty message");
                }
                Payload::Text { body }
            }
        };
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments parse")
    }

    #[test]
    fn copy_pins_by_default() {
        let cli = parse(&[
            "gcast", "--recipients", "users.txt", "copy", "--chat", "-1001234", "--message", "55",
        ]);
        assert_eq!(
            cli.command.payload().unwrap(),
            Payload::Copy {
                source: MessageRef::new(-1001234, 55),
                pin: true
            }
        );
    }

    #[test]
    fn copy_no_pin_disables_pinning() {
        let cli = parse(&[
            "gcast", "--recipients", "u.txt", "copy", "--chat", "1", "--message", "2", "--no-pin",
        ]);
        assert!(matches!(
            cli.command.payload().unwrap(),
            Payload::Copy { pin: false, .. }
        ));
    }

    #[test]
    fn forward_builds_forward_payload() {
        let cli = parse(&[
            "gcast", "--recipients", "u.txt", "forward", "--chat", "-42", "--message", "7",
        ]);
        assert_eq!(
            cli.command.payload().unwrap(),
            Payload::Forward {
                source: MessageRef::new(-42, 7)
            }
        );
    }

    #[test]
    fn text_joins_words_with_single_spaces() {
        let cli = parse(&[
            "gcast", "--recipients", "u.txt", "--json", "text", "server", "restart", "at", "9",
        ]);
        assert!(cli.json);
        assert_eq!(
            cli.command.payload().unwrap(),
            Payload::Text {
                body: "server restart at 9".to_string()
            }
        );
    }

    #[test]
    fn text_requires_words() {
        assert!(Cli::try_parse_from(["gcast", "--recipients", "u.txt", "text"]).is_err());
    }

    #[test]
    fn blank_text_is_rejected() {
        let cli = parse(&["gcast", "--recipients", "u.txt", "text", "  "]);
        assert!(cli.command.payload().is_err());
    }
}
