//! Read-eval-print loop
//!
//! Reads one line at a time, splits it into a command word and an optional
//! argument, and hands it to the `App`. Command failures are printed and the
//! loop carries on; only a failure to write output ends it early.

use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::app::App;
use crate::commands::{Command, CommandError};

/// Prompt printed before each line is read
pub const PROMPT: &str = "Pokedex > ";

/// Lowercases `text` and splits it into words
pub fn clean_input(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Runs the prompt loop until `exit` or end of input
pub async fn run<R, W>(app: &mut App, input: R, out: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            debug!("End of input");
            break;
        };

        let words = clean_input(&line);
        let Some(name) = words.first() else {
            continue;
        };

        let Some(command) = Command::from_str(name) else {
            writeln!(out, "Unknown command")?;
            continue;
        };

        let arg = words.get(1).map(String::as_str);
        match app.execute(command, arg, out).await {
            Ok(()) => {}
            Err(CommandError::Io(e)) => return Err(e),
            Err(e) => {
                warn!(command = command.name(), error = %e, "Command failed");
                writeln!(out, "{}", e)?;
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Runs the prompt loop, then shuts the session down even if the loop failed
pub async fn run_session<R, W>(mut app: App, input: R, out: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let result = run(&mut app, input, out).await;
    app.shutdown().await;
    result
}
