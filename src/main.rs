mod game;
mod logging;

use anyhow::{bail, Result};
use gridsnake::state::Mode;
use rand::{rngs::StdRng, SeedableRng};

const USAGE: &str = "\
usage: gridsnake [--bare]

  --bare    skip the title screen; the game stops for good on the first crash

Arrow keys or WASD to move, Esc to pause, Ctrl+C to quit.
RUST_LOG sets the log level, GRIDSNAKE_LOG the log file.";

fn main() -> Result<()> {
    let mode = match parse_args(std::env::args().skip(1))? {
        Some(mode) => mode,
        None => {
            println!("{}", USAGE);
            return Ok(());
        }
    };

    let log_path = logging::init()?;
    log::info!("starting in {:?} mode, logging to {}", mode, log_path.display());

    let mut game = game::SnakeGame::new(mode, StdRng::from_entropy())?;

    // The terminal has to be restored whatever happened in the loop
    let result = game.initialize().and_then(|_| game.run());
    let restored = game.shutdown();

    if let Err(e) = &result {
        log::error!("game loop failed: {:#}", e);
    }
    result?;
    restored
}

/// `None` means help was asked for.
fn parse_args<I: Iterator<Item = String>>(args: I) -> Result<Option<Mode>> {
    let mut mode = Mode::Classic;

    for arg in args {
        match arg.as_str() {
            "--bare" => mode = Mode::Bare,
            "--classic" => mode = Mode::Classic,
            "-h" | "--help" => return Ok(None),
            other => bail!("unknown argument `{}`\n\n{}", other, USAGE),
        }
    }

    Ok(Some(mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn default_is_classic() {
        assert_eq!(parse_args(args(&[])).unwrap(), Some(Mode::Classic));
    }

    #[test]
    fn bare_flag_and_help() {
        assert_eq!(parse_args(args(&["--bare"])).unwrap(), Some(Mode::Bare));
        assert_eq!(parse_args(args(&["--help"])).unwrap(), None);
    }

    #[test]
    fn unknown_argument_is_an_error() {
        let err = parse_args(args(&["--fast"])).unwrap_err();
        assert!(err.to_string().contains("--fast"));
    }
}
