//! `shop completions <shell>` – print a completion script.

use clap::Command;
use clap_complete::Shell;

pub fn run_completions(shell: Shell, cmd: &mut Command) {
    clap_complete::generate(shell, cmd, "shop", &mut std::io::stdout());
}
