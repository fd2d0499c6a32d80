use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    bms completions bash > ~/.bash_completion.d/bms\n\n\
                  Generate zsh completions:\n    bms completions zsh > ~/.zfunc/_bms\n\n\
                  Generate fish completions:\n    bms completions fish > ~/.config/fish/completions/bms.fish")]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum, ignore_case = true)]
    pub shell: Shell,
}
