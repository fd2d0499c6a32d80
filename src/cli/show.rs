use clap::Parser;

/// Arguments for the show command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show bundle information:\n    bms show com.example.app\n\n\
                  Print the raw registry record:\n    bms show com.example.app --json")]
pub struct ShowArgs {
    /// Bundle name
    pub bundle: String,

    /// Print the registry record as JSON
    #[arg(long)]
    pub json: bool,
}
