use clap::Parser;

use bms::domain::{DEFAULT_USER_ID, UninstallParam};

/// Arguments for the uninstall command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Uninstall a bundle:\n    bms uninstall com.example.app\n\n\
                  Uninstall without confirmation:\n    bms uninstall com.example.app -y\n\n\
                  Uninstall one module:\n    bms uninstall com.example.app --module skin\n\n\
                  Uninstall for another user:\n    bms uninstall com.example.app --user 101")]
pub struct UninstallArgs {
    /// Bundle name to uninstall
    pub bundle: String,

    /// Remove only this module
    #[arg(long, short = 'm')]
    pub module: Option<String>,

    /// User to uninstall for
    #[arg(long, short = 'u', default_value_t = DEFAULT_USER_ID)]
    pub user: i32,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl From<&UninstallArgs> for UninstallParam {
    fn from(args: &UninstallArgs) -> Self {
        UninstallParam {
            user_id: args.user,
            module_name: args.module.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_uninstall() {
        let cli = super::super::Cli::try_parse_from(["bms", "uninstall", "com.x"]).unwrap();
        match cli.command {
            super::super::Commands::Uninstall(args) => {
                assert_eq!(args.bundle, "com.x");
                assert!(!args.yes);
                assert_eq!(UninstallParam::from(&args), UninstallParam::default());
            }
            _ => panic!("Expected Uninstall command"),
        }
    }

    #[test]
    fn test_cli_parsing_uninstall_module() {
        let cli = super::super::Cli::try_parse_from([
            "bms",
            "uninstall",
            "com.x",
            "--module",
            "skin",
            "-y",
        ])
        .unwrap();
        match cli.command {
            super::super::Commands::Uninstall(args) => {
                assert!(args.yes);
                assert_eq!(
                    UninstallParam::from(&args).module_name,
                    Some("skin".to_string())
                );
            }
            _ => panic!("Expected Uninstall command"),
        }
    }

    #[test]
    fn test_cli_parsing_uninstall_no_name() {
        assert!(super::super::Cli::try_parse_from(["bms", "uninstall"]).is_err());
    }
}
