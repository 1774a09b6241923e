use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::core::config::{default_config_yaml, CONFIG_FILE};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to create the config in (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing .diagramdoctor.yml
    #[arg(long)]
    pub force: bool,
}

pub async fn execute(args: &InitArgs) -> Result<()> {
    let path = args.path.canonicalize()?;
    let config_path = path.join(CONFIG_FILE);

    if config_path.exists() && !args.force {
        println!(
            "  {} {} already exists. Use {} to overwrite.",
            "SKIP".yellow(),
            CONFIG_FILE,
            "--force".bold()
        );
        return Ok(());
    }

    std::fs::write(&config_path, default_config_yaml())?;
    println!("  {} {} created", "DONE".green(), CONFIG_FILE);
    println!(
        "  Edit {} to choose the model command and ignored rules.",
        config_path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_config_file() {
        let tmp = TempDir::new().unwrap();
        let args = InitArgs {
            path: tmp.path().to_path_buf(),
            force: false,
        };
        execute(&args).await.unwrap();
        assert!(tmp.path().join(CONFIG_FILE).exists());
        let config = Config::load(tmp.path());
        assert_eq!(config.model.command, "claude");
    }

    #[tokio::test]
    async fn test_init_skips_existing_without_force() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "existing").unwrap();
        let args = InitArgs {
            path: tmp.path().to_path_buf(),
            force: false,
        };
        execute(&args).await.unwrap();
        let content = fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(content, "existing");
    }

    #[tokio::test]
    async fn test_init_overwrites_with_force() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "old").unwrap();
        let args = InitArgs {
            path: tmp.path().to_path_buf(),
            force: true,
        };
        execute(&args).await.unwrap();
        let content = fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        assert!(content.contains("timeout_secs"));
    }
}
