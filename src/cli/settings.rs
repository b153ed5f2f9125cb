//! CLI subcommands for inspecting and editing the program settings file.
use crate::settings::{Settings, get_settings_file_path};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// The available subcommands for managing program settings.
#[derive(clap::Subcommand)]
pub enum SettingsSubcommands {
    /// Open the settings file in a text editor, creating it first if necessary
    Edit,
    /// Print the path the settings file is read from
    Path,
    /// Print the contents of a placeholder settings file
    DumpDefault,
}

impl SettingsSubcommands {
    /// Execute the supplied settings subcommand
    pub fn execute(self) -> Result<()> {
        let file_path = get_settings_file_path();
        match self {
            Self::Edit => {
                if !file_path.is_file() {
                    write_default_settings_file(&file_path)?;
                }

                println!("Opening settings file for editing: {}", file_path.display());
                edit::edit_file(&file_path)?;
            }
            Self::Path => println!("{}", file_path.display()),
            Self::DumpDefault => print!("{}", Settings::default_file_contents()),
        }

        Ok(())
    }
}

/// Write a placeholder settings file, creating the config directory if needed.
///
/// The placeholder has every setting commented out, so it parses as an empty file and all
/// defaults still apply.
fn write_default_settings_file(file_path: &Path) -> Result<()> {
    if let Some(dir_path) = file_path.parent() {
        fs::create_dir_all(dir_path)
            .with_context(|| format!("Failed to create directory: {}", dir_path.display()))?;
    }
    fs::write(file_path, Settings::default_file_contents())
        .with_context(|| format!("Failed to write {}", file_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_default_settings_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config").join("settings.toml");
        write_default_settings_file(&file_path).unwrap();

        // Every line of the placeholder is commented out, so nothing overrides the defaults
        let contents = fs::read_to_string(&file_path).unwrap();
        assert!(!contents.is_empty());
        assert!(
            contents
                .lines()
                .all(|line| line.is_empty() || line.starts_with('#'))
        );
    }
}
