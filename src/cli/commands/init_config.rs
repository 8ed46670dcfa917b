//! Init-config CLI command

use std::path::PathBuf;

use crate::cli::error::CliError;
use crate::database::config::{CONFIG_FILENAME, UploadConfig, sample_config};

/// Init-config command arguments
#[derive(Debug, Clone)]
pub struct InitConfigArgs {
    /// Directory to write `.table-upload.toml` into
    pub dir: PathBuf,
    /// Overwrite an existing file
    pub force: bool,
}

/// Write a commented sample configuration
pub fn handle_init_config(args: &InitConfigArgs) -> Result<(), CliError> {
    if !args.dir.is_dir() {
        return Err(CliError::FileNotFound(args.dir.clone()));
    }
    if UploadConfig::exists(&args.dir) && !args.force {
        return Err(CliError::InvalidArgument(format!(
            "{} already exists in {}. Use --force to overwrite.",
            CONFIG_FILENAME,
            args.dir.display()
        )));
    }

    let path = args.dir.join(CONFIG_FILENAME);
    std::fs::write(&path, sample_config())
        .map_err(|e| CliError::IoError(format!("Failed to write {}: {}", path.display(), e)))?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_writes_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitConfigArgs {
            dir: dir.path().to_path_buf(),
            force: false,
        };
        handle_init_config(&args).unwrap();
        assert!(UploadConfig::exists(dir.path()));

        let content = std::fs::read_to_string(dir.path().join(CONFIG_FILENAME)).unwrap();
        let config = UploadConfig::parse(&content).unwrap();
        assert_eq!(config.ingest.batch_size, 100);

        assert!(matches!(
            handle_init_config(&args),
            Err(CliError::InvalidArgument(_))
        ));
        handle_init_config(&InitConfigArgs { force: true, ..args }).unwrap();
    }
}
