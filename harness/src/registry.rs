use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use tracing::info;

use crate::error::{ConfigError, Result};

pub const DEFAULT_REGISTRY_FILE: &str = "deployedContracts.txt";

/// Flat file of deployed contract addresses, one per line. The last line is
/// the current deployment.
#[derive(Clone, Debug)]
pub struct DeploymentRegistry {
    path: PathBuf,
}

impl DeploymentRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Adds `address` on its own line. Files written without a trailing
    /// newline get one first, so the previous address stays intact.
    pub fn append(&self, address: Address) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        if needs_line_break(&mut file)? {
            writeln!(file)?;
        }
        writeln!(file, "{address}")?;
        info!(%address, path = %self.path.display(), "recorded deployment");
        Ok(())
    }

    pub fn current(&self) -> Result<Address> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ConfigError::MissingRegistry(self.path.clone()).into())
            }
            Err(err) => return Err(err.into()),
        };
        let last = content
            .trim()
            .lines()
            .last()
            .map(str::trim)
            .ok_or_else(|| ConfigError::EmptyRegistry(self.path.clone()))?;
        last.parse::<Address>()
            .map_err(|_| ConfigError::InvalidAddress(last.to_string()).into())
    }
}

fn needs_line_break(file: &mut File) -> Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use alloy::primitives::address;

    #[test]
    fn last_appended_address_is_current() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DeploymentRegistry::new(dir.path().join(DEFAULT_REGISTRY_FILE));
        let first = address!("5fbdb2315678afecb367f032d93f642f64180aa3");
        let second = address!("e7f1725e7734ce288f8367e1bb143e90bb3f0512");

        registry.append(first).unwrap();
        assert_eq!(registry.current().unwrap(), first);
        registry.append(second).unwrap();
        assert_eq!(registry.current().unwrap(), second);

        let content = fs::read_to_string(registry.path()).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn append_after_unterminated_last_line() {
        // Deploy scripts write "\n" + address with no trailing newline.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_REGISTRY_FILE);
        fs::write(&path, "\n0x5FbDB2315678afecb367f032d93F642f64180aa3").unwrap();
        let registry = DeploymentRegistry::new(&path);
        let next = address!("e7f1725e7734ce288f8367e1bb143e90bb3f0512");

        registry.append(next).unwrap();
        assert_eq!(registry.current().unwrap(), next);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<String> = content
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_lowercase)
            .collect();
        assert_eq!(
            lines,
            [
                "0x5fbdb2315678afecb367f032d93f642f64180aa3",
                "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512"
            ]
        );
    }

    #[test]
    fn trailing_blank_lines_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_REGISTRY_FILE);
        fs::write(&path, "0x5FbDB2315678afecb367f032d93F642f64180aa3\n\n  \n").unwrap();
        assert_eq!(
            DeploymentRegistry::new(path).current().unwrap(),
            address!("5fbdb2315678afecb367f032d93f642f64180aa3")
        );
    }

    #[test]
    fn missing_and_empty_files_fail_distinctly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_REGISTRY_FILE);
        let registry = DeploymentRegistry::new(&path);
        assert!(matches!(
            registry.current(),
            Err(HarnessError::Config(ConfigError::MissingRegistry(_)))
        ));

        fs::write(&path, "\n").unwrap();
        assert!(matches!(
            registry.current(),
            Err(HarnessError::Config(ConfigError::EmptyRegistry(_)))
        ));
    }

    #[test]
    fn garbage_line_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_REGISTRY_FILE);
        fs::write(&path, "not-an-address\n").unwrap();
        assert!(matches!(
            DeploymentRegistry::new(path).current(),
            Err(HarnessError::Config(ConfigError::InvalidAddress(_)))
        ));
    }
}
