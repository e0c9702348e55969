//! Inspect or toggle a persisted electrode selection.

use std::path::PathBuf;

use clap::Args;
use spikerate_config::SelectionFile;

#[derive(Args)]
pub struct ElectrodesArgs {
    /// Selection file (TOML); created if a toggle is given and it is missing
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Enable an electrode (repeatable)
    #[arg(long, value_name = "ID")]
    enable: Vec<String>,

    /// Disable an electrode (repeatable)
    #[arg(long, value_name = "ID")]
    disable: Vec<String>,
}

pub fn run(args: ElectrodesArgs) -> anyhow::Result<()> {
    let mut selection = if args.file.exists() {
        SelectionFile::load(&args.file)?
    } else {
        SelectionFile::new()
    };

    let modified = !(args.enable.is_empty() && args.disable.is_empty());
    for id in &args.enable {
        selection.set(id, true);
    }
    for id in &args.disable {
        selection.set(id, false);
    }

    if modified {
        selection.save(&args.file)?;
        println!("Updated {}", args.file.display());
    }

    if selection.is_empty() {
        println!("(no electrodes)");
    } else {
        for entry in selection.iter() {
            let state = if entry.enabled { "enabled" } else { "disabled" };
            println!("{:<24} {state}", entry.id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn toggling_creates_and_updates_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("selection.toml");

        run(ElectrodesArgs {
            file: path.clone(),
            enable: vec!["TT1".into(), "TT2".into()],
            disable: vec![],
        })
        .unwrap();

        run(ElectrodesArgs {
            file: path.clone(),
            enable: vec![],
            disable: vec!["TT2".into()],
        })
        .unwrap();

        let selection = SelectionFile::load(&path).unwrap();
        assert_eq!(selection.get("TT1"), Some(true));
        assert_eq!(selection.get("TT2"), Some(false));
    }

    #[test]
    fn listing_a_missing_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        run(ElectrodesArgs {
            file: dir.path().join("absent.toml"),
            enable: vec![],
            disable: vec![],
        })
        .unwrap();
    }
}
