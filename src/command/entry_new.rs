//! `entry-new` command implementation.
use crate::{
    Result, cli,
    entry::{NewEntry, create_entry},
};

pub fn execute(args: &cli::Args, entry: &cli::EntryNewArgs) -> Result<()> {
    let entry = NewEntry::from(entry.clone());
    let path = create_entry(&args.repo_root, &entry)?;
    println!("{}", path.display());
    Ok(())
}
