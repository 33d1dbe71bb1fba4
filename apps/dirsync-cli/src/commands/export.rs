//! Export the directory folder's current contacts to a CSV file

use clap::Args;
use std::path::PathBuf;

use dirsync_engine::{load_actual, save_csv};

use crate::config::ConnectionArgs;
use crate::error::CliResult;

/// Dump the remote contact folder to a CSV file
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Output CSV file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

/// Execute the export command
pub async fn execute(args: ExportArgs) -> CliResult<()> {
    let client = args.connection.client()?;
    let actual = load_actual(&client).await?;

    for warning in &actual.warnings {
        let email = warning.email.as_deref().unwrap_or("-");
        eprintln!("warning [{}] {} {}", warning.context, email, warning.message);
    }

    save_csv(&args.output, actual.records.values())?;
    println!(
        "Exported {} contacts to {}",
        actual.records.len(),
        args.output.display()
    );

    Ok(())
}
