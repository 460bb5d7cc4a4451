//! Storefront CLI

use std::process::ExitCode;

use clap::Parser;

mod cli;

#[tokio::main]
pub async fn main() -> ExitCode {
    let _env = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            #[expect(
                clippy::print_stderr,
                reason = "the subscriber may not be installed when configuration fails"
            )]
            {
                eprintln!("{error}");
            }

            ExitCode::FAILURE
        }
    }
}
