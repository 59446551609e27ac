use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match skyscope::cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Access denials already printed their verdict.
            if skyscope::errors::get_exit_code(&e) != skyscope::EXIT_AUTH_DENIED {
                eprintln!("Error: {:?}", e);
            }
            ExitCode::from(skyscope::errors::get_exit_code(&e))
        }
    }
}
