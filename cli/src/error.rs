use std::process::ExitCode;

pub type CliResult<T> = anyhow::Result<T>;

/// Report a failed command on stderr and map it to an exit code
pub fn to_exit_code(result: CliResult<()>) -> ExitCode {
    let Err(e) = result else {
        return ExitCode::SUCCESS;
    };

    tracing::debug!(error = ?e, "command failed");
    eprintln!("error: {e}");
    for cause in e.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
    ExitCode::FAILURE
}
