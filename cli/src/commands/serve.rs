use std::sync::Arc;

use executor_core::tokio::TokioGlobal;

use cvengine::LibraryEngine;
use cvengine::ipc::{EngineStub, IpcServer};

use crate::cli::ServeArgs;
use crate::config::{FileConfig, merge_engine_config, merge_socket};
use crate::error::CliResult;

pub async fn execute(args: ServeArgs, file_config: &FileConfig) -> CliResult<()> {
    let config = merge_engine_config(file_config, &args.engine)?;
    let socket = merge_socket(file_config, args.socket);

    let engine = LibraryEngine::new(&config)?;
    tracing::info!(
        root = %engine.store().root().display(),
        engine_version = config.engine_version(),
        "serving library engine"
    );

    let stub = EngineStub::new(Arc::new(engine));
    let server = IpcServer::new(stub, &socket, TokioGlobal).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    server.stop();
    Ok(())
}
