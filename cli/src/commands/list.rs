use cvengine::LibraryEngine;

use crate::cli::EngineArgs;
use crate::config::{FileConfig, merge_engine_config};
use crate::error::CliResult;

pub fn execute(args: EngineArgs, file_config: &FileConfig) -> CliResult<()> {
    let config = merge_engine_config(file_config, &args)?;
    let engine = LibraryEngine::new(&config)?;

    let store = engine.store();
    for version in store.installed_versions()? {
        let libraries = store.library_list(&version.as_str().into())?;
        println!("{version}\t{}", libraries.join(";"));
    }
    Ok(())
}
