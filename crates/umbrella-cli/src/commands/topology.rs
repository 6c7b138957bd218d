use crate::cli::TopologyArgs;
use crate::error::Result;
use umbrella::core::fs::backup::backup;
use umbrella::core::topology::TopologyFile;
use tracing::info;

pub fn run(args: TopologyArgs) -> Result<()> {
    let include_root = match args.include_root {
        Some(root) => root,
        None => std::env::current_dir()?.display().to_string(),
    };

    if args.backup {
        if let Some(moved) = backup(&args.output)? {
            println!("Backed up {} to {}", args.output.display(), moved.display());
        }
    }

    info!("Writing topology with include root {:?}", include_root);
    let path = TopologyFile::new(include_root).write_to_path(&args.output)?;
    println!("✓ Wrote {}", path.display());
    Ok(())
}
