use crate::cli::MdpArgs;
use crate::error::Result;
use umbrella::core::mdp::{PullSettings, write_mdp_file};
use tracing::info;

pub fn run(args: MdpArgs) -> Result<()> {
    let pull = PullSettings::new(args.position)
        .with_groups(args.group1, args.group2)
        .with_spring_constant(args.spring_constant);

    info!(
        "Writing {} parameters for reference distance {} nm",
        args.stage, args.position
    );
    let path = write_mdp_file(&args.dir, &args.output, args.stage, &pull)?;
    println!("✓ Wrote {}", path.display());
    Ok(())
}
