//! Build script for hookscope-cli.
//!
//! Embeds build metadata for `hookscope info` using vergen:
//! - Build timestamp
//! - Rustc version
//! - Git commit of the hookscope checkout

use vergen_git2::{Emitter, Git2Builder};

fn main() -> anyhow::Result<()> {
    let build = vergen::BuildBuilder::all_build()?;
    let rustc = vergen::RustcBuilder::all_rustc()?;

    vergen::Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&rustc)?
        .emit()?;

    // Outside a git checkout vergen emits placeholder values instead of failing
    let git2 = Git2Builder::default().sha(true).commit_date(true).build()?;
    Emitter::default().add_instructions(&git2)?.emit()?;

    Ok(())
}
