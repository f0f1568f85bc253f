use anyhow::{Context as _, Result, bail};
use filefactory::Error;

use crate::Context;
use crate::cli::TreeArgs;
use crate::manifest::Manifest;
use crate::ui;

pub fn run(ctx: &Context, args: &TreeArgs) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    let root = super::expand_root(&args.root)?;
    let factory = super::factory(&manifest.verify_defaults()?)?;
    let files = factory.files_to_expect(manifest.constructors()?);

    log::info!(
        "Verifying {} entries from {} under {}",
        files.len(),
        args.manifest.display(),
        root.display()
    );
    match filefactory::verify_files(&root, &files) {
        Ok(()) => {
            if !ctx.quiet {
                ui::success(&format!(
                    "{} under {} match the manifest",
                    ui::count(files.len(), "entry", "entries"),
                    root.display()
                ));
            }
            Ok(())
        }
        Err(Error::Verification(errors)) => {
            for error in errors.iter() {
                ui::mismatch(error.difference, &error.path, &error.cause.to_string());
            }
            bail!(ui::mismatch_summary(
                errors.len(),
                errors.combined_difference()
            ))
        }
        Err(e) => Err(e)
            .with_context(|| format!("Failed to verify fixture under {}", root.display())),
    }
}
