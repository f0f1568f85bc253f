use anyhow::{Context as _, Result};

use crate::Context;
use crate::cli::TreeArgs;
use crate::manifest::Manifest;
use crate::ui;

pub fn run(ctx: &Context, args: &TreeArgs) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    let root = super::expand_root(&args.root)?;
    let factory = super::factory(&manifest.create_defaults()?)?;
    let files = factory.files_to_create(manifest.constructors()?);

    log::info!(
        "Creating {} entries from {} under {}",
        files.len(),
        args.manifest.display(),
        root.display()
    );
    filefactory::create_files(&root, &files)
        .with_context(|| format!("Failed to create fixture under {}", root.display()))?;

    if !ctx.quiet {
        if ctx.verbose > 0 {
            for file in &files {
                ui::dim(&file.to_string());
            }
        }
        ui::success(&format!(
            "Created {} under {}",
            ui::count(files.len(), "entry", "entries"),
            root.display()
        ));
    }
    Ok(())
}
