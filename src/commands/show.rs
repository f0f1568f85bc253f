use anyhow::Result;

use crate::Context;
use crate::cli::ShowArgs;
use crate::manifest::Manifest;
use crate::ui;

pub fn run(ctx: &Context, args: &ShowArgs) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    let (extra, label) = if args.expected {
        (manifest.verify_defaults()?, "expected")
    } else {
        (manifest.create_defaults()?, "created")
    };
    let factory = super::factory(&extra)?;
    let files = factory.files_to_create(manifest.constructors()?);

    if !ctx.quiet {
        ui::header(&format!("{} ({label})", args.manifest.display()));
        ui::kv("Entries", &files.len().to_string());
        let defaults: Vec<String> = extra.iter().map(ToString::to_string).collect();
        if !defaults.is_empty() {
            ui::kv("Defaults", &defaults.join(", "));
        }
        println!();
    }
    for file in &files {
        println!("{file}");
    }
    if files.is_empty() {
        ui::info("Manifest declares no entries");
    }
    Ok(())
}
