mod args;

use catalyst_assets::AssetServer;
use catalyst_rc::{ConvertContext, GroupExporter, RcError, SceneManifest};
use clap::Parser;

use crate::args::Args;

fn main() -> Result<(), RcError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let scene = AssetServer::new().load_scene(&args.source)?;
    let manifest_path = args
        .manifest
        .clone()
        .unwrap_or_else(|| SceneManifest::default_path(&args.source));
    let manifest = SceneManifest::load_or_default(&manifest_path, &scene)?;

    let mut context = ConvertContext::new(&args.source, &args.output_dir);
    if let Some(game_folder) = &args.game_folder {
        context = context.with_game_folder(game_folder);
    }
    let mut exporter = GroupExporter::new(context);

    // Later groups are still compiled after a failure
    let mut last_error = None;
    let mut exported = 0;
    for group in &manifest.groups {
        match exporter.export_group(&scene, group) {
            Ok(_) => exported += 1,
            Err(err) => {
                log::error!("{err}");
                last_error = Some(err);
            }
        }
    }

    log::info!(
        "Compiled {exported} of {} groups from {}",
        manifest.groups.len(),
        args.source.display()
    );

    match last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
