use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compiles authored scenes into geometry containers", long_about = None)]
pub struct Args {
    /// Source scene (.gltf, .glb or .json)
    pub source: PathBuf,

    /// Directory receiving compiled containers and derived material files
    #[arg(short, long, default_value = "compiled")]
    pub output_dir: PathBuf,

    /// Game data root; texture paths in material files are made relative to it
    #[arg(short, long)]
    pub game_folder: Option<PathBuf>,

    /// Mesh group manifest (defaults to <SOURCE>.assetinfo)
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,
}
