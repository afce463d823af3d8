use std::{env, io, path::PathBuf, process};

use textureatlas::{Atlas, AtlasLoader, Backing, JsonMap, LoadOptions, Texture};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const USAGE: &str = "usage: readmap [--json] [--mmap] [--options <FILE>] <map-file> [<texture-name>]";

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

#[derive(Debug, Default)]
struct Args {
    map: PathBuf,
    texture: Option<String>,
    json: bool,
    mmap: bool,
    options: Option<PathBuf>,
}

fn run() -> Result<(), String> {
    let Some(args) = parse_args(env::args().skip(1))? else {
        print_usage();
        return Ok(());
    };
    debug!(?args, "readmap");

    let mut options = match &args.options {
        Some(path) => LoadOptions::from_json_file(path).map_err(|err| err.to_string())?,
        None => LoadOptions::default(),
    };
    if args.mmap {
        options = options.with_backing(Backing::Mapped);
    }

    let atlas = AtlasLoader::new(options)
        .load(&args.map)
        .map_err(|err| format!("failed to load {}: {err}", args.map.display()))?;

    match &args.texture {
        None if args.json => print_json(&JsonMap::new(&atlas)),
        None => {
            print_atlas_info(&atlas);
            for texture in &atlas {
                print_texture_info(texture);
            }
            Ok(())
        }
        Some(name) => {
            let texture = atlas.find(name).map_err(|err| err.to_string())?;
            if args.json {
                return print_json(&JsonMap::single(&atlas, texture));
            }
            print_texture_info(texture);
            print_texture_frame_info(texture);
            Ok(())
        }
    }
}

/// `Ok(None)` means help was requested.
fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Option<Args>, String> {
    let mut positionals = Vec::new();
    let mut parsed = Args::default();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            // Everything after `--` is positional, even if it starts with `-`.
            "--" => {
                positionals.extend(iter.by_ref());
                break;
            }
            "-h" | "--help" => return Ok(None),
            "--json" => parsed.json = true,
            "--mmap" => parsed.mmap = true,
            "--options" => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("--options requires a file path\n{USAGE}"))?;
                parsed.options = Some(PathBuf::from(value));
            }
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option: {flag}\n{USAGE}"));
            }
            _ => positionals.push(arg),
        }
    }

    let mut positionals = positionals.into_iter();
    match (positionals.next(), positionals.next(), positionals.next()) {
        (Some(map), texture, None) => {
            parsed.map = PathBuf::from(map);
            parsed.texture = texture;
            Ok(Some(parsed))
        }
        _ => Err(USAGE.to_string()),
    }
}

fn print_usage() {
    println!("{USAGE}");
    println!("\nPrints the textures of a binary texture atlas map, or the frames of one texture.");
    println!("\nOptions:");
    println!("  --json            Print the result as a JSON atlas map");
    println!("  --mmap            Memory-map the file instead of reading it");
    println!("  --options <FILE>  Read load options from a JSON file");
    println!("  -h, --help        Show this help message");
    println!("  --                Treat the remaining arguments as positionals");
}

fn print_atlas_info(atlas: &Atlas) {
    println!(
        "Atlas is {}x{} with {} texture(s).",
        atlas.width(),
        atlas.height(),
        atlas.len()
    );
}

fn print_texture_info(texture: &Texture) {
    println!(
        "Texture \"{}\" has {} frame(s).",
        texture.name(),
        texture.len()
    );
}

fn print_texture_frame_info(texture: &Texture) {
    for (i, frame) in texture.frames().iter().enumerate() {
        println!(
            "Frame {i} is {}x{} at {}, {}.",
            frame.width, frame.height, frame.x, frame.y
        );
    }
}

fn print_json(map: &JsonMap<'_>) -> Result<(), String> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, map).map_err(|err| err.to_string())?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Option<Args>, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn one_positional_lists_the_atlas() {
        let parsed = args(&["atlas.map"]).unwrap().unwrap();
        assert_eq!(parsed.map, PathBuf::from("atlas.map"));
        assert!(parsed.texture.is_none());
        assert!(!parsed.json);
    }

    #[test]
    fn second_positional_is_the_texture() {
        let parsed = args(&["--json", "atlas.map", "hero", "--mmap"]).unwrap().unwrap();
        assert_eq!(parsed.texture.as_deref(), Some("hero"));
        assert!(parsed.json);
        assert!(parsed.mmap);
    }

    #[test]
    fn options_flag_takes_a_path() {
        let parsed = args(&["--options", "opts.json", "atlas.map"]).unwrap().unwrap();
        assert_eq!(parsed.options, Some(PathBuf::from("opts.json")));
        assert!(args(&["atlas.map", "--options"]).is_err());
    }

    #[test]
    fn wrong_positional_count_is_a_usage_error() {
        assert_eq!(args(&[]).unwrap_err(), USAGE);
        assert_eq!(args(&["a.map", "b", "c"]).unwrap_err(), USAGE);
    }

    #[test]
    fn help_short_circuits() {
        assert!(args(&["--help"]).unwrap().is_none());
        assert!(args(&["atlas.map", "-h"]).unwrap().is_none());
    }

    #[test]
    fn unknown_flags_are_rejected() {
        let err = args(&["--verbose", "atlas.map"]).unwrap_err();
        assert!(err.starts_with("unknown option: --verbose"));

        let err = args(&["-v", "atlas.map"]).unwrap_err();
        assert!(err.starts_with("unknown option: -v\n"));
        assert!(args(&["atlas.map", "-x"]).is_err());
    }

    #[test]
    fn double_dash_ends_options() {
        let parsed = args(&["--json", "--", "atlas.map", "-walk"]).unwrap().unwrap();
        assert_eq!(parsed.map, PathBuf::from("atlas.map"));
        assert_eq!(parsed.texture.as_deref(), Some("-walk"));
        assert!(parsed.json);
    }
}
