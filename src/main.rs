use anyhow::{bail, Context};
use gcodeprint::{init_logging, Config, PlaybackSession, BUILD_DATE, CONFIG_ENV, VERSION};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const USAGE: &str = "usage: gcodeprint <input.gcode> [output.svg] [--rotate <degrees>]";

#[derive(Debug)]
struct Args {
    input: PathBuf,
    output: PathBuf,
    rotate: Option<f64>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut rotate = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => bail!(USAGE),
            "--rotate" => {
                let value = args.next().context("--rotate needs a value")?;
                rotate = Some(
                    value
                        .parse::<f64>()
                        .with_context(|| format!("invalid rotation '{}'", value))?,
                );
            }
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let mut positional = positional.into_iter();
    let Some(input) = positional.next() else {
        bail!(USAGE);
    };
    let output = positional
        .next()
        .unwrap_or_else(|| input.with_extension("svg"));
    if positional.next().is_some() {
        bail!(USAGE);
    }

    Ok(Args {
        input,
        output,
        rotate,
    })
}

fn load_config() -> anyhow::Result<Config> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        let path = PathBuf::from(path);
        return Config::load(&path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }
    match Config::default_path() {
        Ok(path) => Ok(Config::load_or_default(&path)?),
        Err(e) => {
            debug!("Using default config: {}", e);
            Ok(Config::default())
        }
    }
}

fn write_svg(path: &Path, svg: &str) -> anyhow::Result<()> {
    std::fs::write(path, svg).with_context(|| format!("Failed to write {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    info!("gcodeprint {} ({})", VERSION, BUILD_DATE);

    let args = parse_args(std::env::args().skip(1))?;
    let config = load_config()?;
    let session = PlaybackSession::new(config);

    session.play_file(&args.input).await?;
    if let Some(degrees) = args.rotate {
        session.rotate_by(degrees);
    }

    write_svg(&args.output, &session.svg())?;
    info!("Wrote {}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> anyhow::Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_output_defaults_next_to_input() {
        let parsed = args(&["part.gcode"]).expect("args");
        assert_eq!(parsed.output, PathBuf::from("part.svg"));
        assert_eq!(parsed.rotate, None);
    }

    #[test]
    fn test_explicit_output_and_rotation() {
        let parsed = args(&["part.gcode", "--rotate", "90", "out.svg"]).expect("args");
        assert_eq!(parsed.input, PathBuf::from("part.gcode"));
        assert_eq!(parsed.output, PathBuf::from("out.svg"));
        assert_eq!(parsed.rotate, Some(90.0));
    }

    #[test]
    fn test_bad_arguments() {
        assert!(args(&[]).is_err());
        assert!(args(&["a.gcode", "b.svg", "c.svg"]).is_err());
        assert!(args(&["a.gcode", "--rotate"]).is_err());
        assert!(args(&["a.gcode", "--rotate", "left"]).is_err());
    }

    #[test]
    fn test_write_svg() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.svg");
        write_svg(&path, "<svg/>").expect("write");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "<svg/>");
    }
}
