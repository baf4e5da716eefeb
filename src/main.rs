use std::process::ExitCode;

use shoal::scene::MAX_CANVAS_DIMENSION;
use shoal::RunConfig;

const USAGE: &str = "usage: shoal [--debug] [--seed <u64>] [--size <width>x<height>]";

fn parse_args<I>(args: I) -> Result<RunConfig, String>
where
    I: IntoIterator<Item = String>,
{
    let mut config = RunConfig::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--debug" => config = config.with_debug_panel(true),
            "--seed" => {
                let value = args.next().ok_or("--seed needs a value")?;
                let seed = value
                    .parse::<u64>()
                    .map_err(|_| format!("invalid seed '{}'", value))?;
                config = config.with_seed(Some(seed));
            }
            "--size" => {
                let value = args.next().ok_or("--size needs a value")?;
                let (width, height) = parse_size(&value)?;
                config = config.with_size(width, height);
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("unknown argument '{}'\n{}", other, USAGE)),
        }
    }
    Ok(config)
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let invalid = || format!("invalid size '{}', expected e.g. 960x640", value);
    let (w, h) = value.split_once(['x', 'X']).ok_or_else(invalid)?;
    let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    if width > MAX_CANVAS_DIMENSION || height > MAX_CANVAS_DIMENSION {
        return Err(format!(
            "size '{}' is too large, at most {} pixels per side",
            value, MAX_CANVAS_DIMENSION
        ));
    }
    Ok((width, height))
}

fn main() -> ExitCode {
    use env_logger::Env;
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match parse_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    match shoal::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = parse_args(args(&[])).unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_all_flags() {
        let config = parse_args(args(&["--debug", "--seed", "42", "--size", "800x600"])).unwrap();
        assert!(config.debug_panel);
        assert_eq!(config.seed, Some(42));
        assert_eq!((config.width, config.height), (800, 600));
    }

    #[test]
    fn test_bad_values() {
        assert!(parse_args(args(&["--seed"])).is_err());
        assert!(parse_args(args(&["--seed", "-1"])).is_err());
        assert!(parse_args(args(&["--size", "800"])).is_err());
        assert!(parse_args(args(&["--size", "0x600"])).is_err());
        assert!(parse_args(args(&["--fast"])).is_err());
    }

    #[test]
    fn test_oversized_canvas_rejected() {
        assert!(parse_size("9000x9000").is_err());
        assert!(parse_size("100000x100000").is_err());
        assert!(parse_size("640x8193").is_err());
        assert_eq!(parse_size("8192x8192"), Ok((8192, 8192)));
    }
}
