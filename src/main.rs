use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use abc_hover::{Point, PreviewConfig, Size, Viewport};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: abc-hover [--no-clean] [--config <config.yaml>] [--place X,Y] <article.wiki|->";

/// Nominal tooltip and screen used to demonstrate placement.
const DEMO_TOOLTIP: Size = Size {
    width: 300.0,
    height: 120.0,
};
const DEMO_SCREEN: (f64, f64) = (1280.0, 800.0);

struct Options {
    no_clean: bool,
    config_path: Option<String>,
    place: Option<Point>,
    input_path: String,
}

fn usage_error(message: &str) -> ! {
    if !message.is_empty() {
        eprintln!("{}", message);
    }
    eprintln!("{}", USAGE);
    process::exit(1);
}

fn parse_point(value: &str) -> Option<Point> {
    let (x, y) = value.split_once(',')?;
    Some(Point::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

fn parse_args(args: &[String]) -> Options {
    let mut no_clean = false;
    let mut config_path = None;
    let mut place = None;
    let mut input_path = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--no-clean" => no_clean = true,
            "--config" => match iter.next() {
                Some(path) => config_path = Some(path.clone()),
                None => usage_error("--config needs a file"),
            },
            "--place" => match iter.next().and_then(|value| parse_point(value)) {
                Some(point) => place = Some(point),
                None => usage_error("--place needs X,Y"),
            },
            "-h" | "--help" => usage_error(""),
            _ if input_path.is_none() => input_path = Some(arg.clone()),
            _ => usage_error(&format!("Unexpected argument '{}'", arg)),
        }
    }

    match input_path {
        Some(input_path) => Options {
            no_clean,
            config_path,
            place,
            input_path,
        },
        None => usage_error(""),
    }
}

fn read_input(path: &str) -> io::Result<String> {
    if path == "-" {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        fs::read_to_string(path)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);

    let config = match &options.config_path {
        Some(path) => {
            let source = match fs::read_to_string(path) {
                Ok(source) => source,
                Err(e) => {
                    eprintln!("Error reading config '{}': {}", path, e);
                    process::exit(1);
                }
            };
            match PreviewConfig::from_yaml(&source) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("{}", e);
                    process::exit(1);
                }
            }
        }
        None => PreviewConfig::default(),
    };

    let content = match read_input(&options.input_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading '{}': {}", options.input_path, e);
            process::exit(1);
        }
    };

    let block = match abc_hover::find_block(&content) {
        Ok(block) => block,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if options.no_clean {
        println!("{}", block);
    } else {
        println!("{}", block.clean());
    }

    if let Some(anchor) = options.place {
        let viewport = Viewport::new(DEMO_SCREEN.0, DEMO_SCREEN.1);
        let placement = config.placer().place(DEMO_TOOLTIP, anchor, viewport);
        match serde_json::to_string(&placement) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error encoding placement: {}", e),
        }
    }
}
