use std::env;

pub const DEFAULT_APP_NAME: &str = "hmiext_app";
pub const DEFAULT_SCRIPT: &str = "-";
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

pub struct Config {
    pub app_name: String,
    /// Path to a signal script, or `-` for stdin.
    pub script: String,
    pub strict: bool,
    pub keep_going: bool,
    pub channel_capacity: usize,
    pub print_graph: bool,
}

impl Config {
    pub fn from_args() -> Self {
        Self::from_args_iter(env::args())
    }

    pub fn from_args_iter<I, S>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut app_name =
            env::var("HMIEXT_APP_NAME").unwrap_or_else(|_| DEFAULT_APP_NAME.to_string());
        let mut script = env::var("HMIEXT_SCRIPT").unwrap_or_else(|_| DEFAULT_SCRIPT.to_string());
        let mut strict = env::var("HMIEXT_STRICT")
            .ok()
            .and_then(parse_bool)
            .unwrap_or(false);
        let mut keep_going = env::var("HMIEXT_KEEP_GOING")
            .ok()
            .and_then(parse_bool)
            .unwrap_or(false);
        let mut channel_capacity = env::var("HMIEXT_CHANNEL_CAPACITY")
            .ok()
            .and_then(parse_capacity)
            .unwrap_or(DEFAULT_CHANNEL_CAPACITY);
        let mut print_graph = false;

        let mut args = iter.into_iter();
        let _ = args.next();
        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            match arg {
                "-h" | "--help" => {
                    print_usage();
                    std::process::exit(0);
                }
                "--app-name" => {
                    if let Some(value) = args.next() {
                        app_name = value.as_ref().to_string();
                    }
                }
                "--script" => {
                    if let Some(value) = args.next() {
                        script = value.as_ref().to_string();
                    }
                }
                "--channel-capacity" => {
                    if let Some(value) = args.next().and_then(|v| parse_capacity(v.as_ref().to_string())) {
                        channel_capacity = value;
                    }
                }
                "--strict" => {
                    strict = true;
                }
                "--keep-going" => {
                    keep_going = true;
                }
                "--graph" => {
                    print_graph = true;
                }
                _ if arg.starts_with("--app-name=") => {
                    app_name = arg["--app-name=".len()..].to_string();
                }
                _ if arg.starts_with("--script=") => {
                    script = arg["--script=".len()..].to_string();
                }
                _ if arg.starts_with("--channel-capacity=") => {
                    if let Some(value) =
                        parse_capacity(arg["--channel-capacity=".len()..].to_string())
                    {
                        channel_capacity = value;
                    }
                }
                _ => {}
            }
        }

        Self {
            app_name,
            script,
            strict,
            keep_going,
            channel_capacity,
            print_graph,
        }
    }
}

fn print_usage() {
    println!(
        "hmiext_signal_replay [--script <path|->] [--app-name <name>] [--strict] [--keep-going] [--channel-capacity <n>] [--graph]"
    );
}

fn parse_bool(value: String) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_capacity(value: String) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|n| *n > 0)
}
