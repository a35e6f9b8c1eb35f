use clap::{Arg, ArgAction, ArgMatches, ColorChoice, Command};
use std::path::{Path, PathBuf};
use tournav::prelude::{Config, GpxOptions};

pub struct Cli {
    /// arguments passed by user
    pub matches: ArgMatches,
}

impl Cli {
    pub fn new() -> Self {
        Self {
            matches: {
                Command::new("csv2gpx")
                    .author("tournav developers")
                    .version(env!("CARGO_PKG_VERSION"))
                    .about("Track log to GPX conversion tool")
                    .arg_required_else_help(true)
                    .color(ColorChoice::Always)
                    .next_help_heading("Input/Output")
                    .arg(
                        Arg::new("filepath")
                            .short('f')
                            .long("fp")
                            .value_parser(clap::value_parser!(PathBuf))
                            .help("Input track log (CSV)")
                            .required(true),
                    )
                    .arg(
                        Arg::new("output")
                            .short('o')
                            .long("output")
                            .action(ArgAction::Set)
                            .value_parser(clap::value_parser!(PathBuf))
                            .help("Custom output filename. Otherwise, the input path with a .gpx extension is used."))
                    .arg(
                        Arg::new("gzip")
                            .short('z')
                            .long("gzip")
                            .action(ArgAction::SetTrue)
                            .help("Gzip compress the produced GPX."),
                    )
                    .arg(
                        Arg::new("config")
                            .short('c')
                            .long("config")
                            .value_parser(clap::value_parser!(PathBuf))
                            .help("Engine configuration (JSON). Its \"gpx\" section
serves as default GPX options, refined by the following flags."),
                    )
                    .next_help_heading("GPX")
                    .arg(
                        Arg::new("accuracy")
                            .short('a')
                            .long("accuracy")
                            .action(ArgAction::SetTrue)
                            .help("Emit accuracy extensions."),
                    )
                    .arg(
                        Arg::new("no-speed")
                            .long("no-speed")
                            .action(ArgAction::SetTrue)
                            .help("Do not emit speed and course extensions."),
                    )
                    .arg(
                        Arg::new("indent")
                            .long("indent")
                            .value_parser(clap::value_parser!(usize))
                            .help("Indentation width, in spaces."),
                    )
                    .arg(
                        Arg::new("crlf")
                            .long("crlf")
                            .action(ArgAction::SetTrue)
                            .help("Use CRLF line separators."),
                    )
                    .arg(
                        Arg::new("creator")
                            .long("creator")
                            .help("Custom \"creator\" attribute."),
                    )
                    .arg(
                        Arg::new("name")
                            .short('n')
                            .long("name")
                            .help("Track name."),
                    )
                    .get_matches()
            },
        }
    }
    pub fn input_path(&self) -> &Path {
        self.matches
            .get_one::<PathBuf>("filepath")
            .map(|p| p.as_path())
            .unwrap_or_else(|| Path::new(""))
    }
    pub fn output_path(&self) -> Option<&Path> {
        self.matches
            .get_one::<PathBuf>("output")
            .map(|p| p.as_path())
    }
    pub fn gzip(&self) -> bool {
        self.matches.get_flag("gzip")
    }
    pub fn config_path(&self) -> Option<&Path> {
        self.matches
            .get_one::<PathBuf>("config")
            .map(|p| p.as_path())
    }
    /// Refines `options` with the command line flags
    pub fn gpx_options(&self, mut options: GpxOptions) -> GpxOptions {
        if self.matches.get_flag("accuracy") {
            options.accuracy = true;
        }
        if self.matches.get_flag("no-speed") {
            options.speed_course = false;
        }
        if let Some(indent) = self.matches.get_one::<usize>("indent") {
            options.indent = *indent;
        }
        if self.matches.get_flag("crlf") {
            options.line_separator = "\r\n".to_string();
        }
        if let Some(creator) = self.matches.get_one::<String>("creator") {
            options.creator = creator.clone();
        }
        if let Some(name) = self.matches.get_one::<String>("name") {
            options.track_name = Some(name.clone());
        }
        options
    }
    /// Loads the engine [Config], when one was provided
    pub fn config(&self) -> Result<Config, tournav::Error> {
        match self.config_path() {
            Some(path) => Config::from_file(path),
            None => Ok(Config::default()),
        }
    }
}
