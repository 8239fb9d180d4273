//! Command line options that are used across applications.

use std::path::PathBuf;

use clap::{App, Arg, ArgMatches};

use crate::{config::Config, errors::RadarLoopErr, station::Station};

/// Struct to package up command line arguments.
#[derive(Clone, Debug)]
pub struct CmdLineArgs {
    // Radar site, e.g. MUX
    station: Option<Station>,
    // Where to write the animation
    out: Option<PathBuf>,
    // Configuration file to load instead of the per user one
    config: Option<PathBuf>,
}

impl<'a, 'b> CmdLineArgs {
    /// Create a new set of args.
    pub fn new_app(app_name: &'static str, about: &'static str) -> App<'a, 'b> {
        App::new(app_name)
            .about(about)
            .version(clap::crate_version!())
            .arg(
                Arg::with_name("station")
                    .short("s")
                    .long("station")
                    .takes_value(true)
                    .help("Radar station identifier (e.g. mux, atx).")
                    .long_help(concat!(
                        "Radar station identifier (e.g. mux, atx). Case insensitive. ",
                        "Defaults to MUX, Mt. Umunhum near San Jose, CA."
                    )),
            )
            .arg(
                Arg::with_name("out")
                    .short("o")
                    .long("out")
                    .takes_value(true)
                    .help("Path to write the animated GIF to.")
                    .long_help("Path to write the animated GIF to. Defaults to 'radar_anim.gif'"),
            )
            .arg(
                Arg::with_name("config")
                    .short("c")
                    .long("config")
                    .takes_value(true)
                    .help("Path to a TOML configuration file.")
                    .long_help(concat!(
                        "Path to a TOML configuration file. Defaults to ",
                        "'${CONFIG_DIR}/ridge-loop/config.toml' if it exists. ",
                        "This is the only option beyond --station and --out. Every other ",
                        "setting lives in the file."
                    )),
            )
            .after_help(concat!(
                "Command line options override values in the configuration file. Only ",
                "--station and --out mirror the classic tool, --config is an addition.\n\n",
                "Set RUST_LOG=debug to see every URL requested."
            ))
    }

    /// Process an `App` to get the parsed values out of it and the matches object so an application
    /// can continue with further argument parsing.
    pub fn matches(app: App<'a, 'b>) -> Result<(Self, ArgMatches<'a>), RadarLoopErr> {
        let matches = app.get_matches();
        let args = Self::from_matches(&matches)?;

        Ok((args, matches))
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self, RadarLoopErr> {
        let station = matches.value_of("station").map(Station::new).transpose()?;
        let out = matches.value_of("out").map(PathBuf::from);
        let config = matches.value_of("config").map(PathBuf::from);

        Ok(CmdLineArgs {
            station,
            out,
            config,
        })
    }

    /// Load the configuration and apply the command line overrides to it.
    pub fn config(&self) -> Result<Config, RadarLoopErr> {
        let mut config = Config::discover(self.config.as_deref())?;

        if let Some(ref station) = self.station {
            config.station = station.clone();
        }
        if let Some(ref out) = self.out {
            config.output = out.clone();
        }

        Ok(config)
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
