use super::VERSION;
use clap::{value_parser, Arg, ArgMatches, Command};
use std::path::PathBuf;

/// The only argument is the stats file.
/// It is optional for clap so that a missing path is reported by the app itself.
pub fn command() -> Command {
    let arg_statsin = Arg::new("input_statsfile")
        .help("file with the appended output of `docker stats --no-stream`")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .required(false);
    Command::new("Docker_usage_plot")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to clean and plot the resource usage of docker containers")
        .arg(arg_statsin)
}

/// Takes the CLI arguments, returns the stats file path if given.
pub fn parse_cli() -> Option<PathBuf> {
    statsin(&command().get_matches())
}

fn statsin(cli_args: &ArgMatches) -> Option<PathBuf> {
    cli_args.get_one::<PathBuf>("input_statsfile").map(|p| p.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_argument() {
        let m = command()
            .try_get_matches_from(["usage_plot", "stats.txt"])
            .unwrap();
        assert_eq!(statsin(&m), Some(PathBuf::from("stats.txt")));
    }

    #[test]
    fn missing_path_is_not_a_clap_error() {
        let m = command().try_get_matches_from(["usage_plot"]).unwrap();
        assert_eq!(statsin(&m), None);
    }

    #[test]
    fn no_other_arguments() {
        assert!(command()
            .try_get_matches_from(["usage_plot", "a.txt", "b.txt"])
            .is_err());
        assert!(command()
            .try_get_matches_from(["usage_plot", "--verbose", "a.txt"])
            .is_err());
    }
}
