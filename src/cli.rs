use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::CheckError;

#[derive(Parser, Debug)]
#[command(name = "limit-transcodes", version)]
#[command(about = "Launch the kill script when too many sessions transcode at a resolution")]
#[command(after_help = "Any other argument is passed unchanged to the kill script, \
e.g. `-r 4k -l2 --jbop stream --username admin --sessionId {session_id}`.")]
pub struct Cli {
    /// Resolution to monitor [480, 720, 1080, 4k]; repeat and pair with -l
    #[arg(short = 'r', long = "resolution", value_name = "RES")]
    pub resolutions: Vec<String>,

    /// Transcode count (triggering session included) that fires the kill script
    #[arg(short = 'l', long = "limitation", value_name = "N", allow_hyphen_values = true)]
    pub limitations: Vec<String>,

    /// Count N transcodes at a lower monitored resolution as one more at the next one up (0 disables)
    #[arg(short = 'c', long = "combine", value_name = "N", default_value_t = 0)]
    pub combine: u32,

    /// Log every comparison
    #[arg(short, long)]
    pub verbose: bool,

    /// TOML file overriding the kill command and API path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Pair resolutions and limitations by occurrence.
    pub fn limit_pairs(&self) -> Result<Vec<(String, String)>, CheckError> {
        if self.resolutions.len() != self.limitations.len() {
            return Err(CheckError::ArgumentMismatch {
                resolutions: self.resolutions.len(),
                limitations: self.limitations.len(),
            });
        }
        Ok(self
            .resolutions
            .iter()
            .cloned()
            .zip(self.limitations.iter().cloned())
            .collect())
    }
}

pub struct Invocation {
    pub cli: Cli,
    /// Arguments this tool does not own, in the order given, byte for byte.
    pub forwarded: Vec<OsString>,
}

const VALUE_FLAGS: &[(&str, &str)] = &[
    ("-r", "--resolution"),
    ("-l", "--limitation"),
    ("-c", "--combine"),
];
const VALUE_LONG_ONLY: &[&str] = &["--config"];
const SWITCHES: &[&str] = &["-v", "--verbose", "-h", "--help", "-V", "--version"];

fn takes_value(arg: &str) -> bool {
    VALUE_FLAGS.iter().any(|(short, long)| arg == *short || arg == *long) || VALUE_LONG_ONLY.contains(&arg)
}

fn is_attached_value(arg: &str) -> bool {
    let short_attached = VALUE_FLAGS
        .iter()
        .any(|(short, _)| arg.len() > short.len() && arg.starts_with(short));
    let long_attached = VALUE_FLAGS
        .iter()
        .map(|(_, long)| *long)
        .chain(VALUE_LONG_ONLY.iter().copied())
        .any(|long| arg.strip_prefix(long).is_some_and(|rest| rest.starts_with('=')));
    short_attached || long_attached
}

/// Separate our own flags from everything meant for the kill script.
///
/// Flags are matched exactly (no abbreviations), so kill script options such
/// as `--limit` pass through. Everything after a bare `--` is forwarded.
pub fn split_known_args(args: Vec<OsString>) -> (Vec<OsString>, Vec<OsString>) {
    let mut known = Vec::new();
    let mut forwarded = Vec::new();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        // None of our flags is non-UTF-8.
        let Some(flag) = arg.to_str() else {
            forwarded.push(arg);
            continue;
        };
        if flag == "--" {
            forwarded.extend(iter.by_ref());
            break;
        }
        if takes_value(flag) {
            known.push(arg);
            if let Some(value) = iter.next() {
                known.push(value);
            }
        } else if is_attached_value(flag) || SWITCHES.contains(&flag) {
            known.push(arg);
        } else {
            forwarded.push(arg);
        }
    }
    (known, forwarded)
}

/// Parse a full argv (program name first).
pub fn parse_invocation<I, T>(argv: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut argv = argv.into_iter().map(Into::<OsString>::into);
    let program = argv
        .next()
        .unwrap_or_else(|| OsString::from("limit-transcodes"));

    let (known, forwarded) = split_known_args(argv.collect());
    let cli = Cli::try_parse_from(std::iter::once(program).chain(known))?;
    Ok(Invocation { cli, forwarded })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(line: &str) -> Vec<String> {
        std::iter::once("limit-transcodes")
            .chain(line.split_whitespace())
            .map(String::from)
            .collect()
    }

    #[test]
    fn own_flags_in_all_spellings() {
        let inv = parse_invocation(argv("-r 4k -l2 --resolution 1080 --limitation=3 -r720 -l 4 -c2 -v")).unwrap();
        assert_eq!(inv.cli.resolutions, vec!["4k", "1080", "720"]);
        assert_eq!(inv.cli.limitations, vec!["2", "3", "4"]);
        assert_eq!(inv.cli.combine, 2);
        assert!(inv.cli.verbose);
        assert!(inv.forwarded.is_empty());
    }

    #[test]
    fn unknown_arguments_are_forwarded_in_order() {
        let inv = parse_invocation(argv(
            "-r 4k -l2 --jbop stream --username admin --sessionId abc123 --limit 5 --killMessage Busy",
        ))
        .unwrap();
        assert_eq!(inv.cli.resolutions, vec!["4k"]);
        assert_eq!(inv.cli.limitations, vec!["2"]);
        assert_eq!(
            inv.forwarded,
            vec!["--jbop", "stream", "--username", "admin", "--sessionId", "abc123", "--limit", "5", "--killMessage", "Busy"]
        );
    }

    #[test]
    fn interleaved_flags_are_still_collected() {
        let inv = parse_invocation(argv("--jbop stream -r 1080 --notify 1 -l 3")).unwrap();
        assert_eq!(inv.cli.resolutions, vec!["1080"]);
        assert_eq!(inv.cli.limitations, vec!["3"]);
        assert_eq!(inv.forwarded, vec!["--jbop", "stream", "--notify", "1"]);
    }

    #[test]
    fn double_dash_forwards_the_rest_verbatim() {
        let inv = parse_invocation(argv("-r 720 -l 1 -- -r 1080 --combine")).unwrap();
        assert_eq!(inv.cli.resolutions, vec!["720"]);
        assert_eq!(inv.forwarded, vec!["-r", "1080", "--combine"]);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_arguments_are_forwarded_unchanged() {
        use std::os::unix::ffi::OsStringExt;

        let message = OsString::from_vec(b"Caf\xe9 is full".to_vec());
        let argv: Vec<OsString> = ["limit-transcodes", "-r", "720", "-l", "1", "--killMessage"]
            .iter()
            .map(OsString::from)
            .chain(std::iter::once(message.clone()))
            .collect();

        let inv = parse_invocation(argv).unwrap();
        assert_eq!(inv.cli.resolutions, vec!["720"]);
        assert_eq!(inv.forwarded, vec![OsString::from("--killMessage"), message]);
    }

    #[test]
    fn config_path_is_ours() {
        let inv = parse_invocation(argv("--config /etc/limiter.toml -r 720 -l 1 --jbop stream")).unwrap();
        assert_eq!(inv.cli.config, Some(PathBuf::from("/etc/limiter.toml")));
        assert_eq!(inv.forwarded, vec!["--jbop", "stream"]);
    }

    #[test]
    fn negative_limit_reaches_validation() {
        let inv = parse_invocation(argv("-r 720 -l -1")).unwrap();
        assert_eq!(inv.cli.limitations, vec!["-1"]);
    }

    #[test]
    fn bad_combine_value_is_a_parse_error() {
        assert!(parse_invocation(argv("-r 720 -l 1 -c -2")).is_err());
        assert!(parse_invocation(argv("-r 720 -l 1 -c many")).is_err());
    }

    #[test]
    fn mismatched_counts_are_reported() {
        let inv = parse_invocation(argv("-r 4k -r 1080 -l2")).unwrap();
        match inv.cli.limit_pairs() {
            Err(CheckError::ArgumentMismatch { resolutions, limitations }) => {
                assert_eq!((resolutions, limitations), (2, 1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn pairs_follow_occurrence_order() {
        let inv = parse_invocation(argv("-r 1080 -r 720 -l 3 -l 4")).unwrap();
        assert_eq!(
            inv.cli.limit_pairs().unwrap(),
            vec![("1080".to_string(), "3".to_string()), ("720".to_string(), "4".to_string())]
        );
    }
}
