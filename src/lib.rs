pub mod aggregate;
pub mod config;
pub mod display;
pub mod driver;
pub mod errors;
pub mod parse;
pub mod reduce;
pub mod runner;
pub mod sweep;
pub mod types;

use std::ffi::OsString;

/// Flags the publish tooling spells Go-style, with a single dash.
pub const GO_STYLE_FLAGS: &[&str] = &["tracefile", "ipfile"];

/// Rewrite `-tracefile` / `-ipfile=x` into their double-dash forms so clap
/// accepts the Go-style spelling alongside the usual one.
pub fn normalize_go_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 {
                return arg;
            }
            let Some(s) = arg.to_str() else {
                return arg;
            };
            let Some(rest) = s.strip_prefix('-') else {
                return arg;
            };
            if rest.starts_with('-') {
                return arg;
            }
            let name = rest.split('=').next().unwrap_or(rest);
            if GO_STYLE_FLAGS.contains(&name) {
                OsString::from(format!("-{}", s))
            } else {
                arg
            }
        })
        .collect()
}
