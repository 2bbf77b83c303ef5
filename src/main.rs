use std::env;

use anyhow::{anyhow, Context, Result};
use log::info;

use folio_render::{
    evaluate, AdaptiveConfig, EnvironmentSnapshot, Evaluation, FallbackContent, StaticEnvironment,
};

const USAGE: &str = "Usage: folio-render [--user-agent UA] [--width PX] [--cores N] [--memory GB] \
[--no-webgl] [--fallback static|simplified] [--config FILE] [--json]";

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let mut config = match &options.config {
        Some(path) => AdaptiveConfig::load(path)
            .with_context(|| format!("failed to load configuration {path}"))?,
        None => AdaptiveConfig::default(),
    };
    if let Some(fallback) = options.fallback {
        config.fallback = fallback;
    }

    info!("evaluating {:?}", options.snapshot);
    let probe = StaticEnvironment::new(options.snapshot);
    let evaluation = evaluate(&config, &probe);

    if options.json {
        let json = serde_json::to_string_pretty(&evaluation)
            .context("failed to serialize evaluation")?;
        println!("{json}");
    } else {
        print_evaluation(&evaluation);
    }
    Ok(())
}

fn print_evaluation(evaluation: &Evaluation) {
    let profile = &evaluation.profile;
    let policy = &evaluation.policy;
    let tuning = &evaluation.tuning;

    println!(
        "Capability level: {} (mobile={}, android={}, cores={}, memory={}GB, webgl={}, width={})",
        profile.capability_level.as_str(),
        profile.is_mobile,
        profile.is_android,
        profile.cpu_cores,
        profile.memory_gb,
        profile.supports_webgl,
        profile.viewport_width
    );
    println!("Render variant: {}", policy.variant.as_str());
    println!(
        " - resolution: {:.2}..{:.2}",
        policy.resolution.min, policy.resolution.max
    );
    println!(" - antialiasing: {}", policy.antialiasing);
    println!(" - frame loop: {}", policy.frame_loop.as_str());
    println!(" - power preference: {}", policy.power_preference.as_str());
    println!(" - precision: {}", policy.precision.as_str());
    if evaluation.engine.is_none() {
        println!("No 3D canvas; fallback content is shown");
    }
    println!("Simplified sections: {}", evaluation.simplified_ui);
    println!(
        "Scene tuning: particles={} motion={:.2} detail={} auto-rotate={}",
        tuning.particle_count, tuning.motion_scale, tuning.geometry_detail, tuning.auto_rotate
    );
}

#[derive(Debug)]
struct CliOptions {
    snapshot: EnvironmentSnapshot,
    fallback: Option<FallbackContent>,
    config: Option<String>,
    json: bool,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut snapshot = EnvironmentSnapshot::new().with_webgl(true);
        let mut fallback = None;
        let mut config = None;
        let mut json = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--user-agent" => snapshot.user_agent = Some(value(&mut args, &arg)?),
                "--width" => snapshot.viewport_width = Some(parse_value(&mut args, &arg)?),
                "--cores" => snapshot.cpu_cores = Some(parse_value(&mut args, &arg)?),
                "--memory" => snapshot.memory_gb = Some(parse_value(&mut args, &arg)?),
                "--no-webgl" => snapshot.supports_webgl = Some(false),
                "--fallback" => {
                    fallback = Some(match value(&mut args, &arg)?.as_str() {
                        "static" => FallbackContent::StaticImage,
                        "simplified" => FallbackContent::Simplified,
                        other => {
                            return Err(anyhow!(
                                "Unknown fallback: {other}. Expected static or simplified"
                            ))
                        }
                    })
                }
                "--config" => config = Some(value(&mut args, &arg)?),
                "--json" => json = true,
                "-h" | "--help" => return Err(anyhow!(USAGE)),
                other => return Err(anyhow!("Unknown argument: {other}\n{USAGE}")),
            }
        }

        Ok(Self {
            snapshot,
            fallback,
            config,
            json,
        })
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} expects a value\n{USAGE}"))
}

fn parse_value<T>(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = value(args, flag)?;
    raw.parse::<T>()
        .with_context(|| format!("invalid value for {flag}: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn parses_environment_flags() {
        let options = CliOptions::parse(args(&[
            "--user-agent",
            "iPhone",
            "--width",
            "390",
            "--cores",
            "6",
            "--memory",
            "4",
            "--no-webgl",
            "--fallback",
            "simplified",
            "--json",
        ]))
        .unwrap();
        assert_eq!(options.snapshot.user_agent.as_deref(), Some("iPhone"));
        assert_eq!(options.snapshot.viewport_width, Some(390));
        assert_eq!(options.snapshot.cpu_cores, Some(6));
        assert_eq!(options.snapshot.memory_gb, Some(4.0));
        assert_eq!(options.snapshot.supports_webgl, Some(false));
        assert_eq!(options.fallback, Some(FallbackContent::Simplified));
        assert!(options.json);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(CliOptions::parse(args(&["--cores", "many"])).is_err());
        assert!(CliOptions::parse(args(&["--width"])).is_err());
        assert!(CliOptions::parse(args(&["--verbose"])).is_err());
    }
}
