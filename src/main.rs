use anyhow::Result;
use release_templater::{
    config::Config,
    loader::{load_releases, ReleaseFile},
    EnvRenderer,
};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let config = Config::from_env()?;
    let renderer = EnvRenderer::from_env()?;

    let releases = load_releases(&config.releases_path)?;
    log::info!("Loaded {} releases", releases.len());

    let mut resolved = vec![];
    for release in releases {
        if !config.include_undesired && !release.desired() {
            log::info!("Release {} is not desired, skipping", release.name);
            continue;
        }

        resolved.push(release.execute_template_expressions(&renderer)?);
    }

    log::info!("Resolved {} releases", resolved.len());
    print!(
        "{}",
        serde_yaml::to_string(&ReleaseFile { releases: resolved })?
    );

    Ok(())
}
