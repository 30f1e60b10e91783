use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use catalog::{FileProjectStore, ProjectStore};
use clap::{Parser, Subcommand};
use formats::{ModelDocument, ModelObject, ProjectDocument};
use foundation::math::{GeoPoint, Vec3};
use foundation::time::TimestampMs;
use runtime::{
    Action, AutosaveController, Autosaver, SessionConfig, SharedStore, Store, load_project, select,
};
use scene::{DeviceFix, ModelScale, TrackingState};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "furnish")]
#[command(about = "Inspect and edit geo-anchored interior projects")]
struct Cli {
    /// Project store root (default: FURNISH_DATA_ROOT or ./data)
    #[arg(long, global = true)]
    data_root: Option<PathBuf>,
    /// User whose project is used (default: FURNISH_USER or "local")
    #[arg(long, global = true)]
    user: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a demo project with two pieces of furniture
    Init {
        #[arg(long, default_value = "Demo room")]
        name: String,
        #[arg(long, default_value = "demo")]
        project_id: String,
        /// Reference latitude captured at setup
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Reference longitude captured at setup
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Reference compass orientation in degrees
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        orientation: f64,
    },
    /// Print world placements for a device position as JSON
    Show {
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        heading: f64,
    },
    /// Dispatch a JSON array of actions, then save
    Apply {
        /// Actions file, or "-" for stdin
        file: PathBuf,
    },
    /// Run the autosave loop for a while after applying optional actions
    Autosave {
        #[arg(long, default_value_t = 60)]
        seconds: u64,
        /// Override the save interval in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
        #[arg(long)]
        actions: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main() -> Result<(), String> {
    let cli = Cli::parse();
    let mut config = SessionConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(root) = cli.data_root {
        config.data_root = root;
    }
    if let Some(user) = cli.user {
        config.user_id = user;
    }
    let catalog = Arc::new(FileProjectStore::new(config.data_root.clone()));

    match cli.command {
        Commands::Init {
            name,
            project_id,
            lat,
            lon,
            orientation,
        } => cmd_init(&catalog, &config, &project_id, &name, lat, lon, orientation).await,
        Commands::Show { lat, lon, heading } => cmd_show(&catalog, &config, lat, lon, heading).await,
        Commands::Apply { file } => cmd_apply(catalog, &config, &file).await,
        Commands::Autosave {
            seconds,
            interval,
            actions,
        } => cmd_autosave(catalog, &config, seconds, interval, actions.as_deref()).await,
    }
}

fn geo_point(lat: Option<f64>, lon: Option<f64>) -> Result<Option<GeoPoint>, String> {
    match (lat, lon) {
        (None, None) => Ok(None),
        (Some(lat), Some(lon)) => GeoPoint::new(lat, lon).map(Some).map_err(|e| e.to_string()),
        _ => Err("--lat and --lon must be given together".to_string()),
    }
}

async fn cmd_init(
    catalog: &FileProjectStore,
    config: &SessionConfig,
    project_id: &str,
    name: &str,
    lat: Option<f64>,
    lon: Option<f64>,
    orientation: f64,
) -> Result<(), String> {
    let furniture = [
        ("sofa", "Sofa", Vec3::new(0.0, 0.0, -2.0)),
        ("table", "Coffee table", Vec3::new(0.0, 0.0, -1.0)),
    ];

    let mut doc = ProjectDocument::new(project_id, name, TimestampMs::now());
    if let Some(point) = geo_point(lat, lon)? {
        doc.latitude = Some(point.latitude);
        doc.longitude = Some(point.longitude);
        doc.orientation = Some(orientation);
        doc.is_first_time = false;
    }

    for (id, label, position) in furniture {
        let path = format!("models/{id}.glb");
        catalog
            .put_model_metadata(&ModelDocument {
                id: id.to_string(),
                name: label.to_string(),
                path: path.clone(),
                thumb: None,
            })
            .await
            .map_err(|e| e.to_string())?;
        catalog
            .put_asset(&path, b"glTF")
            .await
            .map_err(|e| e.to_string())?;
        doc.objects.push(ModelObject {
            id: format!("{id}-1"),
            model_id: id.to_string(),
            position,
            rotation: Vec3::ZERO,
            scale: ModelScale::Uniform(1.0),
            is_visible: true,
        });
    }

    let receipt = catalog
        .save_project(&config.user_id, project_id, &doc)
        .await
        .map_err(|e| e.to_string())?;
    println!(
        "initialized project {project_id} for {} under {} ({})",
        config.user_id,
        catalog.root().display(),
        receipt.content_hash
    );
    Ok(())
}

async fn open_session(catalog: &dyn ProjectStore, config: &SessionConfig) -> Result<SharedStore, String> {
    let store = Store::new().into_shared();
    load_project(&store, catalog, &config.user_id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(store)
}

async fn cmd_show(
    catalog: &FileProjectStore,
    config: &SessionConfig,
    lat: Option<f64>,
    lon: Option<f64>,
    heading: f64,
) -> Result<(), String> {
    let store = open_session(catalog, config).await?;
    let frame = {
        let mut store = store.lock();
        if let Some(point) = geo_point(lat, lon)? {
            store.dispatch(Action::SetDeviceFix(DeviceFix { point, heading }));
        }
        store.dispatch(Action::SetTrackingState(TrackingState::Normal));
        select::render_frame(store.state())
    };
    let text = serde_json::to_string_pretty(&frame).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

fn read_actions(file: &std::path::Path) -> Result<Vec<Action>, String> {
    let text = if file.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).map_err(|e| format!("read stdin: {e}"))?
    } else {
        std::fs::read_to_string(file).map_err(|e| format!("read {file:?}: {e}"))?
    };
    Action::list_from_json(&text).map_err(|e| e.to_string())
}

async fn cmd_apply(
    catalog: Arc<FileProjectStore>,
    config: &SessionConfig,
    file: &std::path::Path,
) -> Result<(), String> {
    let actions = read_actions(file)?;
    let store = open_session(catalog.as_ref(), config).await?;
    let total = actions.len();
    let applied = store.lock().dispatch_all(actions);

    let saver = Autosaver::new(store.clone(), catalog, config.user_id.clone());
    let receipt = saver.save_now().await.map_err(|e| e.to_string())?;
    println!(
        "applied {applied}/{total} actions; {}",
        if receipt.written { "project saved" } else { "project unchanged" }
    );
    Ok(())
}

async fn cmd_autosave(
    catalog: Arc<FileProjectStore>,
    config: &SessionConfig,
    seconds: u64,
    interval: Option<u64>,
    actions: Option<&std::path::Path>,
) -> Result<(), String> {
    let store = open_session(catalog.as_ref(), config).await?;
    if let Some(file) = actions {
        let actions = read_actions(file)?;
        store.lock().dispatch_all(actions);
    }

    let period = interval
        .map(Duration::from_secs)
        .unwrap_or(config.autosave_interval);
    let saver = Arc::new(Autosaver::new(store.clone(), catalog, config.user_id.clone()));
    let mut controller = AutosaveController::new(saver, period).map_err(|e| e.to_string())?;
    let auto_save = store.lock().state().settings.auto_save;
    controller.sync(auto_save);
    tracing::info!(?period, seconds, active = controller.is_active(), "autosave running");

    tokio::time::sleep(Duration::from_secs(seconds)).await;
    drop(controller);

    let mut store = store.lock();
    for notice in store.drain_notices() {
        eprintln!("{:?} {}: {}", notice.level, notice.kind, notice.message);
    }
    println!(
        "unsaved changes: {}",
        select::has_unsaved_changes(store.state())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn autosave_interval_must_be_positive() {
        assert!(Cli::try_parse_from(["furnish", "autosave", "--interval", "0"]).is_err());

        let cli = Cli::try_parse_from(["furnish", "autosave", "--interval", "5"]).expect("parse");
        match cli.command {
            Commands::Autosave { interval, .. } => assert_eq!(interval, Some(5)),
            _ => panic!("expected the autosave command"),
        }
    }
}
