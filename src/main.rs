use std::collections::BTreeSet;
use std::process::ExitCode;

use flowboard::cascade::cascade_delete;
use flowboard::config::EngineConfig;
use flowboard::geometry::Point;
use flowboard::memory::MemoryScene;
use flowboard::model::{CardContent, Shape};
use flowboard::scene::SceneAccess;
use flowboard::transaction::{FlowAssignment, assign_flow, create_child};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env loaded");
    }
    tracing_subscriber::fmt::init();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match run(&config).await {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "demo failed");
            ExitCode::FAILURE
        }
    }
}

/// Grow a small tree, cascade-delete its middle card, and return the scene as JSON.
async fn run(config: &EngineConfig) -> Result<String, Box<dyn std::error::Error>> {
    let mut scene = MemoryScene::new();

    let root = Shape::new(
        Point::new(0.0, 0.0),
        CardContent::Tweet { url: "https://example.com/status/1".into(), text: "Where does this go?".into() },
    );
    let root_id = root.id;
    scene.create_shape(root)?;

    let first = create_child(&mut scene, config, root_id, CardContent::Question { prompt: "Why?".into(), answer: None }).await?;
    if first.flow == FlowAssignment::Minted {
        assign_flow(&mut scene, root_id, first.flow_id)?;
    }
    let second = create_child(&mut scene, config, root_id, CardContent::Note { text: "Follow-up".into() }).await?;
    let leaf = create_child(&mut scene, config, first.child_id, CardContent::Note { text: "Deeper".into() }).await?;
    tracing::info!(
        first = %first.child_id,
        second = %second.child_id,
        leaf = %leaf.child_id,
        cards = scene.shapes().len(),
        connections = scene.connections().len(),
        "tree built"
    );

    let report = cascade_delete(&mut scene, &BTreeSet::from([first.child_id]))?;
    tracing::info!(removed_connections = report.connections, "middle card deleted");

    Ok(serde_json::to_string_pretty(&scene.snapshot())?)
}
