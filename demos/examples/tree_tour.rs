// Copyright 2025 the Treescope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scripted camera tour over a tree loaded from JSON.
//!
//! This example shows how to combine:
//! - `treescope_layout` to validate a nested JSON tree and place its nodes,
//! - `treescope_camera` to run focus transitions over the result,
//! - a single-threaded `futures` executor and a simulated 60 Hz clock as the
//!   frame driver a real renderer would provide.
//!
//! Run:
//! - `cargo run -p treescope_demos --example tree_tour`
//! - `cargo run -p treescope_demos --example tree_tour -- path/to/tree.json`
//!
//! Set `RUST_LOG=treescope_camera=debug` to see each phase as it starts.

use std::error::Error;
use std::time::Duration;

use futures::FutureExt as _;
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use kurbo::Size;
use tracing::info;
use tracing_subscriber::EnvFilter;
use treescope_camera::{Camera, CameraConfig, CameraInit, Navigation, Transition};
use treescope_layout::{LayoutConfig, LayoutResult, RawNode, TreeData};

const SAMPLE: &str = include_str!("../data/portfolio.json");
const FRAME: Duration = Duration::from_nanos(16_666_667);
const CANVAS: Size = Size::new(1280.0, 720.0);

/// One step of the tour.
#[derive(Clone, Debug)]
enum Step {
    Focus(&'static str),
    Navigate(Navigation),
    Overview,
    Resize(Size),
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let json = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)?,
        None => SAMPLE.to_owned(),
    };
    let raw: RawNode = serde_json::from_str(&json)?;
    let tree = TreeData::from_raw(&raw)?;
    let layout = LayoutResult::compute(&tree, &LayoutConfig::default());
    info!(
        nodes = layout.len(),
        width = layout.width(),
        height = layout.height(),
        "layout ready"
    );
    for (_, node) in layout.iter() {
        println!(
            "{:indent$}{} [{:?}] at ({:.1}, {:.1})",
            "",
            node.title,
            node.kind,
            node.position.x,
            node.position.y,
            indent = node.depth as usize * 2,
        );
    }

    let camera = Camera::with_canvas(layout, CANVAS, CameraConfig::default(), CameraInit::overview());
    let mut pool = LocalPool::new();

    let script = [
        Step::Focus("projects"),
        Step::Navigate(Navigation::FirstChild),
        Step::Navigate(Navigation::NextSibling),
        Step::Navigate(Navigation::Right),
        Step::Resize(Size::new(900.0, 900.0)),
        Step::Navigate(Navigation::Root),
        Step::Focus("contact"),
        Step::Overview,
    ];

    for step in script {
        let command = match &step {
            Step::Focus(id) => camera.focus_node(id).boxed_local(),
            Step::Navigate(nav) => camera.navigate(*nav).boxed_local(),
            Step::Overview => camera.zoom_to_overview().boxed_local(),
            Step::Resize(size) => camera.resize(*size).boxed_local(),
        };
        let result = run(&mut pool, &camera, command)?;
        let pose = camera.pose();
        println!(
            "{step:?}: {result:?} -> {:?} at ({:.1}, {:.1}) x{:.3}",
            camera.mode(),
            pose.x,
            pose.y,
            pose.scale,
        );
    }
    Ok(())
}

/// Polls `command` to completion, ticking the camera once per simulated frame.
fn run(
    pool: &mut LocalPool,
    camera: &Camera,
    command: futures::future::LocalBoxFuture<'static, Transition>,
) -> Result<Transition, Box<dyn Error>> {
    let handle = pool.spawner().spawn_local_with_handle(command)?;
    let mut frames = 0_u32;
    loop {
        pool.run_until_stalled();
        if !camera.is_animating() {
            break;
        }
        camera.advance(FRAME);
        frames += 1;
    }
    info!(frames, "command settled");
    Ok(pool.run_until(handle))
}
