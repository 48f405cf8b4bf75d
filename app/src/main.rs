mod logging;

use lone_macros::{Behavior, Singleton};
use lone_scene::{GuardConfig, Scene, ViolationKind};

use crate::logging::ChannelLogger;

#[derive(Behavior)]
struct Health {
    current: u32,
}

#[derive(Behavior, Singleton)]
#[singleton(exclusive_on_node, root_only)]
struct AudioHub {
    volume: f32,
}

#[derive(Behavior)]
struct GameManager {
    level: String,
    ready: bool,
}

impl lone_scene::Singleton for GameManager {
    const CONFIG: Option<GuardConfig> = Some(GuardConfig {
        exclusive_on_node: true,
        root_only: true,
        unique_in_scene: true,
    });

    fn on_ready(&mut self) {
        self.level = "boot".to_string();
        self.ready = true;
    }
}

fn main() {
    let log_lines = ChannelLogger::install().expect("failed to install logger");

    println!("=============================================================");
    println!("Singleton guard demo");
    println!("=============================================================");

    let mut scene = Scene::new();

    // The intended setup: one manager and one audio hub, both at the root
    let game = scene.spawn("Game");
    scene.attach_singleton(
        game,
        GameManager {
            level: String::new(),
            ready: false,
        },
    );

    let audio = scene.spawn("Audio");
    scene.attach_singleton(audio, AudioHub { volume: 0.8 });

    // Regular content under a world root
    let world = scene.spawn("World");
    let player = scene.spawn_child(world, "Player").expect("world is alive");
    scene.attach(player, Health { current: 100 });

    // Two misplaced extras: a nested manager and a crowded hub
    let rogue = scene
        .spawn_child(world, "RogueManager")
        .expect("world is alive");
    scene.attach_singleton(
        rogue,
        GameManager {
            level: String::new(),
            ready: false,
        },
    );

    let crowded = scene.spawn("CrowdedAudio");
    scene.attach(crowded, Health { current: 1 });
    scene.attach_singleton(crowded, AudioHub { volume: 0.2 });

    let report = scene.awaken();

    println!("\nCaptured diagnostics:");
    while let Ok(line) = log_lines.try_recv() {
        println!("  {}", line);
    }

    println!("\nGuard report: {} violations", report.len());
    let duplicates = report
        .violations()
        .iter()
        .filter(|violation| {
            matches!(violation.kind(), ViolationKind::DuplicateInstances { .. })
        })
        .count();
    println!("  duplicate-instance findings: {}", duplicates);

    match scene.singleton::<GameManager>() {
        Some(manager) => println!(
            "\nRegistered manager: ready={}, level={:?}",
            manager.ready, manager.level
        ),
        None => println!("\nNo manager registered"),
    }

    if let Some(hub) = scene.singleton_mut::<AudioHub>() {
        hub.volume = 0.5;
    }
    println!(
        "Registered audio hub volume: {:?}",
        scene.singleton::<AudioHub>().map(|hub| hub.volume)
    );

    println!(
        "\nScene population: {} nodes, {} manager instances live",
        scene.node_count(),
        scene.count_instances::<GameManager>()
    );
    println!(
        "Player health: {:?}",
        scene.get::<Health>(player).map(|health| health.current)
    );
}
