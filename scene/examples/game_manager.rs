use lone_macros::{Behavior, Singleton};
use lone_scene::{GuardConfig, Scene};

#[derive(Behavior)]
struct Health {
    current: u32,
}

#[derive(Behavior, Singleton)]
#[singleton(root_only)]
struct AudioHub {
    volume: f32,
}

#[derive(Behavior)]
struct GameManager {
    score: u32,
    ready: bool,
}

impl lone_scene::Singleton for GameManager {
    const CONFIG: Option<GuardConfig> = Some(GuardConfig {
        exclusive_on_node: true,
        root_only: true,
        unique_in_scene: true,
    });

    fn on_ready(&mut self) {
        self.score = 0;
        self.ready = true;
    }
}

fn main() {
    println!("=============================================================");
    println!("Game manager!");
    println!("=============================================================");

    let mut scene = Scene::new();

    // The intended setup: one manager at the root, an audio hub beside it
    let game = scene.spawn("Game");
    scene.attach_singleton(game, GameManager { score: 99, ready: false });

    let audio = scene.spawn("Audio");
    scene.attach_singleton(audio, AudioHub { volume: 0.8 });

    // Regular content
    let world = scene.spawn("World");
    let player = scene.spawn_child(world, "Player").expect("world is alive");
    scene.attach(player, Health { current: 100 });

    // A rogue second manager, nested where it shouldn't be
    let rogue = scene
        .spawn_child(world, "RogueManager")
        .expect("world is alive");
    scene.attach_singleton(rogue, GameManager { score: 0, ready: false });

    let report = scene.awaken();

    println!("\nGuard report ({} violations):", report.len());
    for violation in report.violations() {
        println!("  - {}", violation);
    }

    match scene.singleton::<GameManager>() {
        Some(manager) => println!(
            "\nRegistered manager: ready={}, score={}",
            manager.ready, manager.score
        ),
        None => println!("\nNo manager registered"),
    }

    if let Some(hub) = scene.singleton_mut::<AudioHub>() {
        hub.volume = 0.5;
    }
    println!(
        "Audio volume: {:?}",
        scene.singleton::<AudioHub>().map(|hub| hub.volume)
    );

    println!(
        "Player health: {:?}",
        scene.get::<Health>(player).map(|health| health.current)
    );
    println!(
        "Scene population: {} nodes, {} manager instances",
        scene.node_count(),
        scene.count_instances::<GameManager>()
    );
}
