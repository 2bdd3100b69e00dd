use bevy::prelude::*;
use bevy::render::view::screenshot::{save_to_disk, Screenshot};
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use interaction::{InteractionConfig, InteractionPlugin};

mod services;

/// Frames to wait before a screenshot so egui has laid out once.
const SCREENSHOT_FRAME: u32 = 30;

fn main() {
    let (config, config_issue) = InteractionConfig::from_env();

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Popi".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(16)),
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    });

    // LogPlugin is built by now, so service warnings are visible
    let services = services::build_services(&config);
    app.insert_resource(config)
        .insert_resource(services)
        .add_plugins((InteractionPlugin, ui::UiPlugin))
        .add_systems(Startup, spawn_camera);

    // Logged from a Startup system once LogPlugin is up
    if let Some(issue) = config_issue {
        app.insert_resource(issue);
    }

    // Screenshot mode: save one frame to the given path and exit
    if let Ok(path) = std::env::var("POPI_SCREENSHOT") {
        app.insert_resource(ScreenshotTarget { frame: 0, path });
        app.add_systems(Update, drive_screenshot);
    }

    app.run();
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

#[derive(Resource)]
struct ScreenshotTarget {
    frame: u32,
    path: String,
}

fn drive_screenshot(
    mut commands: Commands,
    mut target: ResMut<ScreenshotTarget>,
    mut exit: EventWriter<AppExit>,
) {
    target.frame += 1;
    if target.frame == SCREENSHOT_FRAME {
        info!("Saving screenshot to {}", target.path);
        commands
            .spawn(Screenshot::primary_window())
            .observe(save_to_disk(target.path.clone()));
    } else if target.frame > SCREENSHOT_FRAME + 10 {
        exit.send(AppExit::Success);
    }
}
