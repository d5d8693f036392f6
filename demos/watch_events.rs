// SPDX-License-Identifier: MPL-2.0

//! Account walkthrough example.
//!
//! Connects to the Insteon cloud with credentials from the environment, then
//! lists the house, controls a device or scene, or watches the event stream.
//!
//! # Environment
//!
//! - `INSTEON_USERNAME` - account user name
//! - `INSTEON_PASSWORD` - account password
//! - `INSTEON_CLIENT_ID` - API client id
//!
//! # Usage
//!
//! ```bash
//! cargo run --example watch_events -- list
//! cargo run --example watch_events -- set <insteon_id> <level>
//! cargo run --example watch_events -- status <insteon_id>
//! cargo run --example watch_events -- scene <scene_id> <on|off>
//! cargo run --example watch_events -- watch [seconds]
//! ```

use std::env;
use std::time::Duration;

use insteon_cloud::{Session, SessionConfig, UnknownDevicePolicy};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let config = SessionConfig::new(
        env::var("INSTEON_USERNAME")?,
        env::var("INSTEON_PASSWORD")?,
        env::var("INSTEON_CLIENT_ID")?,
    )
    .with_unknown_device_policy(UnknownDevicePolicy::Skip);

    let session = Session::new(config)?;
    println!("Connecting...");
    session.connect().await?;
    println!("Connected to house {:?}", session.house_id());

    match args[1].as_str() {
        "list" => list(&session),
        "set" => set_level(&session, &args).await,
        "status" => status(&session, &args).await,
        "scene" => scene(&session, &args).await,
        "watch" => watch(&session, &args).await,
        mode => {
            eprintln!("Unknown mode: {mode}");
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage:");
    eprintln!("  {program} list");
    eprintln!("  {program} set <insteon_id> <level>");
    eprintln!("  {program} status <insteon_id>");
    eprintln!("  {program} scene <scene_id> <on|off>");
    eprintln!("  {program} watch [seconds]");
}

fn list(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    println!("\nDevices:");
    for device in session.devices()? {
        println!(
            "  {:<8} {:<30} cat {:>3}/{:<3}",
            device.insteon_id, device.device_name, device.device_category, device.device_subcategory
        );
    }

    println!("\nScenes:");
    for scene in session.scenes()? {
        println!(
            "  {:<8} {:<30} {} members",
            scene.scene_id,
            scene.scene_name,
            scene.device_list.len()
        );
    }
    Ok(())
}

async fn set_level(session: &Session, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(insteon_id), Some(level)) = (args.get(2), args.get(3)) else {
        return Err("set requires <insteon_id> <level>".into());
    };
    let level: u8 = level.parse()?;

    session.set_device_level(insteon_id, level).await?;
    println!("{insteon_id} set to {level}%");
    Ok(())
}

async fn status(session: &Session, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let Some(insteon_id) = args.get(2) else {
        return Err("status requires <insteon_id>".into());
    };

    let level = session.status(insteon_id).await?;
    println!("{insteon_id} is at {level}");
    Ok(())
}

async fn scene(session: &Session, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(scene_id), Some(state)) = (args.get(2), args.get(3)) else {
        return Err("scene requires <scene_id> <on|off>".into());
    };
    let scene_id: i64 = scene_id.parse()?;
    let on = match state.as_str() {
        "on" => true,
        "off" => false,
        other => return Err(format!("expected on or off, got {other}").into()),
    };

    session.set_scene_state(scene_id, on).await?;
    println!("Scene {scene_id} turned {state}");
    Ok(())
}

async fn watch(session: &Session, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let seconds: u64 = args.get(2).map_or(Ok(300), |s| s.parse())?;
    println!("Watching events for {seconds}s (Ctrl+C to stop)...");

    let mut events = session.spawn_event_stream(insteon_cloud::event::DEFAULT_EVENT_CAPACITY)?;
    let deadline = tokio::time::sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);

    let timed_out = loop {
        tokio::select! {
            () = &mut deadline => break true,
            event = events.recv() => match event {
                Some(event) => println!(
                    "[{}] {} -> {}",
                    event.device.insteon_id,
                    event.device.device_name,
                    event.status()
                ),
                None => break false,
            },
        }
    };

    if timed_out {
        println!("Done.");
        events.close();
        return Ok(());
    }

    events.join().await?;
    println!("Stream closed by server.");
    Ok(())
}
