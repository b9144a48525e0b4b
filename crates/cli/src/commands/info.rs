//! `info` command implementation.

use anyhow::{Context, Result};
use ingestion::SessionInventory;
use tracing::info;

use super::resolve_config;
use crate::cli::InfoArgs;

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let config = resolve_config(&args.session)?;
    info!(session = %config.session.session_name(), "Scanning session");

    let inventory = SessionInventory::scan(&config).context("Failed to scan session")?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&inventory).context("Failed to serialize inventory")?;
        println!("{}", json);
    } else {
        print_inventory(&inventory);
    }

    Ok(())
}

fn print_inventory(inv: &SessionInventory) {
    println!("\n=== Session: {} ===\n", inv.session);

    match (inv.offset_s, &inv.calibration_error) {
        (Some(offset), _) => println!("Clock offset: {:+.6}s", offset),
        (None, Some(err)) => println!("Clock offset: unavailable ({})", err),
        (None, None) => println!("Clock offset: unavailable"),
    }

    println!("\nCamera images: {}", inv.camera.emitted);
    if inv.camera.skipped > 0 {
        println!("  skipped entries: {}", inv.camera.skipped);
    }

    println!("Gaze samples: {}", inv.gaze.emitted);
    if inv.gaze.skipped > 0 || inv.gaze.out_of_order > 0 {
        println!(
            "  skipped: {}, out of order: {}",
            inv.gaze.skipped, inv.gaze.out_of_order
        );
    }

    println!(
        "Inertial samples: {} ({} with gyroscope)",
        inv.inertial.emitted, inv.inertial_with_gyro
    );
    if inv.inertial.skipped > 0 || inv.inertial.out_of_order > 0 {
        println!(
            "  skipped: {}, out of order: {}",
            inv.inertial.skipped, inv.inertial.out_of_order
        );
    }

    println!(
        "Scene video: {}",
        if inv.scene_video_present { "present" } else { "missing" }
    );
    println!();
}
