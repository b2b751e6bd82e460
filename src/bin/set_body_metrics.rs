//! Utility to store body metrics and print the derived daily target
//! Usage: cargo run --bin set_body_metrics -- <weight_kg> <height_cm> <age> <sex> <activity_level> <goal>

use meokpt::models::BodyProfile;
use meokpt::nutrition::{format_value, Channel};
use meokpt::tools::profile::parse_metrics;

const USAGE: &str =
    "Usage: set_body_metrics <weight_kg> <height_cm> <age> <male|female> <activity_level> <goal>";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 6 {
        return Err(USAGE.into());
    }

    let weight_kg: f64 = args[0].parse().map_err(|_| format!("Invalid weight: {}", args[0]))?;
    let height_cm: f64 = args[1].parse().map_err(|_| format!("Invalid height: {}", args[1]))?;
    let age: u32 = args[2].parse().map_err(|_| format!("Invalid age: {}", args[2]))?;
    let metrics = parse_metrics(weight_kg, height_cm, age, &args[3], &args[4], &args[5])?;

    let (db_path, database) = meokpt::config::open_database()?;
    println!("Database path: {}", db_path.display());

    database.with_conn(|conn| {
        let profile = BodyProfile::set_metrics(conn, &metrics)?;
        println!("Body metrics set:");
        println!("  Weight: {} kg, height: {} cm, age: {}", weight_kg, height_cm, age);
        println!(
            "  Sex: {}, activity: {}, goal: {}",
            profile.metrics.sex.as_str(),
            profile.metrics.activity_level.as_str(),
            profile.metrics.goal.as_str()
        );
        println!("Daily target:");
        for channel in Channel::ALL {
            println!(
                "  {:<13} {}",
                channel.as_str(),
                format_value(channel, Some(profile.target.get(channel)))
            );
        }
        Ok(())
    })?;

    Ok(())
}
