//! Utility to rescale every stored food on a date from its original values
//! Usage: cargo run --bin recalculate_diets -- <date>

use meokpt::models::{load_daily_aggregate, Diet, DietFood};
use meokpt::nutrition::{format_value, Channel};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let date = std::env::args()
        .nth(1)
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());

    let (db_path, database) = meokpt::config::open_database()?;
    println!("Database: {}", db_path.display());

    database.with_conn_mut(|conn| {
        // Rescale the whole date atomically
        let tx = conn.transaction()?;
        let diets = Diet::list_for_date(&tx, &date)?;
        if diets.is_empty() {
            println!("No diets found for date: {}", date);
            return Ok(());
        }
        println!("Found {} diets for {}", diets.len(), date);

        for diet in &diets {
            let before = Diet::total(&tx, diet.id)?;
            let rescaled = DietFood::rescale_all_for_diet(&tx, diet.id)?;
            let after = Diet::total(&tx, diet.id)?;

            println!("\nDiet {} ({}, {})", diet.id, diet.title, diet.meal_slot.as_str());
            println!("  Foods rescaled: {}", rescaled);
            println!(
                "  Energy: {} -> {}",
                format_value(Channel::Energy, Some(before.energy_kcal)),
                format_value(Channel::Energy, Some(after.energy_kcal))
            );
        }

        let (_, day) = load_daily_aggregate(&tx, &date)?;
        tx.commit()?;

        let total = day.total();
        println!("\nDay total for {}:", date);
        for channel in Channel::ALL {
            println!("  {:<13} {}", channel.as_str(), format_value(channel, total.get(channel)));
        }
        Ok(())
    })?;

    Ok(())
}
