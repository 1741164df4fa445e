//! The `omrtrack profile` commands.

use anyhow::Result;
use chrono::NaiveDate;

use omrtrack_core::config::OmrtrackConfig;
use omrtrack_core::profile::LearnerProfile;

use super::{open_history, save_history};

pub fn show(config: &OmrtrackConfig) -> Result<()> {
    let store = open_history(config)?;
    match &store.profile {
        Some(p) => {
            println!("Name:         {}", p.name);
            println!("Age:          {}", p.age);
            println!("Exam date:    {}", p.exam_date);
            println!("Target score: {}", p.target_score);
            println!(
                "Days to exam: {}",
                p.days_until_exam(chrono::Local::now().date_naive())
            );
        }
        None => println!("No profile set. Use `omrtrack profile set`."),
    }
    Ok(())
}

pub fn set(
    config: &OmrtrackConfig,
    name: &str,
    age: u32,
    exam_date: NaiveDate,
    target_score: u32,
) -> Result<()> {
    let profile = LearnerProfile::new(name, age, exam_date, target_score)?;
    let mut store = open_history(config)?;
    store.profile = Some(profile);
    save_history(config, &store)?;
    println!("Profile saved.");
    Ok(())
}
