//! Nutrient profiles
//!
//! Channel-wise nutrient values shared by foods, diets, days and targets.

use serde::{Deserialize, Serialize};

/// One nutrient dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Energy,
    Carbohydrate,
    Protein,
    Fat,
    Fiber,
    Sugar,
    Sodium,
}

impl Channel {
    /// All channels in display order
    pub const ALL: [Channel; 7] = [
        Channel::Energy,
        Channel::Carbohydrate,
        Channel::Protein,
        Channel::Fat,
        Channel::Fiber,
        Channel::Sugar,
        Channel::Sodium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Energy => "energy",
            Channel::Carbohydrate => "carbohydrate",
            Channel::Protein => "protein",
            Channel::Fat => "fat",
            Channel::Fiber => "fiber",
            Channel::Sugar => "sugar",
            Channel::Sodium => "sodium",
        }
    }

    /// Parse a channel name, accepting the short forms used in tool parameters
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "energy" | "kcal" | "calories" => Some(Channel::Energy),
            "carbohydrate" | "carbs" | "carb" => Some(Channel::Carbohydrate),
            "protein" => Some(Channel::Protein),
            "fat" => Some(Channel::Fat),
            "fiber" | "fibre" => Some(Channel::Fiber),
            "sugar" | "sugars" => Some(Channel::Sugar),
            "sodium" => Some(Channel::Sodium),
            _ => None,
        }
    }

    /// Display unit for the channel
    pub fn unit(&self) -> &'static str {
        match self {
            Channel::Energy => "kcal",
            Channel::Sodium => "mg",
            _ => "g",
        }
    }
}

/// Nutrient values for one food, diet or day
///
/// Energy is always known. Every other channel is either present or absent;
/// absent means the source data never provided it, which is not the same as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientProfile {
    pub energy_kcal: f64,
    pub carb_g: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub fiber_g: Option<f64>,
    pub sugar_g: Option<f64>,
    pub sodium_mg: Option<f64>,
}

impl NutrientProfile {
    /// Zero energy with every other channel absent
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read a channel. Energy is always `Some`.
    pub fn get(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Energy => Some(self.energy_kcal),
            Channel::Carbohydrate => self.carb_g,
            Channel::Protein => self.protein_g,
            Channel::Fat => self.fat_g,
            Channel::Fiber => self.fiber_g,
            Channel::Sugar => self.sugar_g,
            Channel::Sodium => self.sodium_mg,
        }
    }

    /// Write a channel. Clearing energy stores 0.
    pub fn set(&mut self, channel: Channel, value: Option<f64>) {
        match channel {
            Channel::Energy => self.energy_kcal = value.unwrap_or(0.0),
            Channel::Carbohydrate => self.carb_g = value,
            Channel::Protein => self.protein_g = value,
            Channel::Fat => self.fat_g = value,
            Channel::Fiber => self.fiber_g = value,
            Channel::Sugar => self.sugar_g = value,
            Channel::Sodium => self.sodium_mg = value,
        }
    }

    /// Scale every present value by a multiplier; absent channels stay absent
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            energy_kcal: self.energy_kcal * multiplier,
            carb_g: self.carb_g.map(|v| v * multiplier),
            protein_g: self.protein_g.map(|v| v * multiplier),
            fat_g: self.fat_g.map(|v| v * multiplier),
            fiber_g: self.fiber_g.map(|v| v * multiplier),
            sugar_g: self.sugar_g.map(|v| v * multiplier),
            sodium_mg: self.sodium_mg.map(|v| v * multiplier),
        }
    }

    /// Number of channels with a value
    pub fn present_count(&self) -> usize {
        Channel::ALL.iter().filter(|c| self.get(**c).is_some()).count()
    }
}

/// Recommended daily intake
///
/// Same channels as [`NutrientProfile`], but every channel is always populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetProfile {
    pub energy_kcal: f64,
    pub carb_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub sodium_mg: f64,
}

impl TargetProfile {
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Energy => self.energy_kcal,
            Channel::Carbohydrate => self.carb_g,
            Channel::Protein => self.protein_g,
            Channel::Fat => self.fat_g,
            Channel::Fiber => self.fiber_g,
            Channel::Sugar => self.sugar_g,
            Channel::Sodium => self.sodium_mg,
        }
    }

    pub fn set(&mut self, channel: Channel, value: f64) {
        match channel {
            Channel::Energy => self.energy_kcal = value,
            Channel::Carbohydrate => self.carb_g = value,
            Channel::Protein => self.protein_g = value,
            Channel::Fat => self.fat_g = value,
            Channel::Fiber => self.fiber_g = value,
            Channel::Sugar => self.sugar_g = value,
            Channel::Sodium => self.sodium_mg = value,
        }
    }

    /// View the target as a fully-present nutrient profile
    pub fn to_profile(&self) -> NutrientProfile {
        NutrientProfile {
            energy_kcal: self.energy_kcal,
            carb_g: Some(self.carb_g),
            protein_g: Some(self.protein_g),
            fat_g: Some(self.fat_g),
            fiber_g: Some(self.fiber_g),
            sugar_g: Some(self.sugar_g),
            sodium_mg: Some(self.sodium_mg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_round_trips_through_name() {
        for channel in Channel::ALL {
            assert_eq!(Channel::from_str(channel.as_str()), Some(channel));
        }
        assert_eq!(Channel::from_str("Carbs"), Some(Channel::Carbohydrate));
        assert_eq!(Channel::from_str("vitamin c"), None);
    }

    #[test]
    fn test_channel_units() {
        assert_eq!(Channel::Energy.unit(), "kcal");
        assert_eq!(Channel::Sodium.unit(), "mg");
        assert_eq!(Channel::Protein.unit(), "g");
    }

    #[test]
    fn test_scale_keeps_absent_channels_absent() {
        let profile = NutrientProfile {
            energy_kcal: 200.0,
            carb_g: Some(10.0),
            protein_g: None,
            ..Default::default()
        };
        let scaled = profile.scale(1.5);
        assert_eq!(scaled.energy_kcal, 300.0);
        assert_eq!(scaled.carb_g, Some(15.0));
        assert_eq!(scaled.protein_g, None);
        assert_eq!(scaled.sodium_mg, None);
    }

    #[test]
    fn test_clearing_energy_stores_zero() {
        let mut profile = NutrientProfile { energy_kcal: 120.0, ..Default::default() };
        profile.set(Channel::Energy, None);
        assert_eq!(profile.get(Channel::Energy), Some(0.0));
    }

    #[test]
    fn test_target_to_profile_is_fully_present() {
        let target = TargetProfile {
            energy_kcal: 2000.0,
            carb_g: 250.0,
            protein_g: 90.0,
            fat_g: 60.0,
            fiber_g: 25.0,
            sugar_g: 25.0,
            sodium_mg: 1500.0,
        };
        let profile = target.to_profile();
        assert_eq!(profile.present_count(), 7);
        for channel in Channel::ALL {
            assert_eq!(profile.get(channel), Some(target.get(channel)));
        }
    }

    #[test]
    fn test_absent_serializes_as_null() {
        let profile = NutrientProfile { energy_kcal: 50.0, carb_g: Some(4.0), ..Default::default() };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["energy_kcal"], 50.0);
        assert_eq!(json["carb_g"], 4.0);
        assert!(json["protein_g"].is_null());
    }
}
