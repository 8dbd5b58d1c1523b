use crate::error::SiteError;
use crate::orbit::{OrbitConfig, TouchBehavior};
use crate::stars::{StarFieldConfig, Twinkle, DEFAULT_DRIFT_SPEED, DEFAULT_STAR_COUNT};
use clap::Parser;
use std::path::PathBuf;

pub type Rgb = (u8, u8, u8);

/// Star field and orbiting menu, rendered in the terminal
#[derive(Parser, Debug)]
#[command(name = "orbitsite", version)]
pub struct Args {
    /// Number of stars in the background
    #[arg(long, default_value_t = DEFAULT_STAR_COUNT)]
    pub stars: usize,

    /// Star drift speed in px per frame
    #[arg(long, default_value_t = DEFAULT_DRIFT_SPEED, value_parser = parse_speed)]
    pub speed: f32,

    /// Star twinkle style
    #[arg(long, value_enum, default_value_t = Twinkle::Off)]
    pub twinkle: Twinkle,

    /// Seed for star placement (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Treat the terminal as a touch device: clicks become press/release
    #[arg(long)]
    pub touch: bool,

    /// What a satellite does on press/release in touch mode
    #[arg(long, value_enum, default_value_t = TouchBehavior::RevealThenNavigate)]
    pub touch_behavior: TouchBehavior,

    /// Background color as hex, e.g. 1a1b26
    #[arg(long, value_parser = parse_hex_color)]
    pub bg_color: Option<Rgb>,

    /// Target frame rate
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Write logs to this directory (filter with ORBITSITE_LOG)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

/// Behaviour knobs shared by every page.
#[derive(Clone, Debug, Default)]
pub struct SiteConfig {
    pub stars: StarFieldConfig,
    pub orbit: OrbitConfig,
}

impl Args {
    pub fn site_config(&self) -> SiteConfig {
        SiteConfig {
            stars: StarFieldConfig {
                count: self.stars,
                speed: self.speed,
                twinkle: self.twinkle,
                seed: self.seed,
            },
            orbit: OrbitConfig {
                touch: self.touch_behavior,
            },
        }
    }
}

pub fn parse_hex_color(hex: &str) -> Result<Rgb, SiteError> {
    let invalid = || SiteError::InvalidColor(hex.to_string());
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid());
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
    };
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

pub fn parse_speed(raw: &str) -> Result<f32, SiteError> {
    match raw.trim().parse::<f32>() {
        Ok(speed) if speed.is_finite() && speed >= 0.0 => Ok(speed),
        _ => Err(SiteError::InvalidSpeed(raw.to_string())),
    }
}
