use std::env::var_os;
use std::ffi::OsStr;
use std::path::Path;
use std::str::FromStr;
use dotenv::var;
use serde::{Serialize, Deserialize};
use oasis_gpio::led::pt6961::DisplayConfig;
use oasis_gpio::led::pt6961::driver::DisplayLayout;

/// What the demo shows on the display.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Local time as HH:MM, with a blinking colon.
    Clock,
    /// Counts up by one every tick.
    Counter,
    /// Spins around the display.
    Spinner,
}

impl FromStr for Mode {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clock" => Ok(Mode::Clock),
            "counter" => Ok(Mode::Counter),
            "spinner" => Ok(Mode::Spinner),
            _ => Err(eyre::eyre!("Unknown mode: {}", s)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    /// GPIO chip device, like `/dev/gpiochip0`. Without it, the demo runs on soft GPIO.
    pub chip: Option<String>,
    pub clock_pin: usize,
    pub strobe_pin: usize,
    pub data_pin: usize,
    pub digit_count: u8,
    /// `6x12` or `7x11`.
    pub layout: String,
    pub brightness: u8,
    pub mode: Mode,
    pub tick_ms: u64,
    /// Stop after this many ticks. Runs forever if not set.
    pub ticks: Option<u64>,
}

impl Config {
    /// Loads the config from `CONFIG_FILE`, or `None` if there's no such file.
    pub fn try_load() -> eyre::Result<Option<Self>> {
        let config_str = var_os("CONFIG_FILE");
        let config_str: &OsStr = config_str.as_deref().unwrap_or(OsStr::new("oasis.json"));
        Self::load_from(Path::new(config_str))
    }

    /// Loads the config from `config_path`.
    ///
    /// A missing file gives `Ok(None)`. A file that can't be read or parsed is an error, and is
    /// left alone.
    pub fn load_from(config_path: &Path) -> eyre::Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }

        let file = std::fs::File::open(config_path)?;
        let reader = std::io::BufReader::new(file);
        let config = serde_json::from_reader(reader)
            .map_err(|err| eyre::eyre!("Invalid config {}: {}", config_path.display(), err))?;
        Ok(Some(config))
    }

    pub fn save(&self) -> std::io::Result<()> {
        let config_str = var("CONFIG_FILE").unwrap_or_else(|_| "oasis.json".to_string());
        let config_path = Path::new(&config_str);
        let file = std::fs::File::create(config_path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Overrides the loaded values with the `OASIS_*` environment variables, if set.
    pub fn apply_env(&mut self) -> eyre::Result<()> {
        if let Ok(chip) = var("OASIS_CHIP") {
            self.chip = Some(chip).filter(|chip| !chip.is_empty());
        }
        if let Ok(pin) = var("OASIS_PIN_CLOCK") {
            self.clock_pin = pin.parse()?;
        }
        if let Ok(pin) = var("OASIS_PIN_STROBE") {
            self.strobe_pin = pin.parse()?;
        }
        if let Ok(pin) = var("OASIS_PIN_DATA") {
            self.data_pin = pin.parse()?;
        }
        if let Ok(mode) = var("OASIS_MODE") {
            self.mode = mode.parse()?;
        }
        Ok(())
    }

    pub fn display_config(&self) -> eyre::Result<DisplayConfig> {
        let layout: DisplayLayout = self.layout.parse()?;
        Ok(DisplayConfig::new(self.digit_count, layout))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            chip: None,
            clock_pin: 17,
            strobe_pin: 27,
            data_pin: 22,
            digit_count: 4,
            layout: DisplayLayout::default().to_string(),
            brightness: 3,
            mode: Mode::Clock,
            tick_ms: 500,
            ticks: None,
        }
    }
}
