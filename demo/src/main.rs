mod config;

use std::thread;
use std::time::Duration;
use dotenv::dotenv;
use log::{debug, info, trace, warn};
use time::OffsetDateTime;
use oasis_gpio::GpioDriver;
use oasis_gpio::gpiod::GpiodDriver;
use oasis_gpio::led::pt6961::driver::{GpioPT6961Driver, PT6961Driver};
use oasis_gpio::led::pt6961::spinner::SpinMode;
use oasis_gpio::led::pt6961::{OasisLed, DIGIT_CAPACITY};
use oasis_gpio::soft::SoftGpioDriver;
use crate::config::{Config, Mode};

/// Pins available on the soft GPIO driver used for dry runs.
const SOFT_PIN_COUNT: usize = 64;

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();

    info!("Oasis LED demo starting...");

    debug!("Trying to load config...");
    let mut config = if let Some(config) = Config::try_load()? {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };
    config.apply_env()?;
    debug!("{:?}", config);

    match config.chip.as_deref() {
        Some(path) => {
            debug!("Initializing GPIO driver...");
            let gpio = GpiodDriver::open(path)?;
            debug!("{:?} initialized.", gpio);
            run(&gpio, &config, || {})
        }
        None => {
            warn!("No GPIO chip configured, doing a dry run on soft GPIO.");
            let gpio = SoftGpioDriver::new(SOFT_PIN_COUNT);
            run(&gpio, &config, || drain_trace(&gpio, &config))
        }
    }
}

/// Logs what the soft driver clocked out since the last call, and forgets it.
fn drain_trace(gpio: &SoftGpioDriver, config: &Config) {
    for frame in gpio.take_serial_frames(config.clock_pin, config.strobe_pin, config.data_pin) {
        trace!("Dry run transfer: {:02X?}", frame);
    }
}

/// Runs the demo on `gpio`, calling `after_tick` once every tick.
fn run(gpio: &dyn GpioDriver, config: &Config, after_tick: impl Fn()) -> eyre::Result<()> {
    info!("Display @ CLK: {}, STB: {}, DIN: {}",
        config.clock_pin, config.strobe_pin, config.data_pin);

    debug!("Initializing display driver...");
    let mut clock_pin = gpio.get_pin(config.clock_pin)?;
    let clock_out = clock_pin.as_output()?;
    let mut strobe_pin = gpio.get_pin(config.strobe_pin)?;
    let strobe_out = strobe_pin.as_output()?;
    let mut data_pin = gpio.get_pin(config.data_pin)?;
    let data_out = data_pin.as_output()?;

    let driver = GpioPT6961Driver::new(&*clock_out, &*strobe_out, &*data_out);
    let mut led = OasisLed::new(driver, config.display_config()?)?;

    led.init()?;
    led.set_brightness(config.brightness)?;

    debug!("{:?} initialized.", led);

    if config.mode == Mode::Spinner {
        // The full display spinner only knows how to go around 4 digits
        let mode = if led.config().digit_count as usize == DIGIT_CAPACITY {
            SpinMode::FullDisplay
        } else {
            SpinMode::SingleDigit
        };
        led.set_spinner_mode(mode);
    }

    info!("Starting {:?} demo...", config.mode);

    let capacity = 10u64.pow(led.config().digit_count as u32);
    let tick = Duration::from_millis(config.tick_ms);
    let mut count = 0u64;

    while config.ticks.is_none_or(|ticks| count < ticks) {
        trace!("Tick {}", count);

        match config.mode {
            Mode::Clock => show_time(&mut led, count % 2 == 0, capacity)?,
            Mode::Counter => led.set_value((count % capacity) as u16, false)?,
            Mode::Spinner => led.spin()?,
        }

        after_tick();
        thread::sleep(tick);
        count += 1;
    }

    info!("Done after {} ticks.", count);
    led.disable_display()?;

    Ok(())
}

fn show_time<D: PT6961Driver>(led: &mut OasisLed<D>, colon: bool, capacity: u64) -> eyre::Result<()> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let value = (now.hour() as u64 * 100 + now.minute() as u64) % capacity;

    led.set_value(value as u16, true)?;
    led.set_colon(colon)?;

    Ok(())
}
