#![no_std]
#![no_main]

#[cfg(feature = "defmt")]
use defmt_rtt as _;

// Panic handler
use panic_halt as _;

use fugit::RateExtU32;
use rp_pico::entry;
use rp_pico::hal::{
    clocks::init_clocks_and_plls,
    gpio::{FunctionI2C, Pin, PullUp},
    pac,
    watchdog::Watchdog,
    Sio, Timer, I2C,
};
use sh1106::{prelude::*, Builder};

use flicker_core::graphics::GraphicsRenderer;
use flicker_firmware::*;

static SHUTDOWN: ShutdownSignal = ShutdownSignal::new();

#[entry]
fn main() -> ! {
    #[cfg(feature = "defmt")]
    defmt::info!("🔦 Flicker meter starting (core {})", VERSION);

    let Some(mut pac) = pac::Peripherals::take() else {
        halt()
    };
    let mut watchdog = Watchdog::new(pac.WATCHDOG);

    // 125 MHz system clock, 48 MHz from PLL_USB feeds clk_adc
    let Ok(clocks) = init_clocks_and_plls(
        rp_pico::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    ) else {
        halt()
    };

    let sio = Sio::new(pac.SIO);
    let pins = rp_pico::Pins::new(pac.IO_BANK0, pac.PADS_BANK0, sio.gpio_bank0, &mut pac.RESETS);
    let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    // OLED
    let sda: Pin<_, FunctionI2C, PullUp> = pins.gpio20.reconfigure();
    let scl: Pin<_, FunctionI2C, PullUp> = pins.gpio21.reconfigure();
    let i2c = I2C::i2c0(
        pac.I2C0,
        sda,
        scl,
        I2C_FREQ_HZ.Hz(),
        &mut pac.RESETS,
        &clocks.system_clock,
    );
    let mut oled: GraphicsMode<_> = Builder::new()
        .with_rotation(DisplayRotation::Rotate180)
        .connect_i2c(i2c)
        .into();
    if oled.init().is_err() {
        #[cfg(feature = "defmt")]
        defmt::error!("OLED init failed");
        halt()
    }
    #[cfg(feature = "defmt")]
    defmt::info!("✅ OLED ready");

    // ADC + DMA, GPIO26 is handed to the analogue input by the driver
    let _adc_pin = pins.gpio26;
    let bus = match PicoBus::new(pac.ADC, pac.DMA, &mut pac.RESETS) {
        Ok(bus) => bus,
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::error!("ADC/DMA reset failed: {}", _e);
            halt()
        }
    };
    let mut acquisition = match Acquisition::new(bus, timer, acquisition_config()) {
        Ok(acq) => acq,
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::error!("acquisition config rejected: {}", _e);
            halt()
        }
    };
    acquisition.init_pin();
    match acquisition.read_single() {
        Ok(_level) => {
            #[cfg(feature = "defmt")]
            defmt::info!("initial light level {}", _level);
        }
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("initial light reading failed: {}", _e);
        }
    }

    let renderer = GraphicsRenderer::new(oled, |d: &mut GraphicsMode<_>| {
        d.flush().map_err(|_| FlickerError::RenderFailed)
    });
    let renderer = OrientedRenderer::new(renderer, display_transform());

    let mut pipeline =
        match FlickerPipeline::<_, _, NSAMPLES>::new(acquisition, renderer, default_config()) {
            Ok(p) => p,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::error!("pipeline config rejected: {}", _e);
                halt()
            }
        };

    #[cfg(feature = "defmt")]
    defmt::info!("✨ Measuring");

    let _stats = pipeline.run(&SHUTDOWN);
    #[cfg(feature = "defmt")]
    defmt::info!("stopped: {}", _stats);

    halt()
}

fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}
