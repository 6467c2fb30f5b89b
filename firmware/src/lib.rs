#![no_std]

//! Board glue for the Raspberry Pi Pico flicker meter
//!
//! Photodiode amplifier on GPIO26 (ADC0), SH1106 OLED on I2C0 (GPIO20 SDA,
//! GPIO21 SCL).

use rp_pico::hal::pac;

pub use flicker_core::*;
use flicker_core::regs::{Mmio, RegisterBus};

/// OLED bus clock
pub const I2C_FREQ_HZ: u32 = 400_000;

/// Polls of RESET_DONE before giving up on a peripheral
const RESET_POLLS: u32 = 10_000;

/// Register bus that owns the ADC and DMA blocks it programs.
///
/// Holding the PAC singletons keeps every other driver off these peripherals
/// while raw MMIO accesses are in use.
pub struct PicoBus {
    mmio: Mmio,
    _adc: pac::ADC,
    _dma: pac::DMA,
}

impl PicoBus {
    /// Take ADC and DMA out of reset and wrap them for acquisition
    pub fn new(adc: pac::ADC, dma: pac::DMA, resets: &mut pac::RESETS) -> Result<Self, FlickerError> {
        resets.reset().modify(|_, w| w.adc().clear_bit().dma().clear_bit());
        let mut polls = 0;
        loop {
            let done = resets.reset_done().read();
            if done.adc().bit_is_set() && done.dma().bit_is_set() {
                break;
            }
            if polls == RESET_POLLS {
                return Err(FlickerError::InvalidConfig);
            }
            polls += 1;
        }
        Ok(Self {
            // SAFETY: the ADC and DMA singletons are owned by this bus
            mmio: unsafe { Mmio::new() },
            _adc: adc,
            _dma: dma,
        })
    }
}

impl RegisterBus for PicoBus {
    #[inline]
    fn read(&mut self, addr: u32) -> u32 {
        self.mmio.read(addr)
    }

    #[inline]
    fn write(&mut self, addr: u32, value: u32) {
        self.mmio.write(addr, value)
    }
}

/// Capture on ADC0 through DMA channel 0 at the default rate
pub fn acquisition_config() -> AcquisitionConfig {
    AcquisitionConfig {
        adc_channel: 0,
        dma_channel: 0,
        ..AcquisitionConfig::default()
    }
}

/// The SH1106 is rotated in hardware, so core coordinates only need the raster flip
pub const fn display_transform() -> DisplayTransform {
    DisplayTransform::new(SCREEN_WIDTH as i32, SCREEN_HEIGHT as i32, Orientation::Upright)
}
