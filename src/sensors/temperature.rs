//! DS18B20 digital temperature probe on a 1-Wire bus.
//!
//! One sample = one blocking bus transaction: reset, CONVERT T, wait for
//! the 12-bit conversion (750 ms), read the scratchpad.  The probe address
//! is discovered lazily and re-scanned after any bus fault, so a probe that
//! is plugged in after boot is picked up on the next sample.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the bus through `one-wire-bus` + `ds18b20` on an
//! open-drain `PinDriver`.
//! On host/test: returns a value injected through [`sim_set_probe`].

use crate::error::SensorError;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_PROBE_BITS: AtomicU32 = AtomicU32::new(0x41B4_0000); // 22.5 °C
#[cfg(not(target_os = "espidf"))]
static SIM_PROBE_FAULT: AtomicU8 = AtomicU8::new(0);

/// Inject the value the simulated probe reports on its next read.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_probe(celsius: f32) {
    SIM_PROBE_BITS.store(celsius.to_bits(), Ordering::Relaxed);
    SIM_PROBE_FAULT.store(0, Ordering::Relaxed);
}

/// Make the simulated probe fail its next reads with a bus fault.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_bus_fault(faulted: bool) {
    SIM_PROBE_FAULT.store(u8::from(faulted), Ordering::Relaxed);
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod bus {
    use ds18b20::{Ds18b20, Resolution};
    use esp_idf_hal::delay::Ets;
    use esp_idf_hal::gpio::{AnyIOPin, InputOutput, PinDriver, Pull};
    use log::{info, warn};
    use one_wire_bus::{Address, OneWire};

    use crate::error::SensorError;

    pub struct ProbeBus {
        one_wire: OneWire<PinDriver<'static, AnyIOPin, InputOutput>>,
        address: Option<Address>,
        delay: Ets,
    }

    impl ProbeBus {
        pub fn new(pin: AnyIOPin) -> anyhow::Result<Self> {
            let mut line = PinDriver::input_output_od(pin)?;
            line.set_pull(Pull::Up)?;
            line.set_high()?;
            let one_wire = OneWire::new(line)
                .map_err(|e| anyhow::anyhow!("1-Wire bus init failed: {e:?}"))?;
            Ok(Self {
                one_wire,
                address: None,
                delay: Ets,
            })
        }

        fn discover(&mut self) {
            self.address = None;
            for found in self.one_wire.devices(false, &mut self.delay) {
                match found {
                    Ok(addr) if addr.family_code() == ds18b20::FAMILY_CODE => {
                        info!("DS18B20 found at {:?}", addr);
                        self.address = Some(addr);
                        return;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("1-Wire search failed: {:?}", e);
                        return;
                    }
                }
            }
        }

        pub fn read(&mut self) -> Result<f32, SensorError> {
            if self.address.is_none() {
                self.discover();
            }
            let addr = self.address.ok_or(SensorError::NoDevice)?;
            let probe = Ds18b20::new::<core::convert::Infallible>(addr).map_err(|_| {
                self.address = None;
                SensorError::NoDevice
            })?;

            if ds18b20::start_simultaneous_temp_measurement(&mut self.one_wire, &mut self.delay)
                .is_err()
            {
                self.address = None;
                return Err(SensorError::BusFault);
            }
            Resolution::Bits12.delay_for_measurement_time(&mut self.delay);

            match probe.read_data(&mut self.one_wire, &mut self.delay) {
                Ok(data) => Ok(data.temperature),
                Err(_) => {
                    self.address = None;
                    Err(SensorError::BusFault)
                }
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Driver
// ───────────────────────────────────────────────────────────────

pub struct TemperatureProbe {
    #[cfg(target_os = "espidf")]
    bus: bus::ProbeBus,
    #[cfg(not(target_os = "espidf"))]
    _gpio: i32,
}

impl TemperatureProbe {
    #[cfg(target_os = "espidf")]
    pub fn new(pin: esp_idf_hal::gpio::AnyIOPin) -> anyhow::Result<Self> {
        Ok(Self {
            bus: bus::ProbeBus::new(pin)?,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(gpio: i32) -> Self {
        Self { _gpio: gpio }
    }

    /// Blocking read of one raw conversion result (°C, unvalidated).
    #[cfg(target_os = "espidf")]
    pub fn read(&mut self) -> Result<f32, SensorError> {
        self.bus.read()
    }

    /// Blocking read of one raw conversion result (°C, unvalidated).
    #[cfg(not(target_os = "espidf"))]
    pub fn read(&mut self) -> Result<f32, SensorError> {
        if SIM_PROBE_FAULT.load(Ordering::Relaxed) != 0 {
            return Err(SensorError::BusFault);
        }
        Ok(f32::from_bits(SIM_PROBE_BITS.load(Ordering::Relaxed)))
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    // Single test so the shared simulation statics are not raced.
    #[test]
    fn simulated_probe_reports_injected_value_and_faults() {
        let mut probe = TemperatureProbe::new(crate::pins::ONE_WIRE_GPIO);
        sim_set_probe(27.125);
        assert_eq!(probe.read(), Ok(27.125));
        sim_set_bus_fault(true);
        assert_eq!(probe.read(), Err(SensorError::BusFault));
        sim_set_bus_fault(false);
        assert_eq!(probe.read(), Ok(27.125));
    }
}
