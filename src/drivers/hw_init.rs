//! One-shot hardware peripheral initialization.
//!
//! Configures GPIO directions and the supervisor-link UART using raw
//! ESP-IDF sys calls. Called once from `main()` before the control
//! loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    UartInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::UartInitFailed(rc) => write!(f, "link UART init failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_gpio_outputs()?;
        init_uart()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [
        pins::CONTACTOR_GPIO,
        pins::INDICATOR_GPIO,
        pins::FAULT_LATCH_GPIO,
        pins::RS485_DE_GPIO,
    ];

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        // Everything boots de-asserted: contactor open, indicator dark,
        // latch released, transceiver in receive.
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio_outputs(). Main-loop only.
    unsafe {
        gpio_set_level(pin, if high { 1 } else { 0 });
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── Link UART ─────────────────────────────────────────────────

/// UART port wired to the supervisor RS-485 transceiver.
#[cfg(target_os = "espidf")]
const LINK_UART: uart_port_t = 1;

#[allow(dead_code)]
pub const LINK_BAUD: u32 = 115_200;

#[cfg(target_os = "espidf")]
unsafe fn init_uart() -> Result<(), HwInitError> {
    let cfg = uart_config_t {
        baud_rate: LINK_BAUD as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    let ret = unsafe { uart_param_config(LINK_UART, &cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::UartInitFailed(ret));
    }

    let ret = unsafe { uart_set_pin(LINK_UART, pins::RS485_TX_GPIO, pins::RS485_RX_GPIO, -1, -1) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::UartInitFailed(ret));
    }

    let ret = unsafe { uart_driver_install(LINK_UART, 256, 256, 0, core::ptr::null_mut(), 0) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::UartInitFailed(ret));
    }

    info!("hw_init: link UART configured ({} baud)", LINK_BAUD);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn uart_write(data: &[u8]) -> usize {
    // SAFETY: driver installed in init_uart(); main-loop only.
    let n = unsafe { uart_write_bytes(LINK_UART, data.as_ptr().cast(), data.len()) };
    if n < 0 {
        0
    } else {
        n as usize
    }
}

#[cfg(not(target_os = "espidf"))]
#[allow(dead_code)]
pub fn uart_write(data: &[u8]) -> usize {
    data.len()
}

#[cfg(target_os = "espidf")]
pub fn uart_read_byte() -> Option<u8> {
    let mut byte = 0u8;
    // SAFETY: driver installed in init_uart(); zero timeout keeps the
    // control loop non-blocking.
    let n = unsafe { uart_read_bytes(LINK_UART, (&raw mut byte).cast(), 1, 0) };
    (n == 1).then_some(byte)
}

#[cfg(not(target_os = "espidf"))]
pub fn uart_read_byte() -> Option<u8> {
    None
}
