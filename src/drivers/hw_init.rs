//! One-shot hardware peripheral initialization and raw line/UART access.
//!
//! Configures the pulse output GPIOs and the operator console UART using
//! raw ESP-IDF sys calls.  Called from `main()` at the top of each
//! session, before any pulse task exists.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    UartConfigFailed(i32),
    UartInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::UartConfigFailed(rc) => write!(f, "UART param config failed (rc={})", rc),
            Self::UartInstallFailed(rc) => write!(f, "UART driver install failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

impl From<HwInitError> for crate::error::Error {
    fn from(_: HwInitError) -> Self {
        Self::Init("peripheral configuration failed")
    }
}

// ── GPIO outputs ──────────────────────────────────────────────

/// Configure `pin` as a push-pull output and drive it to the idle (HIGH) level.
#[cfg(target_os = "espidf")]
pub fn init_output_line(pin: i32) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: called from the main task before the pulse task owning
    // `pin` is spawned; no concurrent access to this pin's registers.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    gpio_write(pin, true);
    info!("hw_init: GPIO{} output, idle HIGH", pin);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_output_line(pin: i32) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): GPIO{} output init skipped", pin);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    // Each pin is written by exactly one pulse task.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── Console UART ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_console_uart() -> Result<(), HwInitError> {
    let cfg = uart_config_t {
        baud_rate: pins::CONSOLE_BAUD_RATE as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    // SAFETY: one-time driver setup from the main task before any reads.
    unsafe {
        let ret = uart_param_config(pins::CONSOLE_UART_PORT, &cfg);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::UartConfigFailed(ret));
        }
        let ret = uart_driver_install(
            pins::CONSOLE_UART_PORT,
            pins::CONSOLE_RX_BUFFER,
            0,
            0,
            core::ptr::null_mut(),
            0,
        );
        if ret != ESP_OK as i32 {
            return Err(HwInitError::UartInstallFailed(ret));
        }
    }
    info!("hw_init: console UART{} @ {} baud", pins::CONSOLE_UART_PORT, pins::CONSOLE_BAUD_RATE);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_console_uart() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): console on stdin/stdout");
    Ok(())
}

/// Read one byte, waiting at most `timeout_ms`.
#[cfg(target_os = "espidf")]
pub fn uart_read_byte(timeout_ms: u32) -> Option<u8> {
    let ticks = (u64::from(timeout_ms) * u64::from(configTICK_RATE_HZ) / 1000) as TickType_t;
    let mut byte = 0u8;
    // SAFETY: the driver was installed by init_console_uart(); the buffer
    // is a live local of exactly the requested length.
    let n = unsafe {
        uart_read_bytes(
            pins::CONSOLE_UART_PORT,
            (&raw mut byte).cast(),
            1,
            ticks,
        )
    };
    (n == 1).then_some(byte)
}

#[cfg(not(target_os = "espidf"))]
pub fn uart_read_byte(timeout_ms: u32) -> Option<u8> {
    use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    static STDIN_BYTES: OnceLock<Mutex<Receiver<u8>>> = OnceLock::new();

    let rx = STDIN_BYTES.get_or_init(|| {
        let (tx, rx) = channel();
        let spawned = std::thread::Builder::new()
            .name("stdin-console".into())
            .spawn(move || {
                use std::io::Read;
                for byte in std::io::stdin().bytes().map_while(Result::ok) {
                    if tx.send(byte).is_err() {
                        break;
                    }
                }
            });
        if let Err(e) = spawned {
            log::error!("hw_init(sim): stdin reader not started: {}", e);
        }
        Mutex::new(rx)
    });

    let rx = rx.lock().ok()?;
    match rx.recv_timeout(Duration::from_millis(u64::from(timeout_ms))) {
        Ok(byte) => Some(byte),
        Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
    }
}

#[cfg(target_os = "espidf")]
pub fn uart_write(bytes: &[u8]) {
    // SAFETY: driver installed; `bytes` is valid for its whole length.
    unsafe {
        uart_write_bytes(pins::CONSOLE_UART_PORT, bytes.as_ptr().cast(), bytes.len());
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn uart_write(bytes: &[u8]) {
    use std::io::Write;
    let mut out = std::io::stdout().lock();
    let _ = out.write_all(bytes);
    let _ = out.flush();
}
