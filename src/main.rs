//! Front door lock monitor: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HallSensor      OtaReceiver     HttpServer      Watchdog      │
//! │  (SamplerPort)   (UpdatePort)    (RequestPort)   (Heartbeat)   │
//! │  WifiAdapter     MdnsAdapter     FreeRtos (DelayNs)            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │          MonitorService (pure logic)                   │    │
//! │  │          LockFsm · EventLog                            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (update → http → sample → beat → sleep)             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::{Context, Result};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{error, info};

use doorlock::adapters::mdns::MdnsAdapter;
use doorlock::adapters::wifi::{ConnectivityPort, WifiAdapter};
use doorlock::adapters::{device_id, system};
use doorlock::app::events::AppEvent;
use doorlock::app::ports::EventSink;
use doorlock::app::service::MonitorService;
use doorlock::config::DeviceConfig;
use doorlock::drivers::{hw_init, watchdog::Watchdog};
use doorlock::http::server::HttpServer;
use doorlock::ota::{receiver::OtaReceiver, session};
use doorlock::pins;
use doorlock::scheduler::{LoopExit, LoopPorts, RestartReason, Scheduler};
use doorlock::sensors::hall::HallSensor;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Booting...");
    info!("doorlock v{}", env!("CARGO_PKG_VERSION"));

    session::check_rollback();
    hw_init::init_peripherals().map_err(doorlock::Error::from)?;

    // ── 2. Configuration ──────────────────────────────────────
    let mac = device_id::read_mac();
    let config = DeviceConfig::from_build_env()
        .and_then(|c| c.with_hostname_fallback(&device_id::hostname(&mac)))
        .map_err(doorlock::Error::from)
        .context("device configuration")?;
    info!(
        "Config: host={} thresholds={}/{} log={}/{} interval={}ms",
        config.hostname,
        config.locked_at,
        config.unlocked_at,
        config.log_capacity,
        config.log_trim_target,
        config.loop_interval_ms
    );

    let mut service = MonitorService::new(&config)?;

    // ── 3. WiFi (fatal on failure) ────────────────────────────
    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let esp_wifi = EspWifi::new(peripherals.modem, sys_loop.clone(), Some(nvs))?;
    let mut wifi = WifiAdapter::new(BlockingWifi::wrap(esp_wifi, sys_loop)?);
    wifi.set_hostname(&config.hostname);

    info!("Connecting to Wi-Fi");
    let connected = wifi
        .set_credentials(&config.wifi_ssid, &config.wifi_password)
        .and_then(|()| wifi.connect());
    let ip = match connected {
        Ok(ip) => ip,
        Err(e) => {
            error!("Wi-Fi: {}", e);
            FreeRtos::delay_ms(1000);
            system::restart(RestartReason::ConnectivityFailed);
        }
    };
    service.emit(&AppEvent::WifiConnected(ip));

    // ── 4. Update receiver + mDNS ─────────────────────────────
    let io_timeout = Duration::from_millis(u64::from(config.request_timeout_ms));
    let ota = OtaReceiver::bind(config.ota_port, io_timeout).map_err(doorlock::Error::from)?;
    let mut mdns = MdnsAdapter::new(config.hostname.clone(), config.http_port, config.ota_port);
    mdns.start();
    service.emit(&AppEvent::UpdateReady);

    // ── 5. Web log UI ─────────────────────────────────────────
    let http = HttpServer::bind(config.http_port, io_timeout).map_err(doorlock::Error::from)?;
    service.emit(&AppEvent::WebReady);

    service.emit(&AppEvent::SetupComplete);
    service.emit(&AppEvent::Running {
        hostname: config.hostname.clone(),
    });

    // ── 6. Scheduler loop ─────────────────────────────────────
    let mut ports = LoopPorts {
        update: ota,
        requests: http,
        sampler: HallSensor::new(pins::ADC1_CH_HALL),
        delay: FreeRtos,
        heartbeat: Watchdog::new(config.watchdog_timeout_ms),
    };
    let mut scheduler = Scheduler::new(config.loop_interval_ms);

    let LoopExit::Restart(reason) = scheduler.run(&mut service, &mut ports);

    // Let the OTA client read its reply before the link goes down.
    FreeRtos::delay_ms(200);
    mdns.stop();
    drop(wifi);
    system::restart(reason)
}
